//! Per-type element renderers.
//!
//! Each element becomes one `<tr><td>` row of its section's inner table.
//! Dispatch is an exhaustive match over [`ElementProperties`], so a new
//! element type cannot be added to the model without a renderer here.

use crate::compiler::{escape_html, CompileError, Context};
use crate::styles::InlineStyle;
use mailforge_model::properties::*;
use mailforge_model::{Alignment, Element, ElementProperties};

pub(crate) fn compile_element(element: &Element, ctx: &mut Context) -> Result<(), CompileError> {
    let align = element.layout.alignment.unwrap_or(Alignment::Left).as_str();

    let mut cell = InlineStyle::new();
    cell.set_opt("padding", element.layout.padding.as_deref())
        .set_opt("margin", element.layout.margin.as_deref())
        .set("text-align", align);

    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(&format!(
        r#"<td class="element element-{}" align="{}" valign="top" style="{}">"#,
        element.element_type(),
        align,
        attr(&cell)
    ));
    ctx.indent();

    match &element.properties {
        ElementProperties::Header(props) => render_header(element, props, align, ctx),
        ElementProperties::Text(props) => render_text(element, props, ctx),
        ElementProperties::Button(props) => render_button(element, props, align, ctx),
        ElementProperties::Image(props) => render_image(element, props, ctx),
        ElementProperties::Divider(props) => render_divider(props, align, ctx),
        ElementProperties::Spacer(props) => render_spacer(props, ctx),
        ElementProperties::Social(props) => render_social(props, align, ctx),
        ElementProperties::List(props) => render_list(props, ctx),
        ElementProperties::Quote(props) => render_quote(element, props, ctx),
        ElementProperties::Code(props) => render_code(element, props, ctx),
        ElementProperties::Video(props) => render_video(element, props, ctx),
        ElementProperties::Menu(props) => render_menu(props, ctx),
        ElementProperties::Footer(props) => render_footer(element, props, ctx),
        ElementProperties::Hero(props) => render_hero(element, props, ctx),
        ElementProperties::Testimonial(props) => render_testimonial(element, props, ctx),
        ElementProperties::Product(props) => render_product(element, props, ctx),
        ElementProperties::Table(props) => render_table(props, ctx),
        ElementProperties::Logo(props) => {
            render_linked_image(&props.image, alt_text(element, &props.alt), props.href.as_deref(), ctx)
        }
        ElementProperties::Icon(props) => {
            render_linked_image(&props.image, alt_text(element, &props.alt), props.href.as_deref(), ctx)
        }
        ElementProperties::Html(props) => render_html(element, props, ctx),
        ElementProperties::Signature(props) => render_signature(props, ctx),
    }

    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
    Ok(())
}

fn attr(style: &InlineStyle) -> String {
    escape_html(&style.render())
}

/// Escaped text with line breaks kept
fn text_html(text: &str) -> String {
    escape_html(text).replace('\n', "<br />")
}

fn alt_text<'a>(element: &'a Element, alt: &'a Option<String>) -> &'a str {
    alt.as_deref().unwrap_or(&element.content)
}

const PRESENTATION_TABLE: &str =
    r#"role="presentation" cellpadding="0" cellspacing="0" border="0""#;

fn render_header(element: &Element, props: &HeaderProperties, align: &str, ctx: &mut Context) {
    let level = props.level.clamp(1, 6);
    let mut style = InlineStyle::new();
    style.set("margin", "0").typography(&props.typography).set("text-align", align);
    ctx.add_line(&format!(
        r#"<h{level} style="{}">{}</h{level}>"#,
        attr(&style),
        text_html(&element.content),
        level = level
    ));
}

fn render_text(element: &Element, props: &TextProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style.set("margin", "0").typography(&props.typography);
    ctx.add_line(&format!(
        r#"<p style="{}">{}</p>"#,
        attr(&style),
        text_html(&element.content)
    ));
}

fn render_button(element: &Element, props: &ButtonProperties, align: &str, ctx: &mut Context) {
    render_button_table(
        &element.content,
        props.href.as_deref(),
        &props.button,
        props.full_width,
        align,
        ctx,
    );
}

/// Bulletproof button: the cell carries the background so Outlook, which
/// ignores padding on anchors, still shows a filled block.
fn render_button_table(
    label: &str,
    href: Option<&str>,
    button: &ButtonStyle,
    full_width: bool,
    align: &str,
    ctx: &mut Context,
) {
    let width_attr = if full_width { r#" width="100%""# } else { "" };

    let mut cell = InlineStyle::new();
    cell.set_opt("border-radius", button.border_radius.as_deref())
        .set_opt("background-color", button.background_color.as_deref())
        .set_opt("mso-padding-alt", button.padding.as_deref());
    let bgcolor = button
        .background_color
        .as_deref()
        .map(|c| format!(r#" bgcolor="{}""#, escape_html(c)))
        .unwrap_or_default();

    let mut link = InlineStyle::new();
    link.set("display", if full_width { "block" } else { "inline-block" })
        .set_opt("padding", button.padding.as_deref())
        .set_opt("color", button.text_color.as_deref())
        .set_opt("font-size", button.font_size.as_deref())
        .set_opt("font-weight", button.font_weight.as_deref())
        .set("text-decoration", "none")
        .set_opt("border-radius", button.border_radius.as_deref())
        .border(&button.border, None);

    ctx.block(
        &format!(r#"<table {} align="{}"{}>"#, PRESENTATION_TABLE, align, width_attr),
        "</table>",
        |ctx| {
            ctx.block("<tr>", "</tr>", |ctx| {
                ctx.block(
                    &format!(r#"<td align="center"{} style="{}">"#, bgcolor, attr(&cell)),
                    "</td>",
                    |ctx| {
                        ctx.add_line(&format!(
                            r#"<a href="{}" target="_blank" style="{}">{}</a>"#,
                            escape_html(href.unwrap_or("#")),
                            attr(&link),
                            escape_html(label)
                        ));
                    },
                );
            });
        },
    );
}

fn img_tag(image: &ImageSource, alt: &str, extra: &InlineStyle) -> String {
    let mut style = InlineStyle::new();
    style
        .set("display", "block")
        .set("border", "0")
        .set("outline", "none")
        .set("text-decoration", "none")
        .set("height", "auto");
    if let Some(width) = image.width {
        style.set("width", format!("{}px", width)).set("max-width", "100%");
    }
    style.merge(extra);

    let mut tag = format!(
        r#"<img src="{}" alt="{}""#,
        escape_html(image.src.as_deref().unwrap_or("")),
        escape_html(alt)
    );
    if let Some(width) = image.width {
        tag.push_str(&format!(r#" width="{}""#, width));
    }
    if let Some(height) = image.height {
        tag.push_str(&format!(r#" height="{}""#, height));
    }
    tag.push_str(&format!(r#" class="fluid" style="{}" />"#, attr(&style)));
    tag
}

fn linked(markup: String, href: Option<&str>) -> String {
    match href {
        Some(href) => format!(r#"<a href="{}" target="_blank">{}</a>"#, escape_html(href), markup),
        None => markup,
    }
}

fn render_image(element: &Element, props: &ImageProperties, ctx: &mut Context) {
    let mut extra = InlineStyle::new();
    extra.border(&props.border, None);
    let img = img_tag(&props.image, alt_text(element, &props.alt), &extra);
    ctx.add_line(&linked(img, props.href.as_deref()));
}

fn render_linked_image(image: &ImageSource, alt: &str, href: Option<&str>, ctx: &mut Context) {
    let img = img_tag(image, alt, &InlineStyle::new());
    ctx.add_line(&linked(img, href));
}

fn render_divider(props: &DividerProperties, align: &str, ctx: &mut Context) {
    let width = props.width.as_deref().unwrap_or("100%");
    let mut line = InlineStyle::new();
    line.border(&props.border, Some("top"))
        .set("font-size", "0")
        .set("line-height", "0")
        .set("height", "0")
        .set("mso-line-height-rule", "exactly");

    ctx.add_line(&format!(
        r#"<table {} width="{}" align="{}"><tr><td style="{}">&nbsp;</td></tr></table>"#,
        PRESENTATION_TABLE,
        escape_html(width),
        align,
        attr(&line)
    ));
}

/// Height is set three ways (attribute, CSS height, line-height) and the
/// cell gets a non-breaking space, because some clients collapse empty cells.
fn render_spacer(props: &SpacerProperties, ctx: &mut Context) {
    let height = props.height;
    ctx.add_line(&format!(
        r#"<table {} width="100%"><tr><td height="{h}" style="height:{h}px;line-height:{h}px;font-size:1px;mso-line-height-rule:exactly">&nbsp;</td></tr></table>"#,
        PRESENTATION_TABLE,
        h = height
    ));
}

fn render_social(props: &SocialProperties, align: &str, ctx: &mut Context) {
    if props.links.is_empty() {
        return;
    }

    let spacing = props.spacing.as_deref().unwrap_or("0");
    ctx.block(
        &format!(r#"<table {} align="{}">"#, PRESENTATION_TABLE, align),
        "</table>",
        |ctx| {
            ctx.block("<tr>", "</tr>", |ctx| {
                for link in &props.links {
                    let platform = link.platform.as_deref().unwrap_or("link");
                    let inner = match &link.icon_src {
                        Some(src) => img_tag(
                            &ImageSource {
                                src: Some(src.clone()),
                                width: Some(props.icon_size),
                                height: Some(props.icon_size),
                            },
                            platform,
                            &InlineStyle::new(),
                        ),
                        None => escape_html(platform),
                    };
                    ctx.add_line(&format!(
                        r#"<td style="padding:0 {}">{}</td>"#,
                        escape_html(spacing),
                        linked(inner, link.url.as_deref())
                    ));
                }
            });
        },
    );
}

fn render_list(props: &ListProperties, ctx: &mut Context) {
    let tag = if props.ordered { "ol" } else { "ul" };
    let mut style = InlineStyle::new();
    style.set("margin", "0").set("padding-left", "24px").typography(&props.typography);

    ctx.block(
        &format!(r#"<{} style="{}">"#, tag, attr(&style)),
        &format!("</{}>", tag),
        |ctx| {
            for item in &props.items {
                ctx.add_line(&format!(
                    r#"<li style="margin:0 0 4px 0">{}</li>"#,
                    text_html(item)
                ));
            }
        },
    );
}

fn render_quote(element: &Element, props: &QuoteProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style
        .set("margin", "0")
        .set("padding", "0 0 0 16px")
        .border(&props.border, Some("left"))
        .typography(&props.typography);

    ctx.block(
        &format!(r#"<blockquote style="{}">"#, attr(&style)),
        "</blockquote>",
        |ctx| {
            ctx.add_line(&format!(
                r#"<p style="margin:0">{}</p>"#,
                text_html(&element.content)
            ));
            if let Some(citation) = &props.citation {
                ctx.add_line(&format!(
                    r#"<p style="margin:8px 0 0 0;font-size:14px;color:#6b7280">&mdash; {}</p>"#,
                    escape_html(citation)
                ));
            }
        },
    );
}

fn render_code(element: &Element, props: &CodeProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style
        .set("margin", "0")
        .set("padding", "12px")
        .set_opt("background-color", props.background_color.as_deref())
        .typography(&props.typography)
        .border(&props.border, None)
        .set("white-space", "pre-wrap")
        .set("word-break", "break-word");

    // whitespace inside <pre> is content, so no pretty-printing here
    ctx.add_line(&format!(
        r#"<pre style="{}"><code>{}</code></pre>"#,
        attr(&style),
        escape_html(&element.content)
    ));
}

fn render_video(element: &Element, props: &VideoProperties, ctx: &mut Context) {
    let img = img_tag(&props.thumbnail, alt_text(element, &props.alt), &InlineStyle::new());
    ctx.add_line(&linked(img, props.href.as_deref()));
}

fn render_menu(props: &MenuProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style.set("margin", "0").typography(&props.typography);

    let separator = props
        .separator
        .as_deref()
        .map(|s| format!(r#"<span style="padding:0 8px">{}</span>"#, escape_html(s)))
        .unwrap_or_else(|| " ".to_string());

    let links = props
        .items
        .iter()
        .map(|item| {
            format!(
                r#"<a href="{}" target="_blank" style="color:inherit;text-decoration:none">{}</a>"#,
                escape_html(item.href.as_deref().unwrap_or("#")),
                escape_html(item.label.as_deref().unwrap_or(""))
            )
        })
        .collect::<Vec<_>>()
        .join(&separator);

    ctx.add_line(&format!(r#"<p style="{}">{}</p>"#, attr(&style), links));
}

fn render_footer(element: &Element, props: &FooterProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style.set("margin", "0").typography(&props.typography);

    let mut lines = Vec::new();
    if let Some(company) = &props.company_name {
        lines.push(format!("<strong>{}</strong>", escape_html(company)));
    }
    if let Some(address) = &props.address {
        lines.push(text_html(address));
    }
    if !element.content.is_empty() {
        lines.push(text_html(&element.content));
    }
    if let Some(href) = &props.unsubscribe_href {
        lines.push(format!(
            r#"<a href="{}" target="_blank" style="color:inherit;text-decoration:underline">{}</a>"#,
            escape_html(href),
            escape_html(props.unsubscribe_text.as_deref().unwrap_or("Unsubscribe"))
        ));
    }

    ctx.add_line(&format!(r#"<p style="{}">{}</p>"#, attr(&style), lines.join("<br />")));
}

fn render_hero(element: &Element, props: &HeroProperties, ctx: &mut Context) {
    let mut style = InlineStyle::new();
    style.set_opt("background-color", props.background_color.as_deref());
    if let Some(image) = &props.background_image {
        style
            .set("background-image", format!("url('{}')", image))
            .set("background-size", "cover")
            .set("background-position", "center");
    }

    let background_attr = props
        .background_image
        .as_deref()
        .map(|src| format!(r#" background="{}""#, escape_html(src)))
        .unwrap_or_default();

    ctx.add_line(&format!(
        r#"<table {} width="100%"{} style="{}">"#,
        PRESENTATION_TABLE,
        background_attr,
        attr(&style)
    ));
    ctx.indent();
    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(r#"<td align="center" valign="middle" style="padding:48px 24px">"#);
    ctx.indent();

    // Outlook ignores CSS backgrounds; VML draws the image behind the text
    if let Some(src) = &props.background_image {
        ctx.add_line("<!--[if gte mso 9]>");
        ctx.add_line(&format!(
            r#"<v:rect xmlns:v="urn:schemas-microsoft-com:vml" fill="true" stroke="false" style="width:100%"><v:fill type="frame" src="{}" color="{}" /><v:textbox inset="0,0,0,0">"#,
            escape_html(src),
            escape_html(props.background_color.as_deref().unwrap_or("#ffffff"))
        ));
        ctx.add_line("<![endif]-->");
    }

    if let Some(heading) = &props.heading {
        let mut heading_style = InlineStyle::new();
        heading_style
            .set("margin", "0 0 16px 0")
            .typography(&props.heading_typography);
        ctx.add_line(&format!(
            r#"<h1 style="{}">{}</h1>"#,
            attr(&heading_style),
            text_html(heading)
        ));
    }

    if !element.content.is_empty() {
        let mut body_style = InlineStyle::new();
        body_style.set("margin", "0 0 24px 0").typography(&props.typography);
        ctx.add_line(&format!(
            r#"<p style="{}">{}</p>"#,
            attr(&body_style),
            text_html(&element.content)
        ));
    }

    if let Some(cta) = &props.cta_text {
        render_button_table(cta, props.cta_href.as_deref(), &props.button, false, "center", ctx);
    }

    if props.background_image.is_some() {
        ctx.add_line("<!--[if gte mso 9]>");
        ctx.add_line("</v:textbox></v:rect>");
        ctx.add_line("<![endif]-->");
    }

    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
    ctx.dedent();
    ctx.add_line("</table>");
}

fn render_testimonial(element: &Element, props: &TestimonialProperties, ctx: &mut Context) {
    let mut quote_style = InlineStyle::new();
    quote_style
        .set("margin", "0 0 8px 0")
        .set("font-style", "italic")
        .typography(&props.typography);

    ctx.block(
        &format!(r#"<table {} width="100%">"#, PRESENTATION_TABLE),
        "</table>",
        |ctx| {
            ctx.block("<tr>", "</tr>", |ctx| {
                if props.avatar.src.is_some() {
                    let width = props.avatar.width.unwrap_or(48);
                    let mut round = InlineStyle::new();
                    round.set("border-radius", "50%");
                    ctx.add_line(&format!(
                        r#"<td class="stack-column-center" width="{}" valign="top" style="padding:0 16px 0 0">{}</td>"#,
                        width + 16,
                        img_tag(&props.avatar, props.author.as_deref().unwrap_or(""), &round)
                    ));
                }
                ctx.block(
                    r#"<td class="stack-column-center" valign="top">"#,
                    "</td>",
                    |ctx| {
                        ctx.add_line(&format!(
                            r#"<p style="{}">&ldquo;{}&rdquo;</p>"#,
                            attr(&quote_style),
                            text_html(&element.content)
                        ));
                        let byline = [props.author.as_deref(), props.role.as_deref()]
                            .into_iter()
                            .flatten()
                            .map(escape_html)
                            .collect::<Vec<_>>();
                        if !byline.is_empty() {
                            ctx.add_line(&format!(
                                r#"<p style="margin:0;font-size:14px;font-weight:bold">{}</p>"#,
                                byline.join(", ")
                            ));
                        }
                    },
                );
            });
        },
    );
}

fn render_product(element: &Element, props: &ProductProperties, ctx: &mut Context) {
    let mut body_style = InlineStyle::new();
    body_style.set("margin", "0 0 12px 0").typography(&props.typography);

    ctx.block(
        &format!(r#"<table {} width="100%">"#, PRESENTATION_TABLE),
        "</table>",
        |ctx| {
            ctx.block("<tr>", "</tr>", |ctx| {
                ctx.add_line(&format!(
                    r#"<td class="stack-column" width="50%" valign="top" style="padding:0 12px 0 0">{}</td>"#,
                    img_tag(
                        &props.image,
                        props.title.as_deref().unwrap_or(&element.content),
                        &InlineStyle::new()
                    )
                ));
                ctx.block(
                    r#"<td class="stack-column" width="50%" valign="top">"#,
                    "</td>",
                    |ctx| {
                        if let Some(title) = &props.title {
                            ctx.add_line(&format!(
                                r#"<h3 style="margin:0 0 8px 0;font-size:20px">{}</h3>"#,
                                escape_html(title)
                            ));
                        }
                        if let Some(price) = &props.price {
                            ctx.add_line(&format!(
                                r#"<p style="margin:0 0 8px 0;font-size:18px;font-weight:bold">{}</p>"#,
                                escape_html(price)
                            ));
                        }
                        if !element.content.is_empty() {
                            ctx.add_line(&format!(
                                r#"<p style="{}">{}</p>"#,
                                attr(&body_style),
                                text_html(&element.content)
                            ));
                        }
                        if let Some(cta) = &props.cta_text {
                            render_button_table(
                                cta,
                                props.cta_href.as_deref(),
                                &props.button,
                                false,
                                "left",
                                ctx,
                            );
                        }
                    },
                );
            });
        },
    );
}

fn render_table(props: &TableProperties, ctx: &mut Context) {
    let mut table_style = InlineStyle::new();
    table_style
        .set("width", "100%")
        .set("border-collapse", "collapse")
        .typography(&props.typography);

    let mut cell_style = InlineStyle::new();
    cell_style
        .set_opt("padding", props.cell_padding.as_deref())
        .border(&props.border, None)
        .set("text-align", "left");
    let cell_attr = attr(&cell_style);

    ctx.block(
        &format!(
            r#"<table cellpadding="0" cellspacing="0" border="0" width="100%" style="{}">"#,
            attr(&table_style)
        ),
        "</table>",
        |ctx| {
            for (i, row) in props.rows.iter().enumerate() {
                let tag = if i == 0 && props.header_row { "th" } else { "td" };
                let cells = row
                    .iter()
                    .map(|cell| format!(r#"<{t} style="{}">{}</{t}>"#, cell_attr, text_html(cell), t = tag))
                    .collect::<String>();
                ctx.add_line(&format!("<tr>{}</tr>", cells));
            }
        },
    );
}

fn render_html(element: &Element, props: &HtmlProperties, ctx: &mut Context) {
    let markup = props.html.as_deref().unwrap_or(&element.content);
    for line in markup.lines() {
        ctx.add_line(line);
    }
}

fn render_signature(props: &SignatureProperties, ctx: &mut Context) {
    let mut text_style = InlineStyle::new();
    text_style.set("margin", "0").typography(&props.typography);

    ctx.block(
        &format!(r#"<table {}>"#, PRESENTATION_TABLE),
        "</table>",
        |ctx| {
            ctx.block("<tr>", "</tr>", |ctx| {
                if props.avatar.src.is_some() {
                    let mut round = InlineStyle::new();
                    round.set("border-radius", "50%");
                    ctx.add_line(&format!(
                        r#"<td valign="top" style="padding:0 12px 0 0">{}</td>"#,
                        img_tag(&props.avatar, props.name.as_deref().unwrap_or(""), &round)
                    ));
                }

                let mut lines = Vec::new();
                if let Some(name) = &props.name {
                    lines.push(format!("<strong>{}</strong>", escape_html(name)));
                }
                for detail in [&props.title, &props.company].into_iter().flatten() {
                    lines.push(escape_html(detail));
                }
                ctx.add_line(&format!(
                    r#"<td valign="top"><p style="{}">{}</p></td>"#,
                    attr(&text_style),
                    lines.join("<br />")
                ));
            });
        },
    );
}
