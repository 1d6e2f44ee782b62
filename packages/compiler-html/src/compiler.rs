use crate::elements::compile_element;
use crate::styles::InlineStyle;
use mailforge_model::{normalize_template, NormalizeError, Section, Template};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during HTML compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    #[error("Invalid template: {0}")]
    Normalize(NormalizeError),
}

impl From<NormalizeError> for CompileError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::UnknownElementType(tag) => CompileError::UnknownElementType(tag),
            other => CompileError::Normalize(other),
        }
    }
}

/// Options for HTML compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

pub(crate) struct Context {
    options: CompileOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// Emit `open`, run `body` one level deeper, then emit `close`
    pub(crate) fn block(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self)) {
        self.add_line(open);
        self.indent();
        body(self);
        self.dedent();
        self.add_line(close);
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a normalized template to a complete HTML email document.
///
/// Output is a pure function of the template and the options.
#[instrument(skip_all, fields(template_id = %template.id))]
pub fn compile_to_html(template: &Template, options: CompileOptions) -> Result<String, CompileError> {
    let mut ctx = Context::new(options);

    ctx.add_line(DOCTYPE);
    ctx.add_line(HTML_OPEN);
    ctx.indent();

    compile_head(template, &mut ctx);
    compile_body(template, &mut ctx)?;

    ctx.dedent();
    ctx.add_line("</html>");

    let html = ctx.get_output();
    debug!(bytes = html.len(), sections = template.sections.len(), "HTML generated");
    Ok(html)
}

/// Compile with default options
pub fn generate(template: &Template) -> Result<String, CompileError> {
    compile_to_html(template, CompileOptions::default())
}

/// Normalize wire-shaped input, then compile it
pub fn compile_value(raw: &Value, options: CompileOptions) -> Result<String, CompileError> {
    let template = normalize_template(raw)?;
    compile_to_html(&template, options)
}

const DOCTYPE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#;

const HTML_OPEN: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" lang="en">"#;

/// Resets and client workarounds shared by every email
const BASE_STYLESHEET: &[&str] = &[
    "html, body { margin: 0 !important; padding: 0 !important; height: 100% !important; width: 100% !important; }",
    "* { -ms-text-size-adjust: 100%; -webkit-text-size-adjust: 100%; }",
    "div[style*=\"margin: 16px 0\"] { margin: 0 !important; }",
    "table, td { mso-table-lspace: 0pt !important; mso-table-rspace: 0pt !important; }",
    "table { border-spacing: 0 !important; border-collapse: collapse !important; table-layout: fixed !important; margin: 0 auto !important; }",
    "img { -ms-interpolation-mode: bicubic; border: 0; outline: none; text-decoration: none; }",
    "a { text-decoration: none; }",
    "a[x-apple-data-detectors], .unstyle-auto-detected-links a { border-bottom: 0 !important; cursor: default !important; color: inherit !important; text-decoration: none !important; font-size: inherit !important; font-family: inherit !important; font-weight: inherit !important; line-height: inherit !important; }",
    "p, h1, h2, h3, h4, h5, h6 { mso-line-height-rule: exactly; }",
];

fn compile_head(template: &Template, ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line(r#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />"#);
    ctx.add_line(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0" />"#);
    ctx.add_line(r#"<meta http-equiv="X-UA-Compatible" content="IE=edge" />"#);
    ctx.add_line(r#"<meta name="x-apple-disable-message-reformatting" />"#);
    ctx.add_line(&format!("<title>{}</title>", escape_html(&template.name)));

    ctx.add_line("<!--[if mso]>");
    ctx.add_line("<noscript><xml><o:OfficeDocumentSettings><o:AllowPNG/><o:PixelsPerInch>96</o:PixelsPerInch></o:OfficeDocumentSettings></xml></noscript>");
    ctx.add_line("<![endif]-->");

    ctx.block(r#"<style type="text/css">"#, "</style>", |ctx| {
        for rule in BASE_STYLESHEET {
            ctx.add_line(rule);
        }
        if let Some(link_color) = &template.styles.link_color {
            ctx.add_line(&format!("a {{ color: {}; }}", link_color));
        }
        ctx.add_line(&format!(
            "@media only screen and (max-width: {}px) {{",
            template.styles.content_width
        ));
        ctx.indent();
        ctx.add_line(".email-container { width: 100% !important; max-width: 100% !important; }");
        ctx.add_line(".stack-column, .stack-column-center { display: block !important; width: 100% !important; max-width: 100% !important; }");
        ctx.add_line(".stack-column-center { text-align: center !important; }");
        ctx.add_line(".fluid { width: 100% !important; max-width: 100% !important; height: auto !important; }");
        ctx.dedent();
        ctx.add_line("}");
    });

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_body(template: &Template, ctx: &mut Context) -> Result<(), CompileError> {
    let styles = &template.styles;
    let width = styles.content_width;

    let mut body_style = InlineStyle::new();
    body_style
        .set("margin", "0")
        .set("padding", "0")
        .set("width", "100%")
        .set_opt("background-color", styles.background_color.as_deref());
    ctx.add_line(&format!(r#"<body style="{}">"#, escape_html(&body_style.render())));
    ctx.indent();

    if let Some(preheader) = &styles.preheader {
        ctx.add_line(&format!(
            r#"<div style="display:none;font-size:1px;line-height:1px;max-height:0;max-width:0;opacity:0;overflow:hidden;mso-hide:all">{}</div>"#,
            escape_html(preheader)
        ));
    }

    let mut outer_style = InlineStyle::new();
    outer_style.set_opt("background-color", styles.background_color.as_deref());
    ctx.add_line(&format!(
        r#"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0" style="{}">"#,
        escape_html(&outer_style.render())
    ));
    ctx.indent();
    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(r#"<td align="center" valign="top">"#);
    ctx.indent();

    ctx.add_line("<!--[if mso]>");
    ctx.add_line(&format!(
        r#"<table role="presentation" width="{}" align="center" cellpadding="0" cellspacing="0" border="0"><tr><td>"#,
        width
    ));
    ctx.add_line("<![endif]-->");

    let mut container_style = InlineStyle::new();
    container_style
        .set("width", "100%")
        .set("max-width", format!("{}px", width))
        .set("margin", "0 auto")
        .set_opt("background-color", styles.content_background_color.as_deref())
        .set_opt("font-family", styles.font_family.as_deref())
        .set_opt("color", styles.text_color.as_deref());
    ctx.add_line(&format!(
        r#"<table role="presentation" class="email-container" width="{}" align="center" cellpadding="0" cellspacing="0" border="0" style="{}">"#,
        width,
        escape_html(&container_style.render())
    ));
    ctx.indent();

    for section in &template.sections {
        compile_section(section, ctx)?;
    }

    ctx.dedent();
    ctx.add_line("</table>");

    ctx.add_line("<!--[if mso]>");
    ctx.add_line("</td></tr></table>");
    ctx.add_line("<![endif]-->");

    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");
    ctx.dedent();
    ctx.add_line("</table>");

    ctx.dedent();
    ctx.add_line("</body>");
    Ok(())
}

fn compile_section(section: &Section, ctx: &mut Context) -> Result<(), CompileError> {
    let mut style = InlineStyle::new();
    style.record(&section.styles);
    let style_attr = if style.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_html(&style.render()))
    };

    ctx.add_line("<tr>");
    ctx.indent();
    ctx.add_line(&format!(
        r#"<td class="section" id="section-{}" valign="top"{}>"#,
        escape_html(&section.id),
        style_attr
    ));
    ctx.indent();
    ctx.add_line(r#"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0">"#);
    ctx.indent();

    for element in &section.elements {
        compile_element(element, ctx)?;
    }

    ctx.dedent();
    ctx.add_line("</table>");
    ctx.dedent();
    ctx.add_line("</td>");
    ctx.dedent();
    ctx.add_line("</tr>");

    Ok(())
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
