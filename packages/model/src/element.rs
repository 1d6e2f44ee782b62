//! # Elements
//!
//! An element is the smallest content unit of an email. Its shape is fixed by
//! its type tag: `properties` is a sum type with one variant per tag, so the
//! tag and the property record can never disagree.
//!
//! ## Wire shape
//!
//! ```json
//! {
//!   "id": "b1",
//!   "type": "button",
//!   "content": "Shop now",
//!   "layout": { "alignment": "center", "padding": "10px 24px", "margin": null },
//!   "properties": { "href": "#", "fullWidth": false, "button": { ... } }
//! }
//! ```

use crate::error::NormalizeError;
use crate::properties::*;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Closed set of element type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Header,
    Text,
    Button,
    Image,
    Divider,
    Spacer,
    Social,
    List,
    Quote,
    Code,
    Video,
    Menu,
    Footer,
    Hero,
    Testimonial,
    Product,
    Table,
    Logo,
    Icon,
    Html,
    Signature,
}

impl ElementType {
    pub const ALL: [ElementType; 21] = [
        ElementType::Header,
        ElementType::Text,
        ElementType::Button,
        ElementType::Image,
        ElementType::Divider,
        ElementType::Spacer,
        ElementType::Social,
        ElementType::List,
        ElementType::Quote,
        ElementType::Code,
        ElementType::Video,
        ElementType::Menu,
        ElementType::Footer,
        ElementType::Hero,
        ElementType::Testimonial,
        ElementType::Product,
        ElementType::Table,
        ElementType::Logo,
        ElementType::Icon,
        ElementType::Html,
        ElementType::Signature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Text => "text",
            Self::Button => "button",
            Self::Image => "image",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Social => "social",
            Self::List => "list",
            Self::Quote => "quote",
            Self::Code => "code",
            Self::Video => "video",
            Self::Menu => "menu",
            Self::Footer => "footer",
            Self::Hero => "hero",
            Self::Testimonial => "testimonial",
            Self::Product => "product",
            Self::Table => "table",
            Self::Logo => "logo",
            Self::Icon => "icon",
            Self::Html => "html",
            Self::Signature => "signature",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.as_str() == tag)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Type-agnostic placement of an element inside its section cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub alignment: Option<Alignment>,
    pub padding: Option<String>,
    pub margin: Option<String>,
}

impl Layout {
    pub fn for_type(ty: ElementType) -> Self {
        let alignment = match ty {
            ElementType::Button
            | ElementType::Image
            | ElementType::Social
            | ElementType::Video
            | ElementType::Menu
            | ElementType::Footer
            | ElementType::Hero
            | ElementType::Logo
            | ElementType::Icon => Alignment::Center,
            _ => Alignment::Left,
        };
        let padding = match ty {
            ElementType::Spacer | ElementType::Html => "0",
            ElementType::Hero => "0",
            _ => "10px 24px",
        };
        Self {
            alignment: Some(alignment),
            padding: Some(padding.to_string()),
            margin: None,
        }
    }
}

/// Type-specific property record, one variant per [`ElementType`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementProperties {
    Header(HeaderProperties),
    Text(TextProperties),
    Button(ButtonProperties),
    Image(ImageProperties),
    Divider(DividerProperties),
    Spacer(SpacerProperties),
    Social(SocialProperties),
    List(ListProperties),
    Quote(QuoteProperties),
    Code(CodeProperties),
    Video(VideoProperties),
    Menu(MenuProperties),
    Footer(FooterProperties),
    Hero(HeroProperties),
    Testimonial(TestimonialProperties),
    Product(ProductProperties),
    Table(TableProperties),
    Logo(LogoProperties),
    Icon(IconProperties),
    Html(HtmlProperties),
    Signature(SignatureProperties),
}

impl ElementProperties {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Header(_) => ElementType::Header,
            Self::Text(_) => ElementType::Text,
            Self::Button(_) => ElementType::Button,
            Self::Image(_) => ElementType::Image,
            Self::Divider(_) => ElementType::Divider,
            Self::Spacer(_) => ElementType::Spacer,
            Self::Social(_) => ElementType::Social,
            Self::List(_) => ElementType::List,
            Self::Quote(_) => ElementType::Quote,
            Self::Code(_) => ElementType::Code,
            Self::Video(_) => ElementType::Video,
            Self::Menu(_) => ElementType::Menu,
            Self::Footer(_) => ElementType::Footer,
            Self::Hero(_) => ElementType::Hero,
            Self::Testimonial(_) => ElementType::Testimonial,
            Self::Product(_) => ElementType::Product,
            Self::Table(_) => ElementType::Table,
            Self::Logo(_) => ElementType::Logo,
            Self::Icon(_) => ElementType::Icon,
            Self::Html(_) => ElementType::Html,
            Self::Signature(_) => ElementType::Signature,
        }
    }

    /// Fully populated default record for a type
    pub fn defaults(ty: ElementType) -> Self {
        match ty {
            ElementType::Header => Self::Header(HeaderProperties {
                level: 1,
                typography: Typography::heading(1),
            }),
            ElementType::Text => Self::Text(TextProperties {
                typography: Typography::body(),
            }),
            ElementType::Button => Self::Button(ButtonProperties {
                href: Some("#".to_string()),
                full_width: false,
                button: ButtonStyle::default(),
            }),
            ElementType::Image => Self::Image(ImageProperties {
                image: ImageSource::sized(Some(552)),
                alt: None,
                href: None,
                border: Border::none(),
            }),
            ElementType::Divider => Self::Divider(DividerProperties {
                width: Some("100%".to_string()),
                border: Border::solid("1px", "#e5e7eb"),
            }),
            ElementType::Spacer => Self::Spacer(SpacerProperties { height: 24 }),
            ElementType::Social => Self::Social(SocialProperties {
                links: Vec::new(),
                icon_size: 32,
                spacing: Some("8px".to_string()),
            }),
            ElementType::List => Self::List(ListProperties {
                items: Vec::new(),
                ordered: false,
                typography: Typography::body(),
            }),
            ElementType::Quote => Self::Quote(QuoteProperties {
                citation: None,
                typography: Typography {
                    font_size: Some("18px".to_string()),
                    ..Typography::body()
                },
                border: Border::solid("4px", "#d1d5db"),
            }),
            ElementType::Code => Self::Code(CodeProperties {
                background_color: Some("#f3f4f6".to_string()),
                typography: Typography::monospace(),
                border: Border {
                    radius: Some("4px".to_string()),
                    ..Border::none()
                },
            }),
            ElementType::Video => Self::Video(VideoProperties {
                thumbnail: ImageSource::sized(Some(552)),
                href: None,
                alt: None,
            }),
            ElementType::Menu => Self::Menu(MenuProperties {
                items: Vec::new(),
                separator: Some("|".to_string()),
                typography: Typography::sized("14px", "normal"),
            }),
            ElementType::Footer => Self::Footer(FooterProperties {
                company_name: None,
                address: None,
                unsubscribe_href: None,
                unsubscribe_text: Some("Unsubscribe".to_string()),
                typography: Typography::small(),
            }),
            ElementType::Hero => Self::Hero(HeroProperties {
                heading: None,
                background_image: None,
                background_color: Some("#111827".to_string()),
                cta_text: None,
                cta_href: None,
                heading_typography: Typography {
                    color: Some("#ffffff".to_string()),
                    ..Typography::heading(1)
                },
                typography: Typography {
                    color: Some("#e5e7eb".to_string()),
                    ..Typography::body()
                },
                button: ButtonStyle::default(),
            }),
            ElementType::Testimonial => Self::Testimonial(TestimonialProperties {
                author: None,
                role: None,
                avatar: ImageSource::sized(Some(48)),
                typography: Typography::body(),
            }),
            ElementType::Product => Self::Product(ProductProperties {
                title: None,
                price: None,
                image: ImageSource::sized(Some(264)),
                cta_text: Some("Buy now".to_string()),
                cta_href: None,
                typography: Typography::body(),
                button: ButtonStyle::default(),
            }),
            ElementType::Table => Self::Table(TableProperties {
                rows: Vec::new(),
                header_row: true,
                cell_padding: Some("8px".to_string()),
                typography: Typography::sized("14px", "normal"),
                border: Border::solid("1px", "#e5e7eb"),
            }),
            ElementType::Logo => Self::Logo(LogoProperties {
                image: ImageSource::sized(Some(160)),
                alt: None,
                href: None,
            }),
            ElementType::Icon => Self::Icon(IconProperties {
                image: ImageSource::sized(Some(32)),
                alt: None,
                href: None,
            }),
            ElementType::Html => Self::Html(HtmlProperties { html: None }),
            ElementType::Signature => Self::Signature(SignatureProperties {
                name: None,
                title: None,
                company: None,
                avatar: ImageSource::sized(Some(64)),
                typography: Typography::sized("14px", "normal"),
            }),
        }
    }

    /// Decode a complete property record for the given type
    pub fn from_value(ty: ElementType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match ty {
            ElementType::Header => Self::Header(serde_json::from_value(value)?),
            ElementType::Text => Self::Text(serde_json::from_value(value)?),
            ElementType::Button => Self::Button(serde_json::from_value(value)?),
            ElementType::Image => Self::Image(serde_json::from_value(value)?),
            ElementType::Divider => Self::Divider(serde_json::from_value(value)?),
            ElementType::Spacer => Self::Spacer(serde_json::from_value(value)?),
            ElementType::Social => Self::Social(serde_json::from_value(value)?),
            ElementType::List => Self::List(serde_json::from_value(value)?),
            ElementType::Quote => Self::Quote(serde_json::from_value(value)?),
            ElementType::Code => Self::Code(serde_json::from_value(value)?),
            ElementType::Video => Self::Video(serde_json::from_value(value)?),
            ElementType::Menu => Self::Menu(serde_json::from_value(value)?),
            ElementType::Footer => Self::Footer(serde_json::from_value(value)?),
            ElementType::Hero => Self::Hero(serde_json::from_value(value)?),
            ElementType::Testimonial => Self::Testimonial(serde_json::from_value(value)?),
            ElementType::Product => Self::Product(serde_json::from_value(value)?),
            ElementType::Table => Self::Table(serde_json::from_value(value)?),
            ElementType::Logo => Self::Logo(serde_json::from_value(value)?),
            ElementType::Icon => Self::Icon(serde_json::from_value(value)?),
            ElementType::Html => Self::Html(serde_json::from_value(value)?),
            ElementType::Signature => Self::Signature(serde_json::from_value(value)?),
        })
    }

    /// The alt-text slot mirrored by an element's `content`, if the type has one
    pub(crate) fn alt_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::Image(props) => Some(&mut props.alt),
            Self::Logo(props) => Some(&mut props.alt),
            Self::Icon(props) => Some(&mut props.alt),
            _ => None,
        }
    }
}

/// A single content unit of a section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireElement")]
pub struct Element {
    pub id: String,
    pub content: String,
    pub layout: Layout,
    pub properties: ElementProperties,
}

impl Element {
    /// Default instance of a type, populated from only an id and a tag
    pub fn new(id: impl Into<String>, ty: ElementType) -> Self {
        Self {
            id: id.into(),
            content: String::new(),
            layout: Layout::for_type(ty),
            properties: ElementProperties::defaults(ty),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.properties.element_type()
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Element", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", &self.element_type())?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("layout", &self.layout)?;
        state.serialize_field("properties", &self.properties)?;
        state.end()
    }
}

/// Strict wire form of an already-normalized element
#[derive(Deserialize)]
struct WireElement {
    id: String,
    #[serde(rename = "type")]
    element_type: ElementType,
    content: String,
    layout: Layout,
    properties: Value,
}

impl TryFrom<WireElement> for Element {
    type Error = NormalizeError;

    fn try_from(wire: WireElement) -> Result<Self, Self::Error> {
        let properties = ElementProperties::from_value(wire.element_type, wire.properties)
            .map_err(|e| NormalizeError::InvalidProperties {
                element_id: wire.id.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            id: wire.id,
            content: wire.content,
            layout: wire.layout,
            properties,
        })
    }
}
