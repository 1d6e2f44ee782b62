//! # Element Property Schemas
//!
//! One record per element type. Every field is always present on the wire:
//! optional values serialize as an explicit `null` rather than being skipped,
//! so two normalized elements of the same type always have the same key set.
//!
//! Shared sub-records (`Typography`, `Border`, `ButtonStyle`, `ImageSource`)
//! are nested under the type records and flattened to inline CSS by the
//! HTML compiler.

use serde::{Deserialize, Serialize};

/// Font and colour settings for a run of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub line_height: Option<String>,
    pub color: Option<String>,
    pub letter_spacing: Option<String>,
    pub text_transform: Option<String>,
}

impl Typography {
    pub fn body() -> Self {
        Self {
            font_family: None,
            font_size: Some("16px".to_string()),
            font_weight: Some("normal".to_string()),
            line_height: Some("1.5".to_string()),
            color: None,
            letter_spacing: None,
            text_transform: None,
        }
    }

    pub fn sized(font_size: &str, font_weight: &str) -> Self {
        Self {
            font_size: Some(font_size.to_string()),
            font_weight: Some(font_weight.to_string()),
            ..Self::body()
        }
    }

    pub fn heading(level: u8) -> Self {
        let size = match level {
            1 => "32px",
            2 => "26px",
            3 => "22px",
            4 => "18px",
            5 => "16px",
            _ => "14px",
        };
        Self {
            line_height: Some("1.25".to_string()),
            ..Self::sized(size, "bold")
        }
    }

    pub fn monospace() -> Self {
        Self {
            font_family: Some("Menlo, Consolas, 'Courier New', monospace".to_string()),
            ..Self::sized("14px", "normal")
        }
    }

    pub fn small() -> Self {
        Self {
            color: Some("#6b7280".to_string()),
            ..Self::sized("12px", "normal")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub width: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub radius: Option<String>,
}

impl Border {
    pub fn none() -> Self {
        Self {
            width: None,
            style: None,
            color: None,
            radius: None,
        }
    }

    pub fn solid(width: &str, color: &str) -> Self {
        Self {
            width: Some(width.to_string()),
            style: Some("solid".to_string()),
            color: Some(color.to_string()),
            radius: None,
        }
    }
}

/// Visual treatment of a call-to-action button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonStyle {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub border_radius: Option<String>,
    pub padding: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub border: Border,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            background_color: Some("#2563eb".to_string()),
            text_color: Some("#ffffff".to_string()),
            border_radius: Some("4px".to_string()),
            padding: Some("12px 24px".to_string()),
            font_size: Some("16px".to_string()),
            font_weight: Some("bold".to_string()),
            border: Border::none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub src: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageSource {
    pub fn sized(width: Option<u32>) -> Self {
        Self {
            src: None,
            width,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub icon_src: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub label: Option<String>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderProperties {
    pub level: u8,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProperties {
    pub href: Option<String>,
    pub full_width: bool,
    pub button: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub image: ImageSource,
    pub alt: Option<String>,
    pub href: Option<String>,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividerProperties {
    pub width: Option<String>,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacerProperties {
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProperties {
    pub links: Vec<SocialLink>,
    pub icon_size: u32,
    pub spacing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProperties {
    pub items: Vec<String>,
    pub ordered: bool,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteProperties {
    pub citation: Option<String>,
    pub typography: Typography,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeProperties {
    pub background_color: Option<String>,
    pub typography: Typography,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProperties {
    pub thumbnail: ImageSource,
    pub href: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuProperties {
    pub items: Vec<MenuItem>,
    pub separator: Option<String>,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterProperties {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub unsubscribe_href: Option<String>,
    pub unsubscribe_text: Option<String>,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroProperties {
    pub heading: Option<String>,
    pub background_image: Option<String>,
    pub background_color: Option<String>,
    pub cta_text: Option<String>,
    pub cta_href: Option<String>,
    pub heading_typography: Typography,
    pub typography: Typography,
    pub button: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialProperties {
    pub author: Option<String>,
    pub role: Option<String>,
    pub avatar: ImageSource,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProperties {
    pub title: Option<String>,
    pub price: Option<String>,
    pub image: ImageSource,
    pub cta_text: Option<String>,
    pub cta_href: Option<String>,
    pub typography: Typography,
    pub button: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProperties {
    pub rows: Vec<Vec<String>>,
    pub header_row: bool,
    pub cell_padding: Option<String>,
    pub typography: Typography,
    pub border: Border,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoProperties {
    pub image: ImageSource,
    pub alt: Option<String>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconProperties {
    pub image: ImageSource,
    pub alt: Option<String>,
    pub href: Option<String>,
}

/// Raw markup block, passed through verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlProperties {
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureProperties {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub avatar: ImageSource,
    pub typography: Typography,
}
