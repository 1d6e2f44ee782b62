//! Inline style flattening.
//!
//! Email clients strip `<style>` blocks unpredictably, so every visual
//! property ends up in a `style="..."` attribute. Records are camelCase
//! objects, possibly nested (`{ "border": { "top": "1px solid" } }`), and
//! flatten to kebab-case declarations (`border-top:1px solid`). Null leaves
//! are skipped.

use mailforge_model::properties::{Border, Typography};
use serde_json::{Map, Value};

/// Flatten a style record into an inline style string
pub fn inline_style(record: &Map<String, Value>) -> String {
    let mut style = InlineStyle::new();
    style.record(record);
    style.render()
}

/// `backgroundColor` → `background-color`
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Ordered list of CSS declarations; later writes to a property replace
/// the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.declarations.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((property.to_string(), value)),
        }
        self
    }

    pub fn set_opt(&mut self, property: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.set(property, value);
        }
        self
    }

    /// Copy every declaration of `other` over this style
    pub fn merge(&mut self, other: &InlineStyle) -> &mut Self {
        for (name, value) in &other.declarations {
            self.set(name, value.clone());
        }
        self
    }

    /// Flatten a free-form record into this style
    pub fn record(&mut self, record: &Map<String, Value>) -> &mut Self {
        self.flatten(None, record);
        self
    }

    fn flatten(&mut self, prefix: Option<&str>, record: &Map<String, Value>) {
        for (key, value) in record {
            let name = match prefix {
                Some(prefix) => format!("{}-{}", prefix, to_kebab_case(key)),
                None => to_kebab_case(key),
            };
            match value {
                Value::Null | Value::Array(_) => {}
                Value::Object(nested) => self.flatten(Some(&name), nested),
                Value::String(s) => {
                    self.set(&name, s.as_str());
                }
                Value::Number(n) => {
                    self.set(&name, n.to_string());
                }
                Value::Bool(b) => {
                    self.set(&name, b.to_string());
                }
            }
        }
    }

    pub fn typography(&mut self, typography: &Typography) -> &mut Self {
        if let Ok(Value::Object(record)) = serde_json::to_value(typography) {
            self.record(&record);
        }
        self
    }

    /// Border shorthand for all sides, or one side when `side` is given
    pub fn border(&mut self, border: &Border, side: Option<&str>) -> &mut Self {
        let property = match side {
            Some(side) => format!("border-{}", side),
            None => "border".to_string(),
        };
        if let (Some(width), Some(color)) = (&border.width, &border.color) {
            let style = border.style.as_deref().unwrap_or("solid");
            self.set(&property, format!("{} {} {}", width, style, color));
        }
        self.set_opt("border-radius", border.radius.as_deref());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn render(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("backgroundColor"), "background-color");
        assert_eq!(to_kebab_case("msoLineHeightRule"), "mso-line-height-rule");
        assert_eq!(to_kebab_case("padding"), "padding");
        assert_eq!(to_kebab_case("font_size"), "font-size");
    }

    #[test]
    fn test_flatten_skips_nulls_and_nests() {
        let record = json!({
            "backgroundColor": "#fff",
            "color": null,
            "border": { "top": "1px solid #000", "bottom": null },
            "opacity": 1
        });
        let style = inline_style(record.as_object().unwrap());
        assert_eq!(
            style,
            "background-color:#fff;border-top:1px solid #000;opacity:1"
        );
    }

    #[test]
    fn test_later_values_replace_earlier_ones() {
        let mut style = InlineStyle::new();
        style.set("color", "red").set("margin", "0").set("color", "blue");
        assert_eq!(style.render(), "color:blue;margin:0");
    }

    #[test]
    fn test_typography_flattens_to_css_names() {
        let mut style = InlineStyle::new();
        style.typography(&Typography::heading(2));
        let css = style.render();
        assert!(css.contains("font-size:26px"));
        assert!(css.contains("font-weight:bold"));
        assert!(!css.contains("font-family"));
    }

    #[test]
    fn test_border_requires_width_and_color() {
        let mut style = InlineStyle::new();
        style.border(&Border::none(), None);
        assert!(style.is_empty());

        style.border(&Border::solid("4px", "#ccc"), Some("left"));
        assert_eq!(style.render(), "border-left:4px solid #ccc");
    }
}
