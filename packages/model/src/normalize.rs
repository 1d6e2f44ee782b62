//! # Normalizer
//!
//! Turns loosely-shaped wire input into the fully-populated typed model.
//!
//! Every trust boundary (ingesting a candidate draft, before diffing, before
//! generating HTML) goes through this pass, so two documents that differ
//! only by "explicit null vs. omitted key" end up structurally identical.
//!
//! ## Merge rule
//!
//! Type defaults are deep-merged under the caller's values. A caller leaf
//! wins unless it is `null`; `null` and a missing key both fall back to the
//! default. Arrays are leaves. A header's typography defaults follow the
//! caller's `level`.
//!
//! Normalization is idempotent: `normalize(normalize(x)) == normalize(x)`.

use crate::element::{Element, ElementProperties, ElementType, Layout};
use crate::error::{NormalizeError, NormalizeResult};
use crate::properties::Typography;
use crate::template::{GlobalStyles, Section, StyleMap, Template};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, instrument};

pub const DEFAULT_TEMPLATE_NAME: &str = "Untitled template";

/// Types that can be re-normalized after they have been edited in memory
pub trait Normalize: Sized {
    fn normalize(&self) -> NormalizeResult<Self>;
}

impl Normalize for Element {
    fn normalize(&self) -> NormalizeResult<Self> {
        normalize_element(&to_wire(self)?)
    }
}

impl Normalize for Template {
    fn normalize(&self) -> NormalizeResult<Self> {
        normalize_template(&to_wire(self)?)
    }
}

fn to_wire<T: serde::Serialize>(value: &T) -> NormalizeResult<Value> {
    serde_json::to_value(value).map_err(|e| NormalizeError::InvalidStructure(e.to_string()))
}

/// Normalize a single wire-shaped element
pub fn normalize_element(raw: &Value) -> NormalizeResult<Element> {
    let object = raw
        .as_object()
        .ok_or_else(|| NormalizeError::InvalidStructure("element must be an object".to_string()))?;

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(NormalizeError::MissingIdentity("id")),
    };

    let ty = match object.get("type") {
        Some(Value::String(tag)) => ElementType::from_tag(tag)
            .ok_or_else(|| NormalizeError::UnknownElementType(tag.clone()))?,
        _ => return Err(NormalizeError::MissingIdentity("type")),
    };

    let content = match object.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(content)) => content.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(NormalizeError::InvalidStructure(format!(
                "content of element '{}' must be a string",
                id
            )))
        }
    };

    let layout_defaults = to_wire(&Layout::for_type(ty))?;
    let layout = merge_defaults(layout_defaults, object.get("layout").unwrap_or(&Value::Null));
    let layout: Layout = serde_json::from_value(layout).map_err(|e| invalid_properties(&id, e))?;

    let raw_properties = object.get("properties").unwrap_or(&Value::Null);
    let property_defaults = to_wire(&property_defaults(ty, raw_properties))?;
    let properties = merge_defaults(property_defaults, raw_properties);
    let properties =
        ElementProperties::from_value(ty, properties).map_err(|e| invalid_properties(&id, e))?;

    let mut element = Element {
        id,
        content,
        layout,
        properties,
    };
    sync_content(&mut element);

    Ok(element)
}

fn property_defaults(ty: ElementType, raw_properties: &Value) -> ElementProperties {
    let mut defaults = ElementProperties::defaults(ty);
    if let ElementProperties::Header(header) = &mut defaults {
        let level = raw_properties.get("level").and_then(Value::as_u64);
        if let Some(level) = level.filter(|l| (1..=6).contains(l)) {
            header.level = level as u8;
            header.typography = Typography::heading(header.level);
        }
    }
    defaults
}

/// Normalize a wire-shaped template, including every element of every section
#[instrument(skip_all)]
pub fn normalize_template(raw: &Value) -> NormalizeResult<Template> {
    let object = raw
        .as_object()
        .ok_or_else(|| NormalizeError::InvalidStructure("template must be an object".to_string()))?;

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(NormalizeError::InvalidStructure("template is missing its id".to_string())),
    };

    let name = match object.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => DEFAULT_TEMPLATE_NAME.to_string(),
    };

    let version = object.get("version").and_then(Value::as_u64).unwrap_or(1);

    let style_defaults = to_wire(&GlobalStyles::default())?;
    let styles = merge_defaults(style_defaults, object.get("styles").unwrap_or(&Value::Null));
    let styles: GlobalStyles = serde_json::from_value(styles)
        .map_err(|e| NormalizeError::InvalidStructure(format!("template styles: {}", e)))?;

    let raw_sections = match object.get("sections") {
        Some(Value::Array(sections)) => sections,
        _ => {
            return Err(NormalizeError::InvalidStructure(
                "template sections must be a sequence".to_string(),
            ))
        }
    };

    let mut section_ids = HashSet::new();
    let mut element_ids = HashSet::new();
    let mut sections = Vec::with_capacity(raw_sections.len());

    for raw_section in raw_sections {
        let section = normalize_section(raw_section)?;

        if !section_ids.insert(section.id.clone()) {
            return Err(NormalizeError::InvalidStructure(format!(
                "duplicate section id '{}'",
                section.id
            )));
        }
        for element in &section.elements {
            if !element_ids.insert(element.id.clone()) {
                return Err(NormalizeError::DuplicateElementId(element.id.clone()));
            }
        }

        sections.push(section);
    }

    debug!(
        template_id = %id,
        sections = sections.len(),
        elements = element_ids.len(),
        "Template normalized"
    );

    Ok(Template {
        id,
        name,
        version,
        styles,
        sections,
    })
}

fn normalize_section(raw: &Value) -> NormalizeResult<Section> {
    let object = raw
        .as_object()
        .ok_or_else(|| NormalizeError::InvalidStructure("section must be an object".to_string()))?;

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(NormalizeError::InvalidStructure("section is missing its id".to_string())),
    };

    let styles = match object.get("styles") {
        None | Some(Value::Null) => StyleMap::new(),
        Some(Value::Object(styles)) => strip_nulls(styles),
        Some(_) => {
            return Err(NormalizeError::InvalidStructure(format!(
                "styles of section '{}' must be an object",
                id
            )))
        }
    };

    let elements = match object.get("elements") {
        Some(Value::Array(elements)) => elements
            .iter()
            .map(normalize_element)
            .collect::<NormalizeResult<Vec<_>>>()?,
        _ => {
            return Err(NormalizeError::InvalidStructure(format!(
                "elements of section '{}' must be a sequence",
                id
            )))
        }
    };

    Ok(Section { id, styles, elements })
}

/// Deep-merge `overrides` on top of `defaults`
pub fn merge_defaults(defaults: Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (defaults, Value::Null) => defaults,
        (Value::Object(mut defaults), Value::Object(overrides)) => {
            for (key, value) in overrides {
                let merged = match defaults.remove(key) {
                    Some(default) => merge_defaults(default, value),
                    None => value.clone(),
                };
                defaults.insert(key.clone(), merged);
            }
            Value::Object(defaults)
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Section styles have no schema; dropping null leaves is what makes an
/// explicit null equal to an omitted key there.
fn strip_nulls(styles: &Map<String, Value>) -> Map<String, Value> {
    styles
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::Object(nested) => Some((key.clone(), Value::Object(strip_nulls(nested)))),
            other => Some((key.clone(), other.clone())),
        })
        .collect()
}

/// Keep `content` and the alt-text property of image-like elements in step
fn sync_content(element: &mut Element) {
    let Element {
        content, properties, ..
    } = element;

    if let Some(alt) = properties.alt_mut() {
        let alt_text = alt.as_deref().unwrap_or("");
        if content.is_empty() && !alt_text.is_empty() {
            *content = alt_text.to_string();
        } else if alt_text.is_empty() && !content.is_empty() {
            *alt = Some(content.clone());
        }
    }
}

fn invalid_properties(element_id: &str, error: serde_json::Error) -> NormalizeError {
    NormalizeError::InvalidProperties {
        element_id: element_id.to_string(),
        message: error.to_string(),
    }
}
