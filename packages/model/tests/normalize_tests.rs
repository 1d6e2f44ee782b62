//! Normalization properties over whole templates

use mailforge_model::{normalize_template, Element, ElementProperties, ElementType, Normalize, Section, Template};
use serde_json::json;

fn partial_draft() -> serde_json::Value {
    json!({
        "id": "welcome",
        "name": "Welcome email",
        "styles": { "contentWidth": 640, "linkColor": null },
        "sections": [
            {
                "id": "top",
                "styles": { "backgroundColor": "#111827", "padding": "24px" },
                "elements": [
                    { "id": "logo", "type": "logo", "properties": { "image": { "src": "https://x.com/logo.png" } } },
                    { "id": "h1", "type": "header", "content": "Hello!", "properties": { "level": 2 } }
                ]
            },
            {
                "id": "body",
                "elements": [
                    { "id": "t1", "type": "text", "content": "Thanks for joining." },
                    { "id": "b1", "type": "button", "content": "Get started", "properties": { "href": null } },
                    { "id": "sp", "type": "spacer", "layout": null },
                    { "id": "l1", "type": "list", "properties": { "items": ["One", "Two"], "ordered": true } }
                ]
            }
        ]
    })
}

#[test]
fn test_normalize_is_idempotent() {
    let once = normalize_template(&partial_draft()).unwrap();
    let twice = once.normalize().unwrap();
    assert_eq!(once, twice);

    let once_json = serde_json::to_string(&once).unwrap();
    let twice_json = serde_json::to_string(&twice).unwrap();
    assert_eq!(once_json, twice_json);
}

#[test]
fn test_normalized_builder_template_is_a_fixed_point() {
    let template = Template::new("t", "Built in code")
        .with_section(
            Section::new("s1")
                .with_element(Element::new("a", ElementType::Hero).with_content("Big news"))
                .with_element(Element::new("b", ElementType::Table)),
        )
        .with_section(Section::new("s2").with_element(Element::new("c", ElementType::Footer)));

    assert_eq!(template.normalize().unwrap(), template);
}

#[test]
fn test_every_type_normalizes_from_id_and_tag_alone() {
    for ty in ElementType::ALL {
        let raw = json!({
            "id": "t",
            "sections": [{ "id": "s", "elements": [{ "id": "e", "type": ty.as_str() }] }]
        });
        let template = normalize_template(&raw).unwrap();
        let (_, element) = template.find_element("e").unwrap();
        assert_eq!(element, &Element::new("e", ty));
    }
}

#[test]
fn test_global_style_overrides_merge_with_defaults() {
    let template = normalize_template(&partial_draft()).unwrap();
    assert_eq!(template.styles.content_width, 640);
    // null falls back to the default link colour
    assert_eq!(template.styles.link_color.as_deref(), Some("#2563eb"));
    assert_eq!(template.version, 1);
}

#[test]
fn test_every_property_key_is_present_after_normalization() {
    let template = normalize_template(&partial_draft()).unwrap();
    let value = serde_json::to_value(&template).unwrap();

    let button = &value["sections"][1]["elements"][1];
    assert_eq!(button["type"], "button");
    // href was explicitly null, which means "use the default"
    assert_eq!(button["properties"]["href"], "#");
    for key in ["backgroundColor", "textColor", "borderRadius", "padding", "fontSize", "fontWeight", "border"] {
        assert!(button["properties"]["button"].get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_header_size_follows_level() {
    let template = normalize_template(&partial_draft()).unwrap();
    let (_, header) = template.find_element("h1").unwrap();
    let ElementProperties::Header(props) = &header.properties else {
        panic!("expected header properties");
    };
    assert_eq!(props.level, 2);
    assert_eq!(props.typography.font_size.as_deref(), Some("26px"));

    // An explicit size still wins over the level
    let raw = json!({
        "id": "t",
        "sections": [{ "id": "s", "elements": [{
            "id": "h", "type": "header",
            "properties": { "level": 3, "typography": { "fontSize": "40px" } }
        }] }]
    });
    let template = normalize_template(&raw).unwrap();
    let (_, header) = template.find_element("h").unwrap();
    let ElementProperties::Header(props) = &header.properties else {
        panic!("expected header properties");
    };
    assert_eq!(props.typography.font_size.as_deref(), Some("40px"));
    assert_eq!(props.typography.line_height.as_deref(), Some("1.25"));
}
