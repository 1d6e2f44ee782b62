//! # Templates and Sections
//!
//! A template is exactly three levels deep: template → sections → elements.
//! Element ids are unique across the whole template, which lets the differ
//! and the patch engine address any element by id alone.

use crate::element::Element;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form, possibly nested style record (camelCase keys)
pub type StyleMap = Map<String, Value>;

/// Template-wide styling and renderer knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStyles {
    pub content_width: u32,
    pub background_color: Option<String>,
    pub content_background_color: Option<String>,
    pub font_family: Option<String>,
    pub text_color: Option<String>,
    pub link_color: Option<String>,
    pub preheader: Option<String>,
}

impl Default for GlobalStyles {
    fn default() -> Self {
        Self {
            content_width: 600,
            background_color: Some("#f4f4f5".to_string()),
            content_background_color: Some("#ffffff".to_string()),
            font_family: Some("Arial, Helvetica, sans-serif".to_string()),
            text_color: Some("#111827".to_string()),
            link_color: Some("#2563eb".to_string()),
            preheader: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub styles: StyleMap,
    pub elements: Vec<Element>,
}

impl Section {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            styles: StyleMap::new(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    fn position(&self, element_id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == element_id)
    }
}

/// A section's id and styles, without its elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFrame {
    pub id: String,
    pub styles: StyleMap,
}

/// Everything about a template except its elements: name, global styles
/// and the ordered section list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFrame {
    pub name: String,
    pub styles: GlobalStyles,
    pub sections: Vec<SectionFrame>,
}

/// Root email document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub version: u64,
    pub styles: GlobalStyles,
    pub sections: Vec<Section>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: 1,
            styles: GlobalStyles::default(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    /// Every element paired with its owning section id, in document order
    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.sections
            .iter()
            .flat_map(|s| s.elements.iter().map(move |e| (s.id.as_str(), e)))
    }

    pub fn element_count(&self) -> usize {
        self.sections.iter().map(|s| s.elements.len()).sum()
    }

    /// Find an element and the id of the section that holds it
    pub fn find_element(&self, element_id: &str) -> Option<(&str, &Element)> {
        self.elements().find(|(_, e)| e.id == element_id)
    }

    pub fn find_element_mut(&mut self, element_id: &str) -> Option<&mut Element> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.elements.iter_mut())
            .find(|e| e.id == element_id)
    }

    /// Detach an element from wherever it sits
    pub fn remove_element(&mut self, element_id: &str) -> Option<(String, Element)> {
        for section in &mut self.sections {
            if let Some(index) = section.position(element_id) {
                let element = section.elements.remove(index);
                return Some((section.id.clone(), element));
            }
        }
        None
    }

    /// Insert into a section directly after `after`, or first when `after` is `None`.
    ///
    /// An anchor that is not in the section appends instead. The element is
    /// handed back when the section does not exist.
    pub fn insert_element(
        &mut self,
        section_id: &str,
        after: Option<&str>,
        element: Element,
    ) -> Result<(), Element> {
        let Some(section) = self.section_mut(section_id) else {
            return Err(element);
        };

        let index = match after {
            None => 0,
            Some(anchor) => section
                .position(anchor)
                .map(|i| i + 1)
                .unwrap_or(section.elements.len()),
        };
        section.elements.insert(index, element);
        Ok(())
    }

    pub fn frame(&self) -> TemplateFrame {
        TemplateFrame {
            name: self.name.clone(),
            styles: self.styles.clone(),
            sections: self
                .sections
                .iter()
                .map(|s| SectionFrame {
                    id: s.id.clone(),
                    styles: s.styles.clone(),
                })
                .collect(),
        }
    }

    /// Take the frame's name, styles and section layout, keeping elements.
    ///
    /// Sections the frame does not list move to the end. With `prune`, the
    /// empty ones among them are dropped.
    pub fn apply_frame(&mut self, frame: &TemplateFrame, prune: bool) {
        let mut current = std::mem::take(&mut self.sections);
        let mut sections: Vec<Section> = frame
            .sections
            .iter()
            .map(|section_frame| {
                let elements = current
                    .iter()
                    .position(|s| s.id == section_frame.id)
                    .map(|i| current.remove(i).elements)
                    .unwrap_or_default();
                Section {
                    id: section_frame.id.clone(),
                    styles: section_frame.styles.clone(),
                    elements,
                }
            })
            .collect();
        sections.extend(current.into_iter().filter(|s| !prune || !s.elements.is_empty()));

        self.name = frame.name.clone();
        self.styles = frame.styles.clone();
        self.sections = sections;
    }

    /// Move an existing element so it sits after `after` in `section_id`.
    ///
    /// Leaves the element untouched when either the element or the section
    /// is missing, or when the anchor is named but absent from the section.
    pub fn place_element(&mut self, element_id: &str, section_id: &str, after: Option<&str>) -> bool {
        if after == Some(element_id) {
            return false;
        }
        let Some(target) = self.section(section_id) else {
            return false;
        };
        if let Some(anchor) = after {
            if target.position(anchor).is_none() {
                return false;
            }
        }

        match self.remove_element(element_id) {
            Some((_, element)) => self.insert_element(section_id, after, element).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;

    fn sample() -> Template {
        Template::new("t1", "Welcome")
            .with_section(
                Section::new("s1")
                    .with_element(Element::new("a", ElementType::Header))
                    .with_element(Element::new("b", ElementType::Text)),
            )
            .with_section(Section::new("s2").with_element(Element::new("c", ElementType::Button)))
    }

    fn ids(template: &Template, section_id: &str) -> Vec<String> {
        template
            .section(section_id)
            .unwrap()
            .elements
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }

    #[test]
    fn test_find_element_reports_owning_section() {
        let template = sample();
        let (section_id, element) = template.find_element("c").unwrap();
        assert_eq!(section_id, "s2");
        assert_eq!(element.element_type(), ElementType::Button);
        assert!(template.find_element("missing").is_none());
        assert_eq!(template.element_count(), 3);
    }

    #[test]
    fn test_insert_after_anchor_and_at_front() {
        let mut template = sample();
        template
            .insert_element("s1", Some("a"), Element::new("x", ElementType::Divider))
            .unwrap();
        template
            .insert_element("s1", None, Element::new("y", ElementType::Spacer))
            .unwrap();
        assert_eq!(ids(&template, "s1"), vec!["y", "a", "x", "b"]);
    }

    #[test]
    fn test_insert_into_missing_section_hands_element_back() {
        let mut template = sample();
        let rejected = template
            .insert_element("nope", None, Element::new("x", ElementType::Text))
            .unwrap_err();
        assert_eq!(rejected.id, "x");
    }

    #[test]
    fn test_place_element_moves_across_sections() {
        let mut template = sample();
        assert!(template.place_element("a", "s2", Some("c")));
        assert_eq!(ids(&template, "s1"), vec!["b"]);
        assert_eq!(ids(&template, "s2"), vec!["c", "a"]);

        // Unknown anchor leaves the element where it is
        assert!(!template.place_element("a", "s1", Some("ghost")));
        assert_eq!(ids(&template, "s2"), vec!["c", "a"]);
    }

    #[test]
    fn test_apply_frame_keeps_elements_and_prunes_unlisted() {
        let mut template = sample();
        let before = template.frame();

        let mut frame = before.clone();
        frame.name = "Renamed".to_string();
        frame.sections.reverse();
        frame.sections[0].styles.insert("padding".to_string(), "8px".into());
        frame.sections.push(SectionFrame {
            id: "s3".to_string(),
            styles: StyleMap::new(),
        });
        frame.sections.retain(|s| s.id != "s1");

        template.apply_frame(&frame, false);
        assert_eq!(template.name, "Renamed");
        let order: Vec<&str> = template.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["s2", "s3", "s1"]);
        assert_eq!(ids(&template, "s2"), vec!["c"]);
        assert_eq!(template.section("s2").unwrap().styles["padding"], "8px");

        template.apply_frame(&before, true);
        assert_eq!(template, sample());
    }
}
