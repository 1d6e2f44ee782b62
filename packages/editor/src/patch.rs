//! # Patch Engine
//!
//! Applies change records to a template, and reverts them.
//!
//! ## Apply
//!
//! Records are applied in creation order:
//!
//! - `add` inserts the new element after its anchor
//! - `edit` replaces the element, then moves it next to its anchor
//! - `delete` detaches the element
//!
//! ## Revert
//!
//! Revert runs in two phases. Records are first inverted in reverse creation
//! order (`add` detaches, `edit` restores the prior element in place,
//! `delete` reinserts into the original section). Restored elements are then
//! moved back to their original anchors in old-template order, so that every
//! anchor is already in place when an element is attached to it.
//!
//! A record that cannot be applied is skipped and reported, the rest of the
//! batch proceeds.

use crate::changes::{Change, ChangeRecord, PlacedElement, PriorElement};
use crate::errors::PatchError;
use mailforge_model::{Element, Template};
use serde::Serialize;
use tracing::warn;

/// A record the engine could not apply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub record_id: String,
    pub element_id: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: PatchError,
}

fn serialize_error<S: serde::Serializer>(error: &PatchError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl SkippedRecord {
    pub(crate) fn new(record: &ChangeRecord, error: PatchError) -> Self {
        warn!(
            record_id = %record.id,
            element_id = %record.element_id,
            change_type = ?record.change_type(),
            error = %error,
            "Skipping change record"
        );
        Self {
            record_id: record.id.clone(),
            element_id: record.element_id.clone(),
            error,
        }
    }
}

/// Apply records in order, returning the ones that were skipped
pub fn apply_records(template: &mut Template, records: &[ChangeRecord]) -> Vec<SkippedRecord> {
    records
        .iter()
        .filter_map(|record| apply_record(template, record).err().map(|e| SkippedRecord::new(record, e)))
        .collect()
}

/// Apply a single record
pub fn apply_record(template: &mut Template, record: &ChangeRecord) -> Result<(), PatchError> {
    match &record.change {
        Change::Add { new_content } => {
            if template.find_element(&new_content.element.id).is_some() {
                template.remove_element(&new_content.element.id);
            }
            insert(template, new_content).map_err(PatchError::TargetSectionMissing)
        }
        Change::Edit { new_content, .. } => {
            if template.section(&new_content.target_section_id).is_none() {
                return Err(PatchError::TargetSectionMissing(
                    new_content.target_section_id.clone(),
                ));
            }
            replace(template, &new_content.element)?;
            reposition(
                template,
                &new_content.element.id,
                &new_content.target_section_id,
                new_content.after.as_deref(),
            )
            .map_err(PatchError::TargetSectionMissing)
        }
        Change::Delete { old_content } => template
            .remove_element(&old_content.element.id)
            .map(|_| ())
            .ok_or_else(|| PatchError::ElementNotFound(old_content.element.id.clone())),
    }
}

/// Revert records that were previously applied, in two phases
pub fn revert_records(template: &mut Template, records: &[&ChangeRecord]) -> Vec<SkippedRecord> {
    let mut skipped = Vec::new();
    let mut restored: Vec<&PriorElement> = Vec::new();

    for record in records.iter().rev() {
        match invert(template, record) {
            Ok(Some(prior)) => restored.push(prior),
            Ok(None) => {}
            Err(e) => skipped.push(SkippedRecord::new(record, e)),
        }
    }

    restored.sort_by_key(|prior| prior.ordinal);
    for prior in restored {
        // Content is already restored; only placement is left.
        if let Err(section_id) = reposition(
            template,
            &prior.element.id,
            &prior.original_section_id,
            prior.after.as_deref(),
        ) {
            warn!(element_id = %prior.element.id, section_id = %section_id, "Restored element left unplaced");
        }
    }

    skipped
}

/// Revert one record on its own
pub fn revert_record(template: &mut Template, record: &ChangeRecord) -> Result<(), PatchError> {
    if let Some(prior) = invert(template, record)? {
        reposition(
            template,
            &prior.element.id,
            &prior.original_section_id,
            prior.after.as_deref(),
        )
        .map_err(PatchError::SectionMissing)?;
    }
    Ok(())
}

/// First revert phase. Returns the prior element when it still needs placing.
fn invert<'r>(template: &mut Template, record: &'r ChangeRecord) -> Result<Option<&'r PriorElement>, PatchError> {
    match &record.change {
        Change::Add { new_content } => template
            .remove_element(&new_content.element.id)
            .map(|_| None)
            .ok_or_else(|| PatchError::ElementNotFound(new_content.element.id.clone())),
        Change::Edit { old_content, .. } => {
            replace(template, &old_content.element)?;
            if template.section(&old_content.original_section_id).is_none() {
                return Err(PatchError::SectionMissing(old_content.original_section_id.clone()));
            }
            Ok(Some(old_content))
        }
        Change::Delete { old_content } => {
            if template.find_element(&old_content.element.id).is_some() {
                template.remove_element(&old_content.element.id);
            }
            template
                .insert_element(
                    &old_content.original_section_id,
                    old_content.after.as_deref(),
                    old_content.element.clone(),
                )
                .map_err(|_| PatchError::SectionMissing(old_content.original_section_id.clone()))?;
            Ok(Some(old_content))
        }
    }
}

fn insert(template: &mut Template, placed: &PlacedElement) -> Result<(), String> {
    template
        .insert_element(
            &placed.target_section_id,
            placed.after.as_deref(),
            placed.element.clone(),
        )
        .map_err(|_| placed.target_section_id.clone())
}

/// Overwrite an element in place
fn replace(template: &mut Template, element: &Element) -> Result<(), PatchError> {
    let slot = template
        .find_element_mut(&element.id)
        .ok_or_else(|| PatchError::ElementNotFound(element.id.clone()))?;
    *slot = element.clone();
    Ok(())
}

/// Move an element next to its anchor; a vanished anchor appends instead.
///
/// Fails with the section id when the section does not exist.
fn reposition(template: &mut Template, element_id: &str, section_id: &str, after: Option<&str>) -> Result<(), String> {
    if template.section(section_id).is_none() {
        return Err(section_id.to_string());
    }
    if template.place_element(element_id, section_id, after) {
        return Ok(());
    }
    if let Some((_, element)) = template.remove_element(element_id) {
        // Anchor is gone; insert_element appends in that case.
        template
            .insert_element(section_id, after, element)
            .map_err(|_| section_id.to_string())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::diff;
    use mailforge_model::{ElementType, Section};

    fn base() -> Template {
        Template::new("t", "Test")
            .with_section(
                Section::new("s1")
                    .with_element(Element::new("h", ElementType::Header).with_content("Hello"))
                    .with_element(Element::new("p", ElementType::Text).with_content("Body")),
            )
            .with_section(Section::new("s2").with_element(Element::new("b", ElementType::Button)))
    }

    fn ids(template: &Template) -> Vec<(String, String)> {
        template
            .elements()
            .map(|(s, e)| (s.to_string(), e.id.clone()))
            .collect()
    }

    #[test]
    fn test_apply_reconstructs_target() {
        let old = base();
        let mut new = base();
        new.find_element_mut("h").unwrap().content = "Welcome".to_string();
        new.remove_element("p");
        new.insert_element("s2", None, Element::new("d", ElementType::Divider)).unwrap();
        new.place_element("h", "s2", Some("b"));

        let records = diff(Some(&old), &new);
        let mut patched = old.clone();
        let skipped = apply_records(&mut patched, &records);

        assert!(skipped.is_empty());
        assert_eq!(patched, new);
    }

    #[test]
    fn test_revert_restores_original_order() {
        let old = base();
        let mut new = base();
        new.place_element("p", "s1", None);
        new.remove_element("b");
        new.insert_element("s2", None, Element::new("x", ElementType::Spacer)).unwrap();

        let records = diff(Some(&old), &new);
        let mut patched = old.clone();
        apply_records(&mut patched, &records);
        assert_eq!(patched, new);

        let refs: Vec<&ChangeRecord> = records.iter().collect();
        let skipped = revert_records(&mut patched, &refs);
        assert!(skipped.is_empty());
        assert_eq!(patched, old);
    }

    #[test]
    fn test_add_into_missing_section_is_skipped() {
        let new = base().with_section(Section::new("s3").with_element(Element::new("z", ElementType::Text)));
        let records = diff(Some(&base()), &new);

        let mut patched = base();
        let skipped = apply_records(&mut patched, &records);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].element_id, "z");
        assert_eq!(skipped[0].error, PatchError::TargetSectionMissing("s3".to_string()));
        assert_eq!(patched, base());
    }

    #[test]
    fn test_revert_delete_into_vanished_section() {
        let old = base();
        let mut new = base();
        new.remove_element("b");
        let records = diff(Some(&old), &new);

        let mut patched = old.clone();
        apply_records(&mut patched, &records);
        patched.sections.retain(|s| s.id != "s2");

        let result = revert_record(&mut patched, &records[0]);
        assert_eq!(result, Err(PatchError::SectionMissing("s2".to_string())));
        assert!(patched.find_element("b").is_none());
    }

    #[test]
    fn test_revert_single_edit_restores_content() {
        let old = base();
        let mut new = base();
        new.find_element_mut("p").unwrap().content = "Rewritten".to_string();
        let records = diff(Some(&old), &new);

        let mut patched = new.clone();
        revert_record(&mut patched, &records[0]).unwrap();
        assert_eq!(patched, old);
        assert_eq!(ids(&patched), ids(&old));
    }

    #[test]
    fn test_revert_records_reports_edit_whose_section_vanished() {
        let old = base();
        let mut new = base();
        new.find_element_mut("h").unwrap().content = "Welcome".to_string();
        new.place_element("h", "s2", None);
        let records = diff(Some(&old), &new);

        let mut patched = old.clone();
        apply_records(&mut patched, &records);
        patched.sections.retain(|s| s.id != "s1");

        let refs: Vec<&ChangeRecord> = records.iter().filter(|r| r.element_id == "h").collect();
        let skipped = revert_records(&mut patched, &refs);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].error, PatchError::SectionMissing("s1".to_string()));
        // Content came back even though placement could not
        let (section_id, element) = patched.find_element("h").unwrap();
        assert_eq!((section_id, element.content.as_str()), ("s2", "Hello"));
    }
}
