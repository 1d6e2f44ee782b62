//! # Template Differ
//!
//! Identity-keyed structural diff between two normalized templates.
//!
//! Element ids are unique across the whole template, so both sides are
//! flattened into an `id → slot` index and compared by id alone. An element
//! present on both sides is reported as an `edit` when any of these hold:
//!
//! - the element itself differs (content, type, layout or any property leaf)
//! - its owning section changed
//! - its rank among the elements both sides keep in that section changed
//!
//! Records come out as adds/edits in new-template order, then deletes in
//! old-template order.

use crate::changes::{Change, ChangeRecord, PlacedElement, PriorElement};
use mailforge_model::{Element, Template};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Where an element sits in one side of the diff
struct Slot<'a> {
    element: &'a Element,
    section_id: &'a str,
    after: Option<&'a str>,
    ordinal: usize,
    /// Rank among the elements that stay in this section on both sides
    rank: Option<usize>,
}

type Index<'a> = HashMap<&'a str, Slot<'a>>;

fn index(template: &Template) -> Index<'_> {
    let mut slots = HashMap::with_capacity(template.element_count());
    let mut ordinal = 0;
    for section in &template.sections {
        let mut after = None;
        for element in &section.elements {
            slots.insert(
                element.id.as_str(),
                Slot {
                    element,
                    section_id: section.id.as_str(),
                    after,
                    ordinal,
                    rank: None,
                },
            );
            after = Some(element.id.as_str());
            ordinal += 1;
        }
    }
    slots
}

/// Rank the elements of `own` that `other` keeps in the same section
fn rank_retained(own_template: &Template, own: &mut Index<'_>, other: &Index<'_>) {
    for section in &own_template.sections {
        let mut rank = 0;
        for element in &section.elements {
            let retained = other
                .get(element.id.as_str())
                .is_some_and(|slot| slot.section_id == section.id);
            if retained {
                if let Some(slot) = own.get_mut(element.id.as_str()) {
                    slot.rank = Some(rank);
                }
                rank += 1;
            }
        }
    }
}

fn placed(slot: &Slot<'_>) -> PlacedElement {
    PlacedElement {
        element: slot.element.clone(),
        target_section_id: slot.section_id.to_string(),
        after: slot.after.map(str::to_string),
    }
}

fn prior(slot: &Slot<'_>) -> PriorElement {
    PriorElement {
        element: slot.element.clone(),
        original_section_id: slot.section_id.to_string(),
        after: slot.after.map(str::to_string),
        ordinal: slot.ordinal,
    }
}

/// Compute the change records that turn `old` into `new`.
///
/// A missing `old` models a first draft: every element of `new` is an add.
#[instrument(skip_all, fields(template_id = %new.id))]
pub fn diff(old: Option<&Template>, new: &Template) -> Vec<ChangeRecord> {
    let empty = Template::new(new.id.clone(), new.name.clone());
    let old = old.unwrap_or(&empty);

    let mut old_index = index(old);
    let mut new_index = index(new);
    rank_retained(old, &mut old_index, &new_index);
    rank_retained(new, &mut new_index, &old_index);

    let mut records = Vec::new();

    for (_, element) in new.elements() {
        let Some(slot) = new_index.get(element.id.as_str()) else {
            continue;
        };
        let change = match old_index.get(element.id.as_str()) {
            None => Change::Add {
                new_content: placed(slot),
            },
            Some(previous) => {
                let changed = previous.element != slot.element
                    || previous.section_id != slot.section_id
                    || previous.rank != slot.rank;
                if !changed {
                    continue;
                }
                Change::Edit {
                    old_content: prior(previous),
                    new_content: placed(slot),
                }
            }
        };
        records.push((element.id.clone(), change));
    }

    for (_, element) in old.elements() {
        if new_index.contains_key(element.id.as_str()) {
            continue;
        }
        if let Some(slot) = old_index.get(element.id.as_str()) {
            records.push((
                element.id.clone(),
                Change::Delete {
                    old_content: prior(slot),
                },
            ));
        }
    }

    let records: Vec<ChangeRecord> = records
        .into_iter()
        .enumerate()
        .map(|(i, (element_id, change))| ChangeRecord::new(format!("change-{}", i), element_id, change))
        .collect();

    debug!(
        records = records.len(),
        old_elements = old.element_count(),
        new_elements = new.element_count(),
        "Diff computed"
    );
    records
}
