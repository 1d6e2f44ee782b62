//! # Change Records and Batches
//!
//! A [`ChangeRecord`] describes how one element differs between two template
//! states. Records produced by one diff pass are grouped into a
//! [`ChangeBatch`] that is reviewed, and resolved, as a unit.
//!
//! ## Wire shape
//!
//! ```json
//! {
//!   "id": "6f1c…-0",
//!   "elementId": "h1",
//!   "changeType": "add",
//!   "oldContent": null,
//!   "newContent": { "id": "h1", "type": "header", …, "targetSectionId": "s1", "after": null },
//!   "status": "pending"
//! }
//! ```
//!
//! Records are immutable once created; only `status` moves.
//!
//! A batch also carries a [`FrameChange`] when the proposal renames or
//! restyles the template or changes its section list. That change has no
//! record of its own and is settled by the batch-level operations.

use mailforge_model::{Element, TemplateFrame};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// An element together with where it sits in the proposed template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedElement {
    #[serde(flatten)]
    pub element: Element,
    pub target_section_id: String,
    /// Preceding element in the section, `None` for the first slot
    pub after: Option<String>,
}

/// An element together with where it sat before the change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorElement {
    #[serde(flatten)]
    pub element: Element,
    pub original_section_id: String,
    pub after: Option<String>,
    /// Position in old-template traversal order
    pub ordinal: usize,
}

/// Payload of a record. On the wire the absent side is an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireChange", try_from = "WireChange")]
pub enum Change {
    Add { new_content: PlacedElement },
    Edit { old_content: PriorElement, new_content: PlacedElement },
    Delete { old_content: PriorElement },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireChange {
    change_type: ChangeType,
    old_content: Option<PriorElement>,
    new_content: Option<PlacedElement>,
}

impl From<Change> for WireChange {
    fn from(change: Change) -> Self {
        let change_type = change.change_type();
        let (old_content, new_content) = match change {
            Change::Add { new_content } => (None, Some(new_content)),
            Change::Edit { old_content, new_content } => (Some(old_content), Some(new_content)),
            Change::Delete { old_content } => (Some(old_content), None),
        };
        Self {
            change_type,
            old_content,
            new_content,
        }
    }
}

impl TryFrom<WireChange> for Change {
    type Error = String;

    fn try_from(wire: WireChange) -> Result<Self, Self::Error> {
        match (wire.change_type, wire.old_content, wire.new_content) {
            (ChangeType::Add, None, Some(new_content)) => Ok(Change::Add { new_content }),
            (ChangeType::Edit, Some(old_content), Some(new_content)) => Ok(Change::Edit { old_content, new_content }),
            (ChangeType::Delete, Some(old_content), None) => Ok(Change::Delete { old_content }),
            (change_type, old, new) => Err(format!(
                "{:?} record with oldContent {} and newContent {}",
                change_type,
                if old.is_some() { "set" } else { "null" },
                if new.is_some() { "set" } else { "null" },
            )),
        }
    }
}

impl Change {
    pub fn change_type(&self) -> ChangeType {
        match self {
            Change::Add { .. } => ChangeType::Add,
            Change::Edit { .. } => ChangeType::Edit,
            Change::Delete { .. } => ChangeType::Delete,
        }
    }

    pub fn old_content(&self) -> Option<&PriorElement> {
        match self {
            Change::Add { .. } => None,
            Change::Edit { old_content, .. } | Change::Delete { old_content } => Some(old_content),
        }
    }

    pub fn new_content(&self) -> Option<&PlacedElement> {
        match self {
            Change::Add { new_content } | Change::Edit { new_content, .. } => Some(new_content),
            Change::Delete { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: String,
    pub element_id: String,
    #[serde(flatten)]
    pub change: Change,
    pub status: ChangeStatus,
}

impl ChangeRecord {
    pub fn new(id: impl Into<String>, element_id: impl Into<String>, change: Change) -> Self {
        Self {
            id: id.into(),
            element_id: element_id.into(),
            change,
            status: ChangeStatus::Pending,
        }
    }

    pub fn change_type(&self) -> ChangeType {
        self.change.change_type()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}

/// Template-level part of a proposal: the frame before and after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameChange {
    pub old_frame: TemplateFrame,
    pub new_frame: TemplateFrame,
    pub status: ChangeStatus,
}

impl FrameChange {
    /// `None` when the frames are equal
    pub fn between(old_frame: TemplateFrame, new_frame: TemplateFrame) -> Option<Self> {
        (old_frame != new_frame).then_some(Self {
            old_frame,
            new_frame,
            status: ChangeStatus::Pending,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}

/// Records from one diff pass, resolved together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBatch {
    pub id: String,
    pub template_id: String,
    /// Optional description of this batch
    pub name: Option<String>,
    /// Template version the batch was diffed against
    pub base_version: u64,
    pub records: Vec<ChangeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameChange>,
}

impl ChangeBatch {
    /// Wrap diff output in a new batch; record ids become `<batchId>-<index>`
    pub fn new(template_id: impl Into<String>, base_version: u64, records: Vec<ChangeRecord>) -> Self {
        let id = Uuid::new_v4().to_string();
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| ChangeRecord {
                id: format!("{}-{}", id, i),
                ..record
            })
            .collect();

        Self {
            id,
            template_id: template_id.into(),
            name: None,
            base_version,
            records,
            frame: None,
        }
    }

    /// Attach the template-level part of the proposal
    pub fn with_frame(mut self, frame: Option<FrameChange>) -> Self {
        self.frame = frame;
        self
    }

    /// Add a description
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Batch id embedded in a record id
    pub fn batch_id_of(record_id: &str) -> Option<&str> {
        record_id.rsplit_once('-').map(|(batch_id, _)| batch_id)
    }

    pub fn record(&self, record_id: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.id == record_id)
    }

    pub fn record_mut(&mut self, record_id: &str) -> Option<&mut ChangeRecord> {
        self.records.iter_mut().find(|r| r.id == record_id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.is_pending())
    }

    /// A batch is open while any of its records, or its frame change,
    /// awaits review
    pub fn is_open(&self) -> bool {
        self.records.iter().any(ChangeRecord::is_pending) || self.frame.as_ref().is_some_and(FrameChange::is_pending)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.frame.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailforge_model::{ElementType, Template};
    use serde_json::json;

    fn add_record(element_id: &str) -> ChangeRecord {
        ChangeRecord::new(
            "change-0",
            element_id,
            Change::Add {
                new_content: PlacedElement {
                    element: Element::new(element_id, ElementType::Header),
                    target_section_id: "s1".to_string(),
                    after: None,
                },
            },
        )
    }

    #[test]
    fn test_batch_assigns_record_ids() {
        let batch = ChangeBatch::new("t1", 3, vec![add_record("a"), add_record("b")]);

        assert_eq!(batch.records[0].id, format!("{}-0", batch.id));
        assert_eq!(batch.records[1].id, format!("{}-1", batch.id));
        assert_eq!(ChangeBatch::batch_id_of(&batch.records[1].id), Some(batch.id.as_str()));
        assert_eq!(batch.base_version, 3);
        assert!(batch.is_open());
    }

    #[test]
    fn test_add_record_wire_shape() {
        let value = serde_json::to_value(add_record("h1")).unwrap();

        assert_eq!(value["elementId"], "h1");
        assert_eq!(value["changeType"], "add");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["newContent"]["id"], "h1");
        assert_eq!(value["newContent"]["type"], "header");
        assert_eq!(value["newContent"]["targetSectionId"], "s1");
        assert!(value["oldContent"].is_null());
        assert!(value.as_object().unwrap().contains_key("oldContent"));
    }

    #[test]
    fn test_mismatched_sides_are_rejected() {
        let mut value = serde_json::to_value(add_record("h1")).unwrap();
        value["changeType"] = json!("delete");

        assert!(serde_json::from_value::<ChangeRecord>(value).is_err());
    }

    #[test]
    fn test_frame_change_keeps_batch_open() {
        let base = Template::new("t1", "Old").frame();
        let mut renamed = base.clone();
        renamed.name = "New".to_string();

        assert!(FrameChange::between(base.clone(), base.clone()).is_none());

        let mut batch = ChangeBatch::new("t1", 1, Vec::new()).with_frame(FrameChange::between(base, renamed));
        assert!(batch.is_open());
        assert!(!batch.is_empty());

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["frame"]["newFrame"]["name"], "New");

        batch.frame.as_mut().unwrap().status = ChangeStatus::Accepted;
        assert!(!batch.is_open());
    }

    #[test]
    fn test_delete_record_reads_back() {
        let raw = json!({
            "id": "b-0",
            "elementId": "t1",
            "changeType": "delete",
            "status": "rejected",
            "oldContent": {
                "id": "t1",
                "type": "text",
                "content": "Bye",
                "layout": { "alignment": "left", "padding": "10px 24px", "margin": null },
                "properties": serde_json::to_value(Element::new("t1", ElementType::Text).properties).unwrap(),
                "originalSectionId": "s2",
                "after": null,
                "ordinal": 4
            }
        });

        let record: ChangeRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.change_type(), ChangeType::Delete);
        assert_eq!(record.status, ChangeStatus::Rejected);
        let old = record.change.old_content().unwrap();
        assert_eq!(old.original_section_id, "s2");
        assert_eq!(old.element.content, "Bye");
        assert!(record.change.new_content().is_none());
    }
}
