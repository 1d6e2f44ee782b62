//! Persistence boundary.
//!
//! The editor never touches storage itself; it issues these calls and the
//! caller decides what they mean. Callers that need accept/reject to be
//! atomic must wrap one [`ReviewService`](crate::ReviewService) call in
//! their own transaction.

use crate::changes::{ChangeBatch, ChangeStatus};
use mailforge_model::Template;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown change records: {0:?}")]
    UnknownRecords(Vec<String>),

    #[error("Id cannot be used as a storage key: {0:?}")]
    InvalidId(String),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Storage calls issued by the editor
pub trait DocumentStore {
    fn load_template(&self, template_id: &str) -> Result<Option<Template>, StoreError>;

    fn load_change_batch(&self, batch_id: &str) -> Result<Option<ChangeBatch>, StoreError>;

    /// The batch of a template that still has pending records, if any
    fn load_pending_batch(&self, template_id: &str) -> Result<Option<ChangeBatch>, StoreError>;

    fn save_template(&mut self, template: &Template) -> Result<(), StoreError>;

    fn save_change_batch(&mut self, batch: &ChangeBatch) -> Result<(), StoreError>;

    fn save_change_record_statuses(&mut self, record_ids: &[String], status: ChangeStatus) -> Result<(), StoreError>;

    /// Snapshots are append-only; an existing version is never overwritten
    fn append_version_snapshot(&mut self, template_id: &str, version: u64, template: &Template) -> Result<(), StoreError>;

    /// Store the rendered HTML as the template's current preview
    fn save_preview(&mut self, template_id: &str, html: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub templates: HashMap<String, Template>,
    pub batches: HashMap<String, ChangeBatch>,
    pub snapshots: HashMap<String, BTreeMap<u64, Template>>,
    pub previews: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn snapshot(&self, template_id: &str, version: u64) -> Option<&Template> {
        self.snapshots.get(template_id)?.get(&version)
    }

    pub fn preview(&self, template_id: &str) -> Option<&str> {
        self.previews.get(template_id).map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn load_template(&self, template_id: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.templates.get(template_id).cloned())
    }

    fn load_change_batch(&self, batch_id: &str) -> Result<Option<ChangeBatch>, StoreError> {
        Ok(self.batches.get(batch_id).cloned())
    }

    fn load_pending_batch(&self, template_id: &str) -> Result<Option<ChangeBatch>, StoreError> {
        Ok(self
            .batches
            .values()
            .find(|b| b.template_id == template_id && b.is_open())
            .cloned())
    }

    fn save_template(&mut self, template: &Template) -> Result<(), StoreError> {
        self.templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    fn save_change_batch(&mut self, batch: &ChangeBatch) -> Result<(), StoreError> {
        self.batches.insert(batch.id.clone(), batch.clone());
        Ok(())
    }

    fn save_change_record_statuses(&mut self, record_ids: &[String], status: ChangeStatus) -> Result<(), StoreError> {
        let mut unknown = Vec::new();
        for id in record_ids {
            let record = ChangeBatch::batch_id_of(id)
                .and_then(|batch_id| self.batches.get_mut(batch_id))
                .and_then(|batch| batch.record_mut(id));
            match record {
                Some(record) => record.status = status,
                None => unknown.push(id.clone()),
            }
        }
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(StoreError::UnknownRecords(unknown))
        }
    }

    fn append_version_snapshot(&mut self, template_id: &str, version: u64, template: &Template) -> Result<(), StoreError> {
        let versions = self.snapshots.entry(template_id.to_string()).or_default();
        if versions.contains_key(&version) {
            return Err(StoreError::Backend(format!(
                "snapshot {} of {} already exists",
                version, template_id
            )));
        }
        versions.insert(version, template.clone());
        Ok(())
    }

    fn save_preview(&mut self, template_id: &str, html: &str) -> Result<(), StoreError> {
        self.previews.insert(template_id.to_string(), html.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{Change, ChangeRecord};

    fn batch(template_id: &str) -> ChangeBatch {
        let record = ChangeRecord::new(
            "change-0",
            "p1",
            Change::Delete {
                old_content: crate::changes::PriorElement {
                    element: mailforge_model::Element::new("p1", mailforge_model::ElementType::Text),
                    original_section_id: "s1".to_string(),
                    after: None,
                    ordinal: 0,
                },
            },
        );
        ChangeBatch::new(template_id, 1, vec![record])
    }

    #[test]
    fn test_status_updates_close_pending_batch() {
        let mut store = MemoryStore::new();
        let batch = batch("t1");
        store.save_change_batch(&batch).unwrap();
        assert_eq!(store.load_pending_batch("t1").unwrap().unwrap().id, batch.id);
        assert!(store.load_pending_batch("t2").unwrap().is_none());

        let ids = vec![batch.records[0].id.clone()];
        store
            .save_change_record_statuses(&ids, ChangeStatus::Accepted)
            .unwrap();
        assert!(store.load_pending_batch("t1").unwrap().is_none());
    }

    #[test]
    fn test_unknown_record_ids_are_reported() {
        let mut store = MemoryStore::new();
        let err = store
            .save_change_record_statuses(&["ghost-0".to_string()], ChangeStatus::Rejected)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRecords(ids) if ids == vec!["ghost-0".to_string()]));
    }

    #[test]
    fn test_snapshots_are_append_only() {
        let mut store = MemoryStore::new();
        let template = Template::new("t1", "News");
        store.append_version_snapshot("t1", 2, &template).unwrap();
        assert!(store.append_version_snapshot("t1", 2, &template).is_err());
        assert_eq!(store.snapshot("t1", 2), Some(&template));
    }
}
