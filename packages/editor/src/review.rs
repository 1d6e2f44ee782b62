//! # Review Service
//!
//! Runs review operations against a [`DocumentStore`]:
//! load state → transition → render → write back.
//!
//! Operations arrive as tagged requests:
//!
//! ```json
//! { "op": "accept_batch", "id": "6f1c…" }
//! { "op": "reject_one", "id": "6f1c…-2" }
//! ```

use crate::changes::ChangeBatch;
use crate::document::EmailDocument;
use crate::errors::EditorError;
use crate::pipeline::{Pipeline, Transition};
use crate::store::DocumentStore;
use mailforge_compiler_html::CompileOptions;
use mailforge_model::{normalize_template, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

/// A review request; batch operations carry a batch id, single ones a record id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "id", rename_all = "snake_case")]
pub enum ChangeOperation {
    AcceptBatch(String),
    RejectBatch(String),
    AcceptOne(String),
    RejectOne(String),
}

impl ChangeOperation {
    pub fn id(&self) -> &str {
        match self {
            Self::AcceptBatch(id) | Self::RejectBatch(id) | Self::AcceptOne(id) | Self::RejectOne(id) => id,
        }
    }

    /// Batch the operation targets
    pub fn batch_id(&self) -> Option<&str> {
        match self {
            Self::AcceptBatch(id) | Self::RejectBatch(id) => Some(id.as_str()),
            Self::AcceptOne(id) | Self::RejectOne(id) => ChangeBatch::batch_id_of(id),
        }
    }
}

pub struct ReviewService<S> {
    store: S,
    options: CompileOptions,
}

impl<S: DocumentStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, CompileOptions::default())
    }

    pub fn with_options(store: S, options: CompileOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Normalize a candidate, diff it against the stored template and store
    /// the resulting batch.
    ///
    /// A template the store does not know yet is treated as a first draft.
    #[instrument(skip_all, fields(template_id = %template_id))]
    pub fn propose(&mut self, template_id: &str, candidate: &Value) -> Result<Transition, EditorError> {
        let mut candidate = normalize_template(candidate)?;
        candidate.id = template_id.to_string();

        if let Some(batch) = self.store.load_pending_batch(template_id)? {
            return Err(EditorError::BatchPending {
                template_id: template_id.to_string(),
                batch_id: batch.id,
            });
        }

        let transition = match self.store.load_template(template_id)? {
            Some(current) => {
                let mut pipeline = Pipeline::with_options(EmailDocument::new(current), self.options.clone());
                pipeline.propose(&candidate)?
            }
            None => {
                info!("Unknown template, starting from a first draft");
                let (document, resolution) = EmailDocument::draft(candidate);
                let pipeline = Pipeline::with_options(document, self.options.clone());
                Transition {
                    template: pipeline.document().template().clone(),
                    html: pipeline.render()?,
                    resolution,
                }
            }
        };

        if let Some(batch) = &transition.resolution.batch {
            self.store.save_change_batch(batch)?;
        }
        self.store.save_template(&transition.template)?;
        self.store.save_preview(template_id, &transition.html)?;
        Ok(transition)
    }

    /// Run one review operation and persist its outcome
    #[instrument(skip_all, fields(template_id = %template_id, op = ?op))]
    pub fn execute(&mut self, template_id: &str, op: &ChangeOperation) -> Result<Transition, EditorError> {
        let template = self.load_template(template_id)?;
        let batch = self.load_batch(template_id, op)?;

        let mut pipeline = Pipeline::with_options(EmailDocument::restore(template, Some(batch)), self.options.clone());
        let transition = match op {
            ChangeOperation::AcceptBatch(id) => pipeline.accept_batch(id)?,
            ChangeOperation::RejectBatch(id) => pipeline.reject_batch(id)?,
            ChangeOperation::AcceptOne(id) => pipeline.accept_one(id)?,
            ChangeOperation::RejectOne(id) => pipeline.reject_one(id)?,
        };

        let resolution = &transition.resolution;
        self.store
            .save_change_record_statuses(&resolution.records, resolution.status)?;
        if let (Some(_), Some(batch)) = (resolution.frame, &resolution.batch) {
            self.store.save_change_batch(batch)?;
        }
        if let Some(version) = resolution.snapshot {
            self.store
                .append_version_snapshot(template_id, version, &transition.template)?;
        }
        self.store.save_template(&transition.template)?;
        self.store.save_preview(template_id, &transition.html)?;

        info!(
            status = resolution.status.as_str(),
            records = resolution.records.len(),
            version = resolution.version,
            "Review operation applied"
        );
        Ok(transition)
    }

    fn load_template(&self, template_id: &str) -> Result<Template, EditorError> {
        self.store
            .load_template(template_id)?
            .ok_or_else(|| EditorError::TemplateNotFound(template_id.to_string()))
    }

    fn load_batch(&self, template_id: &str, op: &ChangeOperation) -> Result<ChangeBatch, EditorError> {
        let not_found = || match op {
            ChangeOperation::AcceptBatch(id) | ChangeOperation::RejectBatch(id) => EditorError::BatchNotFound(id.clone()),
            ChangeOperation::AcceptOne(id) | ChangeOperation::RejectOne(id) => EditorError::RecordNotFound(id.clone()),
        };

        let batch_id = op.batch_id().ok_or_else(not_found)?;
        let batch = self
            .store
            .load_change_batch(batch_id)?
            .filter(|batch| batch.template_id == template_id)
            .ok_or_else(not_found)?;

        if !batch.is_open() {
            return Err(match op {
                ChangeOperation::AcceptBatch(_) | ChangeOperation::RejectBatch(_) => {
                    EditorError::NoPendingBatch(template_id.to_string())
                }
                ChangeOperation::AcceptOne(id) | ChangeOperation::RejectOne(id) => match batch.record(id) {
                    Some(record) => EditorError::RecordAlreadyResolved {
                        id: id.clone(),
                        status: record.status.as_str(),
                    },
                    None => EditorError::RecordNotFound(id.clone()),
                },
            });
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_wire_format() {
        let op: ChangeOperation = serde_json::from_value(json!({ "op": "reject_one", "id": "b-3" })).unwrap();
        assert_eq!(op, ChangeOperation::RejectOne("b-3".to_string()));
        assert_eq!(op.batch_id(), Some("b"));

        let value = serde_json::to_value(ChangeOperation::AcceptBatch("b".to_string())).unwrap();
        assert_eq!(value, json!({ "op": "accept_batch", "id": "b" }));
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let result: Result<ChangeOperation, _> = serde_json::from_value(json!({ "op": "merge", "id": "x" }));
        assert!(result.is_err());
    }
}
