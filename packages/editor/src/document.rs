//! # Email Document
//!
//! One template and its review state.
//!
//! ```text
//!            propose / draft
//!   Clean ───────────────────▶ Pending(batch)
//!     ▲                          │   │
//!     │    accept_batch          │   │ accept_one / reject_one
//!     ├──────────────────────────┘   │ (per record)
//!     │    reject_batch              │
//!     └──────────────────────────────┘ last record resolved
//! ```
//!
//! A proposal is applied to the template right away, so the pending state
//! shows the proposed content. Accepting keeps it, rejecting reverts it.
//!
//! The template frame (name, styles, section list) is part of the batch.
//! Sections the candidate drops stay in place while the batch is pending and
//! are pruned when the frame change is accepted; rejecting restores the old
//! frame.
//!
//! Versioning:
//! - `accept_batch` bumps the version by one and stores a snapshot
//! - `reject_batch` never bumps (it restores prior state)
//! - per-record accept/reject do no version bookkeeping, even when the last
//!   record closes the batch

use crate::changes::{ChangeBatch, ChangeRecord, ChangeStatus, FrameChange};
use crate::differ::diff;
use crate::errors::EditorError;
use crate::patch::{apply_records, revert_record, revert_records, SkippedRecord};
use mailforge_model::{Section, Template};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Review state of a document
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewState {
    /// No batch awaits review
    Clean,
    /// Exactly one batch awaits review
    Pending(ChangeBatch),
}

/// What a transition did
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The batch after the transition; `None` for an empty proposal
    pub batch: Option<ChangeBatch>,
    /// Records whose status changed
    pub records: Vec<String>,
    /// Status those records now have
    pub status: ChangeStatus,
    /// Template version after the transition
    pub version: u64,
    /// Snapshot version stored by this transition
    pub snapshot: Option<u64>,
    /// Status the frame change moved to, when this transition settled it
    pub frame: Option<ChangeStatus>,
    pub skipped: Vec<SkippedRecord>,
}

/// Editable email document with review state
#[derive(Debug, Clone)]
pub struct EmailDocument {
    template: Template,
    state: ReviewState,
    snapshots: BTreeMap<u64, Template>,
}

impl EmailDocument {
    /// Wrap an accepted template
    pub fn new(template: Template) -> Self {
        Self {
            template,
            state: ReviewState::Clean,
            snapshots: BTreeMap::new(),
        }
    }

    /// Rebuild a document from persisted state
    pub fn restore(template: Template, pending: Option<ChangeBatch>) -> Self {
        let state = match pending {
            Some(batch) if batch.is_open() => ReviewState::Pending(batch),
            _ => ReviewState::Clean,
        };
        Self {
            template,
            state,
            snapshots: BTreeMap::new(),
        }
    }

    /// Start a document from a first draft: every element is a pending add
    pub fn draft(candidate: Template) -> (Self, Resolution) {
        let skeleton = Template {
            sections: candidate.sections.iter().map(empty_like).collect(),
            ..candidate.clone()
        };
        let mut document = Self::new(skeleton);
        let records = diff(None, &candidate);
        let resolution = document.open_batch(&candidate, records);
        (document, resolution)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.template.version
    }

    pub fn pending_batch(&self) -> Option<&ChangeBatch> {
        match &self.state {
            ReviewState::Pending(batch) => Some(batch),
            ReviewState::Clean => None,
        }
    }

    /// Snapshots stored by accepted batches, keyed by version
    pub fn snapshots(&self) -> &BTreeMap<u64, Template> {
        &self.snapshots
    }

    pub fn snapshot(&self, version: u64) -> Option<&Template> {
        self.snapshots.get(&version)
    }

    /// Diff a candidate against the current template and open a batch.
    ///
    /// Fails with `BatchPending` while another batch awaits review, since the
    /// diff would run against a stale baseline.
    #[instrument(skip_all, fields(template_id = %self.template.id))]
    pub fn propose(&mut self, candidate: &Template) -> Result<Resolution, EditorError> {
        if let ReviewState::Pending(batch) = &self.state {
            return Err(EditorError::BatchPending {
                template_id: self.template.id.clone(),
                batch_id: batch.id.clone(),
            });
        }
        let records = diff(Some(&self.template), candidate);
        Ok(self.open_batch(candidate, records))
    }

    fn open_batch(&mut self, candidate: &Template, records: Vec<ChangeRecord>) -> Resolution {
        let version = self.template.version;
        let new_frame = candidate.frame();
        let frame = FrameChange::between(self.template.frame(), new_frame.clone());

        if records.is_empty() && frame.is_none() {
            debug!("Proposal has no changes");
            return Resolution {
                batch: None,
                records: Vec::new(),
                status: ChangeStatus::Pending,
                version,
                snapshot: None,
                frame: None,
                skipped: Vec::new(),
            };
        }

        let batch = ChangeBatch::new(self.template.id.clone(), version, records).with_frame(frame);
        let mut next = self.template.clone();
        next.apply_frame(&new_frame, false);
        let skipped = apply_records(&mut next, &batch.records);
        self.template = next;

        info!(
            batch_id = %batch.id,
            records = batch.records.len(),
            frame = batch.frame.is_some(),
            skipped = skipped.len(),
            "Batch proposed"
        );
        let resolution = Resolution {
            batch: Some(batch.clone()),
            records: batch.records.iter().map(|r| r.id.clone()).collect(),
            status: ChangeStatus::Pending,
            version,
            snapshot: None,
            frame: batch.frame.as_ref().map(|f| f.status),
            skipped,
        };
        self.state = ReviewState::Pending(batch);
        resolution
    }

    fn take_batch(&mut self, batch_id: &str) -> Result<ChangeBatch, EditorError> {
        match std::mem::replace(&mut self.state, ReviewState::Clean) {
            ReviewState::Pending(batch) if batch.id == batch_id => Ok(batch),
            ReviewState::Pending(batch) => {
                self.state = ReviewState::Pending(batch);
                Err(EditorError::BatchNotFound(batch_id.to_string()))
            }
            ReviewState::Clean => Err(EditorError::NoPendingBatch(self.template.id.clone())),
        }
    }

    /// Accept every pending record; bumps the version and stores a snapshot
    #[instrument(skip_all, fields(template_id = %self.template.id, batch_id = %batch_id))]
    pub fn accept_batch(&mut self, batch_id: &str) -> Result<Resolution, EditorError> {
        let mut batch = self.take_batch(batch_id)?;
        let records = resolve_pending(&mut batch, ChangeStatus::Accepted);
        let frame = settle_frame(&mut batch, &mut self.template, ChangeStatus::Accepted);

        self.template.version += 1;
        let version = self.template.version;
        self.snapshots.insert(version, self.template.clone());

        info!(version, records = records.len(), "Batch accepted");
        Ok(Resolution {
            batch: Some(batch),
            records,
            status: ChangeStatus::Accepted,
            version,
            snapshot: Some(version),
            frame,
            skipped: Vec::new(),
        })
    }

    /// Revert every pending record of the batch, then restore the old frame;
    /// the version is left alone
    #[instrument(skip_all, fields(template_id = %self.template.id, batch_id = %batch_id))]
    pub fn reject_batch(&mut self, batch_id: &str) -> Result<Resolution, EditorError> {
        let mut batch = self.take_batch(batch_id)?;

        let pending: Vec<&ChangeRecord> = batch.pending().collect();
        let skipped = revert_records(&mut self.template, &pending);
        let records = resolve_pending(&mut batch, ChangeStatus::Rejected);
        let frame = settle_frame(&mut batch, &mut self.template, ChangeStatus::Rejected);

        info!(records = records.len(), skipped = skipped.len(), "Batch rejected");
        Ok(Resolution {
            batch: Some(batch),
            records,
            status: ChangeStatus::Rejected,
            version: self.template.version,
            snapshot: None,
            frame,
            skipped,
        })
    }

    /// Keep one record's change
    pub fn accept_one(&mut self, record_id: &str) -> Result<Resolution, EditorError> {
        self.resolve_one(record_id, ChangeStatus::Accepted)
    }

    /// Revert one record's change
    pub fn reject_one(&mut self, record_id: &str) -> Result<Resolution, EditorError> {
        self.resolve_one(record_id, ChangeStatus::Rejected)
    }

    #[instrument(skip(self), fields(template_id = %self.template.id))]
    fn resolve_one(&mut self, record_id: &str, status: ChangeStatus) -> Result<Resolution, EditorError> {
        let ReviewState::Pending(batch) = &mut self.state else {
            return Err(EditorError::RecordNotFound(record_id.to_string()));
        };
        let record = batch
            .record_mut(record_id)
            .ok_or_else(|| EditorError::RecordNotFound(record_id.to_string()))?;
        if !record.is_pending() {
            return Err(EditorError::RecordAlreadyResolved {
                id: record_id.to_string(),
                status: record.status.as_str(),
            });
        }

        let mut skipped = Vec::new();
        if status == ChangeStatus::Rejected {
            if let Err(e) = revert_record(&mut self.template, record) {
                skipped.push(SkippedRecord::new(record, e));
            }
        }
        record.status = status;

        let batch = batch.clone();
        if !batch.is_open() {
            debug!(batch_id = %batch.id, "Last record resolved, batch closed");
            self.state = ReviewState::Clean;
        }

        Ok(Resolution {
            batch: Some(batch),
            records: vec![record_id.to_string()],
            status,
            version: self.template.version,
            snapshot: None,
            frame: None,
            skipped,
        })
    }
}

fn resolve_pending(batch: &mut ChangeBatch, status: ChangeStatus) -> Vec<String> {
    batch
        .records
        .iter_mut()
        .filter(|r| r.is_pending())
        .map(|r| {
            r.status = status;
            r.id.clone()
        })
        .collect()
}

/// Resolve a pending frame change: accepting prunes the sections the new
/// frame dropped, rejecting restores the old frame
fn settle_frame(batch: &mut ChangeBatch, template: &mut Template, status: ChangeStatus) -> Option<ChangeStatus> {
    let frame = batch.frame.as_mut().filter(|f| f.is_pending())?;
    frame.status = status;
    let target = match status {
        ChangeStatus::Rejected => &frame.old_frame,
        _ => &frame.new_frame,
    };
    template.apply_frame(target, true);
    Some(status)
}

fn empty_like(section: &Section) -> Section {
    Section {
        id: section.id.clone(),
        styles: section.styles.clone(),
        elements: Vec::new(),
    }
}
