//! # Mailforge Editor
//!
//! Change review engine for email templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: wire JSON → normalized Template      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: review lifecycle                    │
//! │  - Diff candidate against current template  │
//! │  - Apply / revert change records            │
//! │  - Batch and per-record accept / reject     │
//! │  - Version snapshots                        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: Template → HTML              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Template is source of truth**: HTML is always re-derived from it
//! 2. **One pending batch per template**: a new diff never runs against a
//!    stale baseline
//! 3. **Partial success**: a record that cannot be applied is skipped and
//!    reported, the rest of its batch proceeds
//! 4. **Storage is external**: the editor issues [`DocumentStore`] calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailforge_editor::{ChangeOperation, MemoryStore, ReviewService};
//!
//! let mut service = ReviewService::new(MemoryStore::new());
//!
//! // Store a first draft as a pending batch of adds
//! let proposed = service.propose("welcome", &draft_json)?;
//! let batch_id = proposed.resolution.batch.unwrap().id;
//!
//! // Accept it; version goes up by one and a snapshot is stored
//! let accepted = service.execute("welcome", &ChangeOperation::AcceptBatch(batch_id))?;
//! println!("{}", accepted.html);
//! ```

mod changes;
mod differ;
mod document;
mod errors;
mod patch;
mod pipeline;
mod review;
mod store;

pub use changes::{
    Change, ChangeBatch, ChangeRecord, ChangeStatus, ChangeType, FrameChange, PlacedElement, PriorElement,
};
pub use differ::diff;
pub use document::{EmailDocument, Resolution, ReviewState};
pub use errors::{EditorError, PatchError};
pub use patch::{apply_record, apply_records, revert_record, revert_records, SkippedRecord};
pub use pipeline::{Pipeline, Transition};
pub use review::{ChangeOperation, ReviewService};
pub use store::{DocumentStore, MemoryStore, StoreError};

// Re-export common types for convenience
pub use mailforge_model::{Element, Section, Template};
