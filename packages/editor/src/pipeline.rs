//! # Review Pipeline
//!
//! Couples document transitions with rendering: Transition → Generate
//!
//! Every transition re-renders the template, so callers always receive a
//! consistent (template, html) pair.

use crate::document::{EmailDocument, Resolution};
use crate::patch::SkippedRecord;
use crate::EditorError;
use mailforge_compiler_html::{compile_to_html, CompileOptions};
use mailforge_model::Template;

/// Manages the transition → render pipeline
pub struct Pipeline {
    document: EmailDocument,
    options: CompileOptions,
}

impl Pipeline {
    pub fn new(document: EmailDocument) -> Self {
        Self::with_options(document, CompileOptions::default())
    }

    pub fn with_options(document: EmailDocument, options: CompileOptions) -> Self {
        Self { document, options }
    }

    /// Open a batch from a candidate template
    pub fn propose(&mut self, candidate: &Template) -> Result<Transition, EditorError> {
        let resolution = self.document.propose(candidate)?;
        self.finish(resolution)
    }

    pub fn accept_batch(&mut self, batch_id: &str) -> Result<Transition, EditorError> {
        let resolution = self.document.accept_batch(batch_id)?;
        self.finish(resolution)
    }

    pub fn reject_batch(&mut self, batch_id: &str) -> Result<Transition, EditorError> {
        let resolution = self.document.reject_batch(batch_id)?;
        self.finish(resolution)
    }

    pub fn accept_one(&mut self, record_id: &str) -> Result<Transition, EditorError> {
        let resolution = self.document.accept_one(record_id)?;
        self.finish(resolution)
    }

    pub fn reject_one(&mut self, record_id: &str) -> Result<Transition, EditorError> {
        let resolution = self.document.reject_one(record_id)?;
        self.finish(resolution)
    }

    /// Render the current template without a transition
    pub fn render(&self) -> Result<String, EditorError> {
        Ok(compile_to_html(self.document.template(), self.options.clone())?)
    }

    fn finish(&self, resolution: Resolution) -> Result<Transition, EditorError> {
        let html = self.render()?;
        Ok(Transition {
            template: self.document.template().clone(),
            html,
            resolution,
        })
    }

    pub fn document(&self) -> &EmailDocument {
        &self.document
    }

    pub fn into_document(self) -> EmailDocument {
        self.document
    }
}

/// Result of one pipeline step
#[derive(Debug, Clone)]
pub struct Transition {
    /// Template after the transition
    pub template: Template,

    /// HTML rendered from `template`
    pub html: String,

    pub resolution: Resolution,
}

impl Transition {
    /// Records the patch engine could not apply or revert
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.resolution.skipped
    }
}
