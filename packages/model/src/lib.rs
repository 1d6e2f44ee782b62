//! # Mailforge Model
//!
//! Typed document model for tree-structured email templates.
//!
//! ```text
//! Template ─┬─ GlobalStyles
//!           └─ Section* ─┬─ StyleMap
//!                        └─ Element* ─┬─ content
//!                                     ├─ Layout
//!                                     └─ ElementProperties (one variant per type)
//! ```
//!
//! Wire input is untrusted and may be partial; [`normalize_template`] and
//! [`normalize_element`] fill every missing field with its type default so
//! that semantically equal documents compare equal.

mod element;
mod error;
mod normalize;
pub mod properties;
mod template;

pub use element::{Alignment, Element, ElementProperties, ElementType, Layout};
pub use error::{NormalizeError, NormalizeResult};
pub use normalize::{merge_defaults, normalize_element, normalize_template, Normalize, DEFAULT_TEMPLATE_NAME};
pub use template::{GlobalStyles, Section, SectionFrame, StyleMap, Template, TemplateFrame};
