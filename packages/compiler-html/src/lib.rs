//! # Mailforge HTML Compiler
//!
//! Renders a normalized [`Template`](mailforge_model::Template) into a single
//! email-client-compatible HTML document.
//!
//! Layout is built exclusively from nested tables: an outer full-bleed table,
//! a centered fixed-width container (wrapped in Outlook-only conditional
//! comments), one row per section and one inner row per element. Flexbox and
//! grid are never emitted.
//!
//! Generation is deterministic: no random ids, no timestamps, and the same
//! template always yields byte-identical output.

mod compiler;
mod elements;
pub mod styles;


pub use compiler::{compile_to_html, compile_value, generate, CompileError, CompileOptions};
pub use styles::{inline_style, to_kebab_case, InlineStyle};
