//! Shared types for the Myre compiler front-end.
//!
//! This crate provides foundational types used across all `myre-*` crates:
//! - Source spans (`Span`) and line/column positions (`Position`, `LineMap`)
//! - Diagnostics (`Diagnostic`, `DiagnosticLevel`, `DiagnosticSink`)
//! - Centralized limits and thresholds (fixed-point pass caps, recursion guards)

pub mod diagnostics;
pub mod handles;
pub mod limits;
pub mod modifiers;
pub mod position;
pub mod span;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticLevel, DiagnosticSink, Suggestion};
pub use handles::{ScopeHandle, SymbolHandle, TypeHandle};
pub use modifiers::{AccessLevel, Modifiers};
pub use position::{LineMap, Position};
pub use span::Span;
