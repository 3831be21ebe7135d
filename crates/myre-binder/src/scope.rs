//! The scope tree (spec §3.4, §4.2).
//!
//! Scopes are stored in a flat arena and addressed by [`ScopeHandle`], the
//! same stable-handle idiom the AST uses for node addressing. Symbols that
//! also act as scopes (namespaces, types, enums, functions) record the
//! scope they own via `owner`; a plain block scope leaves `owner` unset.

use myre_common::{ScopeHandle, SymbolHandle};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Type,
    Function,
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    pub parent: ScopeHandle,
    pub members: FxHashMap<String, SymbolHandle>,
    pub owner: SymbolHandle,
}

impl Scope {
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self.kind, ScopeKind::Global)
    }

    #[must_use]
    pub fn local(&self, name: &str) -> Option<SymbolHandle> {
        self.members.get(name).copied()
    }
}
