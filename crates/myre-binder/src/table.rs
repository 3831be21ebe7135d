//! The `SymbolTable`: owns the scope arena and the symbol arena, and
//! implements the scope-entry/definition/lookup operations of spec §4.2.

use std::cell::Cell;

use myre_ast::NodeId;
use myre_common::{limits, ScopeHandle, SymbolHandle, TypeHandle};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::scope::{Scope, ScopeKind};
use crate::symbol::{
    EnumCaseSymbol, EnumSymbol, FunctionGroupSymbol, FunctionSymbol, NamespaceSymbol, ParameterSymbol, PropertySymbol,
    Symbol, SymbolCommon, TypeHint, TypeSymbol, VariableSymbol,
};

/// Why a `define_*` call refused to add a symbol: the name is already bound
/// locally (spec §4.2, "`define(symbol)` fails if name exists locally
/// except functions-of-same-name coalesce into `FunctionGroup`").
#[derive(Debug, Clone, Copy)]
pub struct DefineError {
    pub existing: SymbolHandle,
}

/// Persistent scope tree plus the symbols it holds (spec §3.4, §4.2).
///
/// Scopes and symbols share one lifetime (the whole binding pass) and are
/// addressed by stable handles rather than borrowed references, so the
/// builder can freely interleave pushes/pops and symbol creation without
/// fighting the borrow checker over `&mut self` recursion.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    stack: Vec<ScopeHandle>,
    global: ScopeHandle,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        let global_scope = Scope {
            kind: ScopeKind::Global,
            name: String::new(),
            parent: ScopeHandle::NONE,
            members: FxHashMap::default(),
            owner: SymbolHandle::NONE,
        };
        let global = ScopeHandle::from(0usize);
        Self { scopes: vec![global_scope], symbols: Vec::new(), stack: vec![global], global }
    }

    // ------------------------------------------------------------------
    // Handle access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn scope(&self, handle: ScopeHandle) -> &Scope {
        &self.scopes[handle.index()]
    }

    fn scope_mut(&mut self, handle: ScopeHandle) -> &mut Scope {
        &mut self.scopes[handle.index()]
    }

    #[must_use]
    pub fn symbol(&self, handle: SymbolHandle) -> &Symbol {
        &self.symbols[handle.index()]
    }

    pub fn symbol_mut(&mut self, handle: SymbolHandle) -> &mut Symbol {
        &mut self.symbols[handle.index()]
    }

    #[must_use]
    pub fn global_scope(&self) -> ScopeHandle {
        self.global
    }

    #[must_use]
    pub fn current_scope(&self) -> ScopeHandle {
        *self.stack.last().expect("scope stack is never empty")
    }

    /// Number of scopes currently pushed; used to assert stack discipline
    /// (spec §4.2, "exit_scope count == enter_* count at quiescence").
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolHandle {
        let handle = SymbolHandle::from(self.symbols.len());
        self.symbols.push(symbol);
        handle
    }

    fn alloc_scope(&mut self, kind: ScopeKind, name: String, parent: ScopeHandle, owner: SymbolHandle) -> ScopeHandle {
        let handle = ScopeHandle::from(self.scopes.len());
        self.scopes.push(Scope { kind, name, parent, members: FxHashMap::default(), owner });
        handle
    }

    // ------------------------------------------------------------------
    // Scope entry (spec §4.2)
    // ------------------------------------------------------------------

    /// Enter a namespace. Re-entry finds the existing namespace symbol and
    /// reopens its scope additively rather than shadowing it (spec §4.2,
    /// §4.4's "namespace re-entry merges members not shadows").
    pub fn enter_namespace(&mut self, name: &str) -> ScopeHandle {
        let current = self.current_scope();
        if let Some(existing) = self.scope(current).local(name) {
            if let Symbol::Namespace(ns) = self.symbol(existing) {
                let scope = ns.scope;
                self.stack.push(scope);
                return scope;
            }
        }

        let symbol_handle = self.alloc_symbol(Symbol::Namespace(NamespaceSymbol {
            common: SymbolCommon::new(name),
            scope: ScopeHandle::NONE,
        }));
        let scope_handle = self.alloc_scope(ScopeKind::Namespace, name.to_string(), current, symbol_handle);
        if let Symbol::Namespace(ns) = self.symbol_mut(symbol_handle) {
            ns.scope = scope_handle;
        }
        self.scope_mut(current).members.insert(name.to_string(), symbol_handle);
        self.stack.push(scope_handle);
        scope_handle
    }

    /// Enter a `type` declaration's body. Unlike namespaces, a duplicate
    /// type name in the same scope is a conflict, not a re-open; the scope
    /// is still created and pushed so the builder can keep walking the
    /// body (spec §4.3's "never aborts", applied to binding too).
    pub fn enter_type(&mut self, name: &str) -> (ScopeHandle, Result<SymbolHandle, DefineError>) {
        let current = self.current_scope();
        let result = self.declare_scoped(current, name, |common| {
            Symbol::Type(TypeSymbol { common, scope: ScopeHandle::NONE })
        });
        let symbol_handle = result.unwrap_or_else(|e| e.existing);
        let scope_handle = self.open_owned_scope(ScopeKind::Type, name, current, symbol_handle);
        (scope_handle, result)
    }

    pub fn enter_enum(&mut self, name: &str) -> (ScopeHandle, Result<SymbolHandle, DefineError>) {
        let current = self.current_scope();
        let result = self.declare_scoped(current, name, |common| {
            Symbol::Enum(EnumSymbol { common, scope: ScopeHandle::NONE })
        });
        let symbol_handle = result.unwrap_or_else(|e| e.existing);
        let scope_handle = self.open_owned_scope(ScopeKind::Type, name, current, symbol_handle);
        (scope_handle, result)
    }

    /// Enter a function body. Same-named functions in one scope coalesce
    /// into a `FunctionGroup` (overload set) rather than conflicting
    /// (spec §4.2).
    pub fn enter_function(&mut self, name: &str) -> ScopeHandle {
        let current = self.current_scope();
        let existing = self.scope(current).local(name);

        let fn_handle = self.alloc_symbol(Symbol::Function(FunctionSymbol {
            common: SymbolCommon::new(name),
            scope: ScopeHandle::NONE,
            parameters: SmallVec::new(),
            return_type: Cell::new(TypeHandle::NONE),
            return_hint: TypeHint::default(),
            body: NodeId::NONE,
        }));

        match existing {
            Some(prior_handle) => {
                let prior_is_group = matches!(self.symbol(prior_handle), Symbol::FunctionGroup(_));
                let prior_is_function = matches!(self.symbol(prior_handle), Symbol::Function(_));
                if prior_is_group {
                    if let Symbol::FunctionGroup(group) = self.symbol_mut(prior_handle) {
                        group.overloads.push(fn_handle);
                    }
                } else if prior_is_function {
                    let group_handle = self.alloc_symbol(Symbol::FunctionGroup(FunctionGroupSymbol {
                        common: SymbolCommon::new(name),
                        overloads: smallvec![prior_handle, fn_handle],
                    }));
                    self.scope_mut(current).members.insert(name.to_string(), group_handle);
                }
                // Otherwise the name collides with a non-function symbol; the
                // existing binding is left alone and the builder surfaces the
                // conflict the same way `declare_scoped` callers do.
            }
            None => {
                self.scope_mut(current).members.insert(name.to_string(), fn_handle);
            }
        }

        let scope_handle = self.alloc_scope(ScopeKind::Function, name.to_string(), current, fn_handle);
        if let Symbol::Function(f) = self.symbol_mut(fn_handle) {
            f.scope = scope_handle;
        }
        self.stack.push(scope_handle);
        scope_handle
    }

    /// Enter a bare block (`{ ... }`, loop body, etc). Not owned by any
    /// symbol.
    pub fn enter_block(&mut self, label: Option<&str>) -> ScopeHandle {
        let current = self.current_scope();
        let scope_handle =
            self.alloc_scope(ScopeKind::Block, label.unwrap_or_default().to_string(), current, SymbolHandle::NONE);
        self.stack.push(scope_handle);
        scope_handle
    }

    /// Pop the current scope. A no-op past the global scope rather than a
    /// panic, so a builder bug (an extra `exit_scope`) degrades to a
    /// diagnostic-worthy oddity instead of a crash.
    pub fn exit_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            tracing::warn!("exit_scope called past the global scope");
        }
    }

    fn declare_scoped(
        &mut self,
        scope: ScopeHandle,
        name: &str,
        make: impl FnOnce(SymbolCommon) -> Symbol,
    ) -> Result<SymbolHandle, DefineError> {
        if let Some(existing) = self.scope(scope).local(name) {
            return Err(DefineError { existing });
        }
        let handle = self.alloc_symbol(make(SymbolCommon::new(name)));
        self.scope_mut(scope).members.insert(name.to_string(), handle);
        Ok(handle)
    }

    fn open_owned_scope(&mut self, kind: ScopeKind, name: &str, parent: ScopeHandle, owner: SymbolHandle) -> ScopeHandle {
        let scope_handle = self.alloc_scope(kind, name.to_string(), parent, owner);
        match self.symbol_mut(owner) {
            Symbol::Type(t) => t.scope = scope_handle,
            Symbol::Enum(e) => e.scope = scope_handle,
            Symbol::Namespace(n) => n.scope = scope_handle,
            Symbol::Function(f) => f.scope = scope_handle,
            _ => {}
        }
        self.stack.push(scope_handle);
        scope_handle
    }

    // ------------------------------------------------------------------
    // Leaf definitions (spec §4.2)
    // ------------------------------------------------------------------

    pub fn define_variable(&mut self, name: &str, hint: TypeHint) -> Result<SymbolHandle, DefineError> {
        let current = self.current_scope();
        self.declare_scoped(current, name, |common| {
            Symbol::Variable(VariableSymbol { common, is_field: false, resolved_type: Cell::new(TypeHandle::NONE), hint })
        })
    }

    pub fn define_field(&mut self, name: &str, hint: TypeHint) -> Result<SymbolHandle, DefineError> {
        let current = self.current_scope();
        self.declare_scoped(current, name, |common| {
            Symbol::Variable(VariableSymbol { common, is_field: true, resolved_type: Cell::new(TypeHandle::NONE), hint })
        })
    }

    pub fn define_parameter(&mut self, name: &str, hint: TypeHint) -> Result<SymbolHandle, DefineError> {
        let current = self.current_scope();
        self.declare_scoped(current, name, |common| {
            Symbol::Parameter(ParameterSymbol { common, resolved_type: Cell::new(TypeHandle::NONE), hint })
        })
    }

    pub fn define_property(&mut self, name: &str, hint: TypeHint, getter: NodeId, setter: NodeId) -> Result<SymbolHandle, DefineError> {
        let current = self.current_scope();
        self.declare_scoped(current, name, |common| {
            Symbol::Property(PropertySymbol { common, resolved_type: Cell::new(TypeHandle::NONE), hint, getter, setter })
        })
    }

    pub fn define_enum_case(&mut self, name: &str, associated_types: Vec<NodeId>) -> Result<SymbolHandle, DefineError> {
        let current = self.current_scope();
        self.declare_scoped(current, name, |common| Symbol::EnumCase(EnumCaseSymbol { common, associated_types }))
    }

    pub fn mark_symbol_resolved(&mut self, handle: SymbolHandle) {
        self.symbol_mut(handle).mark_resolved();
    }

    /// Total number of symbols allocated so far, for callers (the resolver)
    /// that need to visit every symbol rather than reach one through a
    /// scope lookup.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    // ------------------------------------------------------------------
    // Lookup (spec §4.2)
    // ------------------------------------------------------------------

    /// Look up `name` in `scope` only, no parent walk.
    #[must_use]
    pub fn lookup_local(&self, scope: ScopeHandle, name: &str) -> Option<SymbolHandle> {
        self.scope(scope).local(name)
    }

    /// Look up `name` starting at `scope`, walking parents until found or
    /// the global scope is exhausted. Bounded by
    /// [`limits::MAX_SCOPE_WALK_ITERATIONS`] against a malformed (cyclic)
    /// scope tree.
    #[must_use]
    pub fn lookup(&self, scope: ScopeHandle, name: &str) -> Option<SymbolHandle> {
        let mut current = scope;
        for _ in 0..limits::MAX_SCOPE_WALK_ITERATIONS {
            if let Some(found) = self.scope(current).local(name) {
                return Some(found);
            }
            if self.scope(current).is_global() {
                return None;
            }
            current = self.scope(current).parent;
        }
        None
    }

    /// Walk from `scope` up to the nearest enclosing function symbol (for
    /// `return`'s target), bounded the same way as [`Self::lookup`].
    #[must_use]
    pub fn enclosing_function(&self, scope: ScopeHandle) -> Option<SymbolHandle> {
        self.enclosing_owner(scope, |s| matches!(s, Symbol::Function(_)))
    }

    /// Walk from `scope` up to the nearest enclosing type-like symbol (for
    /// `this`'s type).
    #[must_use]
    pub fn enclosing_type(&self, scope: ScopeHandle) -> Option<SymbolHandle> {
        self.enclosing_owner(scope, Symbol::is_type_like)
    }

    fn enclosing_owner(&self, scope: ScopeHandle, predicate: impl Fn(&Symbol) -> bool) -> Option<SymbolHandle> {
        let mut current = scope;
        for _ in 0..limits::MAX_SCOPE_WALK_ITERATIONS {
            let owner = self.scope(current).owner;
            if !owner.is_none() && predicate(self.symbol(owner)) {
                return Some(owner);
            }
            if self.scope(current).is_global() {
                return None;
            }
            current = self.scope(current).parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_reentry_merges_members() {
        let mut table = SymbolTable::new();
        let first = table.enter_namespace("Foo");
        table.define_variable("a", TypeHint::new(first)).unwrap();
        table.exit_scope();

        let second = table.enter_namespace("Foo");
        assert_eq!(first, second);
        table.define_variable("b", TypeHint::new(second)).unwrap();
        table.exit_scope();

        assert!(table.lookup_local(first, "a").is_some());
        assert!(table.lookup_local(first, "b").is_some());
    }

    #[test]
    fn same_name_functions_coalesce_into_group() {
        let mut table = SymbolTable::new();
        table.enter_function("add");
        table.exit_scope();
        table.enter_function("add");
        table.exit_scope();

        let global = table.global_scope();
        let handle = table.lookup_local(global, "add").unwrap();
        let group = table.symbol(handle).as_function_group().expect("should coalesce");
        assert_eq!(group.overloads.len(), 2);
    }

    #[test]
    fn define_variable_twice_in_same_scope_conflicts() {
        let mut table = SymbolTable::new();
        let scope = table.current_scope();
        table.define_variable("x", TypeHint::new(scope)).unwrap();
        let err = table.define_variable("x", TypeHint::new(scope)).unwrap_err();
        assert!(!err.existing.is_none());
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut table = SymbolTable::new();
        let global = table.current_scope();
        table.define_variable("outer", TypeHint::new(global)).unwrap();
        let ns = table.enter_namespace("Inner");
        assert!(table.lookup(ns, "outer").is_some());
        assert!(table.lookup_local(ns, "outer").is_none());
    }

    #[test]
    fn exit_scope_past_global_is_a_no_op() {
        let mut table = SymbolTable::new();
        assert_eq!(table.depth(), 1);
        table.exit_scope();
        assert_eq!(table.depth(), 1);
    }
}
