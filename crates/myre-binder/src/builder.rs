//! `SymbolTableBuilder`: walks a parsed AST and populates a [`SymbolTable`]
//! (spec §4.4), ported from `original_source`'s `SymbolTableBuilder`
//! (`symbol_table_builder.hpp`), which subclasses `DefaultVisitor` the same
//! way this subclasses [`Visitor`].

use myre_ast::{Arena, NodeId, NodeKind, Visitor};
use myre_common::{AccessLevel, Diagnostic, Modifiers};

use crate::symbol::{Symbol, TypeHint};
use crate::table::SymbolTable;

/// Walks a compilation unit, creating scopes/symbols and annotating every
/// node's `containing_scope`. Call [`build`] rather than using this type
/// directly.
struct SymbolTableBuilder {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

/// Build the scope tree and symbol table for a parsed compilation unit.
#[must_use]
pub fn build(arena: &Arena, root: NodeId) -> (SymbolTable, Vec<Diagnostic>) {
    let _span = tracing::debug_span!("bind").entered();
    let mut builder = SymbolTableBuilder { table: SymbolTable::new(), diagnostics: Vec::new() };
    builder.visit(arena, root);
    tracing::debug!(diagnostics = builder.diagnostics.len(), "bind complete");
    (builder.table, builder.diagnostics)
}

impl SymbolTableBuilder {
    fn annotate(&self, arena: &Arena, id: NodeId) {
        if id.is_none() {
            return;
        }
        arena.get(id).containing_scope.set(self.table.current_scope());
    }

    fn visit_if_present(&mut self, arena: &Arena, id: NodeId) {
        if !id.is_none() {
            self.visit(arena, id);
        }
    }

    fn visit_many(&mut self, arena: &Arena, ids: &[NodeId]) {
        for &id in ids {
            self.visit(arena, id);
        }
    }

    fn current_hint(&self, type_expr: NodeId, initializer: NodeId) -> TypeHint {
        TypeHint { explicit_type_expr: type_expr, initializer, defining_scope: self.table.current_scope(), body: NodeId::NONE }
    }

    fn report_conflict(&mut self, arena: &Arena, id: NodeId, kind: &str, name: &str) {
        let span = arena.get(id).span;
        self.diagnostics.push(Diagnostic::error(format!("a {kind} named '{name}' is already defined in this scope"), span));
    }
}

impl Visitor for SymbolTableBuilder {
    fn visit(&mut self, arena: &Arena, id: NodeId) {
        if id.is_none() {
            return;
        }
        match &arena.get(id).kind {
            NodeKind::NamespaceDecl { name, members, file_scoped } => {
                self.annotate(arena, id);
                if *file_scoped && self.table.current_scope() != self.table.global_scope() {
                    let span = arena.get(id).span;
                    self.diagnostics.push(Diagnostic::error(
                        "a file-scoped namespace may only appear at the top of a compilation unit",
                        span,
                    ));
                }
                let name = name.clone();
                let members = members.clone();
                self.table.enter_namespace(&name);
                self.visit_many(arena, &members);
                self.table.exit_scope();
            }

            NodeKind::TypeDecl { header, name, members } => {
                self.annotate(arena, id);
                let (access, modifiers, name, members) = (header.access, header.modifiers, name.clone(), members.clone());
                let (scope, result) = self.table.enter_type(&name);
                match result {
                    Err(err) => self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), &name),
                    Ok(_) => {
                        let owner = self.table.scope(scope).owner;
                        self.table.symbol_mut(owner).apply_header(access, modifiers);
                    }
                }
                self.visit_many(arena, &members);
                self.table.exit_scope();
            }

            NodeKind::EnumDecl { header, name, cases } => {
                self.annotate(arena, id);
                let (access, modifiers, name, cases) = (header.access, header.modifiers, name.clone(), cases.clone());
                let (scope, result) = self.table.enter_enum(&name);
                match result {
                    Err(err) => self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), &name),
                    Ok(_) => {
                        let owner = self.table.scope(scope).owner;
                        self.table.symbol_mut(owner).apply_header(access, modifiers);
                    }
                }
                self.visit_many(arena, &cases);
                self.table.exit_scope();
            }

            NodeKind::EnumCaseDecl { name, associated_types } => {
                self.annotate(arena, id);
                if let Err(err) = self.table.define_enum_case(name, associated_types.clone()) {
                    self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), name);
                }
                self.visit_many(arena, associated_types);
            }

            NodeKind::FunctionDecl { header, name, parameters, return_type, body } => {
                self.annotate(arena, id);
                let (access, modifiers) = (header.access, header.modifiers);
                let (name, parameters, return_type, body) = (name.clone(), parameters.clone(), *return_type, *body);
                self.bind_function(arena, &name, &parameters, return_type, body, access, modifiers);
            }

            NodeKind::ConstructorDecl { header, parameters, body } => {
                self.annotate(arena, id);
                let (access, modifiers) = (header.access, header.modifiers);
                let (parameters, body) = (parameters.clone(), *body);
                // Constructors share the `new` keyword with construction
                // expressions; naming the symbol `new` lets overloaded
                // constructors coalesce into a `FunctionGroup` the same way
                // same-named functions do.
                self.bind_function(arena, "new", &parameters, NodeId::NONE, body, access, modifiers);
            }

            NodeKind::ParameterDecl { type_expr, name, default_value } => {
                self.annotate(arena, id);
                let hint = self.current_hint(*type_expr, *default_value);
                if let Err(err) = self.table.define_parameter(name, hint) {
                    self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), name);
                }
                self.visit_if_present(arena, *type_expr);
                self.visit_if_present(arena, *default_value);
                self.register_parameter(name);
            }

            NodeKind::VariableDecl { header, type_expr, name, initializer, is_field } => {
                self.annotate(arena, id);
                let hint = self.current_hint(*type_expr, *initializer);
                let result =
                    if *is_field { self.table.define_field(name, hint) } else { self.table.define_variable(name, hint) };
                match result {
                    Err(err) => self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), name),
                    Ok(handle) => self.table.symbol_mut(handle).apply_header(header.access, header.modifiers),
                }
                self.visit_if_present(arena, *type_expr);
                self.visit_if_present(arena, *initializer);
            }

            NodeKind::PropertyDecl { header, type_expr, name, initializer, getter, setter } => {
                self.annotate(arena, id);
                let hint = self.current_hint(*type_expr, *initializer);
                match self.table.define_property(name, hint, *getter, *setter) {
                    Err(err) => self.report_conflict(arena, id, self.table.symbol(err.existing).kind_name(), name),
                    Ok(handle) => self.table.symbol_mut(handle).apply_header(header.access, header.modifiers),
                }
                self.visit_if_present(arena, *type_expr);
                self.visit_if_present(arena, *initializer);
                self.visit_if_present(arena, *getter);
                self.visit_if_present(arena, *setter);
            }

            NodeKind::ForStmt { init, condition, step, body } => {
                self.annotate(arena, id);
                let (init, condition, step, body) = (*init, *condition, *step, *body);
                self.table.enter_block(None);
                self.visit_if_present(arena, init);
                self.visit_if_present(arena, condition);
                self.visit_if_present(arena, step);
                self.visit(arena, body);
                self.table.exit_scope();
            }

            NodeKind::ForInStmt { binding, index_binding, iterable, body } => {
                self.annotate(arena, id);
                let (binding, index_binding, iterable, body) = (binding.clone(), index_binding.clone(), *iterable, *body);
                self.visit(arena, iterable);
                self.table.enter_block(None);
                let hint = self.current_hint(NodeId::NONE, NodeId::NONE);
                let _ = self.table.define_variable(&binding, hint);
                if let Some(index_name) = &index_binding {
                    let hint = self.current_hint(NodeId::NONE, NodeId::NONE);
                    let _ = self.table.define_variable(index_name, hint);
                }
                self.visit(arena, body);
                self.table.exit_scope();
            }

            NodeKind::Block { statements } => {
                self.annotate(arena, id);
                let statements = statements.clone();
                self.table.enter_block(None);
                self.visit_many(arena, &statements);
                self.table.exit_scope();
            }

            _ => {
                self.annotate(arena, id);
                myre_ast::walk_children(self, arena, id);
            }
        }
    }
}

impl SymbolTableBuilder {
    fn bind_function(
        &mut self,
        arena: &Arena,
        name: &str,
        parameters: &[NodeId],
        return_type: NodeId,
        body: NodeId,
        access: AccessLevel,
        modifiers: Modifiers,
    ) {
        let fn_scope = self.table.enter_function(name);
        self.visit_many(arena, parameters);
        self.visit_if_present(arena, return_type);

        let fn_handle = self.table.scope(fn_scope).owner;
        self.table.symbol_mut(fn_handle).apply_header(access, modifiers);
        if let Symbol::Function(f) = self.table.symbol_mut(fn_handle) {
            f.body = body;
            f.return_hint = TypeHint { explicit_type_expr: return_type, initializer: NodeId::NONE, defining_scope: fn_scope, body };
        }

        self.visit_if_present(arena, body);
        self.table.exit_scope();
    }

    /// Record a just-defined parameter on the enclosing function symbol's
    /// parameter list (the function is always the scope we are currently
    /// inside, since parameters are only ever visited from
    /// [`Self::bind_function`]).
    fn register_parameter(&mut self, name: &str) {
        let scope = self.table.current_scope();
        let Some(handle) = self.table.lookup_local(scope, name) else { return };
        let fn_handle = self.table.scope(scope).owner;
        if fn_handle.is_none() {
            return;
        }
        if let Symbol::Function(f) = self.table.symbol_mut(fn_handle) {
            f.parameters.push(handle);
        }
    }
}
