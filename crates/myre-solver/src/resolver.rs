//! `TypeResolver`: turns a seeded AST into a fully type-annotated tree by
//! solving a system of equality constraints over the `Unresolved` unknowns
//! (spec §4.5).
//!
//! The resolver leans on two things the earlier passes already did: the
//! parser gave every node a span, and [`myre_binder::build`] already
//! stamped every node's `containing_scope`. That means this pass never
//! needs its own scope stack — `arena.get(id).containing_scope.get()` is
//! always the right scope to resolve a name in, the same way `original_source`'s
//! `TypeChecker` reads scope off the AST rather than re-deriving it.

use myre_ast::{Arena, BinaryOp, LiteralKind, Name, NodeId, NodeKind, UnaryOp, Visitor};
use myre_binder::{Symbol, SymbolTable, TypeHint};
use myre_common::{limits, Diagnostic, ScopeHandle, Span, SymbolHandle, TypeHandle};

use crate::registry::TypeRegistry;

/// Resolve every type in a parsed, bound compilation unit (spec §4.5.2's
/// fixed-point pass loop). Mutates `table`'s symbols (via `set_resolved_type`/
/// `mark_symbol_resolved`) and every node's `resolved_type`/`resolved_symbol`
/// cell in place.
pub fn resolve(arena: &Arena, root: NodeId, table: &mut SymbolTable, registry: &mut TypeRegistry) -> Vec<Diagnostic> {
    let _span = tracing::debug_span!("resolve").entered();
    seed_symbol_types(table, registry);
    let mut raw_diagnostics = Vec::new();
    let mut pass = 0;
    loop {
        let mut pass_visitor = Pass { arena, table: &mut *table, registry: &mut *registry, diagnostics: Vec::new(), substitutions: 0 };
        pass_visitor.visit(arena, root);
        let substitutions = pass_visitor.substitutions;
        raw_diagnostics.extend(pass_visitor.diagnostics);
        pass += 1;
        if substitutions == 0 || pass >= limits::MAX_RESOLVER_PASSES {
            break;
        }
    }

    let mut finalize = Finalize { registry: &mut *registry };
    finalize.visit(arena, root);
    finalize_symbol_types(table, registry);
    report_unresolved(arena, root, registry, &mut raw_diagnostics);

    tracing::debug!(passes = pass, diagnostics = raw_diagnostics.len(), "resolve complete");
    dedupe(raw_diagnostics)
}

fn dedupe(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = rustc_hash::FxHashSet::default();
    diagnostics.into_iter().filter(|d| seen.insert((d.span, d.message.clone()))).collect()
}

/// Give every typed symbol (function, variable, parameter, property) a
/// fresh `Unresolved` placeholder before the first pass, mirroring the
/// unification variable the declaration would receive at the moment it is
/// bound in `original_source`'s `TypeChecker::visit`. The binder itself
/// cannot do this: it has no `TypeRegistry` to allocate from (spec's
/// binder/solver module boundary).
fn seed_symbol_types(table: &mut SymbolTable, registry: &mut TypeRegistry) {
    for index in 0..table.symbol_count() {
        let handle = SymbolHandle::from(index);
        if table.symbol(handle).resolved_type().is_some() {
            let fresh = registry.fresh_unresolved();
            table.symbol(handle).set_resolved_type(fresh);
        }
    }
}

/// Rewrite every typed symbol's `resolved_type` to its canonical,
/// post-unification representative, the symbol-table counterpart to
/// `Finalize`'s AST walk. Without this, a caller reading e.g.
/// `FunctionSymbol::return_type` after [`resolve`] returns would still see
/// the fresh `Unresolved` handle `seed_symbol_types` installed, never the
/// concrete type the fixed point converged on.
fn finalize_symbol_types(table: &mut SymbolTable, registry: &mut TypeRegistry) {
    for index in 0..table.symbol_count() {
        let handle = SymbolHandle::from(index);
        if let Some(ty) = table.symbol(handle).resolved_type() {
            table.symbol(handle).set_resolved_type(registry.apply_substitution(ty));
        }
    }
}

/// One full visitor pass over the compilation unit (spec §4.5.2's "each pass
/// may replace an `Unresolved` with a concrete type, resolve a symbol's
/// type from its hint, infer a return/property type, or raise diagnostics").
struct Pass<'a> {
    arena: &'a Arena,
    table: &'a mut SymbolTable,
    registry: &'a mut TypeRegistry,
    diagnostics: Vec<Diagnostic>,
    substitutions: u32,
}

impl<'a> Pass<'a> {
    fn span(&self, id: NodeId) -> Span {
        self.arena.get(id).span
    }

    fn scope_of(&self, id: NodeId) -> ScopeHandle {
        self.arena.get(id).containing_scope.get()
    }

    fn set_type(&self, id: NodeId, ty: TypeHandle) {
        self.arena.get(id).resolved_type.set(ty);
    }

    fn type_of(&self, id: NodeId) -> TypeHandle {
        self.arena.get(id).resolved_type.get()
    }

    fn set_symbol(&self, id: NodeId, symbol: SymbolHandle) {
        self.arena.get(id).resolved_symbol.set(symbol);
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    /// Unify and surface a mismatch with diagnostic *context* (spec
    /// §4.5.4's "type mismatch in context (assignment, return,
    /// condition, etc.)").
    fn unify_in_context(&mut self, id: NodeId, a: TypeHandle, b: TypeHandle, context: &str) {
        if let Err((name_a, name_b)) = self.registry.unify(a, b) {
            self.error(self.span(id), format!("type mismatch in {context}: cannot unify '{name_a}' with '{name_b}'"));
        } else {
            self.substitutions += 1;
        }
    }

    fn resolve_type_expr(&mut self, id: NodeId, scope: ScopeHandle) -> TypeHandle {
        if id.is_none() {
            return self.registry.fresh_unresolved();
        }
        match &self.arena.get(id).kind {
            NodeKind::SimpleNameType { name } => self.resolve_name_or_error(id, name, scope),
            NodeKind::QualifiedNameType { .. } => {
                let dotted = flatten_qualified(self.arena, id);
                self.resolve_name_or_error(id, &dotted, scope)
            }
            NodeKind::ArrayOfType { element, rank } => {
                let element_ty = self.resolve_type_expr(*element, scope);
                self.registry.array(element_ty, *rank)
            }
            NodeKind::FunctionOfType { parameters, return_type } => {
                let params: Vec<TypeHandle> = parameters.iter().map(|p| self.resolve_type_expr(*p, scope)).collect();
                let ret = self.resolve_type_expr(*return_type, scope);
                self.registry.function(ret, &params)
            }
            NodeKind::GenericInstanceType { generic, arguments } => {
                let base = self.resolve_type_expr(*generic, scope);
                let args: Vec<TypeHandle> = arguments.iter().map(|a| self.resolve_type_expr(*a, scope)).collect();
                match self.registry.data(base).clone() {
                    crate::registry::TypeData::Defined(sym) => self.registry.generic(sym, args, self.table),
                    _ => {
                        self.error(self.span(id), "generic arguments applied to a non-generic type");
                        self.registry.fresh_unresolved()
                    }
                }
            }
            _ => self.registry.fresh_unresolved(),
        }
    }

    fn resolve_name_or_error(&mut self, id: NodeId, name: &str, scope: ScopeHandle) -> TypeHandle {
        match self.registry.resolve_name(name, scope, self.table) {
            Some(ty) => ty,
            None => {
                self.error(self.span(id), format!("identifier not found: '{name}'"));
                self.registry.fresh_unresolved()
            }
        }
    }

    /// Consume a typed symbol's [`TypeHint`] in the order spec §4.5.3
    /// prescribes: explicit `TypeRef` -> initializer/getter ->
    /// body-return-inference -> `void`.
    fn resolve_symbol_hint(&mut self, symbol: SymbolHandle, decl_span: Span) {
        if self.table.symbol(symbol).is_resolved() {
            return;
        }
        let Some(hint) = self.table.symbol(symbol).type_hint().copied() else { return };
        let current = self.table.symbol(symbol).resolved_type().unwrap_or(TypeHandle::NONE);
        if current.is_none() {
            return;
        }

        if !hint.explicit_type_expr.is_none() {
            let declared = self.resolve_type_expr(hint.explicit_type_expr, hint.defining_scope);
            self.unify_in_context(hint.explicit_type_expr, current, declared, "variable declaration");
            if !hint.initializer.is_none() {
                self.visit(self.arena, hint.initializer);
                let init_ty = self.type_of(hint.initializer);
                if !self.registry.is_unresolved(init_ty) {
                    self.unify_in_context(hint.initializer, declared, init_ty, "variable initialization");
                }
            }
            self.table.mark_symbol_resolved(symbol);
            return;
        }

        if !hint.initializer.is_none() {
            self.visit(self.arena, hint.initializer);
            let init_ty = self.type_of(hint.initializer);
            if !self.registry.is_unresolved(init_ty) {
                self.unify_in_context(hint.initializer, current, init_ty, "variable initialization");
                self.table.mark_symbol_resolved(symbol);
            } else {
                self.registry.unify(current, init_ty).ok();
            }
            return;
        }

        if !hint.body.is_none() {
            self.infer_return_type_from_body(symbol, current, hint);
            return;
        }

        // No explicit type, no initializer, no body: a function declared
        // with neither (e.g. `abstract`/`extern`) defaults to `void`.
        if matches!(self.table.symbol(symbol), Symbol::Function(_)) {
            self.registry.unify(current, self.registry_void()).ok();
            self.table.mark_symbol_resolved(symbol);
        }
        let _ = decl_span;
    }

    fn registry_void(&self) -> TypeHandle {
        self.registry.void()
    }

    /// Infer a function's return type from the `return` statements reached
    /// by walking its body (spec §4.5.3's `FunctionDecl` rule, §4.5.3's
    /// `ReturnStmt` rule applied in reverse). Re-run every pass until the
    /// function's return type becomes concrete; harmless to re-unify an
    /// already-consistent set of return expressions.
    fn infer_return_type_from_body(&mut self, symbol: SymbolHandle, current: TypeHandle, hint: TypeHint) {
        self.visit(self.arena, hint.body);
        let returns = collect_return_exprs(self.arena, hint.body);
        if returns.is_empty() {
            self.registry.unify(current, self.registry_void()).ok();
            self.table.mark_symbol_resolved(symbol);
            return;
        }
        let mut any_concrete = false;
        for expr in returns {
            if expr.is_none() {
                self.registry.unify(current, self.registry_void()).ok();
                continue;
            }
            let ty = self.type_of(expr);
            if self.registry.is_unresolved(ty) {
                continue;
            }
            any_concrete = true;
            self.unify_in_context(expr, current, ty, "return type inference");
        }
        if any_concrete {
            let root = self.registry.apply_substitution(current);
            if !self.registry.is_unresolved(root) {
                self.table.mark_symbol_resolved(symbol);
            }
        }
    }
}

/// Gather every `return <expr?>;` reachable from `body` without crossing
/// into a nested function (there are none in Myre's grammar: function
/// declarations are not expressions, so a `Block` never contains another
/// `FunctionDecl`).
fn collect_return_exprs(arena: &Arena, body: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_returns(arena, body, &mut out);
    out
}

fn collect_returns(arena: &Arena, id: NodeId, out: &mut Vec<NodeId>) {
    if id.is_none() {
        return;
    }
    if let NodeKind::ReturnStmt { expr } = &arena.get(id).kind {
        out.push(*expr);
    }
    for child in myre_ast::children(arena, id) {
        collect_returns(arena, child, out);
    }
}

fn flatten_qualified(arena: &Arena, id: NodeId) -> String {
    match &arena.get(id).kind {
        NodeKind::SimpleNameType { name } => name.clone(),
        NodeKind::QualifiedNameType { qualifier, name } => format!("{}.{}", flatten_qualified(arena, *qualifier), name),
        _ => String::new(),
    }
}

impl<'a> Visitor for Pass<'a> {
    fn visit(&mut self, arena: &Arena, id: NodeId) {
        if id.is_none() {
            return;
        }
        match &arena.get(id).kind {
            NodeKind::LiteralExpr { kind, .. } => {
                let ty = match kind {
                    LiteralKind::Integer => self.registry.primitive("i32"),
                    LiteralKind::Float => self.registry.primitive("f32"),
                    LiteralKind::Double => self.registry.primitive("f64"),
                    LiteralKind::Bool => self.registry.primitive("bool"),
                    LiteralKind::String => self.registry.primitive("string"),
                    LiteralKind::Char => self.registry.primitive("char"),
                }
                .expect("every literal kind maps to an installed primitive");
                self.set_type(id, ty);
            }

            NodeKind::NameExpr { name } => {
                let scope = self.scope_of(id);
                match self.table.lookup(scope, name) {
                    Some(symbol) => {
                        if let Some(ty) = self.table.symbol(symbol).resolved_type() {
                            self.set_type(id, ty);
                            self.set_symbol(id, symbol);
                        } else {
                            self.error(self.span(id), format!("identifier is not a value: '{name}'"));
                            self.set_type(id, self.registry.fresh_unresolved());
                        }
                    }
                    None => {
                        self.error(self.span(id), format!("identifier not found: '{name}'"));
                        self.set_type(id, self.registry.fresh_unresolved());
                    }
                }
            }

            NodeKind::ThisExpr => {
                let scope = self.scope_of(id);
                match self.table.enclosing_type(scope) {
                    Some(owner) => {
                        let ty = self.registry.defined(owner, self.table);
                        self.set_type(id, ty);
                        self.set_symbol(id, owner);
                    }
                    None => {
                        self.error(self.span(id), "'this' used outside of a type body");
                        self.set_type(id, self.registry.fresh_unresolved());
                    }
                }
            }

            NodeKind::BinaryExpr { op, left, right } => {
                self.visit(arena, *left);
                self.visit(arena, *right);
                let (lt, rt) = (self.type_of(*left), self.type_of(*right));
                self.unify_in_context(id, lt, rt, "binary expression");
                let ty = if op.is_comparison() { self.registry.bool_type() } else { self.registry.apply_substitution(lt) };
                self.set_type(id, ty);
            }

            NodeKind::UnaryExpr { op, operand, .. } => {
                self.visit(arena, *operand);
                let operand_ty = self.type_of(*operand);
                let ty = match op {
                    UnaryOp::Not => {
                        self.unify_in_context(id, operand_ty, self.registry.bool_type(), "unary '!'");
                        self.registry.bool_type()
                    }
                    UnaryOp::Neg | UnaryOp::Increment | UnaryOp::Decrement => operand_ty,
                    UnaryOp::BitAnd | UnaryOp::Deref => {
                        self.error(self.span(id), "operator not implemented");
                        self.registry.fresh_unresolved()
                    }
                };
                self.set_type(id, ty);
            }

            NodeKind::AssignmentExpr { target, value, .. } => {
                self.visit(arena, *target);
                self.visit(arena, *value);
                let (target_ty, value_ty) = (self.type_of(*target), self.type_of(*value));
                self.unify_in_context(id, target_ty, value_ty, "assignment");
                self.set_type(id, self.registry.apply_substitution(target_ty));
            }

            NodeKind::CallExpr { callee, arguments } => {
                for arg in arguments {
                    self.visit(arena, *arg);
                }
                self.resolve_call(id, *callee, arguments);
            }

            NodeKind::MemberAccessExpr { object, member } => {
                self.visit(arena, *object);
                self.resolve_member_access(id, *object, member);
            }

            NodeKind::IndexerExpr { object, index } => {
                self.visit(arena, *object);
                self.visit(arena, *index);
                let object_ty = self.registry.apply_substitution(self.type_of(*object));
                let index_ty = self.type_of(*index);
                self.unify_in_context(*index, index_ty, self.registry.i32_type(), "array index");
                match self.registry.data(object_ty).clone() {
                    crate::registry::TypeData::Array { element, .. } => self.set_type(id, element),
                    _ => {
                        self.error(self.span(*object), format!("cannot index into '{}'", self.registry.display_name(object_ty)));
                        self.set_type(id, self.registry.fresh_unresolved());
                    }
                }
            }

            NodeKind::ParenthesizedExpr { inner } => {
                self.visit(arena, *inner);
                self.set_type(id, self.type_of(*inner));
            }

            NodeKind::NewExpr { type_expr, arguments } => {
                for arg in arguments {
                    self.visit(arena, *arg);
                }
                let scope = self.scope_of(id);
                let ty = self.resolve_type_expr(*type_expr, scope);
                self.set_type(id, ty);
            }

            NodeKind::CastExpr { target_type, expr } => {
                self.visit(arena, *expr);
                let scope = self.scope_of(id);
                let ty = self.resolve_type_expr(*target_type, scope);
                self.set_type(id, ty);
            }

            NodeKind::ConditionalExpr { condition, then_expr, else_expr } => {
                self.visit(arena, *condition);
                self.visit(arena, *then_expr);
                self.visit(arena, *else_expr);
                let cond_ty = self.type_of(*condition);
                self.unify_in_context(*condition, cond_ty, self.registry.bool_type(), "ternary condition");
                let (then_ty, else_ty) = (self.type_of(*then_expr), self.type_of(*else_expr));
                self.unify_in_context(id, then_ty, else_ty, "ternary branches");
                self.set_type(id, self.registry.apply_substitution(then_ty));
            }

            NodeKind::RangeExpr { start, end, step, .. } => {
                if !start.is_none() {
                    self.visit(arena, *start);
                }
                if !end.is_none() {
                    self.visit(arena, *end);
                }
                if !step.is_none() {
                    self.visit(arena, *step);
                }
                let range_ty = self.registry.primitive("range").expect("range primitive is installed");
                self.set_type(id, range_ty);
            }

            NodeKind::ArrayLiteralExpr { elements } => {
                for element in elements {
                    self.visit(arena, *element);
                }
                if elements.is_empty() {
                    // Awaiting context (spec §4.5.3): stays `Unresolved`.
                    self.set_type(id, self.registry.fresh_unresolved());
                } else {
                    let first = self.type_of(elements[0]);
                    for element in &elements[1..] {
                        let ty = self.type_of(*element);
                        self.unify_in_context(*element, first, ty, "array literal element");
                    }
                    let element_ty = self.registry.apply_substitution(first);
                    let array_ty = self.registry.array(element_ty, 1);
                    self.set_type(id, array_ty);
                }
            }

            NodeKind::MatchExpr { scrutinee, arms } => {
                self.visit(arena, *scrutinee);
                for arm in arms {
                    self.visit(arena, *arm);
                }
                if arms.is_empty() {
                    self.set_type(id, self.registry.fresh_unresolved());
                } else {
                    let first = self.type_of(arms[0]);
                    for arm in &arms[1..] {
                        let ty = self.type_of(*arm);
                        self.unify_in_context(*arm, first, ty, "match arms");
                    }
                    self.set_type(id, self.registry.apply_substitution(first));
                }
            }

            NodeKind::MatchArm { guard, body, .. } => {
                if !guard.is_none() {
                    self.visit(arena, *guard);
                    let guard_ty = self.type_of(*guard);
                    self.unify_in_context(*guard, guard_ty, self.registry.bool_type(), "match guard");
                }
                self.visit(arena, *body);
                self.set_type(id, self.type_of(*body));
            }

            NodeKind::TypedIdentifierExpr { type_expr, .. } => {
                let scope = self.scope_of(id);
                let ty = self.resolve_type_expr(*type_expr, scope);
                self.set_type(id, ty);
            }

            NodeKind::ExpressionStmt { expr } => {
                self.visit(arena, *expr);
            }

            NodeKind::IfStmt { condition, then_branch, else_branch } => {
                self.visit(arena, *condition);
                let cond_ty = self.type_of(*condition);
                self.unify_in_context(*condition, cond_ty, self.registry.bool_type(), "if condition");
                self.visit(arena, *then_branch);
                if !else_branch.is_none() {
                    self.visit(arena, *else_branch);
                }
            }

            NodeKind::WhileStmt { condition, body } => {
                self.visit(arena, *condition);
                let cond_ty = self.type_of(*condition);
                self.unify_in_context(*condition, cond_ty, self.registry.bool_type(), "while condition");
                self.visit(arena, *body);
            }

            NodeKind::ForStmt { init, condition, step, body } => {
                if !init.is_none() {
                    self.visit(arena, *init);
                }
                if !condition.is_none() {
                    self.visit(arena, *condition);
                    let cond_ty = self.type_of(*condition);
                    self.unify_in_context(*condition, cond_ty, self.registry.bool_type(), "for condition");
                }
                if !step.is_none() {
                    self.visit(arena, *step);
                }
                self.visit(arena, *body);
            }

            NodeKind::ForInStmt { iterable, body, .. } => {
                self.visit(arena, *iterable);
                self.visit(arena, *body);
            }

            NodeKind::ReturnStmt { expr } => {
                if !expr.is_none() {
                    self.visit(arena, *expr);
                }
                let scope = self.scope_of(id);
                if let Some(function) = self.table.enclosing_function(scope) {
                    let return_ty = self.table.symbol(function).resolved_type().unwrap_or(TypeHandle::NONE);
                    if !return_ty.is_none() {
                        let expr_ty = if expr.is_none() { self.registry.void() } else { self.type_of(*expr) };
                        self.unify_in_context(id, expr_ty, return_ty, "return statement");
                    }
                } else {
                    self.error(self.span(id), "'return' used outside of a function");
                }
            }

            NodeKind::VariableDecl { name, type_expr, initializer, .. } => {
                let scope = self.scope_of(id);
                if let Some(symbol) = self.table.lookup_local(scope, name) {
                    self.resolve_symbol_hint(symbol, self.span(id));
                }
                if !type_expr.is_none() {
                    self.visit(arena, *type_expr);
                }
                if !initializer.is_none() && self.type_of(*initializer).is_none() {
                    self.visit(arena, *initializer);
                }
            }

            NodeKind::ParameterDecl { name, type_expr, default_value } => {
                let scope = self.scope_of(id);
                if let Some(symbol) = self.table.lookup_local(scope, name) {
                    self.resolve_symbol_hint(symbol, self.span(id));
                }
                if !type_expr.is_none() {
                    self.visit(arena, *type_expr);
                }
                if !default_value.is_none() {
                    self.visit(arena, *default_value);
                }
            }

            NodeKind::PropertyDecl { name, type_expr, initializer, getter, setter, .. } => {
                let scope = self.scope_of(id);
                if let Some(symbol) = self.table.lookup_local(scope, name) {
                    self.resolve_symbol_hint(symbol, self.span(id));
                }
                if !type_expr.is_none() {
                    self.visit(arena, *type_expr);
                }
                if !initializer.is_none() {
                    self.visit(arena, *initializer);
                }
                if !getter.is_none() {
                    self.visit(arena, *getter);
                }
                if !setter.is_none() {
                    self.visit(arena, *setter);
                }
            }

            NodeKind::PropertyAccessor { body, expression, .. } => {
                if !body.is_none() {
                    self.visit(arena, *body);
                }
                if !expression.is_none() {
                    self.visit(arena, *expression);
                }
            }

            NodeKind::FunctionDecl { name, parameters, return_type, body, .. } => {
                for param in parameters {
                    self.visit(arena, *param);
                }
                if !return_type.is_none() {
                    self.visit(arena, *return_type);
                }
                if let Some(symbol) = self.function_symbol_for(*body, *return_type, parameters, id, name) {
                    self.resolve_symbol_hint(symbol, self.span(id));
                }
                if !body.is_none() {
                    self.visit(arena, *body);
                }
            }

            NodeKind::ConstructorDecl { parameters, body, .. } => {
                for param in parameters {
                    self.visit(arena, *param);
                }
                if !body.is_none() {
                    self.visit(arena, *body);
                }
            }

            _ => myre_ast::walk_children(self, arena, id),
        }
    }
}

impl<'a> Pass<'a> {
    /// Recover the specific `Function` symbol a `FunctionDecl` node bound
    /// (not a `FunctionGroup` it may have coalesced into), by reading the
    /// owning symbol off the function's own scope — reached through any
    /// child (body, return type, or a parameter) that was annotated while
    /// that scope was current (see `myre_binder::builder::bind_function`).
    /// Falls back to a by-name lookup, accepting that an overloaded name
    /// may resolve to its `FunctionGroup` instead (overload resolution is
    /// explicitly deferred, spec §9's Open Questions).
    fn function_symbol_for(
        &self,
        body: NodeId,
        return_type: NodeId,
        parameters: &[NodeId],
        decl_id: NodeId,
        name: &Name,
    ) -> Option<SymbolHandle> {
        let fn_scope = [body, return_type].into_iter().chain(parameters.iter().copied()).find(|id| !id.is_none()).map(|id| self.scope_of(id));
        if let Some(scope) = fn_scope {
            let owner = self.table.scope(scope).owner;
            if !owner.is_none() {
                return Some(owner);
            }
        }
        let decl_scope = self.scope_of(decl_id);
        let found = self.table.lookup_local(decl_scope, name)?;
        matches!(self.table.symbol(found), Symbol::Function(_)).then_some(found)
    }

    fn resolve_call(&mut self, call_id: NodeId, callee: NodeId, arguments: &[NodeId]) {
        match &self.arena.get(callee).kind {
            NodeKind::NameExpr { name } => {
                let scope = self.scope_of(callee);
                match self.table.lookup(scope, name) {
                    Some(symbol) => self.annotate_call_target(call_id, callee, symbol, arguments.len()),
                    None => {
                        self.error(self.span(callee), format!("identifier not found: '{name}'"));
                        self.set_type(call_id, self.registry.fresh_unresolved());
                    }
                }
            }
            NodeKind::MemberAccessExpr { object, member } => {
                self.visit(self.arena, *object);
                let object_ty = self.registry.apply_substitution(self.type_of(*object));
                match self.registry.data(object_ty).clone() {
                    crate::registry::TypeData::Defined(type_symbol) => {
                        let Some(type_scope) = self.table.symbol(type_symbol).as_scope() else {
                            self.error(self.span(callee), format!("'{member}' is not callable"));
                            self.set_type(call_id, self.registry.fresh_unresolved());
                            return;
                        };
                        match self.table.lookup_local(type_scope, member) {
                            Some(method) => {
                                self.set_symbol(callee, method);
                                self.annotate_call_target(call_id, callee, method, arguments.len());
                            }
                            None => {
                                self.error(self.span(callee), format!("no such member '{member}' on '{}'", self.registry.display_name(object_ty)));
                                self.set_type(call_id, self.registry.fresh_unresolved());
                            }
                        }
                    }
                    _ => {
                        self.error(self.span(callee), format!("expression is not callable: '{member}'"));
                        self.set_type(call_id, self.registry.fresh_unresolved());
                    }
                }
            }
            _ => {
                self.visit(self.arena, callee);
                self.error(self.span(callee), "expression is not callable");
                self.set_type(call_id, self.registry.fresh_unresolved());
            }
        }
    }

    fn annotate_call_target(&mut self, call_id: NodeId, callee: NodeId, symbol: SymbolHandle, argument_count: usize) {
        // Overload resolution is out of scope (spec §9's Open Questions);
        // best-effort picks the symbol itself, or its first overload.
        let function_handle = match self.table.symbol(symbol) {
            Symbol::Function(_) => Some(symbol),
            Symbol::FunctionGroup(g) => g.overloads.first().copied(),
            _ => None,
        };
        let Some(function_handle) = function_handle else {
            self.error(self.span(callee), "expression is not callable");
            self.set_type(call_id, self.registry.fresh_unresolved());
            return;
        };
        let Some(return_ty) = self.table.symbol(function_handle).resolved_type() else {
            self.set_symbol(callee, symbol);
            self.set_symbol(call_id, symbol);
            self.set_type(call_id, self.registry.fresh_unresolved());
            return;
        };
        self.set_symbol(callee, symbol);
        self.set_symbol(call_id, symbol);
        self.set_type(call_id, return_ty);
        self.check_argument_count(call_id, function_handle, argument_count);
    }

    /// Report an arity mismatch against the call's resolved overload,
    /// naming its full signature (spec §4.5.4's "not callable"/"no such
    /// overload" diagnostics).
    fn check_argument_count(&mut self, call_id: NodeId, function_handle: SymbolHandle, argument_count: usize) {
        let parameters: Vec<SymbolHandle> = match self.table.symbol(function_handle) {
            Symbol::Function(f) => f.parameters.iter().copied().collect(),
            _ => return,
        };
        if parameters.len() == argument_count {
            return;
        }
        let param_types: Vec<TypeHandle> = parameters.iter().map(|p| self.table.symbol(*p).resolved_type().unwrap_or(TypeHandle::NONE)).collect();
        let registry = &*self.registry;
        let name_of = |ty: TypeHandle| registry.display_name(ty);
        let signature = match self.table.symbol(function_handle) {
            Symbol::Function(f) => f.display_signature(&param_types, &name_of),
            _ => return,
        };
        let expected = parameters.len();
        self.error(self.span(call_id), format!("no such overload: '{signature}' expects {expected} argument(s), found {argument_count}"));
    }

    fn resolve_member_access(&mut self, id: NodeId, object: NodeId, member: &Name) {
        let object_ty = self.registry.apply_substitution(self.type_of(object));
        match self.registry.data(object_ty).clone() {
            crate::registry::TypeData::Defined(type_symbol) => {
                let Some(type_scope) = self.table.symbol(type_symbol).as_scope() else {
                    self.error(self.span(id), format!("no such member '{member}'"));
                    self.set_type(id, self.registry.fresh_unresolved());
                    return;
                };
                match self.table.lookup_local(type_scope, member) {
                    Some(member_symbol) => {
                        self.set_symbol(id, member_symbol);
                        match self.table.symbol(member_symbol).resolved_type() {
                            Some(ty) => self.set_type(id, ty),
                            None => self.set_type(id, self.registry.fresh_unresolved()),
                        }
                    }
                    None => {
                        self.error(self.span(id), format!("no such member '{member}' on '{}'", self.registry.display_name(object_ty)));
                        self.set_type(id, self.registry.fresh_unresolved());
                    }
                }
            }
            _ => {
                self.error(self.span(object), format!("no such member '{member}' on a non-defined type"));
                self.set_type(id, self.registry.fresh_unresolved());
            }
        }
    }
}

/// Final pass: rewrite every expression's `resolved_type` to its canonical,
/// path-compressed representative (spec §4.5.2's "final pass").
struct Finalize<'a> {
    registry: &'a mut TypeRegistry,
}

impl<'a> Visitor for Finalize<'a> {
    fn visit(&mut self, arena: &Arena, id: NodeId) {
        if id.is_none() {
            return;
        }
        let node = arena.get(id);
        let current = node.resolved_type.get();
        if !current.is_none() {
            node.resolved_type.set(self.registry.apply_substitution(current));
        }
        myre_ast::walk_children(self, arena, id);
    }
}

/// After the fixed point, report every expression whose type is still
/// `Unresolved` (spec §4.5.4's "unable to infer type").
fn report_unresolved(arena: &Arena, root: NodeId, registry: &TypeRegistry, diagnostics: &mut Vec<Diagnostic>) {
    let mut ids = Vec::new();
    collect_all(arena, root, &mut ids);
    for id in ids {
        let node = arena.get(id);
        if node.kind.is_expression() {
            let ty = node.resolved_type.get();
            if !ty.is_none() && registry.is_unresolved(ty) {
                diagnostics.push(Diagnostic::error(
                    format!("could not infer type for expression at {}..{}", node.span.start, node.span.end),
                    node.span,
                ));
            }
        }
    }
}

fn collect_all(arena: &Arena, id: NodeId, out: &mut Vec<NodeId>) {
    if id.is_none() {
        return;
    }
    out.push(id);
    for child in myre_ast::children(arena, id) {
        collect_all(arena, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myre_ast::NodeKind;
    use myre_common::Span;

    fn single_literal(kind: LiteralKind) -> (Arena, NodeId, SymbolTable, TypeRegistry) {
        let mut arena = Arena::new();
        let lit = arena.alloc(NodeKind::LiteralExpr { kind, text: "1".into() }, Span::at(0), false);
        let stmt = arena.alloc(NodeKind::ExpressionStmt { expr: lit }, Span::at(0), false);
        let block = arena.alloc(NodeKind::Block { statements: vec![stmt] }, Span::at(0), false);
        let (table, _) = myre_binder::build(&arena, block);
        (arena, block, table, TypeRegistry::new())
    }

    #[test]
    fn integer_literal_resolves_to_i32() {
        let (arena, root, mut table, mut registry) = single_literal(LiteralKind::Integer);
        resolve(&arena, root, &mut table, &mut registry);
        let NodeKind::Block { statements } = &arena.get(root).kind else { unreachable!() };
        let NodeKind::ExpressionStmt { expr } = &arena.get(statements[0]).kind else { unreachable!() };
        let ty = arena.get(*expr).resolved_type.get();
        assert_eq!(ty, registry.primitive("i32").unwrap());
    }
}
