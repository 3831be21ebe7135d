//! Visitor framework.
//!
//! The source's `accept(visitor)` double dispatch is replaced (per the
//! design notes: "either a generated match on the node variant tag, or a
//! trait/interface with per-variant methods") with a `Visitor` trait that
//! has one method per node family, each defaulting to "walk my children",
//! plus a free `walk_children` function every node variant is reachable
//! from. Implementors override only the hooks they care about.

use crate::arena::{Arena, NodeId};
use crate::node::NodeKind;

pub trait Visitor {
    fn visit(&mut self, arena: &Arena, id: NodeId) {
        walk_children(self, arena, id);
    }
}

/// Every direct child of `id`, in source order. This is the single place
/// that knows how to destructure every `NodeKind` variant, so adding a node
/// kind only requires updating this function and the resolver/builder hooks
/// that care about it.
#[must_use]
pub fn children(arena: &Arena, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    push_children(arena, id, &mut out);
    out
}

fn push_children(arena: &Arena, id: NodeId, out: &mut Vec<NodeId>) {
    if id.is_none() {
        return;
    }
    match &arena.get(id).kind {
        NodeKind::CompilationUnit { usings, declarations } => {
            out.extend(usings.iter().copied());
            out.extend(declarations.iter().copied());
        }
        NodeKind::UsingDirective { .. } => {}
        NodeKind::NamespaceDecl { members, .. } => out.extend(members.iter().copied()),
        NodeKind::TypeDecl { members, .. } => out.extend(members.iter().copied()),
        NodeKind::EnumDecl { cases, .. } => out.extend(cases.iter().copied()),
        NodeKind::EnumCaseDecl { associated_types, .. } => out.extend(associated_types.iter().copied()),
        NodeKind::FunctionDecl { parameters, return_type, body, .. } => {
            out.extend(parameters.iter().copied());
            push_some(*return_type, out);
            push_some(*body, out);
        }
        NodeKind::ConstructorDecl { parameters, body, .. } => {
            out.extend(parameters.iter().copied());
            push_some(*body, out);
        }
        NodeKind::ParameterDecl { type_expr, default_value, .. } => {
            push_some(*type_expr, out);
            push_some(*default_value, out);
        }
        NodeKind::VariableDecl { type_expr, initializer, .. } => {
            push_some(*type_expr, out);
            push_some(*initializer, out);
        }
        NodeKind::PropertyDecl { type_expr, initializer, getter, setter, .. } => {
            push_some(*type_expr, out);
            push_some(*initializer, out);
            push_some(*getter, out);
            push_some(*setter, out);
        }
        NodeKind::PropertyAccessor { body, expression, .. } => {
            push_some(*body, out);
            push_some(*expression, out);
        }
        NodeKind::Block { statements } => out.extend(statements.iter().copied()),
        NodeKind::ExpressionStmt { expr } => push_some(*expr, out),
        NodeKind::IfStmt { condition, then_branch, else_branch } => {
            out.push(*condition);
            out.push(*then_branch);
            push_some(*else_branch, out);
        }
        NodeKind::WhileStmt { condition, body } => {
            out.push(*condition);
            out.push(*body);
        }
        NodeKind::ForStmt { init, condition, step, body } => {
            push_some(*init, out);
            push_some(*condition, out);
            push_some(*step, out);
            out.push(*body);
        }
        NodeKind::ForInStmt { iterable, body, .. } => {
            out.push(*iterable);
            out.push(*body);
        }
        NodeKind::ReturnStmt { expr } => push_some(*expr, out),
        NodeKind::BreakStmt | NodeKind::ContinueStmt | NodeKind::EmptyStmt => {}
        NodeKind::LiteralExpr { .. } | NodeKind::NameExpr { .. } | NodeKind::ThisExpr => {}
        NodeKind::BinaryExpr { left, right, .. } => {
            out.push(*left);
            out.push(*right);
        }
        NodeKind::UnaryExpr { operand, .. } => out.push(*operand),
        NodeKind::AssignmentExpr { target, value, .. } => {
            out.push(*target);
            out.push(*value);
        }
        NodeKind::CallExpr { callee, arguments } => {
            out.push(*callee);
            out.extend(arguments.iter().copied());
        }
        NodeKind::MemberAccessExpr { object, .. } => out.push(*object),
        NodeKind::IndexerExpr { object, index } => {
            out.push(*object);
            out.push(*index);
        }
        NodeKind::ParenthesizedExpr { inner } => out.push(*inner),
        NodeKind::NewExpr { type_expr, arguments } => {
            out.push(*type_expr);
            out.extend(arguments.iter().copied());
        }
        NodeKind::CastExpr { target_type, expr } => {
            out.push(*target_type);
            out.push(*expr);
        }
        NodeKind::ConditionalExpr { condition, then_expr, else_expr } => {
            out.push(*condition);
            out.push(*then_expr);
            out.push(*else_expr);
        }
        NodeKind::RangeExpr { start, end, step, .. } => {
            push_some(*start, out);
            push_some(*end, out);
            push_some(*step, out);
        }
        NodeKind::ArrayLiteralExpr { elements } => out.extend(elements.iter().copied()),
        NodeKind::MatchExpr { scrutinee, arms } => {
            out.push(*scrutinee);
            out.extend(arms.iter().copied());
        }
        NodeKind::MatchArm { guard, body, .. } => {
            push_some(*guard, out);
            out.push(*body);
        }
        NodeKind::TypedIdentifierExpr { type_expr, .. } => out.push(*type_expr),
        NodeKind::SimpleNameType { .. } => {}
        NodeKind::QualifiedNameType { qualifier, .. } => out.push(*qualifier),
        NodeKind::ArrayOfType { element, .. } => out.push(*element),
        NodeKind::FunctionOfType { parameters, return_type } => {
            out.extend(parameters.iter().copied());
            out.push(*return_type);
        }
        NodeKind::GenericInstanceType { generic, arguments } => {
            out.push(*generic);
            out.extend(arguments.iter().copied());
        }
        NodeKind::Error { .. } => {}
    }
}

fn push_some(id: NodeId, out: &mut Vec<NodeId>) {
    if !id.is_none() {
        out.push(id);
    }
}

/// Default traversal: visit every direct child of `id`.
pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, arena: &Arena, id: NodeId) {
    for child in children(arena, id) {
        visitor.visit(arena, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myre_common::Span;

    #[test]
    fn children_of_binary_expr_are_left_and_right() {
        let mut arena = Arena::new();
        let left = arena.alloc(
            NodeKind::LiteralExpr { kind: crate::node::LiteralKind::Integer, text: "1".into() },
            Span::at(0),
            false,
        );
        let right = arena.alloc(
            NodeKind::LiteralExpr { kind: crate::node::LiteralKind::Integer, text: "2".into() },
            Span::at(1),
            false,
        );
        let bin = arena.alloc(
            NodeKind::BinaryExpr { op: crate::node::BinaryOp::Add, left, right },
            Span::at(0),
            false,
        );
        assert_eq!(children(&arena, bin), vec![left, right]);
    }

    struct CountingVisitor {
        visited: usize,
    }

    impl Visitor for CountingVisitor {
        fn visit(&mut self, arena: &Arena, id: NodeId) {
            self.visited += 1;
            walk_children(self, arena, id);
        }
    }

    #[test]
    fn visitor_walks_entire_subtree() {
        let mut arena = Arena::new();
        let a = arena.alloc(NodeKind::ThisExpr, Span::at(0), false);
        let b = arena.alloc(NodeKind::ThisExpr, Span::at(1), false);
        let block = arena.alloc(
            NodeKind::Block { statements: vec![a, b] },
            Span::at(0),
            false,
        );
        let mut v = CountingVisitor { visited: 0 };
        v.visit(&arena, block);
        assert_eq!(v.visited, 3);
    }
}
