//! AST node variants (spec §3.2).
//!
//! Node families are tagged variants, not a class tree: one `NodeKind` enum
//! covers declarations, statements, expressions, type expressions, and the
//! error placeholder. Every child link is a semantic container — an ordered
//! `Vec<NodeId>` or a single `NodeId` (using `NodeId::NONE` for "absent"
//! rather than threading `Option` through every field, mirroring how the
//! arena itself treats absence).

use myre_common::{AccessLevel, Modifiers};

use crate::arena::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    Double,
    Bool,
    String,
    Char,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Increment,
    Decrement,
    BitAnd,
    Deref,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

/// A declaration modifier header, shared by every declaration variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeclHeader {
    pub access: AccessLevel,
    pub modifiers: Modifiers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// A declarative name, owned by the node rather than borrowed, since nodes
/// outlive the token stream they were parsed from.
pub type Name = String;

#[derive(Debug)]
pub enum NodeKind {
    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------
    CompilationUnit {
        usings: Vec<NodeId>,
        declarations: Vec<NodeId>,
    },
    UsingDirective {
        path: Name,
    },
    NamespaceDecl {
        name: Name,
        members: Vec<NodeId>,
        file_scoped: bool,
    },
    TypeDecl {
        header: DeclHeader,
        name: Name,
        members: Vec<NodeId>,
    },
    EnumDecl {
        header: DeclHeader,
        name: Name,
        cases: Vec<NodeId>,
    },
    EnumCaseDecl {
        name: Name,
        associated_types: Vec<NodeId>,
    },
    FunctionDecl {
        header: DeclHeader,
        name: Name,
        parameters: Vec<NodeId>,
        return_type: NodeId,
        body: NodeId,
    },
    ConstructorDecl {
        header: DeclHeader,
        parameters: Vec<NodeId>,
        body: NodeId,
    },
    ParameterDecl {
        type_expr: NodeId,
        name: Name,
        default_value: NodeId,
    },
    VariableDecl {
        header: DeclHeader,
        type_expr: NodeId,
        name: Name,
        initializer: NodeId,
        is_field: bool,
    },
    PropertyDecl {
        header: DeclHeader,
        type_expr: NodeId,
        name: Name,
        initializer: NodeId,
        getter: NodeId,
        setter: NodeId,
    },
    PropertyAccessor {
        kind: AccessorKind,
        body: NodeId,
        expression: NodeId,
    },

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------
    Block {
        statements: Vec<NodeId>,
    },
    ExpressionStmt {
        expr: NodeId,
    },
    IfStmt {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    WhileStmt {
        condition: NodeId,
        body: NodeId,
    },
    ForStmt {
        init: NodeId,
        condition: NodeId,
        step: NodeId,
        body: NodeId,
    },
    ForInStmt {
        binding: Name,
        index_binding: Option<Name>,
        iterable: NodeId,
        body: NodeId,
    },
    ReturnStmt {
        expr: NodeId,
    },
    BreakStmt,
    ContinueStmt,
    EmptyStmt,

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------
    LiteralExpr {
        kind: LiteralKind,
        text: String,
    },
    NameExpr {
        name: Name,
    },
    BinaryExpr {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpr {
        op: UnaryOp,
        operand: NodeId,
        is_postfix: bool,
    },
    AssignmentExpr {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    CallExpr {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberAccessExpr {
        object: NodeId,
        member: Name,
    },
    IndexerExpr {
        object: NodeId,
        index: NodeId,
    },
    ParenthesizedExpr {
        inner: NodeId,
    },
    NewExpr {
        type_expr: NodeId,
        arguments: Vec<NodeId>,
    },
    ThisExpr,
    CastExpr {
        target_type: NodeId,
        expr: NodeId,
    },
    ConditionalExpr {
        condition: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    RangeExpr {
        start: NodeId,
        end: NodeId,
        inclusive: bool,
        step: NodeId,
    },
    ArrayLiteralExpr {
        elements: Vec<NodeId>,
    },
    MatchExpr {
        scrutinee: NodeId,
        arms: Vec<NodeId>,
    },
    MatchArm {
        pattern: Name,
        guard: NodeId,
        body: NodeId,
    },
    TypedIdentifierExpr {
        type_expr: NodeId,
        name: Name,
    },

    // ------------------------------------------------------------------
    // Type expressions
    // ------------------------------------------------------------------
    SimpleNameType {
        name: Name,
    },
    QualifiedNameType {
        qualifier: NodeId,
        name: Name,
    },
    ArrayOfType {
        element: NodeId,
        rank: u32,
    },
    FunctionOfType {
        parameters: Vec<NodeId>,
        return_type: NodeId,
    },
    GenericInstanceType {
        generic: NodeId,
        arguments: Vec<NodeId>,
    },

    /// A placeholder produced by the parser to keep the tree well-formed
    /// after a parse failure (spec §3.2, §4.3.4).
    Error {
        message: String,
    },
}

impl NodeKind {
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::CompilationUnit { .. }
                | NodeKind::NamespaceDecl { .. }
                | NodeKind::TypeDecl { .. }
                | NodeKind::EnumDecl { .. }
                | NodeKind::EnumCaseDecl { .. }
                | NodeKind::FunctionDecl { .. }
                | NodeKind::ConstructorDecl { .. }
                | NodeKind::ParameterDecl { .. }
                | NodeKind::VariableDecl { .. }
                | NodeKind::PropertyDecl { .. }
        )
    }

    #[must_use]
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::LiteralExpr { .. }
                | NodeKind::NameExpr { .. }
                | NodeKind::BinaryExpr { .. }
                | NodeKind::UnaryExpr { .. }
                | NodeKind::AssignmentExpr { .. }
                | NodeKind::CallExpr { .. }
                | NodeKind::MemberAccessExpr { .. }
                | NodeKind::IndexerExpr { .. }
                | NodeKind::ParenthesizedExpr { .. }
                | NodeKind::NewExpr { .. }
                | NodeKind::ThisExpr
                | NodeKind::CastExpr { .. }
                | NodeKind::ConditionalExpr { .. }
                | NodeKind::RangeExpr { .. }
                | NodeKind::ArrayLiteralExpr { .. }
                | NodeKind::MatchExpr { .. }
                | NodeKind::TypedIdentifierExpr { .. }
        )
    }
}
