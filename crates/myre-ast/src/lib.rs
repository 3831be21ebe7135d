//! AST node hierarchy, arena allocation, and visitor framework for Myre
//! (spec §3.2, and the "AST & visitor framework" component of §2).

mod arena;
mod node;
mod visitor;

pub use arena::{Arena, Node, NodeId};
pub use node::{
    AccessorKind, AssignOp, BinaryOp, DeclHeader, LiteralKind, Name, NodeKind, UnaryOp,
};
pub use visitor::{children, walk_children, Visitor};
