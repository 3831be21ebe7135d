//! Type expressions: simple name, qualified name, array-of, function-of,
//! generic instantiation (spec §3.2 "Type expressions").

use myre_ast::NodeId;
use myre_ast::NodeKind;
use myre_scanner::SyntaxKind;

use super::Parser;

impl<'src> Parser<'src> {
    /// Try to parse a type expression. Always checkpoints and restores on
    /// failure (spec §4.3.4): returns `None` rather than emitting an
    /// `ErrorNode`, since callers use this for disambiguation (is this a
    /// typed declaration or an expression statement?).
    pub(super) fn try_parse_type(&mut self) -> Option<NodeId> {
        let checkpoint = self.checkpoint();
        match self.parse_type_inner() {
            Some(id) => Some(id),
            None => {
                self.restore(checkpoint);
                None
            }
        }
    }

    fn parse_type_inner(&mut self) -> Option<NodeId> {
        let mut ty = if self.check(SyntaxKind::LeftParen) {
            self.parse_function_type()?
        } else if self.check(SyntaxKind::Identifier) {
            self.parse_name_type()?
        } else {
            return None;
        };

        // Generic instantiation: `Name<Arg, Arg>`. Only attempted right
        // after a bare name, never re-applied to an array/function type.
        if self.check(SyntaxKind::Less) {
            if let Some(generic) = self.try_parse_generic_args(ty) {
                ty = generic;
            }
        }

        // Array suffixes: repeated `[]` pairs, left to right, each adding
        // one rank.
        let mut rank = 0u32;
        let start_span = self.arena_span(ty);
        let mut last_span = start_span;
        while self.check(SyntaxKind::LeftBracket) && self.peek_kind(1) == SyntaxKind::RightBracket {
            self.cursor.advance();
            last_span = self.cursor.current().span;
            self.cursor.advance();
            rank += 1;
        }
        if rank > 0 {
            let span = start_span.merge(last_span);
            ty = self.alloc(NodeKind::ArrayOfType { element: ty, rank }, span, false);
        }

        Some(ty)
    }

    fn parse_name_type(&mut self) -> Option<NodeId> {
        let start = self.span_here();
        let first = self.cursor.current().text.to_string();
        self.cursor.advance();
        let mut node = self.alloc(NodeKind::SimpleNameType { name: first }, start, false);
        while self.check(SyntaxKind::Dot) && self.peek_kind(1) == SyntaxKind::Identifier {
            self.cursor.advance(); // '.'
            let seg_span = self.span_here();
            let name = self.cursor.current().text.to_string();
            self.cursor.advance();
            let span = start.merge(seg_span);
            node = self.alloc(NodeKind::QualifiedNameType { qualifier: node, name }, span, false);
        }
        Some(node)
    }

    fn parse_function_type(&mut self) -> Option<NodeId> {
        let start = self.span_here();
        self.cursor.advance(); // '('
        let mut parameters = Vec::new();
        if !self.check(SyntaxKind::RightParen) {
            loop {
                let param = self.try_parse_type()?;
                parameters.push(param);
                if self.check(SyntaxKind::Comma) {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        if !self.check(SyntaxKind::RightParen) {
            return None;
        }
        self.cursor.advance();
        if !self.check(SyntaxKind::Colon) {
            return None;
        }
        self.cursor.advance(); // ':'
        let return_type = self.try_parse_type()?;
        let span = start.merge(self.arena_span(return_type));
        Some(self.alloc(NodeKind::FunctionOfType { parameters, return_type }, span, false))
    }

    fn try_parse_generic_args(&mut self, generic: NodeId) -> Option<NodeId> {
        let checkpoint = self.checkpoint();
        let start = self.arena_span(generic);
        self.cursor.advance(); // '<'
        let mut arguments = Vec::new();
        if !self.check(SyntaxKind::Greater) {
            loop {
                match self.try_parse_type() {
                    Some(arg) => arguments.push(arg),
                    None => {
                        self.restore(checkpoint);
                        return None;
                    }
                }
                if self.check(SyntaxKind::Comma) {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        if !self.check(SyntaxKind::Greater) {
            self.restore(checkpoint);
            return None;
        }
        let close_span = self.span_here();
        self.cursor.advance(); // '>'
        let span = start.merge(close_span);
        Some(self.alloc(NodeKind::GenericInstanceType { generic, arguments }, span, false))
    }
}
