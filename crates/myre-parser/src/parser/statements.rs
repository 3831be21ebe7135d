//! Statements: blocks, if/while/for/for-in, return, break, continue
//! (spec §3.2, §4.3.2).

use myre_ast::{NodeId, NodeKind};
use myre_scanner::SyntaxKind;

use super::context::{ContextGuard, ParsingContext};
use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_block(&mut self) -> NodeId {
        let start = self.span_here();
        if !self.expect(SyntaxKind::LeftBrace, "'{'") {
            return self.push_error_node("expected a block", start);
        }
        let mut statements = Vec::new();
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            statements.push(self.parse_statement());
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&statements);
        self.alloc(NodeKind::Block { statements }, span, has_errors)
    }

    fn parse_statement(&mut self) -> NodeId {
        match self.current_kind() {
            SyntaxKind::LeftBrace => self.parse_block(),
            SyntaxKind::If => self.parse_if_stmt(),
            SyntaxKind::While => self.parse_while_stmt(),
            SyntaxKind::For => self.parse_for_or_for_in_stmt(),
            SyntaxKind::Return => self.parse_return_stmt(),
            SyntaxKind::Break => self.parse_break_stmt(),
            SyntaxKind::Continue => self.parse_continue_stmt(),
            SyntaxKind::Semicolon => self.parse_empty_stmt(),
            SyntaxKind::Var => self.parse_local_variable_stmt(),
            _ => self.parse_expression_or_typed_decl_stmt(),
        }
    }

    fn parse_if_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'if'
        self.expect(SyntaxKind::LeftParen, "'('");
        let condition = self.parse_expression();
        self.expect(SyntaxKind::RightParen, "')'");
        let then_branch = self.parse_statement();
        let else_branch = if self.check(SyntaxKind::Else) {
            self.cursor.advance();
            self.parse_statement()
        } else {
            NodeId::NONE
        };
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[condition, then_branch, else_branch]);
        self.alloc(NodeKind::IfStmt { condition, then_branch, else_branch }, span, has_errors)
    }

    fn parse_while_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'while'
        self.expect(SyntaxKind::LeftParen, "'('");
        let condition = self.parse_expression();
        self.expect(SyntaxKind::RightParen, "')'");
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Loop);
        let body = self.parse_statement();
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[condition, body]);
        self.alloc(NodeKind::WhileStmt { condition, body }, span, has_errors)
    }

    /// `for (init; cond; step) body` vs `for (name [, index] in iterable)
    /// body` — disambiguated by checkpointing past the binding and looking
    /// for `in` (spec §4.3.4's "for vs for-in" item).
    fn parse_for_or_for_in_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'for'
        self.expect(SyntaxKind::LeftParen, "'('");

        if let Some(node) = self.try_parse_for_in_rest(start) {
            return node;
        }

        let init = if self.check(SyntaxKind::Semicolon) {
            NodeId::NONE
        } else if self.check(SyntaxKind::Var) {
            self.parse_local_variable_stmt()
        } else {
            let expr = self.parse_expression();
            self.expect(SyntaxKind::Semicolon, "';'");
            self.alloc(NodeKind::ExpressionStmt { expr }, self.arena_span(expr), false)
        };
        let condition = if self.check(SyntaxKind::Semicolon) {
            NodeId::NONE
        } else {
            self.parse_expression()
        };
        self.expect(SyntaxKind::Semicolon, "';'");
        let step = if self.check(SyntaxKind::RightParen) {
            NodeId::NONE
        } else {
            self.parse_expression()
        };
        self.expect(SyntaxKind::RightParen, "')'");
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Loop);
        let body = self.parse_statement();
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[init, condition, step, body]);
        self.alloc(NodeKind::ForStmt { init, condition, step, body }, span, has_errors)
    }

    fn try_parse_for_in_rest(&mut self, start: myre_common::Span) -> Option<NodeId> {
        let checkpoint = self.checkpoint();
        if !self.check(SyntaxKind::Identifier) {
            return None;
        }
        let binding = self.cursor.current().text.to_string();
        self.cursor.advance();

        let index_binding = if self.check(SyntaxKind::Comma) {
            self.cursor.advance();
            if !self.check(SyntaxKind::Identifier) {
                self.restore(checkpoint);
                return None;
            }
            let idx = self.cursor.current().text.to_string();
            self.cursor.advance();
            Some(idx)
        } else {
            None
        };

        if !self.check(SyntaxKind::In) {
            self.restore(checkpoint);
            return None;
        }
        self.cursor.advance(); // 'in'
        let iterable = self.parse_expression();
        self.expect(SyntaxKind::RightParen, "')'");
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Loop);
        let body = self.parse_statement();
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[iterable, body]);
        Some(self.alloc(
            NodeKind::ForInStmt { binding, index_binding, iterable, body },
            span,
            has_errors,
        ))
    }

    fn parse_return_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'return'
        if !self.context.in_context(ParsingContext::Function)
            && !self.context.in_context(ParsingContext::PropertyGetter)
            && !self.context.in_context(ParsingContext::PropertySetter)
        {
            self.warning("'return' outside a function body", start);
        }
        let expr = if self.check(SyntaxKind::Semicolon) {
            NodeId::NONE
        } else {
            self.parse_expression()
        };
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[expr]);
        self.alloc(NodeKind::ReturnStmt { expr }, span, has_errors)
    }

    fn parse_break_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'break'
        if !self.context.in_context(ParsingContext::Loop) {
            self.warning("'break' outside a loop", start);
        }
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        self.alloc(NodeKind::BreakStmt, span, false)
    }

    fn parse_continue_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'continue'
        if !self.context.in_context(ParsingContext::Loop) {
            self.warning("'continue' outside a loop", start);
        }
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        self.alloc(NodeKind::ContinueStmt, span, false)
    }

    fn parse_empty_stmt(&mut self) -> NodeId {
        let span = self.span_here();
        self.cursor.advance(); // ';'
        self.alloc(NodeKind::EmptyStmt, span, false)
    }

    fn parse_local_variable_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'var'
        let name = self.parse_local_name();
        let type_expr = if self.check(SyntaxKind::Colon) {
            self.cursor.advance();
            self.try_parse_type()
                .unwrap_or_else(|| self.push_error_node("expected a type after ':'", self.span_here()))
        } else {
            NodeId::NONE
        };
        let initializer = if self.check(SyntaxKind::Equals) {
            self.cursor.advance();
            self.parse_expression()
        } else {
            NodeId::NONE
        };
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[type_expr, initializer]);
        self.alloc(
            NodeKind::VariableDecl { header: Default::default(), type_expr, name, initializer, is_field: false },
            span,
            has_errors,
        )
    }

    fn parse_local_name(&mut self) -> String {
        if self.check(SyntaxKind::Identifier) {
            let text = self.cursor.current().text.to_string();
            self.cursor.advance();
            text
        } else {
            self.error("expected an identifier", self.span_here());
            String::new()
        }
    }

    /// `Type name [= value];` as a local statement — the statement-level
    /// counterpart of the declaration-level typed-member disambiguation
    /// (spec §4.3.4's "typed declaration vs expression statement" item).
    /// Falls back to a plain expression statement when no type is present.
    fn parse_expression_or_typed_decl_stmt(&mut self) -> NodeId {
        let start = self.span_here();
        if let Some(node) = self.try_parse_local_typed_decl(start) {
            return node;
        }
        let expr = self.parse_expression();
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[expr]);
        self.alloc(NodeKind::ExpressionStmt { expr }, span, has_errors)
    }

    fn try_parse_local_typed_decl(&mut self, start: myre_common::Span) -> Option<NodeId> {
        let checkpoint = self.checkpoint();
        let type_expr = self.try_parse_type()?;
        if !self.check(SyntaxKind::Identifier) {
            self.restore(checkpoint);
            return None;
        }
        let name = self.parse_local_name();
        let initializer = if self.check(SyntaxKind::Equals) {
            self.cursor.advance();
            self.parse_expression()
        } else {
            NodeId::NONE
        };
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[type_expr, initializer]);
        Some(self.alloc(
            NodeKind::VariableDecl {
                header: Default::default(),
                type_expr,
                name,
                initializer,
                is_field: false,
            },
            span,
            has_errors,
        ))
    }
}
