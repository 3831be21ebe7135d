//! Expressions: assignment down through primary, via precedence-climbing
//! recursive descent (spec §3.2, §4.3.2's Pratt-parser requirement).
//!
//! Assignment is folded into the climb as the lowest-precedence,
//! right-associative level rather than handled as a separate post-pass;
//! range (`..`, `..=`) is treated as non-associative, breaking out of the
//! binary climb immediately after building the node, with an optional
//! trailing `by step` suffix checked right after. `as` casts and `++`/`--`
//! are postfix. `&`/`*` are accepted as prefix unary operators structurally
//! — the resolver, not the parser, is what rejects them as unimplemented.

use myre_ast::{AssignOp, BinaryOp, LiteralKind, NodeId, NodeKind, UnaryOp};
use myre_common::Span;
use myre_scanner::SyntaxKind;

use super::context::{ContextGuard, ParsingContext};
use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_expression(&mut self) -> NodeId {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> NodeId {
        let start = self.span_here();
        let target = self.parse_conditional();

        let op = match self.current_kind() {
            SyntaxKind::Equals => AssignOp::Assign,
            SyntaxKind::PlusEquals => AssignOp::AddAssign,
            SyntaxKind::MinusEquals => AssignOp::SubAssign,
            SyntaxKind::StarEquals => AssignOp::MulAssign,
            SyntaxKind::SlashEquals => AssignOp::DivAssign,
            _ => return target,
        };
        self.cursor.advance();
        // Right-associative: recurse back into assignment, not conditional.
        let value = self.parse_assignment();
        let span = start.merge(self.arena_span(value));
        let has_errors = self.mark_errors(&[target, value]);
        self.alloc(NodeKind::AssignmentExpr { op, target, value }, span, has_errors)
    }

    fn parse_conditional(&mut self) -> NodeId {
        let start = self.span_here();
        let condition = self.parse_range();
        if !self.check(SyntaxKind::Question) {
            return condition;
        }
        self.cursor.advance();
        let then_expr = self.parse_assignment();
        self.expect(SyntaxKind::Colon, "':'");
        let else_expr = self.parse_assignment();
        let span = start.merge(self.arena_span(else_expr));
        let has_errors = self.mark_errors(&[condition, then_expr, else_expr]);
        self.alloc(NodeKind::ConditionalExpr { condition, then_expr, else_expr }, span, has_errors)
    }

    /// Non-associative: `a..b`, `a..=b`, each optionally followed by
    /// `by step`. Chaining (`a..b..c`) is not attempted — the loop runs at
    /// most once per call, matching the source grammar's treatment of
    /// range as a standalone level rather than a fully general binary
    /// operator (spec §4.3.2, "for vs for-in"/"range" notes).
    fn parse_range(&mut self) -> NodeId {
        let start = self.span_here();
        let left = self.parse_logical_or();
        let inclusive = match self.current_kind() {
            SyntaxKind::DotDot => false,
            SyntaxKind::DotDotEquals => true,
            _ => return left,
        };
        self.cursor.advance();
        let end = self.parse_logical_or();
        let step = self.parse_optional_step();
        let tail = if step.is_none() { self.arena_span(end) } else { self.arena_span(step) };
        let span = start.merge(tail);
        let has_errors = self.mark_errors(&[left, end, step]);
        self.alloc(NodeKind::RangeExpr { start: left, end, inclusive, step }, span, has_errors)
    }

    fn parse_optional_step(&mut self) -> NodeId {
        if self.check(SyntaxKind::By) {
            self.cursor.advance();
            self.parse_logical_or()
        } else {
            NodeId::NONE
        }
    }

    fn parse_logical_or(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_logical_and();
        while self.check(SyntaxKind::PipePipe) {
            self.cursor.advance();
            let right = self.parse_logical_and();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op: BinaryOp::Or, left, right }, span, has_errors);
        }
        left
    }

    fn parse_logical_and(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_equality();
        while self.check(SyntaxKind::AmpAmp) {
            self.cursor.advance();
            let right = self.parse_equality();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op: BinaryOp::And, left, right }, span, has_errors);
        }
        left
    }

    fn parse_equality(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_relational();
        loop {
            let op = match self.current_kind() {
                SyntaxKind::EqualsEquals => BinaryOp::Eq,
                SyntaxKind::BangEquals => BinaryOp::NotEq,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_relational();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op, left, right }, span, has_errors);
        }
        left
    }

    fn parse_relational(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_additive();
        loop {
            let op = match self.current_kind() {
                SyntaxKind::Less => BinaryOp::Lt,
                SyntaxKind::LessEquals => BinaryOp::LtEq,
                SyntaxKind::Greater => BinaryOp::Gt,
                SyntaxKind::GreaterEquals => BinaryOp::GtEq,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_additive();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op, left, right }, span, has_errors);
        }
        left
    }

    fn parse_additive(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.current_kind() {
                SyntaxKind::Plus => BinaryOp::Add,
                SyntaxKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_multiplicative();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op, left, right }, span, has_errors);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> NodeId {
        let start = self.span_here();
        let mut left = self.parse_unary();
        loop {
            let op = match self.current_kind() {
                SyntaxKind::Star => BinaryOp::Mul,
                SyntaxKind::Slash => BinaryOp::Div,
                SyntaxKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_unary();
            let span = start.merge(self.arena_span(right));
            let has_errors = self.mark_errors(&[left, right]);
            left = self.alloc(NodeKind::BinaryExpr { op, left, right }, span, has_errors);
        }
        left
    }

    /// Every level of nesting that can grow the Rust call stack — unary
    /// prefix chains, parenthesized groups, array/match/new literals that
    /// loop back through `parse_expression` — passes through here exactly
    /// once per level, so this is where the nesting-depth bound lives
    /// (spec §5's termination guarantee).
    fn parse_unary(&mut self) -> NodeId {
        if !self.enter_expression_depth() {
            let span = self.span_here();
            self.exit_expression_depth();
            return self.push_error_node("expression nested too deeply", span);
        }
        let result = self.parse_unary_inner();
        self.exit_expression_depth();
        result
    }

    fn parse_unary_inner(&mut self) -> NodeId {
        let start = self.span_here();
        let op = match self.current_kind() {
            SyntaxKind::Bang => UnaryOp::Not,
            SyntaxKind::Minus => UnaryOp::Neg,
            SyntaxKind::PlusPlus => UnaryOp::Increment,
            SyntaxKind::MinusMinus => UnaryOp::Decrement,
            SyntaxKind::Amp => UnaryOp::BitAnd,
            SyntaxKind::Star => UnaryOp::Deref,
            SyntaxKind::DotDot | SyntaxKind::DotDotEquals => return self.parse_prefix_range(),
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = self.parse_unary();
        let span = start.merge(self.arena_span(operand));
        let has_errors = self.mark_errors(&[operand]);
        self.alloc(NodeKind::UnaryExpr { op, operand, is_postfix: false }, span, has_errors)
    }

    /// `..end` / `..=end`: a range with no start (spec §4.3.2's prefix-range
    /// note). `start` is left as `NodeId::NONE` rather than synthesizing a
    /// placeholder, since the resolver treats a missing bound as "open"
    /// rather than "erroneous".
    fn parse_prefix_range(&mut self) -> NodeId {
        let start = self.span_here();
        let inclusive = self.check(SyntaxKind::DotDotEquals);
        self.cursor.advance();
        let end = self.parse_logical_or();
        let step = self.parse_optional_step();
        let tail = if step.is_none() { self.arena_span(end) } else { self.arena_span(step) };
        let span = start.merge(tail);
        let has_errors = self.mark_errors(&[end, step]);
        self.alloc(
            NodeKind::RangeExpr { start: NodeId::NONE, end, inclusive, step },
            span,
            has_errors,
        )
    }

    fn parse_postfix(&mut self) -> NodeId {
        let start = self.span_here();
        let mut expr = self.parse_primary();
        loop {
            expr = match self.current_kind() {
                SyntaxKind::Dot => self.parse_member_access(start, expr),
                SyntaxKind::LeftParen => self.parse_call(start, expr),
                SyntaxKind::LeftBracket => self.parse_indexer(start, expr),
                SyntaxKind::PlusPlus => self.parse_postfix_incdec(start, expr, UnaryOp::Increment),
                SyntaxKind::MinusMinus => self.parse_postfix_incdec(start, expr, UnaryOp::Decrement),
                SyntaxKind::As => self.parse_cast(start, expr),
                _ => break,
            };
        }
        expr
    }

    fn parse_member_access(&mut self, start: Span, object: NodeId) -> NodeId {
        self.cursor.advance(); // '.'
        let member = if self.check(SyntaxKind::Identifier) {
            let text = self.cursor.current().text.to_string();
            self.cursor.advance();
            text
        } else {
            self.error("expected a member name after '.'", self.span_here());
            String::new()
        };
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[object]);
        self.alloc(NodeKind::MemberAccessExpr { object, member }, span, has_errors)
    }

    fn parse_call(&mut self, start: Span, callee: NodeId) -> NodeId {
        self.cursor.advance(); // '('
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::ArgumentList);
        let mut arguments = Vec::new();
        if !self.check(SyntaxKind::RightParen) {
            loop {
                arguments.push(self.parse_expression());
                if self.check(SyntaxKind::Comma) {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::RightParen, "')'");
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[callee]) || self.mark_errors(&arguments);
        self.alloc(NodeKind::CallExpr { callee, arguments }, span, has_errors)
    }

    fn parse_indexer(&mut self, start: Span, object: NodeId) -> NodeId {
        self.cursor.advance(); // '['
        let index = self.parse_expression();
        self.expect(SyntaxKind::RightBracket, "']'");
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[object, index]);
        self.alloc(NodeKind::IndexerExpr { object, index }, span, has_errors)
    }

    fn parse_postfix_incdec(&mut self, start: Span, operand: NodeId, op: UnaryOp) -> NodeId {
        self.cursor.advance();
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[operand]);
        self.alloc(NodeKind::UnaryExpr { op, operand, is_postfix: true }, span, has_errors)
    }

    fn parse_cast(&mut self, start: Span, expr: NodeId) -> NodeId {
        self.cursor.advance(); // 'as'
        let target_type = self.try_parse_type().unwrap_or_else(|| {
            self.push_error_node("expected a type after 'as'", self.span_here())
        });
        let span = start.merge(self.arena_span(target_type));
        let has_errors = self.mark_errors(&[expr, target_type]);
        self.alloc(NodeKind::CastExpr { target_type, expr }, span, has_errors)
    }

    fn previous_token_span(&self) -> Span {
        self.cursor.current().span
    }

    fn parse_primary(&mut self) -> NodeId {
        let start = self.span_here();
        match self.current_kind() {
            SyntaxKind::IntegerLiteral => self.parse_literal(LiteralKind::Integer),
            SyntaxKind::FloatLiteral => self.parse_literal(LiteralKind::Float),
            SyntaxKind::DoubleLiteral => self.parse_literal(LiteralKind::Double),
            SyntaxKind::BoolLiteral => self.parse_literal(LiteralKind::Bool),
            SyntaxKind::StringLiteral => self.parse_literal(LiteralKind::String),
            SyntaxKind::CharLiteral => self.parse_literal(LiteralKind::Char),
            SyntaxKind::This => {
                self.cursor.advance();
                self.alloc(NodeKind::ThisExpr, start, false)
            }
            SyntaxKind::Identifier => self.parse_name_or_typed_identifier(),
            SyntaxKind::LeftParen => self.parse_parenthesized(),
            SyntaxKind::LeftBracket => self.parse_array_literal(),
            SyntaxKind::New => self.parse_new_expr(),
            SyntaxKind::Match => self.parse_match_expr(),
            _ => {
                let span = self.span_here();
                let node = self.push_error_node(
                    format!("expected an expression, found '{}'", self.cursor.current().text),
                    span,
                );
                if !self.at_end() {
                    self.cursor.advance();
                }
                node
            }
        }
    }

    fn parse_literal(&mut self, kind: LiteralKind) -> NodeId {
        let span = self.span_here();
        let text = self.cursor.current().text.to_string();
        self.cursor.advance();
        self.alloc(NodeKind::LiteralExpr { kind, text }, span, false)
    }

    /// A bare identifier is usually a name reference, but at statement/
    /// argument position it may be the start of a typed-identifier pattern
    /// (`Type name` inside e.g. a `match` binding) — callers that need that
    /// reading use `try_parse_type`-based lookahead themselves; here a
    /// plain name always wins, matching spec §4.3.2's primary-expression
    /// rule.
    fn parse_name_or_typed_identifier(&mut self) -> NodeId {
        let span = self.span_here();
        let name = self.cursor.current().text.to_string();
        self.cursor.advance();
        self.alloc(NodeKind::NameExpr { name }, span, false)
    }

    fn parse_parenthesized(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // '('
        let inner = self.parse_expression();
        self.expect(SyntaxKind::RightParen, "')'");
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[inner]);
        self.alloc(NodeKind::ParenthesizedExpr { inner }, span, has_errors)
    }

    fn parse_array_literal(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // '['
        let mut elements = Vec::new();
        if !self.check(SyntaxKind::RightBracket) {
            loop {
                elements.push(self.parse_expression());
                if self.check(SyntaxKind::Comma) {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::RightBracket, "']'");
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&elements);
        self.alloc(NodeKind::ArrayLiteralExpr { elements }, span, has_errors)
    }

    fn parse_new_expr(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'new'
        let type_expr = self.try_parse_type().unwrap_or_else(|| {
            self.push_error_node("expected a type after 'new'", self.span_here())
        });
        let mut arguments = Vec::new();
        if self.check(SyntaxKind::LeftParen) {
            self.cursor.advance();
            if !self.check(SyntaxKind::RightParen) {
                loop {
                    arguments.push(self.parse_expression());
                    if self.check(SyntaxKind::Comma) {
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(SyntaxKind::RightParen, "')'");
        }
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[type_expr]) || self.mark_errors(&arguments);
        self.alloc(NodeKind::NewExpr { type_expr, arguments }, span, has_errors)
    }

    fn parse_match_expr(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'match'
        let scrutinee = self.parse_expression();
        self.expect(SyntaxKind::LeftBrace, "'{'");
        let mut arms = Vec::new();
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            arms.push(self.parse_match_arm());
            if self.check(SyntaxKind::Comma) {
                self.cursor.advance();
            }
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let span = start.merge(self.previous_token_span());
        let has_errors = self.mark_errors(&[scrutinee]) || self.mark_errors(&arms);
        self.alloc(NodeKind::MatchExpr { scrutinee, arms }, span, has_errors)
    }

    fn parse_match_arm(&mut self) -> NodeId {
        let start = self.span_here();
        let pattern = if self.check(SyntaxKind::Identifier) {
            let text = self.cursor.current().text.to_string();
            self.cursor.advance();
            text
        } else {
            self.error("expected a pattern", self.span_here());
            String::new()
        };
        let guard = if self.check(SyntaxKind::If) {
            self.cursor.advance();
            self.parse_expression()
        } else {
            NodeId::NONE
        };
        self.expect(SyntaxKind::Arrow, "'=>'");
        let body = self.parse_expression();
        let span = start.merge(self.arena_span(body));
        let has_errors = self.mark_errors(&[guard, body]);
        self.alloc(NodeKind::MatchArm { pattern, guard, body }, span, has_errors)
    }
}
