//! The parser: token stream -> AST, with error recovery (spec §4.3).

mod context;
mod cursor;
mod declarations;
mod expressions;
mod recovery;
mod statements;
mod types;

pub use context::ParsingContext;

use context::{ContextGuard, ContextStack};
use cursor::{Checkpoint, Cursor};
use myre_ast::{Arena, NodeId, NodeKind};
use myre_common::{limits, Diagnostic, Span};
use myre_scanner::{SyntaxKind, Token};

/// Parses a token stream into an AST. Never panics on malformed input: every
/// failure surfaces as a diagnostic plus an `ErrorNode` placeholder so the
/// tree stays well-formed (spec §4.3, "never throws").
pub struct Parser<'src> {
    cursor: Cursor<'src>,
    arena: Arena,
    diagnostics: Vec<Diagnostic>,
    context: ContextStack,
    recovery_attempts_in_declaration: u32,
    expression_depth: u32,
}

/// Everything `parse` hands back to the caller (spec §4.3, "Public entry").
pub struct ParseOutput {
    pub arena: Arena,
    pub root: NodeId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a complete token stream into a `CompilationUnit`.
pub fn parse<'src>(tokens: &'src [Token<'src>]) -> ParseOutput {
    let _span = tracing::debug_span!("parse", tokens = tokens.len()).entered();
    let mut parser = Parser::new(tokens);
    let root = parser.parse_compilation_unit();
    tracing::debug!(nodes = parser.arena.len(), diagnostics = parser.diagnostics.len(), "parse complete");
    ParseOutput { arena: parser.arena, root, diagnostics: parser.diagnostics }
}

/// The result of a production that always succeeds with *some* node,
/// possibly an `ErrorNode`, plus whether it actually represents failure.
/// This is the Rust lowering of the source's three-valued
/// `ParseResult<T>` (spec §4.3.4, §7): `Some` keeps the `{Success, Error}`
/// cases merged into "yes, and here is the node, check `contains_errors`
/// on it if you care", `None` is the source's `ParseResult::None` ("didn't
/// match; try another alternative").
pub type Produced = NodeId;

impl<'src> Parser<'src> {
    fn new(tokens: &'src [Token<'src>]) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            arena: Arena::new(),
            diagnostics: Vec::new(),
            context: ContextStack::new(),
            recovery_attempts_in_declaration: 0,
            expression_depth: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    fn current_kind(&self) -> SyntaxKind {
        self.cursor.current().kind
    }

    fn check(&self, kind: SyntaxKind) -> bool {
        self.cursor.check(kind)
    }

    fn check_any(&self, kinds: &[SyntaxKind]) -> bool {
        self.cursor.check_any(kinds)
    }

    fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    fn span_here(&self) -> Span {
        self.cursor.current().span
    }

    fn peek_kind(&self, k: usize) -> SyntaxKind {
        self.cursor.peek(k).kind
    }

    fn arena_span(&self, id: NodeId) -> Span {
        self.arena.get(id).span
    }

    fn checkpoint(&self) -> Checkpoint {
        self.cursor.checkpoint()
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor.restore(checkpoint);
    }

    /// Consume the current token if it has `kind`, returning a diagnostic
    /// (but not aborting) if it doesn't.
    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.cursor.eat(kind) {
            true
        } else {
            let span = self.span_here();
            let message = format!("expected {what}, found '{}'", self.cursor.current().text);
            let diagnostic = Diagnostic::error(message, span)
                .with_suggestion(Self::recovery_note(recovery::RecoveryStrategy::InsertToken), span);
            self.diagnostics.push(diagnostic);
            false
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::warning(message, span));
    }

    fn push_error_node(&mut self, message: impl Into<String>, span: Span) -> NodeId {
        let message = message.into();
        let diagnostic = Diagnostic::error(message.clone(), span)
            .with_suggestion(Self::recovery_note(recovery::RecoveryStrategy::Synchronize), span);
        self.diagnostics.push(diagnostic);
        self.arena.alloc(NodeKind::Error { message }, span, true)
    }

    /// A short note naming why a recovery worked, attached to a diagnostic
    /// as a suggestion (spec §4.3.3, ported `RecoveryStrategy` taxonomy).
    fn recovery_note(strategy: recovery::RecoveryStrategy) -> &'static str {
        match strategy {
            recovery::RecoveryStrategy::InsertToken => "recovered by assuming the missing token and continuing",
            recovery::RecoveryStrategy::DeleteToken => "recovered by skipping the unexpected token",
            recovery::RecoveryStrategy::ReplaceToken => "recovered by treating this as the expected token",
            recovery::RecoveryStrategy::Synchronize => "recovered by skipping ahead to the next declaration or statement",
        }
    }

    /// Bounds recursive-descent depth in expression parsing (spec §5's
    /// termination guarantee). Mirrors `synchronize`'s own
    /// increment-then-check-then-bail shape, one level up from token
    /// recovery.
    fn enter_expression_depth(&mut self) -> bool {
        self.expression_depth += 1;
        self.expression_depth <= limits::MAX_EXPRESSION_NESTING_DEPTH
    }

    fn exit_expression_depth(&mut self) {
        self.expression_depth -= 1;
    }

    fn alloc(&mut self, kind: NodeKind, span: Span, child_has_errors: bool) -> NodeId {
        self.arena.alloc(kind, span, child_has_errors)
    }

    fn mark_errors(&mut self, ids: &[NodeId]) -> bool {
        ids.iter().any(|id| !id.is_none() && self.arena.get(*id).contains_errors)
    }

    // ------------------------------------------------------------------
    // Panic-mode synchronization (spec §4.3.3)
    // ------------------------------------------------------------------

    /// Skip tokens until a declaration-start keyword, statement-start
    /// keyword, `;`, or closing `}` is seen.
    fn synchronize(&mut self) {
        self.recovery_attempts_in_declaration += 1;
        if self.recovery_attempts_in_declaration > limits::MAX_RECOVERY_ATTEMPTS_PER_DECLARATION {
            // Pathological input: stop trying to recover within this
            // declaration and just advance past one token to guarantee
            // forward progress.
            if !self.at_end() {
                self.cursor.advance();
            }
            return;
        }
        while !self.at_end() {
            if recovery::is_sync_point(self.current_kind()) {
                if self.check(SyntaxKind::Semicolon) {
                    self.cursor.advance();
                }
                return;
            }
            self.cursor.advance();
        }
    }

    fn reset_recovery_counter(&mut self) {
        self.recovery_attempts_in_declaration = 0;
    }
}
