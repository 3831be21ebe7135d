//! Token stream contract (spec §4.3.1): `current`, `peek`, `advance`,
//! `check`, `checkpoint`/`restore`, `at_end`.

use myre_scanner::{SyntaxKind, Token};

/// An opaque checkpoint, restorable in O(1). Every speculative parse wraps
/// a checkpoint/restore pair around ambiguous lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

pub struct Cursor<'src> {
    tokens: &'src [Token<'src>],
    pos: usize,
}

impl<'src> Cursor<'src> {
    #[must_use]
    pub fn new(tokens: &'src [Token<'src>]) -> Self {
        Self { tokens, pos: 0 }
    }

    #[must_use]
    pub fn current(&self) -> Token<'src> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[must_use]
    pub fn peek(&self, k: usize) -> Token<'src> {
        let idx = (self.pos + k).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    pub fn advance(&mut self) -> Token<'src> {
        let tok = self.current();
        if !self.at_end() {
            self.pos += 1;
        }
        tok
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.current().kind == SyntaxKind::Eof
    }

    #[must_use]
    pub fn check(&self, kind: SyntaxKind) -> bool {
        self.current().kind == kind
    }

    #[must_use]
    pub fn check_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myre_scanner::Lexer;

    #[test]
    fn checkpoint_restore_rewinds_position() {
        let tokens = Lexer::new("a b c").tokenize();
        let mut cursor = Cursor::new(&tokens);
        let cp = cursor.checkpoint();
        cursor.advance();
        cursor.advance();
        assert_ne!(cursor.position(), cp.0);
        cursor.restore(cp);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn peek_clamps_past_eof() {
        let tokens = Lexer::new("a").tokenize();
        let cursor = Cursor::new(&tokens);
        assert_eq!(cursor.peek(0).kind, SyntaxKind::Identifier);
        assert_eq!(cursor.peek(50).kind, SyntaxKind::Eof);
    }
}
