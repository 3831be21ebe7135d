//! Error recovery: synchronization token sets and the recovery-strategy
//! taxonomy (spec §4.3.3; sets ported from `original_source`'s
//! `SynchronizationPoints`, see SPEC_FULL.md item 2).

use myre_scanner::SyntaxKind;

/// Why a particular diagnostic's recovery worked, recorded purely to make
/// the diagnostic's suggestion text legible (ported from
/// `original_source`'s `RecoveryStrategy`, SPEC_FULL.md item 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryStrategy {
    InsertToken,
    DeleteToken,
    ReplaceToken,
    Synchronize,
}

#[must_use]
pub fn declaration_sync(kind: SyntaxKind) -> bool {
    kind.is_declaration_start()
}

#[must_use]
pub fn statement_sync(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Semicolon
            | SyntaxKind::LeftBrace
            | SyntaxKind::RightBrace
            | SyntaxKind::If
            | SyntaxKind::While
            | SyntaxKind::For
            | SyntaxKind::Return
            | SyntaxKind::Break
            | SyntaxKind::Continue
    )
}

#[must_use]
pub fn expression_sync(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Semicolon
            | SyntaxKind::Comma
            | SyntaxKind::RightParen
            | SyntaxKind::RightBrace
            | SyntaxKind::RightBracket
    )
}

#[must_use]
pub fn parameter_sync(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::Comma | SyntaxKind::RightParen | SyntaxKind::Colon)
}

/// The panic-mode synchronization point: a declaration-start keyword,
/// statement-start keyword, `;`, or closing `}` (spec §4.3.3).
#[must_use]
pub fn is_sync_point(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Eof || declaration_sync(kind) || statement_sync(kind)
}
