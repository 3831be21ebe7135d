//! Token kind tags.

/// Every distinct category of token the lexer can produce. Keyword and
/// operator kinds are fully enumerated (spec §3.1); literal kinds carry
/// their textual form on the [`crate::Token`] rather than here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Literals
    IntegerLiteral,
    FloatLiteral,
    DoubleLiteral,
    BoolLiteral,
    StringLiteral,
    CharLiteral,

    Identifier,

    // Keywords
    Namespace,
    Using,
    Type,
    Enum,
    Fn,
    New,
    Var,
    Return,
    If,
    Else,
    While,
    For,
    In,
    At,
    By,
    Break,
    Continue,
    This,
    Match,
    Get,
    Set,
    As,

    // Modifier keywords
    Public,
    Private,
    Protected,
    Static,
    Virtual,
    Override,
    Abstract,
    Async,
    Extern,
    Ref,
    Inline,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Arrow,     // => (match arms, expression-bodied property accessors)
    FatArrowThin, // -> (reserved; not currently produced by any production)
    Question,

    // Operators
    Equals,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PipePipe,
    AmpAmp,
    EqualsEquals,
    BangEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    DotDot,
    DotDotEquals,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    PlusPlus,
    MinusMinus,
    Amp,

    Eof,
    /// A byte sequence the lexer could not classify. The parser turns this
    /// into an `ErrorNode` rather than matching on it structurally.
    Unknown,
}

impl SyntaxKind {
    #[must_use]
    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::Public
                | SyntaxKind::Private
                | SyntaxKind::Protected
                | SyntaxKind::Static
                | SyntaxKind::Virtual
                | SyntaxKind::Override
                | SyntaxKind::Abstract
                | SyntaxKind::Async
                | SyntaxKind::Extern
                | SyntaxKind::Ref
                | SyntaxKind::Inline
        )
    }

    #[must_use]
    pub fn is_declaration_start(self) -> bool {
        self.is_modifier_keyword()
            || matches!(
                self,
                SyntaxKind::Namespace
                    | SyntaxKind::Using
                    | SyntaxKind::Type
                    | SyntaxKind::Enum
                    | SyntaxKind::Fn
                    | SyntaxKind::New
                    | SyntaxKind::Var
            )
    }

    #[must_use]
    pub fn is_statement_start(self) -> bool {
        matches!(
            self,
            SyntaxKind::If
                | SyntaxKind::While
                | SyntaxKind::For
                | SyntaxKind::Return
                | SyntaxKind::Break
                | SyntaxKind::Continue
                | SyntaxKind::LeftBrace
        )
    }
}

/// Resolve an identifier lexeme to a keyword kind, if it is one.
#[must_use]
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    Some(match text {
        "namespace" => SyntaxKind::Namespace,
        "using" => SyntaxKind::Using,
        "type" => SyntaxKind::Type,
        "enum" => SyntaxKind::Enum,
        "fn" => SyntaxKind::Fn,
        "new" => SyntaxKind::New,
        "var" => SyntaxKind::Var,
        "return" => SyntaxKind::Return,
        "if" => SyntaxKind::If,
        "else" => SyntaxKind::Else,
        "while" => SyntaxKind::While,
        "for" => SyntaxKind::For,
        "in" => SyntaxKind::In,
        "at" => SyntaxKind::At,
        "by" => SyntaxKind::By,
        "break" => SyntaxKind::Break,
        "continue" => SyntaxKind::Continue,
        "this" => SyntaxKind::This,
        "match" => SyntaxKind::Match,
        "get" => SyntaxKind::Get,
        "set" => SyntaxKind::Set,
        "as" => SyntaxKind::As,
        "public" => SyntaxKind::Public,
        "private" => SyntaxKind::Private,
        "protected" => SyntaxKind::Protected,
        "static" => SyntaxKind::Static,
        "virtual" => SyntaxKind::Virtual,
        "override" => SyntaxKind::Override,
        "abstract" => SyntaxKind::Abstract,
        "async" => SyntaxKind::Async,
        "extern" => SyntaxKind::Extern,
        "ref" => SyntaxKind::Ref,
        "inline" => SyntaxKind::Inline,
        "true" | "false" => SyntaxKind::BoolLiteral,
        _ => return None,
    })
}
