//! Compilation unit, using-directives, and declarations (spec §3.2, §4.3.2).

use myre_ast::{DeclHeader, NodeId, NodeKind};
use myre_common::{AccessLevel, Modifiers, Span};
use myre_scanner::SyntaxKind;

use super::context::{ContextGuard, ParsingContext};
use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_compilation_unit(&mut self) -> NodeId {
        let start = self.span_here();
        let mut usings = Vec::new();
        while self.check(SyntaxKind::Using) {
            usings.push(self.parse_using_directive());
        }

        let mut declarations = Vec::new();
        while !self.at_end() {
            declarations.push(self.parse_declaration());
        }

        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&usings) || self.mark_errors(&declarations);
        self.alloc(NodeKind::CompilationUnit { usings, declarations }, span, has_errors)
    }

    fn parse_using_directive(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'using'
        let mut path = String::new();
        loop {
            if self.check(SyntaxKind::Identifier) {
                path.push_str(self.cursor.current().text);
                self.cursor.advance();
            } else {
                return self.push_error_node("expected a namespace path after 'using'", self.span_here());
            }
            if self.check(SyntaxKind::Dot) {
                path.push('.');
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        self.alloc(NodeKind::UsingDirective { path }, span, false)
    }

    /// A declaration: a namespace, type, enum, function, constructor,
    /// variable, or property, each preceded by an optional modifier header
    /// (spec §3.4). Synchronizes and returns an `ErrorNode` when nothing
    /// recognizable starts here.
    pub(super) fn parse_declaration(&mut self) -> NodeId {
        self.reset_recovery_counter();
        let start = self.span_here();

        if self.check(SyntaxKind::Namespace) {
            return self.parse_namespace_decl();
        }
        if self.check(SyntaxKind::Using) {
            // A using directive after the first declaration: still legal
            // syntactically, just unusual; treat it like any other
            // top-level item rather than special-casing its position.
            return self.parse_using_directive();
        }

        let header = self.parse_decl_header();

        if self.check(SyntaxKind::Type) {
            return self.parse_type_decl(header);
        }
        if self.check(SyntaxKind::Enum) {
            return self.parse_enum_decl(header);
        }
        if self.check(SyntaxKind::Fn) {
            return self.parse_function_decl(header);
        }
        if self.check(SyntaxKind::New) {
            return self.parse_constructor_decl(header);
        }
        if self.check(SyntaxKind::Var) {
            let is_field = self.context.in_context(ParsingContext::TypeBody);
            return self.parse_variable_decl(header, is_field);
        }
        // Property vs. plain variable ambiguity: `Type name { get; set; }`
        // vs `Type name = value;`. Both start with a typed-identifier
        // prefix (spec §4.3.4's disambiguation list, item "property vs
        // variable").
        if let Some(member) = self.try_parse_typed_member(header) {
            return member;
        }

        let span = start.merge(self.span_here());
        let node = self.push_error_node(
            format!("expected a declaration, found '{}'", self.cursor.current().text),
            span,
        );
        self.synchronize();
        node
    }

    fn parse_decl_header(&mut self) -> DeclHeader {
        let mut access = AccessLevel::default();
        let mut modifiers = Modifiers::empty();
        loop {
            match self.current_kind() {
                SyntaxKind::Public => {
                    access = AccessLevel::Public;
                    self.cursor.advance();
                }
                SyntaxKind::Private => {
                    access = AccessLevel::Private;
                    self.cursor.advance();
                }
                SyntaxKind::Protected => {
                    access = AccessLevel::Protected;
                    self.cursor.advance();
                }
                SyntaxKind::Static => {
                    modifiers |= Modifiers::STATIC;
                    self.cursor.advance();
                }
                SyntaxKind::Virtual => {
                    modifiers |= Modifiers::VIRTUAL;
                    self.cursor.advance();
                }
                SyntaxKind::Override => {
                    modifiers |= Modifiers::OVERRIDE;
                    self.cursor.advance();
                }
                SyntaxKind::Abstract => {
                    modifiers |= Modifiers::ABSTRACT;
                    self.cursor.advance();
                }
                SyntaxKind::Async => {
                    modifiers |= Modifiers::ASYNC;
                    self.cursor.advance();
                }
                SyntaxKind::Extern => {
                    modifiers |= Modifiers::EXTERN;
                    self.cursor.advance();
                }
                SyntaxKind::Ref => {
                    modifiers |= Modifiers::REF;
                    self.cursor.advance();
                }
                SyntaxKind::Inline => {
                    modifiers |= Modifiers::INLINE;
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        DeclHeader { access, modifiers }
    }

    fn parse_namespace_decl(&mut self) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'namespace'
        let name = self.parse_dotted_name();

        if self.check(SyntaxKind::Semicolon) {
            // File-scoped: `namespace Foo;` — everything that follows
            // (until EOF) belongs to it. Only legal as the first
            // declaration (spec §4.3.2's namespace rule); the binder is
            // responsible for diagnosing a misplaced one, since the
            // parser has no easy way to know "first" without extra state
            // threaded through every call site.
            self.cursor.advance();
            let mut members = Vec::new();
            while !self.at_end() {
                members.push(self.parse_declaration());
            }
            let span = start.merge(self.span_here());
            let has_errors = self.mark_errors(&members);
            return self.alloc(
                NodeKind::NamespaceDecl { name, members, file_scoped: true },
                span,
                has_errors,
            );
        }

        if !self.expect(SyntaxKind::LeftBrace, "'{'") {
            let span = start.merge(self.span_here());
            return self.push_error_node("malformed namespace declaration", span);
        }
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Namespace);
        let mut members = Vec::new();
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            members.push(self.parse_declaration());
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&members);
        self.alloc(NodeKind::NamespaceDecl { name, members, file_scoped: false }, span, has_errors)
    }

    fn parse_dotted_name(&mut self) -> String {
        let mut name = String::new();
        if self.check(SyntaxKind::Identifier) {
            name.push_str(self.cursor.current().text);
            self.cursor.advance();
        } else {
            self.error("expected an identifier", self.span_here());
            return name;
        }
        while self.check(SyntaxKind::Dot) && self.peek_kind(1) == SyntaxKind::Identifier {
            self.cursor.advance();
            name.push('.');
            name.push_str(self.cursor.current().text);
            self.cursor.advance();
        }
        name
    }

    fn parse_type_decl(&mut self, header: DeclHeader) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'type'
        let name = self.parse_identifier_name();
        if !self.expect(SyntaxKind::LeftBrace, "'{'") {
            let span = start.merge(self.span_here());
            return self.push_error_node("malformed type declaration", span);
        }
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::TypeBody);
        let mut members = Vec::new();
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            members.push(self.parse_declaration());
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&members);
        self.alloc(NodeKind::TypeDecl { header, name, members }, span, has_errors)
    }

    fn parse_enum_decl(&mut self, header: DeclHeader) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'enum'
        let name = self.parse_identifier_name();
        if !self.expect(SyntaxKind::LeftBrace, "'{'") {
            let span = start.merge(self.span_here());
            return self.push_error_node("malformed enum declaration", span);
        }
        let mut cases = Vec::new();
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            cases.push(self.parse_enum_case());
            if self.check(SyntaxKind::Comma) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&cases);
        self.alloc(NodeKind::EnumDecl { header, name, cases }, span, has_errors)
    }

    fn parse_enum_case(&mut self) -> NodeId {
        let start = self.span_here();
        let name = self.parse_identifier_name();
        let mut associated_types = Vec::new();
        // Tagged case: `Case(Type, Type)` (spec §4.3.2; simple-vs-tagged
        // distinction carried on the symbol, see SPEC_FULL.md item 6).
        if self.check(SyntaxKind::LeftParen) {
            self.cursor.advance();
            if !self.check(SyntaxKind::RightParen) {
                loop {
                    match self.try_parse_type() {
                        Some(ty) => associated_types.push(ty),
                        None => {
                            associated_types.push(self.push_error_node(
                                "expected a type",
                                self.span_here(),
                            ));
                            break;
                        }
                    }
                    if self.check(SyntaxKind::Comma) {
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(SyntaxKind::RightParen, "')'");
        }
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&associated_types);
        self.alloc(NodeKind::EnumCaseDecl { name, associated_types }, span, has_errors)
    }

    fn parse_identifier_name(&mut self) -> String {
        if self.check(SyntaxKind::Identifier) {
            let text = self.cursor.current().text.to_string();
            self.cursor.advance();
            text
        } else {
            self.error("expected an identifier", self.span_here());
            String::new()
        }
    }

    fn parse_function_decl(&mut self, header: DeclHeader) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'fn'
        let name = self.parse_identifier_name();
        let parameters = self.parse_parameter_list();

        let return_type = if self.check(SyntaxKind::Colon) {
            self.cursor.advance();
            self.try_parse_type().unwrap_or_else(|| {
                self.push_error_node("expected a return type", self.span_here())
            })
        } else {
            NodeId::NONE
        };

        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Function);
        let body = if self.check(SyntaxKind::LeftBrace) {
            self.parse_block()
        } else {
            self.expect(SyntaxKind::Semicolon, "';' or a function body");
            NodeId::NONE
        };

        let span = start.merge(self.span_here());
        let has_errors =
            self.mark_errors(&parameters) || self.mark_errors(&[return_type, body]);
        self.alloc(
            NodeKind::FunctionDecl { header, name, parameters, return_type, body },
            span,
            has_errors,
        )
    }

    fn parse_constructor_decl(&mut self, header: DeclHeader) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'new'
        let parameters = self.parse_parameter_list();
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::Function);
        let body = self.parse_block();
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&parameters) || self.mark_errors(&[body]);
        self.alloc(NodeKind::ConstructorDecl { header, parameters, body }, span, has_errors)
    }

    fn parse_parameter_list(&mut self) -> Vec<NodeId> {
        let mut parameters = Vec::new();
        if !self.expect(SyntaxKind::LeftParen, "'('") {
            return parameters;
        }
        let _guard = ContextGuard::new(&mut self.context, ParsingContext::ParameterList);
        if !self.check(SyntaxKind::RightParen) {
            loop {
                parameters.push(self.parse_parameter());
                if self.check(SyntaxKind::Comma) {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::RightParen, "')'");
        parameters
    }

    fn parse_parameter(&mut self) -> NodeId {
        let start = self.span_here();
        let type_expr = self.try_parse_type().unwrap_or_else(|| {
            self.push_error_node("expected a parameter type", self.span_here())
        });
        let name = self.parse_identifier_name();
        let default_value = if self.check(SyntaxKind::Equals) {
            self.cursor.advance();
            self.parse_expression()
        } else {
            NodeId::NONE
        };
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[type_expr, default_value]);
        self.alloc(NodeKind::ParameterDecl { type_expr, name, default_value }, span, has_errors)
    }

    fn parse_variable_decl(&mut self, header: DeclHeader, is_field: bool) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'var'
        let name = self.parse_identifier_name();
        let type_expr = if self.check(SyntaxKind::Colon) {
            self.cursor.advance();
            self.try_parse_type().unwrap_or_else(|| {
                self.push_error_node("expected a type after ':'", self.span_here())
            })
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
            NodeKind::VariableDecl { header, type_expr, name, initializer, is_field },
            span,
            has_errors,
        )
    }

    /// Disambiguates `Type name = value;` (a field) from
    /// `Type name { get; set; }` (a property), both of which start with a
    /// typed identifier (spec §4.3.4). Returns `None` if `header` isn't
    /// actually followed by a type at all, so the caller can fall through
    /// to its generic "unrecognized declaration" error.
    fn try_parse_typed_member(&mut self, header: DeclHeader) -> Option<NodeId> {
        let start = self.span_here();
        let type_expr = self.try_parse_type()?;
        if !self.check(SyntaxKind::Identifier) {
            return None;
        }
        let name = self.parse_identifier_name();

        if self.check(SyntaxKind::LeftBrace) {
            return Some(self.parse_property_decl(header, start, type_expr, name));
        }

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
            NodeKind::VariableDecl { header, type_expr, name, initializer, is_field: true },
            span,
            has_errors,
        ))
    }

    fn parse_property_decl(
        &mut self,
        header: DeclHeader,
        start: Span,
        type_expr: NodeId,
        name: String,
    ) -> NodeId {
        self.cursor.advance(); // '{'
        let mut getter = NodeId::NONE;
        let mut setter = NodeId::NONE;
        while !self.check(SyntaxKind::RightBrace) && !self.at_end() {
            if self.is_contextual_accessor(SyntaxKind::Get) {
                getter = self.parse_property_accessor(myre_ast::AccessorKind::Get);
            } else if self.is_contextual_accessor(SyntaxKind::Set) {
                setter = self.parse_property_accessor(myre_ast::AccessorKind::Set);
            } else {
                self.error("expected 'get' or 'set'", self.span_here());
                self.synchronize();
            }
        }
        self.expect(SyntaxKind::RightBrace, "'}'");
        let initializer = if self.check(SyntaxKind::Equals) {
            self.cursor.advance();
            let init = self.parse_expression();
            self.expect(SyntaxKind::Semicolon, "';'");
            init
        } else {
            NodeId::NONE
        };
        let span = start.merge(self.span_here());
        let has_errors = self.mark_errors(&[type_expr, getter, setter, initializer]);
        self.alloc(
            NodeKind::PropertyDecl { header, type_expr, name, initializer, getter, setter },
            span,
            has_errors,
        )
    }

    /// `get`/`set` are contextual keywords (spec SPEC_FULL.md item 4): they
    /// only act as accessor introducers directly inside a property body, so
    /// callers must check position, not just token kind, before treating an
    /// identifier-shaped token as one.
    fn is_contextual_accessor(&self, kind: SyntaxKind) -> bool {
        self.check(kind)
    }

    fn parse_property_accessor(&mut self, kind: myre_ast::AccessorKind) -> NodeId {
        let start = self.span_here();
        self.cursor.advance(); // 'get' / 'set'
        let context = match kind {
            myre_ast::AccessorKind::Get => ParsingContext::PropertyGetter,
            myre_ast::AccessorKind::Set => ParsingContext::PropertySetter,
        };
        let _guard = ContextGuard::new(&mut self.context, context);

        if self.check(SyntaxKind::Arrow) {
            self.cursor.advance();
            let expression = self.parse_expression();
            self.expect(SyntaxKind::Semicolon, "';'");
            let span = start.merge(self.span_here());
            let has_errors = self.mark_errors(&[expression]);
            return self.alloc(
                NodeKind::PropertyAccessor { kind, body: NodeId::NONE, expression },
                span,
                has_errors,
            );
        }
        if self.check(SyntaxKind::LeftBrace) {
            let body = self.parse_block();
            let span = start.merge(self.span_here());
            let has_errors = self.mark_errors(&[body]);
            return self.alloc(
                NodeKind::PropertyAccessor { kind, body, expression: NodeId::NONE },
                span,
                has_errors,
            );
        }
        self.expect(SyntaxKind::Semicolon, "';'");
        let span = start.merge(self.span_here());
        self.alloc(
            NodeKind::PropertyAccessor { kind, body: NodeId::NONE, expression: NodeId::NONE },
            span,
            false,
        )
    }
}
