//! Symbols (spec §3.4, §4.2).
//!
//! Rather than the source's class hierarchy (`Symbol` -> `ScopedSymbol` /
//! `TypedSymbol` -> concrete kinds, ported from
//! `original_source/include/semantic/symbol.hpp`), `Symbol` here is one
//! tagged enum; "is this also a scope" and "does this carry a type" become
//! `as_scope()`/`typed()` accessors instead of virtual dispatch.

use std::cell::Cell;

use myre_ast::NodeId;
use myre_common::{AccessLevel, Modifiers, ScopeHandle, SymbolHandle, TypeHandle};
use smallvec::SmallVec;

/// Fields every symbol carries, regardless of kind.
#[derive(Debug, Clone)]
pub struct SymbolCommon {
    pub name: String,
    pub access: AccessLevel,
    pub modifiers: Modifiers,
    resolved: bool,
}

impl SymbolCommon {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), access: AccessLevel::default(), modifiers: Modifiers::default(), resolved: false }
    }
}

/// Where a typed symbol's type comes from, in the order the resolver tries
/// them (spec §4.4's type-seeding rule, §4.5.3's declaration semantics):
/// an explicit type expression, then an initializer/getter expression, then
/// (for functions) inference from the body's `return` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeHint {
    pub explicit_type_expr: NodeId,
    pub initializer: NodeId,
    pub defining_scope: ScopeHandle,
    pub body: NodeId,
}

impl TypeHint {
    #[must_use]
    pub fn new(defining_scope: ScopeHandle) -> Self {
        Self { explicit_type_expr: NodeId::NONE, initializer: NodeId::NONE, defining_scope, body: NodeId::NONE }
    }
}

#[derive(Debug)]
pub struct NamespaceSymbol {
    pub common: SymbolCommon,
    pub scope: ScopeHandle,
}

#[derive(Debug)]
pub struct TypeSymbol {
    pub common: SymbolCommon,
    pub scope: ScopeHandle,
}

impl TypeSymbol {
    #[must_use]
    pub fn is_ref_type(&self) -> bool {
        self.common.modifiers.contains(Modifiers::REF)
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.common.modifiers.contains(Modifiers::ABSTRACT)
    }
}

#[derive(Debug)]
pub struct EnumSymbol {
    pub common: SymbolCommon,
    pub scope: ScopeHandle,
}

/// A single `enum` case. `associated_types` are the type expressions a
/// tagged case carries (`Some(i32)`), empty for a simple case (`None`).
#[derive(Debug)]
pub struct EnumCaseSymbol {
    pub common: SymbolCommon,
    pub associated_types: Vec<NodeId>,
}

#[derive(Debug)]
pub struct FunctionSymbol {
    pub common: SymbolCommon,
    pub scope: ScopeHandle,
    /// Most functions take a handful of parameters; inline storage avoids a
    /// heap allocation for the common case.
    pub parameters: SmallVec<[SymbolHandle; 4]>,
    pub return_type: Cell<TypeHandle>,
    pub return_hint: TypeHint,
    /// The function's body block, kept for return-type inference when there
    /// is no explicit return type (spec §4.5.3's `FunctionDecl` semantics).
    pub body: NodeId,
}

impl FunctionSymbol {
    /// A human-readable signature for "not callable"/"no such overload"
    /// diagnostics (spec §4.5.4), ported from `original_source`'s
    /// `FunctionSymbol::full_signature` without the mangled-name sibling
    /// (no codegen, so no mangling needed). `type_name` formats a resolved
    /// type; callers pass one backed by the type registry they own, since
    /// this crate has no registry of its own to format against.
    #[must_use]
    pub fn display_signature(&self, parameter_types: &[TypeHandle], type_name: &dyn Fn(TypeHandle) -> String) -> String {
        let mut sig = format!("{}(", self.common.name);
        for (i, ty) in parameter_types.iter().enumerate() {
            if i > 0 {
                sig.push_str(", ");
            }
            if ty.is_none() {
                sig.push_str("var");
            } else {
                sig.push_str(&type_name(*ty));
            }
        }
        sig.push_str("): ");
        let ret = self.return_type.get();
        sig.push_str(&if ret.is_none() { "void".to_string() } else { type_name(ret) });
        sig
    }
}

/// Overload set for functions declared with the same name in the same
/// scope (ported from `original_source`'s `FunctionGroupSymbol`).
#[derive(Debug)]
pub struct FunctionGroupSymbol {
    pub common: SymbolCommon,
    pub overloads: SmallVec<[SymbolHandle; 2]>,
}

#[derive(Debug)]
pub struct VariableSymbol {
    pub common: SymbolCommon,
    pub is_field: bool,
    pub resolved_type: Cell<TypeHandle>,
    pub hint: TypeHint,
}

#[derive(Debug)]
pub struct ParameterSymbol {
    pub common: SymbolCommon,
    pub resolved_type: Cell<TypeHandle>,
    pub hint: TypeHint,
}

#[derive(Debug)]
pub struct PropertySymbol {
    pub common: SymbolCommon,
    pub resolved_type: Cell<TypeHandle>,
    pub hint: TypeHint,
    pub getter: NodeId,
    pub setter: NodeId,
}

impl PropertySymbol {
    #[must_use]
    pub fn has_getter(&self) -> bool {
        !self.getter.is_none()
    }

    #[must_use]
    pub fn has_setter(&self) -> bool {
        !self.setter.is_none()
    }
}

#[derive(Debug)]
pub enum Symbol {
    Namespace(NamespaceSymbol),
    Type(TypeSymbol),
    Enum(EnumSymbol),
    EnumCase(EnumCaseSymbol),
    Function(FunctionSymbol),
    FunctionGroup(FunctionGroupSymbol),
    Variable(VariableSymbol),
    Parameter(ParameterSymbol),
    Property(PropertySymbol),
}

impl Symbol {
    #[must_use]
    pub fn common(&self) -> &SymbolCommon {
        match self {
            Symbol::Namespace(s) => &s.common,
            Symbol::Type(s) => &s.common,
            Symbol::Enum(s) => &s.common,
            Symbol::EnumCase(s) => &s.common,
            Symbol::Function(s) => &s.common,
            Symbol::FunctionGroup(s) => &s.common,
            Symbol::Variable(s) => &s.common,
            Symbol::Parameter(s) => &s.common,
            Symbol::Property(s) => &s.common,
        }
    }

    fn common_mut(&mut self) -> &mut SymbolCommon {
        match self {
            Symbol::Namespace(s) => &mut s.common,
            Symbol::Type(s) => &mut s.common,
            Symbol::Enum(s) => &mut s.common,
            Symbol::EnumCase(s) => &mut s.common,
            Symbol::Function(s) => &mut s.common,
            Symbol::FunctionGroup(s) => &mut s.common,
            Symbol::Variable(s) => &mut s.common,
            Symbol::Parameter(s) => &mut s.common,
            Symbol::Property(s) => &mut s.common,
        }
    }

    /// Copy a declaration's `access`/`modifiers` header onto this symbol
    /// (spec §3.4 stores both on every symbol; the AST stores them on the
    /// declaration node instead, so the builder applies them once).
    pub fn apply_header(&mut self, access: AccessLevel, modifiers: Modifiers) {
        let common = self.common_mut();
        common.access = access;
        common.modifiers = modifiers;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.common().name
    }

    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.common().access
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.common().modifiers
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.common().resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.common_mut().resolved = true;
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Namespace(_) => "namespace",
            Symbol::Type(_) => "type",
            Symbol::Enum(_) => "enum",
            Symbol::EnumCase(_) => "enum_case",
            Symbol::Function(_) => "fn",
            Symbol::FunctionGroup(_) => "fn_group",
            Symbol::Variable(v) => {
                if v.is_field {
                    "field"
                } else {
                    "var"
                }
            }
            Symbol::Parameter(_) => "param",
            Symbol::Property(_) => "prop",
        }
    }

    /// The scope this symbol owns, if it is one of the scope-creating kinds
    /// (namespace, type, enum, function).
    #[must_use]
    pub fn as_scope(&self) -> Option<ScopeHandle> {
        match self {
            Symbol::Namespace(s) => Some(s.scope),
            Symbol::Type(s) => Some(s.scope),
            Symbol::Enum(s) => Some(s.scope),
            Symbol::Function(s) => Some(s.scope),
            _ => None,
        }
    }

    /// Whether this symbol can be used as a type in declarations (`Type` or
    /// `Enum`, ported from `original_source`'s `TypeLikeSymbol`).
    #[must_use]
    pub fn is_type_like(&self) -> bool {
        matches!(self, Symbol::Type(_) | Symbol::Enum(_))
    }

    /// The symbol's resolved type, for every kind that carries one. `None`
    /// for symbols with no type slot at all (namespaces, types/enums as
    /// declarations, enum cases, function groups).
    #[must_use]
    pub fn resolved_type(&self) -> Option<TypeHandle> {
        match self {
            Symbol::Function(s) => Some(s.return_type.get()),
            Symbol::Variable(s) => Some(s.resolved_type.get()),
            Symbol::Parameter(s) => Some(s.resolved_type.get()),
            Symbol::Property(s) => Some(s.resolved_type.get()),
            _ => None,
        }
    }

    pub fn set_resolved_type(&self, ty: TypeHandle) {
        match self {
            Symbol::Function(s) => s.return_type.set(ty),
            Symbol::Variable(s) => s.resolved_type.set(ty),
            Symbol::Parameter(s) => s.resolved_type.set(ty),
            Symbol::Property(s) => s.resolved_type.set(ty),
            _ => {}
        }
    }

    /// The hint the resolver consumes to find this symbol's type, for
    /// every typed kind (functions key their hint off the body, not an
    /// initializer).
    #[must_use]
    pub fn type_hint(&self) -> Option<&TypeHint> {
        match self {
            Symbol::Function(s) => Some(&s.return_hint),
            Symbol::Variable(s) => Some(&s.hint),
            Symbol::Parameter(s) => Some(&s.hint),
            Symbol::Property(s) => Some(&s.hint),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionSymbol> {
        match self {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function_mut(&mut self) -> Option<&mut FunctionSymbol> {
        match self {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function_group(&self) -> Option<&FunctionGroupSymbol> {
        match self {
            Symbol::FunctionGroup(g) => Some(g),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum_case(&self) -> Option<&EnumCaseSymbol> {
        match self {
            Symbol::EnumCase(c) => Some(c),
            _ => None,
        }
    }
}
