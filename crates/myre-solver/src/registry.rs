//! `TypeRegistry`: a canonical, immutable factory for `Type` values
//! (spec §3.3, §4.1), plus the unification substitution it backs (§4.5.1).
//!
//! Canonicalization is done with string-keyed caches, exactly as spec §4.1
//! prescribes ("All registries use string-keyed caches derived from
//! structural names."). Two calls that would build structurally identical
//! compound types return the same `TypeHandle`; `Unresolved` instances are
//! the sole exception; they are unification variables and are never cached.

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use myre_binder::{ScopeKind, SymbolTable};
use myre_common::{SymbolHandle, TypeHandle};
use rustc_hash::FxHashMap;

/// The primitive type tags enumerated in spec §3.3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    Char,
    String,
    Void,
    Range,
}

/// `(alias, kind, System-style full name)`: every primitive is installed
/// under both (spec §4.1, "each primitive is also installed as a
/// `TypeDefinition` keyed by both alias and System-style full name").
const PRIMITIVES: &[(&str, PrimitiveKind, &str)] = &[
    ("i8", PrimitiveKind::I8, "System.SByte"),
    ("u8", PrimitiveKind::U8, "System.Byte"),
    ("i16", PrimitiveKind::I16, "System.Int16"),
    ("u16", PrimitiveKind::U16, "System.UInt16"),
    ("i32", PrimitiveKind::I32, "System.Int32"),
    ("u32", PrimitiveKind::U32, "System.UInt32"),
    ("i64", PrimitiveKind::I64, "System.Int64"),
    ("u64", PrimitiveKind::U64, "System.UInt64"),
    ("f32", PrimitiveKind::F32, "System.Single"),
    ("f64", PrimitiveKind::F64, "System.Double"),
    ("bool", PrimitiveKind::Bool, "System.Boolean"),
    ("char", PrimitiveKind::Char, "System.Char"),
    ("string", PrimitiveKind::String, "System.String"),
    ("void", PrimitiveKind::Void, "System.Void"),
    ("range", PrimitiveKind::Range, "System.Range"),
];

impl PrimitiveKind {
    #[must_use]
    pub fn alias(self) -> &'static str {
        PRIMITIVES.iter().find(|(_, kind, _)| *kind == self).map_or("?", |(alias, ..)| alias)
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::String | PrimitiveKind::Void | PrimitiveKind::Range)
    }
}

/// The unification variable key an `Unresolved` type carries (spec §3.3's
/// "fresh integer"). Lives in the `ena` union-find table owned by
/// [`TypeRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnresolvedVar(u32);

impl UnifyKey for UnresolvedVar {
    type Value = Slot;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        UnresolvedVar(u)
    }

    fn tag() -> &'static str {
        "UnresolvedVar"
    }
}

/// The value an `UnresolvedVar` unifies to: either still open, or bound to
/// some `TypeHandle` (which may itself be another still-open variable,
/// chased by [`TypeRegistry::apply_substitution`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Unbound,
    Bound(TypeHandle),
}

impl UnifyValue for Slot {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        Ok(match (a, b) {
            (Slot::Bound(t), Slot::Unbound) | (Slot::Unbound, Slot::Bound(t)) => Slot::Bound(*t),
            (Slot::Bound(t), Slot::Bound(_)) => Slot::Bound(*t),
            (Slot::Unbound, Slot::Unbound) => Slot::Unbound,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeData {
    Primitive(PrimitiveKind),
    Array { element: TypeHandle, rank: u32 },
    Defined(SymbolHandle),
    Generic { generic: SymbolHandle, arguments: Vec<TypeHandle> },
    Function { parameters: Vec<TypeHandle>, return_type: TypeHandle },
    Unresolved(UnresolvedVar),
}

/// Canonical factory for `Type` values (spec §4.1). Owns every `TypeData`
/// ever produced, addressed by [`TypeHandle`]; also owns the union-find
/// substitution that backs unification (spec §4.5.1), since the registry
/// is the only place that can turn a representative back into a `Type`.
pub struct TypeRegistry {
    types: Vec<TypeData>,
    compound_cache: FxHashMap<String, TypeHandle>,
    primitive_by_alias: FxHashMap<&'static str, TypeHandle>,
    /// Every `TypeDefinition`-reachable full name (primitive system names
    /// plus declared types/enums once seen via [`Self::defined`]), so
    /// `resolve_name`'s `System.<name>` fallback and member-lookup-style
    /// consumers can find primitives uniformly with user types (spec §4.1).
    by_full_name: FxHashMap<String, TypeHandle>,
    table: InPlaceUnificationTable<UnresolvedVar>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            compound_cache: FxHashMap::default(),
            primitive_by_alias: FxHashMap::default(),
            by_full_name: FxHashMap::default(),
            table: InPlaceUnificationTable::new(),
        };
        for (alias, kind, full_name) in PRIMITIVES {
            let handle = registry.alloc(TypeData::Primitive(*kind));
            registry.primitive_by_alias.insert(alias, handle);
            registry.by_full_name.insert((*full_name).to_string(), handle);
            registry.by_full_name.insert((*alias).to_string(), handle);
        }
        registry
    }

    fn alloc(&mut self, data: TypeData) -> TypeHandle {
        let handle = TypeHandle::from(self.types.len());
        self.types.push(data);
        handle
    }

    #[must_use]
    pub fn data(&self, handle: TypeHandle) -> &TypeData {
        &self.types[handle.index()]
    }

    // ------------------------------------------------------------------
    // Canonical constructors (spec §4.1)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn primitive(&self, alias: &str) -> Option<TypeHandle> {
        self.primitive_by_alias.get(alias).copied()
    }

    #[must_use]
    pub fn void(&self) -> TypeHandle {
        self.primitive("void").expect("void is installed at construction")
    }

    #[must_use]
    pub fn bool_type(&self) -> TypeHandle {
        self.primitive("bool").expect("bool is installed at construction")
    }

    #[must_use]
    pub fn i32_type(&self) -> TypeHandle {
        self.primitive("i32").expect("i32 is installed at construction")
    }

    pub fn array(&mut self, element: TypeHandle, rank: u32) -> TypeHandle {
        let key = format!("array:{}[{}]", self.display_name(element), rank);
        if let Some(handle) = self.compound_cache.get(&key) {
            return *handle;
        }
        let handle = self.alloc(TypeData::Array { element, rank });
        self.compound_cache.insert(key, handle);
        handle
    }

    pub fn function(&mut self, return_type: TypeHandle, parameters: &[TypeHandle]) -> TypeHandle {
        let params_str: Vec<String> = parameters.iter().map(|p| self.display_name(*p)).collect();
        let key = format!("func:({})->{}", params_str.join(","), self.display_name(return_type));
        if let Some(handle) = self.compound_cache.get(&key) {
            return *handle;
        }
        let handle = self.alloc(TypeData::Function { parameters: parameters.to_vec(), return_type });
        self.compound_cache.insert(key, handle);
        handle
    }

    /// `defined(symbol) → Type` (spec §4.1), canonicalized by the symbol's
    /// fully-qualified name walked from the scope tree.
    pub fn defined(&mut self, symbol: SymbolHandle, table: &SymbolTable) -> TypeHandle {
        let full_name = full_symbol_name(table, symbol);
        let key = format!("defined:{full_name}");
        if let Some(handle) = self.compound_cache.get(&key) {
            return *handle;
        }
        let handle = self.alloc(TypeData::Defined(symbol));
        self.compound_cache.insert(key, handle);
        self.by_full_name.insert(full_name, handle);
        handle
    }

    pub fn generic(&mut self, generic: SymbolHandle, arguments: Vec<TypeHandle>, table: &SymbolTable) -> TypeHandle {
        let full_name = full_symbol_name(table, generic);
        let args_str: Vec<String> = arguments.iter().map(|a| self.display_name(*a)).collect();
        let key = format!("{}<{}>", full_name, args_str.join(","));
        if let Some(handle) = self.compound_cache.get(&key) {
            return *handle;
        }
        let handle = self.alloc(TypeData::Generic { generic, arguments });
        self.compound_cache.insert(key, handle);
        handle
    }

    /// `fresh_unresolved() → Type`: never cached; each call is a fresh
    /// unification variable (spec §4.1, testable property 5).
    pub fn fresh_unresolved(&mut self) -> TypeHandle {
        let var = self.table.new_key(Slot::Unbound);
        self.alloc(TypeData::Unresolved(var))
    }

    /// `resolve_name(name, scope) → Type | none` (spec §4.1): primitives
    /// first, then a scope-chain lookup starting at `scope` (which already
    /// covers "current namespace" and "global" since `SymbolTable::lookup`
    /// walks the parent chain up to global), then a `System.<name>`
    /// fallback for both primitives-by-system-name and any declared type
    /// that happens to live in an explicit `System` namespace.
    pub fn resolve_name(
        &mut self,
        name: &str,
        scope: myre_common::ScopeHandle,
        table: &SymbolTable,
    ) -> Option<TypeHandle> {
        if let Some(handle) = self.primitive(name) {
            return Some(handle);
        }
        if let Some(symbol) = resolve_dotted(table, scope, name) {
            if table.symbol(symbol).is_type_like() {
                return Some(self.defined(symbol, table));
            }
        }
        if let Some(handle) = self.by_full_name.get(&format!("System.{name}")) {
            return Some(*handle);
        }
        if let Some(symbol) = resolve_dotted(table, table.global_scope(), &format!("System.{name}")) {
            if table.symbol(symbol).is_type_like() {
                return Some(self.defined(symbol, table));
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Unification (spec §4.5.1)
    // ------------------------------------------------------------------

    /// Walk substitution chains to the root, with path compression (spec
    /// §4.5.1, testable property 6: `apply(apply(t)) == apply(t)`).
    pub fn apply_substitution(&mut self, ty: TypeHandle) -> TypeHandle {
        let TypeData::Unresolved(var) = self.data(ty) else { return ty };
        let var = *var;
        match self.table.probe_value(var) {
            Slot::Unbound => ty,
            Slot::Bound(target) => {
                let resolved = self.apply_substitution(target);
                // Path compression: re-bind directly to the root so the
                // next lookup is O(1) rather than re-walking the chain.
                if resolved != target {
                    self.table.union_value(var, Slot::Bound(resolved));
                }
                resolved
            }
        }
    }

    #[must_use]
    pub fn is_unresolved(&self, ty: TypeHandle) -> bool {
        matches!(self.data(ty), TypeData::Unresolved(_))
    }

    /// Unify `t1` and `t2`. Returns `Ok(())` if they are (or were made to
    /// be) the same type; `Err` carries the two concrete display names for
    /// a type-mismatch diagnostic the caller should report with context
    /// (spec §4.5.1).
    pub fn unify(&mut self, t1: TypeHandle, t2: TypeHandle) -> Result<(), (String, String)> {
        let root1 = self.apply_substitution(t1);
        let root2 = self.apply_substitution(t2);
        if root1 == root2 {
            return Ok(());
        }
        match (self.data(root1).clone(), self.data(root2).clone()) {
            (TypeData::Unresolved(v1), TypeData::Unresolved(v2)) => {
                self.table.unify_var_var(v1, v2).ok();
                Ok(())
            }
            (TypeData::Unresolved(v1), _) => {
                self.table.union_value(v1, Slot::Bound(root2));
                Ok(())
            }
            (_, TypeData::Unresolved(v2)) => {
                self.table.union_value(v2, Slot::Bound(root1));
                Ok(())
            }
            _ => Err((self.display_name(root1), self.display_name(root2))),
        }
    }

    /// A human-readable name for diagnostics and cache keys (spec §4.1's
    /// string-keyed canonicalization).
    #[must_use]
    pub fn display_name(&self, ty: TypeHandle) -> String {
        match self.data(ty) {
            TypeData::Primitive(kind) => kind.alias().to_string(),
            TypeData::Array { element, rank } => format!("{}{}", self.display_name(*element), "[]".repeat(*rank as usize)),
            TypeData::Defined(symbol) => self.by_full_name.iter().find(|(_, h)| **h == ty).map_or_else(
                || format!("<type#{}>", symbol.index()),
                |(name, _)| name.clone(),
            ),
            TypeData::Generic { arguments, .. } => {
                let args: Vec<String> = arguments.iter().map(|a| self.display_name(*a)).collect();
                format!("<generic<{}>>", args.join(","))
            }
            TypeData::Function { parameters, return_type } => {
                let params: Vec<String> = parameters.iter().map(|p| self.display_name(*p)).collect();
                format!("({}): {}", params.join(", "), self.display_name(*return_type))
            }
            TypeData::Unresolved(_) => "?".to_string(),
        }
    }
}

/// Resolve a possibly dotted name (`"Foo.Bar"`) against `scope`: the first
/// segment is looked up with a parent-chain walk (covering both "current
/// namespace" and "global" per spec §4.1), every subsequent segment is
/// looked up locally inside whatever scope the previous segment's symbol
/// owns.
fn resolve_dotted(table: &SymbolTable, scope: myre_common::ScopeHandle, dotted: &str) -> Option<SymbolHandle> {
    let mut segments = dotted.split('.');
    let first = segments.next()?;
    let mut current = table.lookup(scope, first)?;
    for segment in segments {
        let owned_scope = table.symbol(current).as_scope()?;
        current = table.lookup_local(owned_scope, segment)?;
    }
    Some(current)
}

/// Walk from `symbol` up through its enclosing namespace/type scopes to
/// build a dotted full name (spec §4.1's canonicalization key).
fn full_symbol_name(table: &SymbolTable, symbol: SymbolHandle) -> String {
    let mut parts = vec![table.symbol(symbol).name().to_string()];
    let mut scope = table.symbol(symbol).as_scope().map(|owned| table.scope(owned).parent);
    while let Some(handle) = scope {
        if handle.is_none() {
            break;
        }
        let s = table.scope(handle);
        if matches!(s.kind, ScopeKind::Namespace | ScopeKind::Type) && !s.name.is_empty() {
            parts.push(s.name.clone());
        }
        if s.is_global() {
            break;
        }
        scope = Some(s.parent);
    }
    parts.reverse();
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_lookup_is_stable() {
        let registry = TypeRegistry::new();
        let a = registry.primitive("i32").unwrap();
        let b = registry.primitive("i32").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn array_is_canonicalized_by_structure() {
        let mut registry = TypeRegistry::new();
        let i32_ty = registry.primitive("i32").unwrap();
        let a = registry.array(i32_ty, 1);
        let b = registry.array(i32_ty, 1);
        assert_eq!(a, b);
        let c = registry.array(i32_ty, 2);
        assert_ne!(a, c);
    }

    #[test]
    fn fresh_unresolved_is_never_shared() {
        let mut registry = TypeRegistry::new();
        let a = registry.fresh_unresolved();
        let b = registry.fresh_unresolved();
        assert_ne!(a, b);
    }

    #[test]
    fn unify_binds_unresolved_to_concrete() {
        let mut registry = TypeRegistry::new();
        let unknown = registry.fresh_unresolved();
        let i32_ty = registry.primitive("i32").unwrap();
        registry.unify(unknown, i32_ty).unwrap();
        assert_eq!(registry.apply_substitution(unknown), i32_ty);
    }

    #[test]
    fn unify_two_unresolved_vars_chains_through() {
        let mut registry = TypeRegistry::new();
        let a = registry.fresh_unresolved();
        let b = registry.fresh_unresolved();
        registry.unify(a, b).unwrap();
        let i32_ty = registry.primitive("i32").unwrap();
        registry.unify(b, i32_ty).unwrap();
        assert_eq!(registry.apply_substitution(a), i32_ty);
    }

    #[test]
    fn unify_mismatched_concrete_types_errors() {
        let mut registry = TypeRegistry::new();
        let i32_ty = registry.primitive("i32").unwrap();
        let string_ty = registry.primitive("string").unwrap();
        let err = registry.unify(i32_ty, string_ty).unwrap_err();
        assert_eq!(err, ("i32".to_string(), "string".to_string()));
    }

    #[test]
    fn apply_substitution_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let a = registry.fresh_unresolved();
        let b = registry.fresh_unresolved();
        let i32_ty = registry.primitive("i32").unwrap();
        registry.unify(a, b).unwrap();
        registry.unify(b, i32_ty).unwrap();
        let once = registry.apply_substitution(a);
        let twice = registry.apply_substitution(once);
        assert_eq!(once, twice);
    }
}
