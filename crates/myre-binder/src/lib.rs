//! Symbol table and scope tree construction for Myre (spec §4.2, §4.4).

mod builder;
mod scope;
mod symbol;
mod table;

pub use builder::build;
pub use scope::{Scope, ScopeKind};
pub use symbol::{
    EnumCaseSymbol, EnumSymbol, FunctionGroupSymbol, FunctionSymbol, NamespaceSymbol, ParameterSymbol, PropertySymbol,
    Symbol, SymbolCommon, TypeHint, TypeSymbol, VariableSymbol,
};
pub use table::{DefineError, SymbolTable};
