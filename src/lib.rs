//! Front-end compiler core for Myre: wires the scanner, parser, binder, and
//! solver into one pipeline (spec §2's "End-to-end composition").
//!
//! ```text
//! source text -> Lexer -> Parser -> SymbolTableBuilder -> TypeResolver
//! ```
//! Every phase reports failures as [`Diagnostic`]s rather than aborting, so
//! a single [`compile`] call always returns a full, walkable
//! [`CompilationUnit`] even for source riddled with errors.

use anyhow::Context;

pub use myre_ast::{Arena, NodeId};
pub use myre_binder::SymbolTable;
pub use myre_common::{Diagnostic, DiagnosticLevel};
pub use myre_solver::TypeRegistry;

/// The fully-processed result of compiling one source file: every phase's
/// output, kept together so callers can walk the AST alongside its scope
/// tree and resolved types (spec §6's "annotated AST" plus the symbol
/// table and type registry that annotate it).
pub struct CompilationUnit {
    pub arena: Arena,
    pub root: NodeId,
    pub table: SymbolTable,
    pub registry: TypeRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationUnit {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
    }
}

/// Run the full pipeline over one compilation unit's source text (spec
/// §2). Never panics on malformed input: scanning, parsing, binding, and
/// resolving each accumulate diagnostics instead of aborting, the same way
/// every individual phase already behaves.
#[must_use]
pub fn compile(source: &str) -> CompilationUnit {
    let _span = tracing::info_span!("compile", bytes = source.len()).entered();

    let tokens = myre_scanner::Lexer::new(source).tokenize();
    let myre_parser::ParseOutput { arena, root, diagnostics: parse_diagnostics } = myre_parser::parse(&tokens);

    let (mut table, bind_diagnostics) = myre_binder::build(&arena, root);

    let mut registry = myre_solver::TypeRegistry::new();
    let resolve_diagnostics = myre_solver::resolve(&arena, root, &mut table, &mut registry);

    let mut diagnostics = Vec::with_capacity(parse_diagnostics.len() + bind_diagnostics.len() + resolve_diagnostics.len());
    diagnostics.extend(parse_diagnostics);
    diagnostics.extend(bind_diagnostics);
    diagnostics.extend(resolve_diagnostics);

    tracing::info!(nodes = arena.len(), diagnostics = diagnostics.len(), "compile complete");
    CompilationUnit { arena, root, table, registry, diagnostics }
}

/// Read and compile a source file from disk.
///
/// # Errors
/// Returns an error if `path` cannot be read; compilation itself never
/// fails at this layer (see [`compile`]).
pub fn compile_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<CompilationUnit> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file '{}'", path.display()))?;
    Ok(compile(&source))
}

/// Install a `tracing` subscriber reading `RUST_LOG` (or `myre=debug` if
/// unset), for binaries and tests that want readable phase-by-phase spans.
/// Idempotent: a second call is a harmless no-op (`set_global_default`
/// failing silently is expected when tests run in the same process).
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("myre=debug"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_trivial_function_without_diagnostics() {
        let unit = compile("fn add(i32 a, i32 b): i32 { return a + b; }");
        assert!(!unit.has_errors(), "{:?}", unit.diagnostics);
    }

    #[test]
    fn reports_a_type_mismatch() {
        let unit = compile(r#"var x: i32 = "hello";"#);
        assert!(unit.has_errors());
    }
}
