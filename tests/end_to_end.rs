//! End-to-end pipeline scenarios.

use myre_ast::NodeKind;
use myre_binder::Symbol;

fn find_function<'a>(table: &'a myre_binder::SymbolTable, name: &str) -> &'a myre_binder::FunctionSymbol {
    let global = table.global_scope();
    let handle = table.lookup_local(global, name).unwrap_or_else(|| panic!("no symbol named '{name}'"));
    table.symbol(handle).as_function().unwrap_or_else(|| panic!("'{name}' is not a function"))
}

/// S1: a two-parameter function whose return type and return expression
/// both resolve to `i32`.
#[test]
fn s1_add_function_resolves_parameter_and_return_types() {
    let unit = myre::compile("fn add(i32 a, i32 b): i32 { return a + b; }");
    assert!(!unit.has_errors(), "{:?}", unit.diagnostics);

    let function = find_function(&unit.table, "add");
    assert_eq!(function.parameters.len(), 2);
    let i32_ty = unit.registry.primitive("i32").unwrap();
    assert_eq!(function.return_type.get(), i32_ty);
    for param in &function.parameters {
        assert_eq!(unit.table.symbol(*param).resolved_type(), Some(i32_ty));
    }

    let NodeKind::FunctionDecl { body, .. } = &unit.arena.get(unit_function_decl(&unit)).kind else {
        panic!("expected a FunctionDecl")
    };
    let NodeKind::Block { statements } = &unit.arena.get(*body).kind else { panic!("expected a Block") };
    let NodeKind::ReturnStmt { expr } = &unit.arena.get(statements[0]).kind else { panic!("expected a ReturnStmt") };
    assert_eq!(unit.arena.get(*expr).resolved_type.get(), i32_ty);
}

fn unit_function_decl(unit: &myre::CompilationUnit) -> myre_ast::NodeId {
    let NodeKind::CompilationUnit { declarations, .. } = &unit.arena.get(unit.root).kind else {
        panic!("expected a CompilationUnit")
    };
    declarations[0]
}

/// S2: a global `var` with an arithmetic initializer infers `i32`.
#[test]
fn s2_global_var_infers_i32_from_initializer() {
    let unit = myre::compile("var x = 1 + 2;");
    assert!(!unit.has_errors(), "{:?}", unit.diagnostics);

    let global = unit.table.global_scope();
    let x = unit.table.lookup_local(global, "x").unwrap();
    let i32_ty = unit.registry.primitive("i32").unwrap();
    assert_eq!(unit.table.symbol(x).resolved_type(), Some(i32_ty));

    let NodeKind::CompilationUnit { declarations, .. } = &unit.arena.get(unit.root).kind else { unreachable!() };
    let NodeKind::VariableDecl { initializer, .. } = &unit.arena.get(declarations[0]).kind else {
        panic!("expected a VariableDecl")
    };
    assert_eq!(unit.arena.get(*initializer).resolved_type.get(), i32_ty);
}

/// S3: a user-defined type, its method, construction, and a method call
/// chain through `DefinedType` to the method's return type.
#[test]
fn s3_defined_type_method_call_resolves() {
    let source = "type Point { i32 x; i32 y; fn len(): i32 { return x + y; } } var p = new Point(); var n = p.len();";
    let unit = myre::compile(source);
    assert!(!unit.has_errors(), "{:?}", unit.diagnostics);

    let global = unit.table.global_scope();
    let point_symbol = unit.table.lookup_local(global, "Point").unwrap();
    assert!(matches!(unit.table.symbol(point_symbol), Symbol::Type(_)));

    let p = unit.table.lookup_local(global, "p").unwrap();
    let point_ty = unit.table.symbol(p).resolved_type().unwrap();
    assert!(matches!(unit.registry.data(point_ty), myre_solver::TypeData::Defined(sym) if *sym == point_symbol));

    let n = unit.table.lookup_local(global, "n").unwrap();
    let i32_ty = unit.registry.primitive("i32").unwrap();
    assert_eq!(unit.table.symbol(n).resolved_type(), Some(i32_ty));
}

/// S4: a declared-type/initializer mismatch is reported, and the variable
/// still carries its declared type rather than being left unresolved.
#[test]
fn s4_declared_type_mismatch_is_reported_but_recovers() {
    let unit = myre::compile(r#"var x: i32 = "hello";"#);
    assert!(unit.has_errors());
    assert!(unit
        .diagnostics
        .iter()
        .any(|d| d.message.contains("type mismatch in variable initialization")
            && d.message.contains("'i32'")
            && d.message.contains("'string'")));

    let global = unit.table.global_scope();
    let x = unit.table.lookup_local(global, "x").unwrap();
    let i32_ty = unit.registry.primitive("i32").unwrap();
    assert_eq!(unit.table.symbol(x).resolved_type(), Some(i32_ty));
}

/// S5: mutually recursive return-type inference converges within the
/// fixed-point pass cap, with no diagnostics.
#[test]
fn s5_mutually_recursive_return_types_converge() {
    let unit = myre::compile("fn f() { return g(); } fn g(): i32 { return 1; }");
    assert!(!unit.has_errors(), "{:?}", unit.diagnostics);

    let f = find_function(&unit.table, "f");
    let i32_ty = unit.registry.primitive("i32").unwrap();
    assert_eq!(f.return_type.get(), i32_ty);
}

/// S6: malformed input recovers and still produces a well-formed
/// `IfStmt`, and subsequent declarations keep parsing.
#[test]
fn s6_malformed_if_condition_recovers() {
    let source = "fn bad() { if (x > { } } fn good(): i32 { return 1; }";
    let unit = myre::compile(source);
    assert!(unit.has_errors());
    assert!(unit.diagnostics.iter().any(|d| d.message.contains("expected ')'")));
    assert!(unit.arena.contains_errors(unit.root));

    let global = unit.table.global_scope();
    assert!(unit.table.lookup_local(global, "good").is_some(), "parsing should resume after the malformed if");
}
