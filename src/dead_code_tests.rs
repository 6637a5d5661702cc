#![cfg(test)]

use crate::dead_code::{find_dead_code, ClassScopeMode, DeadCode, Settings};
use crate::scope::ScopeKind;

fn run(content: &str) -> Vec<DeadCode> {
    let tree = crate::parse(content).expect("parse");
    assert!(!tree.root_node().has_error());

    find_dead_code(&tree.root_node(), content).expect("find_dead_code")
}

fn names(results: &[DeadCode]) -> Vec<&str> {
    results.iter().map(|result| result.name.as_str()).collect()
}

#[test]
fn module_var_alive() {
    let results = run("var x = 1;\nfunction getX() {\n    return x;\n}\n");
    assert_eq!(0, results.len());
}

#[test]
fn module_var_shadowed_dead() {
    let results = run("var x = 1;\nfunction getX() {\n    var x = 1;\n    return x;\n}\n");
    assert_eq!(1, results.len());
    assert_eq!(results[0].name, "x");
    assert_eq!(results[0].scope_kind, ScopeKind::Module);
    // the outer declaration, not the shadowing one
    assert_eq!(results[0].ident_range.start, 4);
}

#[test]
fn param_shadows_outer() {
    let results = run("var outer = 1;\nfunction f(outer) {\n    return outer;\n}\nf();\n");
    assert_eq!(names(&results), ["outer"]);
    assert_eq!(results[0].scope_kind, ScopeKind::Module);
}

#[test]
fn single_declaration_dead() {
    let results = run("var dead = 1;\n");
    assert_eq!(names(&results), ["dead"]);
}

#[test]
fn declaration_without_initializer_dead() {
    let results = run("var dead;\n");
    assert_eq!(names(&results), ["dead"]);
}

#[test]
fn assignment_is_usage() {
    // write-only bindings are used: the rule targets dead declarations,
    // not dead writes
    let results = run("var counter = 0;\ncounter = 1;\n");
    assert_eq!(0, results.len());
}

#[test]
fn export_excluded() {
    let results = run("export var config = 1;\n");
    assert_eq!(0, results.len());
}

#[test]
fn export_lexical_excluded() {
    let results = run("export const config = {};\n");
    assert_eq!(0, results.len());
}

#[test]
fn export_specifier_counts_as_usage() {
    let results = run("var used = 1;\nvar obj = { used };\nexport { obj };\n");
    assert_eq!(0, results.len());
}

#[test]
fn property_key_is_not_usage() {
    let results = run("var dead = 1;\nvar obj = { dead: 2 };\nconsole.log(obj);\n");
    assert_eq!(names(&results), ["dead"]);
}

#[test]
fn member_property_is_not_usage() {
    let results = run("var dead = 1;\nconsole.log(window.dead);\n");
    assert_eq!(names(&results), ["dead"]);
}

#[test]
fn unresolved_globals_are_dropped() {
    let results = run("var alive = window.top;\nconsole.log(alive);\n");
    assert_eq!(0, results.len());
}

#[test]
fn destructured_names_not_tracked() {
    let results = run("var { a, b } = load();\n");
    assert_eq!(0, results.len());
}

#[test]
fn import_locals_not_tracked() {
    let results = run("import { helper } from './helper';\n");
    assert_eq!(0, results.len());
}

#[test]
fn import_local_resolves_usage() {
    let results = run("import helper from './helper';\nvar dead = 1;\nhelper();\n");
    assert_eq!(names(&results), ["dead"]);
}

#[test]
fn catch_parameter_not_tracked() {
    let results = run("try {\n    risky();\n} catch (err) {\n}\n");
    assert_eq!(0, results.len());
}

#[test]
fn redeclaration_merges_into_one_binding() {
    let results = run("var twice = 1;\nvar twice = 2;\n");
    assert_eq!(0, results.len());
}

#[test]
fn var_hoists_out_of_blocks() {
    let results = run(
        "function f() {\n    if (true) {\n        var hoisted = 1;\n    }\n    return hoisted;\n}\nf();\n",
    );
    assert_eq!(0, results.len());
}

#[test]
fn blocks_do_not_shadow() {
    let results =
        run("var x = 1;\nfunction f() {\n    {\n        var x = 2;\n    }\n    return x;\n}\nf();\n");
    assert_eq!(names(&results), ["x"]);
    assert_eq!(results[0].scope_kind, ScopeKind::Module);
}

#[test]
fn function_expression_local_dead() {
    let results = run("var f = function inner() {\n    var dead = 1;\n    return 2;\n};\nf();\n");
    assert_eq!(names(&results), ["dead"]);
    assert_eq!(results[0].scope_kind, ScopeKind::Function);
}

#[test]
fn arrow_local_dead() {
    let results = run("const f = (a) => {\n    var dead = 1;\n    return a;\n};\nf(1);\n");
    assert_eq!(names(&results), ["dead"]);
    assert_eq!(results[0].scope_kind, ScopeKind::Arrow);
}

#[test]
fn closure_over_outer_local() {
    let results = run(
        "function outer() {\n    var shared = 1;\n    function inner() {\n        return shared;\n    }\n    return inner;\n}\nouter();\n",
    );
    assert_eq!(0, results.len());
}

const CLASS_CONTENT: &str = "class C {\n    a() {\n        var tmp = 1;\n    }\n    b() {\n        var ok = 2;\n        return ok;\n    }\n}\nnew C();\n";

#[test]
fn class_aggregation_flags_only_dead_member_local() {
    let results = run(CLASS_CONTENT);
    assert_eq!(names(&results), ["tmp"]);
    assert_eq!(results[0].scope_kind, ScopeKind::Method);
}

#[test]
fn class_scopes_exclude_mode() {
    let tree = crate::parse(CLASS_CONTENT).expect("parse");
    let results = Settings {
        class_scopes: ClassScopeMode::Exclude,
    }
    .find_dead_code(&tree.root_node(), CLASS_CONTENT)
    .expect("find_dead_code");
    assert_eq!(names(&results), ["tmp"]);
}

#[test]
fn invalid_class_scope_mode_rejected() {
    assert!("everything".parse::<ClassScopeMode>().is_err());
    assert!("aggregate".parse::<ClassScopeMode>().is_ok());
}

#[test]
fn results_ordered_by_position() {
    let results = run("var dead2 = 1;\nvar dead1 = 2;\n");
    assert_eq!(names(&results), ["dead2", "dead1"]);
}

#[test]
fn repeated_runs_are_identical() {
    let content = "var dead = 1;\nclass C {\n    a() {\n        var tmp = 1;\n    }\n}\nnew C();\n";
    let first: Vec<_> = run(content)
        .iter()
        .map(|result| (result.name.clone(), result.ident_range.clone()))
        .collect();
    let second: Vec<_> = run(content)
        .iter()
        .map(|result| (result.name.clone(), result.ident_range.clone()))
        .collect();
    assert_eq!(first, second);
}
