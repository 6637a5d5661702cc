#![cfg(test)]

use crate::dead_code::Settings;

fn run(content: &str) -> String {
    let tree = crate::parse(content).expect("parse");
    assert!(!tree.root_node().has_error());

    let results = Settings::default()
        .find_dead_code(&tree.root_node(), content)
        .expect("find_dead_code");
    crate::edit::edit_dead_code(content, &tree, results.into_iter()).expect("edit_dead_code")
}

macro_rules! no_edits {
    ($s: expr) => {
        let s = $s.to_string();
        assert_eq!(run(&s), s);
    };
}

#[test]
fn used_declaration_stays() {
    no_edits!("var x = 1;\nconsole.log(x);\n");
}

#[test]
fn exported_declaration_stays() {
    no_edits!("export var config = 1;\n");
}

#[test]
fn loop_variable_stays() {
    no_edits!("for (var key in obj) {\n    use(key);\n}\n");
}

#[test]
fn dead_statement_removed() {
    let result = run("var alive = 1;\nvar dead = 2;\nconsole.log(alive);\n");
    assert_eq!(result, "var alive = 1;\nconsole.log(alive);\n");
}

#[test]
fn dead_statement_at_file_start() {
    let result = run("var dead = 1;\nconsole.log(2);\n");
    assert_eq!(result, "console.log(2);\n");
}

#[test]
fn dead_statement_keeps_indented_sibling() {
    let result = run("function f() {\n    var dead = 1;\n    return 2;\n}\nf();\n");
    assert_eq!(result, "function f() {\n    return 2;\n}\nf();\n");
}

#[test]
fn shadowed_outer_removed() {
    let result = run("var x = 1;\nfunction getX() {\n    var x = 1;\n    return x;\n}\ngetX();\n");
    assert_eq!(
        result,
        "function getX() {\n    var x = 1;\n    return x;\n}\ngetX();\n"
    );
}

#[test]
fn split_keeps_used_trailing_declarator() {
    let result = run("var dead = 1, alive = 2;\nconsole.log(alive);\n");
    assert_eq!(result, "var alive = 2;\nconsole.log(alive);\n");
}

#[test]
fn split_keeps_used_leading_declarator() {
    let result = run("var alive = 1, dead = 2;\nconsole.log(alive);\n");
    assert_eq!(result, "var alive = 1;\nconsole.log(alive);\n");
}

#[test]
fn fully_dead_declaration_list_removed_whole() {
    let result = run("var dead1 = 1, dead2 = 2;\n");
    assert_eq!(result, "");
}

#[test]
fn for_head_declaration_keeps_loop_parseable() {
    let result = run("for (var dead = 0;;) {\n    stop();\n}\n");
    assert_eq!(result, "for (;;) {\n    stop();\n}\n");
}

#[test]
fn fix_is_idempotent() {
    let edited = run("var dead = 1;\nvar alive = 2;\nconsole.log(alive);\n");
    assert_eq!(edited, "var alive = 2;\nconsole.log(alive);\n");
    assert_eq!(run(&edited), edited);
}
