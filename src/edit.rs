use tree_sitter::{Node, Tree};

use crate::{dead_code::DeadCode, error::AnalysisError};

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

fn apply_edits<'a>(src: &str, edits: impl Iterator<Item = &'a Edit>) -> String {
    let mut pos = 0;
    let mut result = String::with_capacity(src.len());
    for edit in edits {
        if pos <= edit.start {
            result.push_str(&src[pos..edit.start]);
            result.push_str(&edit.replacement);
            pos = edit.end;
        } else if pos < edit.end {
            // adjacent edits may share trimmed whitespace
            pos = edit.end;
        }
    }
    result.push_str(&src[pos..]);
    result
}

/// Deletes the declarations of `dead` from `original`.
///
/// A declaration statement whose declarators are all dead is removed
/// whole; otherwise the statement is split and only the dead declarators
/// are deleted, so used siblings survive.
pub fn edit_dead_code(
    original: &str,
    tree: &Tree,
    dead: impl Iterator<Item = DeadCode>,
) -> Result<String, AnalysisError> {
    let root = tree.root_node();
    let mut statements: Vec<(Node, Vec<Node>)> = Vec::new();
    for result in dead {
        let (statement, declarator) = locate(&root, &result)?;
        match statements
            .iter_mut()
            .find(|(other, _)| other.id() == statement.id())
        {
            Some((_, declarators)) => declarators.push(declarator),
            None => statements.push((statement, vec![declarator])),
        }
    }

    let mut edits = Vec::new();
    for (statement, declarators) in &statements {
        if declarators.len() == declarator_count(statement) {
            edits.push(remove_statement(original, statement));
        } else {
            for declarator in declarators {
                if let Some(edit) = remove_declarator(original, declarator) {
                    edits.push(edit);
                }
            }
        }
    }
    edits.sort_unstable_by(|e1, e2| {
        if e1.start == e2.start {
            e1.end.cmp(&e2.end)
        } else {
            e1.start.cmp(&e2.start)
        }
    });

    Ok(apply_edits(original, edits.iter()))
}

/// Walk upward from the diagnostic anchor to the declaration statement.
fn locate<'tree>(
    root: &Node<'tree>,
    dead: &DeadCode,
) -> Result<(Node<'tree>, Node<'tree>), AnalysisError> {
    let anchor = root
        .descendant_for_byte_range(dead.ident_range.start, dead.ident_range.end)
        .ok_or_else(|| {
            AnalysisError::Structural(format!(
                "declaration of '{}' disappeared from the tree",
                dead.name
            ))
        })?;
    let mut node = anchor;
    while let Some(parent) = node.parent() {
        if node.kind() == "variable_declarator"
            && matches!(parent.kind(), "variable_declaration" | "lexical_declaration")
        {
            return Ok((parent, node));
        }
        node = parent;
    }
    Err(AnalysisError::Structural(format!(
        "no declaration statement above '{}'",
        dead.name
    )))
}

fn declarator_count(statement: &Node) -> usize {
    let mut cursor = statement.walk();
    statement
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .count()
}

fn remove_statement(source: &str, statement: &Node) -> Edit {
    // a `for` head keeps its semicolon so the loop stays parseable
    if statement
        .parent()
        .map_or(false, |parent| parent.kind() == "for_statement")
    {
        return Edit {
            start: statement.start_byte(),
            end: statement.end_byte(),
            replacement: ";".to_string(),
        };
    }

    let start = whitespace_before(source, statement.start_byte());
    let mut end = statement.end_byte();
    if start == 0 {
        end = line_after(source, end);
    }
    Edit {
        start,
        end,
        replacement: String::new(),
    }
}

/// Deletes one declarator out of a multi-name declaration, taking one
/// separating comma with it.
fn remove_declarator(source: &str, declarator: &Node) -> Option<Edit> {
    if let Some(comma) = declarator.next_sibling().filter(|sibling| sibling.kind() == ",") {
        return Some(Edit {
            start: declarator.start_byte(),
            end: spaces_after(source, comma.end_byte()),
            replacement: String::new(),
        });
    }
    if let Some(comma) = declarator.prev_sibling().filter(|sibling| sibling.kind() == ",") {
        return Some(Edit {
            start: comma.start_byte(),
            end: declarator.end_byte(),
            replacement: String::new(),
        });
    }
    None
}

fn whitespace_before(source: &str, mut start: usize) -> usize {
    let bytes = source.as_bytes();
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t' | b'\r' | b'\n') {
        start -= 1;
    }
    start
}

fn spaces_after(source: &str, mut end: usize) -> usize {
    let bytes = source.as_bytes();
    while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    end
}

fn line_after(source: &str, end: usize) -> usize {
    let bytes = source.as_bytes();
    let mut end = spaces_after(source, end);
    if bytes.get(end) == Some(&b'\r') {
        end += 1;
    }
    if bytes.get(end) == Some(&b'\n') {
        end += 1;
    }
    end
}
