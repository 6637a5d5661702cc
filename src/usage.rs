use tree_sitter::Node;

use crate::binding::{Binding, Reference};
use crate::scope::{ScopeId, ScopeTree};

/// Attach every identifier occurrence to the binding it denotes.
///
/// Occurrences that no enclosing scope declares refer to globals outside
/// the analyzed file and are dropped. Member properties, object keys and
/// labels are distinct node kinds and never arrive at resolution.
pub fn resolve_references(scopes: &mut ScopeTree, root: &Node, source: &str) {
    let scope = scopes.scope_of_node(root).unwrap_or(0);
    walk(scopes, root, scope, source);
}

fn walk(scopes: &mut ScopeTree, node: &Node, scope: ScopeId, source: &str) {
    match node.kind() {
        // imported names live in other modules
        "import_statement" => return,

        // `export { local as external }`: only the local name resolves
        "export_specifier" => {
            if let Some(name) = node.child_by_field_name("name") {
                walk(scopes, &name, scope, source);
            }
            return;
        }

        "identifier" | "shorthand_property_identifier" => {
            if scopes.is_declaring_ident(node) {
                return;
            }
            let Ok(name) = node.utf8_text(source.as_bytes()) else {
                return;
            };
            if let Some(binding) = scopes.resolve(scope, name) {
                scopes.add_reference(
                    binding,
                    Reference {
                        range: node.byte_range(),
                        scope,
                    },
                );
            }
            return;
        }

        _ => {}
    }

    let scope = scopes.scope_of_node(node).unwrap_or(scope);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk(scopes, &child, scope, source);
    }
}

/// A binding whose only occurrence is its own declaration is unused.
/// Reads and writes count alike: a write-only binding is used.
pub fn is_unused(binding: &Binding) -> bool {
    binding.references.len() == 1
}
