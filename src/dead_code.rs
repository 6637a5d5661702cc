use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use tree_sitter::Node;

use crate::{
    error::AnalysisError,
    scope::{BindingId, ScopeKind, ScopeTree},
    usage,
};

/// How class scopes own their member locals.
///
/// The class body itself never declares variables; the interesting names
/// live one level down, in the method scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassScopeMode {
    /// A class is analyzed as a unit: its member scopes' bindings are
    /// attributed to the class.
    #[default]
    Aggregate,
    /// Member scopes are analyzed individually and the class itself
    /// contributes nothing.
    Exclude,
}

impl FromStr for ClassScopeMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, AnalysisError> {
        match s {
            "aggregate" => Ok(ClassScopeMode::Aggregate),
            "exclude" => Ok(ClassScopeMode::Exclude),
            _ => Err(AnalysisError::Configuration(format!(
                "unknown class scope mode: {s}"
            ))),
        }
    }
}

/// Analysis configuration, fixed before any file is visited.
#[derive(Debug, Clone, Copy, Default)]
pub struct Settings {
    pub class_scopes: ClassScopeMode,
}

/// An unused binding, ready for reporting and fixing.
#[derive(Debug, Clone)]
pub struct DeadCode {
    pub name: String,
    pub scope_kind: ScopeKind,
    /// The declaring identifier, the diagnostic anchor.
    pub ident_range: Range<usize>,
    /// The declaration node around it.
    pub decl_range: Range<usize>,
}

impl fmt::Display for DeadCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Variable '{}' is not used", self.name)
    }
}

impl Settings {
    /// Run the whole pipeline over one parsed file: build the scope
    /// graph, resolve references, classify, and return the findings
    /// sorted by source position.
    pub fn find_dead_code(&self, root: &Node, source: &str) -> Result<Vec<DeadCode>, AnalysisError> {
        let mut scopes = ScopeTree::build(root, source)?;
        usage::resolve_references(&mut scopes, root, source);

        let mut results: Vec<DeadCode> = candidates(&scopes, self.class_scopes)
            .into_iter()
            .filter(|&id| usage::is_unused(scopes.binding(id)))
            .map(|id| {
                let binding = scopes.binding(id);
                DeadCode {
                    name: binding.name.clone(),
                    scope_kind: scopes.scope(binding.scope).kind,
                    ident_range: binding.ident_range.clone(),
                    decl_range: binding.decl_range.clone(),
                }
            })
            .collect();
        results.sort_unstable_by_key(|result| result.ident_range.start);
        Ok(results)
    }
}

pub fn find_dead_code(root: &Node, source: &str) -> Result<Vec<DeadCode>, AnalysisError> {
    Settings::default().find_dead_code(root, source)
}

/// Trackable bindings eligible for reporting, in discovery order.
fn candidates(scopes: &ScopeTree, mode: ClassScopeMode) -> Vec<BindingId> {
    let mut out = Vec::new();
    for (_, scope) in scopes.scopes() {
        match scope.kind {
            ScopeKind::Class => {
                if mode == ClassScopeMode::Aggregate {
                    for &child in &scope.children {
                        out.extend(trackable(scopes, &scopes.scope(child).bindings));
                    }
                }
            }
            _ => {
                // member scopes were already folded into their class
                let aggregated = mode == ClassScopeMode::Aggregate
                    && scope
                        .parent
                        .map_or(false, |parent| scopes.scope(parent).kind == ScopeKind::Class);
                if !aggregated {
                    out.extend(trackable(scopes, &scope.bindings));
                }
            }
        }
    }
    out
}

fn trackable<'a>(
    scopes: &'a ScopeTree,
    bindings: &'a [BindingId],
) -> impl Iterator<Item = BindingId> + 'a {
    bindings
        .iter()
        .copied()
        .filter(|&id| scopes.binding(id).is_trackable())
}
