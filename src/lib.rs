//! Scan JavaScript files for unused variable bindings.

mod binding;
mod dead_code;
mod dead_code_tests;
mod edit;
mod edit_tests;
mod error;
pub mod report;
mod scope;
mod usage;

pub use binding::{Binding, Reference};
pub use dead_code::{find_dead_code, ClassScopeMode, DeadCode, Settings};
pub use edit::edit_dead_code;
pub use error::AnalysisError;
pub use scope::{BindingId, Scope, ScopeId, ScopeKind, ScopeTree};

/// Parse JavaScript source with the bundled grammar.
pub fn parse(source: &str) -> Result<tree_sitter::Tree, AnalysisError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|err| AnalysisError::Structural(format!("loading grammar: {err}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::Structural("parser returned no tree".to_string()))
}
