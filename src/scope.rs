use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;

use ariadne::Color;
use tree_sitter::Node;

use crate::binding::{Binding, Reference};
use crate::error::AnalysisError;

pub type ScopeId = usize;
pub type BindingId = usize;

/// Syntactic constructs that introduce a lexical scope.
///
/// Plain blocks are deliberately absent: declarations hoist to the
/// nearest function-like or module scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Method,
    Arrow,
    Class,
}

impl ScopeKind {
    /// Construct the scope kind *if* this node opens a new scope
    pub fn of_node(node: &Node) -> Option<Self> {
        match node.kind() {
            "program" => Some(ScopeKind::Module),
            "function_declaration"
            | "function_expression"
            | "generator_function_declaration"
            | "generator_function" => Some(ScopeKind::Function),
            "method_definition" => Some(ScopeKind::Method),
            "arrow_function" => Some(ScopeKind::Arrow),
            "class_declaration" | "class" => Some(ScopeKind::Class),
            _ => None,
        }
    }

    pub fn color(self) -> Color {
        match self {
            ScopeKind::Module => Color::Yellow,
            ScopeKind::Function => Color::Cyan,
            ScopeKind::Method => Color::Blue,
            ScopeKind::Arrow => Color::Green,
            ScopeKind::Class => Color::Magenta,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScopeKind::Module => write!(fmt, "module scope"),
            ScopeKind::Function => write!(fmt, "function scope"),
            ScopeKind::Method => write!(fmt, "method scope"),
            ScopeKind::Arrow => write!(fmt, "arrow function scope"),
            ScopeKind::Class => write!(fmt, "class scope"),
        }
    }
}

/// One lexical scope. `parent` chains are acyclic and end at the
/// module scope.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Extent of the introducing node.
    pub range: Range<usize>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Declared names in declaration order, unique per scope.
    pub bindings: Vec<BindingId>,
}

/// The scope graph of one file: every scope and every binding,
/// index-addressed. Built in a single top-down traversal; the structure
/// is read-only afterwards, only reference lists keep growing.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    scope_by_node: HashMap<usize, ScopeId>,
    declaring_idents: HashSet<usize>,
}

fn structural(node: &Node, what: &str) -> AnalysisError {
    AnalysisError::Structural(format!("{} at offset {}", what, node.start_byte()))
}

impl ScopeTree {
    /// Build the scope graph for a parsed program.
    pub fn build(root: &Node, source: &str) -> Result<Self, AnalysisError> {
        if root.kind() != "program" {
            return Err(structural(root, "analysis must start at a program root"));
        }
        let mut tree = ScopeTree::default();
        let module = tree.push_scope(ScopeKind::Module, root, None);
        tree.collect(root, module, source)?;
        Ok(tree)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter().enumerate()
    }

    /// The scope a scope-introducing node materialized into.
    pub fn scope_of_node(&self, node: &Node) -> Option<ScopeId> {
        self.scope_by_node.get(&node.id()).copied()
    }

    /// Whether this identifier node is a declaration site rather than a use.
    pub fn is_declaring_ident(&self, node: &Node) -> bool {
        self.declaring_idents.contains(&node.id())
    }

    /// Find the binding `name` denotes when used in `from`, walking
    /// outward through enclosing scopes. The nearest declaration wins;
    /// resolution never passes a scope that redeclares the name.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<BindingId> {
        let mut scope = from;
        loop {
            let found = self.scopes[scope]
                .bindings
                .iter()
                .copied()
                .find(|&id| self.bindings[id].name == name);
            if found.is_some() {
                return found;
            }
            scope = self.scopes[scope].parent?;
        }
    }

    pub(crate) fn add_reference(&mut self, id: BindingId, reference: Reference) {
        self.bindings[id].references.push(reference);
    }

    fn push_scope(&mut self, kind: ScopeKind, node: &Node, parent: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            range: node.byte_range(),
            parent,
            children: Vec::new(),
            bindings: Vec::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(id);
        }
        self.scope_by_node.insert(node.id(), id);
        id
    }

    fn collect(&mut self, node: &Node, scope: ScopeId, source: &str) -> Result<(), AnalysisError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(&child, scope, source)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: &Node, scope: ScopeId, source: &str) -> Result<(), AnalysisError> {
        if let Some(kind) = ScopeKind::of_node(node) {
            return self.enter_scope(kind, node, scope, source);
        }
        match node.kind() {
            "variable_declaration" | "lexical_declaration" => {
                let mut cursor = node.walk();
                let declarators: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "variable_declarator")
                    .collect();
                for declarator in declarators {
                    self.declare_declarator(&declarator, scope, source)?;
                }
                Ok(())
            }

            // `for (var k in o)` binds k with no declarator node in the tree
            "for_in_statement" if node.child_by_field_name("kind").is_some() => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.declare_pattern(&left, scope, source)?;
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.visit(&right, scope, source)?;
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit(&body, scope, source)?;
                }
                Ok(())
            }

            "catch_clause" => {
                if let Some(parameter) = node.child_by_field_name("parameter") {
                    self.declare_pattern(&parameter, scope, source)?;
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit(&body, scope, source)?;
                }
                Ok(())
            }

            "import_statement" => self.declare_imports(node, scope, source),

            _ => self.collect(node, scope, source),
        }
    }

    fn enter_scope(
        &mut self,
        kind: ScopeKind,
        node: &Node,
        parent: ScopeId,
        source: &str,
    ) -> Result<(), AnalysisError> {
        let scope = self.push_scope(kind, node, Some(parent));
        match kind {
            ScopeKind::Module => Err(structural(node, "unexpected nested program node")),

            ScopeKind::Function => {
                if let Some(name) = node.child_by_field_name("name") {
                    // declaration names are visible outside,
                    // expression names only inside
                    let target = if node.kind().ends_with("declaration") {
                        parent
                    } else {
                        scope
                    };
                    self.declare(target, &name, name.byte_range(), false, source)?;
                }
                let parameters = node
                    .child_by_field_name("parameters")
                    .ok_or_else(|| structural(node, "function without parameter list"))?;
                self.declare_pattern(&parameters, scope, source)?;
                let body = node
                    .child_by_field_name("body")
                    .ok_or_else(|| structural(node, "function without body"))?;
                self.collect(&body, scope, source)
            }

            ScopeKind::Method => {
                if let Some(name) = node.child_by_field_name("name") {
                    // computed keys evaluate outside the method
                    if name.kind() == "computed_property_name" {
                        self.visit(&name, parent, source)?;
                    }
                }
                let parameters = node
                    .child_by_field_name("parameters")
                    .ok_or_else(|| structural(node, "method without parameter list"))?;
                self.declare_pattern(&parameters, scope, source)?;
                let body = node
                    .child_by_field_name("body")
                    .ok_or_else(|| structural(node, "method without body"))?;
                self.collect(&body, scope, source)
            }

            ScopeKind::Arrow => {
                if let Some(parameter) = node.child_by_field_name("parameter") {
                    self.declare_pattern(&parameter, scope, source)?;
                } else if let Some(parameters) = node.child_by_field_name("parameters") {
                    self.declare_pattern(&parameters, scope, source)?;
                }
                let body = node
                    .child_by_field_name("body")
                    .ok_or_else(|| structural(node, "arrow function without body"))?;
                self.visit(&body, scope, source)
            }

            ScopeKind::Class => {
                if let Some(name) = node.child_by_field_name("name") {
                    let target = if node.kind() == "class_declaration" {
                        parent
                    } else {
                        scope
                    };
                    self.declare(target, &name, name.byte_range(), false, source)?;
                }
                let body = node
                    .child_by_field_name("body")
                    .ok_or_else(|| structural(node, "class without body"))?;
                self.collect(&body, scope, source)
            }
        }
    }

    fn declare_declarator(
        &mut self,
        declarator: &Node,
        scope: ScopeId,
        source: &str,
    ) -> Result<(), AnalysisError> {
        let name = declarator
            .child_by_field_name("name")
            .ok_or_else(|| structural(declarator, "declarator without a name"))?;
        if name.kind() == "identifier" {
            // only a plain declarator name is trackable, and only
            // outside export statements
            let exported = declarator
                .parent()
                .and_then(|declaration| declaration.parent())
                .map_or(false, |wrapper| wrapper.kind() == "export_statement");
            self.declare(scope, &name, declarator.byte_range(), !exported, source)?;
        } else {
            self.declare_pattern(&name, scope, source)?;
        }
        if let Some(value) = declarator.child_by_field_name("value") {
            self.visit(&value, scope, source)?;
        }
        Ok(())
    }

    /// Bind every name a declaration pattern introduces. Destructured
    /// names and parameters participate in shadowing but are never
    /// trackable.
    fn declare_pattern(
        &mut self,
        node: &Node,
        scope: ScopeId,
        source: &str,
    ) -> Result<(), AnalysisError> {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                self.declare(scope, node, node.byte_range(), false, source)
            }

            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.declare_pattern(&left, scope, source)?;
                }
                // default values are ordinary expressions
                if let Some(right) = node.child_by_field_name("right") {
                    self.visit(&right, scope, source)?;
                }
                Ok(())
            }

            "pair_pattern" => {
                if let Some(key) = node.child_by_field_name("key") {
                    if key.kind() == "computed_property_name" {
                        self.visit(&key, scope, source)?;
                    }
                }
                if let Some(value) = node.child_by_field_name("value") {
                    self.declare_pattern(&value, scope, source)?;
                }
                Ok(())
            }

            "object_pattern" | "array_pattern" | "rest_pattern" | "formal_parameters" => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                for child in children {
                    self.declare_pattern(&child, scope, source)?;
                }
                Ok(())
            }

            _ => Ok(()),
        }
    }

    /// `import` locals bind in the module scope; the imported names
    /// stay foreign.
    fn declare_imports(
        &mut self,
        statement: &Node,
        scope: ScopeId,
        source: &str,
    ) -> Result<(), AnalysisError> {
        let mut cursor = statement.walk();
        let clauses: Vec<Node> = statement
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "import_clause")
            .collect();
        for clause in clauses {
            let mut clause_cursor = clause.walk();
            let imports: Vec<Node> = clause.named_children(&mut clause_cursor).collect();
            for import in imports {
                match import.kind() {
                    "identifier" => {
                        self.declare(scope, &import, import.byte_range(), false, source)?;
                    }
                    "namespace_import" => {
                        let mut ns_cursor = import.walk();
                        let name = import
                            .named_children(&mut ns_cursor)
                            .find(|child| child.kind() == "identifier");
                        if let Some(name) = name {
                            self.declare(scope, &name, name.byte_range(), false, source)?;
                        }
                    }
                    "named_imports" => {
                        let mut ni_cursor = import.walk();
                        let specifiers: Vec<Node> = import
                            .named_children(&mut ni_cursor)
                            .filter(|child| child.kind() == "import_specifier")
                            .collect();
                        for specifier in specifiers {
                            let local = specifier
                                .child_by_field_name("alias")
                                .or_else(|| specifier.child_by_field_name("name"));
                            if let Some(local) = local {
                                self.declare(scope, &local, local.byte_range(), false, source)?;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Record a declared name in `scope`. Redeclaring a name merges with
    /// the existing binding.
    fn declare(
        &mut self,
        scope: ScopeId,
        ident: &Node,
        decl_range: Range<usize>,
        trackable: bool,
        source: &str,
    ) -> Result<(), AnalysisError> {
        let name = ident
            .utf8_text(source.as_bytes())
            .map_err(|_| structural(ident, "identifier is not valid UTF-8"))?
            .to_string();
        self.declaring_idents.insert(ident.id());
        let existing = self.scopes[scope]
            .bindings
            .iter()
            .copied()
            .find(|&id| self.bindings[id].name == name);
        match existing {
            Some(id) => self.bindings[id].redeclare(ident.byte_range(), trackable),
            None => {
                let id = self.bindings.len();
                self.bindings.push(Binding::new(
                    name,
                    scope,
                    ident.byte_range(),
                    decl_range,
                    trackable,
                ));
                self.scopes[scope].bindings.push(id);
            }
        }
        Ok(())
    }
}
