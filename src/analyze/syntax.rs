//! Python syntax trees via tree-sitter.
//!
//! tree-sitter recovers from more than the Python 3 grammar allows, so a
//! clean tree is also checked for Python 2 statements and inconsistent
//! indentation before it is accepted.
//!
//! Cyclomatic complexity is calculated over the whole file as:
//! - Start at 1
//! - Add 1 for each: if, elif, for (incl. async for), while, except, except*
//! - Add 1 for each chain of the same boolean operator (`a and b and c` is one)

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, QueryError, Tree};

use super::AnalyzeError;

/// Tree-sitter query for counting complexity branch points.
const COMPLEXITY_QUERY: &str = r#"
(if_statement) @branch
(elif_clause) @branch
(for_statement) @branch
(while_statement) @branch
(except_clause) @branch
(except_group_clause) @branch
(boolean_operator) @boolean
"#;

/// Parser and complexity calculator for Python sources.
pub struct PythonSyntax {
    language: Language,
    complexity_query: Result<Query, QueryError>,
}

impl Default for PythonSyntax {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonSyntax {
    pub fn new() -> Self {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let complexity_query = Query::new(&language, COMPLEXITY_QUERY);
        Self {
            language,
            complexity_query,
        }
    }

    fn create_parser(&self) -> Result<Parser, AnalyzeError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AnalyzeError::Grammar(e.to_string()))?;
        Ok(parser)
    }

    /// Parse source code, failing with the first syntax error in the tree.
    pub fn parse(&self, source: &str) -> Result<Tree, AnalyzeError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| AnalyzeError::Grammar("parser produced no tree".to_string()))?;

        let root = tree.root_node();
        let error = if root.has_error() {
            Some(first_syntax_error(root).unwrap_or_else(|| (1, "invalid syntax".to_string())))
        } else {
            first_rejected_construct(root)
        };

        if let Some((line, message)) = error {
            return Err(AnalyzeError::Parse { line, message });
        }

        Ok(tree)
    }

    /// Cyclomatic complexity of a parsed file.
    pub fn complexity(&self, tree: &Tree, source: &str) -> Result<u32, AnalyzeError> {
        let query = self
            .complexity_query
            .as_ref()
            .map_err(|e| AnalyzeError::Grammar(e.to_string()))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

        let mut complexity = 1; // Base complexity
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                if capture_name == "boolean" && continues_chain(capture.node) {
                    continue;
                }
                complexity += 1;
            }
        }

        Ok(complexity)
    }

    /// Parse and measure in one step.
    pub fn source_complexity(&self, source: &str) -> Result<u32, AnalyzeError> {
        let tree = self.parse(source)?;
        self.complexity(&tree, source)
    }
}

/// Locate the first ERROR or MISSING node in document order.
fn first_syntax_error(root: Node) -> Option<(usize, String)> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_missing() {
            return Some((
                node.start_position().row + 1,
                format!("expected '{}'", node.kind()),
            ));
        }
        if node.is_error() {
            return Some((node.start_position().row + 1, "invalid syntax".to_string()));
        }

        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Walk an error-free tree for constructs Python 3 rejects.
fn first_rejected_construct(root: Node) -> Option<(usize, String)> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let problem = match node.kind() {
            "print_statement" => Some((
                node.start_position().row + 1,
                "Missing parentheses in call to 'print'".to_string(),
            )),
            "exec_statement" => Some((
                node.start_position().row + 1,
                "Missing parentheses in call to 'exec'".to_string(),
            )),
            "module" | "block" => indentation_error(node),
            _ => None,
        };
        if problem.is_some() {
            return problem;
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Check that every statement starting a line in a module or block sits at
/// the same column, and that an indented block is deeper than its header.
fn indentation_error(node: Node) -> Option<(usize, String)> {
    let mut walker = node.walk();
    let statements: Vec<Node> = node
        .named_children(&mut walker)
        .filter(|child| child.kind() != "comment")
        .collect();

    let header = node.parent().filter(|_| node.kind() == "block");

    let Some(first) = statements.first() else {
        // Only a block can be empty, e.g. `def f():` followed by a dedent.
        return header.map(|h| {
            let row = node.start_position().row.max(h.start_position().row + 1);
            (row + 1, "expected an indented block".to_string())
        });
    };

    let expected = if node.kind() == "module" {
        0
    } else {
        first.start_position().column
    };

    if let Some(h) = header {
        let starts_own_line = first.start_position().row > h.start_position().row;
        if starts_own_line && expected <= h.start_position().column {
            return Some((
                first.start_position().row + 1,
                "expected an indented block".to_string(),
            ));
        }
    }

    let mut previous_end_row: Option<usize> = None;
    for statement in &statements {
        let start = statement.start_position();
        // Statements after `;` share a line and carry no indentation.
        let starts_line = previous_end_row.map_or(true, |row| start.row > row);
        if starts_line && start.column != expected {
            let message = if start.column > expected {
                "unexpected indent"
            } else {
                "unindent does not match any outer indentation level"
            };
            return Some((start.row + 1, message.to_string()));
        }
        previous_end_row = Some(statement.end_position().row);
    }

    None
}

/// A left operand that repeats its parent's operator is part of one chain.
fn continues_chain(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    parent.kind() == "boolean_operator"
        && parent.child_by_field_name("left") == Some(node)
        && operator_kind(parent) == operator_kind(node)
}

fn operator_kind(node: Node) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}
