//! Leveled diagnostics attached to tree nodes.

use std::fmt;

use serde::Serialize;

use crate::tree::{Location, NodeId, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Node the message is attached to; `None` for round-level failures.
    pub node: Option<NodeId>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, node: Option<NodeId>) -> Self {
        Self {
            severity,
            message: message.into(),
            node,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Append-only destination for diagnostics.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collecting sink, used by every host in this crate.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticSink for Diagnostics {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Formats messages and forwards them to a sink, mirroring each one to the
/// `log` facade.
pub struct Reporter<'s> {
    sink: &'s mut dyn DiagnosticSink,
}

impl<'s> Reporter<'s> {
    pub fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    pub fn note(&mut self, node: NodeId, message: impl fmt::Display) {
        self.report(Severity::Note, Some(node), message);
    }

    pub fn warning(&mut self, node: NodeId, message: impl fmt::Display) {
        self.report(Severity::Warning, Some(node), message);
    }

    pub fn error(&mut self, node: NodeId, message: impl fmt::Display) {
        self.report(Severity::Error, Some(node), message);
    }

    pub fn report(&mut self, severity: Severity, node: Option<NodeId>, message: impl fmt::Display) {
        let message = format!("fielder: {message}");
        match severity {
            Severity::Note => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
        self.sink.emit(Diagnostic::new(severity, message, node));
    }
}

/// A diagnostic paired with the location of its node.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedDiagnostic {
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
    pub subject: Option<String>,
    pub location: Option<Location>,
}

impl LocatedDiagnostic {
    pub fn locate(diagnostic: Diagnostic, tree: &SyntaxTree) -> Self {
        let subject = diagnostic.node.map(|node| tree.label(node));
        let location = diagnostic.node.and_then(|node| tree.location(node));
        Self {
            diagnostic,
            subject,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DeclKind;

    #[test]
    fn test_reporter_prefixes_and_counts() {
        let mut tree = SyntaxTree::new();
        let car = tree.add_type("Car", DeclKind::Class);
        let mut sink = Diagnostics::new();

        let mut reporter = Reporter::new(&mut sink);
        reporter.note(car, "adding field `model`");
        reporter.warning(car, "careful");
        reporter.error(car, "broken");

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count(Severity::Warning), 1);
        assert!(sink.has_errors());
        let first = sink.iter().next().unwrap();
        assert_eq!(first.message, "fielder: adding field `model`");
        assert_eq!(first.node, Some(car));
    }

    #[test]
    fn test_locate_uses_tree_labels() {
        let mut tree = SyntaxTree::new();
        let car = tree.add_type("Car", DeclKind::Class);
        tree.set_location(car, Location { line: 3, column: 12 }).unwrap();

        let located = LocatedDiagnostic::locate(Diagnostic::new(Severity::Error, "x", Some(car)), &tree);
        assert_eq!(located.subject.as_deref(), Some("struct `Car`"));
        assert_eq!(located.location, Some(Location { line: 3, column: 12 }));
    }
}
