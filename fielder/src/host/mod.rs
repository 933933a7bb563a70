//! Rust source host: runs injection rounds over `syn` syntax trees.
//!
//! This module connects the engine to real Rust code:
//! - Lower items into the arena and read annotations ([`lower`], [`attrs`])
//! - Run one round through the coordinator
//! - Write injected fields back and pretty-print the result ([`emit`])

pub mod attrs;
pub mod emit;
pub mod lower;

use std::collections::HashMap;
use std::path::Path;

use once_cell::unsync::OnceCell;
use proc_macro2::Span;

use crate::coordinator::{Coordinator, InsertionPolicy, RoundSummary};
use crate::diagnostics::{Diagnostic, Diagnostics, LocatedDiagnostic, Reporter, Severity};
use crate::environment::{CapabilityProvider, HostEnvironment, TreeCapability, default_providers, probe};
use crate::error::{EnvironmentError, FielderError};
use crate::tree::{NodeId, SyntaxTree};

/// Runs rounds on behalf of one host environment.
///
/// The environment is probed once, on the first round; later rounds reuse
/// the outcome.
pub struct Injector {
    env: Box<dyn HostEnvironment>,
    providers: Vec<Box<dyn CapabilityProvider>>,
    policy: InsertionPolicy,
    capability: OnceCell<Result<TreeCapability, EnvironmentError>>,
}

impl Injector {
    pub fn new(env: impl HostEnvironment + 'static) -> Self {
        Self {
            env: Box::new(env),
            providers: default_providers(),
            policy: InsertionPolicy::default(),
            capability: OnceCell::new(),
        }
    }

    pub fn policy(mut self, policy: InsertionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the capability provider chain.
    pub fn providers(mut self, providers: Vec<Box<dyn CapabilityProvider>>) -> Self {
        self.providers = providers;
        self.capability = OnceCell::new();
        self
    }

    fn coordinator(&self) -> Result<Coordinator, EnvironmentError> {
        self.capability
            .get_or_init(|| probe(self.env.as_ref(), &self.providers))
            .clone()
            .map(|capability| Coordinator::new(capability).with_policy(self.policy))
    }

    /// Parse `source` and run one round over it.
    pub fn inject_source(&self, source: &str, path: &Path) -> Result<Injected, FielderError> {
        let file = syn::parse_file(source).map_err(|source| FielderError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.inject_file(file))
    }

    /// Run one round over every item of `file`.
    pub fn inject_file(&self, mut file: syn::File) -> Injected {
        let round = self.inject_items(&mut file.items);
        Injected { file, round }
    }

    /// Run one round in place over an item list, e.g. the content of an
    /// inline module.
    ///
    /// Annotations are always stripped from the items. Fields are only
    /// injected when the environment grants tree access; otherwise a single
    /// error is reported.
    pub fn inject_items(&self, items: &mut [syn::Item]) -> Round {
        let mut unit = lower::lower(items);
        let mut diagnostics = Diagnostics::new();

        let summary = match self.coordinator() {
            Ok(coordinator) => {
                let mut reporter = Reporter::new(&mut diagnostics);
                for (node, err) in &unit.annotation_errors {
                    reporter.error(*node, err);
                }
                coordinator.process(&mut unit.tree, &unit.batch, &unit.types, &mut diagnostics)
            }
            Err(err) => {
                Reporter::new(&mut diagnostics).report(Severity::Error, None, &err);
                RoundSummary {
                    injected: Vec::new(),
                    skipped: unit.batch.iter().map(|target| target.specs.len()).sum(),
                }
            }
        };
        let annotations = emit::emit(items, &unit, &summary);

        Round {
            tree: std::mem::take(&mut unit.tree),
            summary,
            diagnostics,
            spans: std::mem::take(&mut unit.spans),
            annotations,
        }
    }
}

/// Everything one round produced besides the rewritten items.
#[derive(Debug)]
pub struct Round {
    pub tree: SyntaxTree,
    pub summary: RoundSummary,
    pub diagnostics: Diagnostics,
    spans: HashMap<NodeId, Span>,
    annotations: usize,
}

impl Round {
    /// Source span of a lowered node; synthesized nodes have none.
    pub fn span(&self, node: NodeId) -> Option<Span> {
        self.spans.get(&node).copied()
    }

    /// Whether fielder annotations were stripped. Annotated sources only
    /// compile in their rendered form, injected or not.
    pub fn annotated(&self) -> bool {
        self.annotations > 0
    }

    pub fn located(&self) -> Vec<LocatedDiagnostic> {
        self.diagnostics
            .iter()
            .cloned()
            .map(|diagnostic| LocatedDiagnostic::locate(diagnostic, &self.tree))
            .collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.count(severity)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Field names of the first type called `name`, in member order.
    pub fn field_names(&self, name: &str) -> Vec<String> {
        self.tree
            .types()
            .find(|(_, decl)| decl.name == name)
            .map(|(node, _)| self.tree.fields(node).map(|(_, field)| field.name.clone()).collect())
            .unwrap_or_default()
    }
}

/// A rewritten source file and its round.
#[derive(Debug)]
pub struct Injected {
    pub file: syn::File,
    pub round: Round,
}

impl Injected {
    /// Pretty-printed source after injection.
    pub fn render(&self) -> String {
        prettyplease::unparse(&self.file)
    }
}
