//! Drives one injection round over a batch of annotated types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticSink, Reporter};
use crate::environment::{CapabilityProvider, HostEnvironment, TreeCapability, probe};
use crate::error::EnvironmentError;
use crate::spec::FieldSpec;
use crate::synthesizer::Synthesizer;
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use crate::types::TypeResolver;
use crate::validator::Validator;

/// Where a synthesized field lands in the member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertionPolicy {
    /// Always insert at the head. The last processed spec ends up first.
    #[default]
    Prepend,
    /// Insert after fields synthesized earlier in the round, before the
    /// original members, so synthesized fields keep declaration order.
    DeclarationOrder,
}

impl FromStr for InsertionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepend" => Ok(InsertionPolicy::Prepend),
            "declaration-order" => Ok(InsertionPolicy::DeclarationOrder),
            other => Err(format!(
                "unknown insertion policy `{other}` (expected `prepend` or `declaration-order`)"
            )),
        }
    }
}

impl fmt::Display for InsertionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InsertionPolicy::Prepend => "prepend",
            InsertionPolicy::DeclarationOrder => "declaration-order",
        })
    }
}

/// One annotated type and its field requests, in declaration order.
#[derive(Debug, Clone)]
pub struct Target {
    pub node: NodeId,
    pub specs: Vec<FieldSpec>,
}

impl Target {
    pub fn new(node: NodeId, specs: Vec<FieldSpec>) -> Self {
        Self { node, specs }
    }
}

/// A field the coordinator committed to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Injection {
    pub target: NodeId,
    pub field: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub injected: Vec<Injection>,
    pub skipped: usize,
}

impl RoundSummary {
    pub fn injected_into(&self, target: NodeId) -> impl Iterator<Item = NodeId> {
        self.injected
            .iter()
            .filter(move |injection| injection.target == target)
            .map(|injection| injection.field)
    }
}

/// Validates, synthesizes and splices fields. Holds no tree reference
/// between rounds.
pub struct Coordinator {
    capability: TreeCapability,
    policy: InsertionPolicy,
    validator: Validator,
}

impl Coordinator {
    pub fn new(capability: TreeCapability) -> Self {
        Self {
            capability,
            policy: InsertionPolicy::default(),
            validator: Validator::new(),
        }
    }

    /// Probe `env` through `providers`; fails when no provider grants tree access.
    pub fn for_environment(
        env: &dyn HostEnvironment,
        providers: &[Box<dyn CapabilityProvider>],
    ) -> Result<Self, EnvironmentError> {
        probe(env, providers).map(Self::new)
    }

    pub fn with_policy(mut self, policy: InsertionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process every spec of every target. Failures are reported and never
    /// stop other specs; each insertion is committed immediately.
    pub fn process(
        &self,
        tree: &mut SyntaxTree,
        batch: &[Target],
        resolver: &dyn TypeResolver,
        sink: &mut dyn DiagnosticSink,
    ) -> RoundSummary {
        let synthesizer = Synthesizer::new(resolver);
        let mut reporter = Reporter::new(sink);
        let mut summary = RoundSummary::default();
        log::debug!(
            "round over {} target(s) on `{}` via {} ({})",
            batch.len(),
            self.capability.host(),
            self.capability.via(),
            self.policy
        );

        for target in batch {
            let mut inserted_here = 0;

            for spec in &target.specs {
                let verdict = self.validator.evaluate(tree, target.node, spec.name());
                if !verdict.is_eligible() {
                    log::debug!("skipping `{}`: {verdict:?}", spec.name());
                    verdict.report(tree, &mut reporter);
                    summary.skipped += 1;
                    continue;
                }

                let field = match synthesizer.synthesize(spec) {
                    Ok(field) => field,
                    Err(err) => {
                        reporter.error(target.node, &err);
                        summary.skipped += 1;
                        continue;
                    }
                };

                let index = match self.policy {
                    InsertionPolicy::Prepend => 0,
                    InsertionPolicy::DeclarationOrder => inserted_here,
                };
                let field_name = field.name.clone();
                let field_node = match tree.insert_member(target.node, index, NodeKind::Field(field)) {
                    Ok(node) => node,
                    Err(err) => {
                        reporter.error(target.node, &err);
                        summary.skipped += 1;
                        continue;
                    }
                };
                inserted_here += 1;

                let type_name = tree
                    .type_decl(target.node)
                    .map(|decl| decl.name.clone())
                    .unwrap_or_default();
                reporter.note(
                    target.node,
                    format_args!("adding field `{field_name}` to `{type_name}`"),
                );
                summary.injected.push(Injection {
                    target: target.node,
                    field: field_node,
                });
            }
        }

        summary
    }
}
