//! Eligibility rules for injecting a field into a type.

use crate::diagnostics::{Reporter, Severity};
use crate::tree::{DeclKind, NodeId, SyntaxTree};

/// Outcome of [`Validator::evaluate`] for one (target, field name) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    RejectedKindNotSupported { target: NodeId, kind: DeclKind },
    RejectedDuplicateField { target: NodeId, existing: NodeId, field: String },
    RejectedMissingNoArgConstructor { target: NodeId, field: String },
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }

    /// Severity of the diagnostic this verdict produces, if any.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Verdict::Eligible => None,
            Verdict::RejectedKindNotSupported { .. } | Verdict::RejectedDuplicateField { .. } => {
                Some(Severity::Warning)
            }
            Verdict::RejectedMissingNoArgConstructor { .. } => Some(Severity::Error),
        }
    }

    /// Emit the diagnostic for a rejection. Does nothing for `Eligible`.
    pub fn report(&self, tree: &SyntaxTree, reporter: &mut Reporter<'_>) {
        let type_name = |target: &NodeId| {
            tree.type_decl(*target)
                .map(|decl| decl.name.clone())
                .unwrap_or_default()
        };

        match self {
            Verdict::Eligible => {}
            Verdict::RejectedKindNotSupported { target, kind } => reporter.warning(
                *target,
                format_args!(
                    "injection is only supported on structs with named fields; no effect on {kind} `{}`",
                    type_name(target)
                ),
            ),
            Verdict::RejectedDuplicateField { existing, field, .. } => reporter.warning(
                *existing,
                format_args!("field `{field}` already exists; no new field is generated"),
            ),
            Verdict::RejectedMissingNoArgConstructor { target, field } => reporter.error(
                *target,
                format_args!(
                    "`{}` needs a zero-argument constructor (`fn new() -> Self`, `Default`, or \
                     `#[derive(Default)]`) before field `{field}` can be injected",
                    type_name(target)
                ),
            ),
        }
    }
}

/// Decides whether a field may be injected. Never mutates the tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, tree: &SyntaxTree, target: NodeId, field_name: &str) -> Verdict {
        let Ok(decl) = tree.type_decl(target) else {
            // Not a type node at all; treat like any other non-struct item.
            return Verdict::RejectedKindNotSupported {
                target,
                kind: DeclKind::UnitStruct,
            };
        };

        if !decl.kind.is_class() {
            return Verdict::RejectedKindNotSupported { target, kind: decl.kind };
        }

        if let Some((existing, _)) = tree.fields(target).find(|(_, field)| field.name == field_name) {
            return Verdict::RejectedDuplicateField {
                target,
                existing,
                field: field_name.to_string(),
            };
        }

        if !tree.constructors(target).any(|(_, ctor)| ctor.params == 0) {
            return Verdict::RejectedMissingNoArgConstructor {
                target,
                field: field_name.to_string(),
            };
        }

        log::debug!("`{field_name}` is eligible for `{}`", decl.name);
        Verdict::Eligible
    }
}
