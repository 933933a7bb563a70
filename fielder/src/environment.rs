//! Capability probe run once per session.
//!
//! Injection needs write access to the host's syntax tree. Some hosts hand it
//! out directly; others sit behind wrapper layers (editor integrations,
//! sandboxes) that have to be peeled first. A chain of
//! [`CapabilityProvider`]s is tried in order and the first one that yields a
//! [`TreeCapability`] wins. If none does, the environment is unsupported and
//! the round must not inject anything.

use crate::error::EnvironmentError;

/// Something that drives a round of processing.
pub trait HostEnvironment {
    fn name(&self) -> &str;

    /// Whether this layer itself exposes a mutable syntax tree.
    fn exposes_tree(&self) -> bool;

    /// The environment this one wraps, if it is a wrapper layer.
    fn inner(&self) -> Option<&dyn HostEnvironment> {
        None
    }
}

/// Proof that the session may mutate the tree. Only providers create it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeCapability {
    host: String,
    via: &'static str,
}

impl TreeCapability {
    fn grant(host: &str, via: &'static str) -> Self {
        Self {
            host: host.to_string(),
            via,
        }
    }

    /// Name of the environment layer that granted access.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Name of the provider that acquired it.
    pub fn via(&self) -> &'static str {
        self.via
    }
}

pub trait CapabilityProvider {
    fn name(&self) -> &'static str;
    fn acquire(&self, env: &dyn HostEnvironment) -> Option<TreeCapability>;
}

/// Accepts environments that expose their tree without any wrapping.
pub struct Direct;

impl CapabilityProvider for Direct {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn acquire(&self, env: &dyn HostEnvironment) -> Option<TreeCapability> {
        env.exposes_tree().then(|| TreeCapability::grant(env.name(), self.name()))
    }
}

/// Peels up to `max_depth` wrapper layers looking for a tree-bearing host.
pub struct Unwrapping {
    pub max_depth: usize,
}

impl Default for Unwrapping {
    fn default() -> Self {
        Self { max_depth: 4 }
    }
}

impl CapabilityProvider for Unwrapping {
    fn name(&self) -> &'static str {
        "unwrapping"
    }

    fn acquire(&self, env: &dyn HostEnvironment) -> Option<TreeCapability> {
        let mut current = env.inner();
        for _ in 0..self.max_depth {
            let layer = current?;
            if layer.exposes_tree() {
                log::debug!("unwrapped `{}` to reach `{}`", env.name(), layer.name());
                return Some(TreeCapability::grant(layer.name(), self.name()));
            }
            current = layer.inner();
        }
        None
    }
}

/// Default provider chain: direct first, then wrapper adapters.
pub fn default_providers() -> Vec<Box<dyn CapabilityProvider>> {
    vec![Box::new(Direct), Box::new(Unwrapping::default())]
}

/// Run `providers` in order against `env`.
pub fn probe(
    env: &dyn HostEnvironment,
    providers: &[Box<dyn CapabilityProvider>],
) -> Result<TreeCapability, EnvironmentError> {
    providers
        .iter()
        .find_map(|provider| provider.acquire(env))
        .ok_or_else(|| EnvironmentError::Unsupported {
            host: env.name().to_string(),
        })
}

/// The hosts shipped with fielder: all of them own a `syn` tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHost {
    ProcMacro,
    BuildScript,
    Cli,
}

impl HostEnvironment for SourceHost {
    fn name(&self) -> &str {
        match self {
            SourceHost::ProcMacro => "proc-macro",
            SourceHost::BuildScript => "build-script",
            SourceHost::Cli => "cli",
        }
    }

    fn exposes_tree(&self) -> bool {
        true
    }
}

/// A wrapper layer that hides the environment it wraps.
pub struct Wrapped<E> {
    pub label: String,
    pub inner: E,
}

impl<E: HostEnvironment> HostEnvironment for Wrapped<E> {
    fn name(&self) -> &str {
        &self.label
    }

    fn exposes_tree(&self) -> bool {
        false
    }

    fn inner(&self) -> Option<&dyn HostEnvironment> {
        Some(&self.inner)
    }
}

/// An environment with no tree access at all.
pub struct Opaque(pub String);

impl HostEnvironment for Opaque {
    fn name(&self) -> &str {
        &self.0
    }

    fn exposes_tree(&self) -> bool {
        false
    }
}
