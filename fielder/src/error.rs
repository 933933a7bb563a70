use std::path::PathBuf;

use thiserror::Error;

use crate::modifiers::Modifiers;
use crate::tree::NodeId;
use crate::types::TypeToken;

/// Top-level error type returned by the fielder library.
#[derive(Debug, Error)]
pub enum FielderError {
    /// A source unit could not be parsed as Rust.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// Reading or writing a source unit failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `fielder.toml` could not be read.
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Misuse of the syntax arena.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} is not a type declaration")]
    NotAType(NodeId),

    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),
}

/// Invalid modifier input read from an annotation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModifierError {
    #[error("unknown modifier bits {unknown:#x} in {bits:#x}")]
    UnknownBits { bits: u64, unknown: u64 },

    #[error("more than one visibility requested ({0})")]
    ConflictingVisibility(Modifiers),

    #[error("unknown modifier keyword `{0}`")]
    UnknownKeyword(String),
}

/// Invalid field specification read from an annotation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("field name must not be empty")]
    EmptyName,

    #[error("`{0}` is not a valid field identifier")]
    InvalidIdentifier(String),
}

/// Failure to turn a pending type reference into a concrete named type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("type `{0}` is not a type path")]
    NotAPath(TypeToken),

    #[error("type `{0}` has generic arguments and is not a concrete named type")]
    NotConcrete(TypeToken),

    #[error("cannot find type `{0}` in this scope")]
    Unknown(TypeToken),
}

/// Failure while building a member node.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("cannot synthesize field `{field}`: {source}")]
    Unresolved {
        field: String,
        #[source]
        source: ResolveError,
    },
}

/// The host cannot hand out tree-mutation capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("fielder requires a host that exposes its syntax tree; `{host}` is not supported")]
    Unsupported { host: String },
}
