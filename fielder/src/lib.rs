//! fielder core library.
//!
//! Injects annotation-requested fields into struct declarations before the
//! rest of compilation sees them. The engine works on an arena syntax tree:
//! a [`validator::Validator`] decides eligibility, a
//! [`synthesizer::Synthesizer`] builds the field node, and the
//! [`coordinator::Coordinator`] splices it in and reports what happened.
//! [`host`] lowers real Rust sources into that tree and writes the result
//! back.

pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod host;
pub mod modifiers;
pub mod spec;
pub mod synthesizer;
pub mod tree;
pub mod types;
pub mod validator;

pub use config::FielderConfig;
pub use coordinator::{Coordinator, InsertionPolicy, RoundSummary, Target};
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity};
pub use environment::{HostEnvironment, Opaque, SourceHost, Wrapped};
pub use error::*;
pub use host::{Injected, Injector, Round};
pub use modifiers::Modifiers;
pub use spec::FieldSpec;
pub use tree::{NodeId, SyntaxTree};
pub use types::{TypeRef, TypeResolver, TypeTable};
