//! Build-script driver for fielder.
//!
//! Scans source files for `#[fielder(...)]` and `#[add_fields(...)]`
//! annotations, injects the requested fields and writes the rewritten
//! sources below `OUT_DIR`, mirroring the scanned layout.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     fielder_build::inject_fields()
//!         .scan_path("src/models")
//!         .run()
//!         .expect("field injection failed");
//! }
//! ```
//!
//! And where the models are used:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/fielder/car.rs"));
//! ```

mod injector;
mod scanner;

pub use fielder::InsertionPolicy;
pub use injector::{BuildReport, FieldInjector};

/// Create a new field injector with default settings.
pub fn inject_fields() -> FieldInjector {
    FieldInjector::new()
}
