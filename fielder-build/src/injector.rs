//! Builder that runs injection over a source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fielder::diagnostics::LocatedDiagnostic;
use fielder::{InsertionPolicy, Injector, Severity, SourceHost};

use crate::scanner::scan_directory;

/// Builder for configuring and running field injection from `build.rs`.
pub struct FieldInjector {
    scan_paths: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    insertion: InsertionPolicy,
    deny_warnings: bool,
}

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub files: usize,
    /// Files whose output changed on disk.
    pub written: usize,
    pub injected: usize,
    pub warnings: usize,
}

impl FieldInjector {
    /// Create an injector with default settings.
    pub fn new() -> Self {
        Self {
            scan_paths: Vec::new(),
            output_dir: None,
            insertion: InsertionPolicy::default(),
            deny_warnings: false,
        }
    }

    /// Add a directory to scan.
    ///
    /// Can be called multiple times. Defaults to `src/` when never called.
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_paths.push(path.into());
        self
    }

    /// Set where rewritten sources go.
    ///
    /// Default: `$OUT_DIR/fielder`
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set where synthesized fields land among existing ones.
    pub fn insertion(mut self, policy: InsertionPolicy) -> Self {
        self.insertion = policy;
        self
    }

    /// Fail the build on warnings as well as errors.
    pub fn deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    /// Run injection.
    ///
    /// Every scanned file is mirrored into the output directory, rewritten
    /// when it received fields. Files are only written when their content
    /// changed. Warnings are forwarded as `cargo:warning` lines; any error
    /// diagnostic fails the run after all files were processed.
    pub fn run(self) -> Result<BuildReport> {
        let scan_paths = if self.scan_paths.is_empty() {
            vec![PathBuf::from("src/")]
        } else {
            self.scan_paths
        };
        let output_dir = match self.output_dir {
            Some(dir) => dir,
            None => {
                let out_dir = std::env::var_os("OUT_DIR")
                    .context("OUT_DIR is not set; call output_dir() outside build scripts")?;
                PathBuf::from(out_dir).join("fielder")
            }
        };

        let injector = Injector::new(SourceHost::BuildScript).policy(self.insertion);
        let mut report = BuildReport::default();
        let mut errors = Vec::new();

        for scan_path in &scan_paths {
            let files = scan_directory(scan_path).with_context(|| format!("Failed to scan {}", scan_path.display()))?;

            for file in files {
                let source = fs::read_to_string(&file.path)
                    .with_context(|| format!("Failed to read {}", file.path.display()))?;
                let injected = injector.inject_source(&source, &file.path)?;
                let round = &injected.round;

                for located in round.located() {
                    let line = format_diagnostic(&file.path, &located);
                    match located.diagnostic.severity {
                        Severity::Error => errors.push(line),
                        Severity::Warning => {
                            report.warnings += 1;
                            println!("cargo:warning={line}");
                        }
                        Severity::Note => {}
                    }
                }

                let output = if round.annotated() {
                    injected.render()
                } else {
                    source
                };
                if write_if_changed(&output_dir.join(&file.relative), &output)? {
                    report.written += 1;
                }
                report.files += 1;
                report.injected += round.summary.injected.len();
            }

            println!("cargo:rerun-if-changed={}", scan_path.display());
        }

        if !errors.is_empty() {
            anyhow::bail!("field injection failed:\n{}", errors.join("\n"));
        }
        if self.deny_warnings && report.warnings > 0 {
            anyhow::bail!("field injection produced {} warning(s)", report.warnings);
        }

        eprintln!(
            "fielder-build: injected {} field(s) into {} file(s) under {}",
            report.injected,
            report.files,
            output_dir.display()
        );
        Ok(report)
    }
}

impl Default for FieldInjector {
    fn default() -> Self {
        Self::new()
    }
}

fn format_diagnostic(path: &Path, located: &LocatedDiagnostic) -> String {
    match located.location {
        Some(location) => format!(
            "{}:{}:{}: {}",
            path.display(),
            location.line,
            location.column,
            located.diagnostic.message
        ),
        None => format!("{}: {}", path.display(), located.diagnostic.message),
    }
}

/// Write `content` to `path` unless it already holds exactly that.
fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    // Only write if content has changed (avoids unnecessary recompilation)
    if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
