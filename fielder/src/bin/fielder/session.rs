use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use fielder::diagnostics::LocatedDiagnostic;
use fielder::{FielderConfig, InsertionPolicy, Injector, Severity, SourceHost};
use serde::Serialize;
use walkdir::WalkDir;

use crate::output::{GlobalOptions, TableDisplay};
use crate::theme::THEME;

/// Working directory plus the configuration that applies to it.
pub struct Session {
    pub root: PathBuf,
    pub config: FielderConfig,
    pub config_path: Option<PathBuf>,
}

impl Session {
    /// Load `explicit` if given, otherwise discover `fielder.toml` from the
    /// current directory.
    pub fn open(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let (config_path, config) = match explicit {
            Some(path) => {
                let config = FielderConfig::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                (Some(path.to_path_buf()), config)
            }
            None => match FielderConfig::discover(&cwd)? {
                Some((path, config)) => (Some(path), config),
                None => (None, FielderConfig::default()),
            },
        };
        // Scan paths in a config file are relative to that file.
        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        Ok(Self {
            root,
            config,
            config_path,
        })
    }

    pub fn policy(&self, requested: Option<InsertionPolicy>) -> InsertionPolicy {
        requested.unwrap_or(self.config.fielder.insertion)
    }

    /// Rust files under `paths`, or under the configured scan paths when none
    /// are given.
    pub fn collect_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let roots: Vec<PathBuf> = if paths.is_empty() {
            self.config.paths.scan.iter().map(|path| self.root.join(path)).collect()
        } else {
            paths.to_vec()
        };

        let mut files = Vec::new();
        for root in roots {
            if !root.exists() {
                anyhow::bail!("Path does not exist: {}", root.display());
            }
            for entry in WalkDir::new(&root).follow_links(true).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "rs") {
                    continue;
                }
                let relative = path.strip_prefix(&root).unwrap_or(path);
                let hidden = relative
                    .components()
                    .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
                if hidden || self.config.is_excluded(relative) {
                    continue;
                }
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Inject every file and collect per-file outcomes. Nothing is written.
    pub fn run(&self, files: &[PathBuf], policy: InsertionPolicy) -> Result<Vec<FileOutcome>> {
        let injector = Injector::new(SourceHost::Cli).policy(policy);
        let mut outcomes = Vec::with_capacity(files.len());

        for path in files {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let injected = injector.inject_source(&source, path)?;
            let round = &injected.round;

            let fields = round
                .summary
                .injected
                .iter()
                .filter_map(|injection| {
                    let owner = round.tree.type_decl(injection.target).ok()?;
                    let field = round.tree.field(injection.field)?;
                    Some(InjectedField {
                        type_name: owner.name.clone(),
                        field: field.name.clone(),
                        ty: field.ty.clone(),
                    })
                })
                .collect();

            outcomes.push(FileOutcome {
                report: FileReport {
                    path: display_path(path, &self.root),
                    injected: fields,
                    diagnostics: round.located(),
                },
                rendered: round.annotated().then(|| injected.render()),
                source_path: path.clone(),
            });
        }

        Ok(outcomes)
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

pub struct FileOutcome {
    pub report: FileReport,
    /// New source text; `None` when the file carried no annotations.
    pub rendered: Option<String>,
    pub source_path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InjectedField {
    #[serde(rename = "type")]
    pub type_name: String,
    pub field: String,
    pub ty: String,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub injected: Vec<InjectedField>,
    pub diagnostics: Vec<LocatedDiagnostic>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub errors: usize,
    pub warnings: usize,
}

impl RunReport {
    pub fn new(files: Vec<FileReport>) -> Self {
        let count = |severity: Severity| -> usize {
            files
                .iter()
                .flat_map(|file| &file.diagnostics)
                .filter(|located| located.diagnostic.severity == severity)
                .count()
        };
        let errors = count(Severity::Error);
        let warnings = count(Severity::Warning);
        Self {
            files,
            errors,
            warnings,
        }
    }

    pub fn injected(&self) -> usize {
        self.files.iter().map(|file| file.injected.len()).sum()
    }

    pub fn failed(&self, deny_warnings: bool) -> bool {
        self.errors > 0 || (deny_warnings && self.warnings > 0)
    }

    fn rows(&self) -> impl Iterator<Item = (&str, &LocatedDiagnostic)> {
        self.files
            .iter()
            .flat_map(|file| file.diagnostics.iter().map(move |located| (file.path.as_str(), located)))
    }
}

fn position(path: &str, located: &LocatedDiagnostic) -> String {
    match located.location {
        Some(location) => format!("{path}:{}:{}", location.line, location.column),
        None => path.to_string(),
    }
}

impl TableDisplay for RunReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        if !options.no_color {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        } else {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        }
        table.set_header(vec!["Location", "Subject", "Level", "Message"]);

        for (path, located) in self.rows() {
            let level = Cell::new(located.diagnostic.severity);
            let level = if options.no_color {
                level
            } else {
                level.fg(THEME.table_color(located.diagnostic.severity))
            };
            table.add_row(vec![
                Cell::new(position(path, located)),
                Cell::new(located.subject.as_deref().unwrap_or("-")),
                level,
                Cell::new(&located.diagnostic.message),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let mut lines: Vec<String> = self
            .rows()
            .map(|(path, located)| format!("{}: {}", position(path, located), located.diagnostic))
            .collect();
        lines.push(format!(
            "{} files, {} injected, {} errors, {} warnings",
            self.files.len(),
            self.injected(),
            self.errors,
            self.warnings
        ));
        lines.join("\n")
    }
}
