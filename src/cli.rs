//! Minimal CLI: load catalog → (plan | rust)
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;

use crate::catalog::DeclaredCatalog;
use crate::codegen;
use crate::emit;
use crate::markers::MarkerCatalog;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// analyze a declared-type catalog and output either the mapping plan or the
/// generated Rust mapping fragments
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the compiled mapping plan (specs, correspondence, carriers, steps) as JSON
    Plan(PlanOut),
    /// emit the Rust mapping fragments for a host build to merge
    Rust(RustOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more catalog JSON files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct PlanOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RustOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Load every input file into one merged catalog.
    fn load_catalog(&self) -> anyhow::Result<DeclaredCatalog> {
        let mut catalog = DeclaredCatalog::new();
        for path in resolve_file_path_patterns(&self.input)? {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
            let part = DeclaredCatalog::from_json_str(&source)
                .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
            catalog.extend(part);
        }
        Ok(catalog)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Plan(target) => {
                let catalog = target.input_settings.load_catalog()?;
                let artifacts = emit::build_artifacts(&catalog, MarkerCatalog::standard())
                    .map_err(build_error_to_anyhow)?;
                let plan = serde_json::to_string_pretty(&artifacts)?;
                write_output(target.out.as_deref(), &plan)
            }
            Command::Rust(target) => {
                let catalog = target.input_settings.load_catalog()?;
                let artifacts = emit::build_artifacts(&catalog, MarkerCatalog::standard())
                    .map_err(build_error_to_anyhow)?;
                // Fragments are independent per marked type; render in
                // parallel, collect in declaration order.
                let fragments: Vec<String> =
                    artifacts.par_iter().map(codegen::render_fragment).collect();
                write_output(target.out.as_deref(), &fragments.join("\n"))
            }
        }
    }
}

fn build_error_to_anyhow(err: crate::diag::BuildError) -> anyhow::Error {
    match err.location() {
        Some(loc) => anyhow::anyhow!("{loc}: {err}"),
        None => anyhow::anyhow!("{err}"),
    }
}

fn write_output(out: Option<&std::path::Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, text)?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::<PathBuf>::new();
    for pattern in patterns {
        let is_glob = pattern.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'));
        if !is_glob {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            anyhow::bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
