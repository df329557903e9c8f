//! hpxml2hescore CLI: translate an HPXML document into Home Energy Score inputs.
//!
//! Usage:
//!   hpxml2hescore house.json --tables lookups/ [-o out.json] [--scrubbed-hpxml scrubbed.json]

use clap::Parser;
use hescore_hpxml::{scrub, AssemblyTables, Document, TranslateError, TranslateOptions, Translator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hpxml2hescore",
    version,
    about = "Convert an HPXML building description into Home Energy Score inputs"
)]
struct Cli {
    /// HPXML document (JSON, or YAML with a .yaml/.yml extension)
    input: PathBuf,
    /// Write the translation here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Building to translate when the document has more than one
    #[arg(long)]
    bldgid: Option<String>,
    /// Project to use when the document has more than one
    #[arg(long)]
    projectid: Option<String>,
    /// Contractor to use when the document has more than one
    #[arg(long)]
    contractorid: Option<String>,
    /// Also write a copy of the input with personal information removed
    #[arg(long, value_name = "PATH")]
    scrubbed_hpxml: Option<PathBuf>,
    /// Assembly lookup tables: a directory of CSV files or a JSON/YAML bundle
    #[arg(long, env = "HESCORE_TABLES")]
    tables: PathBuf,
    /// Log resolution decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Recognized translation failures exit 1, anything else 2.
fn exit_code(err: &TranslateError) -> i32 {
    if err.is_translation_error() {
        1
    } else {
        2
    }
}

fn report(err: &TranslateError) -> i32 {
    eprintln!("Error: {}", err);
    exit_code(err)
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), TranslateError> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

fn cmd_scrub(document: &Document, path: &Path) -> i32 {
    match scrub(document).and_then(|copy| write_json(path, &copy)) {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

fn cmd_translate(cli: &Cli) -> i32 {
    let document = match Document::load(&cli.input) {
        Ok(document) => document,
        Err(e) => {
            // nothing to scrub, don't leave a stale copy behind
            if let Some(path) = &cli.scrubbed_hpxml {
                if path.exists() {
                    let _ = std::fs::remove_file(path);
                }
            }
            return report(&e);
        }
    };

    if let Some(path) = &cli.scrubbed_hpxml {
        let code = cmd_scrub(&document, path);
        if code != 0 {
            return code;
        }
    }

    let tables = match AssemblyTables::load(&cli.tables) {
        Ok(tables) => tables,
        Err(e) => return report(&e),
    };

    let mut options = TranslateOptions::new();
    options.building_id = cli.bldgid.clone();
    options.project_id = cli.projectid.clone();
    options.contractor_id = cli.contractorid.clone();

    let inputs = match Translator::new(tables).translate(&document, &options) {
        Ok(inputs) => inputs,
        Err(e) => return report(&e),
    };

    let written = match &cli.output {
        Some(path) => write_json(path, &inputs),
        None => serde_json::to_string_pretty(&inputs)
            .map(|text| println!("{}", text))
            .map_err(TranslateError::from),
    };
    match written {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let code = cmd_translate(&cli);
    std::process::exit(code);
}
