//! manindex: build and query the object index of an HTML reference manual.
//!
//! The index is loaded from the snapshot file when one exists, otherwise
//! every configured root is scanned and the snapshot is written:
//!
//! - `manindex --manual doc/Manual --packages doc/packages build`
//! - `manindex find 'append/_'`
//! - `manindex summary lists:append/3`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use manindex::config::IndexConfig;
use manindex::model::{Class, DocObject, IndexRecord};
use manindex::store::{IndexStore, ManIndex, ObjectPattern};
use manindex::{driver, parse_identifier, TracingDiagnostics};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "manindex",
    about = "Index HTML reference manuals by documented predicate, function and section"
)]
struct Cli {
    /// Root of the core manual pages
    #[arg(long, env = "MANINDEX_MANUAL")]
    manual: Option<PathBuf>,

    /// Root of the package documentation pages
    #[arg(long, env = "MANINDEX_PACKAGES")]
    packages: Option<PathBuf>,

    /// Root of any other pages
    #[arg(long, env = "MANINDEX_MISC")]
    misc: Option<PathBuf>,

    /// Snapshot file
    #[arg(long, env = "MANINDEX_DB", default_value = manindex::config::DEFAULT_SNAPSHOT)]
    index: PathBuf,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the snapshot or scan the roots, then report the record count
    Build,
    /// Delete the snapshot and scan the roots again
    Rebuild,
    /// List records matching a pattern such as `append/_` or `_:member/2`
    Find { pattern: String },
    /// Print the summary of one object or section id
    Summary { object: String },
    /// Report section ids used more than once
    CheckIds,
    /// Write the index in snapshot format to stdout
    Dump,
    /// Index a single page and print its records, without touching the snapshot
    File {
        html: PathBuf,
        #[arg(long, default_value = "manual")]
        class: Class,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli);
    let index = ManIndex::new(config, Arc::new(TracingDiagnostics));
    let mut out = BufWriter::new(io::stdout().lock());

    let status = match &cli.command {
        Command::Build => {
            let store = index.load_or_build();
            writeln!(out, "{} records", store.len())?;
            ExitCode::SUCCESS
        }
        Command::Rebuild => {
            let store = index.rebuild();
            writeln!(out, "{} records", store.len())?;
            ExitCode::SUCCESS
        }
        Command::Find { pattern } => {
            let pattern = ObjectPattern::parse(pattern)
                .with_context(|| format!("invalid pattern: {}", pattern))?;
            let store = index.load_or_build();
            let mut found = false;
            for record in store.find(&pattern) {
                write_record(&mut out, record)?;
                found = true;
            }
            exit_status(found)
        }
        Command::Summary { object } => {
            let store = index.load_or_build();
            match summary_of(&store, object) {
                Some(summary) => {
                    writeln!(out, "{}", summary)?;
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("manindex: {} is not documented", object);
                    ExitCode::FAILURE
                }
            }
        }
        Command::CheckIds => {
            let duplicates = index.check_duplicate_section_ids();
            for id in &duplicates {
                writeln!(out, "{}", id)?;
            }
            exit_status(duplicates.is_empty())
        }
        Command::Dump => {
            let store = index.load_or_build();
            store
                .write_snapshot(&mut out)
                .context("failed to write snapshot to stdout")?;
            ExitCode::SUCCESS
        }
        Command::File { html, class } => {
            if !html.is_file() {
                bail!("no such file: {}", html.display());
            }
            let html = std::path::absolute(html)
                .with_context(|| format!("cannot resolve {}", html.display()))?;
            let records = driver::index_file(
                &html,
                *class,
                &index.config().roots,
                &TracingDiagnostics,
            );
            for record in &records {
                write_record(&mut out, record)?;
            }
            ExitCode::SUCCESS
        }
    };

    out.flush().context("failed to flush stdout")?;
    Ok(status)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> IndexConfig {
    let roots = [
        (Class::Manual, &cli.manual),
        (Class::Packages, &cli.packages),
        (Class::Misc, &cli.misc),
    ];
    roots
        .into_iter()
        .filter_map(|(class, dir)| dir.as_ref().map(|dir| (class, dir)))
        .fold(
            IndexConfig::default().with_snapshot(&cli.index),
            |config, (class, dir)| config.with_root(class, dir),
        )
}

/// Exact identifiers first, then section ids such as `sec:lists`.
fn summary_of<'a>(store: &'a IndexStore, text: &str) -> Option<&'a str> {
    if let Ok(object) = parse_identifier(text) {
        if let Some(summary) = store.summary(&object) {
            return Some(summary);
        }
    }
    let pattern = ObjectPattern::Section {
        level: None,
        number: None,
        label: Some(text.to_string()),
        file: None,
    };
    let found = store
        .find(&pattern)
        .next()
        .map(|record| record.summary.as_str());
    found
}

fn write_record(out: &mut impl Write, record: &IndexRecord) -> Result<()> {
    let object = match &record.object {
        DocObject::Section { label, .. } => label.clone(),
        other => other.to_string(),
    };
    writeln!(
        out,
        "{}\t{}:{}\t{}",
        object,
        record.file.display(),
        record.offset,
        record.summary
    )?;
    Ok(())
}

fn exit_status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
