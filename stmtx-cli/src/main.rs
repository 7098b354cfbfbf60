use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use stmtx_core::SourceType;
use stmtx_ingest::{BatchLoader, BatchResult, SourceDocument};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod inspect;
mod state;

use export::ExportFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STMTX_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "stmtx", version = VERSION, about = "Bank statement table extraction")]
struct Cli {
    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    /// Config file (default: ~/.stmtx/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load statements and export the merged transactions
    Load {
        /// Checking-account statements, in upload order
        #[arg(long, num_args = 1..)]
        checking: Vec<PathBuf>,

        /// Credit-card statements, loaded after the checking ones
        #[arg(long = "credit-card", num_args = 1..)]
        credit_card: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format (default: from config, else csv)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Keep exact duplicate rows
        #[arg(long, default_value_t = false)]
        keep_duplicates: bool,
    },

    /// Show tables, header maps and layout decisions for one statement
    Inspect {
        file: PathBuf,

        /// checking | credit-card
        #[arg(long, default_value = "checking", value_parser = parse_source_type)]
        source_type: SourceType,
    },

    /// Manage ~/.stmtx/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

fn parse_source_type(s: &str) -> std::result::Result<SourceType, String> {
    SourceType::from_key(s).ok_or_else(|| format!("unknown source type: {s} (checking | credit-card)"))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Load {
            checking,
            credit_card,
            out,
            format,
            keep_duplicates,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let format = format.unwrap_or(cfg.export.format);
            let mut parse = cfg.parse;
            if keep_duplicates {
                parse.deduplicate = false;
            }
            load(checking, credit_card, out, format, parse)?;
        }

        Command::Inspect { file, source_type } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let bytes = state::read_statement(&file)?;
            inspect::run_inspect(&bytes, &state::display_name(&file), source_type, &cfg.parse)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config(cli.config.as_deref())?;
                config::show_config(&cfg)?;
            }
        },
    }

    Ok(())
}

fn load(
    checking: Vec<PathBuf>,
    credit_card: Vec<PathBuf>,
    out: Option<PathBuf>,
    format: ExportFormat,
    parse: stmtx_core::ParseConfig,
) -> Result<()> {
    if checking.is_empty() && credit_card.is_empty() {
        bail!("no statements given (pass --checking <file>... and/or --credit-card <file>...)");
    }

    let tagged: Vec<(PathBuf, SourceType)> = checking
        .into_iter()
        .map(|p| (p, SourceType::Checking))
        .chain(credit_card.into_iter().map(|p| (p, SourceType::CreditCard)))
        .collect();
    for (path, _) in &tagged {
        if !path.is_file() {
            bail!("statement not found: {}", path.display());
        }
    }

    info!(documents = tagged.len(), "load: starting batch");
    let mut read_error = None;
    let result = BatchLoader::auto(parse).load_batch(statement_documents(&tagged, &mut read_error));
    if let Some(e) = read_error {
        return Err(e);
    }

    match &out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut w = BufWriter::new(file);
            export::write_result(&result, format, &mut w)?;
            w.flush().with_context(|| format!("write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut w = stdout.lock();
            export::write_result(&result, format, &mut w)?;
            if format == ExportFormat::Json {
                writeln!(w)?;
            }
        }
    }

    print_report(&result, out.as_ref());

    if result.loaded_count() == 0 {
        bail!("no statement could be loaded");
    }
    Ok(())
}

/// Documents read from disk one at a time, as the batch asks for them. A
/// read failure ends the sequence and is left in `read_error`.
fn statement_documents<'a>(
    tagged: &'a [(PathBuf, SourceType)],
    read_error: &'a mut Option<anyhow::Error>,
) -> impl Iterator<Item = SourceDocument> + 'a {
    tagged.iter().map_while(move |(path, source_type)| match state::read_statement(path) {
        Ok(bytes) => Some(SourceDocument::new(state::display_name(path), bytes, *source_type)),
        Err(e) => {
            *read_error = Some(e);
            None
        }
    })
}

/// Summary and per-document detail. Goes to stderr so stdout can carry the
/// export.
fn print_report(result: &BatchResult, out: Option<&PathBuf>) {
    eprintln!("{}", result.summary_line());
    for d in &result.documents {
        eprintln!(
            "  ok   {} ({}): {} row(s), {} degraded, {}/{} page(s) without a table",
            d.document,
            d.source_type.key(),
            d.records,
            d.degraded,
            d.pages_without_table,
            d.pages
        );
    }
    for f in &result.failures {
        eprintln!("  FAIL {} [{}]: {}", f.document, f.kind.label(), f.reason);
    }
    if let Some(path) = out {
        eprintln!("Wrote {} record(s) to {}", result.records.len(), path.display());
    }
}
