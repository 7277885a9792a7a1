use anyhow::Context;
use clap::{Parser, Subcommand};
use dict_compose::registry::Registry;
use dict_compose::{
    Config, DictFlags, LookupResult, OpenMode, TableRegistry, TableSummary, logging,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "dictq")]
#[command(about = "Query composite lookup tables", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration with table aliases and default flags.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up keys; exits 1 if a key is missing, 2 on a lookup error.
    Query {
        /// Fold keys to lower case.
        #[arg(long)]
        fold_case: bool,

        /// Log every lookup.
        #[arg(long)]
        debug: bool,

        spec: String,

        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Open a table and print its composition.
    Check {
        #[arg(long)]
        json: bool,

        spec: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("dictq: {}", report(&err));
            ExitCode::from(2)
        }
    }
}

// Open errors already carry their causes in the message, so only the first
// cause below the context is printed.
fn report(err: &anyhow::Error) -> String {
    err.chain()
        .take(2)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

fn run(cli: Cli) -> dict_compose::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    logging::init(cli.verbose, config.log.as_deref())?;

    let registry = TableRegistry::builder()
        .aliases(config.tables.clone())
        .build();
    debug!(?registry, "registry ready");

    match cli.cmd {
        Commands::Query {
            fold_case,
            debug: log_lookups,
            spec,
            keys,
        } => {
            let mut flags = config.dict_flags();
            flags.set(DictFlags::FOLD_FIX, fold_case || config.fold_case);
            flags.set(DictFlags::DEBUG, log_lookups || config.debug);

            let spec = config.resolve_spec(&spec);
            let table = registry
                .open(&spec, OpenMode::ReadOnly, flags)
                .with_context(|| format!("open {spec}"))?;

            let mut code = ExitCode::SUCCESS;
            for key in &keys {
                match table.lookup(key) {
                    LookupResult::Found(value) => println!("{key}\t{value}"),
                    LookupResult::NotFound => {
                        debug!(key, "not found");
                        code = ExitCode::from(1);
                    }
                    LookupResult::Error(err) => {
                        eprintln!("dictq: {spec}: lookup {key:?} failed: {err}");
                        code = ExitCode::from(2);
                        break;
                    }
                }
            }

            registry.close(table);
            Ok(code)
        }
        Commands::Check { json, spec } => {
            let spec = config.resolve_spec(&spec);
            let table = registry
                .open(&spec, OpenMode::ReadOnly, config.dict_flags())
                .with_context(|| format!("open {spec}"))?;

            let summary = TableSummary::from_table(table.as_ref());
            registry.close(table);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary.render_text());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
