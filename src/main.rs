//
// SPDX-License-Identifier: BSD-3-Clause
//

use clap::Parser;
use schema_compiler::batch;
use schema_compiler::batch::BatchOptions;
use schema_compiler::fetch::FetchedSchemas;
use schema_compiler::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Schema compiler CLI.
#[derive(Parser, Debug)]
#[command(name = "generate-schemas")]
#[command(about = "Redfish/Swordfish JSON Schema compiler", long_about = None)]
struct Cli {
    /// Generate a single schema object by name instead of the whole
    /// bundle.
    #[arg(short, long)]
    object: Option<String>,

    /// Comma-separated local schema directories. When absent the
    /// upstream bundles are cloned.
    #[arg(short, long, value_delimiter = ',')]
    local: Vec<PathBuf>,

    /// Output directory root.
    #[arg(short = 'd', long, default_value = ".")]
    output_dir: PathBuf,

    /// Process schemas one at a time.
    #[arg(long)]
    sequential: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // The clone directory must outlive the run.
    let fetched;
    let schema_dirs = if cli.local.is_empty() {
        fetched = FetchedSchemas::fetch()?;
        fetched.schema_dirs()
    } else {
        cli.local
    };

    let options = BatchOptions {
        schema_dirs,
        output_dir: cli.output_dir,
        sequential: cli.sequential,
    };

    match cli.object {
        Some(name) => batch::run_single(&name, &options),
        None => {
            let summary = batch::run(&options)?;
            if summary.failed > 0 {
                eprintln!(
                    "{} of {} schemas failed",
                    summary.failed,
                    summary.generated + summary.skipped + summary.failed
                );
            }
            Ok(())
        }
    }
}
