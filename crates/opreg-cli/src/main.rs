mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_PACKAGE_ERROR};
use opreg_manifest::ManifestOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "opreg",
    version,
    about = "Materialize operator packages into operator-registry manifest trees"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the manifest tree of a package below a registry directory.
    Create {
        /// Path to the package YAML file.
        package: PathBuf,
        /// Directory the package directory is created in. Must already exist.
        #[arg(long, default_value = ".")]
        registry_dir: PathBuf,
        /// Skip fsync of written files and directories.
        #[arg(long, default_value_t = false)]
        no_sync: bool,
    },
    /// Remove the manifest tree of a package.
    Delete {
        /// Package identifier (name of the package directory).
        package_id: String,
        /// Directory holding the package directory.
        #[arg(long, default_value = ".")]
        registry_dir: PathBuf,
    },
    /// Load a manifest tree and show its package and bundles.
    Inspect {
        /// Path to the package directory (`<registry-dir>/<package-id>`).
        manifest_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("OPREG_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Create {
            package,
            registry_dir,
            no_sync,
        } => commands::create::run(
            &package,
            &registry_dir,
            ManifestOptions { durable: !no_sync },
            json_output,
        ),
        Commands::Delete {
            package_id,
            registry_dir,
        } => commands::delete::run(&registry_dir, &package_id, json_output),
        Commands::Inspect { manifest_dir } => commands::inspect::run(&manifest_dir, json_output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("package error:") {
                EXIT_PACKAGE_ERROR
            } else if msg.starts_with("manifest error:") {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
