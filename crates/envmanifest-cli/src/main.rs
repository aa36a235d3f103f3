mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "envmanifest",
    version,
    about = "Parse, lint, and format conda environment manifests"
)]
struct Cli {
    /// Lint configuration file (TOML). Defaults to ~/.config/envmanifest/lint.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

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
    /// Parse a manifest and report lint warnings.
    Check {
        /// Path to the environment manifest.
        #[arg(default_value = "environment.yml")]
        manifest: PathBuf,
        /// Exit non-zero when any warning is reported.
        #[arg(long, default_value_t = false)]
        deny_warnings: bool,
    },
    /// Rewrite a manifest in canonical form.
    Fmt {
        /// Path to the environment manifest.
        #[arg(default_value = "environment.yml")]
        manifest: PathBuf,
        /// Only report whether the file is canonical; write nothing.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Show the parsed contents of a manifest.
    Inspect {
        /// Path to the environment manifest.
        #[arg(default_value = "environment.yml")]
        manifest: PathBuf,
    },
    /// Print the deterministic fingerprint of a manifest.
    Id {
        /// Path to the environment manifest.
        #[arg(default_value = "environment.yml")]
        manifest: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

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
            tracing_subscriber::EnvFilter::try_from_env("ENVMANIFEST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Check {
            manifest,
            deny_warnings,
        } => commands::check::run(&manifest, config, deny_warnings, json_output),
        Commands::Fmt { manifest, check } => commands::fmt::run(&manifest, check, json_output),
        Commands::Inspect { manifest } => commands::inspect::run(&manifest, json_output),
        Commands::Id { manifest } => commands::id::run(&manifest, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:")
                || msg.starts_with("failed to read manifest")
            {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
