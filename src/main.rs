use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use script_expander::cli::commands::InputPaths;
use script_expander::cli::commands::expand::ExpandOptions;

#[derive(Parser)]
#[command(name = "script-expander")]
#[command(
    version,
    about = "Expand under-length scripts by generating only what is missing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args)]
struct InputArgs {
    #[arg(long, short, help = "Script to expand (plain text)")]
    document: PathBuf,
    #[arg(long, short, help = "Required content points (.json/.yaml)")]
    points: PathBuf,
    #[arg(long, short, help = "Target word count")]
    target_words: usize,
    #[arg(long, help = "Chunk descriptor (.json/.yaml)")]
    chunk: Option<PathBuf>,
}

impl InputArgs {
    fn into_paths(self, references: Option<PathBuf>) -> InputPaths {
        InputPaths {
            document: self.document,
            points: self.points,
            target_words: self.target_words,
            chunk: self.chunk,
            references,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a script toward its word target
    Expand {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, short, help = "Reference context (.json/.yaml)")]
        references: Option<PathBuf>,
        #[arg(long, short, help = "Write result here instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "LLM provider (openai, ollama, claude-code)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long = "dry-run", help = "Show analysis and prompt only, don't call the provider")]
        dry_run: bool,
    },

    /// Show the gap analysis for a script
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mscript-expander encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // Logs go to stderr; stdout carries the document
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Expand {
            input,
            references,
            output,
            provider,
            model,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(script_expander::cli::commands::expand::run(ExpandOptions {
                inputs: input.into_paths(references),
                output,
                provider,
                model,
                dry_run,
            }))?;
        }
        Commands::Analyze { input, format } => {
            script_expander::cli::commands::analyze::run(&input.into_paths(None), &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                script_expander::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                script_expander::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                script_expander::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
