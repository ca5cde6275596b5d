use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use tutorbot::config::Config;

#[derive(Parser)]
#[command(name = "tutorbot", version, about = "An AI tutor assistant API powered by OpenRouter")]
struct Cli {
    /// Path to a YAML config file (defaults to ~/.tutorbot/config.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Number of runtime worker threads
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Ask a question from the command line without starting the server
    Ask(AskArgs),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the configuration as YAML with secrets redacted
    Show,
}

#[derive(Args)]
struct AskArgs {
    #[arg(long, default_value = "cli")]
    student_id: String,

    #[arg(long, help = commands::ask_cmd::subject_help())]
    subject: String,

    #[arg(long, default_value = "beginner")]
    level: String,

    question: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_unvalidated(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            workers,
        } => {
            config.apply_serve_overrides(host, port, workers);
            config.validate()?;

            tutorbot::utils::logging::init(&config);
            commands::serve_cmd::execute(config)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                config.validate()?;
                commands::config_cmd::show_config(&config)
            }
        },
        Commands::Ask(args) => {
            config.validate()?;
            tutorbot::utils::logging::init(&config);
            commands::ask_cmd::execute(
                config,
                args.student_id,
                args.subject,
                args.level,
                args.question,
            )
        }
    }
}
