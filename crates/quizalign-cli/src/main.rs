//! quizalign CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizalign",
    version,
    about = "Curriculum-aligned quiz generation for Italian schools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an aligned set of quiz items
    Generate {
        /// School subject (e.g. "Matematica")
        #[arg(long)]
        subject: String,

        /// Topic of the quiz
        #[arg(long)]
        topic: String,

        /// Class label (e.g. "2ª media")
        #[arg(long = "class")]
        class_label: String,

        /// Free-text description of the test
        #[arg(long)]
        description: Option<String>,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Number of items (3 to 10)
        #[arg(long, default_value = "5")]
        count: usize,

        /// Do not enforce the MCQ/TF/SHORT mix
        #[arg(long)]
        no_mix: bool,

        /// Return whatever was accepted instead of failing as misaligned
        #[arg(long)]
        lenient: bool,

        /// Generator to use (defaults to the configured default provider)
        #[arg(long)]
        provider: Option<String>,

        /// Output directory for the report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a JSON batch of items against a topic and class
    Validate {
        /// JSON file with a `questions` array
        #[arg(long)]
        items: PathBuf,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        topic: String,

        #[arg(long = "class")]
        class_label: String,

        #[arg(long)]
        description: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the keywords and class band a request resolves to
    Keywords {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        topic: String,

        #[arg(long = "class")]
        class_label: String,

        #[arg(long)]
        description: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and keyword bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizalign=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            subject,
            topic,
            class_label,
            description,
            difficulty,
            count,
            no_mix,
            lenient,
            provider,
            output,
            config,
        } => {
            commands::generate::execute(
                subject,
                topic,
                class_label,
                description,
                difficulty,
                count,
                !no_mix,
                !lenient,
                provider,
                output,
                config,
            )
            .await
        }
        Commands::Validate {
            items,
            subject,
            topic,
            class_label,
            description,
            config,
        } => commands::validate::execute(items, subject, topic, class_label, description, config),
        Commands::Keywords {
            subject,
            topic,
            class_label,
            description,
            config,
        } => commands::keywords::execute(subject, topic, class_label, description, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
