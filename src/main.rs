mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::delta::DeltaArgs;

#[derive(Parser)]
#[command(
    name = "trainscript",
    version,
    about = "Generate model-training scripts from declarative task plans"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `TRAINSCRIPT_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a training script from a plan file
    Generate {
        /// Plan file (.json)
        input: PathBuf,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Annotate imports and task bodies with comments
        #[arg(long)]
        debug_comments: bool,
    },
    /// Validate a plan without generating
    Check {
        /// Plan file (.json)
        input: PathBuf,
    },
    /// Print the code that rebuilds one model into another
    Delta(DeltaArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            input,
            output,
            debug_comments,
        } => cli::generate::cmd_generate(input, output, debug_comments),
        Command::Check { input } => cli::check::cmd_check(input),
        Command::Delta(args) => cli::delta::cmd_delta(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("TRAINSCRIPT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("trainscript={}", default)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
