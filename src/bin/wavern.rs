#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "Real-time WaveNet amp-model inference", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a WAV file through a .nam model with the real-time engine
    #[command(name = "process-rt")]
    ProcessRt {
        /// Input WAV file (mono, 48 kHz, 24-bit PCM)
        #[arg(long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(long)]
        output: PathBuf,

        /// Model-data file (.nam)
        #[arg(long)]
        model: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::ProcessRt {
            input,
            output,
            model,
        } => wavern::processing::process_wav_file(model, input, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
