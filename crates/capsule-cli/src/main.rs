use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use capsule_puzzle::{CancellationToken, PuzzleConfig, PuzzleEngine, PuzzleSolver};
use capsule_types::Capsule;
use clap::{Parser, Subcommand};
use tracing::info;

mod prompt;

use prompt::{Prompt, StdinPrompt};

#[derive(Parser)]
#[command(name = "capsule", about = "Create and solve crypto time capsules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seal a secret message behind a chosen number of minutes
    Create {
        /// Secret message; prompted for when omitted
        #[arg(long)]
        message: Option<String>,
        /// Lock duration in minutes; prompted for when omitted
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        minutes: Option<u64>,
        /// Where to write the puzzle record
        #[arg(long, default_value = "output.txt")]
        output: PathBuf,
        /// Re-solve the fresh capsule as a self-test (costs the full duration)
        #[arg(long)]
        verify: bool,
    },
    /// Recover the secret from a puzzle record
    Solve {
        /// Puzzle record file
        #[arg(default_value = "output.txt")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Create {
            message,
            minutes,
            output,
            verify,
        } => create(message, minutes, &output, verify, &mut StdinPrompt),
        Command::Solve { file } => solve(&file),
    }
}

fn create(
    message: Option<String>,
    minutes: Option<u64>,
    output: &Path,
    verify: bool,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    println!("Creating time capsule...");

    let message = match message {
        Some(message) => message,
        None => prompt.read_line("Input secret message: ")?,
    };
    let minutes = match minutes {
        Some(minutes) => minutes,
        None => prompt
            .read_line("Input amount of minutes: ")?
            .trim()
            .parse()
            .context("minutes must be a positive integer")?,
    };
    if minutes == 0 {
        bail!("minutes must be at least 1");
    }

    let secret = encode_message(&message)?;

    let mut engine = PuzzleEngine::new(PuzzleConfig::default());
    let capsule = engine.create(&secret, minutes)?;

    fs::write(output, capsule.to_record_text())
        .with_context(|| format!("writing {}", output.display()))?;
    println!("File \"{}\" created.", output.display());

    if verify {
        println!("Testing puzzle...");
        let payload = PuzzleSolver::new(&capsule).solve()?;
        println!("Test result: {}", decode_payload(&payload));
    }

    println!("Successfully created puzzle!");
    Ok(())
}

fn solve(file: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let capsule = Capsule::parse_record(&text)?;
    info!(t = %capsule.squarings(), "solving puzzle");

    let token = CancellationToken::new();
    let mut last_percent = 0u64;
    let payload = PuzzleSolver::new(&capsule).solve_with_progress(&token, |done, total| {
        let percent = done * 100 / total.max(1);
        if percent >= last_percent + 5 {
            last_percent = percent;
            info!(percent, "squaring progress");
        }
    })?;

    println!("{}", decode_payload(&payload));
    Ok(())
}

/// One byte per character; anything above U+00FF cannot ride in a record.
fn encode_message(message: &str) -> Result<Vec<u8>> {
    message
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                anyhow!("unsupported character {c:?}: the record carries 8 bits per character")
            })
        })
        .collect()
}

fn decode_payload(payload: &[u8]) -> String {
    payload.iter().map(|&b| char::from(b)).collect()
}
