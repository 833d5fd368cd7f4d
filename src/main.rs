//! blotool - Command-line tool for console UI layout (BLO) files.
//!
//! This is the main entry point for the blotool command-line application.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blotool_blo::ScreenBlo;

/// blotool - convert console UI layout (BLO) files to and from JSON
#[derive(Parser)]
#[command(name = "blotool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a BLO file to a JSON document
    Decode {
        /// Input BLO file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encode a JSON document back to a BLO file
    Encode {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output BLO file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the element hierarchy of a BLO file
    Tree {
        /// Input BLO file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the materials of a BLO file and the elements using them
    Materials {
        /// Input BLO file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { input, output } => decode(input, output),
        Commands::Encode { input, output } => encode(input, output),
        Commands::Tree { input } => tree(input),
        Commands::Materials { input } => materials(input),
    }
}

fn decode(input: PathBuf, output: PathBuf) -> Result<()> {
    let screen = ScreenBlo::from_file(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let doc = blotool_blo::json::to_json(&screen);
    let text = serde_json::to_string_pretty(&doc)?;
    fs::write(&output, text)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Decoded {} -> {}", input.display(), output.display());
    Ok(())
}

fn encode(input: PathBuf, output: PathBuf) -> Result<()> {
    let text = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let doc: serde_json::Value =
        serde_json::from_str(&text).context("input is not valid JSON")?;
    let screen = blotool_blo::json::from_json(&doc)
        .with_context(|| format!("{} is not a valid layout document", input.display()))?;
    screen
        .write_to_file(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Encoded {} -> {}", input.display(), output.display());
    Ok(())
}

fn tree(input: PathBuf) -> Result<()> {
    let screen = ScreenBlo::from_file(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    print!("{}", screen.hierarchy());
    Ok(())
}

fn materials(input: PathBuf) -> Result<()> {
    let screen = ScreenBlo::from_file(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    for material in &screen.arena.materials.materials {
        let users = screen.elements_using_material(&material.name);
        if users.is_empty() {
            println!("{} (unused)", material.name);
        } else {
            println!("{} <- {}", material.name, users.join(", "));
        }
    }
    Ok(())
}
