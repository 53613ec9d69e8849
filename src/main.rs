// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::process;

use anyhow::{Context, Result};

use terratone::config::PieceFile;
use terratone::data::{load_all_data, normalize, preprocess, subsample_rows};
use terratone::midi::MidiSink;

fn print_usage() {
    println!("terratone - Climate Data Sonification");
    println!();
    println!("Usage: terratone [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --render <CONFIG> <OUTPUT>  Render a piece to a MIDI file");
    println!("  --show-rows <CONFIG>        Print the normalized feature rows");
    println!("  --help                      Show this help message");
}

fn load_rows(config_path: &str) -> Result<(PieceFile, Vec<terratone::engine::FeatureRow>)> {
    let file = PieceFile::load(config_path)?;
    let piece = &file.piece;

    let mut table = load_all_data(&piece.data_dir)
        .with_context(|| format!("loading climate data from {}", piece.data_dir))?;
    preprocess(&mut table, piece.preprocess_options());
    let rows = normalize(&table, piece.normalize_options());

    let beats_per_bar = 4.0;
    let seconds_per_bar = beats_per_bar * 60.0 / piece.tempo;
    let rows = subsample_rows(rows, piece.target_duration_secs, seconds_per_bar);

    Ok((file, rows))
}

fn render(config_path: &str, output_path: &str) -> Result<()> {
    let (file, rows) = load_rows(config_path)?;
    let piece = &file.piece;

    println!("Rendering '{}' from {} rows...", piece.name, rows.len());

    let score = terratone::compose(&rows, piece.engine_config(), piece.seed)?;
    println!(
        "Composed {} notes across {} tracks ({:.1}s)",
        score.note_count(),
        score.tracks.len(),
        score.duration
    );

    MidiSink::new().write(&score, piece.tempo, output_path)?;
    println!("Wrote {output_path}");
    Ok(())
}

fn show_rows(config_path: &str) -> Result<()> {
    let (_, rows) = load_rows(config_path)?;

    println!("year  temp_n  co2_n   ice_n   extreme_n");
    for row in rows {
        println!(
            "{}  {:.4}  {:.4}  {:.4}  {:.4}",
            row.year, row.temp_n, row.co2_n, row.ice_n, row.extreme_n
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terratone=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("terratone - Climate Data Sonification");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--render" => {
            if args.len() < 4 {
                eprintln!("Error: --render requires a config file and an output path");
                process::exit(1);
            }
            render(&args[2], &args[3])?;
        }
        "--show-rows" => {
            if args.len() < 3 {
                eprintln!("Error: --show-rows requires a config file");
                process::exit(1);
            }
            show_rows(&args[2])?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}
