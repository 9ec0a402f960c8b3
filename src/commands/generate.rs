use std::path::Path;

use colored::Colorize;

use super::{read_notes, runtime};
use cardsmith::config::{ClusterMode, Config};
use cardsmith::error::Result;
use cardsmith::pipeline::{CardPipeline, GenerationReport};

pub struct GenerateArgs<'a> {
    pub user: &'a str,
    pub deck: &'a str,
    pub file: Option<&'a Path>,
    pub provider: Option<&'a str>,
    pub cluster_mode: ClusterMode,
    pub chunk_size: usize,
    pub overlap: usize,
    pub json: bool,
}

pub fn cmd_generate(args: GenerateArgs<'_>) -> Result<()> {
    let text = read_notes(args.file)?;
    if text.trim().is_empty() {
        println!("{} No text to generate cards from.", "Note:".yellow());
        return Ok(());
    }

    let mut config = Config::load(args.provider)?;
    config.pipeline.cluster_mode = args.cluster_mode;
    config.pipeline.chunk_size_words = args.chunk_size;
    config.pipeline.overlap_words = args.overlap;

    let pipeline = CardPipeline::from_config(&config);

    if !args.json {
        println!(
            "{} cards for deck {} with {} ({})...",
            "Generating".green().bold(),
            args.deck.cyan(),
            config.llm.provider.display_name(),
            config.llm.model
        );
    }

    let report = runtime()?.block_on(pipeline.generate(args.user, args.deck, &text))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    println!(
        "  Chunks:      {} ({} failed)",
        report.chunks, report.failed_chunks
    );
    println!("  Candidates:  {}", report.candidates);
    println!(
        "  Duplicates:  {} already in deck",
        report.duplicates_of_existing
    );
    println!(
        "  Clusters:    {} ({} merged, {} fell back)",
        report.clusters, report.merged_clusters, report.merge_fallbacks
    );
    if report.backfilled + report.backfill_failures > 0 {
        println!(
            "  Backfilled:  {} existing cards ({} failed)",
            report.backfilled, report.backfill_failures
        );
    }
    if report.merged_duplicates + report.unembedded_dropped > 0 {
        println!(
            "  Skipped:     {} merged duplicates, {} without embedding",
            report.merged_duplicates, report.unembedded_dropped
        );
    }

    println!(
        "{} {} cards created.",
        "Done!".green().bold(),
        report.created.len()
    );
    for card in &report.created {
        println!("  {} {}", "•".cyan(), card.front());
        println!("    {}", card.back().dimmed());
    }
}
