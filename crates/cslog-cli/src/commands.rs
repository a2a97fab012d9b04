use anyhow::Context;
use colored::Colorize;
use cslog_core::{LogFamily, LogMerger, MergeConfig, MergeReport, ParseMode};

use crate::cli::*;

pub fn build_config(cli: &Cli) -> MergeConfig {
    let mode = if cli.strict { ParseMode::Strict } else { ParseMode::Lenient };
    let config = MergeConfig::default()
        .with_parse_mode(mode)
        .with_dry_run(cli.dry_run);
    match &cli.home {
        Some(home) => config.with_home(home),
        None => config,
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let merger = LogMerger::new(build_config(&cli));
    let report = merger
        .merge_logs(&cli.root)
        .with_context(|| format!("failed to merge logs under {}*", cli.root.display()))?;

    match cli.format {
        OutputFormat::Text => print_text(&merger, &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_text(merger: &LogMerger, report: &MergeReport) {
    for merged in &report.merged {
        println!(
            "{:<4} {}  {}",
            merged.family.to_string().cyan(),
            merged.line.bold(),
            merged.source.display().to_string().dimmed()
        );
    }

    let verb = if merger.config().dry_run { "Would merge" } else { "Merged" };
    println!(
        "{} {} {} line(s) from {} director{}",
        "✓".green().bold(),
        verb,
        report.merged.len().to_string().bold(),
        report.directories,
        if report.directories == 1 { "y" } else { "ies" },
    );
    for family in LogFamily::ALL {
        let count = report.merged_count(family);
        if count == 0 {
            continue;
        }
        let path = merger.outputs().for_family(family).path();
        println!("  {}: {} → {}", family.to_string().cyan(), count, path.display());
    }

    if !report.is_clean() {
        println!("{} Skipped {} file(s):", "!".yellow().bold(), report.skipped.len());
        for skipped in &report.skipped {
            let family = skipped.family.map(|f| f.to_string()).unwrap_or_else(|| "-".into());
            println!("  {} ({}): {}", skipped.source.display(), family.yellow(), skipped.reason);
        }
    }
}
