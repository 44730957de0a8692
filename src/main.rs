// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Run the mirror
// 4. Print the report and exit with a proper code
//    (0 = everything saved, 1 = some URLs abandoned, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;

use site_mirror::logging::init_logging;
use site_mirror::{Mirror, MirrorReport};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every claimed URL was saved
//   Ok(1) = run finished but some URLs were abandoned
//   Err   = setup failed, nothing was mirrored
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.to_config().context("invalid settings")?;
    let mirror = Mirror::new(config).context("cannot start mirror")?;

    if !cli.json {
        let settings = mirror.config();
        println!("🔍 Mirroring: {}", settings.root);
        println!("📊 Max depth: {}, concurrency: {}", settings.max_depth, settings.concurrency);
    }

    let report = mirror.run().await.context("mirror run failed")?;

    print_report(&report, cli.json)?;

    if report.is_complete() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Prints the report either as a table or JSON
fn print_report(report: &MirrorReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as a human-readable table in the terminal
fn print_table(report: &MirrorReport) {
    println!();
    println!("{:<60} {:<50}", "URL", "SAVED AS");
    println!("{}", "=".repeat(110));

    for page in &report.saved {
        println!("{:<60} {:<50}", truncate(&page.url, 57), page.path.display());
    }

    if !report.abandoned.is_empty() {
        println!();
        println!("{:<60} {:<50}", "ABANDONED", "REASON");
        println!("{}", "=".repeat(110));
        for page in &report.abandoned {
            println!("{:<60} {:<50}", truncate(&page.url, 57), page.message);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages: {}", report.pages());
    println!("   🖼️  Resources: {}", report.resources());
    println!("   ❌ Abandoned: {}", report.abandoned.len());
    println!("   🔁 Duplicates skipped: {}", report.duplicates_suppressed);
    if report.links_relinked > 0 {
        println!("   🔗 Links repaired: {}", report.links_relinked);
    }
    println!("✅ Done. Output in {}", report.output_dir.display());
}

// Truncate long URLs for display
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
