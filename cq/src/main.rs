use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cursorqueue::cli::{Cli, Command, parse_cursor_arg};
use cursorqueue::config::Config;
use cursorqueue::{Checkpoint, CrawlOptions, CrawlScript, Crawler, CursorQueue, Levels, ScriptedSource};

fn setup_logging(verbose: bool) -> Result<()> {
    // RUST_LOG wins unless --verbose asks for more
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let cli_levels = cli
        .levels
        .as_deref()
        .map(str::parse::<Levels>)
        .transpose()
        .context("Invalid --levels")?;

    info!(levels = %config.levels, "cursorqueue starting");

    match cli.command {
        Command::Levels => {
            let levels = cli_levels.unwrap_or(config.levels);
            for label in levels.labels() {
                let rank = levels.rank(label)?;
                println!("{} {}", rank.to_string().dimmed(), label.cyan());
            }
        }
        Command::Order { cursors } => {
            let mut queue = CursorQueue::with_levels(cli_levels.unwrap_or(config.levels));
            for arg in &cursors {
                let (kind, cursor, parent) = parse_cursor_arg(arg);
                queue
                    .enqueue(&kind, cursor, parent)
                    .context(format!("Cannot enqueue {}", arg))?;
            }
            while let Some(record) = queue.dequeue() {
                println!("{}", record);
            }
        }
        Command::Crawl {
            script,
            max_fetches,
            checkpoint,
        } => {
            let script = CrawlScript::load(&script)?;
            let levels = cli_levels
                .or_else(|| script.levels.clone())
                .unwrap_or(config.levels.clone());

            let mut crawler = Crawler::new(
                CursorQueue::with_levels(levels),
                CrawlOptions {
                    max_fetches: max_fetches.or(config.crawl.max_fetches),
                },
            );
            for seed in &script.seed {
                crawler.seed(&seed.resource_kind, seed.cursor_token.clone(), seed.parent_id.clone())?;
            }

            let checkpoint = checkpoint.or(config.checkpoint.path.clone());
            run_crawl(crawler, &script, checkpoint.as_deref())?;
        }
        Command::Resume {
            from,
            script,
            max_fetches,
            checkpoint,
        } => {
            let saved = Checkpoint::load(&from)?;
            let script = CrawlScript::load(&script)?;
            for (origin, levels) in [("command-line", cli_levels.as_ref()), ("script", script.levels.as_ref())] {
                if let Some(levels) = levels
                    && *levels != saved.levels
                {
                    bail!(
                        "{} levels [{}] do not match checkpoint levels [{}]",
                        origin,
                        levels,
                        saved.levels
                    );
                }
            }

            let queue = saved.restore().context("Checkpoint does not match its levels")?;
            println!("{} Resumed {} pending cursors", "✓".green(), queue.size());

            let crawler = Crawler::new(
                queue,
                CrawlOptions {
                    max_fetches: max_fetches.or(config.crawl.max_fetches),
                },
            );

            let checkpoint = checkpoint.or(config.checkpoint.path.clone()).unwrap_or(from);
            run_crawl(crawler, &script, Some(&checkpoint))?;
        }
    }

    Ok(())
}

fn run_crawl(mut crawler: Crawler, script: &CrawlScript, checkpoint: Option<&Path>) -> Result<()> {
    let mut source = ScriptedSource::new(script);

    let result = crawler.run_with(&mut source, |visit| {
        println!(
            "{} {} records={} follow_ups={}",
            "→".cyan(),
            visit.cursor,
            visit.records,
            visit.follow_ups
        );
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            save_pending(&crawler, checkpoint)?;
            return Err(err);
        }
    };

    println!(
        "Fetches: {}  Records: {}  Follow-ups: {}",
        summary.fetches, summary.records, summary.follow_ups
    );
    for (label, count) in &summary.per_level {
        println!("  {}: {}", label, count);
    }

    if summary.completed {
        println!("{} Crawl complete", "✓".green());
        if let Some(path) = checkpoint {
            // Leave an empty checkpoint so a later resume has nothing to replay
            Checkpoint::capture(crawler.queue()).save(path)?;
            println!("{} Checkpoint cleared: {}", "✓".green(), path.display());
        }
    } else {
        println!("{} {} cursors pending", "…".yellow(), crawler.queue().size());
        save_pending(&crawler, checkpoint)?;
    }
    Ok(())
}

fn save_pending(crawler: &Crawler, checkpoint: Option<&Path>) -> Result<()> {
    match checkpoint {
        Some(path) => {
            Checkpoint::capture(crawler.queue()).save(path)?;
            println!("{} Checkpoint written: {}", "✓".green(), path.display());
        }
        None => println!("{} No checkpoint path, pending cursors discarded", "!".red()),
    }
    Ok(())
}
