// ABOUTME: Command-line driver that seats N agents and lets them share resources.
// ABOUTME: Logs every phase transition and prints a meal summary on exit or Ctrl-C.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dinner::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "dinner", about = "Run a table of agents sharing adjacent resources")]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of agents around the table (at least 2).
    #[arg(long)]
    agents: Option<usize>,

    /// Think delay in ms, either `N` or `MIN..MAX`.
    #[arg(long, value_parser = parse_range)]
    think_ms: Option<DelayRange>,

    /// Hold delay in ms, either `N` or `MIN..MAX`.
    #[arg(long, value_parser = parse_range)]
    hold_ms: Option<DelayRange>,

    /// Meals per agent before it stops.
    #[arg(long)]
    cycles: Option<u64>,

    /// Stop the dinner after this many seconds.
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Emit logs and the summary as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_range(s: &str) -> Result<DelayRange, String> {
    s.parse().map_err(|e: DinnerError| e.to_string())
}

impl Args {
    fn config(&self) -> Result<DinnerConfig> {
        let mut config = match &self.config {
            Some(path) => DinnerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DinnerConfig::default(),
        };

        if let Some(agents) = self.agents {
            config.agents = agents;
        }
        if let Some(think) = self.think_ms {
            config.think = think;
        }
        if let Some(hold) = self.hold_ms {
            config.hold = hold;
        }
        if let Some(cycles) = self.cycles {
            config.cycles = Some(cycles);
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json);

    let config = args.config()?;
    let dinner = Dinner::start(&config)?;
    let cancel = dinner.cancellation_token();

    let deadline = args.duration_secs.map(Duration::from_secs);
    tokio::spawn(async move {
        let timer = async {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, clearing the table"),
            () = timer => tracing::info!("time is up, clearing the table"),
            () = cancel.cancelled() => {}
        }
        cancel.cancel();
    });

    let summary = dinner.join().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for report in &summary.reports {
            println!(
                "agent {}: {} meals ({})",
                report.agent, report.meals, report.outcome
            );
        }
        println!("total meals: {}", summary.total_meals);
    }

    Ok(())
}
