//! Folio CLI - Command line front end for the portfolio analytics engine.
//!
//! Reads holdings, quotes and raw price history from a JSON file and prints
//! the derived values as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_core::{
    normalize_bars, ApiResponse, EngineConfig, Holding, PortfolioAnalyzer, PriceSeries,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - portfolio analytics and risk scoring")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to FOLIO_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full portfolio analytics
    Analytics {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Risk score, level and alerts
    Risk {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Technical indicator snapshots
    Indicators {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Only this symbol
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// Simulated 30-day value path with loss thresholds
    Var {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Random seed for a reproducible path
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Input document shared by all data-driven subcommands.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Input {
    holdings: Vec<Holding>,
    prices: HashMap<String, f64>,
    history: BTreeMap<String, Vec<Value>>,
}

/// Validated input ready for the analyzer.
struct Dataset {
    holdings: Vec<Holding>,
    prices: HashMap<String, f64>,
    histories: BTreeMap<String, PriceSeries>,
}

impl Dataset {
    fn load(path: &Path) -> folio_core::Result<Self> {
        let input: Input = serde_json::from_str(&fs::read_to_string(path)?)?;

        let holdings = input
            .holdings
            .into_iter()
            .map(|h| {
                let holding = Holding::new(
                    &h.symbol,
                    &h.company_name,
                    h.shares,
                    h.average_price,
                    h.current_price,
                );
                holding.validate().map(|_| holding)
            })
            .collect::<folio_core::Result<Vec<_>>>()?;

        let prices: HashMap<String, f64> = input
            .prices
            .into_iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), price))
            .collect();

        let mut histories = BTreeMap::new();
        for (symbol, raw) in input.history {
            match normalize_bars(&raw) {
                Ok(series) => {
                    histories.insert(symbol.to_uppercase(), series);
                }
                Err(e) => tracing::warn!("Skipping history for {}: {}", symbol, e),
            }
        }

        tracing::info!(
            "Loaded {} holdings, {} quotes, {} histories from {}",
            holdings.len(),
            prices.len(),
            histories.len(),
            path.display()
        );

        Ok(Self {
            holdings,
            prices,
            histories,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let analyzer = PortfolioAnalyzer::new(config);
    let output = match execute(&analyzer, cli.command) {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data))?,
        Err(e) => serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))?,
    };

    println!("{}", output);
    Ok(())
}

fn execute(analyzer: &PortfolioAnalyzer, command: Commands) -> folio_core::Result<Value> {
    match command {
        Commands::Analytics { input } => {
            let data = Dataset::load(&input)?;
            let report = analyzer.analyze(&data.holdings, &data.prices, &data.histories);
            Ok(serde_json::to_value(&report)?)
        }
        Commands::Risk { input } => {
            let data = Dataset::load(&input)?;
            let report = analyzer.analyze(&data.holdings, &data.prices, &data.histories);
            Ok(json!({
                "score": report.risk.score,
                "level": report.risk.level,
                "color": report.risk.level.color(),
                "alerts": report.concentration.alerts,
            }))
        }
        Commands::Indicators { input, symbol } => {
            let mut data = Dataset::load(&input)?;
            if let Some(symbol) = symbol {
                let symbol = symbol.to_uppercase();
                data.histories.retain(|s, _| *s == symbol);
            }

            let snapshots: BTreeMap<String, Value> = analyzer
                .indicators(&data.histories, &data.prices)
                .into_iter()
                .map(|(symbol, snapshot)| {
                    let value = match snapshot {
                        Ok(snapshot) => json!(snapshot),
                        Err(e) => json!({ "error": e.to_string() }),
                    };
                    (symbol, value)
                })
                .collect();
            Ok(json!({ "indicators": snapshots }))
        }
        Commands::Var { input, seed } => {
            let data = Dataset::load(&input)?;
            let report = analyzer.analyze(&data.holdings, &data.prices, &data.histories);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Ok(serde_json::to_value(analyzer.simulate(&report, &mut rng))?)
        }
        Commands::Config => Ok(Value::Null),
    }
}
