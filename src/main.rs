use anyhow::{Context, Result};
use options_activity::activity::{ScreenResult, WatchlistPipeline};
use options_activity::config::screener::{parse_expiration_pair, parse_watchlist};
use options_activity::config::{MarketDataConfig, ScreenerConfig};
use options_activity::error::ConfigError;
use options_activity::market_data::CachedProvider;
use options_activity::report::ReportGenerator;
use options_activity::yahoo::YahooClient;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Json,
}

/// Command line overrides on top of the environment configuration
#[derive(Debug)]
struct CliArgs {
    tickers: Option<String>,
    unusual: Option<f64>,
    high: Option<f64>,
    extreme: Option<f64>,
    min_volume: Option<u64>,
    expirations: Vec<String>,
    relative_volume: bool,
    spot: bool,
    parallel: bool,
    format: OutputFormat,
    schema: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            tickers: None,
            unusual: None,
            high: None,
            extreme: None,
            min_volume: None,
            expirations: Vec::new(),
            relative_volume: true,
            spot: true,
            parallel: true,
            format: OutputFormat::Markdown,
            schema: false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);

    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    if cli.schema {
        let schema = schemars::schema_for!(ScreenResult);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = build_config(&cli).context("Invalid screen configuration")?;
    let market_config = MarketDataConfig::from_env().context("Invalid market data configuration")?;
    let pipeline = build_pipeline(&market_config).context("Failed to create market data client")?;

    tracing::info!(
        base_url = %market_config.base_url,
        cache_ttl_secs = market_config.cache_ttl_secs,
        "Market data provider configured"
    );

    let result = pipeline.run(&config).await;

    match cli.format {
        OutputFormat::Markdown => {
            let report = ReportGenerator::new(&config).render(&result);
            tracing::info!(
                notable_contracts = report.notable_contracts,
                failed_tickers = ?report.failed_tickers,
                failed_sections = ?report.failed_sections,
                "Report rendered"
            );
            print!("{}", report.markdown_content);
        }
        OutputFormat::Json => {
            println!("{}", result.to_json().context("Failed to serialize result")?);
        }
    }

    Ok(())
}

/// HTTP provider behind the response cache, wrapped in the pipeline
fn build_pipeline(
    market_config: &MarketDataConfig,
) -> options_activity::error::Result<WatchlistPipeline<CachedProvider<YahooClient>>> {
    let client = YahooClient::new(market_config)?;
    let provider = CachedProvider::new(client, market_config.cache_ttl());
    Ok(WatchlistPipeline::new(provider).with_fetch_timeout(market_config.timeout()))
}

/// Environment configuration with command line overrides applied, validated once
fn build_config(cli: &CliArgs) -> Result<ScreenerConfig, ConfigError> {
    let mut config = ScreenerConfig::from_env()?;

    if let Some(tickers) = &cli.tickers {
        config.watchlist = parse_watchlist(tickers);
    }

    config.thresholds = config
        .thresholds
        .with_overrides(cli.unusual, cli.high, cli.extreme);

    if let Some(min_volume) = cli.min_volume {
        config.min_volume = min_volume;
    }

    for pair in &cli.expirations {
        let (ticker, date) = parse_expiration_pair(pair)?;
        config.expiration_selection.insert(ticker, date);
    }

    config.features.relative_volume = cli.relative_volume;
    config.features.spot = cli.spot;
    config.features.parallel = cli.parallel;

    config.validate()?;
    Ok(config)
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tickers" => cli.tickers = Some(next_value(args, &mut i)),
            "--unusual" => cli.unusual = Some(parse_value(args, &mut i)),
            "--high" => cli.high = Some(parse_value(args, &mut i)),
            "--extreme" => cli.extreme = Some(parse_value(args, &mut i)),
            "--min-volume" => cli.min_volume = Some(parse_value(args, &mut i)),
            "--expiration" => cli.expirations.push(next_value(args, &mut i)),
            "--no-relative-volume" => cli.relative_volume = false,
            "--no-spot" => cli.spot = false,
            "--sequential" => cli.parallel = false,
            "--format" => {
                cli.format = match next_value(args, &mut i).as_str() {
                    "markdown" | "md" => OutputFormat::Markdown,
                    "json" => OutputFormat::Json,
                    other => usage_error(&format!("Invalid format: {}", other)),
                }
            }
            "--schema" => cli.schema = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    cli
}

fn next_value(args: &[String], i: &mut usize) -> String {
    let flag = &args[*i];
    match args.get(*i + 1) {
        Some(value) => {
            *i += 1;
            value.clone()
        }
        None => usage_error(&format!("Missing value for {}", flag)),
    }
}

fn parse_value<T: FromStr>(args: &[String], i: &mut usize) -> T {
    let flag = args[*i].clone();
    let raw = next_value(args, i);
    raw.parse()
        .unwrap_or_else(|_| usage_error(&format!("Invalid value for {}: {}", flag, raw)))
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    std::process::exit(1);
}

/// Print usage information
fn print_usage() {
    println!("Options Activity - screen a watchlist for unusual options activity");
    println!();
    println!("USAGE:");
    println!("    options-activity [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --tickers <LIST>          Comma-separated watchlist (default: XLF, SPXL, TQQQ, B, BRK.B)");
    println!("    --unusual <RATIO>         Vol/OI threshold for Unusual (default: 1.0)");
    println!("    --high <RATIO>            Vol/OI threshold for High (default: derived from unusual)");
    println!("    --extreme <RATIO>         Vol/OI threshold for Extreme (default: derived from high)");
    println!("    --min-volume <N>          Minimum contract volume (default: 100)");
    println!("    --expiration <T=DATE>     Expiration for a ticker, e.g. SPY=2026-10-23 (repeatable)");
    println!("    --no-relative-volume      Skip relative volume computation");
    println!("    --no-spot                 Skip spot price; no moneyness or distance from spot");
    println!("    --sequential              Screen tickers one after another");
    println!("    --format <FORMAT>         Output format: markdown or json (default: markdown)");
    println!("    --schema                  Print the JSON schema of the json output and exit");
    println!("    --help, -h                Print this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    OPTIONS_WATCHLIST             Default watchlist");
    println!("    OPTIONS_UNUSUAL_MIN           Default Unusual threshold");
    println!("    OPTIONS_HIGH_MIN              Default High threshold");
    println!("    OPTIONS_EXTREME_MIN           Default Extreme threshold");
    println!("    OPTIONS_MIN_VOLUME            Default minimum volume");
    println!("    OPTIONS_EXPIRATIONS           TICKER=YYYY-MM-DD pairs, comma-separated");
    println!("    YAHOO_BASE_URL                Market data API base URL (default: https://query2.finance.yahoo.com)");
    println!("    MARKET_DATA_TIMEOUT_SECS      Per-request timeout (default: 10)");
    println!("    MARKET_DATA_CACHE_TTL_SECS    Response cache lifetime (default: 60)");
    println!("    MARKET_DATA_RATE_LIMIT        Requests per minute (default: 120)");
    println!("    RUST_LOG                      Logging level (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("    # Screen the default watchlist");
    println!("    options-activity");
    println!();
    println!("    # Stricter tiers on two tickers, JSON output");
    println!("    options-activity --tickers SPY,QQQ --unusual 2 --min-volume 500 --format json");
}
