//! Command-line driver for the market-data access pipeline.

use anyhow::Result;
use catalog::{InstrumentFilter, display_strike};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use common::{Exchange, Interval};
use levels::StrikeLevelEngine;
use tracing::{Level, info, warn};

mod context;

use context::PipelineContext;

#[derive(Parser)]
#[command(name = "strikeband")]
#[command(about = "Session-scoped market data access and strike band derivation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and report the session state
    Login,
    /// Refresh the instrument catalog and show filtered counts
    Catalog {
        /// Underlying name to filter on
        #[arg(long)]
        name: Option<String>,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<NaiveDate>,
    },
    /// Derive strike levels from a daily series and resolve them
    Levels {
        /// Underlying name in the catalog
        #[arg(long, default_value = "NIFTY")]
        name: String,
        /// Target contract expiry (YYYY-MM-DD)
        #[arg(long)]
        expiry: NaiveDate,
        /// Exchange for the reference series
        #[arg(long, default_value = "NSE")]
        exchange: Exchange,
        /// Instrument token of the reference index
        #[arg(long, default_value = "99926000")]
        token: String,
        /// Days of daily candles to anchor the trailing close
        #[arg(long, default_value = "30")]
        days: i64,
        /// Levels above and below the rounded close
        #[arg(long, default_value = "2")]
        band: usize,
        /// Strike spacing in rupees
        #[arg(long, default_value = "100")]
        step: f64,
    },
    /// Fetch one live quote, or poll at a fixed interval
    Quote {
        /// Exchange segment
        #[arg(long, default_value = "NSE")]
        exchange: Exchange,
        /// Instrument token
        #[arg(long)]
        token: String,
        /// Poll every N seconds until Ctrl-C
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Fetch normalized option greeks
    Greeks {
        /// Underlying name
        #[arg(long, default_value = "NIFTY")]
        name: String,
        /// Expiry code as the broker spells it (e.g. 03APR2025)
        #[arg(long)]
        expiry: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login => run_login().await,
        Commands::Catalog { name, expiry } => run_catalog(name, expiry).await,
        Commands::Levels {
            name,
            expiry,
            exchange,
            token,
            days,
            band,
            step,
        } => run_levels(&name, expiry, exchange, &token, days, band, step).await,
        Commands::Quote {
            exchange,
            token,
            watch,
        } => run_quote(exchange, &token, watch).await,
        Commands::Greeks { name, expiry } => run_greeks(&name, &expiry).await,
    }
}

async fn run_login() -> Result<()> {
    let ctx = PipelineContext::connect().await?;
    let Some(tokens) = ctx.session.tokens() else {
        anyhow::bail!("session is not active");
    };
    let prefix_len = tokens.access.len().min(12);
    info!(
        "session active for {} (access token {}...)",
        ctx.session.user_id,
        &tokens.access[..prefix_len]
    );
    Ok(())
}

async fn run_catalog(name: Option<String>, expiry: Option<NaiveDate>) -> Result<()> {
    let mut ctx = PipelineContext::connect().await?;
    let total = ctx.catalog.refresh().await?;
    info!("catalog loaded: {total} instruments");

    let mut spec = InstrumentFilter::new();
    if let Some(name) = &name {
        spec = spec.name(name.clone());
    }
    if let Some(expiry) = expiry {
        spec = spec.expiry(expiry);
    }
    if spec.is_empty() {
        return Ok(());
    }

    let matches = ctx.catalog.select(&spec);
    info!("{} instruments match the filter", matches.len());
    for record in matches.iter().take(20) {
        info!(
            "  {} [{}] {} strike={} expiry={:?}",
            record.symbol,
            record.exchange_segment,
            record.token,
            display_strike(record.strike),
            record.expiry
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_levels(
    name: &str,
    expiry: NaiveDate,
    exchange: Exchange,
    token: &str,
    days: i64,
    band: usize,
    step: f64,
) -> Result<()> {
    let mut ctx = PipelineContext::connect().await?;
    ctx.catalog.refresh().await?;

    let to = Local::now().naive_local();
    let from = to - chrono::Duration::days(days);
    let series = ctx
        .market
        .get_historical(exchange, token, Interval::OneDay, from, to)
        .await;
    if series.is_empty() {
        warn!("no historical data for token {token}; cannot derive levels");
        return Ok(());
    }
    let close = series.last().map(|c| c.close).unwrap_or_default();
    info!("trailing close for {token}: {close}");

    let engine = StrikeLevelEngine::new(band, step);
    let Some(band) = engine.derive(&series) else {
        return Ok(());
    };
    info!("strike band: {band:?}");

    let snapshot = ctx.catalog.snapshot().unwrap_or(&[]);
    let resolved = levels::resolve(&band, snapshot, name, expiry);
    for level in &resolved {
        if level.matches.is_empty() {
            info!("  {}: no instrument", display_strike(level.level));
            continue;
        }
        for m in &level.matches {
            info!(
                "  {}: {} [{}] token={}",
                display_strike(level.level),
                m.symbol,
                m.exchange_segment,
                m.token
            );
        }
    }
    Ok(())
}

async fn run_quote(exchange: Exchange, token: &str, watch: Option<u64>) -> Result<()> {
    let ctx = PipelineContext::connect().await?;

    let Some(secs) = watch else {
        report_quote(&ctx, exchange, token).await;
        return Ok(());
    };

    // Fixed-interval polling with cooperative Ctrl-C cancellation; the
    // client itself never loops.
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(secs.max(1)));
    info!("polling {token} every {secs}s, Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = ticker.tick() => report_quote(&ctx, exchange, token).await,
            _ = tokio::signal::ctrl_c() => {
                info!("polling stopped");
                return Ok(());
            }
        }
    }
}

async fn report_quote(ctx: &PipelineContext, exchange: Exchange, token: &str) {
    match ctx.market.get_live_quote(exchange, token).await {
        Some(quote) => info!(
            "{} {}: ltp={} o={} h={} l={} c={} vol={}",
            quote.exchange, quote.token, quote.ltp, quote.open, quote.high, quote.low, quote.close,
            quote.volume
        ),
        None => warn!("no quote for {token}"),
    }
}

async fn run_greeks(name: &str, expiry: &str) -> Result<()> {
    let ctx = PipelineContext::connect().await?;
    let rows = ctx.market.get_option_greeks(name, expiry).await;
    if rows.is_empty() {
        warn!("no greeks for {name} {expiry}");
        return Ok(());
    }
    info!("{} greek rows for {name} {expiry}", rows.len());
    for row in rows {
        info!(
            "  strike={} delta={:.4} gamma={:.6} theta={:.4} vega={:.4} iv={:.2} vol={}",
            display_strike(row.strike),
            row.delta,
            row.gamma,
            row.theta,
            row.vega,
            row.implied_volatility,
            row.trade_volume
        );
    }
    Ok(())
}
