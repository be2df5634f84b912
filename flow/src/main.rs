//! Coinswap console
//!
//! Drives currency resolution and the amount/estimate steps from a terminal,
//! one stdin line per user message.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinswap_catalog::{CurrencyCache, CurrencyResolver};
use coinswap_common::{Clock, ConversationId, SharedClock, SystemClock};
use coinswap_flow::{ExchangeFlow, FlowConfig, FlowError, InboundMessage};
use coinswap_gateway::{CatalogProvider, ChangeNowClient, ContentApiClient, ExchangeGateway};

/// Coinswap console
#[derive(Parser, Debug)]
#[command(name = "coinswap")]
#[command(about = "Resolve currencies and quote exchanges from the terminal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tradable currencies matching a name or ticker
    Resolve {
        /// Free-text query, e.g. "tether" or "BTC"
        query: String,
    },
    /// Enter amounts for a pair and get an estimate
    Exchange {
        /// Ticker to sell
        #[arg(long)]
        from: String,
        /// Ticker to buy
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = FlowConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.log_filter(std::env::var("RUST_LOG").ok()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    if let Err(e) = config.validate_all().map_err(FlowError::Configuration) {
        error!(error = %e, code = e.error_code(), "Invalid configuration");
        return Err(e.into());
    }

    let exchange = Arc::new(ChangeNowClient::new(&config.gateway_config)?);
    let content = Arc::new(ContentApiClient::new(&config.gateway_config)?);
    let clock: SharedClock = Arc::new(SystemClock);

    let catalog: Arc<dyn CatalogProvider> = exchange.clone();
    let cache = Arc::new(CurrencyCache::new(
        catalog,
        content,
        clock.clone(),
        config.cache_config.clone(),
    ));
    let resolver = CurrencyResolver::new(cache, config.resolver_config.clone());

    match args.command {
        Command::Resolve { query } => {
            let suggestions = resolver.suggest(&query).await;
            if suggestions.is_empty() {
                if resolver.is_known_currency(&query).await {
                    println!("{} is known but cannot be exchanged right now.", query);
                } else {
                    println!("No currency matches {:?}.", query);
                }
            }
            for line in suggestions {
                println!("{}", line);
            }
        }
        Command::Exchange { from, to } => {
            let (Some(from), Some(to)) = (
                resolver.find_tradable(&from).await,
                resolver.find_tradable(&to).await,
            ) else {
                return Err(anyhow::anyhow!("Both currencies must be tradable"));
            };

            let gateway: Arc<dyn ExchangeGateway> = exchange;
            let flow = ExchangeFlow::new(gateway, clock.clone(), &config);
            let conversation = ConversationId::new(0);

            info!(from = %from.ticker, to = %to.ticker, "Starting exchange");
            let mut reply = flow.begin_amount(conversation, from, to).await;
            print_messages(&reply.messages);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while reply.scene.accepts_amount() {
                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let message = InboundMessage::new(conversation, line, clock.now());
                if let Some(next) = flow.on_amount_message(&message).await {
                    print_messages(&next.messages);
                    reply = next;
                }
            }

            info!(scene = %reply.scene, metrics = ?flow.metrics(), "Exchange finished");
        }
    }

    Ok(())
}

fn print_messages(messages: &[String]) {
    for message in messages {
        println!("{}\n", message);
    }
}
