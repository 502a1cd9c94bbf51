//! # Safe Payouts
//!
//! Builds and proposes batched ERC-20 payout transactions to a Safe multisig.

use clap::Parser;
use safe_payouts::cli::Args;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .init();

    Args::parse().run().await
}
