//! # Payout CLI

use crate::{config::DisbursementConfig, proposer::OperatorSigner, run};
use alloy::primitives::Address;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use url::Url;

/// Proposes one batched payout round to a Safe multisig.
#[derive(Debug, Parser)]
#[command(author, about = "Safe payouts", long_about = None)]
pub struct Args {
    /// The round configuration file.
    #[arg(long, value_name = "CONFIG", env = "ROUND_CONFIG", default_value = "round.yaml")]
    pub config: PathBuf,
    /// The RPC endpoint of the chain the Safe lives on.
    ///
    /// Must be a valid HTTP or HTTPS URL pointing to an Ethereum JSON-RPC endpoint.
    #[arg(long, value_name = "RPC_ENDPOINT", env = "RPC")]
    pub rpc: Url,
    /// The operator private key used to sign the proposal.
    #[arg(long, value_name = "SECRET_KEY", env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
    /// The address of the Safe the payout is proposed to.
    #[arg(long, value_name = "ADDRESS", env = "SAFE_ADDRESS")]
    pub safe_address: Address,
    /// Assemble and log the batch without submitting the proposal.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Args {
    /// Run one disbursement round.
    pub async fn run(self) -> eyre::Result<()> {
        let config = DisbursementConfig::load(&self.config)?;
        let signer = OperatorSigner::load(&self.private_key)?;

        info!(
            config = %self.config.display(),
            chain = ?config.chain,
            safe = %self.safe_address,
            operator = %signer.address(),
            dry_run = self.dry_run,
            "Starting disbursement run"
        );

        let hash =
            run::run(&config, self.rpc, self.safe_address, &signer, self.dry_run).await?;
        info!(safe_tx_hash = %hash, "Run complete");

        Ok(())
    }
}
