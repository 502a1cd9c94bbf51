//! Disbursement run orchestration.
//!
//! Drives one round through the pipeline: resolve price, convert the stipend,
//! encode one transfer per recipient, assemble the batch, then sign and
//! propose. Strictly linear, aborting on the first error; nothing is
//! submitted unless every prior step succeeded, so a failed run never pays
//! anyone.

use crate::{
    amount::to_smallest_unit,
    batch::assemble_batch,
    calls::encode_transfer,
    config::DisbursementConfig,
    error::PayoutError,
    price::PriceClient,
    proposer::{propose_batch, OperatorSigner},
};
use alloy::{
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder},
};
use tracing::info;
use url::Url;

/// Runs one disbursement round.
///
/// Returns the canonical Safe transaction hash of the proposed (or, with
/// `dry_run`, merely assembled) batch.
pub async fn run(
    config: &DisbursementConfig,
    rpc: Url,
    safe_address: Address,
    signer: &OperatorSigner,
    dry_run: bool,
) -> Result<B256, PayoutError> {
    let quote =
        PriceClient::new(config.price_feed.clone()).resolve(&config.asset, &config.fiat_unit).await?;
    info!(asset = %quote.asset, price = %quote.price, fiat_unit = %quote.fiat_unit, "Resolved price");

    let amount = to_smallest_unit(config.fiat_amount, &quote, config.decimals)?;
    info!(
        fiat_amount = %config.fiat_amount,
        %amount,
        decimals = config.decimals,
        "Converted stipend to token units"
    );

    // Encoding is pure; mapping in order keeps the configured recipient order
    // through to on-chain execution.
    let calls = config
        .recipients
        .iter()
        .enumerate()
        .map(|(index, recipient)| {
            encode_transfer(config.token, *recipient, index, amount, config.transfer_mode)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let provider = ProviderBuilder::new().connect_http(rpc).erased();
    let batch = assemble_batch(&provider, safe_address, config.chain, calls).await?;

    // Operator review point: the full batch is logged before anything leaves
    // this process.
    let hash = batch.safe_tx_hash();
    info!(
        recipients = config.recipients.len(),
        nonce = %batch.nonce,
        to = %batch.tx.to,
        operation = batch.tx.operation,
        safe_tx_hash = %hash,
        "Assembled batch"
    );

    if dry_run {
        info!("Dry run; not submitting the proposal");
        return Ok(hash);
    }

    let http = reqwest::Client::new();
    let hash = propose_batch(&http, &config.tx_service_url(), &batch, signer).await?;
    info!(safe_tx_hash = %hash, proposer = %signer.address(), "Proposal submitted");

    Ok(hash)
}
