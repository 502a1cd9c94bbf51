//! Proposal signing and submission.
//!
//! Computes the canonical Safe transaction hash of an assembled batch, signs
//! it with the operator key and submits the proposal to the transaction
//! service, where it waits for the remaining co-signatures. Submission is a
//! visible side effect and is not idempotent, so a rejected or failed
//! submission is surfaced for manual resolution, never retried.

use crate::{batch::TransactionBatch, error::PayoutError};
use alloy::{
    primitives::{Address, Bytes, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors loading or using the operator key.
#[derive(Debug, Error)]
pub enum SignError {
    /// The operator private key is absent or malformed.
    #[error("failed to load operator key: {0}")]
    InvalidKey(#[from] alloy::signers::local::LocalSignerError),
    /// Producing the signature failed.
    #[error("failed to sign batch hash: {0}")]
    Signing(#[from] alloy::signers::Error),
}

/// Errors submitting a proposal.
#[derive(Debug, Error)]
pub enum ProposeError {
    /// The configured transaction service URL cannot address the propose
    /// endpoint.
    #[error("invalid transaction service endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    /// The HTTP request to the transaction service failed.
    #[error("proposal request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The transaction service refused the proposal, e.g. a stale nonce or a
    /// duplicate submission.
    #[error("transaction service rejected the proposal with status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the service.
        status: u16,
        /// Response body, for operator diagnosis.
        body: String,
    },
}

/// The operator's signing key.
#[derive(Clone)]
pub struct OperatorSigner(PrivateKeySigner);

impl fmt::Debug for OperatorSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OperatorSigner").field(&self.address()).finish()
    }
}

impl OperatorSigner {
    /// Loads the signer from a raw hex private key.
    pub fn load(key: &str) -> Result<Self, SignError> {
        Ok(Self(PrivateKeySigner::from_str(key)?))
    }

    /// The operator's address.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Signs the given hash, returning the 65-byte `r ‖ s ‖ v` signature the
    /// transaction service verifies (v ∈ {27, 28}).
    pub async fn sign_payload_hash(&self, hash: B256) -> Result<Bytes, SignError> {
        let signature = self.0.sign_hash(&hash).await?;
        Ok(signature.as_bytes().to_vec().into())
    }
}

/// The signed proposal as submitted to the transaction service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEnvelope {
    /// The Safe the transaction targets.
    pub safe_address: Address,
    /// The Safe transaction fields.
    pub transaction_data: TransactionData,
    /// The canonical Safe transaction hash.
    pub transaction_hash: B256,
    /// The proposing owner.
    pub sender_address: Address,
    /// The proposer's signature over `transaction_hash`.
    pub sender_signature: Bytes,
}

/// Wire form of the Safe transaction fields. Numeric fields are decimal
/// strings, as the service expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// Call target.
    pub to: Address,
    /// Native value.
    pub value: String,
    /// Calldata.
    pub data: Bytes,
    /// Safe operation (0 call, 1 delegatecall).
    pub operation: u8,
    /// Gas forwarded to the inner call; 0 means all available.
    pub safe_tx_gas: String,
    /// Base gas for refund accounting.
    pub base_gas: String,
    /// Gas price for refund accounting.
    pub gas_price: String,
    /// Refund token.
    pub gas_token: Address,
    /// Refund receiver.
    pub refund_receiver: Address,
    /// Wallet nonce the transaction is bound to.
    pub nonce: String,
}

impl From<&TransactionBatch> for TransactionData {
    fn from(batch: &TransactionBatch) -> Self {
        let tx = &batch.tx;
        Self {
            to: tx.to,
            value: tx.value.to_string(),
            data: tx.data.clone(),
            operation: tx.operation,
            safe_tx_gas: tx.safeTxGas.to_string(),
            base_gas: tx.baseGas.to_string(),
            gas_price: tx.gasPrice.to_string(),
            gas_token: tx.gasToken,
            refund_receiver: tx.refundReceiver,
            nonce: tx.nonce.to_string(),
        }
    }
}

/// Signs the batch hash and submits the proposal to the transaction service.
///
/// Returns the canonical Safe transaction hash on success.
pub async fn propose_batch(
    http: &reqwest::Client,
    service: &Url,
    batch: &TransactionBatch,
    signer: &OperatorSigner,
) -> Result<B256, PayoutError> {
    let hash = batch.safe_tx_hash();
    let signature = signer.sign_payload_hash(hash).await?;

    let envelope = ProposalEnvelope {
        safe_address: batch.safe_address,
        transaction_data: TransactionData::from(batch),
        transaction_hash: hash,
        sender_address: signer.address(),
        sender_signature: signature,
    };

    let url = service.join("propose").map_err(ProposeError::Endpoint)?;
    debug!(%url, ?envelope, "Submitting proposal");

    let response = http.post(url).json(&envelope).send().await.map_err(ProposeError::Transport)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProposeError::Rejected { status: status.as_u16(), body }.into());
    }

    Ok(hash)
}
