//! Batch assembly.
//!
//! Collects the per-recipient calls into one Safe transaction. A single call
//! goes straight to the token contract; multiple calls are packed for
//! `MultiSendCallOnly` and executed as one DELEGATECALL, so the whole round
//! lands atomically. The wallet nonce is read once, at assembly time, as late
//! as possible before proposing; a concurrent proposal with the same nonce is
//! rejected by the service rather than retried here.

use crate::{
    calls::{Operation, SafeCall},
    config::ChainKind,
    safe::{encode_multi_send, safe_domain, ISafe, SafeTx, MULTI_SEND_CALL_ONLY},
};
use alloy::{
    primitives::{Address, B256, U256},
    providers::DynProvider,
    sol_types::SolStruct,
};
use thiserror::Error;
use tracing::debug;

/// Errors assembling a transaction batch.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The round has no recipients, so there is nothing to propose.
    #[error("cannot assemble a batch with no calls")]
    EmptyBatch,
    /// Reading the Safe's current nonce failed.
    #[error("failed to read the Safe nonce: {0}")]
    NonceRead(#[from] alloy::contract::Error),
}

/// An assembled Safe transaction covering one disbursement round.
///
/// Created once per run and immutable afterwards. `calls` keeps the original
/// recipient order for operator review and tests; `tx` is the wallet-level
/// transaction derived from them.
#[derive(Debug)]
pub struct TransactionBatch {
    /// The per-recipient calls, in configured order.
    pub calls: Vec<SafeCall>,
    /// The Safe transaction covering all calls.
    pub tx: SafeTx,
    /// The wallet nonce captured at assembly time.
    pub nonce: U256,
    /// The Safe the transaction targets.
    pub safe_address: Address,
    /// The chain the Safe lives on.
    pub chain: ChainKind,
}

impl TransactionBatch {
    /// Builds the batch from its parts. Pure; the nonce is supplied by the
    /// caller.
    ///
    /// Preserves the input call order exactly. Gas fields are left at zero:
    /// the Safe treats a zero `safeTxGas` as "forward all available gas" and
    /// no refunds are configured.
    pub fn from_parts(
        calls: Vec<SafeCall>,
        nonce: U256,
        safe_address: Address,
        chain: ChainKind,
    ) -> Result<Self, AssemblyError> {
        let (to, value, data, operation) = match calls.as_slice() {
            [] => return Err(AssemblyError::EmptyBatch),
            [only] => (only.to, only.value, only.data.clone(), only.operation as u8),
            many => {
                (MULTI_SEND_CALL_ONLY, U256::ZERO, encode_multi_send(many), Operation::DelegateCall as u8)
            }
        };

        let tx = SafeTx {
            to,
            value,
            data,
            operation,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            nonce,
        };

        Ok(Self { calls, tx, nonce, safe_address, chain })
    }

    /// The canonical Safe transaction hash, exactly as the Safe contract and
    /// the transaction service derive it.
    pub fn safe_tx_hash(&self) -> B256 {
        self.tx.eip712_signing_hash(&safe_domain(self.chain.id(), self.safe_address))
    }
}

/// Assembles the calls into a [`TransactionBatch`], reading the Safe's
/// current nonce over RPC.
pub async fn assemble_batch(
    provider: &DynProvider,
    safe_address: Address,
    chain: ChainKind,
    calls: Vec<SafeCall>,
) -> Result<TransactionBatch, AssemblyError> {
    if calls.is_empty() {
        return Err(AssemblyError::EmptyBatch);
    }

    let nonce = ISafe::new(safe_address, provider.clone()).nonce().call().await?;
    debug!(%safe_address, %nonce, "Read Safe nonce");

    TransactionBatch::from_parts(calls, nonce, safe_address, chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};

    const SAFE: Address = address!("9A6DE0f62Aa270A8bCB1e2610078650D539B1Ef9");
    const TOKEN: Address = address!("0f5d2fb29fb7d3cfee444a200298f468908cc942");

    fn call(tag: u8) -> SafeCall {
        SafeCall {
            to: TOKEN,
            value: U256::ZERO,
            data: Bytes::from(vec![tag; 4]),
            operation: Operation::Call,
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err =
            TransactionBatch::from_parts(vec![], U256::ZERO, SAFE, ChainKind::Mainnet).unwrap_err();
        assert!(matches!(err, AssemblyError::EmptyBatch));
    }

    #[test]
    fn single_call_goes_direct() {
        let batch =
            TransactionBatch::from_parts(vec![call(1)], U256::from(5u64), SAFE, ChainKind::Mainnet)
                .unwrap();
        assert_eq!(batch.tx.to, TOKEN);
        assert_eq!(batch.tx.operation, Operation::Call as u8);
        assert_eq!(batch.tx.data, Bytes::from(vec![1u8; 4]));
        assert_eq!(batch.tx.nonce, U256::from(5u64));
    }

    #[test]
    fn multiple_calls_use_multi_send() {
        let batch = TransactionBatch::from_parts(
            vec![call(1), call(2), call(3)],
            U256::ZERO,
            SAFE,
            ChainKind::Mainnet,
        )
        .unwrap();
        assert_eq!(batch.tx.to, MULTI_SEND_CALL_ONLY);
        assert_eq!(batch.tx.operation, Operation::DelegateCall as u8);
        assert_eq!(batch.tx.value, U256::ZERO);
    }

    #[test]
    fn call_order_is_preserved() {
        // Tag bytes chosen to not collide with any address or length byte in
        // the packed payload.
        let calls = vec![call(0xAA), call(0xBB), call(0xCC)];
        let batch =
            TransactionBatch::from_parts(calls.clone(), U256::ZERO, SAFE, ChainKind::Mainnet)
                .unwrap();
        assert_eq!(batch.calls, calls);

        // The packed multiSend payload carries the per-call data in the same
        // order the calls came in.
        let data = batch.tx.data.as_ref();
        let first = data.iter().position(|b| *b == 0xAA).unwrap();
        let second = data.iter().position(|b| *b == 0xBB).unwrap();
        let third = data.iter().position(|b| *b == 0xCC).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn hash_depends_on_chain() {
        let mainnet =
            TransactionBatch::from_parts(vec![call(1)], U256::ZERO, SAFE, ChainKind::Mainnet)
                .unwrap();
        let polygon =
            TransactionBatch::from_parts(vec![call(1)], U256::ZERO, SAFE, ChainKind::Polygon)
                .unwrap();
        assert_ne!(mainnet.safe_tx_hash(), polygon.safe_tx_hash());
    }
}
