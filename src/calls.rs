//! Per-recipient transfer encoding.
//!
//! Encodes one ERC-20 transfer per recipient into the call data the Safe will
//! execute. Encoding is pure and deterministic: the bytes become on-chain
//! visible call data and must be reproducible bit-for-bit.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

sol! {
    /// The slice of the ERC-20 interface the pipeline needs.
    #[derive(Debug)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// How tokens leave the paying wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransferMode {
    /// `transfer(recipient, amount)`: the Safe holds the tokens.
    #[default]
    Direct,
    /// `transferFrom(source, recipient, amount)`: tokens are pulled from a
    /// treasury address that pre-approved the Safe as spender.
    Delegated {
        /// The treasury address holding the tokens.
        source: Address,
    },
}

/// Safe operation discriminant, as defined by the Safe contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    /// A regular CALL.
    Call = 0,
    /// A DELEGATECALL. Only used for MultiSend batches.
    DelegateCall = 1,
}

/// One pending on-chain operation inside a Safe transaction.
///
/// Immutable once created; the assembler consumes these in recipient order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeCall {
    /// The call target.
    pub to: Address,
    /// Native value sent with the call. Always zero for token transfers.
    pub value: U256,
    /// The encoded calldata.
    pub data: Bytes,
    /// The Safe operation kind.
    pub operation: Operation,
}

/// Errors encoding a transfer.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A recipient is the zero address, almost certainly a config typo.
    #[error("recipient #{index} is the zero address")]
    ZeroRecipient {
        /// Position of the recipient in the configured order.
        index: usize,
    },
    /// The delegated-mode source is the zero address.
    #[error("delegated transfer source is the zero address")]
    ZeroSource,
}

/// Encodes the token transfer for one recipient.
///
/// Pure and deterministic: identical inputs always produce byte-identical
/// call data.
pub fn encode_transfer(
    token: Address,
    recipient: Address,
    index: usize,
    amount: U256,
    mode: TransferMode,
) -> Result<SafeCall, EncodeError> {
    if recipient.is_zero() {
        return Err(EncodeError::ZeroRecipient { index });
    }

    let data = match mode {
        TransferMode::Direct => {
            IERC20::transferCall { to: recipient, amount }.abi_encode()
        }
        TransferMode::Delegated { source } => {
            if source.is_zero() {
                return Err(EncodeError::ZeroSource);
            }
            IERC20::transferFromCall { from: source, to: recipient, amount }.abi_encode()
        }
    };

    Ok(SafeCall { to: token, value: U256::ZERO, data: data.into(), operation: Operation::Call })
}
