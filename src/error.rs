//! Payout pipeline error types.
//!
//! Each pipeline stage owns its error enum; this module provides the
//! overarching [`PayoutError`] that a run surfaces to the operator. Any error
//! aborts the run before a proposal is submitted, so a failure is always a
//! clean no-op on chain.

use thiserror::Error;

pub use crate::{
    amount::AmountError, batch::AssemblyError, calls::EncodeError, price::PriceError,
    proposer::{ProposeError, SignError},
};

/// The overarching error type returned by a disbursement run.
#[derive(Debug, Error)]
pub enum PayoutError {
    /// The price feed could not produce a usable quote.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// The fiat amount could not be converted into token units.
    #[error(transparent)]
    Amount(#[from] AmountError),
    /// A per-recipient transfer could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The batch could not be assembled.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    /// The batch hash could not be signed.
    #[error(transparent)]
    Sign(#[from] SignError),
    /// The transaction service did not accept the proposal.
    #[error(transparent)]
    Propose(#[from] ProposeError),
}
