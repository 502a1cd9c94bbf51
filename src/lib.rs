//! # Safe Payouts
//!
//! Builds and proposes batched ERC-20 payout transactions to a Safe multisig.
//!
//! One run converts a fixed fiat stipend into a token amount at the current
//! market price, encodes one transfer per recipient, assembles the transfers
//! into a single Safe transaction, signs its hash with the operator key and
//! submits the proposal to the transaction service for co-signing.

pub mod amount;
pub mod batch;
pub mod calls;
pub mod cli;
pub mod config;
pub mod error;
pub mod price;
pub mod proposer;
pub mod run;
pub mod safe;
