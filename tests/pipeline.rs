//! Offline end-to-end test of the disbursement pipeline: everything up to
//! the network edges (price fetch, nonce read, proposal POST), with the feed
//! response and nonce supplied as fixtures.

use alloy::{
    primitives::{address, Address, U256},
    sol_types::SolCall,
};
use rust_decimal::Decimal;
use safe_payouts::{
    amount::to_smallest_unit,
    batch::{AssemblyError, TransactionBatch},
    calls::{encode_transfer, IERC20, TransferMode},
    config::ChainKind,
    price::parse_quote,
    proposer::{ProposalEnvelope, TransactionData},
    safe::MULTI_SEND_CALL_ONLY,
};

const SAFE: Address = address!("9A6DE0f62Aa270A8bCB1e2610078650D539B1Ef9");
const TOKEN: Address = address!("0f5d2fb29fb7d3cfee444a200298f468908cc942");
const RECIPIENTS: [Address; 2] = [
    address!("521b0fef9cdcf250abaf8e7bc798cbe13fa98692"),
    address!("0E7C2D47D79D4026472F4f942c4947937dAa94a8"),
];

#[test]
fn two_recipient_direct_round() {
    // Mocked feed: 0.4 USD per token.
    let quote = parse_quote(r#"{"decentraland":{"usd":0.4}}"#, "decentraland", "usd").unwrap();

    // 2400 USD at 0.4 is exactly 6000 tokens each.
    let amount = to_smallest_unit(Decimal::from(2400), &quote, 18).unwrap();
    let expected = U256::from(6000u64) * U256::from(10u64).pow(U256::from(18));
    assert_eq!(amount, expected);

    let calls = RECIPIENTS
        .iter()
        .enumerate()
        .map(|(index, recipient)| {
            encode_transfer(TOKEN, *recipient, index, amount, TransferMode::Direct).unwrap()
        })
        .collect::<Vec<_>>();

    // Exactly one call per recipient, in configured order, each encoding
    // transfer(recipient, 6000e18).
    assert_eq!(calls.len(), 2);
    for (call, recipient) in calls.iter().zip(RECIPIENTS) {
        assert_eq!(call.to, TOKEN);
        assert_eq!(call.value, U256::ZERO);
        let decoded = IERC20::transferCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.to, recipient);
        assert_eq!(decoded.amount, expected);
    }

    // One batch under the current nonce, executed atomically via MultiSend.
    let nonce = U256::from(42u64);
    let batch =
        TransactionBatch::from_parts(calls.clone(), nonce, SAFE, ChainKind::Mainnet).unwrap();
    assert_eq!(batch.nonce, nonce);
    assert_eq!(batch.tx.to, MULTI_SEND_CALL_ONLY);
    assert_eq!(batch.tx.operation, 1);
    assert_eq!(batch.calls, calls);

    // One hash, stable across reassembly of the same inputs.
    let hash = batch.safe_tx_hash();
    let rebuilt = TransactionBatch::from_parts(calls, nonce, SAFE, ChainKind::Mainnet).unwrap();
    assert_eq!(hash, rebuilt.safe_tx_hash());

    // Exactly one proposal request, carrying that hash and the full batch.
    let envelope = ProposalEnvelope {
        safe_address: batch.safe_address,
        transaction_data: TransactionData::from(&batch),
        transaction_hash: hash,
        sender_address: Address::ZERO,
        sender_signature: vec![0u8; 65].into(),
    };
    assert_eq!(envelope.safe_address, SAFE);
    assert_eq!(envelope.transaction_data.nonce, "42");
    assert_eq!(envelope.transaction_hash, hash);
}

#[test]
fn malformed_feed_stops_the_run() {
    // A feed response without the expected nested field fails price
    // resolution, so no downstream step can execute.
    assert!(parse_quote(r#"{"decentraland":{}}"#, "decentraland", "usd").is_err());
    assert!(parse_quote("[]", "decentraland", "usd").is_err());
}

#[test]
fn empty_recipient_list_yields_no_proposal() {
    let err =
        TransactionBatch::from_parts(vec![], U256::ZERO, SAFE, ChainKind::Mainnet).unwrap_err();
    assert!(matches!(err, AssemblyError::EmptyBatch));
}
