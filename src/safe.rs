//! Safe wallet wire contract.
//!
//! The canonical hash and the batch encoding are dictated by the Safe
//! contracts and re-derived by the transaction service, so everything here
//! must match them bit-for-bit. The EIP-712 struct and domain replicate the
//! Safe v1.3.0 scheme; batches are packed for `MultiSendCallOnly` and
//! executed as a single DELEGATECALL from the Safe.

use crate::calls::SafeCall;
use alloy::{
    primitives::{address, b256, Address, Bytes, B256, U256},
    sol,
    sol_types::{Eip712Domain, SolCall},
};

/// `keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)")`
///
/// As defined by the Safe contracts. The [`SafeTx`] struct below must keep
/// hashing to exactly this value.
pub const SAFE_TX_TYPEHASH: B256 =
    b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8");

/// Canonical `MultiSendCallOnly` v1.3.0 deployment, identical on mainnet and
/// Polygon.
pub const MULTI_SEND_CALL_ONLY: Address =
    address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");

sol! {
    /// The EIP-712 payload a Safe owner approves.
    ///
    /// Field order and types must match the Safe contract's `SafeTx` struct
    /// exactly; the derived typehash is pinned against [`SAFE_TX_TYPEHASH`].
    #[derive(Debug)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }

    #[sol(rpc)]
    interface ISafe {
        function nonce() external view returns (uint256);
    }

    function multiSend(bytes memory transactions) public payable;
}

/// The EIP-712 domain of a Safe: chain id and verifying contract only, no
/// name, version or salt.
pub fn safe_domain(chain_id: u64, safe_address: Address) -> Eip712Domain {
    Eip712Domain {
        name: None,
        version: None,
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(safe_address),
        salt: None,
    }
}

/// Packs calls into `multiSend(bytes)` calldata.
///
/// Each call is encoded as `uint8 operation ‖ address to ‖ uint256 value ‖
/// uint256 data.length ‖ bytes data` with no padding, concatenated in input
/// order, then wrapped in the `multiSend` selector.
pub fn encode_multi_send(calls: &[SafeCall]) -> Bytes {
    let mut packed = Vec::with_capacity(calls.iter().map(|call| 85 + call.data.len()).sum());
    for call in calls {
        packed.push(call.operation as u8);
        packed.extend_from_slice(call.to.as_slice());
        packed.extend_from_slice(&call.value.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&call.data);
    }
    multiSendCall { transactions: packed.into() }.abi_encode().into()
}
