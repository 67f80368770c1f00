// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CiphertextHandle, IntegerWidth};
use alloy::primitives::{keccak256, Address, Signature, B256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol_types::SolValue;
use anyhow::{anyhow, Result};
use fhc_utils::ArcBytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to export the plaintext behind `handle` to `requester`.
///
/// When `contract` is given the contract must also hold a grant on the handle, which is how user
/// decryption is scoped to the contract the value belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptionRequest {
    pub handle: CiphertextHandle,
    pub requester: Address,
    pub contract: Option<Address>,
}

impl DecryptionRequest {
    pub fn new(handle: CiphertextHandle, requester: Address) -> Self {
        Self {
            handle,
            requester,
            contract: None,
        }
    }

    pub fn for_contract(mut self, contract: Address) -> Self {
        self.contract = Some(contract);
        self
    }

    /// keccak256(abi.encodePacked(handle, contract, requester))
    pub fn digest(&self) -> [u8; 32] {
        let encoded = (
            B256::from(self.handle),
            self.contract.unwrap_or(Address::ZERO),
            self.requester,
        )
            .abi_encode_packed();
        keccak256(&encoded).into()
    }
}

/// A decryption request authenticated by the requester's EIP-191 signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedDecryptionRequest {
    pub request: DecryptionRequest,
    pub signature: ArcBytes,
}

impl SignedDecryptionRequest {
    pub fn sign(request: DecryptionRequest, signer: &PrivateKeySigner) -> Result<Self> {
        let sig = signer
            .sign_message_sync(&request.digest())
            .map_err(|e| anyhow!("Failed to sign decryption request: {e}"))?;
        Ok(Self {
            request,
            signature: ArcBytes::from_bytes(&sig.as_bytes()),
        })
    }

    pub fn recover_signer(&self) -> Result<Address> {
        let sig = Signature::try_from(&self.signature[..])
            .map_err(|e| anyhow!("Invalid signature: {e}"))?;
        sig.recover_address_from_msg(&self.request.digest())
            .map_err(|e| anyhow!("Failed to recover signer address: {e}"))
    }
}

/// Plaintext returned by the decryption oracle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClearValue {
    pub value: u64,
    pub width: IntegerWidth,
}

impl fmt::Display for ClearValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
