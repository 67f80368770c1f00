// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::IntegerWidth;
use alloy::primitives::Address;
use fhc_utils::ArcBytes;
use serde::{Deserialize, Serialize};

/// What a submitter hands to a contract entry point: the ciphertext and the proof that it was
/// formed for that contract and that submitter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalInput {
    pub ciphertext: ArcBytes,
    pub width: IntegerWidth,
    pub proof: ArcBytes,
}

/// An external input together with the binding context supplied by the host.
///
/// Consumed once by the verifier. Only the resulting handle outlives it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub ciphertext: ArcBytes,
    pub proof: ArcBytes,
    pub width: IntegerWidth,
    pub submitter: Address,
    pub contract: Address,
}

impl EncryptedInput {
    pub fn bind(input: ExternalInput, submitter: Address, contract: Address) -> Self {
        Self {
            ciphertext: input.ciphertext,
            proof: input.proof,
            width: input.width,
            submitter,
            contract,
        }
    }
}
