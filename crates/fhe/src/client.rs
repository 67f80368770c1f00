// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::fhe::encrypt_value;
use crate::{InputAttestor, InputBinding, InputProof, SharedRng};
use alloy::primitives::{keccak256, Address};
use anyhow::{bail, Context, Result};
use fhc_events::{ExternalInput, IntegerWidth};
use fhc_utils::ArcBytes;
use fhe::bfv::{BfvParameters, PublicKey};
use fhe_traits::{DeserializeParametrized, Serialize};
use std::sync::Arc;

/// Submitter side helper that encrypts a value under the node public key and collects the
/// attestations binding it to a contract and a user.
#[derive(Clone)]
pub struct FheClient {
    params: Arc<BfvParameters>,
    public_key: Arc<PublicKey>,
    attestors: Vec<InputAttestor>,
    chain_id: u64,
    rng: SharedRng,
}

impl FheClient {
    pub fn new(
        params: Arc<BfvParameters>,
        public_key: &[u8],
        attestors: Vec<InputAttestor>,
        chain_id: u64,
        rng: SharedRng,
    ) -> Result<Self> {
        let public_key =
            PublicKey::from_bytes(public_key, &params).context("Error deserializing public key")?;
        Ok(Self {
            params,
            public_key: Arc::new(public_key),
            attestors,
            chain_id,
            rng,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Start an input for `user` to submit to `contract`
    pub fn create_encrypted_input(&self, contract: Address, user: Address) -> EncryptedInputBuilder<'_> {
        EncryptedInputBuilder {
            client: self,
            contract,
            user,
            values: vec![],
        }
    }
}

pub struct EncryptedInputBuilder<'a> {
    client: &'a FheClient,
    contract: Address,
    user: Address,
    values: Vec<(u64, IntegerWidth)>,
}

impl EncryptedInputBuilder<'_> {
    pub fn add8(mut self, value: u8) -> Self {
        self.values.push((value as u64, IntegerWidth::Uint8));
        self
    }

    pub fn add16(mut self, value: u16) -> Self {
        self.values.push((value as u64, IntegerWidth::Uint16));
        self
    }

    pub fn add32(mut self, value: u32) -> Self {
        self.values.push((value as u64, IntegerWidth::Uint32));
        self
    }

    /// Encrypt the single queued value and attest it with every configured attestor
    pub fn encrypt(self) -> Result<ExternalInput> {
        let &[(value, width)] = self.values.as_slice() else {
            bail!(
                "An encrypted input carries exactly one value, {} were added",
                self.values.len()
            );
        };
        let client = self.client;
        if client.attestors.is_empty() {
            bail!("No attestors available to prove the input");
        }

        let ct = encrypt_value(&client.params, &client.public_key, value, &client.rng)?.to_bytes();
        let binding = InputBinding::new(width, self.user, self.contract, client.chain_id);
        let signatures = client
            .attestors
            .iter()
            .map(|attestor| attestor.attest(&ct, &binding))
            .collect::<Result<Vec<_>>>()?;
        let proof = InputProof::new(keccak256(&ct), signatures)?;

        Ok(ExternalInput {
            ciphertext: ct.into(),
            width,
            proof: ArcBytes::from(proof.to_bytes()),
        })
    }
}
