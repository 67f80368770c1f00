// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Fhe, InputBinding, InputProof};
use alloy::primitives::{keccak256, Address};
use anyhow::{anyhow, Result};
use fhc_events::IntegerWidth;
use std::collections::BTreeSet;
use tracing::debug;

/// The cryptographic backend behind the counter. Everything here is CPU bound and synchronous,
/// callers dispatch it onto the blocking pool.
pub trait FheProvider: Send + Sync + 'static {
    /// Whether the bytes parse as a ciphertext under the active parameters. An error means the
    /// backend could not answer at all.
    fn check_ciphertext(&self, ciphertext: &[u8]) -> Result<bool>;

    /// Whether `proof` attests `ciphertext` for exactly `binding`
    fn verify_proof(
        &self,
        ciphertext: &[u8],
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<bool>;

    fn encrypt_zero(&self, width: IntegerWidth) -> Result<Vec<u8>>;

    fn add(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>>;

    fn sub(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>>;

    /// Plaintext reduced to `width`
    fn decrypt(&self, ciphertext: &[u8], width: IntegerWidth) -> Result<u64>;
}

/// BFV provider whose proofs are threshold attestations by trusted signers
pub struct BfvProvider {
    fhe: Fhe,
    trusted: BTreeSet<Address>,
    threshold: usize,
}

impl BfvProvider {
    pub fn new(fhe: Fhe, trusted: impl IntoIterator<Item = Address>, threshold: usize) -> Self {
        Self {
            fhe,
            trusted: trusted.into_iter().collect(),
            threshold,
        }
    }

    pub fn fhe(&self) -> &Fhe {
        &self.fhe
    }

    pub fn trusted_signers(&self) -> &BTreeSet<Address> {
        &self.trusted
    }
}

impl FheProvider for BfvProvider {
    fn check_ciphertext(&self, ciphertext: &[u8]) -> Result<bool> {
        match self.fhe.parse_ciphertext(ciphertext) {
            Ok(_) => Ok(true),
            Err(err) => {
                debug!("Not a ciphertext: {err:#}");
                Ok(false)
            }
        }
    }

    fn verify_proof(
        &self,
        ciphertext: &[u8],
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<bool> {
        if proof.ciphertext_digest != keccak256(ciphertext) {
            debug!("Proof was issued for a different ciphertext");
            return Ok(false);
        }
        let digest = binding.digest(proof.ciphertext_digest);
        let mut attested = BTreeSet::new();
        for sig in &proof.signatures {
            let signer = sig
                .recover_address_from_msg(digest.as_slice())
                .map_err(|e| anyhow!("Failed to recover attestor: {e}"))?;
            if self.trusted.contains(&signer) {
                attested.insert(signer);
            }
        }
        debug!(
            "{} of {} required attestations from trusted signers",
            attested.len(),
            self.threshold
        );
        Ok(attested.len() >= self.threshold)
    }

    fn encrypt_zero(&self, _width: IntegerWidth) -> Result<Vec<u8>> {
        self.fhe.encrypt(0)
    }

    fn add(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        self.fhe.add(a, b)
    }

    fn sub(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        self.fhe.sub(a, b)
    }

    fn decrypt(&self, ciphertext: &[u8], width: IntegerWidth) -> Result<u64> {
        Ok(width.reduce(self.fhe.decrypt(ciphertext)?))
    }
}
