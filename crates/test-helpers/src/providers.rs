// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Result};
use fhc_events::IntegerWidth;
use fhc_fhe::{FheProvider, InputBinding, InputProof};
use std::sync::Arc;
use std::time::Duration;

/// Delegates to `inner` but stalls every decryption
pub struct SlowProvider {
    inner: Arc<dyn FheProvider>,
    delay: Duration,
}

impl SlowProvider {
    pub fn new(inner: Arc<dyn FheProvider>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl FheProvider for SlowProvider {
    fn check_ciphertext(&self, ciphertext: &[u8]) -> Result<bool> {
        self.inner.check_ciphertext(ciphertext)
    }

    fn verify_proof(
        &self,
        ciphertext: &[u8],
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<bool> {
        self.inner.verify_proof(ciphertext, proof, binding)
    }

    fn encrypt_zero(&self, width: IntegerWidth) -> Result<Vec<u8>> {
        self.inner.encrypt_zero(width)
    }

    fn add(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        self.inner.add(a, b)
    }

    fn sub(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        self.inner.sub(a, b)
    }

    fn decrypt(&self, ciphertext: &[u8], width: IntegerWidth) -> Result<u64> {
        std::thread::sleep(self.delay);
        self.inner.decrypt(ciphertext, width)
    }
}

/// A backend that is down
pub struct UnavailableProvider;

impl FheProvider for UnavailableProvider {
    fn check_ciphertext(&self, _: &[u8]) -> Result<bool> {
        bail!("provider unavailable")
    }

    fn verify_proof(&self, _: &[u8], _: &InputProof, _: &InputBinding) -> Result<bool> {
        bail!("provider unavailable")
    }

    fn encrypt_zero(&self, _: IntegerWidth) -> Result<Vec<u8>> {
        bail!("provider unavailable")
    }

    fn add(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>> {
        bail!("provider unavailable")
    }

    fn sub(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>> {
        bail!("provider unavailable")
    }

    fn decrypt(&self, _: &[u8], _: IntegerWidth) -> Result<u64> {
        bail!("provider unavailable")
    }
}
