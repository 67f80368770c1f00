// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhc_events::{CiphertextHandle, CounterError, CounterResult, EncryptedInput};
use fhc_fhe::{CiphertextRegistry, FheProvider, InputBinding, InputProof};
use fhc_utils::run_blocking;
use std::sync::Arc;
use tracing::debug;

/// Turns an attested external input into a registered handle.
///
/// Holds no slot state so any number of verifications may run at once.
#[derive(Clone)]
pub struct ProofVerifier {
    provider: Arc<dyn FheProvider>,
    registry: CiphertextRegistry,
}

impl ProofVerifier {
    pub fn new(provider: Arc<dyn FheProvider>, registry: CiphertextRegistry) -> Self {
        Self { provider, registry }
    }

    pub async fn verify(&self, input: EncryptedInput) -> CounterResult<CiphertextHandle> {
        if input.ciphertext.is_empty() {
            return Err(CounterError::malformed("Ciphertext is empty"));
        }
        let proof = InputProof::from_bytes(&input.proof)
            .map_err(|e| CounterError::malformed(format!("{e:#}")))?;
        let binding = InputBinding::for_input(&input, self.registry.chain_id());

        let provider = self.provider.clone();
        let ciphertext = input.ciphertext.clone();
        // a provider that cannot answer is an internal failure, not a bad input
        run_blocking(move || {
            if !provider.check_ciphertext(&ciphertext)? {
                return Ok(Err(CounterError::malformed(
                    "Ciphertext does not parse under the active parameters",
                )));
            }
            Ok(match provider.verify_proof(&ciphertext, &proof, &binding) {
                Ok(true) => Ok(()),
                Ok(false) => Err(CounterError::invalid_proof(format!(
                    "Proof does not attest {} from {} to {}",
                    binding.width, binding.submitter, binding.contract
                ))),
                Err(e) => Err(CounterError::invalid_proof(format!("{e:#}"))),
            })
        })
        .await??;

        let handle = self
            .registry
            .register(input.ciphertext, input.width, input.contract)
            .await?;
        debug!("Verified input {:?} from {}", handle, input.submitter);
        Ok(handle)
    }
}
