// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, Signature, B256, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol_types::SolValue;
use anyhow::{anyhow, bail, Context, Result};
use fhc_events::{EncryptedInput, IntegerWidth};
use fhe::bfv::{BfvParameters, Ciphertext};
use fhe_traits::DeserializeParametrized;
use std::sync::Arc;

pub const INPUT_PROOF_VERSION: u8 = 1;
const HEADER_LEN: usize = 2 + 32;
const SIGNATURE_LEN: usize = 65;

/// Attestations over one ciphertext.
///
/// Wire format: `version (1) | count (1) | keccak256(ciphertext) (32) | count * signature (65)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputProof {
    pub ciphertext_digest: B256,
    pub signatures: Vec<Signature>,
}

impl InputProof {
    pub fn new(ciphertext_digest: B256, signatures: Vec<Signature>) -> Result<Self> {
        if signatures.is_empty() {
            bail!("An input proof needs at least one attestation");
        }
        if signatures.len() > u8::MAX as usize {
            bail!("Too many attestations ({})", signatures.len());
        }
        Ok(Self {
            ciphertext_digest,
            signatures,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.signatures.len() * SIGNATURE_LEN);
        bytes.push(INPUT_PROOF_VERSION);
        bytes.push(self.signatures.len() as u8);
        bytes.extend_from_slice(self.ciphertext_digest.as_slice());
        for sig in &self.signatures {
            bytes.extend_from_slice(&sig.as_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            bail!("Proof is {} bytes, shorter than its header", bytes.len());
        }
        if bytes[0] != INPUT_PROOF_VERSION {
            bail!("Unsupported proof version {}", bytes[0]);
        }
        let count = bytes[1] as usize;
        let body = &bytes[HEADER_LEN..];
        if body.len() != count * SIGNATURE_LEN {
            bail!(
                "Proof declares {count} attestations but carries {} signature bytes",
                body.len()
            );
        }
        let ciphertext_digest = B256::from_slice(&bytes[2..HEADER_LEN]);
        let signatures = body
            .chunks_exact(SIGNATURE_LEN)
            .map(|chunk| {
                Signature::try_from(chunk).map_err(|e| anyhow!("Invalid attestation: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;
        InputProof::new(ciphertext_digest, signatures)
    }
}

/// The context an input is bound to. Attestors sign
/// `keccak256(abi.encodePacked(keccak256(ct), typeId, submitter, contract, chainId))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputBinding {
    pub width: IntegerWidth,
    pub submitter: Address,
    pub contract: Address,
    pub chain_id: u64,
}

impl InputBinding {
    pub fn new(width: IntegerWidth, submitter: Address, contract: Address, chain_id: u64) -> Self {
        Self {
            width,
            submitter,
            contract,
            chain_id,
        }
    }

    pub fn for_input(input: &EncryptedInput, chain_id: u64) -> Self {
        Self::new(input.width, input.submitter, input.contract, chain_id)
    }

    pub fn digest(&self, ciphertext_digest: B256) -> B256 {
        let encoded = (
            ciphertext_digest,
            U256::from(self.width.type_id()),
            self.submitter,
            self.contract,
            U256::from(self.chain_id),
        )
            .abi_encode_packed();
        keccak256(&encoded)
    }
}

/// Signs bindings for ciphertexts that are well formed under the node parameters
#[derive(Clone)]
pub struct InputAttestor {
    signer: PrivateKeySigner,
    params: Arc<BfvParameters>,
}

impl InputAttestor {
    pub fn new(signer: PrivateKeySigner, params: Arc<BfvParameters>) -> Self {
        Self { signer, params }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn attest(&self, ciphertext: &[u8], binding: &InputBinding) -> Result<Signature> {
        Ciphertext::from_bytes(ciphertext, &self.params)
            .context("Refusing to attest a malformed ciphertext")?;
        let digest = binding.digest(keccak256(ciphertext));
        self.signer
            .sign_message_sync(digest.as_slice())
            .map_err(|e| anyhow!("Failed to sign attestation: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_params, Fhe, SharedRng};
    use fhc_config::FheConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::sync::Mutex;

    fn binding() -> InputBinding {
        InputBinding::new(
            IntegerWidth::Uint32,
            Address::repeat_byte(0xaa),
            Address::repeat_byte(0xcc),
            31337,
        )
    }

    fn signed_proof() -> Result<(Vec<u8>, InputProof, Address)> {
        let rng: SharedRng = Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(7)));
        let fhe = Fhe::generate(&FheConfig::default(), rng)?;
        let ct = fhe.encrypt(1)?;
        let attestor = InputAttestor::new(PrivateKeySigner::random(), fhe.params.clone());
        let sig = attestor.attest(&ct, &binding())?;
        Ok((ct.clone(), InputProof::new(keccak256(&ct), vec![sig])?, attestor.address()))
    }

    #[test]
    fn wire_format_parses_back() -> Result<()> {
        let (_, proof, _) = signed_proof()?;
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + SIGNATURE_LEN);
        assert_eq!(bytes[0], INPUT_PROOF_VERSION);
        assert_eq!(InputProof::from_bytes(&bytes)?, proof);
        Ok(())
    }

    #[test]
    fn structural_errors_are_reported() -> Result<()> {
        let (_, proof, _) = signed_proof()?;
        let bytes = proof.to_bytes();

        assert!(InputProof::from_bytes(&bytes[..10]).is_err());
        assert!(InputProof::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 9;
        assert!(InputProof::from_bytes(&wrong_version).is_err());

        let mut no_sigs = bytes[..HEADER_LEN].to_vec();
        no_sigs[1] = 0;
        assert!(InputProof::from_bytes(&no_sigs).is_err());
        Ok(())
    }

    #[test]
    fn signature_recovers_attestor_for_the_same_binding_only() -> Result<()> {
        let (ct, proof, attestor) = signed_proof()?;
        let sig = &proof.signatures[0];
        let digest = binding().digest(keccak256(&ct));
        assert_eq!(sig.recover_address_from_msg(digest.as_slice())?, attestor);

        let mut other = binding();
        other.contract = Address::repeat_byte(0xdd);
        let other_digest = other.digest(keccak256(&ct));
        assert_ne!(sig.recover_address_from_msg(other_digest.as_slice())?, attestor);
        Ok(())
    }

    #[test]
    fn attestor_refuses_garbage() -> Result<()> {
        let params = build_params(&FheConfig::default())?;
        let attestor = InputAttestor::new(PrivateKeySigner::random(), params);
        assert!(attestor.attest(&[0u8; 12], &binding()).is_err());
        Ok(())
    }
}
