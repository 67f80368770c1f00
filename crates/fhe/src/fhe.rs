// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use fhc_config::FheConfig;
use fhc_data::{FromSnapshotWithParams, Snapshot};
use fhe::bfv::{
    BfvParameters, BfvParametersBuilder, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey,
};
use fhe_traits::{
    Deserialize, DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter,
    Serialize,
};
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

/// Build the BFV parameter set described by `config`
pub fn build_params(config: &FheConfig) -> Result<Arc<BfvParameters>> {
    BfvParametersBuilder::new()
        .set_degree(config.degree)
        .set_plaintext_modulus(config.plaintext_modulus)
        .set_moduli(&config.moduli)
        .build_arc()
        .context("Invalid BFV parameters")
}

pub fn decode_params(bytes: &[u8]) -> Result<Arc<BfvParameters>> {
    Ok(Arc::new(
        BfvParameters::try_deserialize(bytes).context("Could not decode BFV parameters")?,
    ))
}

pub(crate) fn lock_rng(rng: &SharedRng) -> Result<MutexGuard<'_, ChaCha20Rng>> {
    rng.lock().map_err(|_| anyhow!("Rng mutex poisoned"))
}

/// Fhe library adaptor holding the node's key pair.
///
/// Every value is encoded into the constant coefficient of a polynomial plaintext so additions
/// wrap modulo the plaintext modulus. Callers reduce to the integer width after decryption.
#[derive(Clone)]
pub struct Fhe {
    pub params: Arc<BfvParameters>,
    secret_key: Arc<SecretKey>,
    public_key: Arc<PublicKey>,
    rng: SharedRng,
}

impl Fhe {
    pub fn new(
        params: Arc<BfvParameters>,
        secret_key: SecretKey,
        public_key: PublicKey,
        rng: SharedRng,
    ) -> Self {
        Self {
            params,
            secret_key: Arc::new(secret_key),
            public_key: Arc::new(public_key),
            rng,
        }
    }

    /// Generate a fresh key pair under the configured parameters
    pub fn generate(config: &FheConfig, rng: SharedRng) -> Result<Self> {
        let params = build_params(config)?;
        let (secret_key, public_key) = {
            let mut guard = lock_rng(&rng)?;
            let sk = SecretKey::random(&params, &mut *guard);
            let pk = PublicKey::new(&sk, &mut *guard);
            (sk, pk)
        };
        Ok(Fhe::new(params, secret_key, public_key, rng))
    }

    pub fn params_bytes(&self) -> Vec<u8> {
        self.params.to_bytes()
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes()
    }

    pub fn parse_ciphertext(&self, bytes: &[u8]) -> Result<Ciphertext> {
        if bytes.is_empty() {
            bail!("Ciphertext is empty");
        }
        Ciphertext::from_bytes(bytes, &self.params).context("Error deserializing ciphertext")
    }

    pub fn encrypt(&self, value: u64) -> Result<Vec<u8>> {
        let ct = encrypt_value(&self.params, &self.public_key, value, &self.rng)?;
        Ok(ct.to_bytes())
    }

    pub fn add(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        let a = self.parse_ciphertext(a)?;
        let b = self.parse_ciphertext(b)?;
        Ok((&a + &b).to_bytes())
    }

    pub fn sub(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
        let a = self.parse_ciphertext(a)?;
        let b = self.parse_ciphertext(b)?;
        Ok((&a - &b).to_bytes())
    }

    /// Decrypt to the raw constant coefficient
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<u64> {
        let ct = self.parse_ciphertext(ciphertext)?;
        let pt = self
            .secret_key
            .try_decrypt(&ct)
            .context("Could not decrypt ciphertext")?;
        let decoded = Vec::<u64>::try_decode(&pt, Encoding::poly())?;
        decoded
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Decrypted plaintext has no coefficients"))
    }
}

pub(crate) fn encrypt_value(
    params: &Arc<BfvParameters>,
    public_key: &PublicKey,
    value: u64,
    rng: &SharedRng,
) -> Result<Ciphertext> {
    let input = vec![value];
    let pt = Plaintext::try_encode(&input, Encoding::poly(), params)?;
    let ct = public_key.try_encrypt(&pt, &mut *lock_rng(rng)?)?;
    Ok(ct)
}

impl Snapshot for Fhe {
    type Snapshot = FheSnapshot;
    fn snapshot(&self) -> Result<Self::Snapshot> {
        Ok(FheSnapshot {
            params: self.params.to_bytes(),
            secret_key: SecretKeySerializer::to_bytes(&self.secret_key)?,
            public_key: self.public_key.to_bytes(),
        })
    }
}

#[async_trait]
impl FromSnapshotWithParams for Fhe {
    type Params = SharedRng;
    async fn from_snapshot(rng: SharedRng, snapshot: FheSnapshot) -> Result<Self> {
        let params = decode_params(&snapshot.params)?;
        let secret_key = SecretKeySerializer::from_bytes(&snapshot.secret_key, &params)?;
        let public_key = PublicKey::from_bytes(&snapshot.public_key, &params)
            .context("Could not decode public key")?;
        Ok(Fhe::new(params, secret_key, public_key, rng))
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct FheSnapshot {
    params: Vec<u8>,
    secret_key: Vec<u8>,
    public_key: Vec<u8>,
}

struct SecretKeySerializer;

#[derive(serde::Serialize, serde::Deserialize)]
struct SecretKeyData {
    coeffs: Box<[i64]>,
}

impl SecretKeySerializer {
    fn to_bytes(inner: &SecretKey) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&SecretKeyData {
            coeffs: inner.coeffs.clone(),
        })?)
    }

    fn from_bytes(bytes: &[u8], params: &Arc<BfvParameters>) -> Result<SecretKey> {
        let SecretKeyData { coeffs } = bincode::deserialize(bytes)?;
        Ok(SecretKey::new(coeffs.to_vec(), params))
    }
}
