// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use fhc_config::FheConfig;
use fhc_data::{FromSnapshotWithParams, Repositories, Snapshot};
use fhc_fhe::{Fhe, FheRepositoryFactory, SharedRng};
use tracing::info;
use zeroize::Zeroizing;

/// Load the node key pair or generate and persist a new one
pub async fn load_or_generate_fhe(
    repositories: &Repositories,
    config: &FheConfig,
    rng: SharedRng,
) -> Result<Fhe> {
    let repo = repositories.fhe();
    if let Some(snapshot) = repo.read().await? {
        info!("Loaded FHE keys from store");
        return Fhe::from_snapshot(rng, snapshot).await;
    }
    info!("Generating FHE keys (degree {})", config.degree);
    let fhe = Fhe::generate(config, rng)?;
    repo.write_sync(&fhe.snapshot()?).await?;
    Ok(fhe)
}

/// Load the local attestor key or generate and persist a new one
pub async fn load_or_generate_attestor(repositories: &Repositories) -> Result<PrivateKeySigner> {
    let repo = repositories.attestor_key();
    if let Some(bytes) = repo.read().await? {
        let bytes = Zeroizing::new(bytes);
        return PrivateKeySigner::from_slice(&bytes)
            .map_err(|e| anyhow!("Stored attestor key is invalid: {e}"));
    }
    let signer = PrivateKeySigner::random();
    info!("Generated attestor {}", signer.address());
    let bytes = Zeroizing::new(signer.to_bytes().to_vec());
    repo.write_sync(&*bytes).await?;
    Ok(signer)
}
