// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Addr;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use fhc_events::{CounterEvent, EventBus, GetHistory};
use fhc_fhe::SharedRng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Well known development keys (anvil accounts 0..=3)
const DEV_KEYS: [&str; 4] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    "0x7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
];

pub fn dev_signer(index: usize) -> Result<PrivateKeySigner> {
    let key = DEV_KEYS
        .get(index)
        .ok_or_else(|| anyhow!("No dev key at index {index}"))?;
    Ok(key.parse()?)
}

pub fn alice() -> Result<PrivateKeySigner> {
    dev_signer(0)
}

pub fn bob() -> Result<PrivateKeySigner> {
    dev_signer(1)
}

pub fn seeded_rng(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed)))
}

/// Events of one variant from the bus history, in publication order
pub async fn events_named(
    bus: &Addr<EventBus<CounterEvent>>,
    variant: &str,
) -> Result<Vec<CounterEvent>> {
    Ok(bus
        .send(GetHistory::<CounterEvent>::new())
        .await?
        .into_iter()
        .filter(|evt| evt.variant_name() == variant)
        .collect())
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
