// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::seeded_rng;
use actix::{Actor, Addr};
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use fhc_acl::Acl;
use fhc_config::FheConfig;
use fhc_data::{DataStore, InMemStore, Repositories};
use fhc_events::{CounterEvent, EventBus, EventBusConfig};
use fhc_fhe::{BfvProvider, CiphertextRegistry, Fhe, FheClient, FheProvider, InputAttestor};
use std::sync::Arc;

pub const TEST_CHAIN_ID: u64 = 31337;

/// Everything below the contract layer, backed by an in memory store
pub struct CryptoFixture {
    pub bus: Addr<EventBus<CounterEvent>>,
    pub store: DataStore,
    pub repositories: Repositories,
    pub fhe: Fhe,
    pub attestor: InputAttestor,
    pub provider: Arc<dyn FheProvider>,
    pub registry: CiphertextRegistry,
    pub client: FheClient,
    pub acl: Addr<Acl>,
}

impl CryptoFixture {
    pub async fn new() -> Result<Self> {
        Self::with_seed(0).await
    }

    pub async fn with_seed(seed: u64) -> Result<Self> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig {
            capture_history: true,
            deduplicate: false,
        })
        .start();
        let store = DataStore::from(&InMemStore::new(true).start());
        let repositories: Repositories = store.clone().into();

        let rng = seeded_rng(seed);
        let fhe = Fhe::generate(&FheConfig::default(), rng.clone())?;
        let attestor = InputAttestor::new(PrivateKeySigner::random(), fhe.params.clone());
        let provider: Arc<dyn FheProvider> =
            Arc::new(BfvProvider::new(fhe.clone(), [attestor.address()], 1));
        let registry = CiphertextRegistry::new(repositories.clone(), TEST_CHAIN_ID);
        let client = FheClient::new(
            fhe.params.clone(),
            &fhe.public_key_bytes(),
            vec![attestor.clone()],
            TEST_CHAIN_ID,
            rng,
        )?;
        let acl = Acl::attach(&bus, &repositories);

        Ok(Self {
            bus,
            store,
            repositories,
            fhe,
            attestor,
            provider,
            registry,
            client,
            acl,
        })
    }
}
