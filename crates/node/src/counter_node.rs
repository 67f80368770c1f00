// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Addr;
use alloy::primitives::Address;
use anyhow::Result;
use fhc_acl::Acl;
use fhc_counter::{FheCounter, ProofVerifier, StoreContext};
use fhc_data::DataStore;
use fhc_events::{CounterEvent, EventBus, GetHistory, Shutdown};
use fhc_fhe::{CiphertextRegistry, FheClient, FheProvider, InputAttestor};
use fhc_oracle::DecryptionOracle;
use std::sync::Arc;

/// A running node. Cloning shares the same actors.
#[derive(Clone)]
pub struct CounterNode {
    pub(crate) attestor: InputAttestor,
    pub(crate) bus: Addr<EventBus<CounterEvent>>,
    pub(crate) client: FheClient,
    pub(crate) oracle: DecryptionOracle,
    pub(crate) provider: Arc<dyn FheProvider>,
    pub(crate) registry: CiphertextRegistry,
    pub(crate) store: DataStore,
    pub(crate) store_context: StoreContext,
    pub(crate) verifier: ProofVerifier,
    pub(crate) acl: Addr<Acl>,
}

impl CounterNode {
    /// Deploy a counter at `address`, picking up any state already stored for it. Counters
    /// deployed twice at one address share the same slot.
    pub async fn deploy_counter(&self, address: Address) -> Result<FheCounter> {
        FheCounter::deploy(address, self.verifier.clone(), self.store_context.clone()).await
    }

    pub fn bus(&self) -> &Addr<EventBus<CounterEvent>> {
        &self.bus
    }

    pub fn client(&self) -> &FheClient {
        &self.client
    }

    pub fn oracle(&self) -> &DecryptionOracle {
        &self.oracle
    }

    pub fn provider(&self) -> Arc<dyn FheProvider> {
        self.provider.clone()
    }

    pub fn registry(&self) -> &CiphertextRegistry {
        &self.registry
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn acl(&self) -> &Addr<Acl> {
        &self.acl
    }

    pub fn attestor_address(&self) -> Address {
        self.attestor.address()
    }

    /// Events seen so far. Empty unless the node was built with history.
    pub async fn history(&self) -> Result<Vec<CounterEvent>> {
        Ok(self.bus.send(GetHistory::<CounterEvent>::new()).await?)
    }

    /// Tell persistent components to stop
    pub async fn shutdown(&self) -> Result<()> {
        self.bus.send(CounterEvent::from(Shutdown)).await?;
        Ok(())
    }
}
