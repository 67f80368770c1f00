// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FheRepositoryFactory;
use alloy::primitives::Address;
use anyhow::Result;
use fhc_data::Repositories;
use fhc_events::{CiphertextHandle, IntegerWidth};
use fhc_utils::ArcBytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a handle resolves to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCiphertext {
    pub ciphertext: ArcBytes,
    pub width: IntegerWidth,
    pub contract: Address,
}

/// Maps handles to the ciphertexts they name.
///
/// Entries are immutable. The handle is derived from the ciphertext and its binding so
/// registering the same bytes twice yields the same handle and rewrites the same entry.
#[derive(Clone, Debug)]
pub struct CiphertextRegistry {
    repositories: Repositories,
    chain_id: u64,
}

impl CiphertextRegistry {
    pub fn new(repositories: Repositories, chain_id: u64) -> Self {
        Self {
            repositories,
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Mint a handle and persist the entry before returning it
    pub async fn register(
        &self,
        ciphertext: ArcBytes,
        width: IntegerWidth,
        contract: Address,
    ) -> Result<CiphertextHandle> {
        let handle = CiphertextHandle::derive(&ciphertext, width, &contract, self.chain_id);
        trace!("Registering {:?} for {}", handle, contract);
        self.repositories
            .ciphertext(&handle)
            .write_sync(&StoredCiphertext {
                ciphertext,
                width,
                contract,
            })
            .await?;
        Ok(handle)
    }

    pub async fn resolve(&self, handle: &CiphertextHandle) -> Result<Option<StoredCiphertext>> {
        if handle.is_uninitialized() {
            return Ok(None);
        }
        self.repositories.ciphertext(handle).read().await
    }

    pub async fn contains(&self, handle: &CiphertextHandle) -> Result<bool> {
        Ok(self.resolve(handle).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use fhc_data::{DataStore, GetLog, InMemStore};
    use std::collections::BTreeSet;

    fn registry() -> (CiphertextRegistry, actix::Addr<InMemStore>) {
        let addr = InMemStore::new(true).start();
        let store = DataStore::from(&addr);
        (CiphertextRegistry::new(store.into(), 31337), addr)
    }

    #[actix::test]
    async fn registers_and_resolves() -> Result<()> {
        let (registry, _) = registry();
        let contract = Address::repeat_byte(4);
        let ct = ArcBytes::from_bytes(&[1, 2, 3]);
        let handle = registry
            .register(ct.clone(), IntegerWidth::Uint32, contract)
            .await?;

        assert_eq!(handle.width(), Some(IntegerWidth::Uint32));
        let stored = registry.resolve(&handle).await?;
        assert_eq!(
            stored,
            Some(StoredCiphertext {
                ciphertext: ct,
                width: IntegerWidth::Uint32,
                contract,
            })
        );
        assert!(!registry.contains(&CiphertextHandle::UNINITIALIZED).await?);
        Ok(())
    }

    #[actix::test]
    async fn registering_twice_keeps_one_entry() -> Result<()> {
        let (registry, addr) = registry();
        let contract = Address::repeat_byte(4);
        let ct = ArcBytes::from_bytes(&[9; 16]);
        let first = registry
            .register(ct.clone(), IntegerWidth::Uint8, contract)
            .await?;
        let second = registry.register(ct, IntegerWidth::Uint8, contract).await?;
        assert_eq!(first, second);
        let keys: BTreeSet<_> = addr
            .send(GetLog)
            .await?
            .iter()
            .map(|op| op.key().clone())
            .collect();
        assert_eq!(keys.len(), 1);
        Ok(())
    }
}
