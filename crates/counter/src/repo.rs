// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use fhc_config::StoreKeys;
use fhc_data::{Repositories, Repository};
use fhc_events::EncryptedSlot;

pub trait SlotRepositoryFactory {
    fn slot(&self, contract: &Address, name: &str) -> Repository<EncryptedSlot>;
}

impl SlotRepositoryFactory for Repositories {
    fn slot(&self, contract: &Address, name: &str) -> Repository<EncryptedSlot> {
        Repository::new(self.store.scope(StoreKeys::slot(contract, name)))
    }
}
