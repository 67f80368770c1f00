// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FheSnapshot, StoredCiphertext};
use fhc_config::StoreKeys;
use fhc_data::{Repositories, Repository};
use fhc_events::CiphertextHandle;

pub trait FheRepositoryFactory {
    fn fhe(&self) -> Repository<FheSnapshot>;
    /// Raw secp256k1 key of the local input attestor
    fn attestor_key(&self) -> Repository<Vec<u8>>;
    fn ciphertext(&self, handle: &CiphertextHandle) -> Repository<StoredCiphertext>;
}

impl FheRepositoryFactory for Repositories {
    fn fhe(&self) -> Repository<FheSnapshot> {
        Repository::new(self.store.scope(StoreKeys::fhe()))
    }

    fn attestor_key(&self) -> Repository<Vec<u8>> {
        Repository::new(self.store.scope(StoreKeys::attestor()))
    }

    fn ciphertext(&self, handle: &CiphertextHandle) -> Repository<StoredCiphertext> {
        Repository::new(self.store.scope(StoreKeys::ciphertext(handle)))
    }
}
