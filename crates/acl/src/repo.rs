// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhc_config::StoreKeys;
use fhc_data::{Repositories, Repository};
use fhc_events::{AclGrant, CiphertextHandle};
use std::collections::BTreeSet;

pub trait AclRepositoryFactory {
    fn acl(&self, handle: &CiphertextHandle) -> Repository<BTreeSet<AclGrant>>;
}

impl AclRepositoryFactory for Repositories {
    fn acl(&self, handle: &CiphertextHandle) -> Repository<BTreeSet<AclGrant>> {
        Repository::new(self.store.scope(StoreKeys::acl(handle)))
    }
}
