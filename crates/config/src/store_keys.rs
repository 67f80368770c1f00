// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use fhc_events::CiphertextHandle;

pub struct StoreKeys;

impl StoreKeys {
    pub fn fhe() -> String {
        String::from("//fhe")
    }

    pub fn attestor() -> String {
        String::from("//attestor")
    }

    pub fn acl(handle: &CiphertextHandle) -> String {
        format!("//acl/{handle}")
    }

    pub fn ciphertext(handle: &CiphertextHandle) -> String {
        format!("//ciphertexts/{handle}")
    }

    pub fn slot(contract: &Address, name: &str) -> String {
        format!("//contracts/{contract}/slots/{name}")
    }
}
