// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub [u8; 32]);

impl EventId {
    pub fn hash<T: Hash>(value: T) -> Self {
        let mut std_hasher = DefaultHasher::new();
        value.hash(&mut std_hasher);
        let mut hasher = Sha256::new();
        hasher.update(std_hasher.finish().to_le_bytes());
        EventId(hasher.finalize().into())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bs58::encode(&self.0).into_string();
        write!(f, "evt:{}", &encoded[0..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_payloads_share_an_id() {
        assert_eq!(EventId::hash(("a", 1u8)), EventId::hash(("a", 1u8)));
        assert_ne!(EventId::hash(("a", 1u8)), EventId::hash(("a", 2u8)));
    }

    #[test]
    fn display_is_prefixed() {
        let id = EventId::hash(42u64).to_string();
        assert!(id.starts_with("evt:"));
        assert_eq!(id.len(), 12);
    }
}
