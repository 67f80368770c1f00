// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use anyhow::{anyhow, bail, Result};
use fhc_utils::short_hex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Version byte written into every minted handle.
pub const HANDLE_VERSION: u8 = 1;

const TYPE_BYTE: usize = 30;
const VERSION_BYTE: usize = 31;

/// Encrypted unsigned integer widths. The discriminant is the type id carried inside handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum IntegerWidth {
    Uint8 = 2,
    Uint16 = 3,
    Uint32 = 4,
}

impl IntegerWidth {
    pub fn bits(&self) -> u32 {
        match self {
            IntegerWidth::Uint8 => 8,
            IntegerWidth::Uint16 => 16,
            IntegerWidth::Uint32 => 32,
        }
    }

    pub fn type_id(&self) -> u8 {
        *self as u8
    }

    pub fn from_type_id(id: u8) -> Option<Self> {
        match id {
            2 => Some(IntegerWidth::Uint8),
            3 => Some(IntegerWidth::Uint16),
            4 => Some(IntegerWidth::Uint32),
            _ => None,
        }
    }

    pub fn max_value(&self) -> u64 {
        (1u64 << self.bits()) - 1
    }

    /// Reduce a value into this width with modular wraparound.
    pub fn reduce(&self, value: u64) -> u64 {
        value & self.max_value()
    }
}

impl fmt::Display for IntegerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "euint{}", self.bits())
    }
}

impl FromStr for IntegerWidth {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('e') {
            "uint8" | "u8" => Ok(IntegerWidth::Uint8),
            "uint16" | "u16" => Ok(IntegerWidth::Uint16),
            "uint32" | "u32" => Ok(IntegerWidth::Uint32),
            other => Err(anyhow!("Unknown integer width '{other}'")),
        }
    }
}

/// Opaque reference to an encrypted value.
///
/// The all zero value is reserved for the uninitialized sentinel. Minted handles always carry a
/// non zero type id in byte 30 so they can never collide with it. There is deliberately no
/// conversion from a handle to any integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct CiphertextHandle([u8; 32]);

impl CiphertextHandle {
    pub const UNINITIALIZED: CiphertextHandle = CiphertextHandle([0u8; 32]);

    /// Mint the handle for a ciphertext bound to a contract on a chain.
    pub fn derive(ciphertext: &[u8], width: IntegerWidth, contract: &Address, chain_id: u64) -> Self {
        let encoded = (
            keccak256(ciphertext),
            U256::from(width.type_id()),
            *contract,
            U256::from(chain_id),
            U256::from(HANDLE_VERSION),
        )
            .abi_encode_packed();
        let mut bytes: [u8; 32] = keccak256(&encoded).into();
        bytes[TYPE_BYTE] = width.type_id();
        bytes[VERSION_BYTE] = HANDLE_VERSION;
        Self(bytes)
    }

    pub fn is_uninitialized(&self) -> bool {
        *self == Self::UNINITIALIZED
    }

    /// Width encoded in the handle. `None` for the sentinel or foreign bytes.
    pub fn width(&self) -> Option<IntegerWidth> {
        IntegerWidth::from_type_id(self.0[TYPE_BYTE])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<CiphertextHandle> for B256 {
    fn from(value: CiphertextHandle) -> Self {
        B256::from(value.0)
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uninitialized() {
            return write!(f, "CiphertextHandle(<uninitialized>)");
        }
        write!(f, "CiphertextHandle({})", short_hex(&self.0))
    }
}

impl FromStr for CiphertextHandle {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let raw = hex::decode(s.trim_start_matches("0x"))?;
        let Ok(bytes) = <[u8; 32]>::try_from(raw.as_slice()) else {
            bail!("A handle must be 32 bytes, got {}", raw.len());
        };
        Ok(Self(bytes))
    }
}

/// A named slot value. Either the sentinel or exactly one committed handle of `width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptedSlot {
    pub handle: CiphertextHandle,
    pub width: IntegerWidth,
}

impl EncryptedSlot {
    pub fn uninitialized(width: IntegerWidth) -> Self {
        Self {
            handle: CiphertextHandle::UNINITIALIZED,
            width,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        self.handle.is_uninitialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contract() -> Address {
        Address::repeat_byte(0x11)
    }

    #[test]
    fn width_is_readable_from_handle() {
        let handle = CiphertextHandle::derive(b"ct", IntegerWidth::Uint16, &contract(), 1);
        assert_eq!(handle.width(), Some(IntegerWidth::Uint16));
        assert_eq!(handle.as_bytes()[31], HANDLE_VERSION);
        assert_eq!(CiphertextHandle::UNINITIALIZED.width(), None);
    }

    #[test]
    fn binding_fields_change_the_handle() {
        let base = CiphertextHandle::derive(b"ct", IntegerWidth::Uint32, &contract(), 1);
        let other_contract =
            CiphertextHandle::derive(b"ct", IntegerWidth::Uint32, &Address::repeat_byte(2), 1);
        let other_chain = CiphertextHandle::derive(b"ct", IntegerWidth::Uint32, &contract(), 2);
        let other_ct = CiphertextHandle::derive(b"cu", IntegerWidth::Uint32, &contract(), 1);
        assert_ne!(base, other_contract);
        assert_ne!(base, other_chain);
        assert_ne!(base, other_ct);
    }

    #[test]
    fn parses_its_own_display() -> Result<()> {
        let handle = CiphertextHandle::derive(b"ct", IntegerWidth::Uint8, &contract(), 7);
        let parsed: CiphertextHandle = handle.to_string().parse()?;
        assert_eq!(parsed, handle);
        assert!("0x1234".parse::<CiphertextHandle>().is_err());
        Ok(())
    }

    #[test]
    fn reduce_wraps_per_width() {
        assert_eq!(IntegerWidth::Uint8.reduce(256 + 3), 3);
        assert_eq!(IntegerWidth::Uint16.reduce(u64::MAX), 0xffff);
        assert_eq!(IntegerWidth::Uint32.reduce(1 << 32), 0);
    }

    #[test]
    fn width_names_parse() -> Result<()> {
        assert_eq!("euint32".parse::<IntegerWidth>()?, IntegerWidth::Uint32);
        assert_eq!("u8".parse::<IntegerWidth>()?, IntegerWidth::Uint8);
        assert!("uint64".parse::<IntegerWidth>().is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn minted_handles_are_never_the_sentinel(ct in proptest::collection::vec(any::<u8>(), 0..64), chain in any::<u64>()) {
            let handle = CiphertextHandle::derive(&ct, IntegerWidth::Uint32, &contract(), chain);
            prop_assert!(!handle.is_uninitialized());
            prop_assert_eq!(handle.width(), Some(IntegerWidth::Uint32));
        }
    }
}
