// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CiphertextHandle;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a grantee came to hold a grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AclScope {
    /// The owning contract, for its own later reads of the value
    ContractInternal,
    /// A specific external account
    External,
}

impl fmt::Display for AclScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclScope::ContractInternal => write!(f, "contract"),
            AclScope::External => write!(f, "external"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AclGrant {
    pub grantee: Address,
    pub scope: AclScope,
}

impl AclGrant {
    pub fn contract(address: Address) -> Self {
        Self {
            grantee: address,
            scope: AclScope::ContractInternal,
        }
    }

    pub fn external(address: Address) -> Self {
        Self {
            grantee: address,
            scope: AclScope::External,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AclEntry {
    pub handle: CiphertextHandle,
    pub grantee: Address,
    pub scope: AclScope,
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.handle, self.grantee, self.scope)
    }
}
