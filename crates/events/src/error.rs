// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CiphertextHandle, IntegerWidth};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterError {
    /// Structurally invalid ciphertext or proof. Nothing was changed.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// Well formed input whose proof does not attest to the stated binding.
    #[error("Invalid proof: {0}")]
    InvalidProof(String),
    /// Operands of different widths were combined. A logic fault in the caller.
    #[error("Width mismatch: expected {expected}, found {found}")]
    WidthMismatch {
        expected: IntegerWidth,
        found: IntegerWidth,
    },
    #[error("{requester} is not authorized to decrypt {handle}")]
    Unauthorized {
        handle: CiphertextHandle,
        requester: Address,
    },
    /// Provider failure or timeout. Safe to retry.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    /// Infrastructure failure such as a closed mailbox or a storage error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedInput,
    InvalidProof,
    WidthMismatch,
    Unauthorized,
    DecryptionFailed,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl CounterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CounterError::MalformedInput(_) => ErrorKind::MalformedInput,
            CounterError::InvalidProof(_) => ErrorKind::InvalidProof,
            CounterError::WidthMismatch { .. } => ErrorKind::WidthMismatch,
            CounterError::Unauthorized { .. } => ErrorKind::Unauthorized,
            CounterError::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
            CounterError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn malformed(msg: impl fmt::Display) -> Self {
        CounterError::MalformedInput(msg.to_string())
    }

    pub fn invalid_proof(msg: impl fmt::Display) -> Self {
        CounterError::InvalidProof(msg.to_string())
    }

    pub fn decryption_failed(msg: impl fmt::Display) -> Self {
        CounterError::DecryptionFailed(msg.to_string())
    }

    /// Whether resubmitting or retrying can succeed without a code or config change
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::WidthMismatch | ErrorKind::Internal
        )
    }
}

impl From<anyhow::Error> for CounterError {
    fn from(value: anyhow::Error) -> Self {
        CounterError::Internal(format!("{value:#}"))
    }
}

impl From<actix::MailboxError> for CounterError {
    fn from(value: actix::MailboxError) -> Self {
        CounterError::Internal(value.to_string())
    }
}

pub type CounterResult<T> = std::result::Result<T, CounterError>;
