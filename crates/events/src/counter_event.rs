// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AclScope, CiphertextHandle, CounterError, ErrorEvent, Event, EventId};
use actix::Message;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A slot moved to a new committed handle
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleCommitted {
    pub contract: Address,
    pub slot: String,
    pub handle: CiphertextHandle,
}

impl Display for HandleCommitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} = {:?}", self.contract, self.slot, self.handle)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGranted {
    pub handle: CiphertextHandle,
    pub grantee: Address,
    pub scope: AclScope,
}

impl Display for AccessGranted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {} ({})", self.handle, self.grantee, self.scope)
    }
}

/// An entry point refused a submission before touching state
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRejected {
    pub contract: Address,
    pub submitter: Address,
    pub error: CounterError,
}

impl Display for InputRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}: {}", self.contract, self.submitter, self.error)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptionServed {
    pub handle: CiphertextHandle,
    pub requester: Address,
}

impl Display for DecryptionServed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} for {}", self.handle, self.requester)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptionDenied {
    pub handle: CiphertextHandle,
    pub requester: Address,
    pub error: CounterError,
}

impl Display for DecryptionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} for {}: {}", self.handle, self.requester, self.error)
    }
}

/// Component that reported an infrastructure fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultSource {
    Data,
    Fhe,
    Acl,
    Counter,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterFault {
    pub source: FaultSource,
    pub error: CounterError,
}

impl Display for CounterFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.source, self.error)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shutdown;

impl Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shutdown")
    }
}

macro_rules! counter_events {
    ($($variant:ident),* $(,)?) => {
        #[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[rtype(result = "()")]
        pub enum CounterEvent {
            $($variant { id: EventId, data: $variant },)*
        }

        impl CounterEvent {
            pub fn get_id(&self) -> EventId {
                match self {
                    $(CounterEvent::$variant { id, .. } => id.clone(),)*
                }
            }

            pub fn variant_name(&self) -> &'static str {
                match self {
                    $(CounterEvent::$variant { .. } => stringify!($variant),)*
                }
            }

            pub fn data_string(&self) -> String {
                match self {
                    $(CounterEvent::$variant { data, .. } => data.to_string(),)*
                }
            }
        }

        $(
            impl From<$variant> for CounterEvent {
                fn from(data: $variant) -> Self {
                    CounterEvent::$variant {
                        id: EventId::hash(data.clone()),
                        data,
                    }
                }
            }
        )*
    };
}

counter_events!(
    HandleCommitted,
    AccessGranted,
    InputRejected,
    DecryptionServed,
    DecryptionDenied,
    CounterFault,
    Shutdown,
);

impl CounterEvent {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Handle the event refers to, if any
    pub fn handle(&self) -> Option<CiphertextHandle> {
        match self {
            CounterEvent::HandleCommitted { data, .. } => Some(data.handle),
            CounterEvent::AccessGranted { data, .. } => Some(data.handle),
            CounterEvent::DecryptionServed { data, .. } => Some(data.handle),
            CounterEvent::DecryptionDenied { data, .. } => Some(data.handle),
            _ => None,
        }
    }
}

impl Display for CounterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.variant_name(), self.data_string())
    }
}

impl Event for CounterEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        self.variant_name().to_string()
    }

    fn event_id(&self) -> Self::Id {
        self.get_id()
    }
}

impl ErrorEvent for CounterEvent {
    type Error = CounterError;
    type ErrorType = FaultSource;

    fn as_error(&self) -> Option<&Self::Error> {
        match self {
            CounterEvent::InputRejected { data, .. } => Some(&data.error),
            CounterEvent::DecryptionDenied { data, .. } => Some(&data.error),
            CounterEvent::CounterFault { data, .. } => Some(&data.error),
            _ => None,
        }
    }

    fn from_error(err_type: Self::ErrorType, error: anyhow::Error) -> Self {
        CounterFault {
            source: err_type,
            error: error.into(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntegerWidth;

    #[test]
    fn event_type_is_the_variant_name() {
        let evt: CounterEvent = DecryptionServed {
            handle: CiphertextHandle::derive(b"x", IntegerWidth::Uint8, &Address::ZERO, 1),
            requester: Address::ZERO,
        }
        .into();
        assert_eq!(evt.event_type(), "DecryptionServed");
        assert!(evt.as_error().is_none());
        assert!(evt.handle().is_some());
    }

    #[test]
    fn bytes_round_trip() -> anyhow::Result<()> {
        let evt: CounterEvent = InputRejected {
            contract: Address::repeat_byte(1),
            submitter: Address::repeat_byte(2),
            error: CounterError::invalid_proof("digest mismatch"),
        }
        .into();
        assert_eq!(CounterEvent::from_bytes(&evt.to_bytes()?)?, evt);
        assert!(matches!(evt.as_error(), Some(CounterError::InvalidProof(_))));
        Ok(())
    }

    #[test]
    fn faults_carry_internal_errors() {
        let evt = CounterEvent::from_error(FaultSource::Data, anyhow::anyhow!("io"));
        assert_eq!(
            evt.as_error(),
            Some(&CounterError::Internal("io".to_string()))
        );
    }
}
