// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr, Context, Handler, Message};
use fhc_events::{prelude::Event, CounterEvent, ErrorKind, EventBus, Subscribe};
use std::marker::PhantomData;
use tracing::{error, info, warn};

pub trait EventLogging: Event {
    fn log(&self, logger_name: &str);
}

pub struct SimpleLogger<E: EventLogging> {
    name: String,
    logged: usize,
    _p: PhantomData<E>,
}

impl<E: EventLogging> SimpleLogger<E> {
    pub fn attach(name: &str, bus: Addr<EventBus<E>>) -> Addr<Self> {
        let addr = Self {
            name: name.to_owned(),
            logged: 0,
            _p: PhantomData,
        }
        .start();
        bus.do_send(Subscribe::<E>::new("*", addr.clone().recipient()));
        info!(node=%name, "READY!");
        addr
    }
}

impl<E: EventLogging> Actor for SimpleLogger<E> {
    type Context = Context<Self>;
}

impl<E: EventLogging> Handler<E> for SimpleLogger<E> {
    type Result = ();

    fn handle(&mut self, msg: E, _: &mut Self::Context) -> Self::Result {
        self.logged += 1;
        msg.log(&self.name);
    }
}

/// Number of events logged so far
#[derive(Message)]
#[rtype(result = "usize")]
pub struct GetLoggedCount;

impl<E: EventLogging> Handler<GetLoggedCount> for SimpleLogger<E> {
    type Result = usize;

    fn handle(&mut self, _: GetLoggedCount, _: &mut Self::Context) -> Self::Result {
        self.logged
    }
}

impl EventLogging for CounterEvent {
    fn log(&self, logger_name: &str) {
        match self {
            CounterEvent::CounterFault { data, .. } => {
                error!(me = logger_name, evt = %self, source = ?data.source, "ERROR!")
            }
            CounterEvent::InputRejected { data, .. } => warn!(
                me = logger_name,
                evt = %self,
                kind = %data.error.kind(),
                "Input rejected"
            ),
            CounterEvent::DecryptionDenied { data, .. } => match data.error.kind() {
                ErrorKind::DecryptionFailed | ErrorKind::Internal => {
                    error!(me = logger_name, evt = %self, "Decryption failed")
                }
                kind => warn!(me = logger_name, evt = %self, kind = %kind, "Decryption denied"),
            },
            _ => info!(me = logger_name, evt = %self, "Event Broadcasted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use anyhow::Result;
    use fhc_events::{
        CiphertextHandle, CounterError, DecryptionServed, EventBusConfig, GetHistory,
        InputRejected,
    };

    #[actix::test]
    async fn logs_everything_on_the_bus() -> Result<()> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        let logger = SimpleLogger::<CounterEvent>::attach("test", bus.clone());
        // let the subscription land before publishing
        bus.send(GetHistory::<CounterEvent>::new()).await?;

        bus.send(CounterEvent::from(InputRejected {
            contract: Address::repeat_byte(1),
            submitter: Address::repeat_byte(2),
            error: CounterError::invalid_proof("wrong signer"),
        }))
        .await?;
        bus.send(CounterEvent::from(DecryptionServed {
            handle: CiphertextHandle::UNINITIALIZED,
            requester: Address::repeat_byte(2),
        }))
        .await?;

        assert_eq!(logger.send(GetLoggedCount).await?, 2);
        Ok(())
    }
}
