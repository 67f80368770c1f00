// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;

/// Events carried by an [`EventBus`]
pub trait Event: Message<Result = ()> + Clone + Send + Sync + Unpin + 'static {
    type Id: Hash + Eq + Clone + Unpin;
    fn event_type(&self) -> String;
    fn event_id(&self) -> Self::Id;
}

/// Events that may carry a domain error
pub trait ErrorEvent: Event {
    type Error: Clone;
    type ErrorType;

    fn as_error(&self) -> Option<&Self::Error>;
    fn from_error(err_type: Self::ErrorType, error: anyhow::Error) -> Self;
}

pub struct EventBusConfig {
    pub capture_history: bool,
    pub deduplicate: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capture_history: true,
            deduplicate: true,
        }
    }
}

/// Local pub/sub hub. Components publish every observable transition here and listeners
/// subscribe by event type or with `"*"` for everything.
pub struct EventBus<E: Event> {
    config: EventBusConfig,
    history: Vec<E>,
    ids: HashSet<E::Id>,
    listeners: HashMap<String, Vec<Recipient<E>>>,
}

impl<E: Event> Actor for EventBus<E> {
    type Context = Context<Self>;
}

impl<E: Event> EventBus<E> {
    pub fn new(config: EventBusConfig) -> Self {
        EventBus {
            config,
            listeners: HashMap::new(),
            ids: HashSet::new(),
            history: vec![],
        }
    }

    fn record(&mut self, event: E) {
        if self.config.deduplicate {
            self.ids.insert(event.event_id());
        }
        if self.config.capture_history {
            self.history.push(event);
        }
    }

    fn is_duplicate(&self, event: &E) -> bool {
        self.config.deduplicate && self.ids.contains(&event.event_id())
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe<E: Event> {
    pub event_type: String,
    pub listener: Recipient<E>,
}

impl<E: Event> Subscribe<E> {
    pub fn new(event_type: impl Into<String>, listener: Recipient<E>) -> Self {
        Self {
            event_type: event_type.into(),
            listener,
        }
    }
}

impl<E: Event> Handler<Subscribe<E>> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, msg: Subscribe<E>, _: &mut Context<Self>) {
        self.listeners
            .entry(msg.event_type)
            .or_default()
            .push(msg.listener);
    }
}

#[derive(Message)]
#[rtype(result = "Vec<E>")]
pub struct GetHistory<E: Event>(PhantomData<E>);

impl<E: Event> GetHistory<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Event> Default for GetHistory<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Handler<GetHistory<E>> for EventBus<E> {
    type Result = Vec<E>;

    fn handle(&mut self, _: GetHistory<E>, _: &mut Context<Self>) -> Vec<E> {
        self.history.clone()
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct ResetHistory;

impl<E: Event> Handler<ResetHistory> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, _: ResetHistory, _: &mut Context<Self>) {
        self.history.clear()
    }
}

#[derive(Message)]
#[rtype(result = "Vec<E::Error>")]
pub struct GetErrors<E: ErrorEvent>(PhantomData<E>);

impl<E: ErrorEvent> GetErrors<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: ErrorEvent> Default for GetErrors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ErrorEvent> Handler<GetErrors<E>> for EventBus<E> {
    type Result = Vec<E::Error>;

    fn handle(&mut self, _: GetErrors<E>, _: &mut Context<Self>) -> Vec<E::Error> {
        self.history
            .iter()
            .filter_map(|evt| evt.as_error())
            .cloned()
            .collect()
    }
}

impl<E: Event> Handler<E> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, event: E, _: &mut Context<Self>) {
        if self.is_duplicate(&event) {
            return;
        }

        let kind = event.event_type();
        for key in ["*", kind.as_str()] {
            if let Some(listeners) = self.listeners.get(key) {
                for listener in listeners {
                    listener.do_send(event.clone())
                }
            }
        }

        self.record(event);
    }
}

/// Report infrastructure errors straight onto the bus
pub trait BusError<E: ErrorEvent> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error);
}

impl<E: ErrorEvent> BusError<E> for Addr<EventBus<E>> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error) {
        self.do_send(E::from_error(err_type, err))
    }
}

impl<E: ErrorEvent> BusError<E> for Recipient<E> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error) {
        self.do_send(E::from_error(err_type, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CiphertextHandle, CounterEvent, DecryptionServed, FaultSource, IntegerWidth};
    use alloy::primitives::Address;

    struct Collector(Vec<CounterEvent>);

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<CounterEvent> for Collector {
        type Result = ();
        fn handle(&mut self, msg: CounterEvent, _: &mut Self::Context) {
            self.0.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<CounterEvent>")]
    struct Collected;

    impl Handler<Collected> for Collector {
        type Result = Vec<CounterEvent>;
        fn handle(&mut self, _: Collected, _: &mut Self::Context) -> Self::Result {
            self.0.clone()
        }
    }

    fn served() -> CounterEvent {
        DecryptionServed {
            handle: CiphertextHandle::derive(b"a", IntegerWidth::Uint32, &Address::ZERO, 1),
            requester: Address::repeat_byte(3),
        }
        .into()
    }

    #[actix::test]
    async fn routes_by_type_and_wildcard() -> anyhow::Result<()> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        let all = Collector(vec![]).start();
        let faults = Collector(vec![]).start();
        bus.send(Subscribe::<CounterEvent>::new("*", all.clone().recipient())).await?;
        bus.send(Subscribe::<CounterEvent>::new("CounterFault", faults.clone().recipient()))
            .await?;

        bus.send(served()).await?;
        bus.err(FaultSource::Data, anyhow::anyhow!("disk"));
        let history = bus.send(GetHistory::<CounterEvent>::new()).await?;
        assert_eq!(history.len(), 2);

        assert_eq!(all.send(Collected).await?.len(), 2);
        assert_eq!(faults.send(Collected).await?.len(), 1);

        let errors = bus.send(GetErrors::<CounterEvent>::new()).await?;
        assert_eq!(errors.len(), 1);
        Ok(())
    }

    #[actix::test]
    async fn deduplicates_when_configured() -> anyhow::Result<()> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        bus.send(served()).await?;
        bus.send(served()).await?;
        assert_eq!(bus.send(GetHistory::<CounterEvent>::new()).await?.len(), 1);

        let bus = EventBus::<CounterEvent>::new(EventBusConfig {
            capture_history: true,
            deduplicate: false,
        })
        .start();
        bus.send(served()).await?;
        bus.send(served()).await?;
        assert_eq!(bus.send(GetHistory::<CounterEvent>::new()).await?.len(), 2);

        bus.send(ResetHistory).await?;
        assert!(bus.send(GetHistory::<CounterEvent>::new()).await?.is_empty());
        Ok(())
    }
}
