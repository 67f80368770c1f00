// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, Insert, InsertSync, Remove, SledDb};
use actix::{Actor, ActorContext, Addr, Handler};
use anyhow::{anyhow, Result};
use fhc_events::{prelude::*, CounterEvent, EventBus, FaultSource, Subscribe};
use std::path::Path;
use tracing::{error, info};

pub struct SledStore {
    db: Option<SledDb>,
    bus: Addr<EventBus<CounterEvent>>,
}

impl Actor for SledStore {
    type Context = actix::Context<Self>;
}

impl SledStore {
    pub fn new(bus: &Addr<EventBus<CounterEvent>>, path: &Path) -> Result<Addr<Self>> {
        info!("Starting SledStore with {:?}", path);
        let db = SledDb::new(path, "datastore")?;

        let store = Self {
            db: Some(db),
            bus: bus.clone(),
        }
        .start();

        bus.do_send(Subscribe::<CounterEvent>::new("Shutdown", store.clone().recipient()));

        Ok(store)
    }
}

impl Handler<Insert> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Insert, _: &mut Self::Context) -> Self::Result {
        if let Some(ref mut db) = &mut self.db {
            if let Err(err) = db.insert(event) {
                self.bus.err(FaultSource::Data, err)
            }
        }
    }
}

impl Handler<InsertSync> for SledStore {
    type Result = Result<()>;

    fn handle(&mut self, event: InsertSync, _: &mut Self::Context) -> Self::Result {
        let Some(ref mut db) = &mut self.db else {
            return Err(anyhow!("Attempt to write to a closed db"));
        };
        db.insert(event.into())?;
        db.flush()
    }
}

impl Handler<Remove> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Remove, _: &mut Self::Context) -> Self::Result {
        if let Some(ref mut db) = &mut self.db {
            if let Err(err) = db.remove(event) {
                self.bus.err(FaultSource::Data, err)
            }
        }
    }
}

impl Handler<Get> for SledStore {
    type Result = Result<Option<Vec<u8>>>;

    fn handle(&mut self, event: Get, _: &mut Self::Context) -> Self::Result {
        let Some(ref mut db) = &mut self.db else {
            error!("Attempt to get data from dropped db");
            return Err(anyhow!("Attempt to read from a closed db"));
        };
        // a failed read is never reported as a missing value
        match db.get(event) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.bus.err(FaultSource::Data, anyhow!("{err:#}"));
                Err(err)
            }
        }
    }
}

impl Handler<CounterEvent> for SledStore {
    type Result = ();
    fn handle(&mut self, msg: CounterEvent, ctx: &mut Self::Context) -> Self::Result {
        if let CounterEvent::Shutdown { .. } = msg {
            let _db = self.db.take();
            ctx.stop()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataStore;
    use fhc_events::{EventBusConfig, Shutdown};
    use tempfile::tempdir;

    #[actix::test]
    async fn writes_are_visible_through_a_fresh_store() -> Result<()> {
        let dir = tempdir()?;
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        let path = dir.path().join("db");

        let first = DataStore::from(&SledStore::new(&bus, &path)?);
        first.base("//slot").write_sync(5u32).await?;

        let second = DataStore::from(&SledStore::new(&bus, &path)?);
        assert_eq!(second.base("//slot").read::<u32>().await?, Some(5));
        Ok(())
    }

    #[actix::test]
    async fn reads_from_a_closed_db_are_errors() -> Result<()> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        let addr = SledStore {
            db: None,
            bus: bus.clone(),
        }
        .start();
        assert!(addr.send(Get::new("//slot")).await?.is_err());

        let store = DataStore::from(&addr);
        assert!(store.base("//slot").read::<u32>().await.is_err());
        Ok(())
    }

    #[actix::test]
    async fn stops_on_shutdown() -> Result<()> {
        let dir = tempdir()?;
        let bus = EventBus::<CounterEvent>::new(EventBusConfig::default()).start();
        let addr = SledStore::new(&bus, &dir.path().join("db"))?;
        // Subscription is queued before the shutdown event
        bus.send(CounterEvent::from(Shutdown)).await?;
        let store = DataStore::from(&addr);
        assert!(store.base("//slot").write_sync(1u8).await.is_err());
        Ok(())
    }
}
