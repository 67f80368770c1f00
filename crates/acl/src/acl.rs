// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AclRepositoryFactory;
use actix::prelude::*;
use alloy::primitives::Address;
use anyhow::Result;
use fhc_data::Repositories;
use fhc_events::{
    AccessGranted, AclEntry, AclGrant, CiphertextHandle, CounterError, CounterEvent,
    CounterResult, EventBus,
};
use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
};
use tracing::{info, trace};

/// Record that `grants` may decrypt `handle`. Resolves once the grants are durable.
#[derive(Message, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "CounterResult<()>")]
pub struct Grant {
    pub handle: CiphertextHandle,
    pub grants: Vec<AclGrant>,
}

impl Grant {
    pub fn new(handle: CiphertextHandle, grants: Vec<AclGrant>) -> Self {
        Self { handle, grants }
    }
}

/// A grantee holding either scope on the handle may decrypt it
#[derive(Message, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "CounterResult<bool>")]
pub struct IsAuthorized {
    pub handle: CiphertextHandle,
    pub grantee: Address,
}

impl IsAuthorized {
    pub fn new(handle: CiphertextHandle, grantee: Address) -> Self {
        Self { handle, grantee }
    }
}

/// List the grants held on one handle
#[derive(Message, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "CounterResult<Vec<AclEntry>>")]
pub struct GetGrants {
    pub handle: CiphertextHandle,
}

/// Append only access list. Each handle's grant set lives under its own key and is loaded the
/// first time the handle is asked about.
pub struct Acl {
    cache: HashMap<CiphertextHandle, BTreeSet<AclGrant>>,
    repositories: Repositories,
    bus: Addr<EventBus<CounterEvent>>,
}

impl Actor for Acl {
    type Context = Context<Self>;
}

impl Acl {
    pub fn attach(bus: &Addr<EventBus<CounterEvent>>, repositories: &Repositories) -> Addr<Self> {
        let addr = Acl {
            cache: HashMap::new(),
            repositories: repositories.clone(),
            bus: bus.clone(),
        }
        .start();
        info!("Acl actor started");
        addr
    }

    fn held(
        &self,
        handle: &CiphertextHandle,
    ) -> impl Future<Output = Result<BTreeSet<AclGrant>>> + 'static {
        let cached = self.cache.get(handle).cloned();
        let repository = self.repositories.acl(handle);
        async move {
            match cached {
                Some(held) => Ok(held),
                None => repository.read_or(BTreeSet::new()).await,
            }
        }
    }

    fn remember(&mut self, handle: CiphertextHandle, held: BTreeSet<AclGrant>) {
        // unknown handles are not cached
        if !held.is_empty() {
            self.cache.entry(handle).or_insert(held);
        }
    }
}

impl Handler<Grant> for Acl {
    type Result = AtomicResponse<Self, CounterResult<()>>;

    fn handle(&mut self, msg: Grant, _: &mut Self::Context) -> Self::Result {
        if msg.handle.is_uninitialized() {
            return AtomicResponse::new(Box::pin(fut::ready(Err(CounterError::malformed(
                "Cannot grant access to the uninitialized handle",
            )))));
        }
        if msg.grants.is_empty() {
            return AtomicResponse::new(Box::pin(fut::ready(Err(CounterError::malformed(
                "A grant needs at least one grantee",
            )))));
        }

        let handle = msg.handle;
        let repository = self.repositories.acl(&handle);
        let held = self.held(&handle);
        AtomicResponse::new(Box::pin(
            async move {
                let mut held = held.await?;
                let added: Vec<AclGrant> = msg
                    .grants
                    .into_iter()
                    .filter(|grant| held.insert(*grant))
                    .collect();
                if !added.is_empty() {
                    repository.write_sync(&held).await?;
                }
                Ok::<_, anyhow::Error>((held, added))
            }
            .into_actor(self)
            .map(move |res, act, _| {
                let (held, added) = res?;
                act.cache.insert(handle, held);
                for grant in added {
                    info!("Granted {} on {:?} ({})", grant.grantee, handle, grant.scope);
                    act.bus.do_send(CounterEvent::from(AccessGranted {
                        handle,
                        grantee: grant.grantee,
                        scope: grant.scope,
                    }));
                }
                Ok(())
            }),
        ))
    }
}

impl Handler<IsAuthorized> for Acl {
    type Result = AtomicResponse<Self, CounterResult<bool>>;

    fn handle(&mut self, msg: IsAuthorized, _: &mut Self::Context) -> Self::Result {
        AtomicResponse::new(Box::pin(self.held(&msg.handle).into_actor(self).map(
            move |res, act: &mut Acl, _| {
                let held = res?;
                let authorized = held.iter().any(|grant| grant.grantee == msg.grantee);
                trace!("{} on {:?}: {}", msg.grantee, msg.handle, authorized);
                act.remember(msg.handle, held);
                Ok(authorized)
            },
        )))
    }
}

impl Handler<GetGrants> for Acl {
    type Result = AtomicResponse<Self, CounterResult<Vec<AclEntry>>>;

    fn handle(&mut self, msg: GetGrants, _: &mut Self::Context) -> Self::Result {
        AtomicResponse::new(Box::pin(self.held(&msg.handle).into_actor(self).map(
            move |res, act: &mut Acl, _| {
                let held = res?;
                let entries = held
                    .iter()
                    .map(|grant| AclEntry {
                        handle: msg.handle,
                        grantee: grant.grantee,
                        scope: grant.scope,
                    })
                    .collect();
                act.remember(msg.handle, held);
                Ok(entries)
            },
        )))
    }
}
