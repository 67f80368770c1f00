// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use fhc_events::{CiphertextHandle, CounterError, CounterResult, IntegerWidth};
use fhc_fhe::{CiphertextRegistry, FheProvider};
use fhc_utils::{run_blocking, ArcBytes};
use std::{fmt, sync::Arc};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "add"),
            ArithOp::Sub => write!(f, "sub"),
        }
    }
}

/// Who the result belongs to and the width both operands must have
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalContext {
    pub contract: Address,
    pub width: IntegerWidth,
}

impl EvalContext {
    pub fn new(contract: Address, width: IntegerWidth) -> Self {
        Self { contract, width }
    }
}

/// Homomorphic add and sub over handles. Results are registered so they can be resolved, but
/// putting them in a slot and granting access is up to the caller.
#[derive(Clone)]
pub struct ArithmeticEngine {
    provider: Arc<dyn FheProvider>,
    registry: CiphertextRegistry,
}

impl ArithmeticEngine {
    pub fn new(provider: Arc<dyn FheProvider>, registry: CiphertextRegistry) -> Self {
        Self { provider, registry }
    }

    pub async fn add(
        &self,
        ctx: &EvalContext,
        a: CiphertextHandle,
        b: CiphertextHandle,
    ) -> CounterResult<CiphertextHandle> {
        self.eval(ArithOp::Add, ctx, a, b).await
    }

    pub async fn sub(
        &self,
        ctx: &EvalContext,
        a: CiphertextHandle,
        b: CiphertextHandle,
    ) -> CounterResult<CiphertextHandle> {
        self.eval(ArithOp::Sub, ctx, a, b).await
    }

    /// `a op b`. An uninitialized `a` stands for an encrypted zero of the context width.
    pub async fn eval(
        &self,
        op: ArithOp,
        ctx: &EvalContext,
        a: CiphertextHandle,
        b: CiphertextHandle,
    ) -> CounterResult<CiphertextHandle> {
        if b.is_uninitialized() {
            return Err(CounterError::malformed(
                "The right operand cannot be the uninitialized handle",
            ));
        }
        let rhs = self.operand(ctx, &b).await?;
        let lhs = if a.is_uninitialized() {
            None
        } else {
            Some(self.operand(ctx, &a).await?)
        };

        let provider = self.provider.clone();
        let width = ctx.width;
        let result = run_blocking(move || {
            let lhs = match lhs {
                Some(bytes) => bytes.extract_bytes(),
                None => provider.encrypt_zero(width)?,
            };
            match op {
                ArithOp::Add => provider.add(&lhs, &rhs),
                ArithOp::Sub => provider.sub(&lhs, &rhs),
            }
        })
        .await?;

        let handle = self
            .registry
            .register(ArcBytes::from(result), ctx.width, ctx.contract)
            .await?;
        trace!("{:?} {} {:?} = {:?}", a, op, b, handle);
        Ok(handle)
    }

    async fn operand(&self, ctx: &EvalContext, handle: &CiphertextHandle) -> CounterResult<ArcBytes> {
        let stored = self
            .registry
            .resolve(handle)
            .await?
            .ok_or_else(|| CounterError::malformed(format!("Unknown handle {handle}")))?;
        if stored.width != ctx.width {
            return Err(CounterError::WidthMismatch {
                expected: ctx.width,
                found: stored.width,
            });
        }
        Ok(stored.ciphertext)
    }
}
