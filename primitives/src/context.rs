//! Immutable execution context snapshot.
//!
//! One snapshot is built per call before any contract code runs and is
//! shared read-only with every host function for the rest of the call.
//! There are no setters; the builder is the only way to supply fields and
//! it refuses to produce a partially populated snapshot.

use serde::{Deserialize, Serialize};

use crate::error::MissingContextField;
use crate::types::{AccountId, BlockHeight, Timestamp};

/// Call-scoped metadata visible to contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    current_account: AccountId,
    predecessor_account: AccountId,
    signer_account: AccountId,
    block_height: BlockHeight,
    block_timestamp: Timestamp,
}

impl ExecutionContext {
    /// Build a snapshot from all five fields.
    pub fn new(
        current_account: AccountId,
        predecessor_account: AccountId,
        signer_account: AccountId,
        block_height: BlockHeight,
        block_timestamp: Timestamp,
    ) -> Self {
        Self {
            current_account,
            predecessor_account,
            signer_account,
            block_height,
            block_timestamp,
        }
    }

    /// Start a builder with no fields set.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Account the contract is deployed on.
    pub fn current_account(&self) -> &AccountId {
        &self.current_account
    }

    /// Account that made the immediate call.
    pub fn predecessor_account(&self) -> &AccountId {
        &self.predecessor_account
    }

    /// Account that signed the originating transaction.
    pub fn signer_account(&self) -> &AccountId {
        &self.signer_account
    }

    /// Height of the block the call executes in.
    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }

    /// Timestamp of the block the call executes in, in nanoseconds.
    pub fn block_timestamp(&self) -> Timestamp {
        self.block_timestamp
    }
}

/// Fail-fast builder for [`ExecutionContext`].
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    current_account: Option<AccountId>,
    predecessor_account: Option<AccountId>,
    signer_account: Option<AccountId>,
    block_height: Option<BlockHeight>,
    block_timestamp: Option<Timestamp>,
}

impl ContextBuilder {
    pub fn current_account(mut self, account: impl Into<AccountId>) -> Self {
        self.current_account = Some(account.into());
        self
    }

    pub fn predecessor_account(mut self, account: impl Into<AccountId>) -> Self {
        self.predecessor_account = Some(account.into());
        self
    }

    pub fn signer_account(mut self, account: impl Into<AccountId>) -> Self {
        self.signer_account = Some(account.into());
        self
    }

    pub fn block_height(mut self, height: BlockHeight) -> Self {
        self.block_height = Some(height);
        self
    }

    pub fn block_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.block_timestamp = Some(timestamp);
        self
    }

    /// Produce the snapshot.
    ///
    /// Fields are checked in declaration order; the first missing one is
    /// reported.
    pub fn build(self) -> Result<ExecutionContext, MissingContextField> {
        Ok(ExecutionContext {
            current_account: self
                .current_account
                .ok_or(MissingContextField("current_account"))?,
            predecessor_account: self
                .predecessor_account
                .ok_or(MissingContextField("predecessor_account"))?,
            signer_account: self
                .signer_account
                .ok_or(MissingContextField("signer_account"))?,
            block_height: self
                .block_height
                .ok_or(MissingContextField("block_height"))?,
            block_timestamp: self
                .block_timestamp
                .ok_or(MissingContextField("block_timestamp"))?,
        })
    }
}
