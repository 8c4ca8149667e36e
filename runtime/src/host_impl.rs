//! Per-call host state and the `HostApi` implementation contracts run on.
//!
//! A `Dispatcher` owns everything one call may touch: the context
//! snapshot, the input bytes, the storage transaction and the log sink.
//! It is created `Idle`, moved to `Running` when the contract body starts,
//! and ends `Completed` or `Failed` in `finish`, which either commits and
//! freezes the result or discards and reports the reason. A finished
//! dispatcher rejects every further host call and a second `finish`.

use keystone_hostapi::{HostApi, HostError, HostFunction, HostResult, LogSink};
use keystone_primitives::{
    codec::diff_digest, AccountId, BlockHeight, CallFailure, CallResult, ExecutionContext, Hash,
    StateDiff, Timestamp,
};
use tracing::{debug, info, trace, warn};

use crate::transaction::StorageTransaction;

/// Dispatcher lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Host state for exactly one call.
pub struct Dispatcher {
    state: DispatcherState,
    context: ExecutionContext,
    input: Vec<u8>,
    transaction: StorageTransaction,
    logs: LogSink,
    return_value: Option<Vec<u8>>,
    /// First host error raised during the call. Fails the call even if
    /// the contract ignored it.
    fault: Option<HostError>,
    mirror_logs: bool,
}

impl Dispatcher {
    pub fn new(
        context: ExecutionContext,
        input: Vec<u8>,
        transaction: StorageTransaction,
        logs: LogSink,
    ) -> Self {
        Self {
            state: DispatcherState::Idle,
            context,
            input,
            transaction,
            logs,
            return_value: None,
            fault: None,
            mirror_logs: false,
        }
    }

    /// Also emit contract logs through `tracing`.
    pub fn with_mirrored_logs(mut self, enabled: bool) -> Self {
        self.mirror_logs = enabled;
        self
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// The host error that will fail this call, if any.
    pub fn fault(&self) -> Option<&HostError> {
        self.fault.as_ref()
    }

    /// Start serving host calls.
    pub fn begin(&mut self) -> HostResult<()> {
        if self.state != DispatcherState::Idle {
            return Err(HostError::invalid_state(format!(
                "dispatcher cannot start from {:?}",
                self.state
            )));
        }
        self.state = DispatcherState::Running;
        Ok(())
    }

    /// Finish the call and build its result.
    ///
    /// `body` is how the contract itself ended. A recorded host fault takes
    /// precedence over it. On success the transaction is committed, unless
    /// it is read-only, in which case it is discarded and nothing commits.
    /// Only a `Running` dispatcher can finish; otherwise the result is an
    /// `InvalidState` failure and nothing is committed.
    pub fn finish(&mut self, body: Result<(), CallFailure>, validate_reads: bool) -> CallResult {
        let logs = self.logs.drain();
        let empty_digest = diff_digest(&StateDiff::new());

        if self.state != DispatcherState::Running {
            let failure = failure_from(&HostError::invalid_state(format!(
                "cannot finish a dispatcher that is {:?}",
                self.state
            )));
            if self.state == DispatcherState::Idle {
                let _ = self.transaction.discard();
                self.state = DispatcherState::Failed;
            }
            warn!(reason = %failure.message, "finish rejected");
            return CallResult::failed(failure, logs, empty_digest);
        }

        let failure = match (self.fault.take(), body) {
            (Some(fault), _) => Some(failure_from(&fault)),
            (None, Err(failure)) => Some(failure),
            (None, Ok(())) => None,
        };

        if let Some(failure) = failure {
            // Already-closed transactions have nothing left to drop
            let _ = self.transaction.discard();
            self.state = DispatcherState::Failed;
            warn!(code = %failure.code, reason = %failure.message, "call failed");
            return CallResult::failed(failure, logs, empty_digest);
        }

        if self.transaction.is_read_only() {
            let _ = self.transaction.discard();
            self.state = DispatcherState::Completed;
            debug!("view call completed");
            return CallResult::completed(
                self.return_value.take(),
                logs,
                false,
                StateDiff::new(),
                empty_digest,
            );
        }

        match self.transaction.commit(validate_reads) {
            Ok(diff) => {
                self.state = DispatcherState::Completed;
                let digest = diff_digest(&diff);
                info!(
                    writes = diff.writes.len(),
                    removals = diff.removals.len(),
                    "call committed"
                );
                CallResult::completed(self.return_value.take(), logs, true, diff, digest)
            }
            Err(e) => {
                self.state = DispatcherState::Failed;
                let failure = failure_from(&e);
                warn!(code = %failure.code, reason = %failure.message, "commit failed");
                CallResult::failed(failure, logs, empty_digest)
            }
        }
    }

    fn enter(&self, function: HostFunction) -> HostResult<()> {
        trace!(function = %function, "host call");
        if self.state != DispatcherState::Running {
            return Err(HostError::invalid_state(format!(
                "{} called while dispatcher is {:?}",
                function, self.state
            )));
        }
        Ok(())
    }

    /// Check the state and record a rejection as the call's fault.
    fn admit(&mut self, function: HostFunction) -> HostResult<()> {
        let entered = self.enter(function);
        self.record(entered)
    }

    /// Remember the first failure so it sticks to the call.
    fn record<T>(&mut self, result: HostResult<T>) -> HostResult<T> {
        if let Err(e) = &result {
            self.note_fault(e);
        }
        result
    }

    fn note_fault(&mut self, error: &HostError) {
        if self.fault.is_none() {
            debug!(error = %error, "host call failed");
            self.fault = Some(error.clone());
        }
    }
}

fn failure_from(error: &HostError) -> CallFailure {
    let message = match error {
        HostError::Code(code) => code.to_string(),
        HostError::Detailed(_, detail) => detail.clone(),
        HostError::Internal(msg) => msg.clone(),
    };
    CallFailure::new(error.code(), message)
}

impl HostApi for Dispatcher {
    fn value_return(&mut self, value: &[u8]) -> HostResult<()> {
        let result = self.enter(HostFunction::ValueReturn).and_then(|()| {
            if self.return_value.is_some() {
                return Err(HostError::duplicate_return());
            }
            Ok(())
        });
        if result.is_ok() {
            self.return_value = Some(value.to_vec());
        }
        self.record(result)
    }

    fn input(&mut self) -> HostResult<&[u8]> {
        self.admit(HostFunction::Input)?;
        Ok(&self.input)
    }

    fn log(&mut self, message: &str) -> HostResult<()> {
        let result = self.enter(HostFunction::Log);
        if result.is_ok() {
            if self.mirror_logs {
                debug!(target: "keystone::contract", "{}", message);
            }
            self.logs.append(message);
        }
        self.record(result)
    }

    fn storage_write(&mut self, key: &[u8], value: &[u8]) -> HostResult<()> {
        let result = self
            .enter(HostFunction::StorageWrite)
            .and_then(|()| self.transaction.write(key, value));
        self.record(result)
    }

    fn storage_read(&mut self, key: &[u8]) -> HostResult<Option<Vec<u8>>> {
        let result = self
            .enter(HostFunction::StorageRead)
            .and_then(|()| self.transaction.read(key));
        self.record(result)
    }

    fn storage_remove(&mut self, key: &[u8]) -> HostResult<()> {
        let result = self
            .enter(HostFunction::StorageRemove)
            .and_then(|()| self.transaction.remove(key));
        self.record(result)
    }

    fn storage_has_key(&mut self, key: &[u8]) -> HostResult<bool> {
        let result = self
            .enter(HostFunction::StorageHasKey)
            .and_then(|()| self.transaction.has_key(key));
        self.record(result)
    }

    fn current_account_id(&mut self) -> HostResult<AccountId> {
        self.admit(HostFunction::CurrentAccountId)?;
        Ok(self.context.current_account().clone())
    }

    fn predecessor_account_id(&mut self) -> HostResult<AccountId> {
        self.admit(HostFunction::PredecessorAccountId)?;
        Ok(self.context.predecessor_account().clone())
    }

    fn signer_account_id(&mut self) -> HostResult<AccountId> {
        self.admit(HostFunction::SignerAccountId)?;
        Ok(self.context.signer_account().clone())
    }

    fn block_height(&mut self) -> HostResult<BlockHeight> {
        self.admit(HostFunction::BlockHeight)?;
        Ok(self.context.block_height())
    }

    fn block_timestamp(&mut self) -> HostResult<Timestamp> {
        self.admit(HostFunction::BlockTimestamp)?;
        Ok(self.context.block_timestamp())
    }

    fn sha256(&mut self, data: &[u8]) -> HostResult<Hash> {
        self.admit(HostFunction::Sha256)?;
        Ok(keystone_primitives::crypto::sha256(data))
    }

    fn keccak256(&mut self, data: &[u8]) -> HostResult<Hash> {
        self.admit(HostFunction::Keccak256)?;
        Ok(keystone_primitives::crypto::keccak256(data))
    }

    fn report(&mut self, error: HostError) -> HostError {
        self.note_fault(&error);
        error
    }
}
