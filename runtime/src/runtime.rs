//! Call runtime: runs one contract body against a fresh dispatcher.
//!
//! The `Runtime` struct is the main entry point. `execute_call` builds the
//! context snapshot from the request, opens a storage transaction over the
//! backing store, runs the contract and finalizes the result. Every call
//! gets its own dispatcher, so nothing leaks from one call into the next.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use keystone_hostapi::{HostApi, HostError, LogSink, StateStore};
use keystone_primitives::{CallFailure, CallKind, CallRequest, CallResult, ErrorCode};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::host_impl::Dispatcher;
use crate::linker::EntryPoints;
use crate::transaction::StorageTransaction;

/// A contract body.
///
/// Implemented for every `Fn(&mut dyn HostApi) -> anyhow::Result<()>`, so
/// plain functions and closures can be passed directly. Host errors
/// propagated with `?` keep their error code.
pub trait Contract: Send + Sync {
    fn call(&self, host: &mut dyn HostApi) -> anyhow::Result<()>;
}

impl<F> Contract for F
where
    F: Fn(&mut dyn HostApi) -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self, host: &mut dyn HostApi) -> anyhow::Result<()> {
        self(host)
    }
}

/// The call runtime.
///
/// Holds only configuration; it is `Send + Sync` and can serve calls from
/// many threads at once.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run a contract body for one call.
    ///
    /// Returns `Err` only when the request is unusable (a context field is
    /// missing); the contract has not run in that case. Everything that
    /// happens once it runs is reported in the `CallResult`.
    pub fn execute_call(
        &self,
        contract: &dyn Contract,
        request: &CallRequest,
        store: Arc<dyn StateStore>,
    ) -> Result<CallResult, RuntimeError> {
        // 1. Snapshot the context
        let context = request.context()?;

        let span = tracing::debug_span!(
            "call",
            current = %context.current_account(),
            predecessor = %context.predecessor_account(),
            height = context.block_height(),
            kind = ?request.kind,
        );
        let _enter = span.enter();

        // 2. Open the transaction and log sink
        let limits = self.config.execution.clone();
        let transaction = match request.kind {
            CallKind::Call => StorageTransaction::new(store, limits.clone()),
            CallKind::View => StorageTransaction::read_only(store, limits.clone()),
        };
        let logs = LogSink::new(limits.max_log_lines as usize, limits.max_log_line_len);

        // 3. Build the dispatcher
        let mut dispatcher = Dispatcher::new(context, request.input.clone(), transaction, logs)
            .with_mirrored_logs(self.config.mirror_contract_logs);
        if let Err(e) = dispatcher.begin() {
            let failure = CallFailure::new(e.code(), e.to_string());
            return Ok(dispatcher.finish(Err(failure), self.config.validate_reads));
        }
        debug!(input_len = request.input.len(), "contract started");

        // 4. Run the body
        let body = self.run_body(contract, &mut dispatcher);

        // 5. Commit or discard
        Ok(dispatcher.finish(body, self.config.validate_reads))
    }

    /// Resolve `method` in `entry_points` and run it.
    pub fn execute_method(
        &self,
        entry_points: &EntryPoints,
        method: &str,
        request: &CallRequest,
        store: Arc<dyn StateStore>,
    ) -> Result<CallResult, RuntimeError> {
        let contract = entry_points
            .get(method)
            .ok_or_else(|| RuntimeError::UnknownMethod(method.to_owned()))?;
        debug!(method, "dispatching entry point");
        self.execute_call(contract, request, store)
    }

    fn run_body(&self, contract: &dyn Contract, host: &mut Dispatcher) -> Result<(), CallFailure> {
        let outcome = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| contract.call(host))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    return Err(CallFailure::new(
                        ErrorCode::ContractFault,
                        format!("contract panicked: {}", panic_message(payload.as_ref())),
                    ));
                }
            }
        } else {
            contract.call(host)
        };
        outcome.map_err(classify_error)
    }
}

/// Map a contract error to a call failure.
///
/// Host errors carried through `anyhow` keep their own code; anything else
/// the contract raised is a `ContractFault`.
fn classify_error(error: anyhow::Error) -> CallFailure {
    match error.downcast_ref::<HostError>() {
        Some(host) => CallFailure::new(host.code(), host.to_string()),
        None => CallFailure::new(ErrorCode::ContractFault, format!("{:#}", error)),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
