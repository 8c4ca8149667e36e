//! Shared test helpers for integration tests.
//!
//! Provides the fixture contracts, request builders, store helpers and a
//! runtime factory used across all integration test files.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use keystone_hostapi::{HostApi, MemStore, StateStore};
use keystone_primitives::{CallKind, CallRequest};
use keystone_runtime::{EntryPoints, Runtime, RuntimeConfig};

pub const CURRENT: &str = "contract.near";
pub const PREDECESSOR: &str = "alice.near";
pub const SIGNER: &str = "alice.near";
pub const HEIGHT: u64 = 100;
pub const TIMESTAMP: u64 = 1_700_000_000_000_000_000;

// ── Fixture Contracts ──

pub fn hello(host: &mut dyn HostApi) -> Result<()> {
    host.value_return_str("Hello from Keystone!")?;
    Ok(())
}

pub fn echo(host: &mut dyn HostApi) -> Result<()> {
    let input = host.input()?.to_vec();
    host.value_return(&input)?;
    Ok(())
}

pub fn greet(host: &mut dyn HostApi) -> Result<()> {
    let name = host.input_str()?;
    let name = if name.is_empty() { "World" } else { name.as_str() };
    host.value_return_str(&format!("Hello, {}!", name))?;
    Ok(())
}

pub fn counter(host: &mut dyn HostApi) -> Result<()> {
    let current: u64 = match host.storage_read_str("count")? {
        Some(s) => s.parse()?,
        None => 0,
    };
    let next = (current + 1).to_string();
    host.storage_write_str("count", &next)?;
    host.value_return_str(&next)?;
    Ok(())
}

pub fn get_counter(host: &mut dyn HostApi) -> Result<()> {
    let count = host.storage_read_str("count")?.unwrap_or_else(|| "0".to_string());
    host.value_return_str(&count)?;
    Ok(())
}

pub fn set_get(host: &mut dyn HostApi) -> Result<()> {
    let value = host.input_str()?;
    host.storage_write_str("mykey", &value)?;
    let read_back = host.storage_read_str("mykey")?.unwrap_or_default();
    host.value_return_str(&read_back)?;
    Ok(())
}

pub fn remove_key(host: &mut dyn HostApi) -> Result<()> {
    host.storage_remove_str("mykey")?;
    let outcome = if host.storage_has_key_str("mykey")? {
        "still exists"
    } else {
        "removed"
    };
    host.value_return_str(outcome)?;
    Ok(())
}

pub fn whoami(host: &mut dyn HostApi) -> Result<()> {
    let account = host.current_account_id()?;
    let height = host.block_height()?;
    host.value_return_str(&format!("{} at block {}", account, height))?;
    Ok(())
}

pub fn caller_info(host: &mut dyn HostApi) -> Result<()> {
    let info = format!(
        "predecessor={} signer={} block={} timestamp={}",
        host.predecessor_account_id()?,
        host.signer_account_id()?,
        host.block_height()?,
        host.block_timestamp()?,
    );
    host.value_return_str(&info)?;
    Ok(())
}

pub fn hash_it(host: &mut dyn HostApi) -> Result<()> {
    let data = host.input()?.to_vec();
    let out = format!(
        "sha256={} keccak256={}",
        host.sha256_hex(&data)?,
        host.keccak256_hex(&data)?
    );
    host.value_return_str(&out)?;
    Ok(())
}

pub fn log_and_return(host: &mut dyn HostApi) -> Result<()> {
    let msg = host.input_str()?;
    let msg = if msg.is_empty() { "default log message" } else { msg.as_str() };
    host.log(&format!("LOG: {}", msg))?;
    host.value_return_str(&format!("logged: {}", msg))?;
    Ok(())
}

pub fn kv_put(host: &mut dyn HostApi) -> Result<()> {
    let input = host.input_str()?;
    match input.split_once(':') {
        Some((key, value)) => {
            host.storage_write_str(key, value)?;
            host.value_return_str("ok")?;
        }
        None => host.value_return_str("error: expected key:value")?,
    }
    Ok(())
}

pub fn kv_get(host: &mut dyn HostApi) -> Result<()> {
    let key = host.input_str()?;
    let value = host.storage_read_str(&key)?.unwrap_or_default();
    host.value_return_str(&value)?;
    Ok(())
}

/// All fixture contracts under their exported names.
pub fn fixture_entry_points() -> EntryPoints {
    let mut entries = EntryPoints::new();
    let fixtures: [(&str, fn(&mut dyn HostApi) -> Result<()>); 13] = [
        ("hello", hello),
        ("echo", echo),
        ("greet", greet),
        ("counter", counter),
        ("get_counter", get_counter),
        ("set_get", set_get),
        ("remove_key", remove_key),
        ("whoami", whoami),
        ("caller_info", caller_info),
        ("hash_it", hash_it),
        ("log_and_return", log_and_return),
        ("kv_put", kv_put),
        ("kv_get", kv_get),
    ];
    for (name, contract) in fixtures {
        entries.register(name, contract).unwrap();
    }
    entries
}

// ── Requests ──

/// A call request with the standard test context.
pub fn call(input: &str) -> CallRequest {
    CallRequest::new(input)
        .with_accounts(CURRENT, PREDECESSOR, SIGNER)
        .with_block(HEIGHT, TIMESTAMP)
}

/// A view request with the standard test context.
pub fn view(input: &str) -> CallRequest {
    call(input).with_kind(CallKind::View)
}

// ── Stores ──

pub fn empty_store() -> Arc<MemStore> {
    Arc::new(MemStore::new())
}

/// A store pre-populated with UTF-8 entries.
pub fn store_with(entries: &[(&str, &str)]) -> Arc<MemStore> {
    let data: BTreeMap<Vec<u8>, Vec<u8>> = entries
        .iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect();
    Arc::new(MemStore::with_data(data))
}

/// Store contents as UTF-8 pairs.
pub fn contents(store: &MemStore) -> BTreeMap<String, String> {
    store
        .snapshot()
        .into_iter()
        .map(|(k, v)| {
            (
                String::from_utf8(k).unwrap(),
                String::from_utf8(v).unwrap(),
            )
        })
        .collect()
}

pub fn read_str(store: &MemStore, key: &str) -> Option<String> {
    store
        .get(key.as_bytes())
        .unwrap()
        .map(|v| String::from_utf8(v).unwrap())
}

// ── Runtime ──

pub fn runtime() -> Runtime {
    Runtime::new(RuntimeConfig::default())
}

/// Run a fixture method against `store` with the standard context.
pub fn run(
    method: &str,
    input: &str,
    store: &Arc<MemStore>,
) -> keystone_primitives::CallResult {
    runtime()
        .execute_method(&fixture_entry_points(), method, &call(input), store.clone())
        .unwrap()
}

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A store that rejects every commit.
pub struct RejectingStore {
    pub inner: MemStore,
}

impl StateStore for RejectingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, keystone_hostapi::HostError> {
        self.inner.get(key)
    }

    fn put_batch(
        &self,
        _batch: &keystone_hostapi::WriteBatch,
    ) -> Result<(), keystone_hostapi::HostError> {
        Err(keystone_hostapi::HostError::commit_conflict("store is frozen"))
    }
}
