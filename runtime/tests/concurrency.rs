//! Concurrency tests: parallel calls sharing one backing store.
//!
//! Each call owns its transaction, so nothing is visible across calls
//! until commit. With read validation on, a call whose reads went stale
//! fails with `StorageCommitConflict` instead of overwriting a newer value.

mod common;

use std::sync::Arc;
use std::thread;

use keystone_hostapi::MemStore;
use keystone_primitives::{CallResult, ErrorCode};
use keystone_runtime::{EntryPoints, Runtime, RuntimeConfig};

use common::*;

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 25;

fn hammer_counter(runtime: Arc<Runtime>, store: Arc<MemStore>) -> Vec<CallResult> {
    let entries = Arc::new(fixture_entry_points());
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let runtime = Arc::clone(&runtime);
            let store = Arc::clone(&store);
            let entries: Arc<EntryPoints> = Arc::clone(&entries);
            thread::spawn(move || {
                (0..CALLS_PER_THREAD)
                    .map(|_| {
                        runtime
                            .execute_method(&entries, "counter", &call(""), store.clone())
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect()
}

// ── Test: no lost updates ──

#[test]
fn test_concurrent_counter_never_loses_updates() {
    init_tracing();
    let runtime = Arc::new(Runtime::new(RuntimeConfig::default()));
    let store = empty_store();

    let results = hammer_counter(runtime, store.clone());
    assert_eq!(results.len(), THREADS * CALLS_PER_THREAD);

    let committed = results.iter().filter(|r| r.committed).count();
    for result in results.iter().filter(|r| !r.committed) {
        assert_eq!(result.error_code(), ErrorCode::StorageCommitConflict);
    }
    assert!(committed > 0);

    let final_count: usize = read_str(&store, "count").unwrap().parse().unwrap();
    assert_eq!(final_count, committed);

    // every committed call returned a distinct count
    let mut returned: Vec<usize> = results
        .iter()
        .filter(|r| r.committed)
        .map(|r| r.return_str().unwrap().parse().unwrap())
        .collect();
    returned.sort_unstable();
    assert_eq!(returned, (1..=committed).collect::<Vec<_>>());
}

// ── Test: sequential calls never conflict ──

#[test]
fn test_sequential_calls_all_commit() {
    let store = empty_store();
    for i in 1..=20 {
        let result = run("counter", "", &store);
        assert!(result.committed);
        assert_eq!(result.return_str(), Some(i.to_string().as_str()));
    }
}

// ── Test: uncommitted writes are invisible to other calls ──

#[test]
fn test_pending_writes_invisible_across_calls() {
    let store = empty_store();
    let entries = fixture_entry_points();
    let runtime = runtime();

    let inner_store = store.clone();
    let observed = std::sync::Mutex::new(None);
    let contract = |host: &mut dyn keystone_hostapi::HostApi| -> anyhow::Result<()> {
        host.storage_write_str("mykey", "pending")?;
        let nested = runtime
            .execute_method(&entries, "kv_get", &call("mykey"), inner_store.clone())
            .unwrap();
        *observed.lock().unwrap() = nested.return_str().map(str::to_owned);
        Ok(())
    };
    let result = runtime.execute_call(&contract, &call(""), store.clone()).unwrap();

    assert!(result.committed);
    assert_eq!(observed.lock().unwrap().as_deref(), Some(""));
    assert_eq!(read_str(&store, "mykey").as_deref(), Some("pending"));
}
