//! Shared test-only helpers exposed to downstream crates, chiefly a process
//! wide lock so tests in different crates that mutate `TOPO_SASNOENUM` /
//! `SAS_FAKE_ENUM` / `TOPOSASDEBUG` don't race each other under a
//! multi-threaded test runner.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Acquires the process-wide env-var lock for the duration of a test that
/// mutates one of the enumeration env vars. Poisoning is ignored: a panic
/// in one test while holding the lock must not wedge every other test that
/// needs it afterwards.
#[must_use]
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
