//! Environment-variable configuration, read once and cached.
//!
//! Three independent env vars gate enumeration behavior:
//! - `TOPOSASDEBUG` — enable debug-level tracing output for the enumeration
//!   pipeline (a visibility toggle, not a code-path switch).
//! - `TOPO_SASNOENUM` — skip enumeration entirely and return an empty graph.
//! - `SAS_FAKE_ENUM` — enumerate the hard-coded fixture topology instead of
//!   calling into the real HBA/SMP collaborators.
//!
//! Resolution follows the atomic-cache-with-sentinel pattern: a background
//! `OnceLock` would be simpler, but an explicit state machine makes the
//! "resolving" window observable, which matters if `EnumConfig::current` is
//! ever called reentrantly from inside the env lookup itself.

use std::sync::atomic::{AtomicU8, Ordering};

/// Resolved enumeration configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnumConfig {
    pub debug: bool,
    pub skip_enum: bool,
    pub use_fake: bool,
}

const BIT_DEBUG: u8 = 0b001;
const BIT_SKIP_ENUM: u8 = 0b010;
const BIT_USE_FAKE: u8 = 0b100;

const STATE_UNRESOLVED: u8 = 0;
const STATE_RESOLVING: u8 = 0xFE;
const STATE_RESOLVED_BASE: u8 = 0x10;

static CACHED: AtomicU8 = AtomicU8::new(STATE_UNRESOLVED);

fn bits_to_config(bits: u8) -> EnumConfig {
    EnumConfig {
        debug: bits & BIT_DEBUG != 0,
        skip_enum: bits & BIT_SKIP_ENUM != 0,
        use_fake: bits & BIT_USE_FAKE != 0,
    }
}

fn config_to_bits(cfg: EnumConfig) -> u8 {
    let mut bits = 0;
    if cfg.debug {
        bits |= BIT_DEBUG;
    }
    if cfg.skip_enum {
        bits |= BIT_SKIP_ENUM;
    }
    if cfg.use_fake {
        bits |= BIT_USE_FAKE;
    }
    bits
}

fn read_env() -> EnumConfig {
    EnumConfig {
        debug: env_is_set("TOPOSASDEBUG"),
        skip_enum: env_is_set("TOPO_SASNOENUM"),
        use_fake: env_is_set("SAS_FAKE_ENUM"),
    }
}

fn env_is_set(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

impl EnumConfig {
    /// Returns the process-wide configuration, resolving it from the
    /// environment on first call and caching thereafter.
    #[must_use]
    pub fn current() -> Self {
        let cached = CACHED.load(Ordering::Acquire);
        if cached != STATE_UNRESOLVED && cached != STATE_RESOLVING {
            return bits_to_config(cached & !STATE_RESOLVED_BASE);
        }
        if cached == STATE_RESOLVING {
            return EnumConfig::default();
        }

        if CACHED
            .compare_exchange(
                STATE_UNRESOLVED,
                STATE_RESOLVING,
                Ordering::SeqCst,
                Ordering::Relaxed,
            )
            .is_err()
        {
            let v = CACHED.load(Ordering::Acquire);
            return if v != STATE_UNRESOLVED && v != STATE_RESOLVING {
                bits_to_config(v & !STATE_RESOLVED_BASE)
            } else {
                EnumConfig::default()
            };
        }

        let resolved = read_env();
        CACHED.store(
            STATE_RESOLVED_BASE | config_to_bits(resolved),
            Ordering::Release,
        );
        resolved
    }

    #[cfg(test)]
    fn reset_cache_for_test() {
        CACHED.store(STATE_UNRESOLVED, Ordering::SeqCst);
    }

    /// Forces the next [`EnumConfig::current`] call to re-read the
    /// environment. Exposed for downstream crates' tests that toggle
    /// `TOPO_SASNOENUM`/`SAS_FAKE_ENUM` between assertions; production code
    /// never needs this.
    pub fn reset_for_test() {
        CACHED.store(STATE_UNRESOLVED, Ordering::SeqCst);
    }
}
