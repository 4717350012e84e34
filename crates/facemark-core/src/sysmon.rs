//! System probing: memory sampling around verification calls and the
//! one-shot system fingerprint recorded with every run.

use serde::{Deserialize, Serialize};
use sysinfo::System;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Samples whole-system used memory.
///
/// Snapshots bracket single verification calls, so a delta attributes
/// everything that happened during the call (allocator growth, GC in the
/// external backend, unrelated processes) to the pair being measured. This
/// is a coarse proxy, not exact attribution, and deltas may be negative.
pub struct MemorySampler {
    system: System,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Refresh and return used system memory in MB.
    pub fn used_mb(&mut self) -> f64 {
        self.system.refresh_memory();
        self.system.used_memory() as f64 / BYTES_PER_MB
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Host fingerprint captured once at orchestrator start and carried through
/// snapshots and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu_count: usize,
    pub total_memory_gb: f64,
    pub os: String,
    pub harness_version: String,
    /// RFC 3339 local timestamp of collection.
    pub timestamp: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let total_memory_gb =
            round2(system.total_memory() as f64 / BYTES_PER_GB);

        Self {
            cpu_count: num_cpus::get(),
            total_memory_gb,
            os: System::long_os_version()
                .unwrap_or_else(|| std::env::consts::OS.to_string()),
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
