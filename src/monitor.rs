use std::time::{Duration, Instant};

use log::{info, warn};
use sysinfo::{ProcessExt, System, SystemExt};

/// Resident memory of this process in bytes, if the OS will tell us.
pub fn resident_memory() -> Option<u64> {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            warn!("cannot determine own pid: {}", e);
            return None;
        }
    };
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|p| p.memory())
}

/// Signed difference between two byte counts, in KiB.
fn memory_delta_kib(before: u64, after: u64) -> String {
    let sign = if after < before { "-" } else { "+" };
    format!("{}{}", sign, after.abs_diff(before) / 1024)
}

/// Elapsed time and memory growth across a unit of work.
pub struct Usage {
    label: &'static str,
    started: Instant,
    start_memory: Option<u64>,
}

impl Usage {
    pub fn start(label: &'static str) -> Self {
        Usage {
            label,
            started: Instant::now(),
            start_memory: resident_memory(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn finish(self) {
        let duration = self.elapsed();
        match (self.start_memory, resident_memory()) {
            (Some(before), Some(after)) => info!(
                "{} took {:?}, resident memory {} KiB (delta {} KiB)",
                self.label,
                duration,
                after / 1024,
                memory_delta_kib(before, after)
            ),
            _ => info!("{} took {:?}", self.label, duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_delta_keeps_its_sign() {
        assert_eq!(memory_delta_kib(4096, 10240), "+6");
        assert_eq!(memory_delta_kib(10240, 4096), "-6");
        assert_eq!(memory_delta_kib(0, u64::MAX), format!("+{}", u64::MAX / 1024));
    }

    #[test]
    fn elapsed_is_monotonic() {
        let usage = Usage::start("test");
        let first = usage.elapsed();
        assert!(usage.elapsed() >= first);
        usage.finish();
    }
}
