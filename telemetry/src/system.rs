//! Host utilisation sampling.
//!
//! Reads CPU and memory utilisation once per tick for the `cpu_usage` and
//! `memory_usage` gauges.

use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind,
    System,
};

/// Host utilisation at one instant, both in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSample {
    /// CPU utilisation, 0.0 - 100.0.
    pub cpu_percent: f64,
    /// Memory utilisation, 0.0 - 100.0.
    pub memory_percent: f64,
}

/// Source of host utilisation samples.
pub trait SystemSampler: Send {
    /// Takes a fresh sample.
    fn sample(&mut self) -> SystemSample;
}

/// Clamps a percentage into `[0, 100]` and rounds it to two decimals.
/// Non-finite inputs become 0.
#[must_use]
pub fn normalize_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// CPU utilisation derived from the one-minute load average.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cpu_percent_from_load(load_one: f64, cores: usize) -> f64 {
    normalize_percent(load_one / cores.max(1) as f64 * 100.0)
}

/// Memory utilisation as `(total - free) / total`, 0 when `total` is unknown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn memory_percent(total: u64, free: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(free);
    normalize_percent(used as f64 / total as f64 * 100.0)
}

/// Samples the real host through `sysinfo`.
///
/// CPU comes from the load average normalised by core count. Where the OS
/// reports no load average (a zero reading, as on Windows) it falls back to
/// this process's own CPU usage.
pub struct SystemMonitor {
    system: System,
    pid: Option<Pid>,
}

impl SystemMonitor {
    /// Creates a monitor and takes the initial refresh.
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        let pid = sysinfo::get_current_pid().ok();
        if let Some(pid) = pid {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_cpu(),
            );
        }

        Self { system, pid }
    }

    fn core_count(&self) -> usize {
        match self.system.cpus().len() {
            0 => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
            n => n,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn process_cpu_percent(&mut self, cores: usize) -> f64 {
        let Some(pid) = self.pid else {
            return 0.0;
        };
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        // sysinfo reports per-core percent, so a busy process can exceed 100.
        self.system.process(pid).map_or(0.0, |process| {
            normalize_percent(f64::from(process.cpu_usage()) / cores.max(1) as f64)
        })
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSampler for SystemMonitor {
    fn sample(&mut self) -> SystemSample {
        self.system
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());

        let cores = self.core_count();
        let load_one = System::load_average().one;
        let cpu_percent = if load_one > 0.0 {
            cpu_percent_from_load(load_one, cores)
        } else {
            self.process_cpu_percent(cores)
        };

        SystemSample {
            cpu_percent,
            memory_percent: memory_percent(
                self.system.total_memory(),
                self.system.free_memory(),
            ),
        }
    }
}
