//! Host metrics provider.
//!
//! [`HostProbe`] hands out raw readings for one page view: per-core CPU
//! utilisation, virtual memory and usage of the filesystem holding a given
//! path. [`SysinfoProbe`] reads them from the operating system;
//! [`FixedProbe`] returns canned values.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use statpage_core::StatReading;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use thiserror::Error;

/// Errors from sampling the host.
#[derive(Debug, Error)]
pub enum SampleError {
    /// No mounted filesystem contains the requested path.
    #[error("No mounted filesystem found for {}", .0.display())]
    MountNotFound(PathBuf),

    /// The path could not be made absolute, usually because it does not exist.
    #[error("Cannot resolve {}: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw host readings.
///
/// Memory fields are reported in the order `total, available, percent,
/// used, free`; disk fields in the order `total, used, free, percent`.
/// Byte counts are integers, `percent` is a float.
pub trait HostProbe: Send + Debug {
    /// Utilisation of each logical core, in percent, measured over `window`.
    ///
    /// Blocks for at least `window`.
    fn cpu_percent_per_core(&mut self, window: Duration) -> Vec<f32>;

    /// Virtual memory usage.
    fn memory(&mut self) -> StatReading;

    /// Usage of the filesystem that holds `path`.
    fn disk(&mut self, path: &Path) -> Result<StatReading, SampleError>;
}

/// Percentage of `part` in `whole`, rounded to one decimal. Zero when empty.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let pct = part as f64 / whole as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Build a memory reading from totals in bytes.
pub fn memory_reading(total: u64, available: u64, used: u64, free: u64) -> StatReading {
    StatReading::builder()
        .field("total", total)
        .field("available", available)
        .field("percent", percent_of(total.saturating_sub(available), total))
        .field("used", used)
        .field("free", free)
        .build()
}

/// Build a disk reading from filesystem totals in bytes.
pub fn disk_reading(total: u64, available: u64) -> StatReading {
    let used = total.saturating_sub(available);
    StatReading::builder()
        .field("total", total)
        .field("used", used)
        .field("free", available)
        .field("percent", percent_of(used, used + available))
        .build()
}

/// Absolute form of `path` with symlinks and `..` resolved, ready for
/// [`find_mount`].
pub fn resolve_disk_path(path: &Path) -> Result<PathBuf, SampleError> {
    std::fs::canonicalize(path).map_err(|source| SampleError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Mount point among `mounts` that holds `path`: the longest one that
/// `path` starts with.
pub fn find_mount<'a>(path: &Path, mounts: impl IntoIterator<Item = &'a Path>) -> Option<&'a Path> {
    mounts
        .into_iter()
        .filter(|mount| path.starts_with(mount))
        .max_by_key(|mount| mount.components().count())
}

/// Probe backed by `sysinfo`.
///
/// Keeps one `System` and disk list alive between page views so each
/// sample only refreshes what it reads.
pub struct SysinfoProbe {
    sys: System,
    disks: Disks,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        let disks = Disks::new_with_refreshed_list();
        Self { sys, disks }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SysinfoProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProbe")
            .field("cpus", &self.sys.cpus().len())
            .field("disks", &self.disks.list().len())
            .finish()
    }
}

impl HostProbe for SysinfoProbe {
    fn cpu_percent_per_core(&mut self, window: Duration) -> Vec<f32> {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        self.sys.refresh_cpu_usage();
        self.sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect()
    }

    fn memory(&mut self) -> StatReading {
        self.sys.refresh_memory();
        memory_reading(
            self.sys.total_memory(),
            self.sys.available_memory(),
            self.sys.used_memory(),
            self.sys.free_memory(),
        )
    }

    fn disk(&mut self, path: &Path) -> Result<StatReading, SampleError> {
        let resolved = resolve_disk_path(path)?;
        self.disks.refresh_list();
        let mount = find_mount(&resolved, self.disks.list().iter().map(|d| d.mount_point()))
            .ok_or_else(|| SampleError::MountNotFound(path.to_path_buf()))?;
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == mount)
            .ok_or_else(|| SampleError::MountNotFound(path.to_path_buf()))?;
        Ok(disk_reading(disk.total_space(), disk.available_space()))
    }
}

/// Probe that returns the same readings every time.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    pub cpu: Vec<f32>,
    pub memory: StatReading,
    /// `None` behaves like a path with no mounted filesystem.
    pub disk: Option<StatReading>,
}

impl HostProbe for FixedProbe {
    fn cpu_percent_per_core(&mut self, _window: Duration) -> Vec<f32> {
        self.cpu.clone()
    }

    fn memory(&mut self) -> StatReading {
        self.memory.clone()
    }

    fn disk(&mut self, path: &Path) -> Result<StatReading, SampleError> {
        self.disk
            .clone()
            .ok_or_else(|| SampleError::MountNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statpage_core::{format_stats, StatValue};

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(5, 0), 0.0);
    }

    #[test]
    fn test_memory_reading_field_order() {
        let reading = memory_reading(16 * GIB, 12 * GIB, 3 * GIB, 9 * GIB);
        let keys: Vec<&str> = reading.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["total", "available", "percent", "used", "free"]);
        assert_eq!(reading.get("percent"), Some(StatValue::Float(25.0)));

        assert_eq!(
            format_stats(&reading).lines(),
            vec![
                "Total: 16.0 GB",
                "Available: 12.0 GB",
                "Percent: 25.0%",
                "Used: 3.0 GB",
                "Free: 9.0 GB",
            ]
        );
    }

    #[test]
    fn test_disk_reading() {
        let reading = disk_reading(100 * GIB, 75 * GIB);
        let keys: Vec<&str> = reading.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["total", "used", "free", "percent"]);
        assert_eq!(reading.get("used"), Some(StatValue::Int(25 * GIB)));
        assert_eq!(reading.get("percent"), Some(StatValue::Float(25.0)));
    }

    #[test]
    fn test_empty_disk_reading() {
        let reading = disk_reading(0, 0);
        assert_eq!(reading.get("percent"), Some(StatValue::Float(0.0)));
    }

    #[test]
    fn test_find_mount_prefers_longest() {
        let mounts = [Path::new("/"), Path::new("/media"), Path::new("/media/backup")];
        assert_eq!(
            find_mount(Path::new("/media/backup/photos"), mounts),
            Some(Path::new("/media/backup"))
        );
        assert_eq!(find_mount(Path::new("/home/user"), mounts), Some(Path::new("/")));
    }

    #[test]
    fn test_find_mount_matches_components_not_prefix_text() {
        let mounts = [Path::new("/media/back")];
        assert_eq!(find_mount(Path::new("/media/backup"), mounts), None);
    }

    #[test]
    fn test_relative_disk_path_resolves_to_root_mount() {
        let resolved = resolve_disk_path(Path::new(".")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(find_mount(&resolved, [Path::new("/")]), Some(Path::new("/")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_disk_path_resolves_to_target_mount() {
        let target = tempfile::tempdir().unwrap();
        let target_path = std::fs::canonicalize(target.path()).unwrap();
        let links = tempfile::tempdir().unwrap();
        let link = links.path().join("data");
        std::os::unix::fs::symlink(&target_path, &link).unwrap();

        let resolved = resolve_disk_path(&link).unwrap();
        assert_eq!(resolved, target_path);
        let mounts = [Path::new("/"), target_path.as_path()];
        assert_eq!(find_mount(&resolved, mounts), Some(target_path.as_path()));
        // Unresolved, the link only matches the root mount.
        assert_eq!(find_mount(&link, mounts), Some(Path::new("/")));
    }

    #[test]
    fn test_missing_disk_path_fails_to_resolve() {
        let err = resolve_disk_path(Path::new("/nonexistent/statpage/disk")).unwrap_err();
        assert!(matches!(err, SampleError::Resolve { .. }));
        assert!(err.to_string().starts_with("Cannot resolve /nonexistent/statpage/disk: "));
    }

    #[test]
    fn test_fixed_probe_missing_disk() {
        let mut probe = FixedProbe::default();
        let err = probe.disk(Path::new("/srv/data")).unwrap_err();
        assert_eq!(err.to_string(), "No mounted filesystem found for /srv/data");
    }

    #[test]
    fn test_sysinfo_probe_missing_disk_path() {
        let mut probe = SysinfoProbe::new();
        let err = probe.disk(Path::new("/nonexistent/statpage/disk")).unwrap_err();
        assert!(matches!(err, SampleError::Resolve { .. }));
    }

    #[test]
    fn test_sysinfo_probe_memory_is_sane() {
        let mut probe = SysinfoProbe::new();
        let memory = probe.memory();
        assert_eq!(memory.len(), 5);
        let pct = memory.get("percent").map(|v| v.as_f64()).unwrap();
        assert!((0.0..=100.0).contains(&pct));
    }
}
