/*
 *  metrics/system.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host metrics gathered from /proc, /sys and sysinfo
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use local_ip_address::local_ip;
use log::debug;
use sysinfo::{DiskExt, System, SystemExt};

use super::{MetricKey, MetricValue, MetricsProvider, MetricsSnapshot, PLACEHOLDER};

/// Metrics provider backed by the Linux proc and sys filesystems, with
/// volume usage from sysinfo.
///
/// Every field is collected independently; a failed read degrades that
/// field to the placeholder and leaves the others alone.
#[derive(Debug)]
pub struct SystemMetrics {
    proc_root: PathBuf,
    sys_root: PathBuf,
    resolve_ip: bool,
    system: Option<System>,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
            resolve_ip: true,
            system: Some(System::new()),
        }
    }

    /// Read from alternate roots instead of `/proc` and `/sys`.
    /// The IP and volume lookups are skipped, they always report the placeholder.
    pub fn with_roots(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            resolve_ip: false,
            system: None,
        }
    }

    /// Reads the first float value from a given file path.
    fn read_first_float(path: &Path) -> io::Result<f64> {
        let content = fs::read_to_string(path)?;
        let first_word = content
            .split_whitespace()
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "empty file"))?;
        first_word
            .parse::<f64>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn ip(&self) -> String {
        if !self.resolve_ip {
            return PLACEHOLDER.to_string();
        }
        match local_ip() {
            Ok(addr) => addr.to_string(),
            Err(e) => {
                debug!("IP lookup failed: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    /// 1-minute load average, two decimals.
    fn cpu_load(&self) -> String {
        match Self::read_first_float(&self.proc_root.join("loadavg")) {
            Ok(load) => format!("{:.2}", load),
            Err(e) => {
                debug!("CPU load unavailable: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    /// First thermal zone, reported in millidegrees Celsius.
    fn cpu_temp(&self) -> String {
        let path = self.sys_root.join("class/thermal/thermal_zone0/temp");
        match Self::read_first_float(&path) {
            Ok(millideg) => format!("{:.1}'C", millideg / 1000.0),
            Err(e) => {
                debug!("CPU temperature unavailable: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Used/total memory in GiB with the used percentage.
    fn memory(&self) -> String {
        match self.read_meminfo() {
            Ok((total_kib, avail_kib)) if total_kib > 0 => {
                let used_kib = total_kib.saturating_sub(avail_kib);
                let gib = |kib: u64| kib as f64 / (1024.0 * 1024.0);
                format!(
                    "{:.1}/{:.1}GB {:.0}%",
                    gib(used_kib),
                    gib(total_kib),
                    used_kib as f64 * 100.0 / total_kib as f64
                )
            }
            Ok(_) => PLACEHOLDER.to_string(),
            Err(e) => {
                debug!("Memory usage unavailable: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    fn read_meminfo(&self) -> io::Result<(u64, u64)> {
        let content = fs::read_to_string(self.proc_root.join("meminfo"))?;
        let mut total = None;
        let mut available = None;
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let value = |v: Option<&str>| v.and_then(|s| s.parse::<u64>().ok());
            match parts.next() {
                Some("MemTotal:") => total = value(parts.next()),
                Some("MemAvailable:") => available = value(parts.next()),
                _ => {}
            }
        }
        match (total, available) {
            (Some(t), Some(a)) => Ok((t, a)),
            _ => Err(io::Error::new(io::ErrorKind::InvalidData, "MemTotal/MemAvailable missing")),
        }
    }

    /// Uptime in hours.
    fn uptime(&self) -> String {
        match Self::read_first_float(&self.proc_root.join("uptime")) {
            Ok(secs) => format!("{:.1}h", secs / 3600.0),
            Err(e) => {
                debug!("Uptime unavailable: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    /// One `device:used(pct%)` entry per mounted `/dev` volume.
    fn disks(&mut self) -> MetricValue {
        let Some(system) = self.system.as_mut() else {
            return MetricValue::placeholder();
        };
        system.refresh_disks_list();
        disk_usage(system.disks().iter().map(|disk| {
            (
                disk.name().to_string_lossy().into_owned(),
                disk.total_space(),
                disk.available_space(),
            )
        }))
    }
}

impl MetricsProvider for SystemMetrics {
    fn fetch(&mut self) -> MetricsSnapshot {
        MetricsSnapshot::default()
            .with(MetricKey::Ip, self.ip())
            .with(MetricKey::Cpu, self.cpu_load())
            .with(MetricKey::Temp, self.cpu_temp())
            .with(MetricKey::Mem, self.memory())
            .with(MetricKey::Disk, self.disks())
            .with(MetricKey::Uptime, self.uptime())
            .with(MetricKey::Time, Local::now().format("%H:%M:%S").to_string())
    }
}

/// Formats `(device, total, available)` volumes, keeping `/dev` devices
/// once each in the order given.
fn disk_usage<I>(volumes: I) -> MetricValue
where
    I: IntoIterator<Item = (String, u64, u64)>,
{
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();
    for (device, total, avail) in volumes {
        if !device.starts_with("/dev/") || !seen.insert(device.clone()) {
            continue;
        }
        entries.push(format_volume(&device, total.saturating_sub(avail), avail));
    }

    if entries.is_empty() {
        MetricValue::placeholder()
    } else {
        MetricValue::Many(entries)
    }
}

/// `df -h` style entry, percentage rounded up the way df does.
fn format_volume(device: &str, used: u64, avail: u64) -> String {
    let denom = used + avail;
    let pct = if denom == 0 { 0 } else { (used * 100).div_ceil(denom) };
    format!("{}:{}({}%)", device, human_size(used), pct)
}

/// Binary-prefixed size, one decimal below 10 like `df -h`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];
    if bytes < 1024 {
        return format!("{}", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value < 10.0 {
        format!("{:.1}{}", value, UNITS[unit])
    } else {
        format!("{:.0}{}", value, UNITS[unit])
    }
}
