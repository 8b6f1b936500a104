/*
 *  metrics/mod.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Metrics snapshot model and the provider seam
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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod system;
pub mod worker;

pub use system::SystemMetrics;
pub use worker::MetricsWorker;

/// Shown in place of any value that could not be collected
pub const PLACEHOLDER: &str = "N/A";

/// Metrics that can appear in a line template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKey {
    Ip,
    Cpu,
    Temp,
    Mem,
    Disk,
    Uptime,
    Time,
}

impl MetricKey {
    pub const ALL: [MetricKey; 7] = [
        MetricKey::Ip,
        MetricKey::Cpu,
        MetricKey::Temp,
        MetricKey::Mem,
        MetricKey::Disk,
        MetricKey::Uptime,
        MetricKey::Time,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Ip => "ip",
            MetricKey::Cpu => "cpu",
            MetricKey::Temp => "temp",
            MetricKey::Mem => "mem",
            MetricKey::Disk => "disk",
            MetricKey::Uptime => "uptime",
            MetricKey::Time => "time",
        }
    }

    /// Case-insensitive lookup, so `{IP}` and `{ip}` both work
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A display-ready metric value.
///
/// Disk usage is reported per volume, everything else is a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    One(String),
    Many(Vec<String>),
}

impl MetricValue {
    pub fn placeholder() -> Self {
        MetricValue::One(PLACEHOLDER.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        match self {
            MetricValue::One(s) => s == PLACEHOLDER,
            MetricValue::Many(v) => v.is_empty(),
        }
    }

    /// Append the display form; volumes are joined with a single space
    pub fn write_to(&self, out: &mut String) {
        match self {
            MetricValue::One(s) => out.push_str(s),
            MetricValue::Many(v) if v.is_empty() => out.push_str(PLACEHOLDER),
            MetricValue::Many(v) => {
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(item);
                }
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.write_to(&mut s);
        f.write_str(&s)
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::One(s)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::One(s.to_string())
    }
}

impl From<Vec<String>> for MetricValue {
    fn from(v: Vec<String>) -> Self {
        MetricValue::Many(v)
    }
}

/// Immutable set of metric values valid until the next refresh.
///
/// Built once by a provider and then shared behind an `Arc`; a refresh
/// replaces the whole snapshot rather than editing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    values: BTreeMap<MetricKey, MetricValue>,
}

impl MetricsSnapshot {
    /// Snapshot with nothing collected yet; every key reads as the placeholder
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Builder: set one value
    pub fn with(mut self, key: MetricKey, value: impl Into<MetricValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricValue> {
        self.values.get(&key)
    }

    /// Append the display form of `key`, or the placeholder if missing
    pub fn write_value(&self, key: MetricKey, out: &mut String) {
        match self.values.get(&key) {
            Some(value) => value.write_to(out),
            None => out.push_str(PLACEHOLDER),
        }
    }

    pub fn display(&self, key: MetricKey) -> String {
        let mut s = String::new();
        self.write_value(key, &mut s);
        s
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(MetricKey, MetricValue)> for MetricsSnapshot {
    fn from_iter<I: IntoIterator<Item = (MetricKey, MetricValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// Source of metric snapshots.
///
/// Implementations never fail: a value that cannot be collected is
/// reported as [`PLACEHOLDER`], each field independently.
pub trait MetricsProvider: Send {
    fn fetch(&mut self) -> MetricsSnapshot;
}

impl<F> MetricsProvider for F
where
    F: FnMut() -> MetricsSnapshot + Send,
{
    fn fetch(&mut self) -> MetricsSnapshot {
        self()
    }
}
