/*
 * This file is part of check-compost.
 *
 * Copyright (C) 2025 check-compost contributors
 *
 * check-compost is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * check-compost is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with check-compost. If not, see <https://www.gnu.org/licenses/>.
 */

//! DS18B20 access through the Linux 1-Wire sysfs interface.
//!
//! A `w1_slave` read triggers a conversion and returns two lines:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The first line ends in `YES` once the CRC of the scratchpad checks out.
//! The second carries the temperature in milli-degrees Celsius.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use cc_error::{CheckError, Result};
use tracing::{debug, info, trace, warn};

use crate::config::TempUnit;
use crate::constants::{polling, w1};

/// Source of raw `w1_slave` text. One call is one sensor poll.
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource {
    fn read_raw(&mut self) -> Result<String>;
}

/// The real sysfs data file of one device
#[derive(Debug, Clone)]
pub struct W1SlaveFile {
    path: PathBuf,
}

impl W1SlaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SensorSource for W1SlaveFile {
    fn read_raw(&mut self) -> Result<String> {
        let mut s = String::new();
        // The handle is dropped at the end of this statement.
        fs::File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut s))
            .map_err(|source| CheckError::DeviceRead {
                path: self.path.clone(),
                source,
            })?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause between polls; never grows
    pub interval: Duration,
    /// `None` keeps polling forever
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(polling::RETRY_INTERVAL_MS),
            timeout: Some(Duration::from_secs(polling::DEFAULT_TIMEOUT_SECS)),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Poll until the sensor answers, however long that takes.
    pub fn unbounded(interval: Duration) -> Self {
        Self { interval, timeout: None, max_attempts: None }
    }

    fn exhausted(&self, attempts: u32, started: Instant) -> bool {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return true;
        }
        self.timeout.is_some_and(|t| started.elapsed() >= t)
    }
}

/// One temperature sample. It is taken once per run and reused for both the
/// classification and the printed output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub celsius: f64,
    /// Number of polls it took, including the successful one
    pub attempts: u32,
}

impl Reading {
    pub fn fahrenheit(&self) -> f64 {
        TempUnit::F.from_celsius(self.celsius)
    }

    pub fn in_unit(&self, unit: TempUnit) -> f64 {
        unit.from_celsius(self.celsius)
    }
}

/// Find the data file of the first matching device under `devices_dir`.
///
/// With `device` set, only that directory is considered. Otherwise the first
/// entry (by name) starting with `family` wins.
pub fn locate_device(devices_dir: &Path, family: &str, device: Option<&str>) -> Result<PathBuf> {
    let no_device = || CheckError::NoDevice { searched: devices_dir.to_path_buf() };

    if let Some(id) = device {
        let dir = devices_dir.join(id);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "requested device not present");
            return Err(no_device());
        }
        return Ok(dir.join(w1::SLAVE_FILE));
    }

    let entries = match fs::read_dir(devices_dir) {
        Ok(it) => it,
        Err(e) => {
            debug!(dir = %devices_dir.display(), error = %e, "cannot list 1-Wire devices");
            return Err(no_device());
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|ent| ent.path().is_dir())
        .filter_map(|ent| ent.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(family))
        .collect();
    names.sort();

    let Some(first) = names.first() else {
        return Err(no_device());
    };
    if names.len() > 1 {
        info!(selected = %first, count = names.len(), "several sensors found, using the first");
    }
    Ok(devices_dir.join(first).join(w1::SLAVE_FILE))
}

/// Parse one `w1_slave` frame.
///
/// Returns `Ok(None)` while the sensor has not finished a valid conversion,
/// and the temperature in degrees Celsius once it has.
pub fn parse_frame(raw: &str) -> Result<Option<f64>> {
    let mut lines = raw.lines();
    let Some(status) = lines.next() else {
        return Ok(None);
    };
    if !status.trim().ends_with(w1::READY_TOKEN) {
        return Ok(None);
    }

    let data = lines
        .next()
        .ok_or_else(|| CheckError::parse("missing data line after status line"))?;
    let pos = data
        .find(w1::TEMP_MARKER)
        .ok_or_else(|| CheckError::parse(format!("no '{}' marker in '{}'", w1::TEMP_MARKER, data.trim())))?;
    let value = data[pos + w1::TEMP_MARKER.len()..].trim();
    // The driver always prints an integer; anything else is corrupt.
    let millis: i64 = value
        .parse()
        .map_err(|_| CheckError::parse(format!("invalid temperature value '{}'", value)))?;
    Ok(Some(millis as f64 / 1000.0))
}

/// Poll `source` until it yields a valid frame or `policy` runs out.
pub fn read_temperature<S: SensorSource + ?Sized>(source: &mut S, policy: &RetryPolicy) -> Result<Reading> {
    let started = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        let raw = source.read_raw()?;
        if let Some(celsius) = parse_frame(&raw)? {
            debug!(celsius, attempts, "sensor reading");
            return Ok(Reading { celsius, attempts });
        }
        if policy.exhausted(attempts, started) {
            warn!(attempts, elapsed = ?started.elapsed(), "sensor never became ready");
            return Err(CheckError::SensorNotReady { attempts });
        }
        trace!(attempts, "sensor not ready, retrying in {:?}", policy.interval);
        thread::sleep(policy.interval);
    }
}
