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

use std::fmt;

use cc_error::{CheckError, Result};
use tracing::info;

use crate::config::{CheckConfig, TempUnit};
use crate::constants::exit;
use crate::system;
use crate::w1::{self, Reading, SensorSource, W1SlaveFile};

/// Nagios service states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => exit::OK,
            ServiceState::Warning => exit::WARNING,
            ServiceState::Critical => exit::CRITICAL,
            ServiceState::Unknown => exit::UNKNOWN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "Warning",
            ServiceState::Critical => "Critical",
            ServiceState::Unknown => "Unknown",
        }
    }
}

/// Lower alert bounds. Colder is worse, so `critical <= warning`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    warning: f64,
    critical: f64,
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Result<Self> {
        if critical > warning {
            return Err(CheckError::InvalidThresholds { warning, critical });
        }
        Ok(Self { warning, critical })
    }

    pub fn warning(&self) -> f64 {
        self.warning
    }

    pub fn critical(&self) -> f64 {
        self.critical
    }

    pub fn classify(&self, value: f64) -> ServiceState {
        if value < self.critical {
            ServiceState::Critical
        } else if value < self.warning {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }
}

/// Outcome of one check: the state and the single value it was decided on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckResult {
    pub state: ServiceState,
    pub value: f64,
    pub unit: TempUnit,
    pub reading: Reading,
}

impl CheckResult {
    pub fn evaluate(reading: Reading, thresholds: &Thresholds, unit: TempUnit) -> Self {
        // Decide on the printed value so the line never contradicts its state.
        let value = round_value(reading.in_unit(unit));
        Self {
            state: thresholds.classify(value),
            value,
            unit,
            reading,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = format_value(self.value);
        write!(f, "{} Temp {} {} | {}", self.state.label(), v, self.unit.symbol(), v)
    }
}

/// Round to the four decimals the status line shows.
pub fn round_value(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Print the rounded value in its shortest form (`70.8116`, `68`).
pub fn format_value(value: f64) -> String {
    format!("{}", round_value(value))
}

/// Sample `source` once and classify the reading.
pub fn check_source<S: SensorSource + ?Sized>(source: &mut S, config: &CheckConfig) -> Result<CheckResult> {
    let reading = w1::read_temperature(source, &config.retry)?;
    let result = CheckResult::evaluate(reading, &config.thresholds, config.unit);
    info!(
        state = result.state.label(),
        value = result.value,
        attempts = reading.attempts,
        "check complete"
    );
    Ok(result)
}

/// Full plugin run against the real bus.
pub fn run(config: &CheckConfig) -> Result<CheckResult> {
    if config.load_modules {
        system::load_w1_modules();
    }
    let path = w1::locate_device(&config.devices_dir, &config.family, config.device.as_deref())?;
    let mut source = W1SlaveFile::new(path);
    info!(path = %source.path().display(), "reading sensor");
    check_source(&mut source, config)
}
