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

//! Command line interface
//!
//! Nagios passes thresholds as `-w`/`-c`. Everything else has defaults and
//! can also come from a JSON config file.

use std::path::PathBuf;

use cc_error::Result;
use clap::{ArgAction, Parser};

use crate::config::{load_saved_config, CheckConfig, SavedConfig, TempUnit};

#[derive(Parser, Debug, Default)]
#[command(name = "check_compost")]
#[command(version)]
#[command(about = "A compost-optimized Nagios plugin for the DS18B20 waterproof temperature sensor")]
#[command(long_about = "A compost-optimized Nagios plugin for the DS18B20 waterproof temperature sensor.

Alerts when the pile gets colder than the thresholds: OK is the hottest
state, WARNING is below -w, CRITICAL is below -c.

EXAMPLES:
    check_compost -w 110 -c 95
    check_compost -w 43 -c 35 --unit c --timeout 5

EXIT CODES:
    0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN (usage, config or sensor error)")]
pub struct Cli {
    /// Temperature below which you want a warning alert
    #[arg(short, long, allow_negative_numbers = true)]
    pub warning: Option<f64>,

    /// Temperature below which you want a critical alert
    #[arg(short, long, allow_negative_numbers = true)]
    pub critical: Option<f64>,

    /// Unit for thresholds and output
    #[arg(short, long, value_enum, ignore_case = true)]
    pub unit: Option<TempUnit>,

    /// Seconds to wait for a valid conversion (0 waits forever)
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Pause between sensor polls
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Give up after this many polls
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Device id to read, e.g. 28-0316a1b2c3ff (default: first found)
    #[arg(short, long, value_name = "ID")]
    pub device: Option<String>,

    /// 1-Wire devices directory
    #[arg(long, value_name = "DIR", env = "CHECK_COMPOST_DEVICES_DIR")]
    pub devices_dir: Option<PathBuf>,

    /// Device family prefix
    #[arg(long, value_name = "HEX")]
    pub family: Option<String>,

    /// Do not try to load the w1-gpio/w1-therm kernel modules
    #[arg(long)]
    pub no_modprobe: bool,

    /// JSON config file
    #[arg(long, value_name = "FILE", env = "CHECK_COMPOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The command line as a config layer
    pub fn layer(&self) -> SavedConfig {
        SavedConfig {
            warning: self.warning,
            critical: self.critical,
            unit: self.unit,
            devices_dir: self.devices_dir.clone(),
            family: self.family.clone(),
            device: self.device.clone(),
            timeout_secs: self.timeout,
            interval_ms: self.interval_ms,
            max_attempts: self.max_attempts,
            load_modules: self.no_modprobe.then_some(false),
        }
    }

    /// Merge the config file (if any) under the command line and validate.
    pub fn resolve(&self) -> Result<CheckConfig> {
        let file = match &self.config {
            Some(path) => load_saved_config(path)?,
            None => SavedConfig::default(),
        };
        CheckConfig::from_saved(file.overlay(self.layer()))
    }
}
