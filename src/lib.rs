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

//! check-compost - Nagios plugin for a DS18B20 1-Wire temperature sensor
//!
//! Reads the sensor once, compares the value against lower thresholds and
//! reports OK/WARNING/CRITICAL with the matching plugin exit code. Built as a
//! compost pile monitor: a cooling pile is the alert condition.

pub mod check;
pub mod cli;
pub mod config;
pub mod constants;
pub mod logger;
pub mod system;
pub mod w1;

pub use cc_error::{CheckError, Result};
