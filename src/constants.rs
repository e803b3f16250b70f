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

//! Constants and default values for check-compost
//!
//! Paths, tokens and timings of the 1-Wire sysfs interface live here so the
//! rest of the crate never hardcodes them.

/// 1-Wire sysfs layout
pub mod w1 {
    /// Directory holding one subdirectory per bus device
    pub const DEVICES_DIR: &str = "/sys/bus/w1/devices";

    /// Family code of the DS18B20 (device dirs look like `28-0316a1b2c3ff`)
    pub const DS18B20_FAMILY: &str = "28";

    /// Data interface file inside a device directory
    pub const SLAVE_FILE: &str = "w1_slave";

    /// Token ending the first line when the CRC check passed
    pub const READY_TOKEN: &str = "YES";

    /// Marker preceding the milli-degree Celsius value on the second line
    pub const TEMP_MARKER: &str = "t=";

    /// Kernel modules providing the bus master and the thermometer driver
    pub const KERNEL_MODULES: &[&str] = &["w1-gpio", "w1-therm"];
}

/// Sensor polling
pub mod polling {
    /// Pause between two reads of a sensor that is not ready yet
    pub const RETRY_INTERVAL_MS: u64 = 200;

    /// Upper bound accepted for the retry interval
    pub const MAX_RETRY_INTERVAL_MS: u64 = 60_000;

    /// Default time to wait for a ready sensor; 0 waits forever.
    /// Stays under the 10 s Nagios plugin timeout so our own error line wins.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
}

/// Environment variables
pub mod env {
    pub const CONFIG_FILE: &str = "CHECK_COMPOST_CONFIG";
    pub const DEVICES_DIR: &str = "CHECK_COMPOST_DEVICES_DIR";
}

/// Nagios plugin exit codes
pub mod exit {
    pub const OK: i32 = 0;
    pub const WARNING: i32 = 1;
    pub const CRITICAL: i32 = 2;
    pub const UNKNOWN: i32 = cc_error::UNKNOWN_EXIT_CODE;
}
