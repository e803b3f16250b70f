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

use std::io;
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::constants::w1::KERNEL_MODULES;

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

fn modprobe(module: &str) -> io::Result<Output> {
    Command::new("modprobe").args(["-q", module]).output()
}

/// Load the 1-Wire bus master and thermometer drivers.
///
/// Best effort: the modules are often built in or loaded at boot, and a
/// missing sensor is reported later by the device lookup anyway.
pub fn load_w1_modules() {
    if !is_root() {
        debug!("not running as root, skipping modprobe");
        return;
    }
    load_modules_with(modprobe);
}

/// Run `load` for every 1-Wire module and return how many loaded.
pub fn load_modules_with<F>(mut load: F) -> usize
where
    F: FnMut(&str) -> io::Result<Output>,
{
    let mut loaded = 0;
    for module in KERNEL_MODULES {
        match load(*module) {
            Ok(output) if output.status.success() => {
                info!("Loaded kernel module: {}", module);
                loaded += 1;
            }
            Ok(output) => {
                debug!(
                    "Module {} not available: {}",
                    module,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                debug!("Could not run modprobe for {}: {}", module, e);
            }
        }
    }
    loaded
}
