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

use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, warn};

use check_compost::check;
use check_compost::cli::Cli;
use check_compost::constants::exit;
use check_compost::logger;
use check_compost::CheckError;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            process::exit(exit::OK);
        }
        Err(e) => {
            let rendered = e.to_string();
            let detail = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            let err = CheckError::usage(detail);
            println!("{}", err);
            process::exit(err.exit_code());
        }
    };

    if let Err(e) = logger::init_logging(cli.verbose) {
        eprintln!("warning: {:#}", e);
    }
    debug!(?cli, "parsed arguments");

    // Thresholds are validated before the sensor is touched.
    let code = match cli.resolve().and_then(|config| check::run(&config)) {
        Ok(result) => {
            println!("{}", result);
            result.exit_code()
        }
        Err(e) => {
            warn!(error = ?e, "check failed");
            println!("{}", e);
            e.exit_code()
        }
    };
    process::exit(code);
}
