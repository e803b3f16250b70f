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

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cc_error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::Thresholds;
use crate::constants::{polling, w1};
use crate::w1::RetryPolicy;

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    C,
    #[default]
    F,
    K,
}

impl TempUnit {
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TempUnit::C => celsius,
            TempUnit::F => celsius * 9.0 / 5.0 + 32.0,
            TempUnit::K => celsius + 273.15,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TempUnit::C => "C",
            TempUnit::F => "F",
            TempUnit::K => "K",
        }
    }
}

/// One configuration layer. Every field is optional so the JSON file and the
/// command line can be stacked with [`SavedConfig::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedConfig {
    #[serde(default)]
    pub warning: Option<f64>,
    #[serde(default)]
    pub critical: Option<f64>,
    #[serde(default)]
    pub unit: Option<TempUnit>,
    #[serde(default)]
    pub devices_dir: Option<PathBuf>,
    /// Device family prefix, `28` for DS18B20
    #[serde(default)]
    pub family: Option<String>,
    /// Full device id such as `28-0316a1b2c3ff`
    #[serde(default)]
    pub device: Option<String>,
    /// 0 waits for the sensor forever
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub load_modules: Option<bool>,
}

impl SavedConfig {
    /// Stack `top` over `self`; fields set in `top` win.
    pub fn overlay(self, top: SavedConfig) -> SavedConfig {
        SavedConfig {
            warning: top.warning.or(self.warning),
            critical: top.critical.or(self.critical),
            unit: top.unit.or(self.unit),
            devices_dir: top.devices_dir.or(self.devices_dir),
            family: top.family.or(self.family),
            device: top.device.or(self.device),
            timeout_secs: top.timeout_secs.or(self.timeout_secs),
            interval_ms: top.interval_ms.or(self.interval_ms),
            max_attempts: top.max_attempts.or(self.max_attempts),
            load_modules: top.load_modules.or(self.load_modules),
        }
    }
}

/// Fully resolved and validated settings for one check run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    pub thresholds: Thresholds,
    pub unit: TempUnit,
    pub devices_dir: PathBuf,
    pub family: String,
    pub device: Option<String>,
    pub retry: RetryPolicy,
    pub load_modules: bool,
}

impl CheckConfig {
    pub fn from_saved(saved: SavedConfig) -> Result<Self> {
        validate_saved_config(&saved)?;

        let warning = saved
            .warning
            .ok_or_else(|| CheckError::usage("the following required arguments were not provided: --warning"))?;
        let critical = saved
            .critical
            .ok_or_else(|| CheckError::usage("the following required arguments were not provided: --critical"))?;
        let thresholds = Thresholds::new(warning, critical)?;

        let timeout = match saved.timeout_secs.unwrap_or(polling::DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let retry = RetryPolicy {
            interval: Duration::from_millis(saved.interval_ms.unwrap_or(polling::RETRY_INTERVAL_MS)),
            timeout,
            max_attempts: saved.max_attempts,
        };

        let config = CheckConfig {
            thresholds,
            unit: saved.unit.unwrap_or_default(),
            devices_dir: saved.devices_dir.unwrap_or_else(|| PathBuf::from(w1::DEVICES_DIR)),
            family: saved.family.unwrap_or_else(|| w1::DS18B20_FAMILY.to_string()),
            device: saved.device,
            retry,
            load_modules: saved.load_modules.unwrap_or(true),
        };
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn is_safe_device_id(s: &str) -> bool {
    if s.is_empty() || s.len() > 64 || s == "." || s == ".." {
        return false;
    }
    s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub fn validate_saved_config(cfg: &SavedConfig) -> Result<()> {
    if let Some(w) = cfg.warning {
        if !w.is_finite() {
            return Err(CheckError::config("warning threshold must be a finite number"));
        }
    }
    if let Some(c) = cfg.critical {
        if !c.is_finite() {
            return Err(CheckError::config("critical threshold must be a finite number"));
        }
    }
    if let Some(ms) = cfg.interval_ms {
        if ms > polling::MAX_RETRY_INTERVAL_MS {
            return Err(CheckError::config(format!(
                "retry interval {}ms out of range (max {}ms)",
                ms,
                polling::MAX_RETRY_INTERVAL_MS
            )));
        }
    }
    if cfg.max_attempts == Some(0) {
        return Err(CheckError::config("max attempts must be at least 1"));
    }
    if let Some(family) = &cfg.family {
        if family.is_empty() || family.len() > 2 || !family.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CheckError::config(format!("invalid device family prefix '{}'", family)));
        }
    }
    if let Some(device) = &cfg.device {
        if !is_safe_device_id(device) {
            return Err(CheckError::config(format!("invalid device id '{}'", device)));
        }
    }
    Ok(())
}

pub fn load_saved_config(path: &Path) -> Result<SavedConfig> {
    let data = fs::read_to_string(path).map_err(|source| CheckError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: SavedConfig = serde_json::from_str(&data)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn thresholds_only(warning: f64, critical: f64) -> SavedConfig {
        SavedConfig {
            warning: Some(warning),
            critical: Some(critical),
            ..Default::default()
        }
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&TempUnit::C).unwrap(), "\"c\"");
        assert_eq!(serde_json::to_string(&TempUnit::F).unwrap(), "\"f\"");
        assert_eq!(serde_json::from_str::<TempUnit>("\"k\"").unwrap(), TempUnit::K);
    }

    #[test]
    fn test_default_unit_is_fahrenheit() {
        assert_eq!(TempUnit::default(), TempUnit::F);
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TempUnit::C.from_celsius(21.5), 21.5);
        assert_eq!(TempUnit::F.from_celsius(100.0), 212.0);
        assert_eq!(TempUnit::F.from_celsius(-40.0), -40.0);
        assert!((TempUnit::K.from_celsius(0.0) - 273.15).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = CheckConfig::from_saved(thresholds_only(110.0, 95.0)).unwrap();
        assert_eq!(cfg.unit, TempUnit::F);
        assert_eq!(cfg.devices_dir, PathBuf::from("/sys/bus/w1/devices"));
        assert_eq!(cfg.family, "28");
        assert_eq!(cfg.device, None);
        assert_eq!(cfg.retry.interval, Duration::from_millis(200));
        assert_eq!(cfg.retry.timeout, Some(Duration::from_secs(8)));
        assert_eq!(cfg.retry.max_attempts, None);
        assert!(cfg.load_modules);
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let mut saved = thresholds_only(110.0, 95.0);
        saved.timeout_secs = Some(0);
        let cfg = CheckConfig::from_saved(saved).unwrap();
        assert_eq!(cfg.retry.timeout, None);
    }

    #[test]
    fn test_critical_above_warning_rejected() {
        let err = CheckConfig::from_saved(thresholds_only(60.0, 70.0)).unwrap_err();
        assert!(matches!(err, CheckError::InvalidThresholds { .. }));
    }

    #[test]
    fn test_equal_thresholds_accepted() {
        assert!(CheckConfig::from_saved(thresholds_only(70.0, 70.0)).is_ok());
    }

    #[test]
    fn test_missing_threshold_is_usage_error() {
        let saved = SavedConfig { warning: Some(70.0), ..Default::default() };
        let err = CheckConfig::from_saved(saved).unwrap_err();
        assert!(matches!(err, CheckError::Usage(ref m) if m.contains("--critical")));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let err = validate_saved_config(&thresholds_only(f64::NAN, 10.0)).unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
    }

    #[test]
    fn test_invalid_family_rejected() {
        for family in ["", "zz", "282"] {
            let mut saved = thresholds_only(70.0, 60.0);
            saved.family = Some(family.to_string());
            assert!(validate_saved_config(&saved).is_err(), "family {:?}", family);
        }
    }

    #[test]
    fn test_device_id_cannot_escape_devices_dir() {
        for device in ["..", "../28-x", "28-abc/w1_slave", ""] {
            let mut saved = thresholds_only(70.0, 60.0);
            saved.device = Some(device.to_string());
            assert!(validate_saved_config(&saved).is_err(), "device {:?}", device);
        }
        let mut saved = thresholds_only(70.0, 60.0);
        saved.device = Some("28-0316a1b2c3ff".to_string());
        assert!(validate_saved_config(&saved).is_ok());
    }

    #[test]
    fn test_interval_and_attempt_limits() {
        let mut saved = thresholds_only(70.0, 60.0);
        saved.interval_ms = Some(polling::MAX_RETRY_INTERVAL_MS + 1);
        assert!(validate_saved_config(&saved).is_err());

        let mut saved = thresholds_only(70.0, 60.0);
        saved.max_attempts = Some(0);
        assert!(validate_saved_config(&saved).is_err());
    }

    #[test]
    fn test_overlay_prefers_top_layer() {
        let file = SavedConfig {
            warning: Some(110.0),
            critical: Some(95.0),
            family: Some("28".to_string()),
            ..Default::default()
        };
        let cli = SavedConfig {
            warning: Some(100.0),
            unit: Some(TempUnit::C),
            ..Default::default()
        };
        let merged = file.overlay(cli);
        assert_eq!(merged.warning, Some(100.0));
        assert_eq!(merged.critical, Some(95.0));
        assert_eq!(merged.unit, Some(TempUnit::C));
        assert_eq!(merged.family.as_deref(), Some("28"));
    }

    #[test]
    fn test_load_saved_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"{{ "warning": 110.0, "critical": 95.0, "unit": "c", "timeout_secs": 3 }}"#
        )
        .unwrap();
        temp_file.flush().unwrap();

        let cfg = load_saved_config(temp_file.path()).unwrap();
        assert_eq!(cfg.warning, Some(110.0));
        assert_eq!(cfg.unit, Some(TempUnit::C));
        assert_eq!(cfg.timeout_secs, Some(3));
    }

    #[test]
    fn test_load_saved_config_rejects_unknown_fields() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{ "warning": 1.0, "colour": "brown" }}"#).unwrap();
        temp_file.flush().unwrap();

        let err = load_saved_config(temp_file.path()).unwrap_err();
        assert!(matches!(err, CheckError::JsonParse(_)));
    }

    #[test]
    fn test_load_saved_config_missing_file() {
        let err = load_saved_config(Path::new("/nonexistent/check_compost.json")).unwrap_err();
        assert!(matches!(err, CheckError::ConfigRead { .. }));
    }
}
