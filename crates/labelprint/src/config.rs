//! Configuration management for labelprint.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! device address, label code and raster size that used to be baked into
//! deployment scripts all live here.

use std::fmt;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::labels::{find_label, Dimensions};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "labelprint";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "LABELPRINT_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Command-line flags (see [`Overrides`])
/// 2. Environment variables (prefixed with `LABELPRINT_`, sections split by `__`)
/// 3. TOML config file at `~/.config/labelprint/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Printer driver configuration.
    pub printer: PrinterConfig,
    /// Vector-to-raster conversion configuration.
    pub raster: RasterConfig,
}

/// What to do when the printer driver exits with a non-zero status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverFailurePolicy {
    /// Report a warning and still exit successfully.
    ///
    /// `brother_ql` is known to print diagnostics and return non-zero after a
    /// job that was transmitted fine.
    #[default]
    Warn,
    /// Treat the status as a print failure.
    Fail,
}

/// Printer driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Driver executable.
    pub program: String,
    /// Device address handed to the driver's `--printer` option.
    pub device: String,
    /// Printer model (`--model`), if the driver should not guess.
    pub model: Option<String>,
    /// Driver backend (`--backend`), e.g. `pyusb` or `linux_kernel`.
    pub backend: Option<String>,
    /// Label-size code (`--label`).
    ///
    /// Endless codes such as `62` arrive from the environment as numbers.
    #[serde(deserialize_with = "string_or_number")]
    pub label: String,
    /// Extra arguments passed to the driver's `print` subcommand.
    pub extra_args: Vec<String>,
    /// Policy for non-zero driver exit statuses.
    pub on_failure: DriverFailurePolicy,
}

/// Raster conversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Image conversion executable (ImageMagick `convert` or `magick`).
    pub program: String,
    /// Target raster size. Derived from the label code when unset.
    pub size: Option<Dimensions>,
    /// Canvas fill colour.
    pub background: String,
    /// Rasterization density in dpi, if the converter's default is unsuitable.
    pub density: Option<u32>,
    /// Directory for the intermediate raster file. Defaults to the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

/// Accept a bare number wherever a code is expected.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct CodeVisitor;

    impl Visitor<'_> for CodeVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a label code such as \"62x100\" or 62")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(CodeVisitor)
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            program: "brother_ql".to_string(),
            // Brother QL-700
            device: "usb://0x04f9:0x2042".to_string(),
            model: Some("QL-700".to_string()),
            backend: None,
            label: "62x100".to_string(),
            extra_args: Vec::new(),
            on_failure: DriverFailurePolicy::Warn,
        }
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            program: "convert".to_string(),
            size: None,
            background: "white".to_string(),
            density: None,
            temp_dir: None,
        }
    }
}

/// Values supplied on the command line, applied over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Printer device address.
    pub device: Option<String>,
    /// Label-size code.
    pub label: Option<String>,
    /// Raster size.
    pub size: Option<Dimensions>,
    /// Printer model.
    pub model: Option<String>,
    /// Treat driver failures as fatal.
    pub strict: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(device) = self.device {
            config.printer.device = device;
        }
        if let Some(label) = self.label {
            config.printer.label = label;
        }
        if let Some(size) = self.size {
            config.raster.size = Some(size);
        }
        if let Some(model) = self.model {
            config.printer.model = Some(model);
        }
        if self.strict {
            config.printer.on_failure = DriverFailurePolicy::Fail;
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_with(config_path, Overrides::default())
    }

    /// Load configuration and apply command-line overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_with(config_path: Option<PathBuf>, overrides: Overrides) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        debug!("Loading configuration from {}", config_file.display());

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Config = figment.extract()?;
        overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// A raster size that disagrees with a known label is only warned about:
    /// the two are expected to match but the driver is the final judge.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("printer.program", &self.printer.program),
            ("printer.device", &self.printer.device),
            ("printer.label", &self.printer.label),
            ("raster.program", &self.raster.program),
            ("raster.background", &self.raster.background),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!("{key} must not be empty")));
            }
        }

        if self.raster.density == Some(0) {
            return Err(Error::config_validation(
                "raster.density must be greater than 0",
            ));
        }

        let label = find_label(&self.printer.label);
        match (self.raster.size, label) {
            (None, None) => {
                return Err(Error::config_validation(format!(
                    "unknown label '{}': set raster.size explicitly",
                    self.printer.label
                )));
            }
            (None, Some(spec)) if spec.dimensions().is_none() => {
                return Err(Error::config_validation(format!(
                    "label '{}' is endless: set raster.size to choose the label length",
                    spec.code
                )));
            }
            (Some(size), Some(spec)) if !spec.accepts(size) => {
                warn!(
                    label = spec.code,
                    %size,
                    "Raster size does not match the label's printable area"
                );
            }
            _ => {}
        }

        Ok(())
    }

    /// Get the raster size, deriving it from the label code if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if no size is configured and the label has no fixed
    /// dimensions.
    pub fn dimensions(&self) -> Result<Dimensions> {
        if let Some(size) = self.raster.size {
            return Ok(size);
        }
        find_label(&self.printer.label)
            .and_then(|spec| spec.dimensions())
            .ok_or_else(|| {
                Error::config_validation(format!(
                    "no raster size for label '{}'",
                    self.printer.label
                ))
            })
    }

    /// Get the directory for scratch raster files, resolving defaults if not set.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.raster
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.printer.program, "brother_ql");
        assert_eq!(config.printer.label, "62x100");
        assert_eq!(config.printer.on_failure, DriverFailurePolicy::Warn);
        assert_eq!(config.raster.program, "convert");
        assert_eq!(config.raster.background, "white");
        assert!(config.raster.size.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_dimensions_follow_label() {
        let config = Config::default();
        assert_eq!(config.dimensions().unwrap(), Dimensions::new(696, 1109));
    }

    #[test]
    fn test_explicit_size_wins_over_label() {
        let mut config = Config::default();
        config.raster.size = Some(Dimensions::new(696, 271));
        assert_eq!(config.dimensions().unwrap(), Dimensions::new(696, 271));
        // Mismatch is a warning, not an error
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_device() {
        let mut config = Config::default();
        config.printer.device = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("printer.device"));
    }

    #[test]
    fn test_validate_zero_density() {
        let mut config = Config::default();
        config.raster.density = Some(0);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("raster.density"));
    }

    #[test]
    fn test_validate_unknown_label_without_size() {
        let mut config = Config::default();
        config.printer.label = "63x101".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("unknown label"));

        config.raster.size = Some(Dimensions::new(700, 1100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_endless_label_needs_size() {
        let mut config = Config::default();
        config.printer.label = "62".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("endless"));

        config.raster.size = Some(Dimensions::new(696, 400));
        assert!(config.validate().is_ok());
        assert_eq!(config.dimensions().unwrap(), Dimensions::new(696, 400));
    }

    #[test]
    fn test_temp_dir_default_and_custom() {
        let mut config = Config::default();
        assert_eq!(config.temp_dir(), std::env::temp_dir());

        config.raster.temp_dir = Some(PathBuf::from("/var/spool/labels"));
        assert_eq!(config.temp_dir(), PathBuf::from("/var/spool/labels"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("labelprint"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r##"
                [printer]
                device = "usb://0x04f9:0x209b"
                label = "29x90"
                on_failure = "fail"

                [raster]
                background = "#ffffff"
                "##,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.printer.device, "usb://0x04f9:0x209b");
            assert_eq!(config.printer.on_failure, DriverFailurePolicy::Fail);
            assert_eq!(config.raster.background, "#ffffff");
            assert_eq!(config.printer.program, "brother_ql");
            assert_eq!(
                config.dimensions().map_err(|e| e.to_string())?,
                Dimensions::new(306, 991)
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [printer]
                device = "usb://0x04f9:0x209b"
                "#,
            )?;
            jail.set_env("LABELPRINT_PRINTER__DEVICE", "file:///dev/usb/lp0");
            jail.set_env("LABELPRINT_RASTER__SIZE", "696x271");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.printer.device, "file:///dev/usb/lp0");
            assert_eq!(config.raster.size, Some(Dimensions::new(696, 271)));
            Ok(())
        });
    }

    #[test]
    fn test_overrides_beat_env() {
        Jail::expect_with(|jail| {
            jail.set_env("LABELPRINT_PRINTER__LABEL", "29x90");

            let overrides = Overrides {
                label: Some("62x29".to_string()),
                model: Some("QL-800".to_string()),
                strict: true,
                ..Overrides::default()
            };
            let config = Config::load_with(Some(PathBuf::from("missing.toml")), overrides)
                .map_err(|e| e.to_string())?;
            assert_eq!(config.printer.label, "62x29");
            assert_eq!(config.printer.model.as_deref(), Some("QL-800"));
            assert_eq!(config.printer.on_failure, DriverFailurePolicy::Fail);
            Ok(())
        });
    }

    #[test]
    fn test_numeric_label_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("LABELPRINT_PRINTER__LABEL", "62");
            jail.set_env("LABELPRINT_RASTER__SIZE", "696x400");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.printer.label, "62");
            assert_eq!(config.raster.size, Some(Dimensions::new(696, 400)));
            Ok(())
        });
    }

    #[test]
    fn test_numeric_label_in_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[printer]\nlabel = 29\n\n[raster]\nsize = \"306x500\"\n",
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.printer.label, "29");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_bad_size() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[raster]\nsize = \"huge\"\n")?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigLoad(_))));
            Ok(())
        });
    }

    #[test]
    fn test_policy_serialize() {
        let json = serde_json::to_string(&DriverFailurePolicy::Fail).unwrap();
        assert_eq!(json, "\"fail\"");
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"device\""));
        assert!(json.contains("\"on_failure\":\"warn\""));
    }
}
