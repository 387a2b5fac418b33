//! Configuration System using Figment
//!
//! Settings are loaded from:
//! 1. built-in defaults (the vendor's standard installation layout)
//! 2. an optional TOML file
//! 3. environment variables prefixed with `NSI_`
//!
//! # Environment Variable Overrides
//!
//! Nested keys are separated by a double underscore:
//!
//! ```text
//! NSI_SERVER__PROG_ID=NSI2000.server
//! NSI_SCRIPTS__BEAM_COUNT='D:\NSI2000\Script\ExportBeamCount.bas'
//! NSI_PROCESSING__HPTS=481
//! ```
//!
//! # Example
//!
//! ```toml
//! [server]
//! prog_id = "NSI2000.server"
//!
//! [scripts]
//! beam_count = 'C:\NSI2000\Script\ExportBeamCount.bas'
//!
//! [processing]
//! coordinate_system = "az_over_el"
//! polarization_basis = "l2_az_over_el"
//! hpts = 481
//! vpts = 481
//! probe = "oewg"
//! oewg_type = "WR90"
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::far_field::{CoordinateSystem, OewgProbeType, PolarizationBasis, ProbeType};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The figment providers could not be merged or extracted.
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    /// A value loaded fine but is not usable.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Automation server settings
    pub server: ServerConfig,
    /// Vendor script locations
    pub scripts: ScriptsConfig,
    /// Far-field processing applied before a report run
    pub processing: ProcessingConfig,
}

/// Automation server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// COM ProgID of the NSI2000 automation server
    pub prog_id: String,
}

/// Vendor script locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Script that exports the beam count to `<measurement>_BeamCount.txt`
    pub beam_count: PathBuf,
}

/// Far-field processing options. Unset fields leave the vendor setting alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Far-field coordinate system
    pub coordinate_system: Option<CoordinateSystem>,
    /// Far-field polarization basis
    pub polarization_basis: Option<PolarizationBasis>,
    /// Horizontal cut points
    pub hpts: Option<u32>,
    /// Vertical cut points
    pub vpts: Option<u32>,
    /// Probe correction model
    pub probe: Option<ProbeType>,
    /// Waveguide size when `probe` is OEWG
    pub oewg_type: Option<OewgProbeType>,
    /// Beamwidth threshold in dB below peak
    pub beamwidth_level_db: f64,
    /// Search the global peak at 2x2 resolution
    pub fast_peak: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            prog_id: default_prog_id(),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            beam_count: default_beam_count_script(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            coordinate_system: None,
            polarization_basis: None,
            hpts: None,
            vpts: None,
            probe: None,
            oewg_type: None,
            beamwidth_level_db: default_beamwidth_level(),
            fast_peak: false,
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn require_file(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "Configuration file '{}' not found",
            path.display()
        )))
    }
}

fn default_prog_id() -> String {
    "NSI2000.server".to_string()
}

fn default_beam_count_script() -> PathBuf {
    PathBuf::from(r"C:\NSI2000\Script\ExportBeamCount.bas")
}

fn default_beamwidth_level() -> f64 {
    crate::far_field::DEFAULT_BEAMWIDTH_LEVEL_DB
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment.
    ///
    /// Precedence, highest first: `NSI_` environment variables, the file,
    /// built-in defaults. A named file must exist.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if extraction or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            require_file(path)?;
            figment = figment.merge(Toml::file(path));
        }
        let settings: Self = figment
            .merge(Env::prefixed("NSI_").split("__"))
            .extract()
            .map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a specific file, ignoring the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        require_file(path.as_ref())?;
        let settings: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading
    ///
    /// Checks:
    /// - ProgID and beam count script are set
    /// - point counts are positive
    /// - beamwidth level is a finite negative dB value
    /// - the probe model is one the console can select, with a waveguide size
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.prog_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.prog_id cannot be empty".to_string(),
            ));
        }

        if self.scripts.beam_count.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "scripts.beam_count cannot be empty".to_string(),
            ));
        }

        let processing = &self.processing;
        for (key, points) in [("hpts", processing.hpts), ("vpts", processing.vpts)] {
            if points == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "processing.{} must be at least 1",
                    key
                )));
            }
        }

        if !processing.beamwidth_level_db.is_finite() || processing.beamwidth_level_db >= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid beamwidth_level_db {}. Must be below 0 dB",
                processing.beamwidth_level_db
            )));
        }

        match processing.probe {
            None => {}
            Some(ProbeType::Oewg) => {
                if processing.oewg_type.is_none() {
                    return Err(ConfigError::ValidationError(
                        "processing.probe = \"oewg\" requires processing.oewg_type".to_string(),
                    ));
                }
            }
            Some(other) => {
                return Err(ConfigError::ValidationError(format!(
                    "Probe model '{}' cannot be selected through the console. Use 'oewg'",
                    other
                )));
            }
        }

        Ok(())
    }
}
