use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::ConfigError;

/// Structure representing the detector geometry configuration. Names the channel map and the
/// constants needed to interpret it.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// CSV channel map. If None, the map bundled with the library is used
    pub channel_map_path: Option<PathBuf>,
    /// Number given to the first phi position of every ring (0 or 1). Channel maps always
    /// store phi positions counting from zero; the base only shifts the numbering seen by
    /// callers.
    pub phi_base: usize,
    pub chans_per_surf: usize,
    pub n_phi_sectors: usize,
    pub aft_fore_offset_deg: f64,
}

impl Default for GeometryConfig {
    /// Generate a new GeometryConfig describing the standard PUEO payload
    fn default() -> Self {
        Self {
            channel_map_path: None,
            phi_base: DEFAULT_PHI_BASE,
            chans_per_surf: DEFAULT_CHANS_PER_SURF,
            n_phi_sectors: DEFAULT_N_PHI_SECTORS,
            aft_fore_offset_deg: DEFAULT_AFT_FORE_OFFSET_DEG,
        }
    }
}

impl GeometryConfig {
    /// Read the configuration in a YAML file
    /// Returns a GeometryConfig if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;
        let config = serde_yaml::from_str::<Self>(&yaml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a YAML file, overwriting anything already there
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Check that the geometry constants make sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phi_base > 1 {
            return Err(ConfigError::InvalidField(
                "phi_base",
                self.phi_base.to_string(),
            ));
        }
        if self.chans_per_surf == 0 {
            return Err(ConfigError::InvalidField(
                "chans_per_surf",
                self.chans_per_surf.to_string(),
            ));
        }
        if self.n_phi_sectors == 0 {
            return Err(ConfigError::InvalidField(
                "n_phi_sectors",
                self.n_phi_sectors.to_string(),
            ));
        }
        if !self.aft_fore_offset_deg.is_finite() {
            return Err(ConfigError::InvalidField(
                "aft_fore_offset_deg",
                self.aft_fore_offset_deg.to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_custom_map(&self) -> bool {
        self.channel_map_path.is_some()
    }
}
