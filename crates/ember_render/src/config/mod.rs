//! Configuration system
//!
//! Settings are plain serde structs loadable from TOML or RON files
//! through the [`Config`] trait, with sensible defaults so a missing file
//! is never fatal.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tunable renderer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Shadow map side length in pixels
    pub shadow_map_size: u32,
    /// Upper bound on point lights drawn per frame
    pub max_point_lights: usize,
    /// Exposure applied during tone mapping
    pub exposure: f32,
    /// Whether to frustum-cull renderables and lights
    pub enable_frustum_culling: bool,
}

impl RendererSettings {
    /// Set the shadow map resolution
    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size;
        self
    }

    /// Set the point light budget
    pub fn with_max_point_lights(mut self, count: usize) -> Self {
        self.max_point_lights = count;
        self
    }

    /// Set the tone-mapping exposure
    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }

    /// Enable or disable frustum culling
    pub fn with_frustum_culling(mut self, enabled: bool) -> Self {
        self.enable_frustum_culling = enabled;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.shadow_map_size == 0 || !self.shadow_map_size.is_power_of_two() {
            return Err(format!(
                "Shadow map size must be a power of two, got {}",
                self.shadow_map_size
            ));
        }
        if self.exposure <= 0.0 {
            return Err(format!("Exposure must be positive, got {}", self.exposure));
        }
        Ok(())
    }
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            max_point_lights: 32,
            exposure: 1.0,
            enable_frustum_culling: true,
        }
    }
}

impl Config for RendererSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RendererSettings::default();
        assert_eq!(settings.shadow_map_size, 2048);
        assert_eq!(settings.max_point_lights, 32);
        assert_eq!(settings.exposure, 1.0);
        assert!(settings.enable_frustum_culling);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = RendererSettings::default()
            .with_shadow_map_size(1024)
            .with_exposure(1.4);
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: RendererSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.shadow_map_size, 1024);
        assert_eq!(parsed.exposure, 1.4);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: RendererSettings = toml::from_str("exposure = 2.0").unwrap();
        assert_eq!(parsed.exposure, 2.0);
        assert_eq!(parsed.shadow_map_size, 2048);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(RendererSettings::default()
            .with_shadow_map_size(1000)
            .validate()
            .is_err());
        assert!(RendererSettings::default()
            .with_exposure(0.0)
            .validate()
            .is_err());
    }
}
