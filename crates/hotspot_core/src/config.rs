//! Experience Configuration
//!
//! Hotspot layout, audio cues and timing constants, stored as JSON.
//!
//! # Storage Locations
//! - Linux: `~/.config/hotspot/experience.json`
//! - Windows: `%APPDATA%\hotspot\experience.json`
//! - macOS: `~/Library/Application Support/hotspot/experience.json`

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use hotspot_audio::{AudioChannel, AudioCue, ChannelGroup, CrossfadeEngine, FadeEngine};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ConfigError;
use crate::geometry::Point3;
use crate::gesture::{
    GestureEvaluator, InteractiveTarget, DEFAULT_CONTROLLER_REACH, DEFAULT_PINCH_THRESHOLD,
};
use crate::proximity::{TriggerZone, ZoneId, ZoneSet};

/// A hotspot in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotConfig {
    pub id: ZoneId,
    pub position: Point3,
    /// Trigger radius in scene units
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    2.0
}

impl HotspotConfig {
    pub fn new(id: impl Into<ZoneId>, position: Point3) -> Self {
        Self {
            id: id.into(),
            position,
            radius: default_radius(),
        }
    }
}

/// Volume and fade timing for one logical sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueConfig {
    /// Resting volume (0.0-1.0)
    pub target_volume: f32,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
}

impl CueConfig {
    pub fn ambient() -> Self {
        Self {
            target_volume: 0.6,
            fade_in_ms: 1000,
            fade_out_ms: 800,
        }
    }

    pub fn media() -> Self {
        Self {
            target_volume: 0.8,
            fade_in_ms: 1000,
            fade_out_ms: 500,
        }
    }

    pub fn to_cue(&self) -> Result<AudioCue, ConfigError> {
        AudioCue::new(
            self.target_volume,
            Duration::from_millis(self.fade_in_ms),
            Duration::from_millis(self.fade_out_ms),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub hotspots: Vec<HotspotConfig>,
    pub ambient: CueConfig,
    pub media: CueConfig,
    /// Interval between volume updates during a fade
    pub fade_step_ms: u64,
    /// Pinch hit distance
    pub pinch_threshold: f32,
    /// Controller trigger hit distance (inclusive)
    pub controller_reach: f32,
    /// Delay between playback ending and the automatic exit
    pub playback_end_grace_ms: u64,
    /// Delay between scene load and the first ambient fade-in
    pub startup_audio_delay_ms: u64,
    /// Proximity sampling rate
    pub frame_rate_hz: u32,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            hotspots: vec![HotspotConfig::new("hotspot", Point3::new(0.0, 1.6, -5.0))],
            ambient: CueConfig::ambient(),
            media: CueConfig::media(),
            fade_step_ms: 50,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            controller_reach: DEFAULT_CONTROLLER_REACH,
            playback_end_grace_ms: 1000,
            startup_audio_delay_ms: 500,
            frame_rate_hz: 72,
        }
    }
}

impl ExperienceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, cue) in [("ambient", &self.ambient), ("media", &self.media)] {
            if !(0.0..=1.0).contains(&cue.target_volume) {
                return Err(ConfigError::Invalid(format!(
                    "{} target volume out of range: {}",
                    name, cue.target_volume
                )));
            }
        }
        if self.fade_step_ms == 0 {
            return Err(ConfigError::Invalid("fade step must be non-zero".into()));
        }
        if !is_positive_finite(self.pinch_threshold) || !is_positive_finite(self.controller_reach) {
            return Err(ConfigError::Invalid(format!(
                "gesture thresholds must be positive: pinch {}, controller {}",
                self.pinch_threshold, self.controller_reach
            )));
        }
        if !(1..=240).contains(&self.frame_rate_hz) {
            return Err(ConfigError::Invalid(format!(
                "Invalid frame rate: {}",
                self.frame_rate_hz
            )));
        }

        let mut seen = HashSet::new();
        for hotspot in &self.hotspots {
            if !is_positive_finite(hotspot.radius) {
                return Err(ConfigError::Invalid(format!(
                    "hotspot '{}' has invalid radius {}",
                    hotspot.id, hotspot.radius
                )));
            }
            if !seen.insert(&hotspot.id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate hotspot id '{}'",
                    hotspot.id
                )));
            }
        }
        Ok(())
    }

    pub fn fade_step(&self) -> Duration {
        Duration::from_millis(self.fade_step_ms)
    }

    pub fn playback_end_grace(&self) -> Duration {
        Duration::from_millis(self.playback_end_grace_ms)
    }

    pub fn startup_audio_delay(&self) -> Duration {
        Duration::from_millis(self.startup_audio_delay_ms)
    }

    /// Time between proximity frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate_hz.max(1)
    }

    pub fn fade_engine(&self) -> FadeEngine {
        FadeEngine::new(self.fade_step())
    }

    /// Crossfade engine over host channels using this config's cues
    pub fn crossfade_engine(
        &self,
        ambient: Vec<AudioChannel>,
        media: Vec<AudioChannel>,
    ) -> Result<CrossfadeEngine, ConfigError> {
        Ok(CrossfadeEngine::new(
            self.fade_engine(),
            ChannelGroup::new("ambient", ambient, self.ambient.to_cue()?),
            ChannelGroup::new("media", media, self.media.to_cue()?),
        ))
    }

    pub fn pinch_evaluator(&self) -> GestureEvaluator {
        GestureEvaluator::pinch(self.pinch_threshold)
    }

    pub fn controller_evaluator(&self) -> GestureEvaluator {
        GestureEvaluator::controller(self.controller_reach)
    }

    /// Fresh, unlatched trigger zones for every hotspot
    pub fn zones(&self) -> ZoneSet {
        ZoneSet::new(
            self.hotspots
                .iter()
                .map(|h| TriggerZone::new(h.id.clone(), h.position, h.radius))
                .collect(),
        )
    }

    /// Gesture targets for every hotspot
    pub fn targets(&self) -> Vec<InteractiveTarget> {
        self.hotspots
            .iter()
            .map(|h| InteractiveTarget::new(h.id.clone(), h.position))
            .collect()
    }

    /// Read and validate a config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        info!("Config loaded from {:?}", path);
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Load from the platform config dir, or return default if missing/invalid
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => error!("Failed to load config: {}", e),
                }
            }
        }

        info!("Using default config");
        Self::default()
    }

    /// Save to the platform config dir
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Get the platform-specific configuration file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "hotspot", "hotspot")
            .map(|proj| proj.config_dir().join("experience.json"))
    }
}

/// Rejects NaN along with zero, negatives and infinities
fn is_positive_finite(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}
