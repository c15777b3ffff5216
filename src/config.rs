use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SEGMENT_LENGTH: f32 = 5.0;
pub const DEFAULT_SEGMENT_WIDTH: f32 = 20.0;
pub const DEFAULT_TOLERANCE: f32 = 10.0;
pub const DEFAULT_MIN_HITS_PER_SEGMENT: u32 = 5;
pub const DEFAULT_SUCCESS_THRESHOLD: f32 = 95.0;
pub const DEFAULT_SCALE: f32 = 10.0;
pub const DEFAULT_CANVAS_WIDTH: f32 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;
pub const DEFAULT_DOT_SPACING: f32 = 10.0;
pub const DEFAULT_DOT_INTERVAL_MS: u64 = 50;
pub const DEFAULT_ARROW_SIZE: f32 = 15.0;
/// Smallest segment length or dot spacing accepted.
pub const MIN_STEP: f32 = 0.1;

/// How a segment's hit region is laid out before the tolerance margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitRegion {
    /// Unrotated rectangle, `length` wide and `width` tall, whatever the
    /// segment heading.
    #[default]
    AxisAligned,
    /// Rectangle rotated to the segment heading.
    Oriented,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentConfig {
    pub length: f32,
    pub width: f32,
    pub hit_region: HitRegion,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_SEGMENT_LENGTH,
            width: DEFAULT_SEGMENT_WIDTH,
            hit_region: HitRegion::AxisAligned,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfig {
    pub tolerance: f32,
    pub min_hits_per_segment: u32,
    /// Percentage of completed segments needed to advance, in (0, 100].
    pub success_threshold: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_hits_per_segment: DEFAULT_MIN_HITS_PER_SEGMENT,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    pub scale: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuidanceConfig {
    pub enabled: bool,
    pub dot_spacing: f32,
    pub dot_interval_ms: u64,
    pub arrow_size: f32,
    /// Replay the demonstration after this long without drawing. 0 disables.
    pub inactivity_ms: u64,
    /// A pointer-down during a demonstration cancels it and starts the gesture.
    pub interruptible: bool,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dot_spacing: DEFAULT_DOT_SPACING,
            dot_interval_ms: DEFAULT_DOT_INTERVAL_MS,
            arrow_size: DEFAULT_ARROW_SIZE,
            inactivity_ms: 0,
            interruptible: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracerConfig {
    pub segments: SegmentConfig,
    pub tracking: TrackingConfig,
    pub placement: PlacementConfig,
    pub guidance: GuidanceConfig,
}

impl TracerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: TracerConfig =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("segments.length", self.segments.length, MIN_STEP)?;
        positive("segments.width", self.segments.width)?;
        if !(self.tracking.tolerance.is_finite() && self.tracking.tolerance >= 0.0) {
            return Err(ConfigError::Validation(
                "tracking.tolerance must be >= 0".into(),
            ));
        }
        if self.tracking.min_hits_per_segment == 0 {
            return Err(ConfigError::Validation(
                "tracking.min_hits_per_segment must be > 0".into(),
            ));
        }
        let threshold = self.tracking.success_threshold;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(ConfigError::Validation(
                "tracking.success_threshold must be in (0, 100]".into(),
            ));
        }
        positive("placement.scale", self.placement.scale)?;
        positive("placement.canvas_width", self.placement.canvas_width)?;
        positive("placement.canvas_height", self.placement.canvas_height)?;
        if self.guidance.enabled {
            at_least("guidance.dot_spacing", self.guidance.dot_spacing, MIN_STEP)?;
            if self.guidance.dot_interval_ms == 0 {
                return Err(ConfigError::Validation(
                    "guidance.dot_interval_ms must be > 0".into(),
                ));
            }
            if !(self.guidance.arrow_size.is_finite() && self.guidance.arrow_size >= 0.0) {
                return Err(ConfigError::Validation(
                    "guidance.arrow_size must be >= 0".into(),
                ));
            }
        }
        Ok(())
    }
}

fn at_least(field: &str, value: f32, min: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{field} must be >= {min}")))
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{field} must be > 0")))
    }
}
