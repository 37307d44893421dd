use crate::animator::{RepeatLimit, MAX_TIME_STEP};
use crate::clock::DEFAULT_TICK;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Number of leading frames decoded eagerly on load.
pub const DEFAULT_PRELOAD_WINDOW: usize = 100;

/// What `current_frame` shows when the current index has no raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRaster {
    /// Keep showing the last frame that had a raster.
    #[default]
    HoldPrevious,
    /// Show nothing.
    Placeholder,
}

/// Playback settings for an [`AnimatedImageController`](crate::AnimatedImageController).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub preload_window: usize,
    /// `None` follows the container's loop count, see
    /// [`RepeatLimit::from_loop_count`]. A GIF without a NETSCAPE2.0 loop
    /// extension then plays a single pass and stops; it does not loop
    /// forever. Set `Some(RepeatLimit::INFINITE)` to loop every image.
    pub repeat_limit: Option<RepeatLimit>,
    /// Largest elapsed time a single tick may contribute, in seconds.
    /// Must be positive.
    pub max_time_step: f64,
    /// Elapsed time assumed for a zero-rate tick with no measured interval.
    /// Must be positive.
    pub fallback_tick: f64,
    pub missing_raster: MissingRaster,
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            preload_window: DEFAULT_PRELOAD_WINDOW,
            repeat_limit: None,
            max_time_step: MAX_TIME_STEP,
            fallback_tick: DEFAULT_TICK,
            missing_raster: MissingRaster::HoldPrevious,
            autoplay: true,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject time settings that would make every tick a no-op.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_time_step", self.max_time_step),
            ("fallback_tick", self.fallback_tick),
        ] {
            // Also rejects NaN.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Repeat limit for a load whose container declares `loop_count`.
    pub fn resolve_repeat_limit(&self, loop_count: Option<u16>) -> RepeatLimit {
        self.repeat_limit
            .unwrap_or_else(|| RepeatLimit::from_loop_count(loop_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(PlayerConfig::from_json("{}").unwrap(), PlayerConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = PlayerConfig::from_json(
            r#"{ "preload_window": 4, "repeat_limit": 2, "missing_raster": "placeholder" }"#,
        )
        .unwrap();
        assert_eq!(config.preload_window, 4);
        assert_eq!(config.repeat_limit, Some(RepeatLimit(2)));
        assert_eq!(config.missing_raster, MissingRaster::Placeholder);
        assert!(config.autoplay);
        assert_eq!(config.max_time_step, MAX_TIME_STEP);
    }

    #[test]
    fn explicit_limit_wins_over_container() {
        let mut config = PlayerConfig::default();
        assert_eq!(config.resolve_repeat_limit(Some(0)), RepeatLimit::INFINITE);
        assert_eq!(config.resolve_repeat_limit(None), RepeatLimit(1));

        config.repeat_limit = Some(RepeatLimit(5));
        assert_eq!(config.resolve_repeat_limit(Some(0)), RepeatLimit(5));
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        assert!(matches!(
            PlayerConfig::from_json(r#"{ "missing_raster": "blank" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn non_positive_time_settings_are_rejected() {
        for json in [
            r#"{ "max_time_step": 0 }"#,
            r#"{ "max_time_step": -0.5 }"#,
            r#"{ "fallback_tick": 0.0 }"#,
            r#"{ "fallback_tick": -1 }"#,
        ] {
            assert!(
                matches!(PlayerConfig::from_json(json), Err(ConfigError::NonPositive { .. })),
                "{json}"
            );
        }

        let err = PlayerConfig::from_json(r#"{ "fallback_tick": -1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "fallback_tick",
                ..
            }
        ));
        assert!(PlayerConfig::default().validate().is_ok());
    }
}
