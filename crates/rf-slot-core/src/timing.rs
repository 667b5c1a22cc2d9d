//! Timing profiles for win presentation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Longest single presentation delay, in milliseconds (one hour)
pub const MAX_DELAY_MS: f64 = 3_600_000.0;

/// Timing profile for win presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay speed
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Instant play
    Instant,
    /// Speed taken from config
    Custom,
}

impl TimingProfile {
    /// Speed multiplier for the built-in profiles (`None` for `Custom`)
    pub fn speed_multiplier(&self) -> Option<f64> {
        match self {
            Self::Normal => Some(1.0),
            Self::Turbo => Some(2.0),
            Self::Instant => Some(3.0),
            Self::Custom => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Turbo => "Turbo",
            Self::Instant => "Instant",
            Self::Custom => "Custom",
        }
    }
}

/// Base durations at speed 1.0, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTiming {
    /// Flat celebration timeout before returning to idle
    pub celebration_ms: f64,
    /// Static show-all preview when several lines win
    pub preview_all_ms: f64,
    /// Hold time per highlighted line
    pub win_display_ms: f64,
    /// Draw-in animation of one line
    pub line_draw_ms: f64,
    /// Gap after clearing a line, before the next one
    pub clear_gap_ms: f64,
}

impl AnimationTiming {
    pub fn normal() -> Self {
        Self {
            celebration_ms: 2000.0,
            preview_all_ms: 1000.0,
            win_display_ms: 400.0,
            line_draw_ms: 300.0,
            clear_gap_ms: 50.0,
        }
    }

    /// Every base duration must be finite, non-negative and at most [`MAX_DELAY_MS`]
    pub fn validate(&self) -> SlotResult<()> {
        let fields = [
            ("celebration_ms", self.celebration_ms),
            ("preview_all_ms", self.preview_all_ms),
            ("win_display_ms", self.win_display_ms),
            ("line_draw_ms", self.line_draw_ms),
            ("clear_gap_ms", self.clear_gap_ms),
        ];
        for (name, value) in fields {
            if !value.is_finite() || !(0.0..=MAX_DELAY_MS).contains(&value) {
                return Err(SlotError::InvalidConfig(format!(
                    "timing.{} must be within [0, {}] ms, got {}",
                    name, MAX_DELAY_MS, value
                )));
            }
        }
        Ok(())
    }

    /// Divide every duration by `speed` (> 1.0 = faster)
    pub fn scaled(&self, speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        Self {
            celebration_ms: self.celebration_ms / speed,
            preview_all_ms: self.preview_all_ms / speed,
            win_display_ms: self.win_display_ms / speed,
            line_draw_ms: self.line_draw_ms / speed,
            clear_gap_ms: self.clear_gap_ms / speed,
        }
    }

    pub fn celebration(&self) -> Duration {
        ms(self.celebration_ms)
    }

    pub fn preview_all(&self) -> Duration {
        ms(self.preview_all_ms)
    }

    /// Draw-in plus hold for one highlighted line
    pub fn line_reveal(&self) -> Duration {
        ms(self.line_draw_ms + self.win_display_ms)
    }

    pub fn clear_gap(&self) -> Duration {
        ms(self.clear_gap_ms)
    }

    /// Full presentation time for `wins` simultaneous wins
    pub fn sequence_duration(&self, wins: usize) -> Duration {
        match wins {
            0 => Duration::ZERO,
            1 => self.line_reveal(),
            n => {
                let per_line = self.line_draw_ms + self.win_display_ms + self.clear_gap_ms;
                ms(self.preview_all_ms + per_line * n as f64)
            }
        }
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Milliseconds to a `Duration`
///
/// Negative and NaN map to zero; anything above [`MAX_DELAY_MS`], infinity
/// included, saturates at the ceiling.
pub fn ms(millis: f64) -> Duration {
    if millis.is_nan() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(millis.min(MAX_DELAY_MS) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_speeds() {
        assert_eq!(TimingProfile::Normal.speed_multiplier(), Some(1.0));
        assert_eq!(TimingProfile::Instant.speed_multiplier(), Some(3.0));
        assert_eq!(TimingProfile::Custom.speed_multiplier(), None);
        assert_eq!(TimingProfile::default(), TimingProfile::Normal);
    }

    #[test]
    fn test_scaled_divides_durations() {
        let fast = AnimationTiming::normal().scaled(4.0);
        assert_eq!(fast.celebration(), Duration::from_millis(500));
        assert_eq!(fast.preview_all(), Duration::from_millis(250));
        assert!((fast.line_reveal().as_secs_f64() - 0.175).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_ignores_bad_speed() {
        let timing = AnimationTiming::normal();
        assert_eq!(timing.scaled(0.0), timing);
        assert_eq!(timing.scaled(f64::NAN), timing);
    }

    #[test]
    fn test_sequence_duration() {
        let timing = AnimationTiming::normal();
        assert_eq!(timing.sequence_duration(0), Duration::ZERO);
        assert!((timing.sequence_duration(1).as_secs_f64() - 0.7).abs() < 1e-9);
        assert_eq!(timing.sequence_duration(2), Duration::from_millis(2500));
    }

    #[test]
    fn test_ms_clamps() {
        assert_eq!(ms(-5.0), Duration::ZERO);
        assert_eq!(ms(f64::NAN), Duration::ZERO);
        assert_eq!(ms(1500.0), Duration::from_millis(1500));
    }

    #[test]
    fn test_ms_saturates_at_ceiling() {
        let ceiling = Duration::from_secs(3600);
        assert_eq!(ms(f64::INFINITY), ceiling);
        assert_eq!(ms(1e300), ceiling);

        let crawl = AnimationTiming::normal().scaled(1e-20);
        assert_eq!(crawl.celebration(), ceiling);
        assert_eq!(crawl.line_reveal(), ceiling);
        assert_eq!(crawl.sequence_duration(4), ceiling);
    }

    #[test]
    fn test_validate_rejects_bad_durations() {
        assert!(AnimationTiming::normal().validate().is_ok());

        let with = |f: fn(&mut AnimationTiming)| {
            let mut timing = AnimationTiming::normal();
            f(&mut timing);
            timing.validate()
        };
        assert!(with(|t| t.celebration_ms = 1e300).is_err());
        assert!(with(|t| t.preview_all_ms = f64::INFINITY).is_err());
        assert!(with(|t| t.win_display_ms = f64::NAN).is_err());
        assert!(with(|t| t.clear_gap_ms = -1.0).is_err());
        assert!(with(|t| t.line_draw_ms = 0.0).is_ok());
        assert!(matches!(
            with(|t| t.celebration_ms = MAX_DELAY_MS + 1.0),
            Err(SlotError::InvalidConfig(_))
        ));
    }
}
