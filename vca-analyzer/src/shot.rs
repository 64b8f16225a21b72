//! Shot-boundary detection over a per-frame epsilon series.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vca_core::Error as CoreError;

/// Thresholds for shot-boundary detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotDetectionConfig {
    /// Epsilon at or above this marks a shot unless one was marked recently.
    pub min_epsilon_thresh: f64,
    /// Epsilon at or above this always marks a shot.
    pub max_epsilon_thresh: f64,
    /// Frame rate of the series; the proximity window is half a second of
    /// frames. 0 disables the proximity rule and both thresholds act alike.
    pub fps: f64,
}

impl Default for ShotDetectionConfig {
    fn default() -> Self {
        Self {
            min_epsilon_thresh: 10.0,
            max_epsilon_thresh: 50.0,
            fps: 0.0,
        }
    }
}

/// One frame of the epsilon series, labeled in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotFrame {
    /// Inter-frame change metric produced by the analyzer.
    pub epsilon: f64,
    /// Set when this frame starts a new shot.
    pub is_new_shot: bool,
}

impl ShotFrame {
    /// Create an unlabeled frame from its epsilon value.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            is_new_shot: false,
        }
    }
}

/// Label every frame of the epsilon series with its shot-boundary flag.
///
/// Frame 0 always starts a shot. A later frame starts a shot when its epsilon
/// reaches `max_epsilon_thresh`, or when it reaches `min_epsilon_thresh` and
/// no shot was marked within the previous half second of frames.
pub fn detect_shots(config: &ShotDetectionConfig, frames: &mut [ShotFrame]) -> Result<()> {
    if !config.fps.is_finite() || config.fps < 0.0 {
        return Err(CoreError::invalid_config(format!("invalid fps {}", config.fps)).into());
    }
    if !config.min_epsilon_thresh.is_finite()
        || !config.max_epsilon_thresh.is_finite()
        || config.min_epsilon_thresh > config.max_epsilon_thresh
    {
        return Err(CoreError::invalid_config(format!(
            "invalid epsilon thresholds [{}, {}]",
            config.min_epsilon_thresh, config.max_epsilon_thresh
        ))
        .into());
    }

    let Some(first) = frames.first_mut() else {
        return Ok(());
    };
    first.is_new_shot = true;

    let window = (config.fps / 2.0).ceil() as usize;
    let mut last_shot = 0usize;

    for i in 1..frames.len() {
        let epsilon = frames[i].epsilon;
        let recently_marked = window > 0 && i - last_shot <= window;
        let is_shot = epsilon >= config.max_epsilon_thresh
            || (epsilon >= config.min_epsilon_thresh && !recently_marked);

        frames[i].is_new_shot = is_shot;
        if is_shot {
            last_shot = i;
        }
    }

    let shots = frames.iter().filter(|f| f.is_new_shot).count();
    debug!(frames = frames.len(), shots, "shot detection complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: &ShotDetectionConfig, epsilons: &[f64]) -> Vec<bool> {
        let mut frames: Vec<ShotFrame> = epsilons.iter().map(|&e| ShotFrame::new(e)).collect();
        detect_shots(config, &mut frames).unwrap();
        frames.iter().map(|f| f.is_new_shot).collect()
    }

    #[test]
    fn test_empty_series() {
        let mut frames: Vec<ShotFrame> = Vec::new();
        assert!(detect_shots(&ShotDetectionConfig::default(), &mut frames).is_ok());
    }

    #[test]
    fn test_first_frame_is_always_a_shot() {
        let labels = run(&ShotDetectionConfig::default(), &[0.0, 1.0, 2.0]);
        assert_eq!(labels, vec![true, false, false]);
    }

    #[test]
    fn test_threshold_only_labeling() {
        let config = ShotDetectionConfig::default();
        let labels = run(&config, &[0.0, 5.0, 55.0, 3.0, 2.0, 40.0, 45.0, 1.0]);
        assert_eq!(
            labels,
            vec![true, false, true, false, false, true, true, false]
        );
    }

    #[test]
    fn test_proximity_window_suppresses_min_threshold() {
        let config = ShotDetectionConfig {
            fps: 4.0, // window of 2 frames
            ..Default::default()
        };
        // Frame 1 is within the window of frame 0's implicit shot, frame 3
        // within the window of nothing (last shot at 0, distance 3).
        let labels = run(&config, &[0.0, 20.0, 1.0, 20.0, 20.0, 1.0]);
        assert_eq!(labels, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn test_max_threshold_overrides_proximity() {
        let config = ShotDetectionConfig {
            fps: 30.0,
            ..Default::default()
        };
        let labels = run(&config, &[0.0, 60.0, 70.0, 20.0]);
        assert_eq!(labels, vec![true, true, true, false]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut frames = [ShotFrame::new(0.0)];

        let bad_fps = ShotDetectionConfig {
            fps: -1.0,
            ..Default::default()
        };
        assert!(detect_shots(&bad_fps, &mut frames).is_err());

        let inverted = ShotDetectionConfig {
            min_epsilon_thresh: 60.0,
            max_epsilon_thresh: 50.0,
            fps: 0.0,
        };
        assert!(detect_shots(&inverted, &mut frames).is_err());
    }
}
