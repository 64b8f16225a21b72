//! Integration tests for the analysis engine.
//!
//! These exercise the full push/analyze/pull pipeline with real worker
//! threads, plus the shot detector on top of analyzer output.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use vca_analyzer::{
    detect_shots, Analyzer, AnalyzerConfig, AnalyzerError, ShotDetectionConfig, ShotFrame,
};
use vca_core::{ColorSpace, Frame, FrameInfo};

// ============================================================================
// Helpers
// ============================================================================

fn config(block_size: u32, threads: u32) -> AnalyzerConfig {
    AnalyzerConfig {
        block_size,
        nr_frame_threads: threads,
        ..Default::default()
    }
}

/// A 4:2:0 frame with constant luma and neutral chroma.
fn gray_frame(width: u32, height: u32, luma: u8) -> Frame {
    let info = FrameInfo::new(width, height, 8, ColorSpace::Yuv420);
    let y: Arc<[u8]> = vec![luma; (width * height) as usize].into();
    let c: Arc<[u8]> = vec![128u8; (width * height / 4) as usize].into();
    Frame::from_planes(
        info,
        vec![
            (y, width as usize),
            (c.clone(), (width / 2) as usize),
            (c, (width / 2) as usize),
        ],
    )
    .unwrap()
}

/// A 4:2:0 frame whose luma is a checkerboard of `cell`-sized tiles.
fn checker_frame(width: u32, height: u32, cell: usize) -> Frame {
    let info = FrameInfo::new(width, height, 8, ColorSpace::Yuv420);
    let mut y_data = vec![0u8; (width * height) as usize];
    for y in 0..height as usize {
        for x in 0..width as usize {
            y_data[y * width as usize + x] = if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 };
        }
    }
    let c: Arc<[u8]> = vec![128u8; (width * height / 4) as usize].into();
    Frame::from_planes(
        info,
        vec![
            (y_data.into(), width as usize),
            (c.clone(), (width / 2) as usize),
            (c, (width / 2) as usize),
        ],
    )
    .unwrap()
}

/// A luma-only frame with deterministic per-frame texture.
fn textured_frame(width: u32, height: u32, seed: u32) -> Frame {
    let info = FrameInfo::new(width, height, 8, ColorSpace::Mono);
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    let mut data = vec![0u8; (width * height) as usize];
    for v in data.iter_mut() {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        *v = (state >> 24) as u8;
    }
    Frame::from_planes(info, vec![(data.into(), width as usize)]).unwrap()
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_open_close_without_frames() {
    let analyzer = Analyzer::open(config(32, 2)).unwrap();
    assert!(!analyzer.result_available());
    analyzer.close();
    assert!(matches!(analyzer.pull(), Err(AnalyzerError::Aborted)));
}

#[test]
fn test_pull_blocks_until_close() {
    let analyzer = Arc::new(Analyzer::open(config(32, 1)).unwrap());

    let puller = {
        let analyzer = Arc::clone(&analyzer);
        thread::spawn(move || analyzer.pull())
    };

    // No frame was pushed, so the puller must still be waiting.
    thread::sleep(Duration::from_millis(50));
    assert!(!puller.is_finished());

    analyzer.close();
    assert!(matches!(puller.join().unwrap(), Err(AnalyzerError::Aborted)));
}

// ============================================================================
// Single-frame and two-frame scenarios
// ============================================================================

#[test]
fn test_single_gray_frame() {
    let analyzer = Analyzer::open(config(32, 2)).unwrap();
    analyzer.push(gray_frame(64, 64, 128)).unwrap();

    let result = analyzer.pull().unwrap();
    assert_eq!(result.poc, 0);
    assert_eq!(result.job_id, 0);
    assert_eq!(result.average_energy, 0);
    assert_eq!(result.sad, 0.0);
    assert_eq!(result.epsilon, 0.0);
    assert_eq!(result.energy_per_block, vec![0u32; 4]);
    assert_eq!(result.sad_per_block, vec![0u32; 4]);

    analyzer.close();
}

#[test]
fn test_two_identical_frames() {
    let analyzer = Analyzer::open(config(32, 2)).unwrap();
    let frame = gray_frame(64, 64, 128);
    analyzer.push(frame.clone()).unwrap();
    analyzer.push(frame).unwrap();

    let first = analyzer.pull().unwrap();
    assert_eq!(first.poc, 0);

    let second = analyzer.pull().unwrap();
    assert_eq!(second.poc, 1);
    assert_eq!(second.sad, 0.0);
    assert_eq!(second.epsilon, 0.0);

    analyzer.close();
}

#[test]
fn test_checker_after_gray() {
    let analyzer = Analyzer::open(config(8, 2)).unwrap();
    analyzer.push(gray_frame(32, 32, 128)).unwrap();
    analyzer.push(checker_frame(32, 32, 4)).unwrap();

    let first = analyzer.pull().unwrap();
    assert_eq!(first.average_energy, 0);

    let second = analyzer.pull().unwrap();
    assert!(second.average_energy > 0);
    assert!(second.sad > 0.0);
    assert!(second.epsilon > 0.0);
    assert_eq!(second.energy_per_block.len(), 16);
    assert_eq!(second.sad_per_block.len(), 16);

    analyzer.close();
}

#[test]
fn test_result_available_polling() {
    let analyzer = Analyzer::open(config(32, 1)).unwrap();
    analyzer.push(gray_frame(64, 64, 60)).unwrap();

    // The single worker finishes eventually; poll instead of pulling blind.
    let mut waited = 0;
    while !analyzer.result_available() && waited < 2000 {
        thread::sleep(Duration::from_millis(5));
        waited += 5;
    }
    assert!(analyzer.result_available());
    assert_eq!(analyzer.pull().unwrap().poc, 0);

    analyzer.close();
}

#[test]
fn test_border_blocks_on_non_multiple_dimensions() {
    // 100x60 with 32-blocks: a 4x2 grid with clamped border reads. A flat
    // frame stays flat through the clamp, so all energies are zero.
    let analyzer = Analyzer::open(config(32, 2)).unwrap();
    analyzer.push(gray_frame(100, 60, 77)).unwrap();

    let result = analyzer.pull().unwrap();
    assert_eq!(result.energy_per_block.len(), 8);
    assert_eq!(result.sad_per_block.len(), 8);
    assert_eq!(result.average_energy, 0);

    analyzer.close();
}

#[test]
fn test_lowpass_analyzer_runs() {
    let cfg = AnalyzerConfig {
        block_size: 32,
        nr_frame_threads: 2,
        enable_lowpass_dct: true,
        ..Default::default()
    };
    let analyzer = Analyzer::open(cfg).unwrap();
    analyzer.push(textured_frame(64, 64, 9)).unwrap();

    let result = analyzer.pull().unwrap();
    assert!(result.average_energy > 0);

    analyzer.close();
}

// ============================================================================
// Threaded ordering
// ============================================================================

#[test]
fn test_hundred_frames_pull_in_submission_order() {
    let analyzer = Arc::new(Analyzer::open(config(16, 8)).unwrap());
    const FRAMES: u64 = 100;

    let producer = {
        let analyzer = Arc::clone(&analyzer);
        thread::spawn(move || {
            for i in 0..FRAMES {
                analyzer.push(textured_frame(64, 64, i as u32)).unwrap();
            }
        })
    };

    for expected in 0..FRAMES {
        let result = analyzer.pull().unwrap();
        assert_eq!(result.poc, expected);
        assert_eq!(result.job_id, result.poc);
        assert!((0.0..=100.0).contains(&result.epsilon));
    }

    producer.join().unwrap();
    analyzer.close();
    assert!(matches!(analyzer.pull(), Err(AnalyzerError::Aborted)));
}

#[test]
fn test_thousand_small_frames() {
    let analyzer = Arc::new(Analyzer::open(config(8, 4)).unwrap());
    const FRAMES: u64 = 1000;

    let producer = {
        let analyzer = Arc::clone(&analyzer);
        thread::spawn(move || {
            for i in 0..FRAMES {
                analyzer.push(textured_frame(16, 16, i as u32)).unwrap();
            }
        })
    };

    for expected in 0..FRAMES {
        assert_eq!(analyzer.pull().unwrap().poc, expected);
    }

    producer.join().unwrap();
    analyzer.close();
}

// ============================================================================
// Shot detection
// ============================================================================

#[test]
fn test_shot_detection_golden_vector() {
    let epsilons = [0.0, 5.0, 55.0, 3.0, 2.0, 40.0, 45.0, 1.0];
    let mut frames: Vec<ShotFrame> = epsilons.iter().map(|&e| ShotFrame::new(e)).collect();

    let config = ShotDetectionConfig {
        min_epsilon_thresh: 10.0,
        max_epsilon_thresh: 50.0,
        fps: 0.0,
    };
    detect_shots(&config, &mut frames).unwrap();

    let labels: Vec<bool> = frames.iter().map(|f| f.is_new_shot).collect();
    assert_eq!(
        labels,
        vec![true, false, true, false, false, true, true, false]
    );
}

#[test]
fn test_analyzer_epsilons_feed_shot_detection() {
    let analyzer = Analyzer::open(config(8, 2)).unwrap();

    // Two stable scenes with a hard cut in the middle.
    let scene_a = gray_frame(32, 32, 128);
    let scene_b = checker_frame(32, 32, 4);
    for _ in 0..3 {
        analyzer.push(scene_a.clone()).unwrap();
    }
    for _ in 0..3 {
        analyzer.push(scene_b.clone()).unwrap();
    }

    let mut frames = Vec::new();
    for _ in 0..6 {
        frames.push(ShotFrame::new(analyzer.pull().unwrap().epsilon));
    }
    analyzer.close();

    detect_shots(&ShotDetectionConfig::default(), &mut frames).unwrap();

    assert!(frames[0].is_new_shot);
    // The cut lands at index 3; the identical frames around it stay quiet.
    assert!(frames[3].is_new_shot);
    assert!(!frames[1].is_new_shot);
    assert!(!frames[2].is_new_shot);
    assert!(!frames[5].is_new_shot);
}
