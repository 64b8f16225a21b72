//! Parallel video complexity analysis.
//!
//! This crate implements the VCA analysis engine: an input-ordered pipeline
//! that fans frames out to a pool of worker threads, computes per-block DCT
//! energy and inter-frame texture SAD on each, and delivers per-frame results
//! in strict submission order. A separate post-pass labels shot boundaries
//! over the resulting epsilon series.
//!
//! # Architecture
//!
//! ```text
//! ┌────────┐ push ┌───────────┐    ┌─────────┐    ┌────────────────┐ pull
//! │ caller │─────▶│ jobs queue│───▶│ workers │───▶│ ordered results│─────▶
//! └────────┘      └───────────┘    └─────────┘    └────────────────┘
//!                  (bounded, 5)    (DCT energy,    (released in
//!                                   texture SAD)    submission order)
//! ```
//!
//! Workers may finish in any order; the ordered result buffer re-sequences
//! them and applies backpressure so no worker runs unboundedly ahead of the
//! consumer. Each job carries a reference to the frame pushed immediately
//! before it, captured at push time, so the texture SAD always compares
//! against the true predecessor.
//!
//! # Example
//!
//! ```rust,no_run
//! use vca_analyzer::{Analyzer, AnalyzerConfig};
//! use vca_core::{ColorSpace, Frame, FrameInfo};
//!
//! fn main() -> vca_analyzer::Result<()> {
//!     let config = AnalyzerConfig {
//!         block_size: 32,
//!         ..Default::default()
//!     };
//!     let analyzer = Analyzer::open(config)?;
//!
//!     let frame = Frame::new(FrameInfo::new(1920, 1080, 8, ColorSpace::Yuv420));
//!     analyzer.push(frame)?;
//!
//!     let result = analyzer.pull()?;
//!     println!("poc {} energy {}", result.poc, result.average_energy);
//!
//!     analyzer.close();
//!     Ok(())
//! }
//! ```

#![allow(clippy::needless_range_loop)]

pub mod analyzer;
pub mod energy;
pub mod error;
pub mod queue;
pub mod shot;
pub mod transform;

pub use analyzer::{Analyzer, AnalyzerConfig, CpuSimd};
pub use energy::{BlockGrid, FrameResult};
pub use error::{AnalyzerError, Result};
pub use shot::{detect_shots, ShotDetectionConfig, ShotFrame};
pub use transform::{Kernels, TransformSize};
