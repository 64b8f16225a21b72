//! # VCA
//!
//! A parallel video complexity analyzer: given raw planar YUV frames, it
//! produces per-frame spatial and temporal complexity measurements derived
//! from block-wise DCT energy, and labels shot boundaries over the resulting
//! epsilon series.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vca::{Analyzer, AnalyzerConfig, ColorSpace, Frame, FrameInfo};
//!
//! fn main() -> vca::Result<()> {
//!     let analyzer = Analyzer::open(AnalyzerConfig::default())?;
//!
//!     // Push frames as the reader produces them...
//!     let frame = Frame::new(FrameInfo::new(1920, 1080, 8, ColorSpace::Yuv420));
//!     analyzer.push(frame)?;
//!
//!     // ...and pull results in submission order.
//!     let result = analyzer.pull()?;
//!     println!(
//!         "poc {}: energy {} sad {:.1} epsilon {:.2}",
//!         result.poc, result.average_energy, result.sad, result.epsilon
//!     );
//!
//!     analyzer.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into two crates re-exported here:
//! - `vca-core`: frame geometry, shared pixel views and base errors
//! - `vca-analyzer`: transform kernels, the worker-pool engine and the shot
//!   detector
//!
//! Frames share their pixel buffers by reference counting; the engine holds
//! references to at most the current and the previously pushed frame and
//! releases them as results are pulled.

// Re-export core types
pub use vca_core::{
    error::Error as CoreError,
    frame::{ColorSpace, Frame, FrameInfo},
};

// Re-export the analysis engine
pub use vca_analyzer::{
    analyzer::{Analyzer, AnalyzerConfig, CpuSimd},
    energy::{BlockGrid, FrameResult},
    error::{AnalyzerError, Result},
    shot::{detect_shots, ShotDetectionConfig, ShotFrame},
    transform::{Kernels, TransformSize},
};
