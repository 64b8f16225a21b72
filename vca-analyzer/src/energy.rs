//! Per-frame complexity analysis.
//!
//! The luma plane is tiled into blocks of the configured size; every block is
//! transformed with the selected DCT kernel and reduced to a weighted energy
//! value. When a predecessor frame is present, the co-located block of the
//! predecessor is transformed as well and the coefficient-domain SAD between
//! the two blocks measures the temporal change.

use crate::transform::{Kernels, TransformSize};
use serde::Serialize;
use vca_core::{Frame, FrameInfo};

/// Block tiling of the luma plane.
///
/// Border blocks that extend past the plane read the nearest in-bounds pixel,
/// so every grid cell produces an energy and a SAD entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    /// Analysis block size in samples.
    pub block_size: usize,
    /// Number of block columns.
    pub width_in_blocks: usize,
    /// Number of block rows.
    pub height_in_blocks: usize,
}

impl BlockGrid {
    /// Compute the grid for a frame geometry.
    pub fn new(info: &FrameInfo, block_size: usize) -> Self {
        Self {
            block_size,
            width_in_blocks: (info.width as usize).div_ceil(block_size),
            height_in_blocks: (info.height as usize).div_ceil(block_size),
        }
    }

    /// Total number of blocks in the frame.
    pub fn num_blocks(&self) -> usize {
        self.width_in_blocks * self.height_in_blocks
    }
}

/// Analysis output for one frame, delivered in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameResult {
    /// Submission counter value of the originating push. Always equals
    /// [`poc`](Self::poc); carried separately so callers can double-check
    /// delivery order.
    pub job_id: u64,
    /// Picture order count: 0, 1, 2, ...
    pub poc: u64,
    /// Floor of the mean weighted block energy.
    pub average_energy: u32,
    /// Sum of all per-block coefficient SADs against the previous frame.
    /// 0 for the first frame.
    pub sad: f64,
    /// Normalized inter-frame change in [0, 100]. 0 for the first frame.
    pub epsilon: f64,
    /// Weighted DCT energy per block, row-major over the grid.
    pub energy_per_block: Vec<u32>,
    /// Coefficient SAD per block, row-major over the grid.
    pub sad_per_block: Vec<u32>,
}

/// Copy one block of luma samples into a signed buffer, clamping reads to the
/// plane borders.
fn extract_block(
    luma: &[u8],
    stride: usize,
    info: &FrameInfo,
    bx: usize,
    by: usize,
    block_size: usize,
    out: &mut [i16],
) {
    let width = info.width as usize;
    let height = info.height as usize;
    let deep = info.bit_depth > 8;

    for y in 0..block_size {
        let sy = (by * block_size + y).min(height - 1);
        let row = &luma[sy * stride..];
        for x in 0..block_size {
            let sx = (bx * block_size + x).min(width - 1);
            out[y * block_size + x] = if deep {
                // 16-bit samples saturate into the transform's i16 domain.
                let v = u16::from_le_bytes([row[sx * 2], row[sx * 2 + 1]]);
                v.min(i16::MAX as u16) as i16
            } else {
                row[sx] as i16
            };
        }
    }
}

/// Weighted sum of absolute coefficients. The weight is the Manhattan
/// distance from DC, which leaves the DC coefficient itself out.
fn weighted_dct_energy(coeffs: &[i16], block_size: usize) -> u32 {
    let mut energy = 0u32;
    for (i, row) in coeffs.chunks_exact(block_size).enumerate() {
        for (j, &c) in row.iter().enumerate() {
            energy = energy.saturating_add((i + j) as u32 * u32::from(c.unsigned_abs()));
        }
    }
    energy
}

/// Sum of absolute coefficient differences over a whole block, DC included.
fn coefficient_sad(a: &[i16], b: &[i16]) -> u32 {
    let mut sad = 0u32;
    for (&x, &y) in a.iter().zip(b) {
        sad = sad.saturating_add((x as i32 - y as i32).unsigned_abs());
    }
    sad
}

/// Normalized inter-frame change metric.
pub(crate) fn epsilon(frame_sad: f64, prev_sad: f64) -> f64 {
    let denom = frame_sad.max(prev_sad).max(1.0);
    (((frame_sad - prev_sad).abs() / denom) * 100.0).clamp(0.0, 100.0)
}

/// Analyze one frame against its optional predecessor.
///
/// Fills the per-block arrays and the energy/SAD scalars; epsilon is left at
/// zero because it depends on the predecessor's frame SAD, which is only
/// known at the ordered delivery point.
pub(crate) fn analyze(
    kernels: &Kernels,
    size: TransformSize,
    id: u64,
    frame: &Frame,
    prev: Option<&Frame>,
) -> FrameResult {
    let grid = BlockGrid::new(&frame.info, size.size());
    let num_blocks = grid.num_blocks();
    let mut result = FrameResult {
        job_id: id,
        poc: id,
        energy_per_block: vec![0; num_blocks],
        sad_per_block: vec![0; num_blocks],
        ..Default::default()
    };

    let Some(luma) = frame.luma() else {
        return result;
    };
    let stride = frame.luma_stride();
    let bit_depth = frame.info.bit_depth;
    let b = grid.block_size;

    let mut cur = vec![0i16; b * b];
    let mut cur_coef = vec![0i16; b * b];
    let mut ref_block = vec![0i16; b * b];
    let mut ref_coef = vec![0i16; b * b];

    let prev_luma = prev.and_then(|p| p.luma().map(|l| (p, l)));

    let mut energy_sum = 0u64;
    let mut frame_sad = 0.0f64;

    for by in 0..grid.height_in_blocks {
        for bx in 0..grid.width_in_blocks {
            let idx = by * grid.width_in_blocks + bx;

            extract_block(luma, stride, &frame.info, bx, by, b, &mut cur);
            kernels.forward(size, &cur, b, &mut cur_coef, bit_depth);

            let energy = weighted_dct_energy(&cur_coef, b);
            result.energy_per_block[idx] = energy;
            energy_sum += u64::from(energy);

            if let Some((p, p_luma)) = prev_luma {
                extract_block(p_luma, p.luma_stride(), &p.info, bx, by, b, &mut ref_block);
                kernels.forward(size, &ref_block, b, &mut ref_coef, bit_depth);

                let sad = coefficient_sad(&cur_coef, &ref_coef);
                result.sad_per_block[idx] = sad;
                frame_sad += f64::from(sad);
            }
        }
    }

    result.average_energy = (energy_sum / num_blocks as u64).min(u64::from(u32::MAX)) as u32;
    result.sad = frame_sad;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vca_core::ColorSpace;

    fn mono_frame(width: u32, height: u32, fill: u8) -> Frame {
        let info = FrameInfo::new(width, height, 8, ColorSpace::Mono);
        let data: Arc<[u8]> = vec![fill; (width * height) as usize].into();
        Frame::from_planes(info, vec![(data, width as usize)]).unwrap()
    }

    #[test]
    fn test_block_grid_dimensions() {
        let info = FrameInfo::new(64, 64, 8, ColorSpace::Mono);
        let grid = BlockGrid::new(&info, 32);
        assert_eq!(grid.width_in_blocks, 2);
        assert_eq!(grid.height_in_blocks, 2);
        assert_eq!(grid.num_blocks(), 4);

        let info = FrameInfo::new(100, 60, 8, ColorSpace::Mono);
        let grid = BlockGrid::new(&info, 32);
        assert_eq!(grid.width_in_blocks, 4);
        assert_eq!(grid.height_in_blocks, 2);
    }

    #[test]
    fn test_extract_block_edge_clamp() {
        // 10x10 frame with an 8-block grid: block (1, 1) reaches past the
        // border and must replicate the edge samples.
        let info = FrameInfo::new(10, 10, 8, ColorSpace::Mono);
        let mut data = vec![0u8; 100];
        for (i, v) in data.iter_mut().enumerate() {
            *v = i as u8;
        }
        let frame = Frame::from_planes(info, vec![(data.into(), 10)]).unwrap();

        let mut block = [0i16; 64];
        extract_block(frame.luma().unwrap(), 10, &info, 1, 1, 8, &mut block);

        // Top-left of the block maps to pixel (8, 8) = 88.
        assert_eq!(block[0], 88);
        // Columns past x = 9 clamp to the last column.
        assert_eq!(block[1], 89);
        assert_eq!(block[2], 89);
        assert_eq!(block[7], 89);
        // Rows past y = 9 clamp to the last row.
        assert_eq!(block[8], 98);
        assert_eq!(block[2 * 8], 98);
        assert_eq!(block[7 * 8 + 7], 99);
    }

    #[test]
    fn test_extract_block_deep_samples() {
        let info = FrameInfo::new(4, 4, 10, ColorSpace::Mono);
        let mut data = vec![0u8; 4 * 4 * 2];
        for i in 0..16 {
            let v = (i as u16) * 64;
            data[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
        }
        let frame = Frame::from_planes(info, vec![(data.into(), 8)]).unwrap();

        let mut block = [0i16; 16];
        extract_block(frame.luma().unwrap(), 8, &info, 0, 0, 4, &mut block);
        assert_eq!(block[0], 0);
        assert_eq!(block[1], 64);
        assert_eq!(block[15], 15 * 64);
    }

    #[test]
    fn test_weighted_energy_excludes_dc() {
        let mut coeffs = [0i16; 64];
        coeffs[0] = 1000;
        assert_eq!(weighted_dct_energy(&coeffs, 8), 0);

        // Coefficient at (0, 1) has weight 1, at (1, 1) weight 2.
        coeffs[1] = 10;
        coeffs[9] = 10;
        assert_eq!(weighted_dct_energy(&coeffs, 8), 10 + 20);
    }

    #[test]
    fn test_coefficient_sad() {
        let a = [5i16, -3, 7, 0];
        assert_eq!(coefficient_sad(&a, &a), 0);

        let b = [0i16, 0, 0, 0];
        assert_eq!(coefficient_sad(&a, &b), 15);
    }

    #[test]
    fn test_epsilon_bounds() {
        assert_eq!(epsilon(0.0, 0.0), 0.0);
        assert_eq!(epsilon(100.0, 50.0), 50.0);
        assert_eq!(epsilon(50.0, 100.0), 50.0);
        // Zero predecessor SAD clamps the denominator at 1.
        assert_eq!(epsilon(250.0, 0.0), 100.0);
        for (a, b) in [(0.3, 0.9), (1e9, 3.0), (7.0, 7.0)] {
            let e = epsilon(a, b);
            assert!((0.0..=100.0).contains(&e));
        }
    }

    #[test]
    fn test_flat_frame_has_zero_energy() {
        let kernels = Kernels::new(false);
        let frame = mono_frame(64, 64, 128);
        let result = analyze(&kernels, TransformSize::T32, 0, &frame, None);

        assert_eq!(result.poc, 0);
        assert_eq!(result.job_id, 0);
        assert_eq!(result.average_energy, 0);
        assert_eq!(result.sad, 0.0);
        assert_eq!(result.energy_per_block.len(), 4);
        assert!(result.energy_per_block.iter().all(|&e| e == 0));
        assert!(result.sad_per_block.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_identical_frames_have_zero_sad() {
        let kernels = Kernels::new(false);
        let frame = mono_frame(64, 64, 90);
        let result = analyze(&kernels, TransformSize::T16, 1, &frame, Some(&frame));

        assert_eq!(result.sad, 0.0);
        assert!(result.sad_per_block.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_textured_frame_has_positive_energy_and_sad() {
        let kernels = Kernels::new(false);
        let info = FrameInfo::new(32, 32, 8, ColorSpace::Mono);
        let mut data = vec![0u8; 32 * 32];
        for y in 0..32 {
            for x in 0..32 {
                data[y * 32 + x] = if (x / 4 + y / 4) % 2 == 0 { 0 } else { 255 };
            }
        }
        let checker = Frame::from_planes(info, vec![(data.into(), 32)]).unwrap();
        let gray = mono_frame(32, 32, 128);

        let result = analyze(&kernels, TransformSize::T8, 1, &checker, Some(&gray));
        assert!(result.average_energy > 0);
        assert!(result.sad > 0.0);
        assert_eq!(result.energy_per_block.len(), 16);
    }
}
