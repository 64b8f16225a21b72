//! Frame geometry and shared pixel views.
//!
//! The analyzer never owns or copies pixel data. A [`Frame`] is a cheaply
//! clonable view: each plane is a reference-counted byte buffer plus a stride,
//! so handing a frame to the analysis engine shares the underlying memory
//! read-only between the caller and the worker threads.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Chroma layout of the pushed frames.
///
/// Only the luma plane is analyzed; the colorspace determines how many planes
/// a frame carries and how the chroma planes are subsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Luma only, single plane.
    Mono,
    /// Planar YUV 4:2:0 (1 Cb & Cr sample per 2x2 Y samples).
    #[default]
    Yuv420,
    /// Planar YUV 4:2:2 (1 Cb & Cr sample per 2x1 Y samples).
    Yuv422,
    /// Planar YUV 4:4:4 (no subsampling).
    Yuv444,
}

impl ColorSpace {
    /// Number of planes for this colorspace.
    pub fn num_planes(&self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Yuv420 | Self::Yuv422 | Self::Yuv444 => 3,
        }
    }

    /// Chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420 => (2, 2),
            Self::Yuv422 => (2, 1),
            Self::Mono | Self::Yuv444 => (1, 1),
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mono => write!(f, "mono"),
            Self::Yuv420 => write!(f, "yuv420"),
            Self::Yuv422 => write!(f, "yuv422"),
            Self::Yuv444 => write!(f, "yuv444"),
        }
    }
}

/// Geometry of the analyzed stream, locked in with the first pushed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Frame width in pixels. Must be non-zero and even.
    pub width: u32,
    /// Frame height in pixels. Must be non-zero and even.
    pub height: u32,
    /// Sample bit depth, 8 to 16. Depths above 8 use two bytes per sample
    /// (little endian).
    pub bit_depth: u8,
    /// Chroma layout.
    pub colorspace: ColorSpace,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            bit_depth: 8,
            colorspace: ColorSpace::default(),
        }
    }
}

impl FrameInfo {
    /// Create a new frame info.
    pub fn new(width: u32, height: u32, bit_depth: u8, colorspace: ColorSpace) -> Self {
        Self {
            width,
            height,
            bit_depth,
            colorspace,
        }
    }

    /// True when the geometry has not been declared yet (width and height
    /// zero), e.g. when the container autodetects it at the first frame.
    pub fn is_unset(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Validate the declared geometry.
    pub fn validate(&self) -> Result<()> {
        if self.bit_depth < 8 || self.bit_depth > 16 {
            return Err(Error::invalid_frame(format!(
                "bit depth {} out of range [8, 16]",
                self.bit_depth
            )));
        }
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::invalid_frame(format!(
                "invalid frame size {}x{} (dimensions must be non-zero and even)",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Bytes per sample (1 for 8-bit, 2 for deeper content).
    pub fn bytes_per_sample(&self) -> usize {
        if self.bit_depth > 8 {
            2
        } else {
            1
        }
    }

    /// Dimensions of a plane in samples.
    pub fn plane_dimensions(&self, plane: usize) -> (usize, usize) {
        if plane == 0 {
            (self.width as usize, self.height as usize)
        } else {
            let (hsub, vsub) = self.colorspace.chroma_subsampling();
            (
                self.width as usize / hsub as usize,
                self.height as usize / vsub as usize,
            )
        }
    }

    /// Minimum valid stride of a plane in bytes.
    pub fn min_stride(&self, plane: usize) -> usize {
        self.plane_dimensions(plane).0 * self.bytes_per_sample()
    }
}

/// One plane of pixel data: a shared byte buffer plus its row stride.
#[derive(Clone)]
struct Plane {
    data: Arc<[u8]>,
    stride: usize,
}

/// A video frame handed to the analyzer.
///
/// Cloning a frame clones reference counts, never pixels. The analyzer keeps
/// clones of at most the current and the previously pushed frame; they are
/// dropped as the corresponding results are pulled.
#[derive(Clone)]
pub struct Frame {
    /// Frame geometry. All frames pushed to one analyzer must agree.
    pub info: FrameInfo,
    planes: [Option<Plane>; 3],
}

impl Frame {
    /// Allocate a zeroed frame for the given geometry.
    ///
    /// Strides are aligned to 32 bytes. Mostly useful for tests and tools;
    /// real callers wrap existing buffers with [`Frame::from_planes`].
    pub fn new(info: FrameInfo) -> Self {
        let mut planes: [Option<Plane>; 3] = [None, None, None];
        for (idx, slot) in planes.iter_mut().enumerate().take(info.colorspace.num_planes()) {
            let (w, h) = info.plane_dimensions(idx);
            let stride = (w * info.bytes_per_sample() + 31) & !31;
            let data: Arc<[u8]> = vec![0u8; stride * h.max(1)].into();
            *slot = Some(Plane { data, stride });
        }
        Self { info, planes }
    }

    /// Wrap caller-owned plane buffers.
    ///
    /// `planes` carries one `(buffer, stride)` pair per plane of the
    /// colorspace, in Y/Cb/Cr order. Each buffer must cover its plane at the
    /// given stride.
    pub fn from_planes(info: FrameInfo, planes: Vec<(Arc<[u8]>, usize)>) -> Result<Self> {
        info.validate()?;
        let expected = info.colorspace.num_planes();
        if planes.len() != expected {
            return Err(Error::invalid_frame(format!(
                "{} planes provided, {} expected for {}",
                planes.len(),
                expected,
                info.colorspace
            )));
        }

        let mut slots: [Option<Plane>; 3] = [None, None, None];
        for (idx, (data, stride)) in planes.into_iter().enumerate() {
            let (w, h) = info.plane_dimensions(idx);
            let min_stride = w * info.bytes_per_sample();
            if stride < min_stride {
                return Err(Error::invalid_frame(format!(
                    "plane {idx} stride {stride} below row size {min_stride}"
                )));
            }
            let required = stride * (h - 1) + min_stride;
            if data.len() < required {
                return Err(Error::invalid_frame(format!(
                    "plane {idx} buffer holds {} bytes, {required} required",
                    data.len()
                )));
            }
            slots[idx] = Some(Plane { data, stride });
        }

        Ok(Self {
            info,
            planes: slots,
        })
    }

    /// Pixel data of a plane, if present.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes
            .get(index)
            .and_then(|p| p.as_ref())
            .map(|p| p.data.as_ref())
    }

    /// Stride of a plane in bytes (0 when the plane is absent).
    pub fn stride(&self, index: usize) -> usize {
        self.planes
            .get(index)
            .and_then(|p| p.as_ref())
            .map(|p| p.stride)
            .unwrap_or(0)
    }

    /// Luma plane data, if present.
    pub fn luma(&self) -> Option<&[u8]> {
        self.plane(0)
    }

    /// Luma stride in bytes.
    pub fn luma_stride(&self) -> usize {
        self.stride(0)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("info", &self.info)
            .field("planes", &self.planes.iter().flatten().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_colorspace_planes() {
        assert_eq!(ColorSpace::Mono.num_planes(), 1);
        assert_eq!(ColorSpace::Yuv420.num_planes(), 3);
        assert_eq!(ColorSpace::Yuv420.chroma_subsampling(), (2, 2));
        assert_eq!(ColorSpace::Yuv422.chroma_subsampling(), (2, 1));
        assert_eq!(ColorSpace::Yuv444.chroma_subsampling(), (1, 1));
    }

    #[test]
    fn test_frame_info_validation() {
        assert!(FrameInfo::new(64, 64, 8, ColorSpace::Yuv420).validate().is_ok());
        assert!(FrameInfo::new(63, 64, 8, ColorSpace::Yuv420).validate().is_err());
        assert!(FrameInfo::new(64, 0, 8, ColorSpace::Yuv420).validate().is_err());
        assert!(FrameInfo::new(64, 64, 7, ColorSpace::Yuv420).validate().is_err());
        assert!(FrameInfo::new(64, 64, 17, ColorSpace::Yuv420).validate().is_err());
        assert!(FrameInfo::new(64, 64, 16, ColorSpace::Yuv420).validate().is_ok());
    }

    #[test]
    fn test_frame_info_unset() {
        assert!(FrameInfo::default().is_unset());
        assert!(!FrameInfo::new(64, 64, 8, ColorSpace::Mono).is_unset());
    }

    #[test]
    fn test_bytes_per_sample() {
        assert_eq!(FrameInfo::new(64, 64, 8, ColorSpace::Mono).bytes_per_sample(), 1);
        assert_eq!(FrameInfo::new(64, 64, 10, ColorSpace::Mono).bytes_per_sample(), 2);
    }

    #[test]
    fn test_new_frame_allocates_planes() {
        let frame = Frame::new(FrameInfo::new(64, 48, 8, ColorSpace::Yuv420));
        assert!(frame.plane(0).is_some());
        assert!(frame.plane(1).is_some());
        assert!(frame.plane(2).is_some());
        assert_eq!(frame.stride(0) % 32, 0);
        assert!(frame.stride(0) >= 64);

        let mono = Frame::new(FrameInfo::new(64, 48, 8, ColorSpace::Mono));
        assert!(mono.plane(0).is_some());
        assert!(mono.plane(1).is_none());
        assert_eq!(mono.stride(1), 0);
    }

    #[test]
    fn test_from_planes_validation() {
        let info = FrameInfo::new(16, 16, 8, ColorSpace::Mono);
        let data: Arc<[u8]> = vec![0u8; 16 * 16].into();
        assert!(Frame::from_planes(info, vec![(data.clone(), 16)]).is_ok());

        // Stride below the row size.
        assert!(Frame::from_planes(info, vec![(data.clone(), 8)]).is_err());

        // Buffer too small for the declared stride.
        assert!(Frame::from_planes(info, vec![(data.clone(), 32)]).is_err());

        // Wrong plane count.
        assert!(Frame::from_planes(
            FrameInfo::new(16, 16, 8, ColorSpace::Yuv444),
            vec![(data, 16)]
        )
        .is_err());
    }

    #[test]
    fn test_clone_shares_pixels() {
        let info = FrameInfo::new(16, 16, 8, ColorSpace::Mono);
        let data: Arc<[u8]> = vec![42u8; 16 * 16].into();
        let frame = Frame::from_planes(info, vec![(data.clone(), 16)]).unwrap();
        let copy = frame.clone();
        assert_eq!(Arc::strong_count(&data), 3);
        assert_eq!(copy.plane(0).unwrap()[0], 42);
    }
}
