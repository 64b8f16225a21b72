//! Integer DCT/DST transform kernels.
//!
//! This module provides the HEVC-style separable integer transforms used by
//! the complexity analysis: forward and inverse DCT for 4x4, 8x8, 16x16 and
//! 32x32 blocks, the 4x4 DST pair, and the low-pass DCT variants that keep
//! only the low-frequency half of the coefficients for the large transforms.
//!
//! Each 2-D transform runs the 1-D partial butterfly twice: a row pass with
//! `shift = log2(n) - 1 + (bit_depth - 8)` and a column pass with
//! `shift = log2(n) + 6`, rounding with `1 << (shift - 1)` and saturating
//! every stored intermediate to the i16 range.

/// Transform sizes supported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSize {
    /// 4x4 transform.
    T4,
    /// 8x8 transform.
    T8,
    /// 16x16 transform.
    T16,
    /// 32x32 transform.
    T32,
}

impl TransformSize {
    /// Get the size as a number of samples per side.
    pub fn size(&self) -> usize {
        match self {
            Self::T4 => 4,
            Self::T8 => 8,
            Self::T16 => 16,
            Self::T32 => 32,
        }
    }

    /// Get the log2 of the size.
    pub fn log2_size(&self) -> u32 {
        match self {
            Self::T4 => 2,
            Self::T8 => 3,
            Self::T16 => 4,
            Self::T32 => 5,
        }
    }

    /// Create from a size value.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            4 => Some(Self::T4),
            8 => Some(Self::T8),
            16 => Some(Self::T16),
            32 => Some(Self::T32),
            _ => None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.log2_size() as usize - 2
    }
}

/// DCT-II matrix for the 4-point transform.
const G_T4: [[i32; 4]; 4] = [
    [64, 64, 64, 64],
    [83, 36, -36, -83],
    [64, -64, -64, 64],
    [36, -83, 83, -36],
];

/// DCT-II matrix for the 8-point transform.
const G_T8: [[i32; 8]; 8] = [
    [64, 64, 64, 64, 64, 64, 64, 64],
    [89, 75, 50, 18, -18, -50, -75, -89],
    [83, 36, -36, -83, -83, -36, 36, 83],
    [75, -18, -89, -50, 50, 89, 18, -75],
    [64, -64, -64, 64, 64, -64, -64, 64],
    [50, -89, 18, 75, -75, -18, 89, -50],
    [36, -83, 83, -36, -36, 83, -83, 36],
    [18, -50, 75, -89, 89, -75, 50, -18],
];

/// DCT-II matrix for the 16-point transform.
const G_T16: [[i32; 16]; 16] = [
    [64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64, 64],
    [90, 87, 80, 70, 57, 43, 25, 9, -9, -25, -43, -57, -70, -80, -87, -90],
    [89, 75, 50, 18, -18, -50, -75, -89, -89, -75, -50, -18, 18, 50, 75, 89],
    [87, 57, 9, -43, -80, -90, -70, -25, 25, 70, 90, 80, 43, -9, -57, -87],
    [83, 36, -36, -83, -83, -36, 36, 83, 83, 36, -36, -83, -83, -36, 36, 83],
    [80, 9, -70, -87, -25, 57, 90, 43, -43, -90, -57, 25, 87, 70, -9, -80],
    [75, -18, -89, -50, 50, 89, 18, -75, -75, 18, 89, 50, -50, -89, -18, 75],
    [70, -43, -87, 9, 90, 25, -80, -57, 57, 80, -25, -90, -9, 87, 43, -70],
    [64, -64, -64, 64, 64, -64, -64, 64, 64, -64, -64, 64, 64, -64, -64, 64],
    [57, -80, -25, 90, -9, -87, 43, 70, -70, -43, 87, 9, -90, 25, 80, -57],
    [50, -89, 18, 75, -75, -18, 89, -50, -50, 89, -18, -75, 75, 18, -89, 50],
    [43, -90, 57, 25, -87, 70, 9, -80, 80, -9, -70, 87, -25, -57, 90, -43],
    [36, -83, 83, -36, -36, 83, -83, 36, 36, -83, 83, -36, -36, 83, -83, 36],
    [25, -70, 90, -80, 43, 9, -57, 87, -87, 57, -9, -43, 80, -90, 70, -25],
    [18, -50, 75, -89, 89, -75, 50, -18, -18, 50, -75, 89, -89, 75, -50, 18],
    [9, -25, 43, -57, 70, -80, 87, -90, 90, -87, 80, -70, 57, -43, 25, -9],
];

/// Odd rows (1, 3, ..., 31) of the 32-point DCT-II matrix, first 16 columns.
///
/// The even rows of the 32-point matrix are the 16-point rows, so the
/// butterflies below index [`G_T16`] for the even half and this table for
/// the odd half.
const G_T32_ODD: [[i32; 16]; 16] = [
    [90, 90, 88, 85, 82, 78, 73, 67, 61, 54, 46, 38, 31, 22, 13, 4],
    [90, 82, 67, 46, 22, -4, -31, -54, -73, -85, -90, -88, -78, -61, -38, -13],
    [88, 67, 31, -13, -54, -82, -90, -78, -46, -4, 38, 73, 90, 85, 61, 22],
    [85, 46, -13, -67, -90, -73, -22, 38, 82, 88, 54, -4, -61, -90, -78, -31],
    [82, 22, -54, -90, -61, 13, 78, 85, 31, -46, -90, -67, 4, 73, 88, 38],
    [78, -4, -82, -73, 13, 85, 67, -22, -88, -61, 31, 90, 54, -38, -90, -46],
    [73, -31, -90, -22, 78, 67, -38, -90, -13, 82, 61, -46, -88, -4, 85, 54],
    [67, -54, -78, 38, 85, -22, -90, 4, 90, 13, -88, -31, 82, 46, -73, -61],
    [61, -73, -46, 82, 31, -88, -13, 90, -4, -90, 22, 85, -38, -78, 54, 67],
    [54, -85, -4, 88, -46, -61, 82, 13, -90, 38, 67, -78, -22, 90, -31, -73],
    [46, -90, 38, 54, -90, 31, 61, -88, 22, 67, -85, 13, 73, -82, 4, 78],
    [38, -88, 73, -4, -67, 90, -46, -31, 85, -78, 13, 61, -90, 54, 22, -82],
    [31, -78, 90, -61, 4, 54, -88, 82, -38, -22, 73, -90, 67, -13, -46, 85],
    [22, -61, 85, -90, 73, -38, -4, 46, -78, 90, -82, 54, -13, -31, 67, -88],
    [13, -38, 61, -78, 88, -90, 85, -73, 54, -31, 4, 22, -46, 67, -82, 90],
    [4, -13, 22, -31, 38, -46, 54, -61, 67, -73, 78, -82, 85, -88, 90, -90],
];

#[inline]
fn clip16(x: i32) -> i16 {
    x.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn partial_butterfly4(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 4..j * 4 + 4];
        let e = [s[0] as i32 + s[3] as i32, s[1] as i32 + s[2] as i32];
        let o = [s[0] as i32 - s[3] as i32, s[1] as i32 - s[2] as i32];

        dst[j] = clip16((G_T4[0][0] * e[0] + G_T4[0][1] * e[1] + add) >> shift);
        dst[2 * line + j] = clip16((G_T4[2][0] * e[0] + G_T4[2][1] * e[1] + add) >> shift);
        dst[line + j] = clip16((G_T4[1][0] * o[0] + G_T4[1][1] * o[1] + add) >> shift);
        dst[3 * line + j] = clip16((G_T4[3][0] * o[0] + G_T4[3][1] * o[1] + add) >> shift);
    }
}

fn partial_butterfly8(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 8..j * 8 + 8];
        let mut e = [0i32; 4];
        let mut o = [0i32; 4];
        for k in 0..4 {
            e[k] = s[k] as i32 + s[7 - k] as i32;
            o[k] = s[k] as i32 - s[7 - k] as i32;
        }
        let ee = [e[0] + e[3], e[1] + e[2]];
        let eo = [e[0] - e[3], e[1] - e[2]];

        dst[j] = clip16((G_T8[0][0] * ee[0] + G_T8[0][1] * ee[1] + add) >> shift);
        dst[4 * line + j] = clip16((G_T8[4][0] * ee[0] + G_T8[4][1] * ee[1] + add) >> shift);
        dst[2 * line + j] = clip16((G_T8[2][0] * eo[0] + G_T8[2][1] * eo[1] + add) >> shift);
        dst[6 * line + j] = clip16((G_T8[6][0] * eo[0] + G_T8[6][1] * eo[1] + add) >> shift);

        for k in (1..8).step_by(2) {
            let row = &G_T8[k];
            let sum = row[0] * o[0] + row[1] * o[1] + row[2] * o[2] + row[3] * o[3];
            dst[k * line + j] = clip16((sum + add) >> shift);
        }
    }
}

fn partial_butterfly16(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 16..j * 16 + 16];
        let mut e = [0i32; 8];
        let mut o = [0i32; 8];
        for k in 0..8 {
            e[k] = s[k] as i32 + s[15 - k] as i32;
            o[k] = s[k] as i32 - s[15 - k] as i32;
        }
        let mut ee = [0i32; 4];
        let mut eo = [0i32; 4];
        for k in 0..4 {
            ee[k] = e[k] + e[7 - k];
            eo[k] = e[k] - e[7 - k];
        }
        let eee = [ee[0] + ee[3], ee[1] + ee[2]];
        let eeo = [ee[0] - ee[3], ee[1] - ee[2]];

        dst[j] = clip16((G_T16[0][0] * eee[0] + G_T16[0][1] * eee[1] + add) >> shift);
        dst[8 * line + j] = clip16((G_T16[8][0] * eee[0] + G_T16[8][1] * eee[1] + add) >> shift);
        dst[4 * line + j] = clip16((G_T16[4][0] * eeo[0] + G_T16[4][1] * eeo[1] + add) >> shift);
        dst[12 * line + j] = clip16((G_T16[12][0] * eeo[0] + G_T16[12][1] * eeo[1] + add) >> shift);

        for k in (2..16).step_by(4) {
            let row = &G_T16[k];
            let sum: i32 = (0..4).map(|i| row[i] * eo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (1..16).step_by(2) {
            let row = &G_T16[k];
            let sum: i32 = (0..8).map(|i| row[i] * o[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }
    }
}

fn partial_butterfly32(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 32..j * 32 + 32];
        let mut e = [0i32; 16];
        let mut o = [0i32; 16];
        for k in 0..16 {
            e[k] = s[k] as i32 + s[31 - k] as i32;
            o[k] = s[k] as i32 - s[31 - k] as i32;
        }
        let mut ee = [0i32; 8];
        let mut eo = [0i32; 8];
        for k in 0..8 {
            ee[k] = e[k] + e[15 - k];
            eo[k] = e[k] - e[15 - k];
        }
        let mut eee = [0i32; 4];
        let mut eeo = [0i32; 4];
        for k in 0..4 {
            eee[k] = ee[k] + ee[7 - k];
            eeo[k] = ee[k] - ee[7 - k];
        }
        let eeee = [eee[0] + eee[3], eee[1] + eee[2]];
        let eeeo = [eee[0] - eee[3], eee[1] - eee[2]];

        dst[j] = clip16((G_T16[0][0] * eeee[0] + G_T16[0][1] * eeee[1] + add) >> shift);
        dst[16 * line + j] = clip16((G_T16[8][0] * eeee[0] + G_T16[8][1] * eeee[1] + add) >> shift);
        dst[8 * line + j] = clip16((G_T16[4][0] * eeeo[0] + G_T16[4][1] * eeeo[1] + add) >> shift);
        dst[24 * line + j] = clip16((G_T16[12][0] * eeeo[0] + G_T16[12][1] * eeeo[1] + add) >> shift);

        for k in (4..32).step_by(8) {
            let row = &G_T16[k / 2];
            let sum: i32 = (0..4).map(|i| row[i] * eeo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (2..32).step_by(4) {
            let row = &G_T16[k / 2];
            let sum: i32 = (0..8).map(|i| row[i] * eo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (1..32).step_by(2) {
            let row = &G_T32_ODD[k / 2];
            let sum: i32 = (0..16).map(|i| row[i] * o[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }
    }
}

/// Low-pass variant of the 16-point butterfly: emits frequency rows 0..8,
/// zeroes the upper half.
fn partial_butterfly16_low(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 16..j * 16 + 16];
        let mut e = [0i32; 8];
        let mut o = [0i32; 8];
        for k in 0..8 {
            e[k] = s[k] as i32 + s[15 - k] as i32;
            o[k] = s[k] as i32 - s[15 - k] as i32;
        }
        let mut ee = [0i32; 4];
        let mut eo = [0i32; 4];
        for k in 0..4 {
            ee[k] = e[k] + e[7 - k];
            eo[k] = e[k] - e[7 - k];
        }
        let eee = [ee[0] + ee[3], ee[1] + ee[2]];
        let eeo = [ee[0] - ee[3], ee[1] - ee[2]];

        dst[j] = clip16((G_T16[0][0] * eee[0] + G_T16[0][1] * eee[1] + add) >> shift);
        dst[4 * line + j] = clip16((G_T16[4][0] * eeo[0] + G_T16[4][1] * eeo[1] + add) >> shift);

        for k in [2usize, 6] {
            let row = &G_T16[k];
            let sum: i32 = (0..4).map(|i| row[i] * eo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (1..8).step_by(2) {
            let row = &G_T16[k];
            let sum: i32 = (0..8).map(|i| row[i] * o[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in 8..16 {
            dst[k * line + j] = 0;
        }
    }
}

/// Low-pass variant of the 32-point butterfly: emits frequency rows 0..16,
/// zeroes the upper half.
fn partial_butterfly32_low(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 32..j * 32 + 32];
        let mut e = [0i32; 16];
        let mut o = [0i32; 16];
        for k in 0..16 {
            e[k] = s[k] as i32 + s[31 - k] as i32;
            o[k] = s[k] as i32 - s[31 - k] as i32;
        }
        let mut ee = [0i32; 8];
        let mut eo = [0i32; 8];
        for k in 0..8 {
            ee[k] = e[k] + e[15 - k];
            eo[k] = e[k] - e[15 - k];
        }
        let mut eee = [0i32; 4];
        let mut eeo = [0i32; 4];
        for k in 0..4 {
            eee[k] = ee[k] + ee[7 - k];
            eeo[k] = ee[k] - ee[7 - k];
        }
        let eeee = [eee[0] + eee[3], eee[1] + eee[2]];
        let eeeo = [eee[0] - eee[3], eee[1] - eee[2]];

        dst[j] = clip16((G_T16[0][0] * eeee[0] + G_T16[0][1] * eeee[1] + add) >> shift);
        dst[8 * line + j] = clip16((G_T16[4][0] * eeeo[0] + G_T16[4][1] * eeeo[1] + add) >> shift);

        for k in [4usize, 12] {
            let row = &G_T16[k / 2];
            let sum: i32 = (0..4).map(|i| row[i] * eeo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (2..16).step_by(4) {
            let row = &G_T16[k / 2];
            let sum: i32 = (0..8).map(|i| row[i] * eo[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in (1..16).step_by(2) {
            let row = &G_T32_ODD[k / 2];
            let sum: i32 = (0..16).map(|i| row[i] * o[i]).sum();
            dst[k * line + j] = clip16((sum + add) >> shift);
        }

        for k in 16..32 {
            dst[k * line + j] = 0;
        }
    }
}

/// Fast 4-point forward DST. The fast formulation and the full matrix
/// multiplication give identical results.
fn fast_forward_dst4(block: &[i16], coeff: &mut [i16], shift: u32) {
    let add = 1i32 << (shift - 1);

    for i in 0..4 {
        let s = &block[i * 4..i * 4 + 4];
        let c0 = s[0] as i32 + s[3] as i32;
        let c1 = s[1] as i32 + s[3] as i32;
        let c2 = s[0] as i32 - s[1] as i32;
        let c3 = 74 * s[2] as i32;

        coeff[i] = clip16((29 * c0 + 55 * c1 + c3 + add) >> shift);
        coeff[4 + i] =
            clip16((74 * (s[0] as i32 + s[1] as i32 - s[3] as i32) + add) >> shift);
        coeff[8 + i] = clip16((29 * c2 + 55 * c0 - c3 + add) >> shift);
        coeff[12 + i] = clip16((55 * c2 - 29 * c1 + c3 + add) >> shift);
    }
}

/// Fast 4-point inverse DST.
fn fast_inverse_dst4(tmp: &[i16], block: &mut [i16], shift: u32) {
    let add = 1i32 << (shift - 1);

    for i in 0..4 {
        let c0 = tmp[i] as i32 + tmp[8 + i] as i32;
        let c1 = tmp[8 + i] as i32 + tmp[12 + i] as i32;
        let c2 = tmp[i] as i32 - tmp[12 + i] as i32;
        let c3 = 74 * tmp[4 + i] as i32;

        block[4 * i] = clip16((29 * c0 + 55 * c1 + c3 + add) >> shift);
        block[4 * i + 1] = clip16((55 * c2 - 29 * c1 + c3 + add) >> shift);
        block[4 * i + 2] =
            clip16((74 * (tmp[i] as i32 - tmp[8 + i] as i32 + tmp[12 + i] as i32) + add) >> shift);
        block[4 * i + 3] = clip16((55 * c0 + 29 * c2 - c3 + add) >> shift);
    }
}

fn partial_butterfly_inverse4(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let o = [
            G_T4[1][0] * src[line + j] as i32 + G_T4[3][0] * src[3 * line + j] as i32,
            G_T4[1][1] * src[line + j] as i32 + G_T4[3][1] * src[3 * line + j] as i32,
        ];
        let e = [
            G_T4[0][0] * src[j] as i32 + G_T4[2][0] * src[2 * line + j] as i32,
            G_T4[0][1] * src[j] as i32 + G_T4[2][1] * src[2 * line + j] as i32,
        ];

        dst[j * 4] = clip16((e[0] + o[0] + add) >> shift);
        dst[j * 4 + 1] = clip16((e[1] + o[1] + add) >> shift);
        dst[j * 4 + 2] = clip16((e[1] - o[1] + add) >> shift);
        dst[j * 4 + 3] = clip16((e[0] - o[0] + add) >> shift);
    }
}

fn partial_butterfly_inverse8(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let mut o = [0i32; 4];
        for k in 0..4 {
            o[k] = G_T8[1][k] * src[line + j] as i32
                + G_T8[3][k] * src[3 * line + j] as i32
                + G_T8[5][k] * src[5 * line + j] as i32
                + G_T8[7][k] * src[7 * line + j] as i32;
        }

        let eo = [
            G_T8[2][0] * src[2 * line + j] as i32 + G_T8[6][0] * src[6 * line + j] as i32,
            G_T8[2][1] * src[2 * line + j] as i32 + G_T8[6][1] * src[6 * line + j] as i32,
        ];
        let ee = [
            G_T8[0][0] * src[j] as i32 + G_T8[4][0] * src[4 * line + j] as i32,
            G_T8[0][1] * src[j] as i32 + G_T8[4][1] * src[4 * line + j] as i32,
        ];

        let e = [ee[0] + eo[0], ee[1] + eo[1], ee[1] - eo[1], ee[0] - eo[0]];
        for k in 0..4 {
            dst[j * 8 + k] = clip16((e[k] + o[k] + add) >> shift);
            dst[j * 8 + k + 4] = clip16((e[3 - k] - o[3 - k] + add) >> shift);
        }
    }
}

fn partial_butterfly_inverse16(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let mut o = [0i32; 8];
        for k in 0..8 {
            o[k] = (1..16)
                .step_by(2)
                .map(|r| G_T16[r][k] * src[r * line + j] as i32)
                .sum();
        }
        let mut eo = [0i32; 4];
        for k in 0..4 {
            eo[k] = (2..16)
                .step_by(4)
                .map(|r| G_T16[r][k] * src[r * line + j] as i32)
                .sum();
        }
        let eeo = [
            G_T16[4][0] * src[4 * line + j] as i32 + G_T16[12][0] * src[12 * line + j] as i32,
            G_T16[4][1] * src[4 * line + j] as i32 + G_T16[12][1] * src[12 * line + j] as i32,
        ];
        let eee = [
            G_T16[0][0] * src[j] as i32 + G_T16[8][0] * src[8 * line + j] as i32,
            G_T16[0][1] * src[j] as i32 + G_T16[8][1] * src[8 * line + j] as i32,
        ];

        let mut ee = [0i32; 4];
        for k in 0..2 {
            ee[k] = eee[k] + eeo[k];
            ee[k + 2] = eee[1 - k] - eeo[1 - k];
        }
        let mut e = [0i32; 8];
        for k in 0..4 {
            e[k] = ee[k] + eo[k];
            e[k + 4] = ee[3 - k] - eo[3 - k];
        }

        for k in 0..8 {
            dst[j * 16 + k] = clip16((e[k] + o[k] + add) >> shift);
            dst[j * 16 + k + 8] = clip16((e[7 - k] - o[7 - k] + add) >> shift);
        }
    }
}

fn partial_butterfly_inverse32(src: &[i16], dst: &mut [i16], shift: u32, line: usize) {
    let add = 1i32 << (shift - 1);

    for j in 0..line {
        let mut o = [0i32; 16];
        for k in 0..16 {
            o[k] = (1..32)
                .step_by(2)
                .map(|r| G_T32_ODD[r / 2][k] * src[r * line + j] as i32)
                .sum();
        }
        let mut eo = [0i32; 8];
        for k in 0..8 {
            eo[k] = (2..32)
                .step_by(4)
                .map(|r| G_T16[r / 2][k] * src[r * line + j] as i32)
                .sum();
        }
        let mut eeo = [0i32; 4];
        for k in 0..4 {
            eeo[k] = (4..32)
                .step_by(8)
                .map(|r| G_T16[r / 2][k] * src[r * line + j] as i32)
                .sum();
        }
        let eeeo = [
            G_T16[4][0] * src[8 * line + j] as i32 + G_T16[12][0] * src[24 * line + j] as i32,
            G_T16[4][1] * src[8 * line + j] as i32 + G_T16[12][1] * src[24 * line + j] as i32,
        ];
        let eeee = [
            G_T16[0][0] * src[j] as i32 + G_T16[8][0] * src[16 * line + j] as i32,
            G_T16[0][1] * src[j] as i32 + G_T16[8][1] * src[16 * line + j] as i32,
        ];

        let eee = [
            eeee[0] + eeeo[0],
            eeee[1] + eeeo[1],
            eeee[1] - eeeo[1],
            eeee[0] - eeeo[0],
        ];
        let mut ee = [0i32; 8];
        for k in 0..4 {
            ee[k] = eee[k] + eeo[k];
            ee[k + 4] = eee[3 - k] - eeo[3 - k];
        }
        let mut e = [0i32; 16];
        for k in 0..8 {
            e[k] = ee[k] + eo[k];
            e[k + 8] = ee[7 - k] - eo[7 - k];
        }

        for k in 0..16 {
            dst[j * 32 + k] = clip16((e[k] + o[k] + add) >> shift);
            dst[j * 32 + k + 16] = clip16((e[15 - k] - o[15 - k] + add) >> shift);
        }
    }
}

fn forward_shifts(size: TransformSize, bit_depth: u8) -> (u32, u32) {
    let log2 = size.log2_size();
    (log2 - 1 + (bit_depth as u32 - 8), log2 + 6)
}

fn inverse_shifts(bit_depth: u8) -> (u32, u32) {
    (7, 12 - (bit_depth as u32 - 8))
}

fn gather_block<const N: usize>(src: &[i16], src_stride: usize, block: &mut [i16]) {
    for i in 0..N {
        block[i * N..(i + 1) * N].copy_from_slice(&src[i * src_stride..i * src_stride + N]);
    }
}

/// Forward 4x4 DCT: `src` is sampled at `src_stride` samples per row, `dst`
/// receives the row-major coefficient block.
pub fn dct4(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T4, bit_depth);
    let mut block = [0i16; 16];
    let mut coef = [0i16; 16];

    gather_block::<4>(src, src_stride, &mut block);
    partial_butterfly4(&block, &mut coef, shift_1st, 4);
    partial_butterfly4(&coef, &mut dst[..16], shift_2nd, 4);
}

/// Forward 8x8 DCT.
pub fn dct8(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T8, bit_depth);
    let mut block = [0i16; 64];
    let mut coef = [0i16; 64];

    gather_block::<8>(src, src_stride, &mut block);
    partial_butterfly8(&block, &mut coef, shift_1st, 8);
    partial_butterfly8(&coef, &mut dst[..64], shift_2nd, 8);
}

/// Forward 16x16 DCT.
pub fn dct16(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T16, bit_depth);
    let mut block = [0i16; 256];
    let mut coef = [0i16; 256];

    gather_block::<16>(src, src_stride, &mut block);
    partial_butterfly16(&block, &mut coef, shift_1st, 16);
    partial_butterfly16(&coef, &mut dst[..256], shift_2nd, 16);
}

/// Forward 32x32 DCT.
pub fn dct32(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T32, bit_depth);
    let mut block = [0i16; 1024];
    let mut coef = [0i16; 1024];

    gather_block::<32>(src, src_stride, &mut block);
    partial_butterfly32(&block, &mut coef, shift_1st, 32);
    partial_butterfly32(&coef, &mut dst[..1024], shift_2nd, 32);
}

/// Forward 4x4 DST.
pub fn dst4(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T4, bit_depth);
    let mut block = [0i16; 16];
    let mut coef = [0i16; 16];

    gather_block::<4>(src, src_stride, &mut block);
    fast_forward_dst4(&block, &mut coef, shift_1st);
    fast_forward_dst4(&coef, &mut dst[..16], shift_2nd);
}

/// Low-pass forward 16x16 DCT: coefficients outside the top-left 8x8
/// quadrant are zero.
pub fn lowpass_dct16(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T16, bit_depth);
    let mut block = [0i16; 256];
    let mut coef = [0i16; 256];

    gather_block::<16>(src, src_stride, &mut block);
    partial_butterfly16_low(&block, &mut coef, shift_1st, 16);
    partial_butterfly16_low(&coef, &mut dst[..256], shift_2nd, 16);
}

/// Low-pass forward 32x32 DCT: coefficients outside the top-left 16x16
/// quadrant are zero.
pub fn lowpass_dct32(src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
    let (shift_1st, shift_2nd) = forward_shifts(TransformSize::T32, bit_depth);
    let mut block = [0i16; 1024];
    let mut coef = [0i16; 1024];

    gather_block::<32>(src, src_stride, &mut block);
    partial_butterfly32_low(&block, &mut coef, shift_1st, 32);
    partial_butterfly32_low(&coef, &mut dst[..1024], shift_2nd, 32);
}

fn scatter_block<const N: usize>(block: &[i16], dst: &mut [i16], dst_stride: usize) {
    for i in 0..N {
        dst[i * dst_stride..i * dst_stride + N].copy_from_slice(&block[i * N..(i + 1) * N]);
    }
}

/// Inverse 4x4 DCT: `src` is the row-major coefficient block, `dst` is
/// written at `dst_stride` samples per row.
pub fn idct4(src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
    let (shift_1st, shift_2nd) = inverse_shifts(bit_depth);
    let mut coef = [0i16; 16];
    let mut block = [0i16; 16];

    partial_butterfly_inverse4(src, &mut coef, shift_1st, 4);
    partial_butterfly_inverse4(&coef, &mut block, shift_2nd, 4);
    scatter_block::<4>(&block, dst, dst_stride);
}

/// Inverse 8x8 DCT.
pub fn idct8(src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
    let (shift_1st, shift_2nd) = inverse_shifts(bit_depth);
    let mut coef = [0i16; 64];
    let mut block = [0i16; 64];

    partial_butterfly_inverse8(src, &mut coef, shift_1st, 8);
    partial_butterfly_inverse8(&coef, &mut block, shift_2nd, 8);
    scatter_block::<8>(&block, dst, dst_stride);
}

/// Inverse 16x16 DCT.
pub fn idct16(src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
    let (shift_1st, shift_2nd) = inverse_shifts(bit_depth);
    let mut coef = [0i16; 256];
    let mut block = [0i16; 256];

    partial_butterfly_inverse16(src, &mut coef, shift_1st, 16);
    partial_butterfly_inverse16(&coef, &mut block, shift_2nd, 16);
    scatter_block::<16>(&block, dst, dst_stride);
}

/// Inverse 32x32 DCT.
pub fn idct32(src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
    let (shift_1st, shift_2nd) = inverse_shifts(bit_depth);
    let mut coef = [0i16; 1024];
    let mut block = [0i16; 1024];

    partial_butterfly_inverse32(src, &mut coef, shift_1st, 32);
    partial_butterfly_inverse32(&coef, &mut block, shift_2nd, 32);
    scatter_block::<32>(&block, dst, dst_stride);
}

/// Inverse 4x4 DST.
pub fn idst4(src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
    let (shift_1st, shift_2nd) = inverse_shifts(bit_depth);
    let mut coef = [0i16; 16];
    let mut block = [0i16; 16];

    fast_inverse_dst4(src, &mut coef, shift_1st);
    fast_inverse_dst4(&coef, &mut block, shift_2nd);
    scatter_block::<4>(&block, dst, dst_stride);
}

/// Signature of the forward transform kernels.
pub type ForwardTransformFn = fn(&[i16], usize, &mut [i16], u8);

/// Signature of the inverse transform kernels.
pub type InverseTransformFn = fn(&[i16], &mut [i16], usize, u8);

/// Kernel dispatch table, built once per analyzer.
///
/// With `enable_lowpass_dct` the large forward transforms are replaced by
/// their low-pass variants; 4x4 and 8x8 always use the standard kernels.
#[derive(Clone, Copy)]
pub struct Kernels {
    dct: [ForwardTransformFn; 4],
    idct: [InverseTransformFn; 4],
    dst4: ForwardTransformFn,
    idst4: InverseTransformFn,
}

impl Kernels {
    /// Build the kernel table.
    pub fn new(enable_lowpass_dct: bool) -> Self {
        let mut dct: [ForwardTransformFn; 4] = [dct4, dct8, dct16, dct32];
        if enable_lowpass_dct {
            dct[TransformSize::T16.index()] = lowpass_dct16;
            dct[TransformSize::T32.index()] = lowpass_dct32;
        }
        Self {
            dct,
            idct: [idct4, idct8, idct16, idct32],
            dst4,
            idst4,
        }
    }

    /// Forward DCT for the given size.
    pub fn forward(
        &self,
        size: TransformSize,
        src: &[i16],
        src_stride: usize,
        dst: &mut [i16],
        bit_depth: u8,
    ) {
        (self.dct[size.index()])(src, src_stride, dst, bit_depth);
    }

    /// Inverse DCT for the given size.
    pub fn inverse(
        &self,
        size: TransformSize,
        src: &[i16],
        dst: &mut [i16],
        dst_stride: usize,
        bit_depth: u8,
    ) {
        (self.idct[size.index()])(src, dst, dst_stride, bit_depth);
    }

    /// Forward 4x4 DST.
    pub fn forward_dst4(&self, src: &[i16], src_stride: usize, dst: &mut [i16], bit_depth: u8) {
        (self.dst4)(src, src_stride, dst, bit_depth);
    }

    /// Inverse 4x4 DST.
    pub fn inverse_dst4(&self, src: &[i16], dst: &mut [i16], dst_stride: usize, bit_depth: u8) {
        (self.idst4)(src, dst, dst_stride, bit_depth);
    }
}

impl Default for Kernels {
    fn default() -> Self {
        Self::new(false)
    }
}
