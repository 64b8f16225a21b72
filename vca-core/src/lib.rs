//! Core types for the VCA video complexity analyzer.
//!
//! This crate provides the leaf types shared by the analysis engine and its
//! callers: frame geometry ([`FrameInfo`], [`ColorSpace`]), shared pixel
//! views ([`Frame`]), and the base error hierarchy.
//!
//! Pixel ownership stays with the caller: a [`Frame`] shares its plane
//! buffers through reference counting, and the analyzer drops its references
//! once the matching result has been pulled.

pub mod error;
pub mod frame;

pub use error::{Error, Result};
pub use frame::{ColorSpace, Frame, FrameInfo};
