//! # tidal-core
//!
//! Numeric primitives shared by the tidal crates.
//!
//! This crate provides:
//! - [`Tensor`] — immutable, host-resident n-dimensional array
//! - [`Shape`] — dimension list with row-major indexing helpers
//! - [`DType`] / [`WithDType`] — element types found in processed archives
//! - [`Error`] / [`Result`] — errors raised by the primitives above

pub mod dtype;
pub mod error;
pub mod shape;
pub mod tensor;

pub use dtype::{DType, WithDType};
pub use error::{Error, Result};
pub use shape::Shape;
pub use tensor::Tensor;
