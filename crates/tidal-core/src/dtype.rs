use std::fmt;

// DType — numeric element types found in processed archives
//
// Archives written by numpy can hold any of the fixed-width numeric types.
// Features are read as floats and labels as integers, but we keep track of the
// stored type so errors and inspection output can name it:
//
//   F32/F64          — feature arrays (`x`)
//   I8..I64, U8..U64 — label arrays (`y`), widened to I64 on load
//   Bool             — binary label arrays, widened to 0/1

/// Enum of all element data types an archive may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::U64 => "u64",
            DType::Bool => "bool",
        };
        write!(f, "{}", s)
    }
}

// WithDType — Trait that connects Rust types to DType enum
//
// Tensors are generic over their element type. Samples hold `Tensor<f32>`
// features and `Tensor<i64>` labels, and generic code (zero-filling, debug
// printing) reaches the runtime DType through this trait.

/// Trait implemented by Rust types that can be stored in a tensor.
pub trait WithDType:
    Copy + Send + Sync + 'static + num_traits::NumCast + PartialOrd + fmt::Debug
{
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Create a value of this type from f64.
    fn from_f64(v: f64) -> Self;

    /// The zero value.
    fn zero() -> Self {
        Self::from_f64(0.0)
    }
}

impl WithDType for f32 {
    const DTYPE: DType = DType::F32;
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl WithDType for f64 {
    const DTYPE: DType = DType::F64;
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl WithDType for i64 {
    const DTYPE: DType = DType::I64;
    fn from_f64(v: f64) -> Self {
        v as i64
    }
}
