//! Element type tags - the portable names stored in container metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a numeric array.
///
/// The serialized form is the portable type name (`"float32"`, `"int32"`,
/// ...) so metadata written by other tooling round-trips to the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DType {
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// Signed 64-bit integer
    Int64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 9,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 10,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 11,
}

impl DType {
    /// Every supported dtype.
    pub const ALL: [DType; 11] = [
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Uint64,
        Self::Int64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// The element type the codec compresses: every array is converted
    /// to this type before encoding.
    pub const NATIVE: DType = DType::Float32;

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the portable name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse a dtype from its portable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    /// Returns true if every value of this type survives the trip through
    /// the native float type unchanged.
    ///
    /// 32/64-bit integers and float64 only round-trip exactly when the
    /// values themselves fit in a float32 (integers up to 2^24).
    #[inline]
    pub const fn is_exact_in_native(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Int8 | Self::Uint16 | Self::Int16 | Self::Float16 | Self::Float32
        )
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::Uint8.num_bytes(), 1);
        assert_eq!(DType::Int16.num_bytes(), 2);
        assert_eq!(DType::Float16.num_bytes(), 2);
        assert_eq!(DType::Int32.num_bytes(), 4);
        assert_eq!(DType::Float32.num_bytes(), 4);
        assert_eq!(DType::Float64.num_bytes(), 8);
        assert_eq!(DType::NATIVE.num_bytes(), 4);
    }

    #[test]
    fn test_dtype_name_roundtrip() {
        for t in DType::ALL {
            assert_eq!(DType::from_name(t.name()), Some(t));
        }
        assert_eq!(DType::from_name("float32_t"), None);
        assert_eq!(DType::from_name("bool"), None);
    }

    #[test]
    fn test_dtype_serde_uses_names() {
        for t in DType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.name()));
            let back: DType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
        }
        assert!(serde_json::from_str::<DType>("\"complex64\"").is_err());
    }

    #[test]
    fn test_dtype_classes() {
        assert!(DType::Int64.is_integer());
        assert!(DType::Float16.is_float());
        assert!(DType::Int16.is_exact_in_native());
        assert!(!DType::Int32.is_exact_in_native());
    }
}
