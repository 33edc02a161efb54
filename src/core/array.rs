//! In-memory n-dimensional numeric arrays.

use bytemuck::Pod;
use half::f16;

use crate::util::{DType, Error, Result};

/// Flat row-major element storage, one variant per [`DType`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Uint16(Vec<u16>),
    Int16(Vec<i16>),
    Uint32(Vec<u32>),
    Int32(Vec<i32>),
    Uint64(Vec<u64>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! each_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Uint8($v) => $body,
            ArrayData::Int8($v) => $body,
            ArrayData::Uint16($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::Uint32($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::Uint64($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::Float16($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
        }
    };
}

impl ArrayData {
    /// Element type of this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Uint8(_) => DType::Uint8,
            Self::Int8(_) => DType::Int8,
            Self::Uint16(_) => DType::Uint16,
            Self::Int16(_) => DType::Int16,
            Self::Uint32(_) => DType::Uint32,
            Self::Int32(_) => DType::Int32,
            Self::Uint64(_) => DType::Uint64,
            Self::Int64(_) => DType::Int64,
            Self::Float16(_) => DType::Float16,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert every element to the native codec type.
    ///
    /// Lossy for 32/64-bit integers beyond 2^24 and for float64.
    pub fn to_native(&self) -> Vec<f32> {
        each_variant!(self, v => v.iter().map(|&x| Element::to_f32(x)).collect())
    }

    /// Cast native values back to `dtype`.
    ///
    /// Integer casts saturate at the target range; NaN becomes zero.
    pub fn from_native(dtype: DType, values: Vec<f32>) -> Self {
        fn cast<T: Element>(values: Vec<f32>) -> Vec<T> {
            values.into_iter().map(T::from_f32).collect()
        }
        match dtype {
            DType::Uint8 => Self::Uint8(cast(values)),
            DType::Int8 => Self::Int8(cast(values)),
            DType::Uint16 => Self::Uint16(cast(values)),
            DType::Int16 => Self::Int16(cast(values)),
            DType::Uint32 => Self::Uint32(cast(values)),
            DType::Int32 => Self::Int32(cast(values)),
            DType::Uint64 => Self::Uint64(cast(values)),
            DType::Int64 => Self::Int64(cast(values)),
            DType::Float16 => Self::Float16(cast(values)),
            DType::Float32 => Self::Float32(values),
            DType::Float64 => Self::Float64(cast(values)),
        }
    }
}

/// Trait for element types an [`Array`] can hold.
pub trait Element: Pod + Default + PartialEq + std::fmt::Debug {
    /// The corresponding dtype tag.
    const DTYPE: DType;

    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;

    /// Wrap a typed buffer.
    fn into_data(values: Vec<Self>) -> ArrayData;

    /// Borrow the typed buffer if `data` holds this type.
    fn slice(data: &ArrayData) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                v as $t
            }

            fn into_data(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(u8, Uint8);
impl_element!(i8, Int8);
impl_element!(u16, Uint16);
impl_element!(i16, Int16);
impl_element!(u32, Uint32);
impl_element!(i32, Int32);
impl_element!(u64, Uint64);
impl_element!(i64, Int64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl Element for f16 {
    const DTYPE: DType = DType::Float16;

    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        f16::from_f32(v)
    }

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Float16(values)
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Float16(v) => Some(v),
            _ => None,
        }
    }
}

/// Number of elements described by `shape`. An empty shape is a scalar.
///
/// Shapes whose product overflows `usize` are a validation error.
pub fn shape_len(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| Error::validation(format!("shape {:?} overflows the element count", shape)))
}

/// A dense n-dimensional numeric array in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    data: ArrayData,
}

impl Array {
    /// Create an array from a shape and a typed flat buffer.
    pub fn new<T: Element>(shape: impl Into<Vec<usize>>, values: Vec<T>) -> Result<Self> {
        Self::from_data(shape, T::into_data(values))
    }

    /// Create a one-dimensional array.
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self {
            shape: vec![values.len()],
            data: T::into_data(values),
        }
    }

    /// Create an array from a shape and untyped storage.
    pub fn from_data(shape: impl Into<Vec<usize>>, data: ArrayData) -> Result<Self> {
        let shape = shape.into();
        let expected = shape_len(&shape)?;
        if expected != data.len() {
            return Err(Error::validation(format!(
                "shape {:?} describes {} elements but buffer holds {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the raw element buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().num_bytes()
    }

    #[inline]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Typed view of the elements, `None` if `T` is not the array's dtype.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Same elements under a new shape.
    pub fn reshape(self, shape: impl Into<Vec<usize>>) -> Result<Self> {
        Self::from_data(shape, self.data)
    }
}
