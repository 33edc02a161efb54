//! Array codec - n-dimensional numeric arrays to self-describing records.
//!
//! Arrays are flattened in row-major order, converted to `f32` and encoded
//! as a vertex stream of 4-byte items. The conversion is lossy for integers
//! beyond 2^24 and for `float64`; decoding casts back to the original dtype
//! but cannot restore what the conversion dropped.

use crate::core::{Array, ArrayData, EncodedArray};
use crate::util::{DType, Error, Result};

use super::Codec;

/// Byte width of one encoded item.
pub const NATIVE_ITEM_SIZE: usize = DType::NATIVE.num_bytes();

/// Compress an array.
pub fn encode_array<C: Codec + ?Sized>(codec: &C, array: &Array) -> Result<EncodedArray> {
    let flat = match array.data() {
        ArrayData::Float32(values) => std::borrow::Cow::Borrowed(values.as_slice()),
        other => std::borrow::Cow::Owned(other.to_native()),
    };
    let item_count = flat.len();

    let bound = codec.encode_vertex_buffer_bound(item_count, NATIVE_ITEM_SIZE);
    let mut buffer = vec![0u8; bound];
    let written = codec.encode_vertex_buffer(&mut buffer, bytemuck::cast_slice(&flat), item_count, NATIVE_ITEM_SIZE);
    if written == 0 {
        return Err(Error::Encoding(format!(
            "array of shape {:?} ({}) produced no output",
            array.shape(),
            array.dtype()
        )));
    }
    buffer.truncate(written);

    tracing::trace!("Encoded {} {} items into {} bytes", item_count, array.dtype(), written);

    Ok(EncodedArray {
        data: buffer,
        shape: array.shape().to_vec(),
        dtype: array.dtype(),
        itemsize: NATIVE_ITEM_SIZE,
    })
}

/// Decompress an array, restoring its shape and dtype.
pub fn decode_array<C: Codec + ?Sized>(codec: &C, encoded: &EncodedArray) -> Result<Array> {
    if encoded.itemsize != NATIVE_ITEM_SIZE {
        return Err(Error::validation(format!(
            "itemsize {} does not match the encoded item width {}",
            encoded.itemsize, NATIVE_ITEM_SIZE
        )));
    }
    let item_count = encoded.item_count()?;
    if item_count.checked_mul(encoded.itemsize).is_none() {
        return Err(Error::validation(format!("shape {:?} is too large to decode", encoded.shape)));
    }
    let mut values = vec![0f32; item_count];

    let status = codec.decode_vertex_buffer(
        bytemuck::cast_slice_mut(&mut values),
        item_count,
        encoded.itemsize,
        &encoded.data,
    );
    if status != 0 {
        return Err(Error::Decoding { what: "array", code: status });
    }

    Array::from_data(encoded.shape.clone(), ArrayData::from_native(encoded.dtype, values))
}
