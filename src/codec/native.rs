//! [`Codec`] and [`Optimizer`] backed by the native meshoptimizer library.
//!
//! The library asserts on malformed arguments instead of returning errors,
//! so every entry point checks sizes and strides before crossing the FFI
//! boundary. Rejected calls report failure through the normal convention
//! (0 bytes written, [`PRECONDITION_FAILED`] status, or a validation error).

use std::ffi::c_void;

use meshopt::ffi;

use super::{Codec, Optimizer, SimplifyOptions};
use crate::util::{Error, Result};

/// Status returned by decoders for arguments rejected before the library
/// was called.
pub const PRECONDITION_FAILED: i32 = -100;

/// Largest vertex record the vertex codec accepts.
const MAX_VERTEX_SIZE: usize = 256;

#[inline]
fn valid_vertex_size(vertex_size: usize) -> bool {
    vertex_size > 0 && vertex_size <= MAX_VERTEX_SIZE && vertex_size % 4 == 0
}

#[inline]
fn valid_index_size(index_size: usize) -> bool {
    index_size == 2 || index_size == 4
}

fn check_triangles(indices: &[u32], vertex_count: usize) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(Error::validation(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::validation(format!(
            "index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }
    Ok(())
}

fn check_positions(positions: &[f32], vertex_count: usize, stride: usize) -> Result<()> {
    if !(12..=MAX_VERTEX_SIZE).contains(&stride) || stride % 4 != 0 {
        return Err(Error::validation(format!("position stride {} must be 12..=256 and a multiple of 4", stride)));
    }
    if vertex_count * stride > positions.len() * 4 {
        return Err(Error::validation(format!(
            "position buffer holds {} floats, too small for {} vertices of {} bytes",
            positions.len(),
            vertex_count,
            stride
        )));
    }
    Ok(())
}

/// Run an in-place filter over an aligned copy of `buffer`.
fn filter_words(buffer: &mut [u8], count: usize, stride: usize, filter: impl FnOnce(&mut [u32])) -> Result<()> {
    let len = count
        .checked_mul(stride)
        .ok_or_else(|| Error::validation("filter buffer size overflows"))?;
    if buffer.len() < len {
        return Err(Error::validation(format!(
            "filter buffer holds {} bytes, expected at least {}",
            buffer.len(),
            len
        )));
    }
    let mut words: Vec<u32> = bytemuck::pod_collect_to_vec(&buffer[..len]);
    filter(&mut words);
    buffer[..len].copy_from_slice(bytemuck::cast_slice(&words));
    Ok(())
}

/// The production codec, bound to meshoptimizer through the `meshopt` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Meshopt;

impl Codec for Meshopt {
    fn encode_vertex_buffer_bound(&self, vertex_count: usize, vertex_size: usize) -> usize {
        if !valid_vertex_size(vertex_size) {
            return 0;
        }
        // SAFETY: pure size computation, arguments validated above.
        unsafe { ffi::meshopt_encodeVertexBufferBound(vertex_count, vertex_size) }
    }

    fn encode_vertex_buffer(&self, dst: &mut [u8], vertices: &[u8], vertex_count: usize, vertex_size: usize) -> usize {
        if !valid_vertex_size(vertex_size) || vertex_count.checked_mul(vertex_size) != Some(vertices.len()) {
            return 0;
        }
        // SAFETY: `vertices` holds exactly vertex_count * vertex_size bytes and
        // the library writes at most dst.len() bytes.
        unsafe {
            ffi::meshopt_encodeVertexBuffer(
                dst.as_mut_ptr(),
                dst.len(),
                vertices.as_ptr() as *const c_void,
                vertex_count,
                vertex_size,
            )
        }
    }

    fn decode_vertex_buffer(&self, dst: &mut [u8], vertex_count: usize, vertex_size: usize, src: &[u8]) -> i32 {
        if !valid_vertex_size(vertex_size) || vertex_count.checked_mul(vertex_size) != Some(dst.len()) {
            return PRECONDITION_FAILED;
        }
        // SAFETY: `dst` holds exactly vertex_count * vertex_size bytes; the
        // library reads at most src.len() bytes.
        unsafe {
            ffi::meshopt_decodeVertexBuffer(
                dst.as_mut_ptr() as *mut c_void,
                vertex_count,
                vertex_size,
                src.as_ptr(),
                src.len(),
            )
        }
    }

    fn encode_index_buffer_bound(&self, index_count: usize, vertex_count: usize) -> usize {
        if index_count % 3 != 0 {
            return 0;
        }
        // SAFETY: pure size computation, arguments validated above.
        unsafe { ffi::meshopt_encodeIndexBufferBound(index_count, vertex_count) }
    }

    fn encode_index_buffer(&self, dst: &mut [u8], indices: &[u32]) -> usize {
        if indices.len() % 3 != 0 {
            return 0;
        }
        // SAFETY: index count is a multiple of 3; writes bounded by dst.len().
        unsafe { ffi::meshopt_encodeIndexBuffer(dst.as_mut_ptr(), dst.len(), indices.as_ptr(), indices.len()) }
    }

    fn decode_index_buffer(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32 {
        if dst.len() % 3 != 0 || !valid_index_size(index_size) {
            return PRECONDITION_FAILED;
        }
        if index_size == 4 {
            // SAFETY: `dst` holds dst.len() aligned u32 slots.
            return unsafe {
                ffi::meshopt_decodeIndexBuffer(
                    dst.as_mut_ptr() as *mut c_void,
                    dst.len(),
                    index_size,
                    src.as_ptr(),
                    src.len(),
                )
            };
        }
        let mut narrow = vec![0u16; dst.len()];
        // SAFETY: `narrow` holds dst.len() aligned u16 slots.
        let status = unsafe {
            ffi::meshopt_decodeIndexBuffer(
                narrow.as_mut_ptr() as *mut c_void,
                narrow.len(),
                index_size,
                src.as_ptr(),
                src.len(),
            )
        };
        for (wide, &n) in dst.iter_mut().zip(&narrow) {
            *wide = u32::from(n);
        }
        status
    }

    fn encode_index_sequence_bound(&self, index_count: usize, vertex_count: usize) -> usize {
        // SAFETY: pure size computation.
        unsafe { ffi::meshopt_encodeIndexSequenceBound(index_count, vertex_count) }
    }

    fn encode_index_sequence(&self, dst: &mut [u8], indices: &[u32]) -> usize {
        // SAFETY: writes bounded by dst.len(); reads indices.len() values.
        unsafe { ffi::meshopt_encodeIndexSequence(dst.as_mut_ptr(), dst.len(), indices.as_ptr(), indices.len()) }
    }

    fn decode_index_sequence(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32 {
        if !valid_index_size(index_size) {
            return PRECONDITION_FAILED;
        }
        if index_size == 4 {
            // SAFETY: `dst` holds dst.len() aligned u32 slots.
            return unsafe {
                ffi::meshopt_decodeIndexSequence(
                    dst.as_mut_ptr() as *mut c_void,
                    dst.len(),
                    index_size,
                    src.as_ptr(),
                    src.len(),
                )
            };
        }
        let mut narrow = vec![0u16; dst.len()];
        // SAFETY: `narrow` holds dst.len() aligned u16 slots.
        let status = unsafe {
            ffi::meshopt_decodeIndexSequence(
                narrow.as_mut_ptr() as *mut c_void,
                narrow.len(),
                index_size,
                src.as_ptr(),
                src.len(),
            )
        };
        for (wide, &n) in dst.iter_mut().zip(&narrow) {
            *wide = u32::from(n);
        }
        status
    }

    fn decode_filter_oct(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()> {
        if stride != 4 && stride != 8 {
            return Err(Error::validation(format!("octahedral filter stride must be 4 or 8, got {}", stride)));
        }
        filter_words(buffer, count, stride, |words| {
            // SAFETY: `words` covers count * stride bytes, stride checked above.
            unsafe { ffi::meshopt_decodeFilterOct(words.as_mut_ptr() as *mut c_void, count, stride) }
        })
    }

    fn decode_filter_quat(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()> {
        if stride != 8 {
            return Err(Error::validation(format!("quaternion filter stride must be 8, got {}", stride)));
        }
        filter_words(buffer, count, stride, |words| {
            // SAFETY: `words` covers count * 8 bytes.
            unsafe { ffi::meshopt_decodeFilterQuat(words.as_mut_ptr() as *mut c_void, count, stride) }
        })
    }

    fn decode_filter_exp(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()> {
        if stride == 0 || stride % 4 != 0 {
            return Err(Error::validation(format!("exponential filter stride must be a multiple of 4, got {}", stride)));
        }
        filter_words(buffer, count, stride, |words| {
            // SAFETY: `words` covers count * stride bytes, stride checked above.
            unsafe { ffi::meshopt_decodeFilterExp(words.as_mut_ptr() as *mut c_void, count, stride) }
        })
    }
}

impl Optimizer for Meshopt {
    fn optimize_vertex_cache(&self, dst: &mut [u32], indices: &[u32], vertex_count: usize) -> Result<()> {
        check_triangles(indices, vertex_count)?;
        if dst.len() != indices.len() {
            return Err(Error::validation("destination must match the index count"));
        }
        // SAFETY: buffers have equal length; indices validated against vertex_count.
        unsafe { ffi::meshopt_optimizeVertexCache(dst.as_mut_ptr(), indices.as_ptr(), indices.len(), vertex_count) };
        Ok(())
    }

    fn optimize_overdraw(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        positions: &[f32],
        vertex_count: usize,
        stride: usize,
        threshold: f32,
    ) -> Result<()> {
        check_triangles(indices, vertex_count)?;
        check_positions(positions, vertex_count, stride)?;
        if dst.len() != indices.len() {
            return Err(Error::validation("destination must match the index count"));
        }
        // SAFETY: all buffers validated above.
        unsafe {
            ffi::meshopt_optimizeOverdraw(
                dst.as_mut_ptr(),
                indices.as_ptr(),
                indices.len(),
                positions.as_ptr(),
                vertex_count,
                stride,
                threshold,
            )
        };
        Ok(())
    }

    fn optimize_vertex_fetch(
        &self,
        dst: &mut [u8],
        indices: &mut [u32],
        vertices: &[u8],
        vertex_count: usize,
        vertex_size: usize,
    ) -> Result<usize> {
        check_triangles(indices, vertex_count)?;
        if vertex_size == 0 || vertex_size > MAX_VERTEX_SIZE {
            return Err(Error::validation(format!("vertex size {} out of range", vertex_size)));
        }
        let len = vertex_count * vertex_size;
        if vertices.len() != len || dst.len() < len {
            return Err(Error::validation("vertex buffers do not match vertex_count * vertex_size"));
        }
        // SAFETY: buffers validated above; the library rewrites indices in place.
        let unique = unsafe {
            ffi::meshopt_optimizeVertexFetch(
                dst.as_mut_ptr() as *mut c_void,
                indices.as_mut_ptr(),
                indices.len(),
                vertices.as_ptr() as *const c_void,
                vertex_count,
                vertex_size,
            )
        };
        Ok(unique)
    }

    fn simplify(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        positions: &[f32],
        vertex_count: usize,
        stride: usize,
        target_index_count: usize,
        target_error: f32,
        options: SimplifyOptions,
        result_error: &mut f32,
    ) -> Result<usize> {
        check_triangles(indices, vertex_count)?;
        check_positions(positions, vertex_count, stride)?;
        if target_index_count > indices.len() {
            return Err(Error::validation("target index count exceeds the index count"));
        }
        if dst.len() < indices.len() {
            return Err(Error::validation("destination must hold at least the index count"));
        }
        // SAFETY: all buffers validated above.
        let written = unsafe {
            ffi::meshopt_simplify(
                dst.as_mut_ptr(),
                indices.as_ptr(),
                indices.len(),
                positions.as_ptr(),
                vertex_count,
                stride,
                target_index_count,
                target_error,
                options.bits(),
                result_error as *mut f32,
            )
        };
        Ok(written)
    }
}
