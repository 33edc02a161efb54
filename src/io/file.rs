//! Single-asset file framing for one encoded array.
//!
//! Layout:
//! - `u32` little-endian metadata length
//! - UTF-8 JSON metadata (`shape`, `dtype`, `itemsize`, `format_version`)
//! - compressed payload up to end of file

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::codec::{decode_array, encode_array, Codec};
use crate::core::{Array, ArrayMetadata, EncodedArray};
use crate::util::{Error, Result};

fn truncated(e: std::io::Error, what: &str) -> Error {
    if e.kind() == ErrorKind::UnexpectedEof {
        Error::format(format!("truncated {}", what))
    } else {
        Error::Io(e)
    }
}

/// Write an encoded array in single-asset framing.
pub fn write_encoded_array<W: Write>(mut writer: W, encoded: &EncodedArray) -> Result<()> {
    let metadata = serde_json::to_vec(&ArrayMetadata::from_encoded(encoded))?;
    let len = u32::try_from(metadata.len())
        .map_err(|_| Error::validation("metadata does not fit a 32-bit length prefix"))?;
    writer.write_u32::<LittleEndian>(len)?;
    writer.write_all(&metadata)?;
    writer.write_all(&encoded.data)?;
    writer.flush()?;
    Ok(())
}

/// Read an encoded array in single-asset framing. Everything after the
/// metadata is the payload.
pub fn read_encoded_array<R: Read>(mut reader: R) -> Result<EncodedArray> {
    let len = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| truncated(e, "metadata length prefix"))?;
    let mut metadata = vec![0u8; len as usize];
    reader
        .read_exact(&mut metadata)
        .map_err(|e| truncated(e, &format!("metadata (declared {} bytes)", len)))?;
    let metadata: ArrayMetadata = serde_json::from_slice(&metadata)?;

    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    metadata.into_encoded(data)
}

/// Save an encoded array to `path`.
pub fn save_encoded_array_to_file(encoded: &EncodedArray, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_encoded_array(BufWriter::new(file), encoded)?;
    tracing::debug!("Saved array {:?} ({}) to {}", encoded.shape, encoded.dtype, path.display());
    Ok(())
}

/// Load an encoded array from `path`.
pub fn load_encoded_array_from_file(path: impl AsRef<Path>) -> Result<EncodedArray> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::not_found(path.display().to_string())
        } else {
            Error::Io(e)
        }
    })?;
    let encoded = read_encoded_array(BufReader::new(file))?;
    tracing::debug!("Loaded array {:?} ({}) from {}", encoded.shape, encoded.dtype, path.display());
    Ok(encoded)
}

/// Encode and save an array to `path`.
pub fn save_array_to_file<C: Codec + ?Sized>(codec: &C, array: &Array, path: impl AsRef<Path>) -> Result<()> {
    let encoded = encode_array(codec, array)?;
    save_encoded_array_to_file(&encoded, path)
}

/// Load and decode an array from `path`.
pub fn load_array_from_file<C: Codec + ?Sized>(codec: &C, path: impl AsRef<Path>) -> Result<Array> {
    let encoded = load_encoded_array_from_file(path)?;
    decode_array(codec, &encoded)
}
