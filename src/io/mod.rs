//! Persistence of encoded records.
//!
//! - [`write_encoded_array`] / [`read_encoded_array`] - single-asset file framing
//! - [`ArchiveWriter`] / [`ArchiveReader`] - scoped zip access
//! - Zip layouts: single array, single mesh, named arrays, combined bundle
//! - [`detect_layouts`] - which of those an existing archive uses

mod archive;
mod bundle;
mod container;
mod detect;
mod file;

pub use archive::{
    array_filename, load_array_from_zip, load_arrays_from_zip, load_encoded_array_from_zip,
    load_encoded_arrays_from_zip, load_encoded_mesh_from_zip, load_mesh_from_zip, save_array_to_zip,
    save_arrays_to_zip, save_encoded_array_to_zip, save_encoded_arrays_to_zip, save_encoded_mesh_to_zip,
    save_mesh_to_zip, ArrayEntries, ArraySetEntries, MeshEntries,
};
pub use bundle::{load_combined_data_from_zip, save_combined_data_to_zip, BundleLayout, CombinedData};
pub use container::{entry_path, ArchiveReader, ArchiveWriter};
pub use detect::{detect_layouts, Layout};
pub use file::{
    load_array_from_file, load_encoded_array_from_file, read_encoded_array, save_array_to_file,
    save_encoded_array_to_file, write_encoded_array,
};
