//! meshbundle CLI - Tool for inspecting compressed mesh and array files.

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use meshbundle::codec::{encode_vertex_buffer, vertex_stream_revision, Codec, Meshopt};
use meshbundle::core::{EncodedArray, EncodedMesh, METADATA_FORMAT_VERSION};
use meshbundle::io::{
    detect_layouts, load_combined_data_from_zip, load_encoded_array_from_file, load_encoded_array_from_zip,
    load_encoded_arrays_from_zip, load_encoded_mesh_from_zip, ArchiveReader, ArrayEntries, ArraySetEntries,
    BundleLayout, Layout, MeshEntries,
};
use meshbundle::Result;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: meshbundle info <file>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1])
        }
        "version" | "V" | "--version" => {
            cmd_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other if Path::new(other).is_file() => cmd_info(other),
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the flag level.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_help() {
    println!("meshbundle - compressed mesh and array toolkit");
    println!();
    println!("USAGE:");
    println!("    meshbundle [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info    <file>     Describe a zip bundle or single-asset array file");
    println!("    V, version            Show crate and codec format versions");
    println!("    h, help               Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    meshbundle info asset.zip       # Entries and recognised layouts");
    println!("    meshbundle info heights.bin     # Single-asset array header");
    println!("    meshbundle -v info asset.zip    # Verbose info");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn cmd_version() {
    println!("meshbundle {} (built {})", env!("CARGO_PKG_VERSION"), env!("MESHBUNDLE_BUILD_DATE"));
    // The encoder tags streams with its own revision, which may trail the
    // newest one the decoder accepts.
    let written = encode_vertex_buffer(&Meshopt, &[0u8; 4], 1, 4)
        .ok()
        .and_then(|stream| vertex_stream_revision(&stream));
    match written {
        Some(revision) => println!("Vertex stream format: {} (encoder writes {})", Meshopt.vertex_version(), revision),
        None => println!("Vertex stream format: {}", Meshopt.vertex_version()),
    }
    println!("Index stream format:  {}", Meshopt.index_version());
    println!("Metadata format:      {}", METADATA_FORMAT_VERSION);
}

fn is_zip(path: &str) -> Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    let n = file.read(&mut magic)?;
    Ok(n == magic.len() && magic == ZIP_MAGIC)
}

fn cmd_info(path: &str) -> Result<()> {
    tracing::info!("Opening {}", path);
    if is_zip(path)? {
        info_zip(path)
    } else {
        let encoded = load_encoded_array_from_file(path)?;
        println!("File: {}", path);
        println!("Layout: single-asset array");
        print_array("  ", "array", &encoded);
        Ok(())
    }
}

fn info_zip(path: &str) -> Result<()> {
    let names = ArchiveReader::open(path)?.entry_names();
    println!("Archive: {}", path);
    println!("Entries: {}", names.len());
    for name in &names {
        println!("  {}", name);
    }
    println!();

    let layouts = detect_layouts(path)?;
    for layout in &layouts {
        println!("Layout: {}", layout);
        match layout {
            Layout::Combined => {
                let data = load_combined_data_from_zip(path, &BundleLayout::default())?;
                print_mesh("  ", &data.mesh);
                println!("  arrays: {}", data.arrays.len());
                for (name, array) in &data.arrays {
                    print_array("    ", name, array);
                }
                match &data.metadata {
                    Some(meta) => println!("  metadata: {}", meta),
                    None => println!("  metadata: (none)"),
                }
            }
            Layout::SingleMesh => {
                let mesh = load_encoded_mesh_from_zip(path, &MeshEntries::default())?;
                print_mesh("  ", &mesh);
            }
            Layout::SingleArray => {
                let array = load_encoded_array_from_zip(path, &ArrayEntries::default())?;
                print_array("  ", "array", &array);
            }
            Layout::NamedArrays => {
                let arrays = load_encoded_arrays_from_zip(path, &ArraySetEntries::default())?;
                println!("  arrays: {}", arrays.len());
                for (name, array) in &arrays {
                    print_array("  ", name, array);
                }
            }
        }
    }

    if layouts.is_empty() {
        tracing::warn!("{} does not match any known layout", path);
        println!("Layout: unknown");
    }
    Ok(())
}

fn print_mesh(indent: &str, mesh: &EncodedMesh) {
    println!("{}mesh: {} vertices x {} bytes", indent, mesh.vertex_count, mesh.vertex_size);
    match mesh.index_count {
        Some(count) => println!("{}      {} indices x {} bytes ({} triangles)", indent, count, mesh.index_size, count / 3),
        None => println!("{}      non-indexed", indent),
    }
    println!("{}      {} bytes compressed", indent, mesh.encoded_len());
}

fn print_array(indent: &str, name: &str, array: &EncodedArray) {
    let raw = match array.item_count().ok().and_then(|n| n.checked_mul(array.dtype.num_bytes())) {
        Some(bytes) => bytes.to_string(),
        None => "overflowing".to_string(),
    };
    println!(
        "{}{}: shape {:?}, {}, itemsize {}, {} bytes compressed ({} raw)",
        indent,
        name,
        array.shape,
        array.dtype,
        array.itemsize,
        array.len(),
        raw
    );
}
