use std::path::PathBuf;

/// Custom Result type for bclseq operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the bclseq library, encompassing all possible error cases
/// that can occur while decoding a base-call directory.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while reading a single tile file
    TileError(#[from] TileError),
    /// Errors raised while assembling the cycle matrix from a run directory
    AssemblyError(#[from] AssemblyError),
    /// Errors that occur during positional access of decoded reads
    ReadError(#[from] ReadError),
    /// Errors raised by the sequence value type
    SequenceError(#[from] SequenceError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors specific to reading and validating a single tile file
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    /// The tile file could not be opened or mapped
    #[error("Unreadable tile file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path does not point at a regular file (e.g. a directory or special file)
    #[error("Tile file {} is not a regular file", .path.display())]
    IncompatibleFile { path: PathBuf },

    /// The file ends before the 4-byte cluster count header
    #[error("Tile file {} holds {len} bytes, too short for the cluster count header", .path.display())]
    TruncatedHeader { path: PathBuf, len: usize },

    /// The file body holds fewer bytes than the header declared
    ///
    /// Trailing bytes beyond the declared count are tolerated; a shortfall is fatal.
    #[error("Tile file {} declares {expected} clusters but its body holds {actual} bytes", .path.display())]
    TruncatedBody {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while assembling the per-cycle tile files into one matrix
#[derive(thiserror::Error, Debug)]
pub enum AssemblyError {
    /// The run directory contains no cycle subdirectories
    #[error("No cycle directories found under {}", .0.display())]
    NoCycleDirectories(PathBuf),

    /// A cycle directory name matched the expected pattern but its cycle number
    /// could not be parsed
    #[error("Cycle directory {0:?} does not carry a parsable cycle number")]
    InvalidCycleNumber(String),

    /// The first cycle directory contains no tile files
    #[error("First cycle directory {} contains no tile files", .0.display())]
    EmptyTileSet(PathBuf),

    /// A later cycle is missing a tile that was present in the first cycle
    ///
    /// The tile set is fixed by the first cycle; every later cycle must carry
    /// the exact same tiles.
    #[error("Cycle {cycle}: tile {tile:?} is missing (present in the first cycle)")]
    TileSetMismatch { cycle: u32, tile: String },

    /// A later cycle declares a different cluster count for a tile than the
    /// first cycle did
    #[error(
        "Cycle {cycle}: tile {tile:?} declares {found} clusters, first cycle declared {expected}"
    )]
    ClusterCountMismatch {
        cycle: u32,
        tile: String,
        expected: u32,
        found: u32,
    },
}

/// Errors that can occur while accessing decoded reads
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// Attempted to access a cluster index that is beyond the collection length
    ///
    /// # Arguments
    /// * First `usize` - The requested cluster index
    /// * Second `usize` - The length of the collection
    #[error("Requested cluster index ({0}) is out of range ({1})")]
    IndexOutOfRange(usize, usize),
}

/// Errors raised by the sequence value type
#[derive(thiserror::Error, Debug)]
pub enum SequenceError {
    /// A byte outside the `{A, C, G, T, N}` alphabet was encountered
    #[error("Invalid base symbol {0:?} (expected one of A, C, G, T, N)")]
    InvalidSymbol(char),
}
