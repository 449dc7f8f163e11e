//! Tile file reading
//!
//! Each tile of a flow cell is stored as one binary file per cycle. The file
//! starts with a 4-byte little-endian cluster count, followed by one byte per
//! cluster. Each byte packs a base call and a quality score (see
//! [`crate::decode`] for the bit layout).

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::error::{Result, TileError};

/// Size of the cluster count header in bytes
pub const SIZE_HEADER: usize = 4;

/// A single memory-mapped tile file
///
/// Holds the mapping for its lifetime and exposes the declared cluster count
/// and the raw per-cluster call bytes. The body is validated against the
/// header on open: a file shorter than its declared cluster count is rejected,
/// while trailing bytes beyond the declared count are tolerated and never
/// exposed.
#[derive(Debug)]
pub struct TileFile {
    /// Path the file was opened from, kept for error reporting
    path: PathBuf,

    /// Memory mapped file contents
    mmap: Mmap,

    /// Cluster count declared by the 4-byte header
    num_clusters: u32,
}

impl TileFile {
    /// Opens and validates a tile file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be opened or mapped ([`TileError::Io`])
    /// * The path is not a regular file ([`TileError::IncompatibleFile`])
    /// * The file is shorter than the 4-byte header ([`TileError::TruncatedHeader`])
    /// * The body holds fewer bytes than the declared cluster count
    ///   ([`TileError::TruncatedBody`])
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Verify input file is a file before attempting to map
        let file = File::open(&path).map_err(|source| TileError::Io {
            path: path.clone(),
            source,
        })?;
        let metadata = file.metadata().map_err(|source| TileError::Io {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(TileError::IncompatibleFile { path }.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| TileError::Io {
            path: path.clone(),
            source,
        })?;

        if mmap.len() < SIZE_HEADER {
            return Err(TileError::TruncatedHeader {
                path,
                len: mmap.len(),
            }
            .into());
        }
        let num_clusters = LittleEndian::read_u32(&mmap[..SIZE_HEADER]);

        // Validate the body against the declared count
        let actual = mmap.len() - SIZE_HEADER;
        if actual < num_clusters as usize {
            return Err(TileError::TruncatedBody {
                path,
                expected: num_clusters as usize,
                actual,
            }
            .into());
        }

        Ok(Self {
            path,
            mmap,
            num_clusters,
        })
    }

    /// Returns the cluster count declared by the header
    #[must_use]
    pub fn num_clusters(&self) -> u32 {
        self.num_clusters
    }

    /// Returns the raw call bytes, one per cluster
    ///
    /// Exactly `num_clusters` bytes; trailing padding in the file is excluded.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.mmap[SIZE_HEADER..SIZE_HEADER + self.num_clusters as usize]
    }

    /// Returns the path this tile file was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
