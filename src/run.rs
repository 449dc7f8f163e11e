//! Run directory assembly
//!
//! A sequencing run directory holds one subdirectory per cycle, named
//! `C<number>.1`, each containing one `.bcl` file per tile with stable names
//! across cycles. Assembly fixes the tile set and per-tile cluster counts
//! from the first cycle, allocates one byte matrix for the whole run, and
//! copies every tile body into its (cycle row, tile column range) slot.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::collection::SequenceCollection;
use crate::error::{AssemblyError, Result};
use crate::matrix::CycleMatrix;
use crate::tile::TileFile;

/// Reads a full run directory into a decoded sequence collection
///
/// This is the top-level entry point: it either yields a fully assembled,
/// consistent collection or fails with one error identifying the offending
/// file, cycle, or tile. Partial results are never returned.
///
/// # Errors
///
/// Returns an error if:
/// * The root holds no `C<number>.1` subdirectories
/// * A cycle directory name carries an unparsable cycle number
/// * Any tile file is unreadable, truncated, or shorter than declared
/// * A later cycle's tile set or per-tile cluster counts disagree with the
///   first cycle
pub fn read_run_directory<P: AsRef<Path>>(root: P) -> Result<SequenceCollection> {
    let matrix = assemble_matrix(root.as_ref())?;
    Ok(SequenceCollection::new(matrix))
}

/// Assembles the raw byte matrix for a run directory
pub fn assemble_matrix(root: &Path) -> Result<CycleMatrix> {
    let cycle_dirs = cycle_directories(root)?;
    let first_dir = &cycle_dirs[0].1;
    let stems = tile_stems(first_dir)?;

    // The first cycle is ground truth: its declared counts fix the column
    // offsets for every cycle. Each tile is opened exactly once.
    let mut first_tiles = Vec::with_capacity(stems.len());
    let mut offsets = Vec::with_capacity(stems.len() + 1);
    offsets.push(0usize);
    for stem in &stems {
        let tile = TileFile::open(tile_path(first_dir, stem))?;
        offsets.push(offsets[offsets.len() - 1] + tile.num_clusters() as usize);
        first_tiles.push(tile);
    }

    let mut matrix = CycleMatrix::zeroed(cycle_dirs.len(), stems.clone(), offsets);
    for (b, tile) in first_tiles.iter().enumerate() {
        let range = matrix.tile_range(b);
        matrix.row_mut(0)[range].copy_from_slice(tile.body());
    }
    drop(first_tiles);

    for (c, (cycle, dir)) in cycle_dirs.iter().enumerate().skip(1) {
        for (b, stem) in stems.iter().enumerate() {
            let path = tile_path(dir, stem);
            if !path.is_file() {
                return Err(AssemblyError::TileSetMismatch {
                    cycle: *cycle,
                    tile: stem.clone(),
                }
                .into());
            }
            let tile = TileFile::open(&path)?;

            let range = matrix.tile_range(b);
            let expected = range.len() as u32;
            if tile.num_clusters() != expected {
                return Err(AssemblyError::ClusterCountMismatch {
                    cycle: *cycle,
                    tile: stem.clone(),
                    expected,
                    found: tile.num_clusters(),
                }
                .into());
            }
            matrix.row_mut(c)[range].copy_from_slice(tile.body());
        }
    }

    Ok(matrix)
}

/// Lists the cycle directories under `root` in ascending numeric cycle order
///
/// Lexicographic directory order mis-sorts multi-digit cycle numbers (C9.1
/// after C10.1), so the numeric key is mandatory.
fn cycle_directories(root: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(OsStr::to_str) else {
            continue;
        };
        if let Some(number) = cycle_number(name) {
            dirs.push((number?, path));
        }
    }
    if dirs.is_empty() {
        return Err(AssemblyError::NoCycleDirectories(root.to_path_buf()).into());
    }
    dirs.sort_by_key(|(number, _)| *number);
    Ok(dirs)
}

/// Extracts the numeric cycle key from a directory name of the form `C<number>.1`
///
/// Returns `None` for names that do not match the cycle pattern at all, and
/// an error for matching names whose number does not parse.
fn cycle_number(name: &str) -> Option<Result<u32>> {
    let digits = name.strip_prefix('C')?.strip_suffix(".1")?;
    match digits.parse::<u32>() {
        Ok(number) => Some(Ok(number)),
        Err(_) => Some(Err(
            AssemblyError::InvalidCycleNumber(name.to_string()).into()
        )),
    }
}

/// Lists the tile file stems of one cycle directory, sorted by name
///
/// The sorted order is the fixed tile visiting order reused for every cycle.
fn tile_stems(dir: &Path) -> Result<Vec<String>> {
    let mut stems = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(OsStr::to_str) != Some("bcl") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
            stems.push(stem.to_string());
        }
    }
    if stems.is_empty() {
        return Err(AssemblyError::EmptyTileSet(dir.to_path_buf()).into());
    }
    stems.sort();
    Ok(stems)
}

fn tile_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.bcl"))
}
