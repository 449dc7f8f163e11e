//! # bclseq
//!
//! A reader for Illumina BCL base-call directories.
//!
//! A sequencing run scatters its output across one binary file per
//! (cycle, tile): cycle `c` of the run lives in a subdirectory `C<c>.1`, and
//! every tile of the flow cell contributes one `.bcl` file to each of those
//! subdirectories, with stable file names across cycles. This crate
//! assembles that tree into a single in-memory byte matrix and exposes it as
//! a random-access collection of fully decoded reads with per-base quality
//! scores.
//!
//! ## Usage
//!
//! ```no_run
//! use bclseq::read_run_directory;
//!
//! fn main() -> bclseq::Result<()> {
//!     let collection = read_run_directory("./data/run/BaseCalls/L001")?;
//!
//!     // One read per cluster, one base per cycle
//!     println!("{} reads of {} cycles", collection.len(), collection.num_cycles());
//!
//!     // Random access to any read within range
//!     let read = collection.get(42)?;
//!     println!("{}\t{:?}", read.sequence(), read.quality());
//!
//!     // Sequences support reverse complementation
//!     let rc = read.sequence().reverse_complement();
//!     println!("{rc}");
//!
//!     // Iteration in index order
//!     for read in &collection {
//!         let _ = read.sequence();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Tile file format
//!
//! Each tile file consists of two sections:
//!
//! 1. Cluster count header (4 bytes, little-endian uint32)
//! 2. Call data: exactly one byte per declared cluster
//!
//! Bytes beyond the declared cluster count are tolerated and ignored; a
//! shortfall is a fatal [`TileError::TruncatedBody`].
//!
//! ### Call byte layout
//!
//! | Bits | Name    | Description                             |
//! | ---- | ------- | --------------------------------------- |
//! | 0-1  | base    | Base index (0 = A, 1 = C, 2 = G, 3 = T) |
//! | 2-7  | quality | Quality score (0-63)                    |
//!
//! The byte value `0` is the reserved no-call sentinel and overrides both
//! fields: the base decodes to `N` and the quality is forced to `2`.
//!
//! ## Assembly
//!
//! - Cycle directories are visited in ascending **numeric** order of their
//!   cycle number; lexicographic order would mis-sort `C9.1` after `C10.1`.
//! - The tile set, tile visiting order, and per-tile cluster counts are
//!   fixed by the first cycle directory; every later cycle must agree
//!   exactly, and any deviation aborts the whole assembly.
//! - The matrix has shape (cycles x total clusters), with tile bodies
//!   concatenated column-wise in tile visiting order.
//! - Decoding is lazy: accessing read `i` gathers column `i` across all
//!   cycle rows and applies the call byte rule elementwise. Nothing is
//!   cached; repeated access is bit-identical.
//!
//! ## Parallel processing
//!
//! The assembled matrix is immutable, so reads can be decoded from any
//! number of threads without locking. Implement [`ParallelProcessor`] and
//! hand it to [`SequenceCollection::process_parallel`] to fan record
//! processing out over a thread pool.

mod collection;
mod decode;
mod error;
mod matrix;
mod run;
mod seq;
mod tile;

pub mod prelude;

pub use collection::{DecodedRead, ParallelProcessor, Reads, SequenceCollection, BATCH_SIZE};
pub use decode::{decode_base, decode_column, NO_CALL_BASE, NO_CALL_QUALITY};
pub use error::{AssemblyError, Error, ReadError, Result, SequenceError, TileError};
pub use matrix::CycleMatrix;
pub use run::{assemble_matrix, read_run_directory};
pub use seq::Seq;
pub use tile::{TileFile, SIZE_HEADER};

#[cfg(test)]
mod testing {
    use super::*;
    use anyhow::Result;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_tile(cycle_dir: &Path, stem: &str, num_clusters: u32, body: &[u8]) {
        let mut handle = File::create(cycle_dir.join(format!("{stem}.bcl"))).unwrap();
        handle.write_all(&num_clusters.to_le_bytes()).unwrap();
        handle.write_all(body).unwrap();
    }

    /// Builds a run directory with one tile per cycle entry:
    /// `cycles[c]` holds the body bytes of every tile for cycle `c + 1`.
    fn write_run(root: &Path, cycles: &[Vec<(&str, Vec<u8>)>]) {
        for (c, tiles) in cycles.iter().enumerate() {
            let cycle_dir = root.join(format!("C{}.1", c + 1));
            fs::create_dir(&cycle_dir).unwrap();
            for (stem, body) in tiles {
                write_tile(&cycle_dir, stem, body.len() as u32, body);
            }
        }
    }

    #[test]
    fn test_two_cycle_run() -> Result<()> {
        let dir = TempDir::new()?;
        write_run(
            dir.path(),
            &[
                vec![("s_1_1101", vec![0x00, 0x05, 0x00])],
                vec![("s_1_1101", vec![0x01, 0x09, 0x02])],
            ],
        );

        let collection = read_run_directory(dir.path())?;
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.num_cycles(), 2);

        let read = collection.get(0)?;
        assert_eq!(read.sequence().as_str(), "NC");
        assert_eq!(read.quality(), &[2, 0]);

        let read = collection.get(1)?;
        assert_eq!(read.sequence().as_str(), "CC");
        assert_eq!(read.quality(), &[1, 2]);

        let read = collection.get(2)?;
        assert_eq!(read.sequence().as_str(), "NG");
        assert_eq!(read.quality(), &[2, 0]);

        Ok(())
    }

    #[test]
    fn test_numeric_cycle_ordering() -> Result<()> {
        // C2.1 must sort before C10.1 even though it doesn't lexicographically
        let dir = TempDir::new()?;
        for (name, byte) in [("C1.1", 0x05u8), ("C2.1", 0x06), ("C10.1", 0x07)] {
            let cycle_dir = dir.path().join(name);
            fs::create_dir(&cycle_dir)?;
            write_tile(&cycle_dir, "s_1_1101", 1, &[byte]);
        }

        let collection = read_run_directory(dir.path())?;
        assert_eq!(collection.num_cycles(), 3);
        let read = collection.get(0)?;
        assert_eq!(read.sequence().as_str(), "CGT");
        assert_eq!(read.quality(), &[1, 1, 1]);

        Ok(())
    }

    #[test]
    fn test_multi_tile_concatenation() -> Result<()> {
        // Tiles concatenate in sorted stem order; total length is the sum of
        // the first cycle's cluster counts
        let dir = TempDir::new()?;
        write_run(
            dir.path(),
            &[
                vec![
                    ("s_1_1101", vec![0x05, 0x06]),
                    ("s_1_1102", vec![0x07, 0x04, 0x05]),
                ],
                vec![
                    ("s_1_1101", vec![0x04, 0x04]),
                    ("s_1_1102", vec![0x04, 0x04, 0x04]),
                ],
            ],
        );

        let collection = read_run_directory(dir.path())?;
        assert_eq!(collection.len(), 5);

        let matrix = collection.matrix();
        assert_eq!(matrix.num_tiles(), 2);
        assert_eq!(matrix.tile_range(0), 0..2);
        assert_eq!(matrix.tile_range(1), 2..5);
        assert_eq!(matrix.row(0), &[0x05, 0x06, 0x07, 0x04, 0x05]);

        // Cluster 2 is the first cluster of the second tile
        let read = collection.get(2)?;
        assert_eq!(read.sequence().as_str(), "TA");

        Ok(())
    }

    #[test]
    fn test_missing_tile_is_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        write_run(
            dir.path(),
            &[
                vec![("s_1_1101", vec![0x05]), ("s_1_1102", vec![0x06])],
                vec![("s_1_1101", vec![0x05])],
            ],
        );

        let err = read_run_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::AssemblyError(AssemblyError::TileSetMismatch { cycle: 2, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_cluster_count_mismatch_is_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        write_run(
            dir.path(),
            &[
                vec![("s_1_1101", vec![0x05, 0x06])],
                vec![("s_1_1101", vec![0x05, 0x06, 0x07])],
            ],
        );

        let err = read_run_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::AssemblyError(AssemblyError::ClusterCountMismatch {
                cycle: 2,
                expected: 2,
                found: 3,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn test_truncated_tile_propagates() -> Result<()> {
        let dir = TempDir::new()?;
        let cycle_dir = dir.path().join("C1.1");
        fs::create_dir(&cycle_dir)?;
        // header declares 10 clusters, body holds 5 bytes
        write_tile(&cycle_dir, "s_1_1101", 10, &[0x05; 5]);

        let err = read_run_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::TileError(TileError::TruncatedBody {
                expected: 10,
                actual: 5,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn test_empty_root() -> Result<()> {
        let dir = TempDir::new()?;
        let err = read_run_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::AssemblyError(AssemblyError::NoCycleDirectories(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_cycle_number() -> Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("Cxy.1"))?;
        let err = read_run_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::AssemblyError(AssemblyError::InvalidCycleNumber(_))
        ));
        Ok(())
    }

    #[test]
    fn test_non_cycle_entries_ignored() -> Result<()> {
        let dir = TempDir::new()?;
        write_run(dir.path(), &[vec![("s_1_1101", vec![0x05])]]);
        fs::create_dir(dir.path().join("Logs"))?;
        fs::write(dir.path().join("RunInfo.xml"), "<RunInfo/>")?;

        let collection = read_run_directory(dir.path())?;
        assert_eq!(collection.num_cycles(), 1);
        assert_eq!(collection.len(), 1);

        Ok(())
    }

    #[test]
    fn test_random_run_is_idempotent() -> Result<()> {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(42);
        let dir = TempDir::new()?;

        // 4 cycles over two tiles of 16 and 24 clusters, nonzero bytes only
        // so no read contains an N
        let cycles: Vec<Vec<(&str, Vec<u8>)>> = (0..4)
            .map(|_| {
                vec![
                    (
                        "s_1_1101",
                        (0..16).map(|_| rng.random_range(1..=u8::MAX)).collect(),
                    ),
                    (
                        "s_1_1102",
                        (0..24).map(|_| rng.random_range(1..=u8::MAX)).collect(),
                    ),
                ]
            })
            .collect();
        write_run(dir.path(), &cycles);

        let collection = read_run_directory(dir.path())?;
        assert_eq!(collection.len(), 40);

        for idx in 0..collection.len() {
            let first = collection.get(idx)?;
            let second = collection.get(idx)?;
            assert_eq!(first, second);

            // no-N reads round-trip under double reverse complementation
            assert!(!first.sequence().as_bytes().contains(&b'N'));
            let rc = first.sequence().reverse_complement();
            assert_eq!(&rc.reverse_complement(), first.sequence());
        }

        Ok(())
    }

    #[derive(Clone, Default)]
    struct QualitySum {
        local_reads: usize,
        local_quality: usize,
        reads: Arc<AtomicUsize>,
        quality: Arc<AtomicUsize>,
    }
    impl ParallelProcessor for QualitySum {
        fn process_read(&mut self, read: &DecodedRead) -> crate::Result<()> {
            self.local_reads += 1;
            self.local_quality += read.quality().iter().map(|&q| q as usize).sum::<usize>();
            Ok(())
        }
        fn on_batch_complete(&mut self) -> crate::Result<()> {
            self.reads.fetch_add(self.local_reads, Ordering::Relaxed);
            self.quality.fetch_add(self.local_quality, Ordering::Relaxed);
            self.local_reads = 0;
            self.local_quality = 0;
            Ok(())
        }
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let dir = TempDir::new()?;
        let bodies: Vec<u8> = (0..100).map(|i| (i % 251) as u8).collect();
        write_run(
            dir.path(),
            &[
                vec![("s_1_1101", bodies.clone())],
                vec![("s_1_1101", bodies.iter().rev().copied().collect())],
            ],
        );

        let collection = read_run_directory(dir.path())?;
        let sequential: usize = collection
            .iter()
            .map(|read| read.quality().iter().map(|&q| q as usize).sum::<usize>())
            .sum();

        let processor = QualitySum::default();
        let reads = processor.reads.clone();
        let quality = processor.quality.clone();
        collection.process_parallel(processor, 4)?;

        assert_eq!(reads.load(Ordering::Relaxed), 100);
        assert_eq!(quality.load(Ordering::Relaxed), sequential);

        Ok(())
    }
}
