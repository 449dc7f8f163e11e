//! Assembled cycle matrix

use std::ops::Range;

/// The assembled raw call bytes of a full run
///
/// A row-major byte grid of shape (cycles x clusters). Row `c` holds the raw
/// call bytes of cycle `c` for every cluster; cluster columns concatenate the
/// tiles of the first cycle in their fixed visiting order, with tile `b`
/// occupying the half-open column range `[offsets[b], offsets[b + 1])` in
/// every row.
///
/// The matrix is immutable once assembly completes and can be shared
/// read-only across threads without locking.
#[derive(Debug)]
pub struct CycleMatrix {
    /// Raw call bytes, row-major (cycles x clusters)
    data: Vec<u8>,

    /// Number of cycles (rows)
    num_cycles: usize,

    /// Total cluster count (columns), summed over the first cycle's tiles
    num_clusters: usize,

    /// Cumulative per-tile cluster offsets, `num_tiles + 1` entries
    offsets: Vec<usize>,

    /// Tile names in visiting order, as fixed by the first cycle
    tiles: Vec<String>,
}

impl CycleMatrix {
    /// Allocates a zero-initialized matrix for the given tile layout
    ///
    /// `offsets` are the cumulative cluster offsets derived from the first
    /// cycle's per-tile counts; the final entry is the total cluster count.
    ///
    /// # Panics
    ///
    /// Panics if `offsets` does not hold one more entry than `tiles`.
    #[must_use]
    pub fn zeroed(num_cycles: usize, tiles: Vec<String>, offsets: Vec<usize>) -> Self {
        assert_eq!(offsets.len(), tiles.len() + 1);
        let num_clusters = *offsets.last().unwrap_or(&0);
        Self {
            data: vec![0; num_cycles * num_clusters],
            num_cycles,
            num_clusters,
            offsets,
            tiles,
        }
    }

    /// Returns the number of cycles (rows)
    #[must_use]
    pub fn num_cycles(&self) -> usize {
        self.num_cycles
    }

    /// Returns the total cluster count (columns)
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Returns the number of tiles
    #[must_use]
    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Returns the tile names in visiting order
    #[must_use]
    pub fn tile_names(&self) -> &[String] {
        &self.tiles
    }

    /// Returns the column range occupied by tile `tile_index` in every row
    ///
    /// # Panics
    ///
    /// Panics if `tile_index` is not a valid tile.
    #[must_use]
    pub fn tile_range(&self, tile_index: usize) -> Range<usize> {
        self.offsets[tile_index]..self.offsets[tile_index + 1]
    }

    /// Returns the raw call bytes of one cycle across all clusters
    #[must_use]
    pub fn row(&self, cycle: usize) -> &[u8] {
        let start = cycle * self.num_clusters;
        &self.data[start..start + self.num_clusters]
    }

    /// Returns one cycle row mutably, for assembly-time writes
    pub(crate) fn row_mut(&mut self, cycle: usize) -> &mut [u8] {
        let start = cycle * self.num_clusters;
        &mut self.data[start..start + self.num_clusters]
    }

    /// Returns the raw call byte at (cycle, cluster)
    #[must_use]
    pub fn get(&self, cycle: usize, cluster: usize) -> u8 {
        self.data[cycle * self.num_clusters + cluster]
    }

    /// Gathers the column of one cluster across all cycles into `buf`
    ///
    /// The column is the raw per-cycle byte sequence of a single cluster, in
    /// cycle order.
    pub fn column_into(&self, cluster: usize, buf: &mut Vec<u8>) {
        buf.reserve(self.num_cycles);
        for cycle in 0..self.num_cycles {
            buf.push(self.data[cycle * self.num_clusters + cluster]);
        }
    }
}
