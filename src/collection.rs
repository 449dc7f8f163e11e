//! Decoded sequence collection
//!
//! A read-only, index-addressable view over an assembled [`CycleMatrix`].
//! Reads are decoded lazily on access and never cached: every access gathers
//! the cluster's column of raw bytes across all cycles and applies the base
//! call rule elementwise, so repeated access is idempotent and bit-identical.

use std::sync::Arc;

use crate::decode::decode_column;
use crate::error::{ReadError, Result};
use crate::matrix::CycleMatrix;
use crate::seq::Seq;

/// One fully decoded cluster: a base-call sequence and its parallel
/// per-base quality scores, one entry per cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRead {
    /// The position of this read in the collection
    index: usize,
    /// Base calls in cycle order
    sequence: Seq,
    /// Quality scores in cycle order (0-63)
    quality: Vec<u8>,
}

impl DecodedRead {
    /// Returns the global index of the read
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the base-call sequence
    #[must_use]
    pub fn sequence(&self) -> &Seq {
        &self.sequence
    }

    /// Returns the per-base quality scores
    #[must_use]
    pub fn quality(&self) -> &[u8] {
        &self.quality
    }

    /// Consumes the read, returning the sequence and quality scores
    #[must_use]
    pub fn into_parts(self) -> (Seq, Vec<u8>) {
        (self.sequence, self.quality)
    }
}

/// A read-only, fixed-length collection of decoded reads
///
/// Wraps the assembled matrix for its entire lifetime; the matrix is
/// immutable after construction, so the collection can be shared read-only
/// across threads without locking.
#[derive(Debug)]
pub struct SequenceCollection {
    matrix: CycleMatrix,
}

impl SequenceCollection {
    /// Wraps an assembled cycle matrix
    #[must_use]
    pub fn new(matrix: CycleMatrix) -> Self {
        Self { matrix }
    }

    /// Returns the number of reads (the total cluster count of the run)
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrix.num_clusters()
    }

    /// Returns true if the collection holds no reads
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of cycles, which is the length of every read
    #[must_use]
    pub fn num_cycles(&self) -> usize {
        self.matrix.num_cycles()
    }

    /// Returns the underlying cycle matrix
    #[must_use]
    pub fn matrix(&self) -> &CycleMatrix {
        &self.matrix
    }

    /// Decodes the read at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::IndexOutOfRange`] if `index` is beyond the
    /// collection length.
    pub fn get(&self, index: usize) -> Result<DecodedRead> {
        if index >= self.len() {
            return Err(ReadError::IndexOutOfRange(index, self.len()).into());
        }
        Ok(self.decode_at(index))
    }

    /// Returns an iterator over all reads in index order
    #[must_use]
    pub fn iter(&self) -> Reads<'_> {
        Reads {
            collection: self,
            index: 0,
        }
    }

    fn decode_at(&self, index: usize) -> DecodedRead {
        let mut raw = Vec::with_capacity(self.num_cycles());
        self.matrix.column_into(index, &mut raw);

        let mut sequence = Vec::with_capacity(raw.len());
        let mut quality = Vec::with_capacity(raw.len());
        decode_column(&raw, &mut sequence, &mut quality);

        DecodedRead {
            index,
            sequence: Seq::from_validated(sequence),
            quality,
        }
    }
}

/// Iterator over the reads of a [`SequenceCollection`] in index order
pub struct Reads<'a> {
    collection: &'a SequenceCollection,
    index: usize,
}

impl Iterator for Reads<'_> {
    type Item = DecodedRead;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.collection.len() {
            return None;
        }
        let read = self.collection.decode_at(self.index);
        self.index += 1;
        Some(read)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.collection.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Reads<'_> {}

impl<'a> IntoIterator for &'a SequenceCollection {
    type Item = DecodedRead;
    type IntoIter = Reads<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Default batch size for parallel processing
///
/// This constant defines how many reads each thread processes between
/// `on_batch_complete` calls.
pub const BATCH_SIZE: usize = 1024;

/// Trait for types that can process decoded reads in parallel
///
/// Implementors are cloned once per thread; each clone receives a contiguous
/// range of reads and periodic batch-completion callbacks for flushing
/// thread-local state.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single decoded read
    fn process_read(&mut self, read: &DecodedRead) -> Result<()>;

    /// Called when a thread finishes processing its batch
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Each thread calls this method with its own unique ID.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

impl SequenceCollection {
    /// Processes all reads in parallel using multiple threads
    ///
    /// The index range is split into contiguous chunks, one per thread; each
    /// thread decodes its own reads from the shared immutable matrix, so no
    /// synchronization is required. Passing `0` for `num_threads` uses all
    /// available cores.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the processor.
    pub fn process_parallel<P: ParallelProcessor + Clone + 'static>(
        self,
        processor: P,
        num_threads: usize,
    ) -> Result<()> {
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        };

        let num_reads = self.len();
        if num_reads == 0 {
            return Ok(());
        }
        let reads_per_thread = num_reads.div_ceil(num_threads);

        // Arc self
        let collection = Arc::new(self);

        // Build thread handles
        let mut handles = Vec::new();
        for tid in 0..num_threads {
            let mut processor = processor.clone();
            let collection = collection.clone();
            processor.set_tid(tid);

            let handle = std::thread::spawn(move || -> Result<()> {
                let start_idx = tid * reads_per_thread;
                let end_idx = (start_idx + reads_per_thread).min(num_reads);

                for (batch_idx, idx) in (start_idx..end_idx).enumerate() {
                    let read = collection.get(idx)?;
                    processor.process_read(&read)?;

                    if batch_idx % BATCH_SIZE == 0 {
                        processor.on_batch_complete()?;
                    }
                }
                processor.on_batch_complete()?;

                Ok(())
            });

            handles.push(handle);
        }

        for handle in handles {
            handle
                .join()
                .expect("Error joining handle (1)")
                .expect("Error joining handle (2)");
        }

        Ok(())
    }
}
