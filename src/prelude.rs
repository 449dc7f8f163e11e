pub use super::{
    read_run_directory, DecodedRead, ParallelProcessor, Seq, SequenceCollection, TileFile,
};
