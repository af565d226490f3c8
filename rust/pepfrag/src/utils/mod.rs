pub mod batching;

pub use batching::{
    DEFAULT_BATCH_SIZE,
    LengthBatch,
    length_batches,
};
