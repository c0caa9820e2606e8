pub mod batch;
pub mod catalog;
pub mod score;

pub use batch::{Batch, BatchStatus};
pub use catalog::{Category, Hospital, Item, Region, ScoreLevel};
pub use score::Score;
