pub mod codec;
pub mod dates;
pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{Record, RecordSet, RunSummary, TransformResult, Value};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
