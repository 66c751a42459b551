//! A small partitioned, column-named row dataset and the partition-parallel
//! primitives (`map`, `collect`) the training pipeline runs on.

mod error;
mod frame;
mod partitioned;
mod schema;
mod value;

pub use error::{FrameErr, Result};
pub use frame::{Frame, Partition, Row};
pub use partitioned::Partitioned;
pub use schema::{Column, DataType, Schema};
pub use value::Value;
