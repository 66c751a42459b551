use frame::{Frame, Row, Schema};
use serde::Deserialize;

use super::TrainConfig;
use crate::error::TrainError;

fn default_num_partitions() -> usize {
    1
}

/// An inline frame, as read from a training request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FrameConfig {
    pub schema: Schema,
    pub rows: Vec<Row>,
    #[serde(default = "default_num_partitions")]
    pub num_partitions: usize,
}

impl FrameConfig {
    /// Builds the frame, checking every row against the schema.
    ///
    /// A request can't ask for more partitions than it has rows (or one, when it
    /// has none).
    pub fn build(self) -> Result<Frame, TrainError> {
        let max = self.rows.len().max(1);
        if self.num_partitions > max {
            return Err(TrainError::InvalidConfig(format!(
                "{} partitions requested for {} row(s), at most {max} allowed",
                self.num_partitions,
                self.rows.len()
            )));
        }

        Ok(Frame::from_rows(self.schema, self.rows, self.num_partitions)?)
    }
}

/// Everything the `orchestrator` binary needs to run a training.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrainRequest {
    pub frame: FrameConfig,
    pub config: TrainConfig,
}
