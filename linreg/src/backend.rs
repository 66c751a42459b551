use crate::{LinearModel, LinregErr, PairedTable, PartialResult, Result, TrainOptions};

/// The numerical primitives a distributed training is orchestrated over.
///
/// `train_local` runs once per partition, possibly concurrently, so implementors
/// must be `Sync`. `merge` runs once, on the coordinating thread.
pub trait Backend: Sync {
    /// Computes the partial result of a single partition.
    fn train_local(&self, tables: &PairedTable, options: &TrainOptions) -> Result<PartialResult>;

    /// Combines every partial result of a training into the final model.
    fn merge(&self, partials: Vec<PartialResult>, options: &TrainOptions) -> Result<LinearModel>;

    /// Serializes a model into an opaque byte sequence.
    fn serialize(&self, model: &LinearModel) -> Result<Vec<u8>>;

    /// Restores a model written by `serialize`.
    fn deserialize(&self, bytes: &[u8]) -> Result<LinearModel>;
}

/// The Householder QR backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrBackend;

impl QrBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for QrBackend {
    fn train_local(&self, tables: &PairedTable, options: &TrainOptions) -> Result<PartialResult> {
        PartialResult::compute(tables, options)
    }

    fn merge(&self, partials: Vec<PartialResult>, options: &TrainOptions) -> Result<LinearModel> {
        if let Some(index) = partials
            .iter()
            .position(|p| p.fit_intercept() != options.fit_intercept)
        {
            return Err(LinregErr::InterceptMismatch { index });
        }

        let merged = PartialResult::merge(partials)?;
        LinearModel::solve(merged)
    }

    fn serialize(&self, model: &LinearModel) -> Result<Vec<u8>> {
        model.to_bytes()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<LinearModel> {
        LinearModel::from_bytes(bytes)
    }
}
