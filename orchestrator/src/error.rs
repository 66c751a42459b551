use std::fmt;

use frame::FrameErr;
use linreg::LinregErr;

/// The stages a training (or a use of its model) goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ConvertTables,
    TrainLocal,
    MergeMaster,
    ExtractWeights,
    Serialize,
    Restore,
    Predict,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "initialization",
            Self::ConvertTables => "table conversion",
            Self::TrainLocal => "local training",
            Self::MergeMaster => "master merge",
            Self::ExtractWeights => "weight extraction",
            Self::Serialize => "model serialization",
            Self::Restore => "model restoration",
            Self::Predict => "prediction",
        };

        f.write_str(s)
    }
}

/// All errors that can occur while training, predicting or testing.
#[derive(Debug)]
pub enum TrainError {
    /// Invalid configuration, caught before any computation.
    InvalidConfig(String),
    /// The frame doesn't hold what the configuration asks for.
    Frame(FrameErr),
    /// A numerical primitive failed.
    Compute {
        stage: Stage,
        partition: Option<usize>,
        source: LinregErr,
    },
    /// The final model's coefficients don't match the requested columns.
    Extract(String),
    /// The final model couldn't be serialized.
    Serialize(LinregErr),
    /// A serialized model couldn't be restored.
    Restore(LinregErr),
    /// The dedicated thread pool couldn't be created.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl TrainError {
    /// Returns the stage this error aborted.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidConfig(_) | Self::ThreadPool(_) => Stage::Init,
            Self::Frame(_) => Stage::ConvertTables,
            Self::Compute { stage, .. } => *stage,
            Self::Extract(_) => Stage::ExtractWeights,
            Self::Serialize(_) => Stage::Serialize,
            Self::Restore(_) => Stage::Restore,
        }
    }
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Frame(e) => write!(f, "invalid config: {e}"),
            Self::Compute {
                stage,
                partition: Some(partition),
                source,
            } => write!(
                f,
                "could not compute {stage} on partition {partition}: {source}"
            ),
            Self::Compute {
                stage,
                partition: None,
                source,
            } => write!(f, "could not compute {stage}: {source}"),
            Self::Extract(msg) => write!(f, "could not extract weights: {msg}"),
            Self::Serialize(e) => write!(f, "could not serialize model: {e}"),
            Self::Restore(e) => write!(f, "could not restore model: {e}"),
            Self::ThreadPool(e) => write!(f, "could not build thread pool: {e}"),
        }
    }
}

impl std::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            Self::Compute { source, .. } => Some(source),
            Self::Serialize(e) | Self::Restore(e) => Some(e),
            Self::ThreadPool(e) => Some(e),
            Self::InvalidConfig(_) | Self::Extract(_) => None,
        }
    }
}

impl From<FrameErr> for TrainError {
    fn from(e: FrameErr) -> Self {
        Self::Frame(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for TrainError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}
