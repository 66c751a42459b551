mod request;
mod training;

pub use request::{FrameConfig, TrainRequest};
pub use training::TrainConfig;
