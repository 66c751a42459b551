//! QR decomposition based linear regression, split in the two phases a
//! distributed training needs: a local step producing a `PartialResult` per data
//! partition and a master step merging them into a `LinearModel`.

mod backend;
mod error;
mod format;
mod model;
mod partial;
mod qr;
mod table;

pub use backend::{Backend, QrBackend};
pub use error::{LinregErr, Result};
pub use model::LinearModel;
pub use partial::{PartialResult, TrainOptions};
pub use table::{NumericTable, PairedTable};
