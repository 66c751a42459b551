use frame::{Frame, FrameErr, Partition, Partitioned, Schema};
use linreg::{NumericTable, PairedTable};
use log::{debug, warn};

use crate::error::{Stage, TrainError};

/// Column positions resolved against a frame's schema.
#[derive(Debug, Clone)]
pub(crate) struct ColumnSelection {
    features: Vec<usize>,
    label: Option<usize>,
    names: Vec<String>,
}

impl ColumnSelection {
    /// Resolves the feature (and optionally label) columns, all of which must be numeric.
    ///
    /// # Arguments
    /// * `schema` - The schema of the frame the tables will be built from.
    /// * `features` - The feature column names, in table column order.
    /// * `label` - The label column name, if the tables need labels.
    pub(crate) fn resolve(
        schema: &Schema,
        features: &[String],
        label: Option<&str>,
    ) -> Result<Self, TrainError> {
        let feature_idxs = schema.numeric_indices(features)?;
        let label_idx = match label {
            Some(name) => Some(schema.numeric_indices(&[name])?[0]),
            None => None,
        };

        Ok(Self {
            features: feature_idxs,
            label: label_idx,
            names: schema.columns().iter().map(|c| c.name.clone()).collect(),
        })
    }

    fn read(
        &self,
        partition_idx: usize,
        partition: &Partition,
        columns: &[usize],
    ) -> Result<NumericTable, TrainError> {
        let mut values = Vec::with_capacity(partition.len() * columns.len());

        for (row_idx, row) in partition.rows().iter().enumerate() {
            for &col in columns {
                let value = row[col].as_f64().ok_or_else(|| FrameErr::NullValue {
                    column: self.names[col].clone(),
                    partition: partition_idx,
                    row: row_idx,
                })?;
                values.push(value);
            }
        }

        NumericTable::from_rows(columns.len(), values).map_err(|source| TrainError::Compute {
            stage: Stage::ConvertTables,
            partition: Some(partition_idx),
            source,
        })
    }
}

/// Converts every partition of `frame` into a paired features/labels table.
///
/// Row `i` of both tables is row `i` of the partition.
pub(crate) fn paired_tables(
    frame: &Frame,
    selection: &ColumnSelection,
) -> Result<Partitioned<PairedTable>, TrainError> {
    let Some(label) = selection.label else {
        return Err(TrainError::InvalidConfig(
            "paired tables need a label column".into(),
        ));
    };

    frame.partitions().try_map_ref(|i, partition| {
        if partition.is_empty() {
            warn!(partition = i; "partition is empty");
        }

        let features = selection.read(i, partition, &selection.features)?;
        let labels = selection.read(i, partition, &[label])?;
        debug!(partition = i, rows = partition.len(); "converted partition");

        PairedTable::new(features, labels).map_err(|source| TrainError::Compute {
            stage: Stage::ConvertTables,
            partition: Some(i),
            source,
        })
    })
}

/// Converts every partition of `frame` into a features table.
pub(crate) fn feature_tables(
    frame: &Frame,
    selection: &ColumnSelection,
) -> Result<Partitioned<NumericTable>, TrainError> {
    frame
        .partitions()
        .try_map_ref(|i, partition| selection.read(i, partition, &selection.features))
}
