use crate::{Column, FrameErr, Partitioned, Result, Schema, Value};

/// A frame row, one value per schema column.
pub type Row = Vec<Value>;

/// The rows of a frame owned by a single partition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partition {
    rows: Vec<Row>,
}

impl Partition {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// An immutable, partitioned table of rows with named, typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    schema: Schema,
    partitions: Partitioned<Partition>,
}

impl Frame {
    /// Builds a frame by splitting `rows` in `num_partitions` balanced, contiguous partitions.
    ///
    /// # Arguments
    /// * `schema` - The frame's columns.
    /// * `rows` - The rows, each one as wide as `schema`.
    /// * `num_partitions` - The amount of partitions, must be positive.
    ///
    /// # Returns
    /// The frame or the first row that doesn't match the schema.
    pub fn from_rows(schema: Schema, rows: Vec<Row>, num_partitions: usize) -> Result<Self> {
        if num_partitions == 0 {
            return Err(FrameErr::ZeroPartitions);
        }

        schema.check_unique()?;
        Self::check_rows(&schema, &rows, 0)?;

        // the first `rows.len() % num_partitions` partitions take one extra row
        let (base, extra) = (rows.len() / num_partitions, rows.len() % num_partitions);
        let mut rows = rows.into_iter();
        let partitions = (0..num_partitions)
            .map(|i| {
                let size = base + usize::from(i < extra);
                Partition::new(rows.by_ref().take(size).collect())
            })
            .collect();

        Ok(Self { schema, partitions })
    }

    /// Builds a frame keeping the given partitioning as is.
    pub fn from_partitions(schema: Schema, partitions: Vec<Vec<Row>>) -> Result<Self> {
        if partitions.is_empty() {
            return Err(FrameErr::ZeroPartitions);
        }

        schema.check_unique()?;

        let mut offset = 0;
        for rows in &partitions {
            Self::check_rows(&schema, rows, offset)?;
            offset += rows.len();
        }

        let partitions = partitions.into_iter().map(Partition::new).collect();
        Ok(Self { schema, partitions })
    }

    fn check_rows(schema: &Schema, rows: &[Row], offset: usize) -> Result<()> {
        let columns = schema.columns();

        for (i, row) in rows.iter().enumerate() {
            let row_idx = offset + i;

            if row.len() != columns.len() {
                return Err(FrameErr::RowWidthMismatch {
                    row: row_idx,
                    got: row.len(),
                    expected: columns.len(),
                });
            }

            if let Some(column) = columns
                .iter()
                .zip(row)
                .find_map(|(column, value)| (!value.fits(column.dtype)).then_some(column))
            {
                return Err(FrameErr::TypeMismatch {
                    column: column.name.clone(),
                    row: row_idx,
                    dtype: column.dtype,
                });
            }
        }

        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn partitions(&self) -> &Partitioned<Partition> {
        &self.partitions
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn num_rows(&self) -> usize {
        self.partitions.iter().map(Partition::len).sum()
    }

    /// Iterates all the rows, partition after partition.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.partitions.iter().flat_map(|p| p.rows().iter())
    }

    /// Returns a new frame with `column` appended, filled with `values`.
    ///
    /// # Arguments
    /// * `column` - The new column, its name must be unused.
    /// * `values` - One value per row, partitioned exactly like this frame.
    pub fn with_column(&self, column: Column, values: Partitioned<Vec<Value>>) -> Result<Self> {
        if values.len() != self.num_partitions() {
            return Err(FrameErr::PartitionMismatch {
                got: values.len(),
                expected: self.num_partitions(),
            });
        }

        let schema = self.schema.with_column(column)?;

        let mut offset = 0;
        let mut partitions = Vec::with_capacity(self.num_partitions());

        for (partition, (part, vals)) in self.partitions.iter().zip(values).enumerate() {
            if part.len() != vals.len() {
                return Err(FrameErr::LengthMismatch {
                    partition,
                    got: vals.len(),
                    expected: part.len(),
                });
            }

            let rows: Vec<Row> = part
                .rows()
                .iter()
                .zip(vals)
                .map(|(row, value)| {
                    let mut row = row.clone();
                    row.push(value);
                    row
                })
                .collect();

            Self::check_rows(&schema, &rows, offset)?;
            offset += rows.len();
            partitions.push(Partition::new(rows));
        }

        Ok(Self {
            schema,
            partitions: Partitioned::new(partitions),
        })
    }
}
