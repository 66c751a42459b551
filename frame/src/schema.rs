use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{FrameErr, Result};

/// The type of the values a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int32,
    Int64,
    Float32,
    Float64,
    Str,
}

impl DataType {
    /// Whether values of this type can be read as `f64`.
    pub fn is_numeric(self) -> bool {
        !matches!(self, DataType::Str)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Str => "str",
        };

        f.write_str(s)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// The ordered list of columns of a `Frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a new `Schema`.
    ///
    /// # Arguments
    /// * `columns` - The columns, in row order.
    ///
    /// # Returns
    /// The schema or a `DuplicateColumn` error if two columns share a name.
    pub fn new<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = Column>,
    {
        let schema = Self {
            columns: columns.into_iter().collect(),
        };

        schema.check_unique()?;
        Ok(schema)
    }

    pub(crate) fn check_unique(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());

        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(FrameErr::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up the position of a column by name.
    ///
    /// # Returns
    /// The column index or a `ColumnNotFound` error.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| FrameErr::ColumnNotFound { name: name.into() })
    }

    /// Resolves every name in `names` to a column index, requiring numeric columns.
    ///
    /// # Arguments
    /// * `names` - The column names to resolve.
    ///
    /// # Returns
    /// The indices in the same order as `names`, or the first lookup failure.
    pub fn numeric_indices<S>(&self, names: &[S]) -> Result<Vec<usize>>
    where
        S: AsRef<str>,
    {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let idx = self.index_of(name)?;
                let dtype = self.columns[idx].dtype;

                if !dtype.is_numeric() {
                    return Err(FrameErr::NonNumericColumn {
                        name: name.into(),
                        dtype,
                    });
                }

                Ok(idx)
            })
            .collect()
    }

    /// Returns a copy of this schema with `column` appended.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        let mut columns = self.columns.clone();
        columns.push(column);
        Self::new(columns)
    }
}
