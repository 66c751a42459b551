use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::DataType;

/// The result type used in the entire frame module.
pub type Result<T> = std::result::Result<T, FrameErr>;

/// The frame module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameErr {
    ColumnNotFound {
        name: String,
    },
    DuplicateColumn {
        name: String,
    },
    NonNumericColumn {
        name: String,
        dtype: DataType,
    },
    PartitionMismatch {
        got: usize,
        expected: usize,
    },
    LengthMismatch {
        partition: usize,
        got: usize,
        expected: usize,
    },
    NullValue {
        column: String,
        partition: usize,
        row: usize,
    },
    RowWidthMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
    TypeMismatch {
        column: String,
        row: usize,
        dtype: DataType,
    },
    ZeroPartitions,
}

impl Display for FrameErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameErr::ColumnNotFound { name } => {
                write!(f, "column '{name}' does not exist in the frame")
            }
            FrameErr::DuplicateColumn { name } => {
                write!(f, "column '{name}' appears more than once in the schema")
            }
            FrameErr::NonNumericColumn { name, dtype } => {
                write!(f, "column '{name}' has type {dtype}, expected a numeric type")
            }
            FrameErr::PartitionMismatch { got, expected } => {
                write!(f, "got values for {got} partitions, the frame has {expected}")
            }
            FrameErr::LengthMismatch {
                partition,
                got,
                expected,
            } => write!(
                f,
                "got {got} values for partition {partition}, it has {expected} rows"
            ),
            FrameErr::NullValue {
                column,
                partition,
                row,
            } => write!(
                f,
                "column '{column}' holds a null value at row {row} of partition {partition}"
            ),
            FrameErr::RowWidthMismatch { row, got, expected } => write!(
                f,
                "row {row} has {got} values but the schema has {expected} columns"
            ),
            FrameErr::TypeMismatch { column, row, dtype } => write!(
                f,
                "row {row} holds a value that doesn't fit column '{column}' of type {dtype}"
            ),
            FrameErr::ZeroPartitions => f.write_str("a frame needs at least one partition"),
        }
    }
}

impl Error for FrameErr {}
