use std::{collections::HashSet, num::NonZeroUsize};

use linreg::TrainOptions;
use serde::{Deserialize, Serialize};

use crate::error::TrainError;

fn default_fit_intercept() -> bool {
    true
}

/// What to train on and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrainConfig {
    /// The feature columns, in weight order.
    pub observation_columns: Vec<String>,
    /// The column holding the values to regress on.
    pub value_column: String,
    #[serde(default = "default_fit_intercept")]
    pub fit_intercept: bool,
    /// Runs the training on a dedicated pool of this many threads instead of the global one.
    #[serde(default)]
    pub num_threads: Option<NonZeroUsize>,
}

impl TrainConfig {
    /// Creates a new `TrainConfig` that fits an intercept on the global thread pool.
    ///
    /// # Arguments
    /// * `observation_columns` - The feature columns.
    /// * `value_column` - The label column.
    pub fn new<I, S>(observation_columns: I, value_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            observation_columns: observation_columns.into_iter().map(Into::into).collect(),
            value_column: value_column.into(),
            fit_intercept: true,
            num_threads: None,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_num_threads(mut self, num_threads: NonZeroUsize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Returns the options handed to the numerical backend.
    pub fn options(&self) -> TrainOptions {
        TrainOptions {
            fit_intercept: self.fit_intercept,
        }
    }

    /// Checks the configuration on its own, without looking at any data.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.observation_columns.is_empty() {
            return Err(TrainError::InvalidConfig(
                "at least one observation column is required".into(),
            ));
        }

        if self.value_column.is_empty() {
            return Err(TrainError::InvalidConfig(
                "the value column name is empty".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.observation_columns.len());
        for name in &self.observation_columns {
            if name.is_empty() {
                return Err(TrainError::InvalidConfig(
                    "observation column names can't be empty".into(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(TrainError::InvalidConfig(format!(
                    "observation column '{name}' is listed more than once"
                )));
            }
        }

        if seen.contains(self.value_column.as_str()) {
            return Err(TrainError::InvalidConfig(format!(
                "value column '{}' is also an observation column",
                self.value_column
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_intercept_defaults_to_true() {
        let config: TrainConfig = serde_json::from_str(
            r#"{ "observation_columns": ["x1", "x2"], "value_column": "y" }"#,
        )
        .unwrap();

        assert_eq!(config, TrainConfig::new(["x1", "x2"], "y"));
        assert!(config.options().fit_intercept);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_observation_columns_are_invalid() {
        let config = TrainConfig::new(Vec::<String>::new(), "y");
        assert!(matches!(config.validate(), Err(TrainError::InvalidConfig(_))));
    }

    #[test]
    fn repeated_observation_column_is_invalid() {
        let config = TrainConfig::new(["x", "x"], "y");
        assert!(matches!(config.validate(), Err(TrainError::InvalidConfig(_))));
    }

    #[test]
    fn label_among_features_is_invalid() {
        let config = TrainConfig::new(["x", "y"], "y");
        assert!(matches!(config.validate(), Err(TrainError::InvalidConfig(_))));
    }

    #[test]
    fn zero_threads_fail_to_parse() {
        let parsed = serde_json::from_str::<TrainConfig>(
            r#"{ "observation_columns": ["x"], "value_column": "y", "num_threads": 0 }"#,
        );
        assert!(parsed.is_err());
    }
}
