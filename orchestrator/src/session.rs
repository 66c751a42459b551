use frame::{Frame, Partitioned};
use linreg::{Backend, LinearModel, PairedTable, PartialResult, TrainOptions};
use log::{debug, info};

use crate::{
    configs::TrainConfig,
    convert::{self, ColumnSelection},
    error::{Stage, TrainError},
    model_data::{self, ModelData},
};

/// A single training run over a frame.
///
/// Walks `Init → ConvertTables → TrainLocal (every partition) → MergeMaster →
/// ExtractWeights → Serialize`, any failure ends the run.
pub struct Session<'a, B: Backend> {
    frame: &'a Frame,
    config: &'a TrainConfig,
    backend: &'a B,
    options: TrainOptions,
}

impl<'a, B: Backend> Session<'a, B> {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `frame` - The data to train on.
    /// * `config` - The columns and options of the training.
    /// * `backend` - The numerical primitives.
    pub fn new(frame: &'a Frame, config: &'a TrainConfig, backend: &'a B) -> Self {
        Self {
            frame,
            config,
            backend,
            options: config.options(),
        }
    }

    /// Runs the whole training.
    ///
    /// # Returns
    /// The model data or the error of the stage that failed.
    pub fn run(&self) -> Result<ModelData, TrainError> {
        self.config.validate()?;

        match self.config.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads.get())
                    .build()?;

                info!("running on a dedicated pool of {num_threads} thread(s)");
                pool.install(|| self.stages())
            }
            None => self.stages(),
        }
    }

    fn stages(&self) -> Result<ModelData, TrainError> {
        let tables = self.convert_tables()?;
        let partials = self.train_local(tables)?;
        let model = self.merge_master(partials)?;

        info!("extracting weights");
        let (weights, intercept) = model_data::split_coefficients(
            model.coefficients(),
            self.config.observation_columns.len(),
            self.options.fit_intercept,
        )?;

        info!("serializing model");
        let serialized_model = self
            .backend
            .serialize(&model)
            .map_err(TrainError::Serialize)?;

        info!(
            "training finished: {} weight(s), {} byte model",
            weights.len(),
            serialized_model.len()
        );

        Ok(ModelData {
            serialized_model,
            weights,
            intercept,
            observation_columns: self.config.observation_columns.clone(),
            value_column: self.config.value_column.clone(),
        })
    }

    fn convert_tables(&self) -> Result<Partitioned<PairedTable>, TrainError> {
        info!(
            "converting {} partition(s) into tables",
            self.frame.num_partitions()
        );

        let selection = ColumnSelection::resolve(
            self.frame.schema(),
            &self.config.observation_columns,
            Some(self.config.value_column.as_str()),
        )?;

        convert::paired_tables(self.frame, &selection)
    }

    fn train_local(
        &self,
        tables: Partitioned<PairedTable>,
    ) -> Result<Partitioned<PartialResult>, TrainError> {
        info!("training {} partition(s) locally", tables.len());

        let backend = self.backend;
        let options = &self.options;

        tables.try_map(|i, tables| {
            let partial = backend.train_local(&tables, options).map_err(|source| {
                TrainError::Compute {
                    stage: Stage::TrainLocal,
                    partition: Some(i),
                    source,
                }
            })?;

            debug!(partition = i, observations = partial.n_observations(); "computed partial result");
            Ok(partial)
        })
    }

    fn merge_master(
        &self,
        partials: Partitioned<PartialResult>,
    ) -> Result<LinearModel, TrainError> {
        let partials = partials.collect();
        info!("merging {} partial result(s)", partials.len());

        self.backend
            .merge(partials, &self.options)
            .map_err(|source| TrainError::Compute {
                stage: Stage::MergeMaster,
                partition: None,
                source,
            })
    }
}
