//! Pipeline driver
//!
//! One run: sync new files into the raw-data bucket, then extract, stage and
//! load every feature of every copied file. Failures of a single file or
//! feature are recorded in the [`RunReport`] and the run moves on;
//! configuration and sync errors abort the run.

pub mod report;


pub use report::{ExtractionFailure, FeatureOutcome, OutcomeStatus, RunReport};

use crate::config::{CleanupPolicy, VariablesLoader};
use crate::error::EtlError;
use crate::features::{CommandExtractor, ExtractError, FeatureExtractor, FeatureTable};
use crate::scratch::ScratchSpace;
use crate::stage::{StageError, Stager};
use crate::storage::{staged_key, ObjectStore};
use crate::subprocess::ProcessRunner;
use crate::sync::{ListingPolicy, SourceDiffer};
use crate::warehouse::{Warehouse, WarehouseLoader};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct Pipeline {
    scratch: ScratchSpace,
    store: Arc<dyn ObjectStore>,
    differ: SourceDiffer,
    extractor: Box<dyn FeatureExtractor>,
    stager: Stager,
    loader: WarehouseLoader,
}

impl Pipeline {
    /// Wire up a run; the scratch space is closed when [`Pipeline::run`] returns
    pub fn new(
        variables: VariablesLoader,
        store: Arc<dyn ObjectStore>,
        runner: Arc<dyn ProcessRunner>,
        warehouse: Arc<dyn Warehouse>,
        scratch: ScratchSpace,
    ) -> Self {
        let differ = SourceDiffer::new(store.clone(), variables.clone());
        let extractor = CommandExtractor::new(store.clone(), variables.clone(), runner, &scratch);
        let stager = Stager::new(store.clone(), variables, &scratch);
        let loader = WarehouseLoader::new(warehouse, store.clone());

        Self {
            scratch,
            store,
            differ,
            extractor: Box::new(extractor),
            stager,
            loader,
        }
    }

    pub fn with_listing_policy(mut self, policy: ListingPolicy) -> Self {
        self.differ = self.differ.with_policy(policy);
        self
    }

    pub async fn run(self) -> Result<RunReport, EtlError> {
        let mut report = RunReport::new();
        let result = self.run_stages(&mut report).await;

        let scratch_path = self.scratch.to_path_buf();
        if let Err(e) = self.scratch.close() {
            warn!("Could not remove scratch space {}: {}", scratch_path.display(), e);
        }

        result?;
        report.finish();
        info!(
            "Run finished: {} loaded, {} failed",
            report.loaded(),
            report.failed()
        );
        Ok(report)
    }

    async fn run_stages(&self, report: &mut RunReport) -> Result<(), EtlError> {
        info!("Syncing source bucket");
        report.copied = self.differ.sync().await?;

        for file in report.copied.clone() {
            info!("Extracting features from {}", file);
            let tables = match self.extractor.extract(&file).await {
                Ok(tables) => tables,
                Err(ExtractError::Config(e)) => return Err(e.into()),
                Err(e) => {
                    error!("Extraction of {} failed: {}", file, e);
                    report.extraction_failures.push(ExtractionFailure {
                        file: file.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            for table in tables {
                let outcome = self.stage_and_load(&file, table).await?;
                report.outcomes.push(outcome);
            }
        }
        Ok(())
    }

    async fn stage_and_load(
        &self,
        file: &str,
        table: FeatureTable,
    ) -> Result<FeatureOutcome, EtlError> {
        let FeatureTable { feature, table } = table;
        let mut outcome = FeatureOutcome {
            file: file.to_string(),
            feature: feature.clone(),
            status: OutcomeStatus::Loaded,
            rows: None,
            error: None,
            staged_retained: false,
        };

        let variables = match self.stager.stage(table, &feature).await {
            Ok(variables) => variables,
            Err(StageError::Config(e)) => return Err(e.into()),
            Err(e) => {
                error!("Staging {} of {} failed: {}", feature, file, e);
                outcome.status = OutcomeStatus::StageFailed;
                outcome.error = Some(e.to_string());
                return Ok(outcome);
            }
        };

        match self.loader.load(&variables, &feature).await {
            Ok(loaded) => {
                outcome.rows = Some(loaded.rows);
                outcome.staged_retained = !loaded.staged_deleted;
            }
            Err(e) => {
                outcome.status = OutcomeStatus::LoadFailed;
                outcome.error = Some(e.to_string());
                let bucket = &variables.etl.temps3dir;
                let key = staged_key(&feature);
                outcome.staged_retained = match self.store.exists(bucket, &key).await {
                    Ok(exists) => exists,
                    Err(e) => {
                        // assume the cleanup policy did its job
                        warn!("Could not check for s3://{}/{}: {}", bucket, key, e);
                        variables.etl.jdbc.cleanup == CleanupPolicy::OnSuccess
                    }
                };
            }
        }
        Ok(outcome)
    }
}
