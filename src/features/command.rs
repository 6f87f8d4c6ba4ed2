//! Extraction through an external command line tool

use super::error::ExtractError;
use super::table::{FeatureTable, Table};
use super::FeatureExtractor;
use crate::config::{ExtractorConfig, OutputFormat, VariablesLoader};
use crate::scratch::ScratchSpace;
use crate::storage::{types::file_name, ObjectStore};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder, ProcessRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the configured tool once per feature against a local copy of the file
///
/// The data file is fetched from the raw-data bucket into the scratch space,
/// the tool's standard output is parsed into a [`Table`], and the local copy
/// is removed afterwards whatever the outcome.
pub struct CommandExtractor {
    store: Arc<dyn ObjectStore>,
    loader: VariablesLoader,
    runner: Arc<dyn ProcessRunner>,
    work_dir: PathBuf,
}

impl CommandExtractor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        loader: VariablesLoader,
        runner: Arc<dyn ProcessRunner>,
        scratch: &ScratchSpace,
    ) -> Self {
        Self {
            store,
            loader,
            runner,
            work_dir: scratch.path().join("downloads"),
        }
    }

    /// Tool invocation for one feature, with `{input}` / `{feature}` filled in
    ///
    /// The tool runs inside the download directory so any side files it
    /// writes are removed with the scratch space.
    pub fn command_for(
        &self,
        config: &ExtractorConfig,
        input: &Path,
        feature: &str,
    ) -> ProcessCommand {
        let input = input.to_string_lossy();
        ProcessCommandBuilder::new(&config.program)
            .templated_args(&config.args, &[("input", &*input), ("feature", feature)])
            .current_dir(&self.work_dir)
            .timeout(config.timeout)
            .build()
    }

    async fn extract_feature(
        &self,
        config: &ExtractorConfig,
        input: &Path,
        feature: &str,
    ) -> Result<Table, ExtractError> {
        let command = self.command_for(config, input, feature);
        let output = self
            .runner
            .run(command)
            .await
            .map_err(|source| ExtractError::Process {
                feature: feature.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractError::ToolFailed {
                feature: feature.to_string(),
                status: match output.status.code() {
                    Some(code) => format!("exit code {code}"),
                    None => "a signal".to_string(),
                },
                stderr: output.stderr.trim().to_string(),
            });
        }

        let parsed = match config.format {
            OutputFormat::Csv => Table::from_csv(&output.stdout),
            OutputFormat::Whitespace => Table::from_whitespace(&output.stdout),
        };
        parsed.map_err(|source| ExtractError::Output {
            feature: feature.to_string(),
            source,
        })
    }

    async fn extract_all(
        &self,
        config: &ExtractorConfig,
        input: &Path,
        features: &[String],
    ) -> Result<Vec<FeatureTable>, ExtractError> {
        let mut tables = Vec::with_capacity(features.len());
        for feature in features {
            let table = self.extract_feature(config, input, feature).await?;
            debug!("Extracted {} row(s) for {}", table.len(), feature);
            tables.push(FeatureTable::new(feature.clone(), table));
        }
        Ok(tables)
    }
}

#[async_trait]
impl FeatureExtractor for CommandExtractor {
    async fn extract(&self, key: &str) -> Result<Vec<FeatureTable>, ExtractError> {
        let variables = self.loader.load().await?;
        let features = variables.features();

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let local = self
            .work_dir
            .join(format!("{}-{}", uuid::Uuid::new_v4(), file_name(key)));

        self.store
            .download_file(&variables.etl.raw_data_bucket, key, &local)
            .await
            .map_err(|source| ExtractError::Fetch {
                key: key.to_string(),
                source,
            })?;

        let result = self
            .extract_all(&variables.etl.extractor, &local, &features)
            .await;

        if let Err(e) = tokio::fs::remove_file(&local).await {
            debug!("Could not remove {}: {}", local.display(), e);
        }

        let tables = result?;
        info!("Extracted {} feature(s) from {}", tables.len(), key);
        Ok(tables)
    }
}
