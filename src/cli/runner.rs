//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::JobConfig;
use crate::decode::ReadMode;
use crate::error::{Error, Result};
use crate::output::{
    concat_parts, read_table, DryRunSink, ObjectStoreSink, TableSink, WriteSummary,
};
use crate::pipeline::{self, RunStats, Stages};
use crate::session::Session;
use crate::storage::StorageLocation;
use crate::tables::{all_tables, TableDef};
use crate::transform::JoinKeyKind;
use arrow::json::ArrayWriter;
use arrow::record_batch::RecordBatch;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                input,
                output,
                stage,
                mode,
                join_key,
                dry_run,
            } => {
                let config = self.build_config(
                    input.as_deref(),
                    output.as_deref(),
                    *mode,
                    *join_key,
                )?;
                self.run_job(config, *stage, *dry_run).await
            }
            Commands::Inspect {
                output,
                table,
                limit,
            } => {
                let config = self.build_config(None, output.as_deref(), None, None)?;
                self.inspect(&config, table.as_deref(), *limit).await
            }
            Commands::Schema => self.schema(),
        }
    }

    /// Job config from file and environment, overridden by flags
    fn build_config(
        &self,
        input: Option<&str>,
        output: Option<&str>,
        mode: Option<ReadMode>,
        join_key: Option<JoinKeyKind>,
    ) -> Result<JobConfig> {
        let mut config = match &self.cli.config {
            Some(path) => JobConfig::from_file(path)?,
            None => JobConfig::default(),
        }
        .with_env();

        if let Some(input) = input {
            config.input = input.to_string();
        }
        if let Some(output) = output {
            config.output = output.to_string();
        }
        if let Some(mode) = mode {
            config.read_mode = mode;
        }
        if let Some(join_key) = join_key {
            config.join_key = join_key;
        }
        Ok(config)
    }

    /// Run the pipeline and report what it wrote
    async fn run_job(&self, config: JobConfig, stages: Stages, dry_run: bool) -> Result<()> {
        let session = Session::bootstrap(config)?;
        let sink: Box<dyn TableSink> = if dry_run {
            Box::new(DryRunSink::new())
        } else {
            Box::new(ObjectStoreSink::new(
                session.output().clone(),
                session.writer_config(),
            ))
        };

        let stats = pipeline::run(&session, sink.as_ref(), stages).await?;
        self.output_message(&run_summary(&stats, &session, dry_run));
        Ok(())
    }

    /// Report row counts, partitions and sample rows of written tables
    async fn inspect(&self, config: &JobConfig, only: Option<&str>, limit: usize) -> Result<()> {
        let tables: Vec<TableDef> = all_tables()
            .into_iter()
            .filter(|t| only.map_or(true, |name| t.name == name))
            .collect();
        if tables.is_empty() {
            return Err(Error::invalid_value(
                "table",
                format!("unknown table '{}'", only.unwrap_or_default()),
            ));
        }

        let location = StorageLocation::parse(&config.output, &config.credentials, false)?;
        for table in &tables {
            let parts = read_table(&location, table).await?;
            if parts.is_empty() {
                self.output_message(&json!({
                    "type": "TABLE",
                    "table": table.name,
                    "status": "MISSING",
                }));
                continue;
            }

            let root = format!("{}/", table.name);
            let partitions: BTreeSet<&str> = parts
                .iter()
                .filter_map(|p| p.path.strip_prefix(root.as_str()))
                .filter_map(|relative| relative.rsplit_once('/').map(|(dir, _)| dir))
                .collect();
            let batch = concat_parts(table, &parts)?;

            let mut message = json!({
                "type": "TABLE",
                "table": table.name,
                "rows": batch.num_rows(),
                "files": parts.len(),
                "partitions": partitions,
            });
            if limit > 0 {
                let sample = batch.slice(0, limit.min(batch.num_rows()));
                message["sample"] = batch_to_json(&sample)?;
            }
            self.output_message(&message);
        }
        Ok(())
    }

    /// Print the schema of every output table
    fn schema(&self) -> Result<()> {
        for table in all_tables() {
            let columns: Vec<Value> = table
                .schema
                .fields()
                .iter()
                .map(|field| {
                    json!({
                        "name": field.name(),
                        "type": field.data_type().to_string(),
                        "nullable": field.is_nullable(),
                    })
                })
                .collect();
            self.output_message(&json!({
                "type": "SCHEMA",
                "table": table.name,
                "partition_by": table.partition_by,
                "columns": columns,
            }));
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

fn table_summary(summary: &WriteSummary) -> Value {
    json!({
        "table": summary.table,
        "rows": summary.rows,
        "files": summary.files,
        "partitions": summary.partitions,
        "replaced": summary.replaced,
    })
}

fn run_summary(stats: &RunStats, session: &Session, dry_run: bool) -> Value {
    json!({
        "type": "RUN_SUMMARY",
        "summary": {
            "output": session.config().output,
            "dry_run": dry_run,
            "song_files": stats.song_files,
            "song_records": stats.song_records,
            "log_files": stats.log_files,
            "log_records": stats.log_records,
            "play_events": stats.play_events,
            "malformed": stats.malformed,
            "rows_written": stats.rows_written(),
            "files_written": stats.files_written(),
            "duration_ms": stats.duration_ms,
            "tables": stats.tables.iter().map(table_summary).collect::<Vec<_>>(),
        }
    })
}

/// Rows of a batch as a JSON array
fn batch_to_json(batch: &RecordBatch) -> Result<Value> {
    let mut writer = ArrayWriter::new(Vec::new());
    writer.write_batches(&[batch])?;
    writer.finish()?;
    let buffer = writer.into_inner();
    if buffer.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(serde_json::from_slice(&buffer)?)
}
