//! Main processing engine for the ETL job.
//!
//! Runs the fixed phase sequence Extract → Transform → Load → Query using
//! the discovery, reader, transform, writer and database modules. Every phase
//! boundary is appended to the progress log. Phases run one after another and
//! the first error ends the run.

pub mod database;
pub mod discovery;
pub mod readers;
pub mod transform;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{database::Database, discovery::FileDiscovery, writer::CsvSink};

use crate::config::EtlConfig;
use crate::error::Result;
use crate::models::{Phase, ProcessingStats, SourceFormat, Table};
use crate::progress_log::{ProgressEvent, ProgressLogger};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::debug;

/// Runs one ETL job against a configuration
#[derive(Debug)]
pub struct EtlJob {
    config: EtlConfig,
    file_discovery: FileDiscovery,
    csv_sink: CsvSink,
    progress: ProgressLogger,
}

impl EtlJob {
    /// Create a new job; fails on invalid configuration
    pub fn new(config: EtlConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            file_discovery: FileDiscovery::new(config.source_dir.clone()),
            csv_sink: CsvSink::new(config.output_path.clone()),
            progress: ProgressLogger::new(config.log_path.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Main entry point: run every phase in order
    pub async fn run(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let mut stats = ProcessingStats {
            output_path: self.config.output_path.clone(),
            ..Default::default()
        };

        println!("{}", "Starting ETL job".bright_green().bold());
        println!(
            "  {} {}",
            "Source:".bright_cyan(),
            self.config.source_dir.display()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.config.output_path.display()
        );

        self.progress.log(ProgressEvent::JobStarted)?;

        self.begin(Phase::Extract)?;
        let extracted = self.extract(&mut stats)?;
        self.end(Phase::Extract)?;

        self.begin(Phase::Transform)?;
        let transformed = self.transform(extracted)?;
        self.end(Phase::Transform)?;

        self.begin(Phase::Load)?;
        stats.rows_written = self.load_flat_file(&transformed)?;
        let mut database = Database::connect(&self.config).await?;
        stats.rows_loaded = database.replace_table(&transformed).await?;
        self.end(Phase::Load)?;

        self.begin(Phase::Query)?;
        let queried = database.query_table().await?;
        println!("{}", queried.frame());
        stats.rows_queried = queried.len();
        self.end(Phase::Query)?;

        database.close().await?;
        self.progress.log(ProgressEvent::JobEnded)?;

        stats.processing_time_ms = start_time.elapsed().as_millis();
        self.print_summary(&stats);
        Ok(stats)
    }

    /// Extract phase: read every discovered file and merge the results once
    pub fn extract(&self, stats: &mut ProcessingStats) -> Result<Table> {
        let files = self.file_discovery.discover_all()?;
        debug!(
            "Discovered {} source files in {}",
            files.len(),
            self.file_discovery.source_dir().display()
        );

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut tables = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(file_name) = file.path.file_name() {
                pb.set_message(format!("Reading: {}", file_name.to_string_lossy()));
            }

            let table = readers::read_source(file)?;
            stats.record_file(file.format, table.len());
            tables.push(table);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let combined = readers::aggregate(tables)?;
        stats.rows_extracted = combined.len();
        Ok(combined)
    }

    /// Transform phase
    pub fn transform(&self, table: Table) -> Result<Table> {
        transform::transform(table)
    }

    /// Flat-file half of the load phase
    pub fn load_flat_file(&self, table: &Table) -> Result<usize> {
        self.csv_sink.write(table)
    }

    fn begin(&self, phase: Phase) -> Result<()> {
        println!("\n{}", format!("{} phase...", phase).bright_yellow());
        self.progress.log(ProgressEvent::PhaseStarted(phase))
    }

    fn end(&self, phase: Phase) -> Result<()> {
        self.progress.log(ProgressEvent::PhaseEnded(phase))
    }

    fn print_summary(&self, stats: &ProcessingStats) {
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        for format in SourceFormat::ALL {
            println!(
                "    {} {}",
                format!("{} rows:", format).bright_cyan(),
                stats.rows_for(format).to_string().bright_white()
            );
        }
        println!(
            "  {} {}",
            "Rows written:".bright_cyan(),
            stats.rows_written.to_string().bright_white().bold()
        );
        println!(
            "  {} {} (table '{}')",
            "Rows loaded:".bright_cyan(),
            stats.rows_loaded.to_string().bright_white().bold(),
            self.config.table_name
        );
    }
}
