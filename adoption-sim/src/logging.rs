// src/logging.rs
// Log setup and CSV writers on top of the output bus.

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::agents::{Agent, ConsumerAgent};
use crate::error::SimResult;
use crate::output::{adopters_per_product, adoption_share, OutputWriter};

/// Install the global log subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn open_csv_with_header(dir: &Path, filename: &str, header: &[&str]) -> SimResult<csv::Writer<File>> {
    create_dir_all(dir)?;
    let path: PathBuf = dir.join(filename);

    let mut writer = csv::Writer::from_path(path)?;
    // Write header immediately.
    writer.write_record(header)?;
    writer.flush()?;
    Ok(writer)
}

/// Per-agent state logger: logs/agents.csv
pub struct CsvAgentStateLogger {
    writer: csv::Writer<File>,
}

impl CsvAgentStateLogger {
    pub fn new<P: AsRef<Path>>(dir: P) -> SimResult<Self> {
        let header = ["step", "agent", "name", "active_needs", "adopted_products", "messages_received"];
        let writer = open_csv_with_header(dir.as_ref(), "agents.csv", &header)?;
        Ok(Self { writer })
    }
}

impl OutputWriter for CsvAgentStateLogger {
    fn write_consumer_agent_state(&mut self, agent: &ConsumerAgent, time: u64) {
        let needs = agent
            .active_needs()
            .iter()
            .map(|n| n.name())
            .collect::<Vec<_>>()
            .join(";");
        let adopted = agent
            .adoptions()
            .iter()
            .map(|a| a.product.to_string())
            .collect::<Vec<_>>()
            .join(";");

        let record = [
            time.to_string(),
            agent.id().to_string(),
            agent.name().to_string(),
            needs,
            adopted,
            agent.messages_received().to_string(),
        ];
        if let Err(e) = self.writer.write_record(&record) {
            error!("[CsvAgentStateLogger] write error: {e}");
        }
    }

    fn write_consumer_adoption(&mut self, _consumers: &[ConsumerAgent], _time: u64) {
        // End of step: make the step's agent rows visible.
        if let Err(e) = self.writer.flush() {
            error!("[CsvAgentStateLogger] flush error: {e}");
        }
    }
}

/// Aggregate adoption logger: logs/adoption.csv, one row per adopted product and step.
pub struct CsvAdoptionLogger {
    writer: csv::Writer<File>,
}

impl CsvAdoptionLogger {
    pub fn new<P: AsRef<Path>>(dir: P) -> SimResult<Self> {
        let header = ["step", "product", "adopters", "population", "share"];
        let writer = open_csv_with_header(dir.as_ref(), "adoption.csv", &header)?;
        Ok(Self { writer })
    }
}

impl OutputWriter for CsvAdoptionLogger {
    fn write_consumer_agent_state(&mut self, _agent: &ConsumerAgent, _time: u64) {}

    fn write_consumer_adoption(&mut self, consumers: &[ConsumerAgent], time: u64) {
        let population = consumers.len();
        for (product, adopters) in adopters_per_product(consumers) {
            let record = [
                time.to_string(),
                product.to_string(),
                adopters.to_string(),
                population.to_string(),
                format!("{:.6}", adoption_share(adopters, population)),
            ];
            if let Err(e) = self.writer.write_record(&record) {
                error!("[CsvAdoptionLogger] write error: {e}");
                return;
            }
        }
        if let Err(e) = self.writer.flush() {
            error!("[CsvAdoptionLogger] flush error: {e}");
        }
    }
}
