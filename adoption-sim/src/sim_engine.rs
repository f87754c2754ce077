// src/sim_engine.rs
// High-level simulation engine: a configured context plus the collaborators
// that drive it. Scenarios build a SimEngine and run it.

use std::path::Path;

use tracing::{error, info};

use crate::config::SimConfig;
use crate::context::SimulationContext;
use crate::error::SimResult;
use crate::logging::{CsvAdoptionLogger, CsvAgentStateLogger};
use crate::output::{OutputBus, TracingOutput};
use crate::process_model::ProcessModel;
use crate::scenarios;
use crate::time_model::{ContinuousTimeModel, DiscreteTimeModel, RunSummary, TimeModel};

pub struct SimEngine {
    pub ctx: SimulationContext,
    time_model: Box<dyn TimeModel>,
    process_model: Box<dyn ProcessModel>,
    output: OutputBus,
}

impl SimEngine {
    pub fn new(
        ctx: SimulationContext,
        time_model: Box<dyn TimeModel>,
        process_model: Box<dyn ProcessModel>,
        output: OutputBus,
    ) -> Self {
        Self {
            ctx,
            time_model,
            process_model,
            output,
        }
    }

    /// Build everything `cfg` describes. CSV loggers go to `logs_dir` when given.
    pub fn from_config(cfg: &SimConfig, logs_dir: Option<&Path>) -> SimResult<Self> {
        let ctx = scenarios::build_context(cfg)?;
        let process_model = scenarios::build_process_model(cfg)?;
        let time_model: Box<dyn TimeModel> = if cfg.synchronous {
            Box::new(DiscreteTimeModel::new(cfg.number_total_steps))
        } else {
            Box::new(ContinuousTimeModel::new(cfg.number_total_steps as f64))
        };

        let mut output = OutputBus::new();
        output.subscribe(Box::new(TracingOutput));
        if let Some(dir) = logs_dir {
            // A logger that cannot open its file is skipped; the run goes on.
            match CsvAgentStateLogger::new(dir) {
                Ok(logger) => {
                    output.subscribe(Box::new(logger));
                    info!("[SimEngine] CsvAgentStateLogger attached");
                }
                Err(e) => error!("[SimEngine] failed to init CsvAgentStateLogger: {e}"),
            }

            match CsvAdoptionLogger::new(dir) {
                Ok(logger) => {
                    output.subscribe(Box::new(logger));
                    info!("[SimEngine] CsvAdoptionLogger attached");
                }
                Err(e) => error!("[SimEngine] failed to init CsvAdoptionLogger: {e}"),
            }
        }

        info!(
            scenario = %cfg.scenario_name,
            consumers = ctx.consumers.len(),
            companies = ctx.companies.len(),
            products = ctx.products.len(),
            "[SimEngine] scenario built"
        );
        Ok(Self::new(ctx, time_model, process_model, output))
    }

    /// Seed the initial needs, then run the time model to completion.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let seeded = self.process_model.initialize(&mut self.ctx)?;
        info!(need_events = seeded, "[SimEngine] initial needs scheduled");
        self.time_model
            .run(&mut self.ctx, self.process_model.as_mut(), &mut self.output)
    }

    pub fn time_model(&self) -> &dyn TimeModel {
        self.time_model.as_ref()
    }
}
