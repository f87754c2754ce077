// src/time_model.rs
// Simulation loops: the discrete stepping model and the continuous-time stub.

use tracing::{debug, info};

use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::output::OutputWriter;
use crate::process_model::ProcessModel;

/// Step an event time belongs to. This is the only place continuous event
/// times are quantized.
pub fn step_of(time: f64) -> i64 {
    time.floor() as i64
}

/// An event is due at `step` if its own step is not later.
pub fn is_due(time: f64, step: u64) -> bool {
    step_of(time) <= step as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeModelState {
    NotStarted,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps_run: u64,
    pub events_processed: u64,
    /// Events processed at a later step than they were scheduled for.
    pub late_events: u64,
}

pub trait TimeModel {
    fn run(
        &mut self,
        ctx: &mut SimulationContext,
        process_model: &mut dyn ProcessModel,
        output: &mut dyn OutputWriter,
    ) -> SimResult<RunSummary>;

    fn current_time(&self) -> f64;

    fn state(&self) -> TimeModelState;
}

/// Runs steps `0..=number_total_steps`.
#[derive(Debug)]
pub struct DiscreteTimeModel {
    number_total_steps: u64,
    current_step: u64,
    state: TimeModelState,
}

impl DiscreteTimeModel {
    pub fn new(number_total_steps: u64) -> Self {
        Self {
            number_total_steps,
            current_step: 0,
            state: TimeModelState::NotStarted,
        }
    }

    /// Pop and process every event due at `step`. Returns (processed, late).
    fn drain(ctx: &mut SimulationContext, step: u64) -> SimResult<(u64, u64)> {
        let mut processed = 0;
        let mut late = 0;
        while ctx.scheduler.exists_next_event() {
            let at = ctx.scheduler.top_next_event()?.scheduled_time();
            if !is_due(at, step) {
                break;
            }
            let event = ctx.scheduler.pop_next_event()?;
            if step_of(at) < step as i64 {
                late += 1;
                debug!(step, scheduled = at, "late event processed");
            }
            event.process(ctx);
            processed += 1;
        }
        Ok((processed, late))
    }
}

impl TimeModel for DiscreteTimeModel {
    fn run(
        &mut self,
        ctx: &mut SimulationContext,
        process_model: &mut dyn ProcessModel,
        output: &mut dyn OutputWriter,
    ) -> SimResult<RunSummary> {
        info!(
            steps = self.number_total_steps,
            agents = ctx.consumers.len(),
            process_model = process_model.name(),
            "[TimeModel] starting discrete simulation"
        );
        self.state = TimeModelState::Running;
        let mut summary = RunSummary::default();

        for step in 0..=self.number_total_steps {
            self.current_step = step;
            ctx.time = step as f64;

            for agent in ctx.consumers.iter() {
                output.write_consumer_agent_state(agent, step);
            }

            let (processed, late) = Self::drain(ctx, step)?;
            summary.events_processed += processed;
            summary.late_events += late;

            process_model.process_consumer_agents(ctx, step)?;
            output.write_consumer_adoption(&ctx.consumers, step);

            summary.steps_run += 1;
            debug!(step, processed, queued = ctx.scheduler.len(), "step finished");
        }

        self.state = TimeModelState::Finished;
        info!(
            steps = summary.steps_run,
            events = summary.events_processed,
            late = summary.late_events,
            remaining = ctx.scheduler.len(),
            "[TimeModel] simulation finished"
        );
        Ok(summary)
    }

    fn current_time(&self) -> f64 {
        self.current_step as f64
    }

    fn state(&self) -> TimeModelState {
        self.state
    }
}

/// Continuous-time loop. Only its shape exists; running it is not supported.
#[derive(Debug)]
pub struct ContinuousTimeModel {
    total_simulation_length: f64,
    current_time: f64,
}

impl ContinuousTimeModel {
    pub fn new(total_simulation_length: f64) -> Self {
        Self {
            total_simulation_length,
            current_time: 0.0,
        }
    }

    pub fn total_simulation_length(&self) -> f64 {
        self.total_simulation_length
    }
}

impl TimeModel for ContinuousTimeModel {
    fn run(
        &mut self,
        _ctx: &mut SimulationContext,
        _process_model: &mut dyn ProcessModel,
        _output: &mut dyn OutputWriter,
    ) -> SimResult<RunSummary> {
        Err(SimError::NotImplemented("continuous time model"))
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn state(&self) -> TimeModelState {
        TimeModelState::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ConsumerAgent;
    use crate::events::Event;
    use crate::messages::Message;
    use crate::need::Need;
    use crate::output::OutputBus;
    use crate::product::ProductRegistry;

    /// Records the step and the perception agent 1 holds when the process model runs.
    #[derive(Default)]
    struct ProbeModel {
        calls: Vec<(u64, Option<f64>)>,
    }

    impl ProcessModel for ProbeModel {
        fn name(&self) -> &str {
            "probe"
        }

        fn process_consumer_agents(&mut self, ctx: &mut SimulationContext, time: u64) -> SimResult<()> {
            let seen = ctx.consumer(1).and_then(|a| a.perceived_value(10, "quality"));
            self.calls.push((time, seen));
            Ok(())
        }
    }

    fn context() -> SimulationContext {
        let mut ctx = SimulationContext::new(ProductRegistry::new(), vec![Need::new("warmth")]);
        ctx.consumers.push(ConsumerAgent::new(1, "c1"));
        ctx
    }

    #[test]
    fn quantization_uses_floor() {
        assert_eq!(step_of(1.0), 1);
        assert_eq!(step_of(1.999), 1);
        assert_eq!(step_of(-0.5), -1);
        assert!(is_due(2.7, 2));
        assert!(is_due(0.3, 2));
        assert!(!is_due(3.0, 2));
    }

    #[test]
    fn runs_n_plus_one_steps_and_calls_process_model_each_step() {
        let mut ctx = context();
        let mut model = ProbeModel::default();
        let mut tm = DiscreteTimeModel::new(4);
        assert_eq!(tm.state(), TimeModelState::NotStarted);

        let summary = tm.run(&mut ctx, &mut model, &mut OutputBus::new()).unwrap();

        assert_eq!(summary.steps_run, 5);
        let steps: Vec<_> = model.calls.iter().map(|c| c.0).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4]);
        assert_eq!(tm.state(), TimeModelState::Finished);
        assert_eq!(tm.current_time(), 4.0);
    }

    #[test]
    fn event_is_processed_in_its_own_step() {
        let mut ctx = context();
        let msg = Message::attribute_perception(9, 1, 10, "quality", 0.5);
        ctx.scheduler.schedule_event(Event::communication(1.0, msg));

        let mut model = ProbeModel::default();
        let summary = DiscreteTimeModel::new(2)
            .run(&mut ctx, &mut model, &mut OutputBus::new())
            .unwrap();

        assert_eq!(model.calls, vec![(0, None), (1, Some(0.5)), (2, Some(0.5))]);
        assert_eq!(summary.events_processed, 1);
        assert_eq!(summary.late_events, 0);
    }

    #[test]
    fn future_events_stay_queued() {
        let mut ctx = context();
        let msg = Message::attribute_perception(9, 1, 10, "quality", 0.5);
        ctx.scheduler.schedule_event(Event::communication(7.5, msg));

        let summary = DiscreteTimeModel::new(3)
            .run(&mut ctx, &mut ProbeModel::default(), &mut OutputBus::new())
            .unwrap();
        assert_eq!(summary.events_processed, 0);
        assert_eq!(ctx.scheduler.len(), 1);
    }

    #[test]
    fn past_events_do_not_block_the_queue() {
        let mut ctx = context();
        // Before step 0, so it is late on the first drain.
        let stale = Message::attribute_perception(9, 1, 10, "quality", 0.1);
        ctx.scheduler.schedule_event(Event::communication(-1.0, stale));
        let due = Message::attribute_perception(9, 1, 10, "quality", 0.3);
        ctx.scheduler.schedule_event(Event::communication(1.5, due));

        let mut model = ProbeModel::default();
        let summary = DiscreteTimeModel::new(1)
            .run(&mut ctx, &mut model, &mut OutputBus::new())
            .unwrap();

        assert_eq!(summary.late_events, 1);
        assert_eq!(summary.events_processed, 2);
        let mean = model.calls[1].1.unwrap();
        assert!((mean - 0.2).abs() < 1e-12);
    }

    #[test]
    fn continuous_model_is_not_implemented() {
        let mut ctx = context();
        let mut tm = ContinuousTimeModel::new(10.0);
        assert_eq!(tm.total_simulation_length(), 10.0);
        assert_eq!(tm.current_time(), 0.0);
        let err = tm
            .run(&mut ctx, &mut ProbeModel::default(), &mut OutputBus::new())
            .unwrap_err();
        assert!(matches!(err, SimError::NotImplemented(_)));
    }
}
