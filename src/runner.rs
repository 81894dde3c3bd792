pub mod post;
pub mod recorder;

pub use recorder::CaseRecorder;

use crate::error::Result;
use crate::solver::{FieldSnapshot, FlowSolver};
use std::time::Instant;

pub trait StepObserver {
    fn on_step(&mut self, step_index: usize, fields: &FieldSnapshot) -> Result<()>;
}

impl<F> StepObserver for F
where
    F: FnMut(usize, &FieldSnapshot) -> Result<()>,
{
    fn on_step(&mut self, step_index: usize, fields: &FieldSnapshot) -> Result<()> {
        self(step_index, fields)
    }
}

#[derive(Clone, Debug)]
pub struct SimulationRunner {
    pub num_steps: usize,
}

impl SimulationRunner {
    pub fn new(num_steps: usize) -> Self {
        Self { num_steps }
    }

    pub fn run<O>(&self, solver: &mut FlowSolver, observer: &mut O) -> Result<()>
    where
        O: StepObserver + ?Sized,
    {
        let mut snapshot = solver.snapshot();
        for _ in 0..self.num_steps {
            solver.step();
            snapshot.update_snapshot(solver.grid());
            observer.on_step(solver.time_step(), &snapshot)?;
        }
        Ok(())
    }
}

pub fn run() -> Result<()> {
    let mut recorder = CaseRecorder::build_case_setup()?;

    let mut solver = FlowSolver::build_case_conditions()?;

    recorder.start(&solver)?;

    let runner = SimulationRunner::new(recorder.num_steps);
    runner.run(&mut solver, &mut recorder)?;

    recorder.finish(&solver.snapshot(), solver.time_step())
}

pub fn run_benchmark() -> Result<()> {
    let bcs_time = Instant::now();
    let mut recorder = CaseRecorder::build_case_setup()?;
    let bcs_duration = bcs_time.elapsed();

    let bcc_time = Instant::now();
    let mut solver = FlowSolver::build_case_conditions()?;
    let bcc_duration = bcc_time.elapsed();

    recorder.start(&solver)?;

    let mut snapshot = solver.snapshot();
    for _ in 0..recorder.num_steps {
        let loop_time = Instant::now();

        let stage_durations = solver.step_with_timings();

        let us_time = Instant::now();
        snapshot.update_snapshot(solver.grid());
        let us_duration = us_time.elapsed();

        let os_time = Instant::now();
        recorder.on_step(solver.time_step(), &snapshot)?;
        let os_duration = os_time.elapsed();

        let loop_duration = loop_time.elapsed();

        let mut elapsed_times = vec![("bcs", bcs_duration), ("bcc", bcc_duration)];
        elapsed_times.extend(stage_durations);
        elapsed_times.extend([
            ("us", us_duration),
            ("os", os_duration),
            ("loop", loop_duration),
        ]);

        crate::io::write_inside_loop_elapsed_time(&elapsed_times, solver.time_step())?;
    }

    recorder.finish(&snapshot, solver.time_step())
}
