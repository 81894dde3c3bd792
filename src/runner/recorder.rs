use super::post::{self, vtk};
use super::StepObserver;
use crate::error::Result;
use crate::global_variables::*;
use crate::io::{parse_parameter, parse_parameter_or, WriteDataMode};
use crate::post::PostResult;
use crate::solver::io::{write_pressure, write_velocity};
use crate::solver::{FieldSnapshot, FlowSolver};
use crate::Residuals;
use colored::*;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

type PostFunction = fn(&FieldSnapshot, Float) -> Vec<PostResult>;

const POST_PROCESSING_SERIES: [(PostFunction, &'static str); 4] = [
    (
        |fields: &FieldSnapshot, _: Float| post::compute_mean_velocities(fields),
        "mean_velocities.dat",
    ),
    (
        |fields: &FieldSnapshot, _: Float| post::compute_max_velocity(fields),
        "max_velocity.dat",
    ),
    (
        |fields: &FieldSnapshot, _: Float| post::compute_mean_pressure(fields),
        "mean_pressure.dat",
    ),
    (post::compute_kinetic_energy, "kinetic_energy.dat"),
];

#[derive(Clone)]
pub struct CaseRecorder {
    pub case_name: String,
    pub num_steps: usize,
    pub simulation_time: Instant,
    pub write_data_mode: WriteDataMode,
    pub data_path: PathBuf,
    pub post_processing_path: PathBuf,
    pub vtk_path: PathBuf,
    density: Float,
    previous: Option<FieldSnapshot>,
}

impl Default for CaseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseRecorder {
    pub fn new() -> Self {
        Self {
            case_name: String::from(CASE_NAME),
            num_steps: NUM_STEPS,
            simulation_time: Instant::now(),
            write_data_mode: WriteDataMode::Frequency(WRITE_FREQUENCY),
            data_path: PathBuf::from(crate::io::DATA_PATH),
            post_processing_path: PathBuf::from(crate::io::POST_PROCESSING_PATH),
            vtk_path: PathBuf::from(crate::io::VTK_PATH),
            density: DENSITY,
            previous: None,
        }
    }

    pub fn from_setup(parameters: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::new();
        Ok(Self {
            case_name: parse_parameter_or(parameters, "case_name", defaults.case_name.clone())?,
            num_steps: parse_parameter(parameters, "num_steps")?,
            write_data_mode: parse_parameter_or(
                parameters,
                "write_data_mode",
                defaults.write_data_mode.clone(),
            )?,
            ..defaults
        })
    }

    pub fn with_output_root<P>(mut self, root: P) -> Self
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref();
        self.data_path = root.join("data");
        self.post_processing_path = root.join("post_processing");
        self.vtk_path = self.post_processing_path.join("vtk_files");
        self
    }

    pub fn build_case_setup() -> Result<CaseRecorder> {
        crate::io::create_case_directories()?;
        let case_setup_path =
            Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_SETUP_FILE);
        let recorder = if case_setup_path.exists() {
            log::info!(
                "Reading the case setup file: {}.",
                case_setup_path.display().to_string().yellow().bold()
            );
            let parameters = crate::io::read_case_setup()?;
            CaseRecorder::from_setup(&parameters)?
        } else {
            CaseRecorder::new()
        };
        recorder.create_script_for_residuals_graph()?;
        Ok(recorder)
    }

    fn case_name_prefix(&self) -> String {
        self.case_name.replace(" ", "_").to_lowercase()
    }

    pub fn start(&mut self, solver: &FlowSolver) -> Result<()> {
        for path in [&self.data_path, &self.post_processing_path, &self.vtk_path] {
            fs::create_dir_all(path)?;
        }
        self.density = solver.parameters().density;
        self.simulation_time = Instant::now();
        let snapshot = solver.snapshot();
        let time_step = solver.time_step();
        self.write_data_from_steps(&snapshot, time_step)?;
        self.write_post_processing(&snapshot, time_step, true)?;
        self.previous = Some(snapshot);
        Ok(())
    }

    pub fn finish(&self, fields: &FieldSnapshot, time_step: usize) -> Result<()> {
        self.write_data_from_steps(fields, time_step)?;
        self.write_vtk_from_steps(fields, time_step)?;
        log::info!(
            "Finished {} steps in {:.2} s.",
            time_step,
            self.simulation_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    pub fn print_residuals(&self, time_step: usize, residuals: &Residuals) {
        if time_step % 100 == 1 {
            let duration = self.simulation_time.elapsed().as_secs_f64();
            println!("\n{} {:.2} s.", "Elapsed time:".cyan().bold(), duration);
            println!(
                "\n{:>8} {:>16} {:>16} {:>16}\n",
                "step".cyan().bold(),
                "velocity_x".cyan().bold(),
                "velocity_y".cyan().bold(),
                "pressure".cyan().bold()
            );
        }
        println!(
            "{:>8} {:>16.8e} {:>16.8e} {:>16.8e}",
            time_step, residuals.velocity[0], residuals.velocity[1], residuals.pressure
        );
    }

    pub fn write_residuals(&self, time_step: usize, residuals: &Residuals) -> Result<()> {
        let path = self.data_path.join(crate::io::RESIDUALS_FILE);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if time_step == 1 {
            writeln!(
                file,
                "{:>8} {:>16} {:>16} {:>16}",
                "step", "velocity_x", "velocity_y", "pressure"
            )?;
        }
        writeln!(
            file,
            "{:>8} {:>16.8e} {:>16.8e} {:>16.8e}",
            time_step, residuals.velocity[0], residuals.velocity[1], residuals.pressure
        )?;
        Ok(())
    }

    pub fn write_data(&self, fields: &FieldSnapshot, time_step: usize) -> Result<()> {
        if self.write_data_mode.should_write(time_step) {
            self.write_data_from_steps(fields, time_step)?;
        }
        Ok(())
    }

    pub fn write_data_from_steps(&self, fields: &FieldSnapshot, time_step: usize) -> Result<()> {
        let step_path = self.data_path.join(time_step.to_string());
        fs::create_dir_all(&step_path)?;
        log::debug!(
            "Writing {} and {} for time step {}.",
            crate::io::VELOCITY_FILE.yellow().bold(),
            crate::io::PRESSURE_FILE.yellow().bold(),
            time_step.to_string().yellow().bold()
        );
        write_velocity(fields, step_path.join(crate::io::VELOCITY_FILE))?;
        write_pressure(fields, step_path.join(crate::io::PRESSURE_FILE))?;
        Ok(())
    }

    pub fn write_vtk_from_steps(&self, fields: &FieldSnapshot, time_step: usize) -> Result<()> {
        let path_str = format!("{}_{:08}.vtk", self.case_name_prefix(), time_step);
        let path = self.vtk_path.join(&path_str);
        log::info!(
            "Writing {} for time step {}.",
            path_str.yellow().bold(),
            time_step.to_string().yellow().bold()
        );
        vtk::write_vtk(fields, self.density, path)
    }

    pub fn write_post_processing(
        &self,
        fields: &FieldSnapshot,
        time_step: usize,
        write_header: bool,
    ) -> Result<()> {
        for (function, file_name) in POST_PROCESSING_SERIES {
            let post_results = function(fields, self.density);
            let path = self.post_processing_path.join(file_name);
            crate::post::append_post_results(path, time_step, &post_results, write_header)?;
        }
        Ok(())
    }

    fn create_script_for_residuals_graph(&self) -> Result<()> {
        let path = self
            .post_processing_path
            .join(crate::io::RESIDUALS_GRAPH_FILE);
        let mut file = File::create(&path)?;
        log::info!(
            "Creating the residuals graph script file: {}.",
            path.display().to_string().yellow().bold()
        );
        writeln!(
            file,
            r#"set title "{case_name}"
    set ylabel "Residuals"
    set xlabel "Steps"
    set grid
    set logscale y
    set ytics format "%L"
    set mxtics 5
    set terminal push
    set terminal pngcairo font "courier"
    set output "fig_{case_name_prefix}_residuals.png"
    plot "../data/residuals.dat" u 1:2 t "velocity (x)" w l,\
    "" u 1:3 t "velocity (y)" w l,\
    "" u 1:4 t "pressure" w l
    set terminal pdfcairo font "courier"
    set output "fig_{case_name_prefix}_residuals.pdf"
    replot
    set terminal pop
    set output"#,
            case_name = self.case_name,
            case_name_prefix = self.case_name_prefix(),
        )?;
        Ok(())
    }
}

impl StepObserver for CaseRecorder {
    fn on_step(&mut self, step_index: usize, fields: &FieldSnapshot) -> Result<()> {
        let previous = match self.previous.take() {
            Some(previous) => previous,
            None => FieldSnapshot::new(fields.nx, fields.ny, fields.dx, fields.dy)?,
        };
        let residuals = fields.compute_residuals(&previous);
        self.previous = Some(fields.clone());

        self.print_residuals(step_index, &residuals);
        self.write_residuals(step_index, &residuals)?;
        self.write_data(fields, step_index)?;
        self.write_post_processing(fields, step_index, false)?;
        Ok(())
    }
}
