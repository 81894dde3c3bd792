use super::{CorrectionMode, FieldSnapshot, FlowSolver, SolverParameters};
use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::io::{parse_parameter, parse_parameter_or};
use colored::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const DEFAULT_CASE_CONDITIONS: &'static str = r#"nx                               = 10
ny                               = 10

dx                               = 1.0
dy                               = 1.0
dt                               = 0.1
density                          = 1.0

pressure_iterations              = 1
correction_mode                  = as_observed

# i j u v, groups separated by ';'
initial_velocity                 = 5 5 1.0 0.0
"#;

#[derive(Clone, Debug, PartialEq)]
pub struct VelocitySeed {
    pub index: [usize; 2],
    pub velocity: [Float; 2],
}

pub fn parse_velocity_seeds(value: &str) -> Result<Vec<VelocitySeed>> {
    let config_error = |message: String| FlowError::Config {
        key: "initial_velocity".to_string(),
        message,
    };
    value
        .split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| {
            let parts = group.split_whitespace().collect::<Vec<&str>>();
            if parts.len() != 4 {
                return Err(config_error(format!("expected `i j u v`, found {group:?}")));
            }
            let index = |s: &str| s.parse::<usize>().map_err(|e| config_error(e.to_string()));
            let velocity = |s: &str| s.parse::<Float>().map_err(|e| config_error(e.to_string()));
            Ok(VelocitySeed {
                index: [index(parts[0])?, index(parts[1])?],
                velocity: [velocity(parts[2])?, velocity(parts[3])?],
            })
        })
        .collect()
}

impl SolverParameters {
    pub fn from_conditions(conditions: &HashMap<String, String>) -> Result<Self> {
        let correction_mode: String =
            parse_parameter_or(conditions, "correction_mode", "as_observed".to_string())?;
        let correction_mode =
            CorrectionMode::from_name(&correction_mode).ok_or_else(|| FlowError::Config {
                key: "correction_mode".to_string(),
                message: format!("unknown correction mode {correction_mode:?}"),
            })?;
        Ok(Self {
            dx: parse_parameter(conditions, "dx")?,
            dy: parse_parameter(conditions, "dy")?,
            dt: parse_parameter(conditions, "dt")?,
            density: parse_parameter_or(conditions, "density", DENSITY)?,
            pressure_iterations: parse_parameter_or(
                conditions,
                "pressure_iterations",
                PRESSURE_ITERATIONS,
            )?,
            correction_mode,
        })
    }
}

impl FlowSolver {
    pub fn initialization(conditions: &HashMap<String, String>) -> Result<Self> {
        let nx = parse_parameter(conditions, "nx")?;
        let ny = parse_parameter(conditions, "ny")?;
        let parameters = SolverParameters::from_conditions(conditions)?;
        let mut solver = Self::with_parameters(nx, ny, parameters)?;
        if let Some(seeds) = conditions.get("initial_velocity") {
            for seed in parse_velocity_seeds(seeds)? {
                let [i, j] = seed.index;
                let [u, v] = seed.velocity;
                solver.set_velocity(i, j, u, v)?;
            }
        }
        Ok(solver)
    }

    pub fn build_case_conditions() -> Result<FlowSolver> {
        let case_conditions_path =
            Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_CONDITIONS_FILE);
        let case_conditions_path_str = case_conditions_path.display().to_string();
        if case_conditions_path.exists() {
            log::info!(
                "Reading the case conditions file: {}.",
                case_conditions_path_str.yellow().bold()
            );
        } else {
            let mut file = File::create(&case_conditions_path)?;
            log::info!(
                "Creating the default case conditions file: {}.",
                case_conditions_path_str.yellow().bold()
            );
            write!(file, "{}", DEFAULT_CASE_CONDITIONS)?;
        }
        let conditions = crate::io::read_case_conditions()?;
        let solver = FlowSolver::initialization(&conditions)?;
        let data_path = Path::new(crate::io::DATA_PATH);
        solver.write_coordinates(data_path.join(crate::io::COORDINATES_FILE))?;
        let post_processing_path = Path::new(crate::io::POST_PROCESSING_PATH);
        solver.write_case_parameters(post_processing_path.join(crate::io::CASE_PARAMETERS_FILE))?;
        Ok(solver)
    }

    pub fn write_coordinates<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        log::info!(
            "Writing {}.",
            path.as_ref().display().to_string().yellow().bold()
        );
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "{:>8} {:>8} {:>16} {:>16}", "i", "j", "x", "y")?;
        let nx = self.nx();
        for (index, [x, y]) in self.coordinates().enumerate() {
            let (i, j) = (index % nx, index / nx);
            writeln!(file, "{i:>8} {j:>8} {x:>16.8e} {y:>16.8e}")?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn write_case_parameters<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let SolverParameters {
            dx,
            dy,
            dt,
            density,
            pressure_iterations,
            correction_mode,
        } = self.parameters();
        let nx = self.nx();
        let ny = self.ny();
        let correction_mode = correction_mode.name();
        let case_parameters_str = format!(
            r#"nx                               = {nx}
ny                               = {ny}

dx                               = {dx:.8e}
dy                               = {dy:.8e}
dt                               = {dt:.8e}
density                          = {density:.8e}

pressure_iterations              = {pressure_iterations}
correction_mode                  = {correction_mode}"#
        );
        log::info!(
            "Writing the case parameters file: {}.",
            path.as_ref().display().to_string().yellow().bold()
        );
        let mut file = File::create(path)?;
        writeln!(file, "{}", case_parameters_str)?;
        Ok(())
    }
}

pub fn write_velocity<P>(snapshot: &FieldSnapshot, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{:>16} {:>16}", "velocity_x", "velocity_y")?;
    for (velocity_x, velocity_y) in snapshot.u.iter().zip(&snapshot.v) {
        writeln!(file, "{velocity_x:>16.8e} {velocity_y:>16.8e}")?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_pressure<P>(snapshot: &FieldSnapshot, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{:>16}", "pressure")?;
    for pressure in &snapshot.p {
        writeln!(file, "{pressure:>16.8e}")?;
    }
    file.flush()?;
    Ok(())
}

fn read_columns<P, const N: usize>(path: P, number_of_nodes: usize) -> Result<Vec<[Float; N]>>
where
    P: AsRef<Path>,
{
    let path_str = path.as_ref().display().to_string();
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::with_capacity(number_of_nodes);
    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut row = [0.0; N];
        let mut parts = line.split_whitespace();
        for value in row.iter_mut() {
            *value = parts
                .next()
                .and_then(|s| s.parse::<Float>().ok())
                .ok_or_else(|| FlowError::Config {
                    key: path_str.clone(),
                    message: format!("malformed row {line:?}"),
                })?;
        }
        rows.push(row);
    }
    if rows.len() != number_of_nodes {
        return Err(FlowError::Config {
            key: path_str,
            message: format!("expected {number_of_nodes} rows, found {}", rows.len()),
        });
    }
    Ok(rows)
}

impl FieldSnapshot {
    pub fn from_data<P>(
        data_path: P,
        time_step: usize,
        nx: usize,
        ny: usize,
        dx: Float,
        dy: Float,
    ) -> Result<FieldSnapshot>
    where
        P: AsRef<Path>,
    {
        let step_path = data_path.as_ref().join(time_step.to_string());
        let mut snapshot = FieldSnapshot::new(nx, ny, dx, dy)?;
        let number_of_nodes = snapshot.u.len();
        let velocity =
            read_columns::<_, 2>(step_path.join(crate::io::VELOCITY_FILE), number_of_nodes)?;
        for (index, [u, v]) in velocity.into_iter().enumerate() {
            snapshot.u[index] = u;
            snapshot.v[index] = v;
        }
        let pressure = read_columns::<_, 1>(step_path.join(crate::io::PRESSURE_FILE), number_of_nodes)?;
        for (index, [p]) in pressure.into_iter().enumerate() {
            snapshot.p[index] = p;
        }
        Ok(snapshot)
    }
}
