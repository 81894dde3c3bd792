use crate::error::{FlowError, Result};
use colored::*;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DATA_PATH: &'static str = "./data";

pub const PRE_PROCESSING_PATH: &'static str = "./pre_processing";

pub const CASE_SETUP_FILE: &'static str = "case_setup.jou";

pub const CASE_CONDITIONS_FILE: &'static str = "case_conditions.jou";

pub const CASE_PARAMETERS_FILE: &'static str = "case_parameters.jou";

pub const POST_PROCESSING_PATH: &'static str = "./post_processing";

pub const VTK_PATH: &'static str = "./post_processing/vtk_files";

pub const COORDINATES_FILE: &'static str = "coordinates.dat";

pub const VELOCITY_FILE: &'static str = "velocity.dat";

pub const PRESSURE_FILE: &'static str = "pressure.dat";

pub const RESIDUALS_FILE: &'static str = "residuals.dat";

pub const RESIDUALS_GRAPH_FILE: &'static str = "gr_residuals.gp";

#[derive(Clone, Debug, PartialEq)]
pub enum WriteDataMode {
    Frequency(usize),

    ListOfSteps(Vec<usize>),
}

impl WriteDataMode {
    pub fn should_write(&self, time_step: usize) -> bool {
        match self {
            WriteDataMode::Frequency(n) => time_step == 0 || (*n > 0 && time_step % n == 0),
            WriteDataMode::ListOfSteps(list) => time_step == 0 || list.contains(&time_step),
        }
    }
}

impl FromStr for WriteDataMode {
    type Err = FlowError;

    fn from_str(mode: &str) -> Result<Self> {
        let config_error = |message: String| FlowError::Config {
            key: "write_data_mode".to_string(),
            message,
        };
        let mut write_data_mode = mode.split_whitespace();
        match write_data_mode.next() {
            Some("frequency") => {
                let frequency = write_data_mode
                    .next()
                    .ok_or_else(|| config_error("missing frequency".to_string()))?
                    .parse::<usize>()
                    .map_err(|e| config_error(e.to_string()))?;
                Ok(WriteDataMode::Frequency(frequency))
            }
            Some("list") => {
                let list = write_data_mode
                    .map(|x| x.parse::<usize>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| config_error(e.to_string()))?;
                Ok(WriteDataMode::ListOfSteps(list))
            }
            _ => Err(config_error(format!("invalid write results mode: {mode}"))),
        }
    }
}

pub fn create_case_directories() -> Result<()> {
    let list_of_paths = [
        DATA_PATH,
        PRE_PROCESSING_PATH,
        POST_PROCESSING_PATH,
        VTK_PATH,
    ];
    for path_str in list_of_paths {
        let path = Path::new(path_str);
        if !path.exists() {
            log::info!("Creating the {} path.", path_str.yellow().bold());
            fs::create_dir_all(path)?;
        } else {
            log::info!("The {} path already exists.", path_str.yellow().bold());
        }
    }
    Ok(())
}

pub fn read_case_setup() -> Result<HashMap<String, String>> {
    read_parameters_file(Path::new(PRE_PROCESSING_PATH).join(CASE_SETUP_FILE))
}

pub fn read_case_conditions() -> Result<HashMap<String, String>> {
    read_parameters_file(Path::new(PRE_PROCESSING_PATH).join(CASE_CONDITIONS_FILE))
}

pub fn read_parameters_file<P>(path: P) -> Result<HashMap<String, String>>
where
    P: AsRef<Path>,
{
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(extract_parameters(&contents))
}

pub fn extract_parameters(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.starts_with("#"))
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(2, "=");
            let key = parts.next()?.trim().to_string();
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((key, value))
        })
        .collect::<HashMap<String, String>>()
}

pub fn parse_parameter<T>(parameters: &HashMap<String, String>, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = parameters.get(key).ok_or_else(|| FlowError::Config {
        key: key.to_string(),
        message: "missing entry".to_string(),
    })?;
    value.parse::<T>().map_err(|e| FlowError::Config {
        key: key.to_string(),
        message: format!("cannot parse {value:?}: {e}"),
    })
}

pub fn parse_parameter_or<T>(
    parameters: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if parameters.contains_key(key) {
        parse_parameter(parameters, key)
    } else {
        Ok(default)
    }
}

pub fn write_inside_loop_elapsed_time(
    elapsed_times: &[(&str, Duration)],
    time_step: usize,
) -> Result<()> {
    let path = Path::new(POST_PROCESSING_PATH).join("benchmark_elapsed_time.dat");
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if time_step == 1 {
        write!(file, "{:>8}", "step")?;
        for (key, _) in elapsed_times {
            write!(file, " {:>16}", key)?;
        }
        writeln!(file)?;
    }
    write!(file, "{:>8}", time_step)?;
    for (_, value) in elapsed_times {
        write!(file, " {:>16.8e}", value.as_secs_f64())?;
    }
    writeln!(file)?;
    Ok(())
}
