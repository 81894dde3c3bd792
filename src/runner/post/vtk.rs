use crate::error::Result;
use crate::global_variables::*;
use crate::io::parse_parameter;
use crate::solver::FieldSnapshot;
use colored::*;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct CaseParameters {
    pub nx: usize,
    pub ny: usize,
    pub dx: Float,
    pub dy: Float,
    pub density: Float,
}

impl CaseParameters {
    pub fn from_file() -> Result<CaseParameters> {
        let path = Path::new(crate::io::POST_PROCESSING_PATH).join(crate::io::CASE_PARAMETERS_FILE);
        Self::from_path(path)
    }

    pub fn from_path<P>(path: P) -> Result<CaseParameters>
    where
        P: AsRef<Path>,
    {
        let parameters = crate::io::read_parameters_file(path)?;
        Ok(CaseParameters {
            nx: parse_parameter(&parameters, "nx")?,
            ny: parse_parameter(&parameters, "ny")?,
            dx: parse_parameter(&parameters, "dx")?,
            dy: parse_parameter(&parameters, "dy")?,
            density: parse_parameter(&parameters, "density")?,
        })
    }
}

pub fn write_vtk<P>(fields: &FieldSnapshot, density: Float, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let point_data = fields.nx * fields.ny;
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# vtk DataFile Version 3.0")?;
    writeln!(file, "Finite-difference flow data")?;
    writeln!(file, "ASCII")?;
    writeln!(file, "DATASET STRUCTURED_GRID")?;
    writeln!(file, "DIMENSIONS {} {} 1", fields.nx, fields.ny)?;
    writeln!(file, "POINTS {} float", point_data)?;
    for [x, y] in fields.coordinates() {
        writeln!(file, "{x:>.6e} {y:>.6e} 0.0")?;
    }
    writeln!(file, "POINT_DATA {}", point_data)?;
    writeln!(file, "SCALARS pressure float 1")?;
    writeln!(file, "LOOKUP_TABLE default")?;
    for pressure in &fields.p {
        writeln!(file, "{pressure:>.6e}")?;
    }
    writeln!(file, "SCALARS kinematic_pressure float 1")?;
    writeln!(file, "LOOKUP_TABLE default")?;
    for pressure in &fields.p {
        let kinematic_pressure = pressure / density;
        writeln!(file, "{kinematic_pressure:>.6e}")?;
    }
    writeln!(file, "VECTORS velocity float")?;
    for (velocity_x, velocity_y) in fields.u.iter().zip(&fields.v) {
        writeln!(file, "{velocity_x:>.6e} {velocity_y:>.6e} 0.0")?;
    }
    file.flush()?;
    Ok(())
}

pub fn read_data_directory<P>(data_path: P) -> Result<Vec<usize>>
where
    P: AsRef<Path>,
{
    let mut time_steps = Vec::new();
    for entry in std::fs::read_dir(data_path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Ok(time_step) = entry.file_name().to_string_lossy().parse::<usize>() {
                time_steps.push(time_step);
            }
        }
    }
    time_steps.sort_unstable();
    Ok(time_steps)
}

pub fn run_vtk_post_processing() -> Result<()> {
    let case_setup_path =
        Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_SETUP_FILE);
    let case_name = if case_setup_path.exists() {
        crate::io::read_case_setup()?
            .get("case_name")
            .cloned()
            .unwrap_or_else(|| CASE_NAME.to_string())
    } else {
        CASE_NAME.to_string()
    };
    let case_name = case_name.replace(" ", "_").to_lowercase();
    let case_parameters = CaseParameters::from_file()?;
    let time_steps = read_data_directory(crate::io::DATA_PATH)?;
    log::info!("Found {} time steps: {:?}", time_steps.len(), time_steps);
    std::fs::create_dir_all(crate::io::VTK_PATH)?;
    let CaseParameters {
        nx,
        ny,
        dx,
        dy,
        density,
    } = case_parameters;
    time_steps.par_iter().try_for_each(|&time_step| {
        let fields = FieldSnapshot::from_data(crate::io::DATA_PATH, time_step, nx, ny, dx, dy)?;
        let path_str = format!("{case_name}_{:08}.vtk", time_step);
        let path = Path::new(crate::io::VTK_PATH).join(&path_str);
        log::info!(
            "Writing {} for time step {}.",
            path_str.yellow().bold(),
            time_step.to_string().yellow().bold()
        );
        write_vtk(&fields, density, path)
    })
}
