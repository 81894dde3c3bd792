use crate::error::Result;
use crate::global_variables::*;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct PostResult {
    pub name: String,
    pub label: String,
    pub value: Float,
    pub unit: Option<String>,
}

impl PostResult {
    pub fn new(name: &str, label: &str, value: Float, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value,
            unit: unit.map(str::to_string),
        }
    }
}

pub fn append_post_results<P>(
    path: P,
    time_step: usize,
    post_results: &[PostResult],
    write_header: bool,
) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if write_header {
        write!(file, "{:>8}", "step")?;
        for post_result in post_results {
            write!(file, " {:>16}", post_result.name)?;
        }
        writeln!(file)?;
    }
    write!(file, "{:>8}", time_step)?;
    for post_result in post_results {
        write!(file, " {:>16.8e}", post_result.value)?;
    }
    writeln!(file)?;
    Ok(())
}
