pub const CASE_NAME: &'static str = "Case Test";

pub type Float = f64;

pub const NUM_STEPS: usize = 100;

pub const WRITE_FREQUENCY: usize = 10;

pub const NX: usize = 10;

pub const NY: usize = 10;

pub const DELTA_X: Float = 1.0;

pub const DELTA_Y: Float = 1.0;

pub const DELTA_T: Float = 0.1;

pub const DENSITY: Float = 1.0;

pub const PRESSURE_ITERATIONS: usize = 1;

pub const MIN_GRID_POINTS: usize = 3;
