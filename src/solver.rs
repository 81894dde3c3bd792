pub mod io;

use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::grid::{self, GridState, D};
use crate::Residuals;
use rayon::prelude::*;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionMode {
    AsObserved,
    Symmetric,
}

impl CorrectionMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "as_observed" => Some(CorrectionMode::AsObserved),
            "symmetric" => Some(CorrectionMode::Symmetric),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CorrectionMode::AsObserved => "as_observed",
            CorrectionMode::Symmetric => "symmetric",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolverParameters {
    pub dx: Float,
    pub dy: Float,
    pub dt: Float,
    pub density: Float,
    pub pressure_iterations: usize,
    pub correction_mode: CorrectionMode,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            dx: DELTA_X,
            dy: DELTA_Y,
            dt: DELTA_T,
            density: DENSITY,
            pressure_iterations: PRESSURE_ITERATIONS,
            correction_mode: CorrectionMode::AsObserved,
        }
    }
}

impl SolverParameters {
    pub fn validate(&self) -> Result<()> {
        let constants = [
            ("dx", self.dx),
            ("dy", self.dy),
            ("dt", self.dt),
            ("density", self.density),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value <= 0.0 {
                return Err(FlowError::InvalidParameter { name, value });
            }
        }
        if self.pressure_iterations == 0 {
            return Err(FlowError::InvalidParameter {
                name: "pressure_iterations",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot {
    pub nx: usize,
    pub ny: usize,
    pub dx: Float,
    pub dy: Float,
    pub u: Vec<Float>,
    pub v: Vec<Float>,
    pub p: Vec<Float>,
}

impl FieldSnapshot {
    pub fn new(nx: usize, ny: usize, dx: Float, dy: Float) -> Result<Self> {
        let number_of_nodes = grid::number_of_nodes(nx, ny)?;
        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            u: vec![0.0; number_of_nodes],
            v: vec![0.0; number_of_nodes],
            p: vec![0.0; number_of_nodes],
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn checked_index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.nx || j >= self.ny {
            return Err(FlowError::OutOfRange {
                i,
                j,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok(i + self.nx * j)
    }

    pub fn velocity_at(&self, i: usize, j: usize) -> Result<(Float, Float)> {
        let index = self.checked_index(i, j)?;
        Ok((self.u[index], self.v[index]))
    }

    pub fn pressure_at(&self, i: usize, j: usize) -> Result<Float> {
        let index = self.checked_index(i, j)?;
        Ok(self.p[index])
    }

    pub fn coordinates(&self) -> impl Iterator<Item = [Float; D]> {
        grid::node_coordinates(self.nx, self.ny, self.dx, self.dy)
    }

    pub fn update_snapshot(&mut self, grid: &GridState) {
        self.u.copy_from_slice(&grid.u);
        self.v.copy_from_slice(&grid.v);
        self.p.copy_from_slice(&grid.p);
    }

    pub fn compute_residuals(&self, old: &FieldSnapshot) -> Residuals {
        let norm = |new: &[Float], old: &[Float]| {
            new.par_iter()
                .zip(old.par_iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<Float>()
                .sqrt()
        };
        Residuals {
            velocity: [norm(&self.u, &old.u), norm(&self.v, &old.v)],
            pressure: norm(&self.p, &old.p),
        }
    }
}

// No stability check on `dt`: a step too large for the spacing blows up.
pub struct FlowSolver {
    grid: GridState,
    parameters: SolverParameters,
    p_previous: Vec<Float>,
    time_step: usize,
}

impl FlowSolver {
    pub fn new(nx: usize, ny: usize, dx: Float, dy: Float, dt: Float) -> Result<Self> {
        let parameters = SolverParameters {
            dx,
            dy,
            dt,
            ..SolverParameters::default()
        };
        Self::with_parameters(nx, ny, parameters)
    }

    pub fn with_parameters(nx: usize, ny: usize, parameters: SolverParameters) -> Result<Self> {
        let grid = GridState::allocate(nx, ny, parameters.dx, parameters.dy)?;
        parameters.validate()?;
        Ok(Self {
            p_previous: vec![0.0; grid.number_of_nodes()],
            grid,
            parameters,
            time_step: 0,
        })
    }

    pub fn nx(&self) -> usize {
        self.grid.nx
    }

    pub fn ny(&self) -> usize {
        self.grid.ny
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn parameters(&self) -> &SolverParameters {
        &self.parameters
    }

    pub fn time_step(&self) -> usize {
        self.time_step
    }

    pub fn coordinates(&self) -> impl Iterator<Item = [Float; D]> {
        self.grid.coordinates()
    }

    pub fn velocity_at(&self, i: usize, j: usize) -> Result<(Float, Float)> {
        let index = self.grid.checked_index(i, j)?;
        Ok((self.grid.u[index], self.grid.v[index]))
    }

    pub fn pressure_at(&self, i: usize, j: usize) -> Result<Float> {
        let index = self.grid.checked_index(i, j)?;
        Ok(self.grid.p[index])
    }

    pub fn set_velocity(&mut self, i: usize, j: usize, u: Float, v: Float) -> Result<()> {
        let index = self.grid.checked_index(i, j)?;
        self.grid.u[index] = u;
        self.grid.v[index] = v;
        Ok(())
    }

    pub fn set_pressure(&mut self, i: usize, j: usize, p: Float) -> Result<()> {
        let index = self.grid.checked_index(i, j)?;
        self.grid.p[index] = p;
        Ok(())
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            nx: self.grid.nx,
            ny: self.grid.ny,
            dx: self.grid.dx,
            dy: self.grid.dy,
            u: self.grid.u.clone(),
            v: self.grid.v.clone(),
            p: self.grid.p.clone(),
        }
    }

    pub fn step(&mut self) {
        self.advect_velocity();
        self.relax_pressure();
        self.correct_velocity();
        self.time_step += 1;
    }

    pub fn step_with_timings(&mut self) -> [(&'static str, Duration); 3] {
        let av_time = Instant::now();
        self.advect_velocity();
        let av_duration = av_time.elapsed();

        let rp_time = Instant::now();
        self.relax_pressure();
        let rp_duration = rp_time.elapsed();

        let cv_time = Instant::now();
        self.correct_velocity();
        let cv_duration = cv_time.elapsed();

        self.time_step += 1;
        [("av", av_duration), ("rp", rp_duration), ("cv", cv_duration)]
    }

    // In place, `i` outer and `j` inner: the `v` update sees the new `u`.
    pub fn advect_velocity(&mut self) {
        let GridState { nx, ny, dx, dy, .. } = self.grid;
        let dt = self.parameters.dt;
        let u = &mut self.grid.u;
        let v = &mut self.grid.v;
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let c = i + nx * j;
                let west = c - 1;
                let south = c - nx;
                let (uc, vc) = (u[c], v[c]);
                let u_new = uc + dt * (-uc * (uc - u[west]) / dx - vc * (uc - u[south]) / dy);
                u[c] = u_new;
                v[c] = vc + dt * (-u_new * (vc - v[west]) / dx - vc * (vc - v[south]) / dy);
            }
        }
    }

    pub fn relax_pressure(&mut self) {
        let GridState { nx, ny, dx, dy, .. } = self.grid;
        let density = self.parameters.density;
        let dx_2 = dx * dx;
        let dy_2 = dy * dy;
        let denominator = 2.0 * (dx_2 + dy_2);
        let source_coefficient = density * dx_2 * dy_2 / denominator;
        for _ in 0..self.parameters.pressure_iterations {
            self.p_previous.copy_from_slice(&self.grid.p);
            let p_old = &self.p_previous;
            let u = &self.grid.u;
            let v = &self.grid.v;
            self.grid
                .p
                .par_iter_mut()
                .enumerate()
                .for_each(|(c, p)| {
                    if grid::is_boundary(c, nx, ny) {
                        return;
                    }
                    let (east, west, north, south) = (c + 1, c - 1, c + nx, c - nx);
                    let neighbours =
                        (p_old[east] + p_old[west]) * dy_2 + (p_old[north] + p_old[south]) * dx_2;
                    let du_dx = (u[east] - u[west]) / dx;
                    let dv_dy = (v[north] - v[south]) / dy;
                    *p = neighbours / denominator - source_coefficient * du_dx * dv_dy;
                });
        }
    }

    pub fn correct_velocity(&mut self) {
        let GridState { nx, ny, dx, dy, .. } = self.grid;
        let SolverParameters {
            dt,
            density,
            correction_mode,
            ..
        } = self.parameters;
        let p = &self.grid.p;
        self.grid
            .u
            .par_iter_mut()
            .zip(self.grid.v.par_iter_mut())
            .enumerate()
            .for_each(|(c, (u, v))| {
                if grid::is_boundary(c, nx, ny) {
                    return;
                }
                let dp_dx = (p[c + 1] - p[c - 1]) / (2.0 * dx);
                let dp_dy = (p[c + nx] - p[c - nx]) / (2.0 * dy);
                match correction_mode {
                    CorrectionMode::AsObserved => {
                        *u -= dt * (dp_dx - density * dp_dy);
                        *v -= dt * (dp_dy - density * dp_dx);
                    }
                    CorrectionMode::Symmetric => {
                        *u -= dt / density * dp_dx;
                        *v -= dt / density * dp_dy;
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seeded_solver(mode: CorrectionMode) -> FlowSolver {
        let parameters = SolverParameters {
            dx: 0.5,
            dy: 0.25,
            dt: 0.01,
            density: 1.3,
            pressure_iterations: 1,
            correction_mode: mode,
        };
        let mut solver = FlowSolver::with_parameters(6, 5, parameters).unwrap();
        for j in 0..5 {
            for i in 0..6 {
                let x = i as Float;
                let y = j as Float;
                solver
                    .set_velocity(i, j, 0.1 * x - 0.05 * y, 0.02 * x * y)
                    .unwrap();
                solver.set_pressure(i, j, 0.3 * x * x - 0.1 * y).unwrap();
            }
        }
        solver
    }

    #[test]
    fn advection_matches_the_upwind_stencil_at_one_point() {
        let mut solver = FlowSolver::new(5, 5, 1.0, 1.0, 0.1).unwrap();
        solver.set_velocity(2, 2, 1.0, 0.5).unwrap();
        solver.set_velocity(1, 2, 0.2, 0.1).unwrap();
        solver.advect_velocity();
        // (1, 2) is visited before (2, 2) and has zero upwind neighbours.
        let u12 = 0.2 + 0.1 * (-0.2 * 0.2 - 0.1 * 0.2);
        let v12 = 0.1 + 0.1 * (-u12 * 0.1 - 0.1 * 0.1);
        let (u, v) = solver.velocity_at(1, 2).unwrap();
        assert_relative_eq!(u, u12, epsilon = 1e-14);
        assert_relative_eq!(v, v12, epsilon = 1e-14);
        let u22 = 1.0 + 0.1 * (-1.0 * (1.0 - u12) - 0.5 * 1.0);
        let v22 = 0.5 + 0.1 * (-u22 * (0.5 - v12) - 0.5 * 0.5);
        let (u, v) = solver.velocity_at(2, 2).unwrap();
        assert_relative_eq!(u, u22, epsilon = 1e-14);
        assert_relative_eq!(v, v22, epsilon = 1e-14);
    }

    #[test]
    fn pressure_sweep_only_reads_the_previous_field() {
        let mut solver = seeded_solver(CorrectionMode::AsObserved);
        let before = solver.snapshot();
        solver.relax_pressure();
        let after = solver.snapshot();

        let (nx, ny) = before.shape();
        let (dx, dy, rho) = (0.5, 0.25, 1.3);
        let (dx_2, dy_2) = (dx * dx, dy * dy);
        // Visit in reverse order; a sweep that read its own writes would differ.
        for j in (1..ny - 1).rev() {
            for i in (1..nx - 1).rev() {
                let c = i + nx * j;
                let expected = ((before.p[c + 1] + before.p[c - 1]) * dy_2
                    + (before.p[c + nx] + before.p[c - nx]) * dx_2)
                    / (2.0 * (dx_2 + dy_2))
                    - rho * dx_2 * dy_2 / (2.0 * (dx_2 + dy_2))
                        * ((before.u[c + 1] - before.u[c - 1]) / dx)
                        * ((before.v[c + nx] - before.v[c - nx]) / dy);
                assert_relative_eq!(after.p[c], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn extra_pressure_iterations_keep_relaxing() {
        let mut one = seeded_solver(CorrectionMode::AsObserved);
        let mut two = seeded_solver(CorrectionMode::AsObserved);
        two.parameters.pressure_iterations = 2;
        one.relax_pressure();
        one.relax_pressure();
        two.relax_pressure();
        assert_eq!(one.snapshot().p, two.snapshot().p);
    }

    #[test]
    fn correction_modes_differ_only_in_the_gradient_form() {
        let mut observed = seeded_solver(CorrectionMode::AsObserved);
        let mut symmetric = seeded_solver(CorrectionMode::Symmetric);
        let before = observed.snapshot();
        observed.correct_velocity();
        symmetric.correct_velocity();

        let c = 2 + 6 * 2;
        let dp_dx = (before.p[c + 1] - before.p[c - 1]) / (2.0 * 0.5);
        let dp_dy = (before.p[c + 6] - before.p[c - 6]) / (2.0 * 0.25);
        let (u, v) = observed.velocity_at(2, 2).unwrap();
        assert_relative_eq!(u, before.u[c] - 0.01 * (dp_dx - 1.3 * dp_dy), epsilon = 1e-14);
        assert_relative_eq!(v, before.v[c] - 0.01 * (dp_dy - 1.3 * dp_dx), epsilon = 1e-14);
        let (u, v) = symmetric.velocity_at(2, 2).unwrap();
        assert_relative_eq!(u, before.u[c] - 0.01 / 1.3 * dp_dx, epsilon = 1e-14);
        assert_relative_eq!(v, before.v[c] - 0.01 / 1.3 * dp_dy, epsilon = 1e-14);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        for dt in [0.0, -0.1, Float::NAN, Float::INFINITY] {
            assert!(matches!(
                FlowSolver::new(5, 5, 1.0, 1.0, dt),
                Err(FlowError::InvalidParameter { name: "dt", .. })
            ));
        }
        assert!(matches!(
            FlowSolver::new(5, 5, 0.0, 1.0, 0.1),
            Err(FlowError::InvalidParameter { name: "dx", .. })
        ));
        let parameters = SolverParameters {
            pressure_iterations: 0,
            ..SolverParameters::default()
        };
        assert!(matches!(
            FlowSolver::with_parameters(5, 5, parameters),
            Err(FlowError::InvalidParameter {
                name: "pressure_iterations",
                ..
            })
        ));
    }

    #[test]
    fn residuals_measure_the_change_since_a_snapshot() {
        let mut solver = FlowSolver::new(4, 4, 1.0, 1.0, 0.1).unwrap();
        let old = solver.snapshot();
        solver.set_velocity(1, 1, 3.0, 4.0).unwrap();
        solver.set_pressure(2, 2, -2.0).unwrap();
        let residuals = solver.snapshot().compute_residuals(&old);
        assert_relative_eq!(residuals.velocity[0], 3.0);
        assert_relative_eq!(residuals.velocity[1], 4.0);
        assert_relative_eq!(residuals.pressure, 2.0);
    }

    #[test]
    fn correction_mode_names_round_trip() {
        for mode in [CorrectionMode::AsObserved, CorrectionMode::Symmetric] {
            assert_eq!(CorrectionMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(CorrectionMode::from_name("fancy"), None);
    }
}
