pub mod vtk;

use crate::global_variables::*;
use crate::grid;
use crate::post::PostResult;
use crate::solver::FieldSnapshot;
use rayon::prelude::*;

fn interior_values<'a>(
    fields: &'a FieldSnapshot,
    values: &'a [Float],
) -> impl ParallelIterator<Item = (usize, Float)> + 'a {
    let (nx, ny) = fields.shape();
    values
        .par_iter()
        .enumerate()
        .filter(move |&(c, _)| !grid::is_boundary(c, nx, ny))
        .map(|(c, &value)| (c, value))
}

fn number_of_interior_nodes(fields: &FieldSnapshot) -> Float {
    ((fields.nx - 2) * (fields.ny - 2)) as Float
}

pub fn compute_mean_velocities(fields: &FieldSnapshot) -> Vec<PostResult> {
    let ux_sum = interior_values(fields, &fields.u)
        .map(|(_, ux)| ux)
        .sum::<Float>();
    let uy_sum = interior_values(fields, &fields.v)
        .map(|(_, uy)| uy)
        .sum::<Float>();
    let u_sum = interior_values(fields, &fields.u)
        .map(|(c, ux)| (ux * ux + fields.v[c] * fields.v[c]).sqrt())
        .sum::<Float>();
    let number_of_nodes = number_of_interior_nodes(fields);
    vec![
        PostResult::new(
            "mean_velocity",
            "mean velocity (magnitude)",
            u_sum / number_of_nodes,
            None,
        ),
        PostResult::new(
            "mean_velocity_x",
            "mean velocity (x)",
            ux_sum / number_of_nodes,
            None,
        ),
        PostResult::new(
            "mean_velocity_y",
            "mean velocity (y)",
            uy_sum / number_of_nodes,
            None,
        ),
    ]
}

pub fn compute_max_velocity(fields: &FieldSnapshot) -> Vec<PostResult> {
    let max_velocity = interior_values(fields, &fields.u)
        .map(|(c, ux)| (ux * ux + fields.v[c] * fields.v[c]).sqrt())
        .reduce_with(|a, b| a.max(b))
        .unwrap_or(0.0);
    vec![PostResult::new(
        "max_velocity",
        "maximum velocity",
        max_velocity,
        None,
    )]
}

pub fn compute_mean_pressure(fields: &FieldSnapshot) -> Vec<PostResult> {
    let p_sum = interior_values(fields, &fields.p)
        .map(|(_, p)| p)
        .sum::<Float>();
    let p_min = interior_values(fields, &fields.p)
        .map(|(_, p)| p)
        .reduce_with(|a, b| a.min(b))
        .unwrap_or(0.0);
    let p_max = interior_values(fields, &fields.p)
        .map(|(_, p)| p)
        .reduce_with(|a, b| a.max(b))
        .unwrap_or(0.0);
    vec![
        PostResult::new(
            "mean_pressure",
            "mean pressure",
            p_sum / number_of_interior_nodes(fields),
            None,
        ),
        PostResult::new("min_pressure", "minimum pressure", p_min, None),
        PostResult::new("max_pressure", "maximum pressure", p_max, None),
    ]
}

// 0.5 * rho * sum(u^2 + v^2) * dx * dy over every point
pub fn compute_kinetic_energy(fields: &FieldSnapshot, density: Float) -> Vec<PostResult> {
    let u_2_sum = fields
        .u
        .par_iter()
        .zip(fields.v.par_iter())
        .map(|(ux, uy)| ux * ux + uy * uy)
        .sum::<Float>();
    let kinetic_energy = 0.5 * density * u_2_sum * fields.dx * fields.dy;
    vec![PostResult::new(
        "kinetic_energy",
        "kinetic energy",
        kinetic_energy,
        None,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fields() -> FieldSnapshot {
        let mut fields = FieldSnapshot::new(4, 4, 0.5, 2.0).unwrap();
        // interior points are (1, 1), (2, 1), (1, 2), (2, 2)
        fields.u[5] = 3.0;
        fields.v[5] = 4.0;
        fields.u[10] = -1.0;
        fields.p[6] = 2.0;
        fields.p[9] = -6.0;
        // boundary values never count towards interior statistics
        fields.u[0] = 100.0;
        fields.p[15] = 100.0;
        fields
    }

    #[test]
    fn mean_velocities_average_interior_points() {
        let results = compute_mean_velocities(&fields());
        assert_eq!(results[0].name, "mean_velocity");
        assert_relative_eq!(results[0].value, (5.0 + 1.0) / 4.0);
        assert_relative_eq!(results[1].value, (3.0 - 1.0) / 4.0);
        assert_relative_eq!(results[2].value, 4.0 / 4.0);
    }

    #[test]
    fn max_velocity_is_the_largest_interior_magnitude() {
        let results = compute_max_velocity(&fields());
        assert_relative_eq!(results[0].value, 5.0);
    }

    #[test]
    fn pressure_statistics_skip_the_boundary() {
        let results = compute_mean_pressure(&fields());
        assert_relative_eq!(results[0].value, -1.0);
        assert_relative_eq!(results[1].value, -6.0);
        assert_relative_eq!(results[2].value, 2.0);
    }

    #[test]
    fn kinetic_energy_scales_with_density_and_cell_area() {
        let results = compute_kinetic_energy(&fields(), 2.0);
        let u_2_sum = 25.0 + 1.0 + 100.0 * 100.0;
        assert_relative_eq!(results[0].value, 0.5 * 2.0 * u_2_sum * 0.5 * 2.0);
    }
}
