use cfd_grid::io::WriteDataMode;
use cfd_grid::runner::post::vtk;
use cfd_grid::runner::CaseRecorder;
use cfd_grid::{FieldSnapshot, FlowSolver, SimulationRunner};
use std::fs;

fn line_count(path: &std::path::Path) -> usize {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Cannot read {}: {}", path.display(), e))
        .lines()
        .count()
}

#[test]
fn test_recorder_writes_the_case_layout() {
    let root = std::env::temp_dir().join(format!("cfd_grid_case_{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);

    let mut solver = FlowSolver::new(6, 6, 1.0, 1.0, 0.1).unwrap();
    solver.set_velocity(2, 3, 0.5, 0.25).unwrap();
    solver.set_velocity(3, 3, -0.25, 0.5).unwrap();

    let mut recorder = CaseRecorder::new().with_output_root(&root);
    recorder.case_name = "Scratch Case".to_string();
    recorder.write_data_mode = WriteDataMode::ListOfSteps(vec![2]);
    recorder.start(&solver).unwrap();

    SimulationRunner::new(3).run(&mut solver, &mut recorder).unwrap();
    recorder.finish(&solver.snapshot(), solver.time_step()).unwrap();

    let data = root.join("data");
    let post_processing = root.join("post_processing");
    assert_eq!(line_count(&data.join("residuals.dat")), 1 + 3);
    assert_eq!(line_count(&post_processing.join("kinetic_energy.dat")), 1 + 4);
    assert_eq!(line_count(&post_processing.join("mean_velocities.dat")), 1 + 4);
    assert_eq!(vtk::read_data_directory(&data).unwrap(), [0, 2, 3]);
    assert!(post_processing
        .join("vtk_files")
        .join("scratch_case_00000003.vtk")
        .exists());

    let read = FieldSnapshot::from_data(&data, 0, 6, 6, 1.0, 1.0).unwrap();
    assert_eq!(read.velocity_at(2, 3).unwrap(), (0.5, 0.25));

    fs::remove_dir_all(&root).unwrap();
}
