use cfd_grid as cfd;
use clap::{arg, command, value_parser, Command};
use rayon::ThreadPoolBuilder;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = command!()
        .arg(
            arg!(
                -n --number_of_threads <NUMBER_OF_THREADS> "Sets the number of threads used inside each stage"
            )
            .required(false)
            .value_parser(value_parser!(usize)),
        )
        .subcommand(
            Command::new("run")
                .about("Runs the simulation")
                .arg(
                    arg!(
                        -b --benchmark "Records the elapsed time of every stage"
                    )
                    .required(false),
                ),
        )
        .subcommand(
            Command::new("post")
                .about("Runs the post-processing: writes the vtk files")
        )
        .subcommand_required(true)
        .get_matches();

    if let Some(&num_threads) = matches.get_one::<usize>("number_of_threads") {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            log::error!("Error while building the thread pool: {e}.");
            process::exit(1);
        }
    }

    let result = match matches.subcommand() {
        Some(("run", sub_matches)) => {
            if sub_matches.get_flag("benchmark") {
                cfd::runner::run_benchmark()
            } else {
                cfd::runner::run()
            }
        }
        Some(("post", _)) => cfd::runner::post::vtk::run_vtk_post_processing(),
        _ => Ok(()),
    };

    if let Err(e) = result {
        log::error!("Error while running the case: {e}.");
        process::exit(1);
    }
}
