use std::env;

//Error handling crate
use anyhow::{Context, Result, bail};

//Random numbers
use rand::SeedableRng;
use rand::rngs::StdRng;

//Arrays
use ndarray::Array1;

use libmcopt::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let input_file = match args.len() {
        1 => "input.toml".to_string(),
        2 => args[1].clone(),
        _ => bail!("Too many command line arguments. Usage: mcopt <input.toml>"),
    };

    println!("Welcome to mcopt!");

    let input = Input::from_file(&input_file)?;

    let tracker = input.build_tracker()
        .context("Input error: could not build tracker.")?;
    let true_values = input.true_values(&tracker)
        .context("Input error: could not build experimental point cloud.")?;
    let minimizer = input.build_minimizer(tracker)
        .context("Input error: could not build minimizer.")?;

    println!("Fitting {} points with {} and {}.", true_values.nrows(), input.fit.matcher, input.fit.sigma_schedule);
    println!("{}.", input.fit.acceptance);

    let ctr0 = Array1::from(input.fit.ctr0.clone());
    let sig0 = Array1::from(input.fit.sig0.clone());
    let mut rng = StdRng::seed_from_u64(input.options.seed);

    let output = minimizer.minimize_output(ctr0.view(), sig0.view(), true_values.view(), &input.search_options(), &mut rng)
        .context("Numerical error: Monte Carlo search failed.")?;

    output::print_summary(&output);

    if input.options.write_files {
        output::write_results(&input.options.name, &output)?;
    }

    println!("Finished!");
    Ok(())
}
