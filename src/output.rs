use super::*;

/// Print the best center and chi of a search.
pub fn print_summary(output: &MinimizeOutput) {
    let center = output.center();
    println!("Best fit: x0 = {:.4} m y0 = {:.4} m z0 = {:.4} m enu0 = {:.4} MeV/u azi0 = {:.4} rad pol0 = {:.4} rad gain = {:.4}",
        center[0], center[1], center[2], center[3], center[4], center[5], center[6]);
    println!("Chi: {:e}", output.last_chi());

    if let MinimizeOutput::Detailed(result) = output {
        println!("Iterations: {} Good parameter sets: {} of {}",
            result.iterations_completed, result.good_param_indices.len(), result.all_chis.len());
    }
}

/// Write `<name>_summary.output` and, for detailed results, `<name>_params.output`.
///
/// Each row of the params file is the sampled parameter vector, its chi and a 1/0 good flag.
pub fn write_results(name: &str, output: &MinimizeOutput) -> anyhow::Result<()> {
    let summary_file = format!("{}_summary.output", name);
    let mut summary = open_output_file(&summary_file)?;
    writeln!(summary, "{}, {:e}", output.center().iter().join(", "), output.last_chi())
        .with_context(|| format!("Output error: could not write to {}.", summary_file))?;

    if let MinimizeOutput::Detailed(result) = output {
        for (iteration, min_chi) in result.min_chis.iter().enumerate() {
            writeln!(summary, "{}, {:e}, {}", iteration, min_chi, result.sigmas.row(iteration).iter().join(", "))
                .with_context(|| format!("Output error: could not write to {}.", summary_file))?;
        }

        let params_file = format!("{}_params.output", name);
        let mut params = open_output_file(&params_file)?;
        let mut good = result.good_param_indices.iter().peekable();
        for (index, (row, chi)) in result.all_params.outer_iter().zip(result.all_chis.iter()).enumerate() {
            let is_good = good.next_if_eq(&&index).is_some();
            writeln!(params, "{}, {:e}, {}", row.iter().join(", "), chi, is_good as u8)
                .with_context(|| format!("Output error: could not write to {}.", params_file))?;
        }
        params.flush().with_context(|| format!("Output error: could not flush {}.", params_file))?;
    }

    summary.flush().with_context(|| format!("Output error: could not flush {}.", summary_file))?;
    Ok(())
}

fn open_output_file(filename: &str) -> anyhow::Result<BufWriter<std::fs::File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filename)
        .with_context(|| format!("Output error: could not open output file {}.", filename))?;
    Ok(BufWriter::with_capacity(8192, file))
}
