use super::*;

/// Rule for shrinking the search spread between iterations.
pub trait SigmaSchedule: Send + Sync {
    /// Spread to use after iteration `iteration` (counted from zero) searched with `sigma`.
    fn next_sigma(&self, sigma: &Array1<f64>, red_factor: f64, iteration: usize) -> Array1<f64>;
}

/// Multiply the spread by the reduction factor once per iteration: iteration `k` searches with
/// `sig0 * red_factor^k`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Geometric;

impl SigmaSchedule for Geometric {
    fn next_sigma(&self, sigma: &Array1<f64>, red_factor: f64, iteration: usize) -> Array1<f64> {
        sigma.mapv(|s| s*red_factor)
    }
}

/// Multiply the current spread by `red_factor^(iteration + 1)`, so later iterations shrink faster.
///
/// The factors compound: the spread searched in iteration `k` is `sig0 * red_factor^(k*(k+1)/2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Accelerating;

impl SigmaSchedule for Accelerating {
    fn next_sigma(&self, sigma: &Array1<f64>, red_factor: f64, iteration: usize) -> Array1<f64> {
        let factor = red_factor.powi(iteration as i32 + 1);
        sigma.mapv(|s| s*factor)
    }
}

/// Rule for marking the candidates of one iteration as good fits.
pub trait AcceptanceRule: Send + Sync {
    /// Positions within `chis` of the accepted candidates, in increasing order. Candidates scored
    /// with the sentinel value are never accepted.
    fn accept(&self, chis: &[f64], sentinel: f64) -> Vec<usize>;
}

fn scored(chis: &[f64], sentinel: f64) -> impl Iterator<Item = (usize, f64)> + '_ {
    chis.iter().copied().enumerate().filter(move |(_, chi)| chi.is_finite() & (*chi < sentinel))
}

/// Accept candidates with `chi <= factor * min_chi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelativeBand {
    pub factor: f64,
}

impl Default for RelativeBand {
    fn default() -> RelativeBand {
        RelativeBand {
            factor: 2.,
        }
    }
}

impl AcceptanceRule for RelativeBand {
    fn accept(&self, chis: &[f64], sentinel: f64) -> Vec<usize> {
        let min_chi = scored(chis, sentinel).map(|(_, chi)| chi).fold(f64::INFINITY, f64::min);
        if !min_chi.is_finite() {
            return vec![];
        }
        let threshold = min_chi*self.factor;
        scored(chis, sentinel)
            .filter(|(_, chi)| (*chi <= threshold) | (*chi == min_chi))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Accept candidates with `chi <= min_chi + num_std * std(chi)`, the standard deviation taken over
/// all candidates that did not receive the sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatisticalBand {
    pub num_std: f64,
}

impl Default for StatisticalBand {
    fn default() -> StatisticalBand {
        StatisticalBand {
            num_std: 1.,
        }
    }
}

impl AcceptanceRule for StatisticalBand {
    fn accept(&self, chis: &[f64], sentinel: f64) -> Vec<usize> {
        let values: Vec<f64> = scored(chis, sentinel).map(|(_, chi)| chi).collect();
        if values.is_empty() {
            return vec![];
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>()/count;
        let variance = values.iter().map(|chi| (chi - mean)*(chi - mean)).sum::<f64>()/count;
        let min_chi = values.iter().copied().fold(f64::INFINITY, f64::min);
        let threshold = min_chi + self.num_std*variance.sqrt();

        scored(chis, sentinel)
            .filter(|(_, chi)| *chi <= threshold)
            .map(|(index, _)| index)
            .collect()
    }
}
