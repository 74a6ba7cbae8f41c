use super::*;

/// Energy loss per unit path length as a function of kinetic energy.
///
/// Energies are total kinetic energies in MeV and losses are in MeV/m. The table is immutable once
/// built; lookups interpolate linearly between samples and hold the end values outside the
/// sampled range.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyLossTable {
    energies: Vec<f64>,
    losses: Vec<f64>,
}

impl EnergyLossTable {
    /// Build a table from losses indexed by energy bin, where bin `i` sits at `i*bin_width`.
    pub fn new(losses: Vec<f64>, bin_width: f64) -> McoptResult<EnergyLossTable> {
        if !(bin_width > 0.) | !bin_width.is_finite() {
            return Err(McoptError::InvalidParameter(format!(
                "energy loss bin width must be positive and finite, got {}", bin_width)));
        }
        let energies = (0..losses.len()).map(|i| i as f64*bin_width).collect();
        EnergyLossTable::from_samples(energies, losses)
    }

    /// Build a table from the boundary representation: one loss per 1 keV energy bin.
    pub fn from_bins(losses: Vec<f64>) -> McoptResult<EnergyLossTable> {
        EnergyLossTable::new(losses, ELOSS_BIN_WIDTH)
    }

    /// Build a table from explicit (energy, loss) samples.
    pub fn from_samples(energies: Vec<f64>, losses: Vec<f64>) -> McoptResult<EnergyLossTable> {
        if losses.is_empty() {
            return Err(McoptError::InvalidParameter("energy loss table is empty".to_string()));
        }
        if energies.len() != losses.len() {
            return Err(McoptError::InvalidDimension(format!(
                "energy loss table has {} energies but {} losses", energies.len(), losses.len())));
        }
        if let Some((index, loss)) = losses.iter().enumerate().find(|(_, loss)| !(**loss >= 0.) | !loss.is_finite()) {
            return Err(McoptError::InvalidParameter(format!(
                "energy loss at index {} must be finite and non-negative, got {}", index, loss)));
        }
        if energies.iter().any(|energy| !energy.is_finite()) {
            return Err(McoptError::InvalidParameter("energy loss table energies must be finite".to_string()));
        }
        if let Some(index) = energies.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(McoptError::InvalidParameter(format!(
                "energy loss table is not monotonic in energy at index {}", index + 1)));
        }

        Ok(EnergyLossTable {
            energies,
            losses,
        })
    }

    /// Energy loss in MeV/m at total kinetic energy `energy` in MeV.
    pub fn lookup(&self, energy: f64) -> f64 {
        let last = self.energies.len() - 1;
        if energy <= self.energies[0] {
            return self.losses[0];
        }
        if energy >= self.energies[last] {
            return self.losses[last];
        }

        //First sample strictly above energy; guaranteed to be in 1..=last by the checks above
        let upper = self.energies.partition_point(|sample| *sample <= energy);
        let lower = upper - 1;
        let fraction = (energy - self.energies[lower])/(self.energies[upper] - self.energies[lower]);
        self.losses[lower] + fraction*(self.losses[upper] - self.losses[lower])
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    /// Highest tabulated energy in MeV.
    pub fn max_energy(&self) -> f64 {
        self.energies[self.energies.len() - 1]
    }
}
