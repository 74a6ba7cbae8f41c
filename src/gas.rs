use super::*;

/// Detector fill gas.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Gas {
    /// Molar mass in g/mol.
    pub molar_mass: f64,
    /// Number of electrons per molecule.
    pub num_electrons: u32,
    /// Mean excitation potential in eV.
    pub mean_exc_pot: f64,
    /// Pressure in Torr.
    pub pressure: f64,
}

impl Gas {
    pub fn new(molar_mass: f64, num_electrons: u32, mean_exc_pot: f64, pressure: f64) -> McoptResult<Gas> {
        if !(molar_mass > 0.) | (num_electrons == 0) | !(mean_exc_pot > 0.) | !(pressure > 0.) {
            return Err(McoptError::InvalidParameter(format!(
                "gas parameters must be positive, got molar mass {} electrons {} I {} eV pressure {} Torr",
                molar_mass, num_electrons, mean_exc_pot, pressure)));
        }
        Ok(Gas {
            molar_mass,
            num_electrons,
            mean_exc_pot,
            pressure,
        })
    }

    /// Density in g/cm^3.
    pub fn density(&self) -> f64 {
        self.pressure/ATM_TORR*self.molar_mass/MOLAR_VOLUME
    }

    /// Electron density per cm^3.
    pub fn electron_density(&self) -> f64 {
        N_AVO*self.num_electrons as f64*self.density()/self.molar_mass
    }

    /// Electron density per m^3.
    pub fn electron_density_per_m3(&self) -> f64 {
        self.electron_density()*1E6
    }
}

/// Bethe stopping power in MeV/m of `gas` for `particle` at total kinetic energy `energy` in MeV.
///
/// A particle at rest has infinite stopping power, and one at beta = 1 has none.
pub fn bethe(particle: &Particle, gas: &Gas, energy: f64) -> f64 {
    let beta = particle.beta(energy);
    let beta_sq = beta*beta;

    if beta_sq == 0. {
        return f64::INFINITY;
    }
    if beta_sq >= 1. {
        return 0.;
    }

    let ne = gas.electron_density_per_m3();
    let z = particle.charge_num as f64;
    let I = gas.mean_exc_pot*1E-6;

    let log_term = (2.*E_MC2*beta_sq/(I*(1. - beta_sq))).ln();
    let dedx = BETHE_BLOCH_PREFACTOR*ne*z*z/beta_sq*(log_term - beta_sq);

    dedx/MEV
}

impl EnergyLossTable {
    /// Tabulate Bethe stopping in `gas` for `particle` from zero to `max_energy` MeV in steps of
    /// `bin_width` MeV.
    ///
    /// Below the Bragg maximum the formula is unphysical (it diverges and then turns negative),
    /// so those bins are held at the maximum.
    pub fn from_gas(particle: &Particle, gas: &Gas, max_energy: f64, bin_width: f64) -> McoptResult<EnergyLossTable> {
        if !(max_energy > 0.) | !(bin_width > 0.) | !max_energy.is_finite() {
            return Err(McoptError::InvalidParameter(format!(
                "energy grid must be positive, got max energy {} MeV bin width {} MeV", max_energy, bin_width)));
        }

        let num_bins = (max_energy/bin_width).ceil() as usize + 1;
        let mut losses: Vec<f64> = (0..num_bins)
            .map(|i| bethe(particle, gas, i as f64*bin_width))
            .collect();

        //Bragg maximum: the largest finite value on the grid
        let peak = losses.iter()
            .enumerate()
            .filter(|(_, loss)| loss.is_finite())
            .fold(0, |peak, (i, loss)| if (*loss > losses[peak]) | !losses[peak].is_finite() {i} else {peak});
        let peak_loss = losses[peak].max(0.);
        for loss in losses.iter_mut().take(peak) {
            *loss = peak_loss;
        }
        for loss in losses.iter_mut() {
            if !loss.is_finite() | (*loss < 0.) {
                *loss = 0.;
            }
        }

        EnergyLossTable::new(losses, bin_width)
    }
}
