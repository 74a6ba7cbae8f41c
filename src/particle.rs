use super::*;

/// Particle species: nucleon and charge numbers with the derived rest mass and charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub mass_num: u32,
    pub charge_num: u32,
    /// Rest energy in MeV.
    pub mass: f64,
    /// Charge in Coulombs.
    pub charge: f64,
}

impl Particle {
    pub fn new(mass_num: u32, charge_num: u32) -> McoptResult<Particle> {
        if mass_num == 0 {
            return Err(McoptError::InvalidParameter("mass number must be greater than zero".to_string()));
        }
        if charge_num == 0 {
            return Err(McoptError::InvalidParameter("charge number must be greater than zero".to_string()));
        }
        Ok(Particle {
            mass_num,
            charge_num,
            mass: mass_num as f64*P_MC2,
            charge: charge_num as f64*Q,
        })
    }

    /// Relativistic beta for a total kinetic energy in MeV.
    pub fn beta(&self, energy: f64) -> f64 {
        if energy <= 0. {
            return 0.;
        }
        let gamma = self.gamma(energy);
        (1. - 1./(gamma*gamma)).sqrt()
    }

    /// Lorentz factor for a total kinetic energy in MeV.
    pub fn gamma(&self, energy: f64) -> f64 {
        (energy + self.mass)/self.mass
    }

    /// Momentum magnitude in MeV/c for a total kinetic energy in MeV.
    pub fn momentum(&self, energy: f64) -> f64 {
        let total = energy + self.mass;
        (total*total - self.mass*self.mass).max(0.).sqrt()
    }

    /// Total kinetic energy in MeV for a momentum magnitude in MeV/c.
    pub fn energy_from_momentum(&self, momentum: f64) -> f64 {
        (momentum*momentum + self.mass*self.mass).sqrt() - self.mass
    }

    /// Radius of curvature in meters for a total kinetic energy in MeV in a field of `bmag` Tesla.
    pub fn gyroradius(&self, energy: f64, bmag: f64) -> f64 {
        self.momentum(energy)*1E6/(C*bmag*self.charge_num as f64)
    }
}

/// Snapshot of a particle at one step of a track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub pos: Vector,
    /// Unit vector along the momentum.
    pub dir: Vector,
    /// Total kinetic energy in MeV.
    pub energy: f64,
    /// Elapsed time in seconds.
    pub time: f64,
    /// Elapsed path length in meters.
    pub path_length: f64,
    /// Energy in MeV deposited in the gas on the step that produced this state.
    pub deposit: f64,
}

impl ParticleState {
    pub fn new(pos: Vector, energy: f64, azimuth: f64, polar: f64) -> ParticleState {
        ParticleState {
            pos,
            dir: Vector::from_angles(azimuth, polar),
            energy,
            time: 0.,
            path_length: 0.,
            deposit: 0.,
        }
    }

    pub fn azimuth(&self) -> f64 {
        self.dir.azimuth()
    }

    pub fn polar(&self) -> f64 {
        self.dir.polar()
    }

    /// Kinetic energy per nucleon in MeV/u.
    pub fn energy_per_nucleon(&self, particle: &Particle) -> f64 {
        self.energy/particle.mass_num as f64
    }

    /// Velocity in m/s.
    pub fn velocity(&self, particle: &Particle) -> Vector {
        self.dir.scale(particle.beta(self.energy)*C)
    }

    /// Momentum vector in MeV/c.
    pub fn momentum(&self, particle: &Particle) -> Vector {
        self.dir.scale(particle.momentum(self.energy))
    }
}
