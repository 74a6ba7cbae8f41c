use super::*;

/// Column indices of a track matrix.
pub mod columns {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const Z: usize = 2;
    pub const TIME: usize = 3;
    /// Kinetic energy per nucleon in MeV/u.
    pub const ENU: usize = 4;
    pub const AZI: usize = 5;
    pub const POL: usize = 6;
    pub const NUM_COLUMNS: usize = 7;
}

/// Ordered sequence of particle states from the initial condition to the stopping condition.
///
/// A track can only be produced by a `Tracker` and is never modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    particle: Particle,
    states: Vec<ParticleState>,
}

impl Track {
    pub(crate) fn new(particle: Particle, states: Vec<ParticleState>) -> Track {
        Track {
            particle,
            states,
        }
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn states(&self) -> &[ParticleState] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParticleState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&ParticleState> {
        self.states.last()
    }

    /// Total path length traversed, in meters.
    pub fn range(&self) -> f64 {
        self.states.last().map_or(0., |state| state.path_length)
    }

    /// Row-major matrix with one row per state and the columns listed in [`columns`].
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.states.len(), columns::NUM_COLUMNS), |(i, j)| {
            let state = &self.states[i];
            match j {
                columns::X => state.pos.x,
                columns::Y => state.pos.y,
                columns::Z => state.pos.z,
                columns::TIME => state.time,
                columns::ENU => state.energy_per_nucleon(&self.particle),
                columns::AZI => state.azimuth(),
                _ => state.polar(),
            }
        })
    }

    /// Row-major n x 4 point cloud of (x, y, z, charge) for comparison with detector hits.
    ///
    /// The charge channel is the number of ion pairs created on each step, `deposit/ioniz`, scaled
    /// by `gain`. `ioniz` is the gas ionization energy in eV.
    pub fn to_point_cloud(&self, ioniz: f64, gain: f64) -> Array2<f64> {
        Array2::from_shape_fn((self.states.len(), POINT_COLUMNS), |(i, j)| {
            let state = &self.states[i];
            match j {
                0 => state.pos.x,
                1 => state.pos.y,
                2 => state.pos.z,
                _ => state.deposit*1E6/ioniz*gain,
            }
        })
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a ParticleState;
    type IntoIter = std::slice::Iter<'a, ParticleState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
