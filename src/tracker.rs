use super::*;

fn default_pos_step() -> f64 {
    POS_STEP
}

fn default_max_steps() -> usize {
    MAX_STEPS
}

/// Integration options of a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Spatial step length in meters.
    #[serde(default = "default_pos_step")]
    pub pos_step: f64,
    /// Number of steps after which a track that has not stopped is divergent.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub volume: ChamberVolume,
}

impl Default for TrackerConfig {
    fn default() -> TrackerConfig {
        TrackerConfig {
            pos_step: POS_STEP,
            max_steps: MAX_STEPS,
            volume: ChamberVolume::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> McoptResult<()> {
        if !(self.pos_step > 0.) | !self.pos_step.is_finite() {
            return Err(McoptError::InvalidParameter(format!("pos_step must be positive, got {}", self.pos_step)));
        }
        if self.max_steps == 0 {
            return Err(McoptError::InvalidParameter("max_steps must be greater than zero".to_string()));
        }
        self.volume.validate()
    }
}

/// Integrates the motion of one particle species through constant fields with energy loss.
#[derive(Clone, Debug)]
pub struct Tracker {
    particle: Particle,
    eloss: EnergyLossTable,
    fields: FieldModel,
    config: TrackerConfig,
}

impl Tracker {
    /// Tracker with the default step, step bound and chamber volume.
    pub fn new(mass_num: u32, charge_num: u32, eloss: EnergyLossTable, efield: Vector, bfield: Vector) -> McoptResult<Tracker> {
        Tracker::with_config(mass_num, charge_num, eloss, efield, bfield, TrackerConfig::default())
    }

    pub fn with_config(mass_num: u32, charge_num: u32, eloss: EnergyLossTable, efield: Vector, bfield: Vector,
        config: TrackerConfig) -> McoptResult<Tracker> {

        let particle = Particle::new(mass_num, charge_num)?;
        let fields = FieldModel::new(efield, bfield)?;
        if eloss.is_empty() {
            return Err(McoptError::InvalidParameter("energy loss table is empty".to_string()));
        }
        config.validate()?;

        Ok(Tracker {
            particle,
            eloss,
            fields,
            config,
        })
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn eloss(&self) -> &EnergyLossTable {
        &self.eloss
    }

    pub fn fields(&self) -> &FieldModel {
        &self.fields
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Track a particle from position (m), energy per nucleon (MeV/u), azimuth and polar angle (rad).
    ///
    /// Fails with `SimulationDivergence` if the particle neither stops nor leaves the chamber within
    /// the step bound.
    pub fn track_particle(&self, x0: f64, y0: f64, z0: f64, enu0: f64, azi0: f64, pol0: f64) -> McoptResult<Track> {
        let (track, stop_reason) = self.trace(x0, y0, z0, enu0, azi0, pol0)?;
        match stop_reason {
            StopReason::STEP_LIMIT => Err(McoptError::SimulationDivergence { steps: self.config.max_steps }),
            _ => Ok(track),
        }
    }

    /// Track a particle and report why stepping halted. Reaching the step bound is not an error here.
    pub fn trace(&self, x0: f64, y0: f64, z0: f64, enu0: f64, azi0: f64, pol0: f64) -> McoptResult<(Track, StopReason)> {
        let initial = [x0, y0, z0, enu0, azi0, pol0];
        if let Some(index) = initial.iter().position(|value| !value.is_finite()) {
            return Err(McoptError::InvalidParameter(format!(
                "initial condition component {} is not finite: {:?}", index, initial)));
        }

        let mut state = ParticleState::new(Vector::new(x0, y0, z0), enu0*self.particle.mass_num as f64, azi0, pol0);
        let mut states: Vec<ParticleState> = Vec::new();
        try_reserve(&mut states, self.config.max_steps.min(1024) + 1)?;
        states.push(state);

        let mut stop_reason = StopReason::STEP_LIMIT;
        if !(state.energy > 0.) {
            stop_reason = StopReason::ENERGY_DEPLETED;
        } else {
            for _ in 0..self.config.max_steps {
                match self.step(&state) {
                    None => {
                        stop_reason = StopReason::ENERGY_DEPLETED;
                        break;
                    },
                    Some(next) => {
                        states.push(next);
                        state = next;
                        if !self.config.volume.inside(&state.pos) {
                            stop_reason = StopReason::LEFT_VOLUME;
                            break;
                        }
                    }
                }
            }
        }

        trace!("Track stopped after {} steps: {}", states.len() - 1, stop_reason);
        Ok((Track::new(self.particle, states), stop_reason))
    }

    /// Advance one spatial step with a relativistic Boris push. Returns None once the particle stops.
    fn step(&self, state: &ParticleState) -> Option<ParticleState> {
        let particle = &self.particle;
        let pos_step = self.config.pos_step;

        let beta = particle.beta(state.energy);
        if !(beta > 0.) {
            return None;
        }
        let dt = pos_step/(beta*C);
        let q = particle.charge_num as f64;

        //Half electric kick, in MeV/c
        let half_kick = self.fields.efield.scale(q*dt*C*1E-6/2.);
        let p_minus = state.momentum(particle).add(&half_kick);

        //Magnetic rotation
        let gamma = particle.gamma(particle.energy_from_momentum(p_minus.magnitude()));
        let t = self.fields.bfield.scale(q*dt*C*C*1E-6/(2.*gamma*particle.mass));
        let s = t.scale(2./(1. + t.dot(&t)));
        let p_prime = p_minus.add(&p_minus.cross(&t));
        let p_plus = p_minus.add(&p_prime.cross(&s)).add(&half_kick);

        let p_mag = p_plus.magnitude();
        let deposit = self.eloss.lookup(state.energy)*pos_step;
        let energy = particle.energy_from_momentum(p_mag) - deposit;
        if !(energy > 0.) | !(p_mag > 0.) {
            return None;
        }

        let mut dir = p_plus;
        dir.normalize();

        Some(ParticleState {
            pos: state.pos.add(&dir.scale(pos_step)),
            dir,
            energy,
            time: state.time + dt,
            path_length: state.path_length + pos_step,
            deposit,
        })
    }
}
