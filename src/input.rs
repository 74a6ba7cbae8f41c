use super::*;

///This helper function is a workaround to issue #368 in serde
pub(crate) fn default_false() -> bool {
    false
}

///This helper function is a workaround to issue #368 in serde
fn default_true() -> bool {
    true
}

///This helper function is a workaround to issue #368 in serde
pub(crate) fn one_usize() -> usize {
    1
}

///This helper function is a workaround to issue #368 in serde
fn default_seed() -> u64 {
    0
}

///This helper function is a workaround to issue #368 in serde
fn default_bin_width() -> f64 {
    ELOSS_BIN_WIDTH
}

///This helper function is a workaround to issue #368 in serde
fn default_matcher() -> MatcherKind {
    MatcherKind::NEAREST_NEIGHBOR
}

///This helper function is a workaround to issue #368 in serde
fn default_sigma_schedule() -> SigmaScheduleKind {
    SigmaScheduleKind::GEOMETRIC
}

///This helper function is a workaround to issue #368 in serde
fn default_acceptance() -> AcceptanceKind {
    AcceptanceKind::RELATIVE_BAND{factor: 2.}
}

/// Run-level options.
#[derive(Deserialize, Clone)]
pub struct Options {
    pub name: String,
    #[serde(default = "one_usize")]
    pub num_threads: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_true")]
    pub write_files: bool,
    #[serde(default = "default_true")]
    pub progress: bool,
}

#[derive(Deserialize, Clone)]
pub struct ParticleParameters {
    pub mass_num: u32,
    pub charge_num: u32,
}

/// Electric field in V/m and magnetic field in T.
#[derive(Deserialize, Clone)]
pub struct FieldParameters {
    pub efield: [f64; 3],
    pub bfield: [f64; 3],
}

/// Source of the energy loss table.
#[derive(Deserialize, Clone)]
pub enum EnergyLossInput {
    /// Losses in MeV/m, one per energy bin of `bin_width` MeV starting at zero.
    TABLE{values: Vec<f64>, #[serde(default = "default_bin_width")] bin_width: f64},
    /// Bethe stopping in a gas, tabulated up to `max_energy` MeV.
    GAS{gas: Gas, max_energy: f64, #[serde(default = "default_bin_width")] bin_width: f64},
}

/// Initial search state and strategy selection.
#[derive(Deserialize, Clone)]
pub struct FitParameters {
    pub ctr0: Vec<f64>,
    pub sig0: Vec<f64>,
    #[serde(flatten)]
    pub search: MinimizeOptions,
    #[serde(default = "default_matcher")]
    pub matcher: MatcherKind,
    #[serde(default = "default_sigma_schedule")]
    pub sigma_schedule: SigmaScheduleKind,
    #[serde(default = "default_acceptance")]
    pub acceptance: AcceptanceKind,
}

/// Experimental points to fit.
#[derive(Deserialize, Clone)]
pub enum DataInput {
    /// Rows of (x, y, z, charge).
    POINTS{points: Vec<Vec<f64>>},
    /// Points generated by tracking the parameter vector `truth` with the configured tracker.
    SYNTHETIC{truth: Vec<f64>},
}

/// Mcopt's internal representation of an input file.
#[derive(Deserialize, Clone)]
pub struct Input {
    pub options: Options,
    pub particle: ParticleParameters,
    pub fields: FieldParameters,
    pub energy_loss: EnergyLossInput,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub minimizer: MinimizerConfig,
    pub fit: FitParameters,
    pub data: DataInput,
}

impl Input {
    pub fn parse(string: &str) -> anyhow::Result<Input> {
        toml::from_str(string).context("Could not parse TOML file.")
    }

    pub fn from_file(input_file: &str) -> anyhow::Result<Input> {
        let mut input_toml = String::new();
        let mut file = OpenOptions::new()
            .read(true)
            .open(input_file)
            .with_context(|| format!("Input error: could not open input file {}.", input_file))?;
        file.read_to_string(&mut input_toml).context("Could not convert TOML file to string.")?;
        Input::parse(&input_toml)
    }

    pub fn build_energy_loss(&self) -> McoptResult<EnergyLossTable> {
        match &self.energy_loss {
            EnergyLossInput::TABLE{values, bin_width} => EnergyLossTable::new(values.clone(), *bin_width),
            EnergyLossInput::GAS{gas, max_energy, bin_width} => {
                let particle = Particle::new(self.particle.mass_num, self.particle.charge_num)?;
                let gas = Gas::new(gas.molar_mass, gas.num_electrons, gas.mean_exc_pot, gas.pressure)?;
                EnergyLossTable::from_gas(&particle, &gas, *max_energy, *bin_width)
            }
        }
    }

    pub fn build_tracker(&self) -> McoptResult<Tracker> {
        Tracker::with_config(
            self.particle.mass_num,
            self.particle.charge_num,
            self.build_energy_loss()?,
            Vector::from(self.fields.efield),
            Vector::from(self.fields.bfield),
            self.tracker,
        )
    }

    pub fn build_minimizer(&self, tracker: Tracker) -> McoptResult<MCminimizer> {
        let mut config = self.minimizer;
        config.num_threads = self.options.num_threads;
        config.progress = self.options.progress;

        Ok(MCminimizer::with_config(tracker, config)?
            .with_matcher(self.fit.matcher.build())
            .with_schedule(self.fit.sigma_schedule.build())
            .with_acceptance(self.fit.acceptance.build()))
    }

    pub fn search_options(&self) -> MinimizeOptions {
        self.fit.search
    }

    /// The experimental point cloud, either read from the input or generated with `tracker`.
    pub fn true_values(&self, tracker: &Tracker) -> McoptResult<Array2<f64>> {
        match &self.data {
            DataInput::POINTS{points} => {
                if let Some(index) = points.iter().position(|point| point.len() != POINT_COLUMNS) {
                    return Err(McoptError::InvalidDimension(format!(
                        "data point {} has {} components, expected {}", index, points[index].len(), POINT_COLUMNS)));
                }
                Array2::from_shape_vec((points.len(), POINT_COLUMNS), points.concat())
                    .map_err(|err| McoptError::InvalidDimension(err.to_string()))
            },
            DataInput::SYNTHETIC{truth} => {
                if truth.len() != NUM_PARAMS {
                    return Err(McoptError::InvalidDimension(format!(
                        "synthetic truth must have {} components, got {}", NUM_PARAMS, truth.len())));
                }
                let track = tracker.track_particle(truth[0], truth[1], truth[2], truth[3], truth[4], truth[5])?;
                Ok(track.to_point_cloud(self.minimizer.ioniz, truth[6]))
            }
        }
    }
}
