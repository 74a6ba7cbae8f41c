use super::*;

/// Reason a tracker stopped stepping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Kinetic energy reached zero.
    ENERGY_DEPLETED,
    /// The particle left the chamber volume.
    LEFT_VOLUME,
    /// The step bound was reached without a natural stop.
    STEP_LIMIT,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StopReason::ENERGY_DEPLETED => write!(f, "particle stopped"),
            StopReason::LEFT_VOLUME => write!(f, "particle left chamber"),
            StopReason::STEP_LIMIT => write!(f, "step limit reached"),
        }
    }
}

/// Rule matching experimental points to simulated points.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Copy)]
pub enum MatcherKind {
    /// Spatially nearest simulated point.
    NEAREST_NEIGHBOR,
    /// Simulated point at the same relative position along the track.
    PATH_ORDERED,
}

impl MatcherKind {
    pub fn build(&self) -> Box<dyn PointMatcher> {
        match *self {
            MatcherKind::NEAREST_NEIGHBOR => Box::new(NearestNeighbor),
            MatcherKind::PATH_ORDERED => Box::new(PathOrdered),
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MatcherKind::NEAREST_NEIGHBOR => write!(f, "Nearest-neighbor point matching"),
            MatcherKind::PATH_ORDERED => write!(f, "Path-ordered point matching"),
        }
    }
}

/// Sigma reduction schedule.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Copy)]
pub enum SigmaScheduleKind {
    /// sigma *= red_factor once per iteration, so iteration k uses sig0*red_factor^k.
    GEOMETRIC,
    /// sigma *= red_factor^(iteration + 1), so iteration k uses sig0*red_factor^(k*(k+1)/2).
    ACCELERATING,
}

impl SigmaScheduleKind {
    pub fn build(&self) -> Box<dyn SigmaSchedule> {
        match *self {
            SigmaScheduleKind::GEOMETRIC => Box::new(Geometric),
            SigmaScheduleKind::ACCELERATING => Box::new(Accelerating),
        }
    }
}

impl fmt::Display for SigmaScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SigmaScheduleKind::GEOMETRIC => write!(f, "Geometric sigma reduction"),
            SigmaScheduleKind::ACCELERATING => write!(f, "Accelerating sigma reduction"),
        }
    }
}

/// Selection of good parameter sets within one iteration.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Copy)]
pub enum AcceptanceKind {
    /// chi <= factor*min_chi
    RELATIVE_BAND{factor: f64},
    /// chi <= min_chi + num_std*std(chi)
    STATISTICAL_BAND{num_std: f64},
}

impl AcceptanceKind {
    pub fn build(&self) -> Box<dyn AcceptanceRule> {
        match *self {
            AcceptanceKind::RELATIVE_BAND{factor} => Box::new(RelativeBand {factor}),
            AcceptanceKind::STATISTICAL_BAND{num_std} => Box::new(StatisticalBand {num_std}),
        }
    }
}

impl fmt::Display for AcceptanceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AcceptanceKind::RELATIVE_BAND{factor} => write!(f, "Good fits within {} times the minimum chi", factor),
            AcceptanceKind::STATISTICAL_BAND{num_std} => write!(f, "Good fits within {} standard deviations of the minimum chi", num_std),
        }
    }
}
