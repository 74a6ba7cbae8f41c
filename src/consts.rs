use super::*;

//Physical constants
///Fundamental charge in Coulombs.
pub const Q: f64 = 1.602176634E-19;
/// One MeV in Joules.
pub const MEV: f64 = 1E6*Q;
/// Vacuum permitivity in Farads/meter.
pub const EPS0: f64 = 8.8541878128E-12;
/// Electron mass in kilograms.
pub const ME: f64 = 9.1093837015E-31;
/// Speed of light in meters/second.
pub const C: f64 = 299792458.;
/// Avogadro's number in 1/mol.
pub const N_AVO: f64 = 6.02214076E23;
/// Proton rest energy in MeV. Used as the mass of one nucleon.
pub const P_MC2: f64 = 938.2720813;
/// Electron rest energy in MeV.
pub const E_MC2: f64 = 0.5109989461;
/// Bethe-Bloch electronic stopping prefactor, in SI units.
pub const BETHE_BLOCH_PREFACTOR: f64 = 4.*PI*(Q*Q/(4.*PI*EPS0))*(Q*Q/(4.*PI*EPS0))/ME/C/C;
/// Molar volume of an ideal gas at room temperature, in cm^3/mol.
pub const MOLAR_VOLUME: f64 = 24040.;
/// One standard atmosphere in Torr.
pub const ATM_TORR: f64 = 760.;

//Tracking defaults
/// Spatial step of the tracker, in meters.
pub const POS_STEP: f64 = 1E-3;
/// Maximum number of steps before a track is considered divergent.
pub const MAX_STEPS: usize = 10000;
/// Width of one energy bin of a boundary energy loss table, in MeV.
pub const ELOSS_BIN_WIDTH: f64 = 1E-3;
/// Chamber radius in meters.
pub const CHAMBER_RADIUS: f64 = 0.275;
/// Chamber length along the beam axis in meters.
pub const CHAMBER_LENGTH: f64 = 1.0;

//Fit parameter layout
/// Length of a parameter vector: x0, y0, z0, enu0, azi0, pol0, gain.
pub const NUM_PARAMS: usize = 7;
/// Number of columns of a point cloud: x, y, z and the auxiliary (charge) channel.
pub const POINT_COLUMNS: usize = 4;
