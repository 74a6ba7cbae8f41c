#![allow(unused_variables)]
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

//! Monte Carlo fitting of charged-particle tracks to detector hits.
//!
//! A [`Tracker`] integrates the motion of an ion through constant electric and magnetic fields
//! with tabulated energy loss. An [`MCminimizer`] samples initial conditions around a shrinking
//! center, tracks each sample, and scores it against an experimental point cloud with
//! [`find_deviations`].
//!
//! All matrices are `ndarray` arrays in standard (row-major) layout: one point, state or
//! parameter vector per row.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

//Error handling crates
use anyhow::Context;
use thiserror::Error;

//Serializing/Deserializing crate
use serde::{Deserialize, Serialize};

//Arrays
use ndarray::prelude::*;

//Random numbers
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

//Parallelization
use rayon::prelude::*;

//Progress bar
use indicatif::{ProgressBar, ProgressStyle};

//Logging
use log::{debug, info, trace, warn};

//I/O
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::BufWriter;

//itertools
use itertools::Itertools;

//Math
use std::f64::consts::PI;

//Load internal modules
pub mod consts;
pub mod structs;
pub mod error;
pub mod eloss;
pub mod gas;
pub mod fields;
pub mod particle;
pub mod track;
pub mod tracker;
pub mod deviation;
pub mod strategy;
pub mod minimizer;
pub mod enums;
pub mod input;
pub mod output;
pub mod tests;

pub use crate::consts::*;
pub use crate::structs::*;
pub use crate::error::{McoptError, McoptResult};
pub use crate::eloss::EnergyLossTable;
pub use crate::gas::{Gas, bethe};
pub use crate::fields::{FieldModel, ChamberVolume};
pub use crate::particle::{Particle, ParticleState};
pub use crate::track::{Track, columns};
pub use crate::tracker::{Tracker, TrackerConfig};
pub use crate::deviation::{PointMatcher, NearestNeighbor, PathOrdered, DeviationBounds, charge_scale, find_deviations, find_deviations_with, chi_squared};
pub use crate::strategy::{SigmaSchedule, Geometric, Accelerating, AcceptanceRule, RelativeBand, StatisticalBand};
pub use crate::minimizer::{MCminimizer, MinimizerConfig, MinimizeOptions, MinimizeResult, MinimizeOutput};
pub use crate::enums::*;
pub use crate::input::Input;

use crate::error::try_reserve;
