use super::*;

/// Chooses, for every experimental point, the simulated sample it is compared against.
pub trait PointMatcher: Send + Sync {
    /// One index into the rows of `sim` for each row of `exp`. `sim` has at least one row.
    fn match_points(&self, sim: ArrayView2<f64>, exp: ArrayView2<f64>) -> Vec<usize>;
}

/// Matches each experimental point to the spatially nearest simulated sample (first on ties).
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestNeighbor;

impl PointMatcher for NearestNeighbor {
    fn match_points(&self, sim: ArrayView2<f64>, exp: ArrayView2<f64>) -> Vec<usize> {
        exp.outer_iter()
            .map(|exp_point| {
                let mut best_index = 0;
                let mut best_distance = f64::INFINITY;
                for (index, sim_point) in sim.outer_iter().enumerate() {
                    let dx = exp_point[0] - sim_point[0];
                    let dy = exp_point[1] - sim_point[1];
                    let dz = exp_point[2] - sim_point[2];
                    let distance = dx*dx + dy*dy + dz*dz;
                    if distance < best_distance {
                        best_distance = distance;
                        best_index = index;
                    }
                }
                best_index
            })
            .collect()
    }
}

/// Aligns both clouds by relative position along their row order. Experimental points must be
/// sorted along the track.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathOrdered;

impl PointMatcher for PathOrdered {
    fn match_points(&self, sim: ArrayView2<f64>, exp: ArrayView2<f64>) -> Vec<usize> {
        let (num_sim, _) = sim.dim();
        let (num_exp, _) = exp.dim();
        if num_exp <= 1 {
            return vec![0; num_exp];
        }
        let scale = (num_sim - 1) as f64/(num_exp - 1) as f64;
        (0..num_exp).map(|i| ((i as f64*scale).round() as usize).min(num_sim - 1)).collect()
    }
}

fn default_spatial_bound() -> f64 {
    0.1
}

fn default_aux_bound() -> f64 {
    1.
}

/// Largest residual a single experimental point can contribute.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct DeviationBounds {
    /// Maximum spatial distance in meters.
    #[serde(default = "default_spatial_bound")]
    pub spatial: f64,
    /// Maximum absolute residual of the auxiliary channel, in units of the experimental charge
    /// scale (see [`charge_scale`]).
    #[serde(default = "default_aux_bound")]
    pub aux: f64,
}

impl Default for DeviationBounds {
    fn default() -> DeviationBounds {
        DeviationBounds {
            spatial: default_spatial_bound(),
            aux: default_aux_bound(),
        }
    }
}

/// Mean absolute auxiliary value of a point cloud, or 1 if it has none. Charge residuals are
/// measured in this unit so that chi does not depend on the units of the charge channel.
pub fn charge_scale(cloud: ArrayView2<f64>) -> f64 {
    let (num_points, num_columns) = cloud.dim();
    if (num_points == 0) | (num_columns < POINT_COLUMNS) {
        return 1.;
    }
    let scale = cloud.column(3).iter().map(|value| value.abs()).sum::<f64>()/num_points as f64;
    if (scale > 0.) & scale.is_finite() {scale} else {1.}
}

fn check_point_cloud(cloud: &ArrayView2<f64>, name: &str) -> McoptResult<()> {
    let (_, num_columns) = cloud.dim();
    if num_columns != POINT_COLUMNS {
        return Err(McoptError::InvalidDimension(format!(
            "{} point cloud must have {} columns, got {}", name, POINT_COLUMNS, num_columns)));
    }
    Ok(())
}

/// Residuals `exp - sim` of every experimental point against its nearest simulated point.
///
/// Both inputs are n x 4 matrices of (x, y, z, aux). The result has one row per experimental point.
pub fn find_deviations(sim: ArrayView2<f64>, exp: ArrayView2<f64>) -> McoptResult<Array2<f64>> {
    find_deviations_with(sim, exp, &NearestNeighbor, &DeviationBounds::default())
}

/// Residuals of every experimental point using the given matching rule and penalty bounds.
///
/// The auxiliary residual is clamped to `bounds.aux` times the charge scale of `exp`.
pub fn find_deviations_with(sim: ArrayView2<f64>, exp: ArrayView2<f64>, matcher: &dyn PointMatcher,
    bounds: &DeviationBounds) -> McoptResult<Array2<f64>> {

    check_point_cloud(&sim, "simulated")?;
    check_point_cloud(&exp, "experimental")?;

    let (num_sim, _) = sim.dim();
    let (num_exp, _) = exp.dim();
    let aux_bound = bounds.aux*charge_scale(exp);
    let mut deviations = Array2::<f64>::zeros((num_exp, POINT_COLUMNS));

    //Nothing to match against: every point gets the full spatial penalty
    if num_sim == 0 {
        let component = bounds.spatial/3_f64.sqrt();
        for i in 0..num_exp {
            deviations[[i, 0]] = component;
            deviations[[i, 1]] = component;
            deviations[[i, 2]] = component;
            deviations[[i, 3]] = exp[[i, 3]].max(-aux_bound).min(aux_bound);
        }
        return Ok(deviations);
    }

    let matches = matcher.match_points(sim, exp);
    if matches.len() != num_exp {
        return Err(McoptError::InvalidDimension(format!(
            "point matcher returned {} matches for {} experimental points", matches.len(), num_exp)));
    }

    for (i, j) in matches.into_iter().enumerate() {
        if j >= num_sim {
            return Err(McoptError::InvalidDimension(format!(
                "point matcher returned index {} for a simulated cloud of {} points", j, num_sim)));
        }
        let mut dx = exp[[i, 0]] - sim[[j, 0]];
        let mut dy = exp[[i, 1]] - sim[[j, 1]];
        let mut dz = exp[[i, 2]] - sim[[j, 2]];
        let da = exp[[i, 3]] - sim[[j, 3]];

        let distance = (dx*dx + dy*dy + dz*dz).sqrt();
        if distance > bounds.spatial {
            let scale = bounds.spatial/distance;
            dx *= scale;
            dy *= scale;
            dz *= scale;
        }

        deviations[[i, 0]] = dx;
        deviations[[i, 1]] = dy;
        deviations[[i, 2]] = dz;
        deviations[[i, 3]] = da.max(-aux_bound).min(aux_bound);
    }

    Ok(deviations)
}

/// Reduce a residual matrix to one score: mean squared spatial residual in m^2 plus `aux_weight`
/// times the mean squared auxiliary residual measured in units of `aux_scale`.
pub fn chi_squared(deviations: &Array2<f64>, aux_scale: f64, aux_weight: f64) -> f64 {
    let (num_points, _) = deviations.dim();
    if num_points == 0 {
        return 0.;
    }

    let (position_sum, aux_sum) = deviations.outer_iter()
        .fold((0., 0.), |(position_sum, aux_sum), row| {
            (position_sum + row[0]*row[0] + row[1]*row[1] + row[2]*row[2], aux_sum + row[3]*row[3])
        });

    let position_chi = position_sum/num_points as f64;
    if aux_weight == 0. {
        position_chi
    } else {
        position_chi + aux_weight*aux_sum/(aux_scale*aux_scale*num_points as f64)
    }
}
