use super::*;

fn default_ioniz() -> f64 {
    30.
}

fn default_aux_weight() -> f64 {
    1E-2
}

fn default_sentinel_chi() -> f64 {
    1E30
}

fn default_sigma_floor() -> f64 {
    1E-6
}

/// Scoring and execution options of a minimizer.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct MinimizerConfig {
    /// Mean energy to create one ion pair in the gas, in eV.
    #[serde(default = "default_ioniz")]
    pub ioniz: f64,
    /// Weight of the charge channel in chi, in m^2 per squared relative charge residual. At the
    /// default a 10% charge mismatch costs as much as a 1 cm spatial one.
    #[serde(default = "default_aux_weight")]
    pub aux_weight: f64,
    #[serde(default)]
    pub bounds: DeviationBounds,
    /// Finite chi assigned to candidates whose track or score fails.
    #[serde(default = "default_sentinel_chi")]
    pub sentinel_chi: f64,
    /// Smallest sigma as a fraction of the initial sigma.
    #[serde(default = "default_sigma_floor")]
    pub sigma_floor: f64,
    /// Threads used to score the candidates of one iteration.
    #[serde(skip, default = "crate::input::one_usize")]
    pub num_threads: usize,
    /// Show a progress bar over iterations.
    #[serde(skip, default = "crate::input::default_false")]
    pub progress: bool,
}

impl Default for MinimizerConfig {
    fn default() -> MinimizerConfig {
        MinimizerConfig {
            ioniz: default_ioniz(),
            aux_weight: default_aux_weight(),
            bounds: DeviationBounds::default(),
            sentinel_chi: default_sentinel_chi(),
            sigma_floor: default_sigma_floor(),
            num_threads: 1,
            progress: false,
        }
    }
}

impl MinimizerConfig {
    pub fn validate(&self) -> McoptResult<()> {
        if !(self.ioniz > 0.) | !self.ioniz.is_finite() {
            return Err(McoptError::InvalidParameter(format!("ioniz must be positive, got {}", self.ioniz)));
        }
        if !(self.aux_weight >= 0.) | !self.aux_weight.is_finite() {
            return Err(McoptError::InvalidParameter(format!("aux_weight must be non-negative, got {}", self.aux_weight)));
        }
        if !(self.bounds.spatial > 0.) | !(self.bounds.aux > 0.) {
            return Err(McoptError::InvalidParameter("deviation bounds must be positive".to_string()));
        }
        if !(self.sentinel_chi > 0.) | !self.sentinel_chi.is_finite() {
            return Err(McoptError::InvalidParameter(format!("sentinel_chi must be positive and finite, got {}", self.sentinel_chi)));
        }
        if !(self.sigma_floor > 0.) | !(self.sigma_floor <= 1.) {
            return Err(McoptError::InvalidParameter(format!("sigma_floor must be in (0, 1], got {}", self.sigma_floor)));
        }
        if self.num_threads == 0 {
            return Err(McoptError::InvalidParameter("num_threads must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn default_num_iters() -> usize {
    10
}

fn default_num_pts() -> usize {
    200
}

fn default_red_factor() -> f64 {
    0.8
}

/// Per-call search options.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct MinimizeOptions {
    #[serde(default = "default_num_iters")]
    pub num_iters: usize,
    #[serde(default = "default_num_pts")]
    pub num_pts: usize,
    #[serde(default = "default_red_factor")]
    pub red_factor: f64,
    /// Return the full search history instead of only the best center and its chi.
    #[serde(default = "crate::input::default_false")]
    pub details: bool,
}

impl Default for MinimizeOptions {
    fn default() -> MinimizeOptions {
        MinimizeOptions {
            num_iters: default_num_iters(),
            num_pts: default_num_pts(),
            red_factor: default_red_factor(),
            details: false,
        }
    }
}

/// Full history of a search. Matrices are row-major with one parameter vector per row.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimizeResult {
    /// Best parameter vector of the last completed iteration.
    pub center: Array1<f64>,
    /// Every sampled parameter vector, iteration-major then candidate-major.
    pub all_params: Array2<f64>,
    /// Chi of every row of `all_params`.
    pub all_chis: Array1<f64>,
    /// Minimum chi of each iteration.
    pub min_chis: Array1<f64>,
    /// Rows of `all_params` accepted as good fits.
    pub good_param_indices: Vec<usize>,
    /// Sigma used in each iteration.
    pub sigmas: Array2<f64>,
    pub iterations_completed: usize,
}

impl MinimizeResult {
    /// Minimum chi of the last completed iteration.
    pub fn last_chi(&self) -> f64 {
        self.min_chis[self.min_chis.len() - 1]
    }
}

/// Result of `MCminimizer::minimize_output`, shaped by the `details` option.
#[derive(Clone, Debug, PartialEq)]
pub enum MinimizeOutput {
    Summary { center: Array1<f64>, last_chi: f64 },
    Detailed(MinimizeResult),
}

impl MinimizeOutput {
    pub fn center(&self) -> &Array1<f64> {
        match self {
            MinimizeOutput::Summary{center, ..} => center,
            MinimizeOutput::Detailed(result) => &result.center,
        }
    }

    pub fn last_chi(&self) -> f64 {
        match self {
            MinimizeOutput::Summary{last_chi, ..} => *last_chi,
            MinimizeOutput::Detailed(result) => result.last_chi(),
        }
    }
}

/// Monte Carlo minimizer: samples initial conditions around a shrinking center, tracks each
/// sample and keeps the one whose track best matches the experimental points.
///
/// This is a greedy single-best-point search. It is fast but can settle in a local minimum of a
/// multi-modal chi surface.
pub struct MCminimizer {
    tracker: Tracker,
    config: MinimizerConfig,
    matcher: Box<dyn PointMatcher>,
    schedule: Box<dyn SigmaSchedule>,
    acceptance: Box<dyn AcceptanceRule>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl MCminimizer {
    pub fn new(tracker: Tracker) -> MCminimizer {
        MCminimizer {
            tracker,
            config: MinimizerConfig::default(),
            matcher: Box::new(NearestNeighbor),
            schedule: Box::new(Geometric),
            acceptance: Box::new(RelativeBand::default()),
            cancel_flag: None,
        }
    }

    pub fn with_config(tracker: Tracker, config: MinimizerConfig) -> McoptResult<MCminimizer> {
        config.validate()?;
        let mut minimizer = MCminimizer::new(tracker);
        minimizer.config = config;
        Ok(minimizer)
    }

    pub fn with_matcher(mut self, matcher: Box<dyn PointMatcher>) -> MCminimizer {
        self.matcher = matcher;
        self
    }

    pub fn with_schedule(mut self, schedule: Box<dyn SigmaSchedule>) -> MCminimizer {
        self.schedule = schedule;
        self
    }

    pub fn with_acceptance(mut self, acceptance: Box<dyn AcceptanceRule>) -> MCminimizer {
        self.acceptance = acceptance;
        self
    }

    /// Stop the search before the next iteration once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> MCminimizer {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn config(&self) -> &MinimizerConfig {
        &self.config
    }

    /// Run a search with a generator seeded from `seed`.
    pub fn minimize_seeded(&self, ctr0: ArrayView1<f64>, sig0: ArrayView1<f64>, true_values: ArrayView2<f64>,
        options: &MinimizeOptions, seed: u64) -> McoptResult<MinimizeResult> {

        let mut rng = StdRng::seed_from_u64(seed);
        self.minimize(ctr0, sig0, true_values, options, &mut rng)
    }

    /// Run a search and return either the full history or only the best center and its chi,
    /// according to `options.details`.
    pub fn minimize_output<R: Rng + ?Sized>(&self, ctr0: ArrayView1<f64>, sig0: ArrayView1<f64>, true_values: ArrayView2<f64>,
        options: &MinimizeOptions, rng: &mut R) -> McoptResult<MinimizeOutput> {

        let result = self.minimize(ctr0, sig0, true_values, options, rng)?;
        if options.details {
            Ok(MinimizeOutput::Detailed(result))
        } else {
            let last_chi = result.last_chi();
            Ok(MinimizeOutput::Summary { center: result.center, last_chi })
        }
    }

    /// Search for the parameter vector whose track best matches `true_values`.
    ///
    /// `ctr0` and `sig0` are 7-vectors (x0, y0, z0, enu0, azi0, pol0, gain); `true_values` is an
    /// n x 4 matrix of (x, y, z, charge). Random numbers are drawn from `rng` iteration-major,
    /// then candidate-major, then dimension-major, one standard normal per component, before the
    /// candidates of an iteration are scored, so the result depends only on the generator state
    /// and not on the number of threads.
    pub fn minimize<R: Rng + ?Sized>(&self, ctr0: ArrayView1<f64>, sig0: ArrayView1<f64>, true_values: ArrayView2<f64>,
        options: &MinimizeOptions, rng: &mut R) -> McoptResult<MinimizeResult> {

        check_search_inputs(&ctr0, &sig0, &true_values, options)?;

        let num_iters = options.num_iters;
        let num_pts = options.num_pts;
        let total_pts = num_iters.checked_mul(num_pts)
            .ok_or(McoptError::AllocationFailure(usize::MAX))?;

        let mut all_params: Vec<f64> = Vec::new();
        try_reserve(&mut all_params, total_pts.checked_mul(NUM_PARAMS).ok_or(McoptError::AllocationFailure(usize::MAX))?)?;
        let mut all_chis: Vec<f64> = Vec::new();
        try_reserve(&mut all_chis, total_pts)?;
        let mut sigma_history: Vec<f64> = Vec::new();
        try_reserve(&mut sigma_history, num_iters*NUM_PARAMS)?;
        let mut min_chis: Vec<f64> = Vec::with_capacity(num_iters);
        let mut good_param_indices: Vec<usize> = Vec::new();

        let pool = if self.config.num_threads > 1 {
            Some(rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()
                .map_err(|err| McoptError::InvalidParameter(format!("could not build thread pool: {}", err)))?)
        } else {
            None
        };

        let bar = if self.config.progress {
            let bar = ProgressBar::new(num_iters as u64);
            bar.set_style(ProgressStyle::default_bar()
                .template("[{elapsed_precise}][{bar:40.cyan/blue}][{eta_precise}] {percent}%")
                .progress_chars("#>-"));
            bar
        } else {
            ProgressBar::hidden()
        };

        info!("Starting Monte Carlo search: {} iterations of {} points, reduction factor {}.",
            num_iters, num_pts, options.red_factor);

        let mut ctr = ctr0.to_owned();
        let mut sigma = sig0.to_owned();
        let mut iterations_completed = 0;

        for iteration in 0..num_iters {
            if self.cancelled() {
                if iteration == 0 {
                    return Err(McoptError::Cancelled);
                }
                warn!("Search cancelled after {} of {} iterations.", iteration, num_iters);
                break;
            }

            let candidates = draw_candidates(&ctr, &sigma, num_pts, rng);
            let chis = self.score_candidates(&candidates, &true_values, pool.as_ref());

            //Lowest index wins ties
            let (best, min_chi) = chis.iter().copied().enumerate()
                .fold((0, f64::INFINITY), |(best, min_chi), (index, chi)| if chi < min_chi {(index, chi)} else {(best, min_chi)});

            let num_sentinels = chis.iter().filter(|chi| **chi >= self.config.sentinel_chi).count();
            if num_sentinels > 0 {
                warn!("Iteration {}: {} of {} candidates could not be scored.", iteration, num_sentinels, num_pts);
            }

            let offset = all_chis.len();
            good_param_indices.extend(self.acceptance.accept(&chis, self.config.sentinel_chi).into_iter().map(|index| offset + index));
            for candidate in candidates.iter() {
                all_params.extend_from_slice(candidate);
            }
            all_chis.extend_from_slice(&chis);
            sigma_history.extend(sigma.iter());
            min_chis.push(min_chi);

            ctr = Array1::from(candidates[best].to_vec());

            debug!("Iteration {}: min chi = {:e}, center = {}", iteration, min_chi, ctr);

            sigma = self.shrink(&sigma, &sig0, options.red_factor, iteration);
            iterations_completed += 1;
            bar.inc(1);
        }

        bar.finish();
        info!("Finished Monte Carlo search: min chi = {:e}.", min_chis[min_chis.len() - 1]);

        let num_rows = all_chis.len();
        Ok(MinimizeResult {
            center: ctr,
            all_params: into_matrix(all_params, num_rows)?,
            all_chis: Array1::from(all_chis),
            min_chis: Array1::from(min_chis),
            good_param_indices,
            sigmas: into_matrix(sigma_history, iterations_completed)?,
            iterations_completed,
        })
    }

    /// Chi of one candidate parameter vector, or the sentinel if it cannot be scored.
    pub fn candidate_chi(&self, params: &[f64; NUM_PARAMS], true_values: &ArrayView2<f64>) -> f64 {
        let score = self.tracker.track_particle(params[0], params[1], params[2], params[3], params[4], params[5])
            .and_then(|track| {
                let sim = track.to_point_cloud(self.config.ioniz, params[6]);
                find_deviations_with(sim.view(), true_values.view(), self.matcher.as_ref(), &self.config.bounds)
            })
            .map(|deviations| chi_squared(&deviations, charge_scale(true_values.view()), self.config.aux_weight));

        match score {
            Ok(chi) if chi.is_finite() => chi.min(self.config.sentinel_chi),
            Ok(chi) => {
                debug!("Candidate {:?} produced non-finite chi {}.", params, chi);
                self.config.sentinel_chi
            },
            Err(err) => {
                debug!("Candidate {:?} failed: {}", params, err);
                self.config.sentinel_chi
            }
        }
    }

    fn score_candidates(&self, candidates: &[[f64; NUM_PARAMS]], true_values: &ArrayView2<f64>,
        pool: Option<&rayon::ThreadPool>) -> Vec<f64> {

        match pool {
            Some(pool) => pool.install(|| {
                candidates.par_iter()
                    .map(|candidate| self.candidate_chi(candidate, true_values))
                    .collect()
            }),
            None => candidates.iter()
                .map(|candidate| self.candidate_chi(candidate, true_values))
                .collect(),
        }
    }

    fn shrink(&self, sigma: &Array1<f64>, sig0: &ArrayView1<f64>, red_factor: f64, iteration: usize) -> Array1<f64> {
        let next = self.schedule.next_sigma(sigma, red_factor, iteration);
        Array1::from_shape_fn(NUM_PARAMS, |d| {
            if sig0[d] > 0. {
                next[d].max(sig0[d]*self.config.sigma_floor)
            } else {
                0.
            }
        })
    }

    fn cancelled(&self) -> bool {
        self.cancel_flag.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

fn check_search_inputs(ctr0: &ArrayView1<f64>, sig0: &ArrayView1<f64>, true_values: &ArrayView2<f64>,
    options: &MinimizeOptions) -> McoptResult<()> {

    if ctr0.len() != NUM_PARAMS {
        return Err(McoptError::InvalidDimension(format!("ctr0 must have {} components, got {}", NUM_PARAMS, ctr0.len())));
    }
    if sig0.len() != NUM_PARAMS {
        return Err(McoptError::InvalidDimension(format!("sig0 must have {} components, got {}", NUM_PARAMS, sig0.len())));
    }
    let (num_points, num_columns) = true_values.dim();
    if num_columns != POINT_COLUMNS {
        return Err(McoptError::InvalidDimension(format!("true_values must have {} columns, got {}", POINT_COLUMNS, num_columns)));
    }
    if num_points == 0 {
        return Err(McoptError::InvalidDimension("true_values must have at least one row".to_string()));
    }
    if options.num_iters == 0 {
        return Err(McoptError::InvalidParameter("num_iters must be greater than zero".to_string()));
    }
    if options.num_pts == 0 {
        return Err(McoptError::InvalidParameter("num_pts must be greater than zero".to_string()));
    }
    if !(options.red_factor > 0.) | !(options.red_factor <= 1.) {
        return Err(McoptError::InvalidParameter(format!("red_factor must be in (0, 1], got {}", options.red_factor)));
    }
    if ctr0.iter().any(|value| !value.is_finite()) {
        return Err(McoptError::InvalidParameter(format!("ctr0 must be finite, got {}", ctr0)));
    }
    if sig0.iter().any(|value| !value.is_finite() | (*value < 0.)) {
        return Err(McoptError::InvalidParameter(format!("sig0 must be finite and non-negative, got {}", sig0)));
    }
    Ok(())
}

/// Candidates `ctr + sigma*z` with one standard normal `z` per component, candidate-major then
/// dimension-major.
fn draw_candidates<R: Rng + ?Sized>(ctr: &Array1<f64>, sigma: &Array1<f64>, num_pts: usize, rng: &mut R) -> Vec<[f64; NUM_PARAMS]> {
    (0..num_pts)
        .map(|_| {
            let mut candidate = [0.; NUM_PARAMS];
            for (d, value) in candidate.iter_mut().enumerate() {
                let z: f64 = rng.sample(StandardNormal);
                *value = ctr[d] + sigma[d]*z;
            }
            candidate
        })
        .collect()
}

fn into_matrix(values: Vec<f64>, num_rows: usize) -> McoptResult<Array2<f64>> {
    Array2::from_shape_vec((num_rows, NUM_PARAMS), values)
        .map_err(|err| McoptError::InvalidDimension(err.to_string()))
}
