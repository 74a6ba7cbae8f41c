#[cfg(test)]
use super::*;
#[cfg(test)]
use float_cmp::approx_eq;
#[cfg(test)]
use ndarray::array;

#[cfg(test)]
const TRUTH: [f64; NUM_PARAMS] = [0., 0., 0.5, 1., 0., PI/2., 1.];

#[cfg(test)]
fn constant_loss(loss: f64) -> EnergyLossTable {
    EnergyLossTable::new(vec![loss, loss], 1.).unwrap()
}

#[cfg(test)]
fn stopping_tracker() -> Tracker {
    //1 MeV proton losing 10 MeV/m stops after about 100 steps of 1 mm
    Tracker::new(1, 1, constant_loss(10.), Vector::zero(), Vector::new(0., 0., 1.)).unwrap()
}

#[cfg(test)]
fn free_tracker(max_steps: usize) -> Tracker {
    let config = TrackerConfig {
        max_steps,
        ..TrackerConfig::default()
    };
    Tracker::with_config(1, 1, constant_loss(0.), Vector::zero(), Vector::zero(), config).unwrap()
}

#[cfg(test)]
fn truth_cloud(tracker: &Tracker) -> Array2<f64> {
    tracker.track_particle(TRUTH[0], TRUTH[1], TRUTH[2], TRUTH[3], TRUTH[4], TRUTH[5])
        .unwrap()
        .to_point_cloud(MinimizerConfig::default().ioniz, TRUTH[6])
}

#[cfg(test)]
fn bragg_tracker() -> Tracker {
    //Loss rising toward the end of the track, so the charge profile depends on the energy
    let eloss = EnergyLossTable::from_samples(vec![0., 0.25, 0.5, 1., 2.], vec![30., 20., 14., 9., 6.]).unwrap();
    Tracker::new(1, 1, eloss, Vector::zero(), Vector::new(0., 0., 1.)).unwrap()
}

#[cfg(test)]
fn search_sigma() -> Array1<f64> {
    array![0.005, 0.005, 0.005, 0.05, 0.05, 0.05, 0.1]
}

#[test]
fn test_energy_loss_lookup() {
    let table = EnergyLossTable::new(vec![0., 10., 20.], 1.).unwrap();

    assert_eq!(table.len(), 3);
    assert!(approx_eq!(f64, table.max_energy(), 2., epsilon = 1E-12));
    assert!(approx_eq!(f64, table.lookup(0.5), 5., epsilon = 1E-12));
    assert!(approx_eq!(f64, table.lookup(1.25), 12.5, epsilon = 1E-12));
    assert!(approx_eq!(f64, table.lookup(1.), 10., epsilon = 1E-12));

    //Held at the ends of the table
    assert!(approx_eq!(f64, table.lookup(-1.), 0., epsilon = 1E-12));
    assert!(approx_eq!(f64, table.lookup(5.), 20., epsilon = 1E-12));

    let bins = EnergyLossTable::from_bins(vec![1., 2.]).unwrap();
    assert!(approx_eq!(f64, bins.energies()[1], ELOSS_BIN_WIDTH, epsilon = 1E-15));
    assert!(approx_eq!(f64, bins.lookup(ELOSS_BIN_WIDTH/2.), 1.5, epsilon = 1E-12));
}

#[test]
fn test_energy_loss_validation() {
    assert!(matches!(EnergyLossTable::new(vec![], 1.), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(EnergyLossTable::new(vec![1., -1.], 1.), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(EnergyLossTable::new(vec![1., f64::NAN], 1.), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(EnergyLossTable::new(vec![1., 2.], 0.), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(EnergyLossTable::from_samples(vec![0., 1.], vec![1.]), Err(McoptError::InvalidDimension(_))));
    assert!(matches!(EnergyLossTable::from_samples(vec![0., 2., 1.], vec![1., 1., 1.]), Err(McoptError::InvalidParameter(_))));

    let tracker = Tracker::new(1, 1, constant_loss(1.), Vector::zero(), Vector::new(f64::NAN, 0., 0.));
    assert!(matches!(tracker, Err(McoptError::InvalidParameter(_))));
}

#[test]
fn test_bethe_table() {
    //Helium at 150 Torr
    let particle = Particle::new(1, 1).unwrap();
    let gas = Gas::new(4.002, 2, 41.8, 150.).unwrap();

    assert!(bethe(&particle, &gas, 0.).is_infinite());
    assert!(bethe(&particle, &gas, 1.) > bethe(&particle, &gas, 5.));
    assert!(approx_eq!(f64, gas.density(), 150./760.*4.002/24040., epsilon = 1E-15));

    let table = EnergyLossTable::from_gas(&particle, &gas, 10., 1E-3).unwrap();
    assert!(table.max_energy() >= 10. - 1E-9);
    assert!(table.losses().iter().all(|loss| loss.is_finite() & (*loss >= 0.)));
    assert!(table.lookup(0.) > 0.);
    assert!(table.lookup(1.) > table.lookup(9.));

    assert!(matches!(Gas::new(4.002, 0, 41.8, 150.), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(EnergyLossTable::from_gas(&particle, &gas, -1., 1E-3), Err(McoptError::InvalidParameter(_))));
}

#[test]
fn test_particle_validation() {
    assert!(matches!(Tracker::new(0, 1, constant_loss(1.), Vector::zero(), Vector::zero()), Err(McoptError::InvalidParameter(_))));
    assert!(matches!(Tracker::new(1, 0, constant_loss(1.), Vector::zero(), Vector::zero()), Err(McoptError::InvalidParameter(_))));

    let particle = Particle::new(4, 2).unwrap();
    assert!(approx_eq!(f64, particle.mass, 4.*P_MC2, epsilon = 1E-9));
    assert!(approx_eq!(f64, particle.energy_from_momentum(particle.momentum(12.)), 12., epsilon = 1E-9));
    assert!(particle.beta(12.) < particle.beta(40.));
    assert_eq!(particle.beta(0.), 0.);
}

#[test]
fn test_circular_orbit() {
    //0.5 MeV proton in 1 T along z, launched along x in the x-y plane
    let config = TrackerConfig {
        max_steps: 500,
        ..TrackerConfig::default()
    };
    let bfield = 1.;
    let energy = 0.5;
    let tracker = Tracker::with_config(1, 1, constant_loss(0.), Vector::zero(), Vector::new(0., 0., bfield), config).unwrap();

    let (track, stop_reason) = tracker.trace(0., 0., 0.5, energy, 0., PI/2.).unwrap();
    assert_eq!(stop_reason, StopReason::STEP_LIMIT);
    assert_eq!(track.len(), 501);

    let states = track.states();
    let (a, b, c) = (states[0].pos, states[150].pos, states[300].pos);

    //Circumcenter of three points in the x-y plane
    let d = 2.*(a.x*(b.y - c.y) + b.x*(c.y - a.y) + c.x*(a.y - b.y));
    let a2 = a.x*a.x + a.y*a.y;
    let b2 = b.x*b.x + b.y*b.y;
    let c2 = c.x*c.x + c.y*c.y;
    let ux = (a2*(b.y - c.y) + b2*(c.y - a.y) + c2*(a.y - b.y))/d;
    let uy = (a2*(c.x - b.x) + b2*(a.x - c.x) + c2*(b.x - a.x))/d;
    let radius = ((a.x - ux).powi(2) + (a.y - uy).powi(2)).sqrt();

    let expected = tracker.particle().gyroradius(energy, bfield);
    assert!(approx_eq!(f64, radius/expected, 1., epsilon = 1E-3), "radius: {} expected: {}", radius, expected);

    //Magnetic fields do no work and the motion stays in the plane
    for state in track.iter() {
        assert!(approx_eq!(f64, state.energy, energy, epsilon = 1E-9));
        assert!(approx_eq!(f64, state.pos.z, 0.5, epsilon = 1E-9));
    }
}

#[test]
fn test_energy_depletion() {
    let tracker = stopping_tracker();
    let (track, stop_reason) = tracker.trace(0., 0., 0.5, 1., 0., PI/2.).unwrap();

    assert_eq!(stop_reason, StopReason::ENERGY_DEPLETED);
    assert!((track.len() >= 99) & (track.len() <= 101), "track length: {}", track.len());
    assert!(approx_eq!(f64, track.range(), 0.1, epsilon = 2E-3));

    for pair in track.states().windows(2) {
        assert!(pair[1].energy < pair[0].energy);
        assert!(approx_eq!(f64, pair[1].deposit, 0.01, epsilon = 1E-9));
        assert!(pair[1].time > pair[0].time);
    }

    //Zero initial energy is a one-point track
    let (track, stop_reason) = tracker.trace(0., 0., 0.5, 0., 0., PI/2.).unwrap();
    assert_eq!(stop_reason, StopReason::ENERGY_DEPLETED);
    assert_eq!(track.len(), 1);
    assert_eq!(tracker.track_particle(0., 0., 0.5, 0., 0., PI/2.).unwrap().len(), 1);

    assert!(matches!(tracker.track_particle(f64::NAN, 0., 0.5, 1., 0., PI/2.), Err(McoptError::InvalidParameter(_))));
}

#[test]
fn test_leave_volume() {
    let tracker = free_tracker(MAX_STEPS);
    let (track, stop_reason) = tracker.trace(0., 0., 0.5, 10., 0., PI/2.).unwrap();

    assert_eq!(stop_reason, StopReason::LEFT_VOLUME);

    let volume = &tracker.config().volume;
    let states = track.states();
    assert!(!volume.inside(&states[states.len() - 1].pos));
    assert!(volume.inside(&states[states.len() - 2].pos));
    assert!(approx_eq!(f64, track.range(), CHAMBER_RADIUS, epsilon = 2E-3));
}

#[test]
fn test_step_limit() {
    let tracker = free_tracker(10);

    let (track, stop_reason) = tracker.trace(0., 0., 0.5, 10., 0., PI/2.).unwrap();
    assert_eq!(stop_reason, StopReason::STEP_LIMIT);
    assert_eq!(track.len(), 11);

    let result = tracker.track_particle(0., 0., 0.5, 10., 0., PI/2.);
    assert_eq!(result, Err(McoptError::SimulationDivergence { steps: 10 }));
}

#[test]
fn test_track_output() {
    let tracker = stopping_tracker();
    let track = tracker.track_particle(0., 0., 0.5, 1., 0., PI/2.).unwrap();
    let again = tracker.track_particle(0., 0., 0.5, 1., 0., PI/2.).unwrap();
    assert_eq!(track, again);

    let matrix = track.to_matrix();
    assert_eq!(matrix.dim(), (track.len(), columns::NUM_COLUMNS));
    assert!(approx_eq!(f64, matrix[[0, columns::Z]], 0.5, epsilon = 1E-12));
    assert!(approx_eq!(f64, matrix[[0, columns::ENU]], 1., epsilon = 1E-12));
    assert!(approx_eq!(f64, matrix[[0, columns::AZI]], 0., epsilon = 1E-12));
    assert!(approx_eq!(f64, matrix[[0, columns::POL]], PI/2., epsilon = 1E-12));
    assert_eq!(matrix[[0, columns::TIME]], 0.);

    let first = &track.states()[0];
    let speed = first.velocity(track.particle()).magnitude();
    assert!(approx_eq!(f64, speed, tracker.particle().beta(1.)*C, epsilon = 1E-3));
    assert!(track.last().unwrap().energy < first.energy);

    let cloud = track.to_point_cloud(30., 2.);
    assert_eq!(cloud.dim(), (track.len(), POINT_COLUMNS));
    assert_eq!(cloud[[0, 3]], 0.);
    assert!(approx_eq!(f64, cloud[[1, 3]], 0.01*1E6/30.*2., epsilon = 1E-6));
}

#[test]
fn test_find_deviations() {
    let sim = array![[0., 0., 0., 1.], [1., 0., 0., 2.], [2., 0., 0., 3.]];

    let deviations = find_deviations(sim.view(), sim.view()).unwrap();
    assert_eq!(deviations.dim(), (3, POINT_COLUMNS));
    assert!(deviations.iter().all(|value| *value == 0.));
    assert_eq!(chi_squared(&deviations, 1., 1.), 0.);

    let exp = array![[1.05, 0.02, 0., 4.]];
    let deviations = find_deviations(sim.view(), exp.view()).unwrap();
    assert!(approx_eq!(f64, deviations[[0, 0]], 0.05, epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[0, 1]], 0.02, epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[0, 3]], 2., epsilon = 1E-12));

    let bad = array![[0., 0., 0.]];
    assert!(matches!(find_deviations(sim.view(), bad.view()), Err(McoptError::InvalidDimension(_))));
    assert!(matches!(find_deviations(bad.view(), sim.view()), Err(McoptError::InvalidDimension(_))));
}

#[test]
fn test_deviation_bounds() {
    let sim = array![[0., 0., 0., 0.]];
    let exp = array![[3., 4., 0., 5.]];
    //Charge bound of 0.2 times the experimental charge scale of 5
    let bounds = DeviationBounds {
        spatial: 0.1,
        aux: 0.2,
    };

    //Outliers are pulled back to the bound along their direction
    let deviations = find_deviations_with(sim.view(), exp.view(), &NearestNeighbor, &bounds).unwrap();
    assert!(approx_eq!(f64, deviations[[0, 0]], 0.06, epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[0, 1]], 0.08, epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[0, 3]], 1., epsilon = 1E-12));

    //An empty track costs the full spatial bound per point
    let empty = Array2::<f64>::zeros((0, POINT_COLUMNS));
    let deviations = find_deviations_with(empty.view(), exp.view(), &NearestNeighbor, &bounds).unwrap();
    let spatial = (deviations[[0, 0]].powi(2) + deviations[[0, 1]].powi(2) + deviations[[0, 2]].powi(2)).sqrt();
    assert!(approx_eq!(f64, spatial, 0.1, epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[0, 3]], 1., epsilon = 1E-12));
    assert!(approx_eq!(f64, chi_squared(&deviations, 5., 0.), 0.01, epsilon = 1E-12));
    assert!(approx_eq!(f64, chi_squared(&deviations, 5., 1.), 0.05, epsilon = 1E-12));
}

#[test]
fn test_charge_units() {
    let sim = array![[0., 0., 0., 100.], [1., 0., 0., 300.]];
    let exp = array![[0., 0.01, 0., 200.], [1., 0.01, 0., 200.]];
    assert!(approx_eq!(f64, charge_scale(exp.view()), 200., epsilon = 1E-12));
    assert_eq!(charge_scale(Array2::<f64>::zeros((3, POINT_COLUMNS)).view()), 1.);

    //Rescaling the charge channel, e.g. ion pairs to ADC counts, leaves chi unchanged
    let deviations = find_deviations(sim.view(), exp.view()).unwrap();
    let chi = chi_squared(&deviations, charge_scale(exp.view()), 1E-2);
    assert!(approx_eq!(f64, chi, 1E-4 + 1E-2*0.25, epsilon = 1E-12));

    let mut sim_counts = sim.clone();
    let mut exp_counts = exp.clone();
    sim_counts.column_mut(3).mapv_inplace(|value| value*1000.);
    exp_counts.column_mut(3).mapv_inplace(|value| value*1000.);
    let deviations = find_deviations(sim_counts.view(), exp_counts.view()).unwrap();
    let chi_counts = chi_squared(&deviations, charge_scale(exp_counts.view()), 1E-2);
    assert!(approx_eq!(f64, chi_counts, chi, epsilon = 1E-12));
}

#[test]
fn test_chi_weights_geometry() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker);

    let mut shifted = TRUTH;
    shifted[2] += 0.05;
    let mut gain_error = TRUTH;
    gain_error[6] = 1.01;
    let mut half_gain = TRUTH;
    half_gain[6] = 0.5;
    let mut small_shift = TRUTH;
    small_shift[2] += 0.001;

    //A 5 cm displacement must cost more than a 1% gain error
    let shifted_chi = minimizer.candidate_chi(&shifted, &true_values.view());
    let gain_chi = minimizer.candidate_chi(&gain_error, &true_values.view());
    assert!(shifted_chi > 100.*gain_chi, "shifted: {} gain: {}", shifted_chi, gain_chi);
    assert!(approx_eq!(f64, shifted_chi, 0.0025, epsilon = 1E-4));

    //and the charge channel still constrains the gain
    let half_gain_chi = minimizer.candidate_chi(&half_gain, &true_values.view());
    let small_shift_chi = minimizer.candidate_chi(&small_shift, &true_values.view());
    assert!(half_gain_chi > small_shift_chi, "half gain: {} 1 mm shift: {}", half_gain_chi, small_shift_chi);
}

#[test]
fn test_path_ordered_matching() {
    let sim = Array2::from_shape_fn((5, POINT_COLUMNS), |(i, j)| if j == 0 {i as f64} else {0.});
    let exp = array![[4., 0., 0., 0.], [2., 0., 0., 0.], [0., 0., 0., 0.]];

    assert_eq!(PathOrdered.match_points(sim.view(), exp.view()), vec![0, 2, 4]);
    assert_eq!(NearestNeighbor.match_points(sim.view(), exp.view()), vec![4, 2, 0]);

    let deviations = find_deviations_with(sim.view(), exp.view(), &PathOrdered, &DeviationBounds { spatial: 10., aux: 10. }).unwrap();
    assert!(approx_eq!(f64, deviations[[0, 0]], 4., epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[1, 0]], 0., epsilon = 1E-12));
    assert!(approx_eq!(f64, deviations[[2, 0]], -4., epsilon = 1E-12));
}

#[test]
fn test_sigma_schedules() {
    let sigma = array![1., 2., 0., 4., 1., 1., 1.];

    let next = Geometric.next_sigma(&sigma, 0.5, 3);
    assert!(approx_eq!(f64, next[1], 1., epsilon = 1E-12));
    assert_eq!(next[2], 0.);

    let next = Accelerating.next_sigma(&sigma, 0.5, 1);
    assert!(approx_eq!(f64, next[3], 1., epsilon = 1E-12));

    let next = Accelerating.next_sigma(&sigma, 0.5, 0);
    assert!(approx_eq!(f64, next[3], 2., epsilon = 1E-12));

    //Iteration k searches with sig0*red^k, or sig0*red^(k*(k+1)/2) when accelerating
    let mut geometric = sigma.clone();
    let mut accelerating = sigma.clone();
    for iteration in 0..3 {
        geometric = Geometric.next_sigma(&geometric, 0.5, iteration);
        accelerating = Accelerating.next_sigma(&accelerating, 0.5, iteration);
    }
    assert!(approx_eq!(f64, geometric[3], 4.*0.5_f64.powi(3), epsilon = 1E-12));
    assert!(approx_eq!(f64, accelerating[3], 4.*0.5_f64.powi(3*4/2), epsilon = 1E-12));
}

#[test]
fn test_acceptance_rules() {
    let sentinel = 1E30;
    let chis = [4., 2., 3., sentinel, 5.];

    assert_eq!(RelativeBand::default().accept(&chis, sentinel), vec![0, 1, 2]);
    assert_eq!(StatisticalBand { num_std: 0. }.accept(&chis, sentinel), vec![1]);
    assert_eq!(StatisticalBand { num_std: 100. }.accept(&chis, sentinel), vec![0, 1, 2, 4]);
    assert!(RelativeBand::default().accept(&[sentinel, sentinel], sentinel).is_empty());

    //A perfect fit still accepts its ties
    assert_eq!(RelativeBand::default().accept(&[0., 1., 0.], sentinel), vec![0, 2]);

    let rule = AcceptanceKind::STATISTICAL_BAND{num_std: 0.}.build();
    assert_eq!(rule.accept(&chis, sentinel), vec![1]);
}

#[test]
fn test_minimize_exact_center() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker);

    let ctr0 = Array1::from(TRUTH.to_vec());
    assert_eq!(minimizer.candidate_chi(&TRUTH, &true_values.view()), 0.);

    //Zero spread samples the center only
    let sig0 = Array1::<f64>::zeros(NUM_PARAMS);
    let options = MinimizeOptions {
        num_iters: 3,
        num_pts: 5,
        ..MinimizeOptions::default()
    };
    let result = minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 1).unwrap();

    assert_eq!(result.center, ctr0);
    assert_eq!(result.last_chi(), 0.);
    assert_eq!(result.iterations_completed, 3);
    assert_eq!(result.all_params.dim(), (15, NUM_PARAMS));
    assert_eq!(result.all_chis.len(), 15);
    assert_eq!(result.good_param_indices, (0..15).collect::<Vec<usize>>());
    assert!(result.sigmas.iter().all(|sigma| *sigma == 0.));
}

#[test]
fn test_minimize_recovers_track() {
    let tracker = bragg_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker);

    let ctr0 = array![0.01, -0.01, 0.51, 1.15, 0.1, 1.5, 0.8];
    let sig0 = array![0.01, 0.01, 0.01, 0.1, 0.1, 0.1, 0.2];
    let options = MinimizeOptions {
        num_iters: 12,
        num_pts: 200,
        ..MinimizeOptions::default()
    };
    let result = minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 11).unwrap();

    let first_chi = result.min_chis[0];
    assert!(result.last_chi() < first_chi, "first chi: {} last chi: {}", first_chi, result.last_chi());

    let center = &result.center;
    let vertex_error = ((center[0] - TRUTH[0]).powi(2) + (center[1] - TRUTH[1]).powi(2) + (center[2] - TRUTH[2]).powi(2)).sqrt();
    assert!(vertex_error < 0.01, "vertex error: {} m center: {}", vertex_error, center);
    assert!(approx_eq!(f64, center[3], TRUTH[3], epsilon = 0.1), "enu0: {}", center[3]);
    assert!(approx_eq!(f64, center[6], TRUTH[6], epsilon = 0.15), "gain: {}", center[6]);
}

#[test]
fn test_minimize_deterministic() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);

    let ctr0 = array![0.002, -0.002, 0.5, 1.05, 0.03, 1.55, 0.9];
    let sig0 = search_sigma();
    let options = MinimizeOptions {
        num_iters: 4,
        num_pts: 12,
        details: true,
        ..MinimizeOptions::default()
    };

    let serial = MCminimizer::new(tracker.clone());
    let config = MinimizerConfig {
        num_threads: 4,
        ..MinimizerConfig::default()
    };
    let parallel = MCminimizer::with_config(tracker, config).unwrap();

    let first = serial.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 42).unwrap();
    let second = serial.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 42).unwrap();
    let threaded = parallel.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 42).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, threaded);

    assert_eq!(first.min_chis.len(), 4);
    assert_eq!(first.sigmas.dim(), (4, NUM_PARAMS));
    assert!(first.min_chis.iter().all(|chi| chi.is_finite() & (*chi < MinimizerConfig::default().sentinel_chi)));
    assert!(!first.good_param_indices.is_empty());
    assert!(first.good_param_indices.windows(2).all(|pair| pair[0] < pair[1]));

    //Geometric reduction by the default factor
    for iteration in 0..4 {
        for d in 0..NUM_PARAMS {
            let expected = sig0[d]*0.8_f64.powi(iteration as i32);
            assert!(approx_eq!(f64, first.sigmas[[iteration, d]], expected, epsilon = 1E-12));
        }
    }

    //The center is the best sample of the last iteration
    let last_row = 3*12 + (0..12).fold(0, |best, i| if first.all_chis[36 + i] < first.all_chis[36 + best] {i} else {best});
    assert_eq!(first.center, first.all_params.row(last_row).to_owned());
    assert_eq!(first.last_chi(), first.all_chis[last_row]);
}

#[test]
fn test_minimize_single_point() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker);

    let ctr0 = Array1::from(TRUTH.to_vec());
    let sig0 = search_sigma();
    let options = MinimizeOptions {
        num_iters: 3,
        num_pts: 1,
        red_factor: 1.,
        details: true,
    };
    let result = minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &options, 3).unwrap();

    assert_eq!(result.min_chis, result.all_chis);
    assert_eq!(result.center, result.all_params.row(2).to_owned());
    for row in result.sigmas.outer_iter() {
        assert_eq!(row.to_owned(), sig0);
    }
}

#[test]
fn test_minimize_all_candidates_fail() {
    //Nothing stops a particle within five steps, so every candidate diverges
    let tracker = free_tracker(5);
    let true_values = array![[0.1, 0., 0.5, 0.], [0.2, 0., 0.5, 0.]];
    let minimizer = MCminimizer::new(tracker);

    let ctr0 = Array1::from(TRUTH.to_vec());
    let options = MinimizeOptions {
        num_iters: 2,
        num_pts: 4,
        details: true,
        ..MinimizeOptions::default()
    };
    let result = minimizer.minimize_seeded(ctr0.view(), search_sigma().view(), true_values.view(), &options, 5).unwrap();

    let sentinel = minimizer.config().sentinel_chi;
    assert!(result.min_chis.iter().all(|chi| *chi == sentinel));
    assert!(result.all_chis.iter().all(|chi| *chi == sentinel));
    assert!(result.good_param_indices.is_empty());
    assert_eq!(result.iterations_completed, 2);
}

#[test]
fn test_minimize_invalid_inputs() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker);

    let ctr0 = Array1::from(TRUTH.to_vec());
    let sig0 = search_sigma();
    let options = MinimizeOptions::default();

    let short = array![0., 0., 0.5, 1., 0., 1.5];
    assert!(matches!(minimizer.minimize_seeded(short.view(), sig0.view(), true_values.view(), &options, 0),
        Err(McoptError::InvalidDimension(_))));
    assert!(matches!(minimizer.minimize_seeded(ctr0.view(), short.view(), true_values.view(), &options, 0),
        Err(McoptError::InvalidDimension(_))));

    let three_columns = array![[0., 0., 0.5]];
    assert!(matches!(minimizer.minimize_seeded(ctr0.view(), sig0.view(), three_columns.view(), &options, 0),
        Err(McoptError::InvalidDimension(_))));

    let no_iterations = MinimizeOptions { num_iters: 0, ..options };
    assert!(matches!(minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &no_iterations, 0),
        Err(McoptError::InvalidParameter(_))));

    let no_points = MinimizeOptions { num_pts: 0, ..options };
    assert!(matches!(minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &no_points, 0),
        Err(McoptError::InvalidParameter(_))));

    for red_factor in vec![0., 1.5, f64::NAN] {
        let bad_factor = MinimizeOptions { red_factor, ..options };
        assert!(matches!(minimizer.minimize_seeded(ctr0.view(), sig0.view(), true_values.view(), &bad_factor, 0),
            Err(McoptError::InvalidParameter(_))));
    }

    let negative = -search_sigma();
    assert!(matches!(minimizer.minimize_seeded(ctr0.view(), negative.view(), true_values.view(), &options, 0),
        Err(McoptError::InvalidParameter(_))));

    let config = MinimizerConfig { num_threads: 0, ..MinimizerConfig::default() };
    assert!(matches!(MCminimizer::with_config(stopping_tracker(), config), Err(McoptError::InvalidParameter(_))));
}

#[test]
fn test_minimize_cancelled() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let flag = Arc::new(AtomicBool::new(true));
    let minimizer = MCminimizer::new(tracker).with_cancel_flag(flag.clone());

    let ctr0 = Array1::from(TRUTH.to_vec());
    let options = MinimizeOptions {
        num_iters: 3,
        num_pts: 2,
        ..MinimizeOptions::default()
    };
    let result = minimizer.minimize_seeded(ctr0.view(), search_sigma().view(), true_values.view(), &options, 0);
    assert_eq!(result, Err(McoptError::Cancelled));

    flag.store(false, Ordering::Relaxed);
    assert!(minimizer.minimize_seeded(ctr0.view(), search_sigma().view(), true_values.view(), &options, 0).is_ok());
}

#[test]
fn test_minimize_output() {
    let tracker = stopping_tracker();
    let true_values = truth_cloud(&tracker);
    let minimizer = MCminimizer::new(tracker)
        .with_matcher(MatcherKind::PATH_ORDERED.build())
        .with_schedule(SigmaScheduleKind::ACCELERATING.build());

    let ctr0 = Array1::from(TRUTH.to_vec());
    let sig0 = search_sigma();
    let summary_options = MinimizeOptions {
        num_iters: 2,
        num_pts: 6,
        ..MinimizeOptions::default()
    };
    let detailed_options = MinimizeOptions { details: true, ..summary_options };

    let mut rng = StdRng::seed_from_u64(9);
    let summary = minimizer.minimize_output(ctr0.view(), sig0.view(), true_values.view(), &summary_options, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let detailed = minimizer.minimize_output(ctr0.view(), sig0.view(), true_values.view(), &detailed_options, &mut rng).unwrap();

    assert!(matches!(summary, MinimizeOutput::Summary{..}));
    assert!(matches!(detailed, MinimizeOutput::Detailed(_)));
    assert_eq!(summary.center(), detailed.center());
    assert_eq!(summary.last_chi(), detailed.last_chi());

    if let MinimizeOutput::Detailed(result) = &detailed {
        //Accelerating: sigma_1 = sigma_0*red
        assert!(approx_eq!(f64, result.sigmas[[1, 3]], sig0[3]*0.8, epsilon = 1E-12));
    }

    let name = std::env::temp_dir().join("mcopt_test_minimize_output");
    let name = name.to_str().unwrap();
    output::write_results(name, &detailed).unwrap();
    let summary_file = std::fs::read_to_string(format!("{}_summary.output", name)).unwrap();
    let params_file = std::fs::read_to_string(format!("{}_params.output", name)).unwrap();
    assert_eq!(summary_file.lines().count(), 3);
    assert_eq!(params_file.lines().count(), 12);
    assert_eq!(params_file.lines().next().unwrap().split(", ").count(), NUM_PARAMS + 2);
}

#[test]
fn test_input_parsing() {
    let input_toml = r#"
        [options]
        name = "input_test"
        seed = 7
        num_threads = 2
        progress = false
        write_files = false

        [particle]
        mass_num = 1
        charge_num = 1

        [fields]
        efield = [0.0, 0.0, 0.0]
        bfield = [0.0, 0.0, 1.0]

        [energy_loss.TABLE]
        values = [10.0, 10.0]
        bin_width = 1.0

        [tracker]
        max_steps = 2000

        [minimizer]
        ioniz = 25.0

        [fit]
        ctr0 = [0.0, 0.0, 0.5, 1.0, 0.0, 1.5707963267948966, 1.0]
        sig0 = [0.005, 0.005, 0.005, 0.05, 0.05, 0.05, 0.1]
        num_iters = 3
        num_pts = 10
        details = true
        matcher = "PATH_ORDERED"
        acceptance = {STATISTICAL_BAND = {num_std = 1.5}}

        [data.SYNTHETIC]
        truth = [0.0, 0.0, 0.5, 1.0, 0.0, 1.5707963267948966, 1.0]
    "#;

    let input = Input::parse(input_toml).unwrap();
    assert_eq!(input.options.seed, 7);
    assert_eq!(input.fit.matcher, MatcherKind::PATH_ORDERED);
    assert_eq!(input.fit.sigma_schedule, SigmaScheduleKind::GEOMETRIC);
    assert_eq!(input.fit.acceptance, AcceptanceKind::STATISTICAL_BAND{num_std: 1.5});
    assert_eq!(input.tracker.max_steps, 2000);
    assert_eq!(input.tracker.pos_step, POS_STEP);

    let options = input.search_options();
    assert_eq!(options.num_iters, 3);
    assert_eq!(options.num_pts, 10);
    assert_eq!(options.red_factor, 0.8);
    assert!(options.details);

    let tracker = input.build_tracker().unwrap();
    let true_values = input.true_values(&tracker).unwrap();
    assert_eq!(true_values.ncols(), POINT_COLUMNS);
    assert!(true_values.nrows() > 1);

    let minimizer = input.build_minimizer(tracker).unwrap();
    assert_eq!(minimizer.config().num_threads, 2);
    assert_eq!(minimizer.config().ioniz, 25.);

    assert!(Input::parse("[options]\nname = 1").is_err());
}

#[test]
fn test_input_points() {
    let input_toml = r#"
        [options]
        name = "points_test"

        [particle]
        mass_num = 4
        charge_num = 2

        [fields]
        efield = [0.0, 0.0, -1000.0]
        bfield = [0.0, 0.0, 1.0]

        [energy_loss.GAS]
        max_energy = 20.0
        gas = {molar_mass = 4.002, num_electrons = 2, mean_exc_pot = 41.8, pressure = 150.0}

        [fit]
        ctr0 = [0.0, 0.0, 0.5, 1.0, 0.0, 1.5707963267948966, 1.0]
        sig0 = [0.005, 0.005, 0.005, 0.05, 0.05, 0.05, 0.1]

        [data.POINTS]
        points = [[0.0, 0.0, 0.5, 0.0], [0.01, 0.0, 0.5, 10.0]]
    "#;

    let input = Input::parse(input_toml).unwrap();
    let tracker = input.build_tracker().unwrap();
    assert_eq!(tracker.particle().charge_num, 2);
    assert!(tracker.eloss().max_energy() >= 20. - 1E-9);

    let true_values = input.true_values(&tracker).unwrap();
    assert_eq!(true_values.dim(), (2, POINT_COLUMNS));
    assert_eq!(true_values[[1, 3]], 10.);

    let options = input.search_options();
    assert_eq!(options.num_iters, 10);
    assert_eq!(options.num_pts, 200);

    let mut bad = input.clone();
    bad.data = input::DataInput::POINTS{points: vec![vec![0., 0., 0.]]};
    assert!(matches!(bad.true_values(&tracker), Err(McoptError::InvalidDimension(_))));
}
