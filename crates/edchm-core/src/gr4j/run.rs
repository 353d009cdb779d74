/// GR4J model orchestration.
///
/// - `Gr4j::new()`: validate parameters once
/// - `step()`: Execute a single timestep → (State, Fluxes)
/// - `HydrologicalModel` impl: run over a forcing matrix
use ndarray::{Array1, Array2, ArrayView1, Zip};

use super::constants::{B, NET_CAP_FACTOR};
use super::fluxes::{Gr4jFluxes, Gr4jTrajectory};
use super::params::Gr4jParameters;
use super::state::Gr4jState;
use crate::error::{ModelError, ModelResult};
use crate::forcing::{Forcing, ForcingRow};
use crate::iuh::{IuhMethod, Kernel};
use crate::processes::{
    checked_depletion, checked_exchange, BaseflowMethod, EvatransMethod, InfiltrationMethod, LateralMethod,
    PercolationMethod,
};
use crate::routing::convolve_step;
use crate::traits::HydrologicalModel;
use crate::vecmath::{minimum, positive_part, select};

/// Per-unit UH1 and UH2 kernels, computed once per run.
#[derive(Debug, Clone)]
pub struct Gr4jKernels {
    pub uh1: Vec<Kernel>,
    pub uh2: Vec<Kernel>,
}

/// A validated GR4J parameter set ready to run.
#[derive(Debug, Clone)]
pub struct Gr4j {
    pub params: Gr4jParameters,
    x1: Array1<f64>,
    x3: Array1<f64>,
    exchange: LateralMethod,
}

impl Gr4j {
    pub fn new(params: Gr4jParameters) -> ModelResult<Self> {
        params.validate()?;
        let initial = Gr4jState::initialize(&params);
        initial.validate(&params)?;
        Ok(Self {
            x1: params.x1(),
            x3: params.x3(),
            exchange: LateralMethod::Gr4j { potential: params.x2() },
            params,
        })
    }
}

/// Execute one timestep of the GR4J model for every spatial unit.
///
/// Takes current state + forcing + precomputed UH kernels, returns new state + all fluxes.
pub fn step(
    model: &Gr4j,
    state: &Gr4jState,
    precip: ArrayView1<'_, f64>,
    pet: ArrayView1<'_, f64>,
    kernels: &Gr4jKernels,
    t: usize,
) -> ModelResult<(Gr4jState, Gr4jFluxes)> {
    let (x1, x3) = (&model.x1, &model.x3);
    let n = x1.len();
    let precipitation = precip.to_owned();
    let potential_evatrans = pet.to_owned();
    let zeros = Array1::zeros(n);
    let wet: Array1<bool> = Zip::from(&precipitation)
        .and(&potential_evatrans)
        .map_collect(|&p, &e| p > e);

    // 1. Net rainfall / net PET, capped for the tanh terms
    let cap = x1 * NET_CAP_FACTOR;
    let net_rainfall = minimum(&positive_part(&(&precipitation - &potential_evatrans)), &cap);
    let net_evatrans = minimum(&positive_part(&(&potential_evatrans - &precipitation)), &cap);

    // 2. Production store update
    let infilt = InfiltrationMethod::Gr4j;
    let evatrans = EvatransMethod::Gr4j;
    let storage_infiltration = checked_depletion(
        infilt.flux(&net_rainfall, &state.production_store, x1),
        infilt.name(),
        t,
    )?;
    let storage_evatrans = checked_depletion(
        evatrans.flux(&net_evatrans, &state.production_store, x1),
        evatrans.name(),
        t,
    )?;
    let storage_infiltration = select(&wet, &storage_infiltration, &zeros);
    let storage_evatrans = select(&wet, &zeros, &storage_evatrans);
    let actual_evatrans = select(&wet, &potential_evatrans, &(&storage_evatrans + &precipitation));
    let production_store = positive_part(&(&state.production_store + &storage_infiltration - &storage_evatrans));

    // 3. Percolation
    let percola = PercolationMethod::Gr4j;
    let percolation = checked_depletion(percola.flux(&production_store, x1), percola.name(), t)?;
    let production_store = positive_part(&(&production_store - &percolation));

    // 4. Split effective rainfall and convolve through UH1/UH2
    let effective_rainfall = positive_part(&(&net_rainfall - &storage_infiltration + &percolation));
    let mut uh1_pending = state.uh1_pending.clone();
    let mut uh2_pending = state.uh2_pending.clone();
    let mut q9 = Array1::zeros(n);
    let mut q1 = Array1::zeros(n);
    for j in 0..n {
        let pr = effective_rainfall[j];
        q9[j] = convolve_step(&mut uh1_pending[j], kernels.uh1[j].weights(), B * pr);
        q1[j] = convolve_step(&mut uh2_pending[j], kernels.uh2[j].weights(), (1.0 - B) * pr);
    }

    // 5. Groundwater exchange
    let exchange = checked_exchange(
        model.exchange.flux(&state.routing_store, x3),
        model.exchange.name(),
        t,
    )?;

    // 6. Direct branch
    let direct_flow = positive_part(&(&q1 + &exchange));

    // 7. Routing store
    let routing_store = positive_part(&(&state.routing_store + &q9 + &exchange));
    let baseflow = BaseflowMethod::Gr4j;
    let routing_flow = checked_depletion(baseflow.flux(&routing_store, x3), baseflow.name(), t)?;
    let routing_store = positive_part(&(&routing_store - &routing_flow));

    // 8. Total streamflow
    let streamflow = &routing_flow + &direct_flow;

    let new_state = Gr4jState {
        production_store,
        routing_store,
        uh1_pending,
        uh2_pending,
    };

    let fluxes = Gr4jFluxes {
        precipitation,
        potential_evatrans,
        net_rainfall,
        net_evatrans,
        storage_infiltration,
        storage_evatrans,
        actual_evatrans,
        percolation,
        effective_rainfall,
        q9,
        q1,
        exchange,
        routing_flow,
        direct_flow,
        streamflow,
        production_store: new_state.production_store.clone(),
        routing_store: new_state.routing_store.clone(),
    };

    Ok((new_state, fluxes))
}

impl HydrologicalModel for Gr4j {
    const NAME: &'static str = "GR4J";

    type State = Gr4jState;
    type Fluxes = Gr4jFluxes;
    type Trajectory = Gr4jTrajectory;
    type Context = Gr4jKernels;

    fn n_spat(&self) -> usize {
        self.params.n_spat()
    }

    fn validate(&self, forcing: &Forcing) -> ModelResult<()> {
        if forcing.n_spat() != self.n_spat() {
            return Err(ModelError::dimension_mismatch(
                "forcing columns",
                self.n_spat(),
                forcing.n_spat(),
            ));
        }
        Ok(())
    }

    fn prepare(&self) -> ModelResult<Gr4jKernels> {
        let x4 = self.params.x4();
        Ok(Gr4jKernels {
            uh1: IuhMethod::Gr4j1 { response_time: x4.clone() }.kernels()?,
            uh2: IuhMethod::Gr4j2 { response_time: x4 }.kernels()?,
        })
    }

    fn initial_state(&self) -> Gr4jState {
        Gr4jState::initialize(&self.params)
    }

    fn validate_state(&self, state: &Gr4jState) -> ModelResult<()> {
        state.validate(&self.params)
    }

    fn step(
        &self,
        state: &Gr4jState,
        forcing: ForcingRow<'_>,
        context: &Gr4jKernels,
        _time_step_h: f64,
        t: usize,
    ) -> ModelResult<(Gr4jState, Gr4jFluxes)> {
        step(self, state, forcing.precipitation, forcing.potential_evatrans, context, t)
    }

    /// Routing happens inside the time loop, so the recorded streamflow is final.
    fn streamflow(&self, trajectory: &Gr4jTrajectory, _context: &Gr4jKernels) -> ModelResult<Array2<f64>> {
        Ok(trajectory.streamflow.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::Resolution;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn test_model() -> Gr4j {
        Gr4j::new(Gr4jParameters::uniform(1, 350.0, 0.0, 90.0, 1.7)).unwrap()
    }

    fn kernels(model: &Gr4j) -> Gr4jKernels {
        model.prepare().unwrap()
    }

    // -- step() tests --

    #[test]
    fn step_returns_finite_values() {
        let m = test_model();
        let s = m.initial_state();
        let (new_state, fluxes) = step(&m, &s, array![10.0].view(), array![3.0].view(), &kernels(&m), 0).unwrap();
        assert!(new_state.production_store[0].is_finite());
        assert!(new_state.routing_store[0].is_finite());
        assert!(fluxes.streamflow[0].is_finite());
    }

    #[test]
    fn step_does_not_mutate_input_state() {
        let m = test_model();
        let s = m.initial_state();
        let original = s.clone();
        let _ = step(&m, &s, array![10.0].view(), array![3.0].view(), &kernels(&m), 0).unwrap();
        assert_eq!(s, original);
    }

    #[test]
    fn step_non_negative_streamflow() {
        let m = test_model();
        let s = m.initial_state();
        let (_, fluxes) = step(&m, &s, array![0.0].view(), array![100.0].view(), &kernels(&m), 0).unwrap();
        assert!(fluxes.streamflow[0] >= 0.0);
    }

    #[test]
    fn dry_step_evaporates_all_rain() {
        let m = test_model();
        let s = m.initial_state();
        let (_, fluxes) = step(&m, &s, array![1.0].view(), array![4.0].view(), &kernels(&m), 0).unwrap();
        assert_eq!(fluxes.storage_infiltration[0], 0.0);
        assert_abs_diff_eq!(fluxes.actual_evatrans[0], fluxes.storage_evatrans[0] + 1.0, epsilon = 1e-12);
        assert!(fluxes.actual_evatrans[0] <= 4.0);
    }

    #[test]
    fn wet_step_meets_full_demand() {
        let m = test_model();
        let s = m.initial_state();
        let (_, fluxes) = step(&m, &s, array![12.0].view(), array![3.0].view(), &kernels(&m), 0).unwrap();
        assert_eq!(fluxes.actual_evatrans[0], 3.0);
        assert_eq!(fluxes.net_rainfall[0], 9.0);
        assert!(fluxes.storage_infiltration[0] > 0.0);
    }

    #[test]
    fn mass_balance_without_exchange() {
        let m = test_model();
        let ks = kernels(&m);
        let mut s = m.initial_state();
        let rain = [0.0, 25.0, 3.0, 0.0, 48.0, 7.0, 0.0, 0.0, 12.0, 0.0];
        for (t, &p) in rain.iter().enumerate() {
            let (next, f) = step(&m, &s, array![p].view(), array![2.5].view(), &ks, t).unwrap();
            let before = s.production_store[0] + s.routing_store[0] + s.in_transit()[0];
            let after = next.production_store[0] + next.routing_store[0] + next.in_transit()[0];
            let residual = p - (after - before) - f.streamflow[0] - f.actual_evatrans[0];
            assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-9);
            s = next;
        }
    }

    // -- run tests --

    fn forcing(n_time: usize, n_spat: usize) -> Forcing {
        let p = Array2::from_shape_fn((n_time, n_spat), |(t, j)| ((t * 7 + j * 3) % 11) as f64 * 2.0);
        let pet = Array2::from_elem((n_time, n_spat), 3.0);
        Forcing::new(p, pet, None, Resolution::Daily).unwrap()
    }

    #[test]
    fn run_output_shape() {
        let m = Gr4j::new(Gr4jParameters::uniform(3, 350.0, -0.5, 90.0, 2.2)).unwrap();
        let out = m.simulate(&forcing(50, 3), None).unwrap();
        assert_eq!(out.streamflow.dim(), (50, 3));
        assert_eq!(out.fluxes.routing_store.dim(), (50, 3));
        assert!(out.streamflow.iter().all(|q| q.is_finite() && *q >= 0.0));
    }

    #[test]
    fn stores_bounded() {
        let m = Gr4j::new(Gr4jParameters::uniform(1, 200.0, 1.5, 60.0, 3.0)).unwrap();
        let out = m.simulate(&forcing(200, 1), None).unwrap();
        assert!(out.fluxes.production_store.iter().all(|&s| (0.0..=200.0).contains(&s)));
        assert!(out.fluxes.routing_store.iter().all(|&r| (0.0..=60.0).contains(&r)));
    }

    #[test]
    fn resume_is_exact() {
        let m = Gr4j::new(Gr4jParameters::uniform(2, 300.0, 0.3, 80.0, 2.6)).unwrap();
        let f = forcing(30, 2);
        let whole = m.simulate(&f, None).unwrap();

        let head = Forcing::new(
            f.precipitation.slice(ndarray::s![..12, ..]).to_owned(),
            f.potential_evatrans.slice(ndarray::s![..12, ..]).to_owned(),
            None,
            Resolution::Daily,
        )
        .unwrap();
        let tail = Forcing::new(
            f.precipitation.slice(ndarray::s![12.., ..]).to_owned(),
            f.potential_evatrans.slice(ndarray::s![12.., ..]).to_owned(),
            None,
            Resolution::Daily,
        )
        .unwrap();
        let first = m.simulate(&head, None).unwrap();
        let second = m.simulate(&tail, Some(&first.final_state)).unwrap();
        for t in 0..18 {
            for j in 0..2 {
                assert_abs_diff_eq!(second.streamflow[[t, j]], whole.streamflow[[t + 12, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rejects_state_from_other_parameters() {
        let a = Gr4j::new(Gr4jParameters::uniform(1, 350.0, 0.0, 90.0, 1.7)).unwrap();
        let b = Gr4j::new(Gr4jParameters::uniform(1, 350.0, 0.0, 90.0, 6.0)).unwrap();
        let err = b.run(&forcing(5, 1), Some(&a.initial_state()));
        assert!(matches!(err, Err(ModelError::DimensionMismatch { .. })));
    }

    #[test]
    fn initial_store_above_capacity_rejected() {
        let params = Gr4jParameters::uniform(1, 100.0, 0.0, 50.0, 2.0).with_initial_stores(vec![120.0], vec![10.0]);
        assert!(Gr4j::new(params).is_err());
    }
}
