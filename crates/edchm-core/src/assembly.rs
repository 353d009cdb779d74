/// Generic model assembly: a process chain, routing channels, capacities
/// and initial stores, run through the water-balance integrator.
use log::debug;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::error::{ModelError, ModelResult};
use crate::fluxes::{StepFluxes, StepFluxesTrajectory};
use crate::forcing::{Forcing, ForcingRow};
use crate::integrator::{self, ProcessChain};
use crate::iuh::{IuhMethod, Kernel};
use crate::routing::route_matrix;
use crate::state::{Capacities, Stores};
use crate::traits::HydrologicalModel;

/// Emitted flux that can be routed to the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Runoff,
    Interflow,
    Baseflow,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Runoff => "runoff",
            Self::Interflow => "interflow",
            Self::Baseflow => "baseflow",
        }
    }

    fn series(self, trajectory: &StepFluxesTrajectory) -> ArrayView2<'_, f64> {
        match self {
            Self::Runoff => trajectory.runoff.view(),
            Self::Interflow => trajectory.interflow.view(),
            Self::Baseflow => trajectory.baseflow.view(),
        }
    }
}

/// Which unit hydrograph serves each emitted channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Routing {
    pub channels: SmallVec<[(Channel, IuhMethod); 3]>,
}

impl Routing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Channel, method: IuhMethod) -> Self {
        self.channels.push((channel, method));
        self
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        if self.channels.is_empty() {
            return Err(ModelError::Config {
                message: "routing has no channels".to_string(),
            });
        }
        for (i, (channel, method)) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|(c, _)| c == channel) {
                return Err(ModelError::Config {
                    message: format!("channel {} routed twice", channel.name()),
                });
            }
            method.validate(n_spat)?;
        }
        Ok(())
    }

    /// Per-channel, per-unit kernels.
    pub fn kernels(&self) -> ModelResult<Vec<Vec<Kernel>>> {
        self.channels
            .par_iter()
            .map(|(_, method)| method.kernels())
            .collect()
    }
}

/// A complete lumped model built from interchangeable parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub name: &'static str,
    pub processes: ProcessChain,
    pub routing: Routing,
    pub capacities: Capacities,
    pub initial: Stores,
}

impl Assembly {
    /// Validates every part against the capacities' number of spatial units.
    pub fn new(
        name: &'static str,
        processes: ProcessChain,
        routing: Routing,
        capacities: Capacities,
        initial: Stores,
    ) -> ModelResult<Self> {
        let n_spat = capacities.n_spat();
        processes.validate(n_spat)?;
        routing.validate(n_spat)?;
        initial.validate(&capacities)?;
        debug!("{name}: {}", processes.describe().join(" -> "));
        Ok(Self {
            name,
            processes,
            routing,
            capacities,
            initial,
        })
    }
}

impl HydrologicalModel for Assembly {
    const NAME: &'static str = "assembly";

    type State = Stores;
    type Fluxes = StepFluxes;
    type Trajectory = StepFluxesTrajectory;
    type Context = Vec<Vec<Kernel>>;

    fn name(&self) -> &'static str {
        self.name
    }

    fn n_spat(&self) -> usize {
        self.capacities.n_spat()
    }

    fn validate(&self, forcing: &Forcing) -> ModelResult<()> {
        if forcing.n_spat() != self.n_spat() {
            return Err(ModelError::dimension_mismatch(
                "forcing columns",
                self.n_spat(),
                forcing.n_spat(),
            ));
        }
        if self.processes.needs_temperature() && forcing.temperature.is_none() {
            return Err(ModelError::MissingForcing {
                name: "atmos_temperature_Cel",
            });
        }
        Ok(())
    }

    fn prepare(&self) -> ModelResult<Self::Context> {
        self.routing.kernels()
    }

    fn initial_state(&self) -> Stores {
        self.initial.clone()
    }

    fn validate_state(&self, state: &Stores) -> ModelResult<()> {
        state.validate(&self.capacities)
    }

    fn step(
        &self,
        state: &Stores,
        forcing: ForcingRow<'_>,
        _context: &Self::Context,
        time_step_h: f64,
        t: usize,
    ) -> ModelResult<(Stores, StepFluxes)> {
        integrator::step(&self.processes, &self.capacities, state, forcing, time_step_h, t)
    }

    fn streamflow(&self, trajectory: &StepFluxesTrajectory, context: &Self::Context) -> ModelResult<Array2<f64>> {
        let emissions: Vec<ArrayView2<'_, f64>> = self
            .routing
            .channels
            .iter()
            .map(|(channel, _)| channel.series(trajectory))
            .collect();
        route_matrix(&emissions, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::Resolution;
    use crate::integrator::balance_residual;
    use crate::processes::{BaseflowMethod, EvatransMethod, InfiltrationMethod, PercolationMethod};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn assembly(n_spat: usize) -> Assembly {
        let v = |x: f64| Array1::from_elem(n_spat, x);
        let chain = ProcessChain::new(
            EvatransMethod::SupplyRatio { k: v(0.8) },
            InfiltrationMethod::AcceptRatio { k: v(0.7) },
            PercolationMethod::SupplyRatio { k: v(0.1) },
            BaseflowMethod::SupplyRatio { k: v(0.05) },
        );
        let routing = Routing::new()
            .with_channel(Channel::Runoff, IuhMethod::Clark { response_time: v(1.5) })
            .with_channel(Channel::Baseflow, IuhMethod::Gr4j1 { response_time: v(3.0) });
        let caps = Capacities::new(v(120.0), v(60.0)).unwrap();
        Assembly::new("test", chain, routing, caps, Stores::new(v(40.0), v(10.0))).unwrap()
    }

    fn forcing(n_time: usize, n_spat: usize) -> Forcing {
        let p = Array2::from_shape_fn((n_time, n_spat), |(t, j)| if t % 4 == 0 { 15.0 + j as f64 } else { 0.0 });
        let pet = Array2::from_elem((n_time, n_spat), 1.5);
        Forcing::new(p, pet, None, Resolution::Daily).unwrap()
    }

    #[test]
    fn simulate_shapes() {
        let model = assembly(3);
        let out = model.simulate(&forcing(20, 3), None).unwrap();
        assert_eq!(out.streamflow.dim(), (20, 3));
        assert_eq!(out.fluxes.soil_water.dim(), (20, 3));
        assert_eq!(out.final_state.n_spat(), 3);
    }

    #[test]
    fn routed_volume_bounded_by_emission() {
        let model = assembly(1);
        let out = model.simulate(&forcing(40, 1), None).unwrap();
        let emitted: f64 = out.fluxes.runoff.sum() + out.fluxes.baseflow.sum();
        let routed: f64 = out.streamflow.sum();
        assert!(routed <= emitted + 1e-9);
        assert!(routed > 0.0);
    }

    #[test]
    fn resume_from_final_state_matches_single_run() {
        let model = assembly(2);
        let all = model.simulate(&forcing(12, 2), None).unwrap();
        let first = model.simulate(&forcing(6, 2), None).unwrap();
        let f = forcing(12, 2);
        let tail = Forcing::new(
            f.precipitation.slice(ndarray::s![6.., ..]).to_owned(),
            f.potential_evatrans.slice(ndarray::s![6.., ..]).to_owned(),
            None,
            Resolution::Daily,
        )
        .unwrap();
        let second = model.simulate(&tail, Some(&first.final_state)).unwrap();
        let resumed = second.final_state.to_matrix();
        let straight = all.final_state.to_matrix();
        for (a, b) in resumed.iter().zip(straight.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn per_step_mass_balance() {
        let model = assembly(2);
        let f = forcing(10, 2);
        let mut state = model.initial_state();
        for t in 0..f.n_time() {
            let (next, fluxes) = model.step(&state, f.row(t), &Vec::new(), 24.0, t).unwrap();
            for r in balance_residual(&state, &next, &fluxes) {
                assert_abs_diff_eq!(r, 0.0, epsilon = 1e-9);
            }
            state = next;
        }
    }

    #[test]
    fn forcing_width_mismatch() {
        let model = assembly(2);
        let err = model.run(&forcing(5, 3), None).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn duplicate_channel_rejected() {
        let v = array![2.0];
        let routing = Routing::new()
            .with_channel(Channel::Runoff, IuhMethod::Clark { response_time: v.clone() })
            .with_channel(Channel::Runoff, IuhMethod::Clark { response_time: v });
        assert!(routing.validate(1).is_err());
    }

    #[test]
    fn invalid_initial_store_rejected() {
        let chain = ProcessChain::new(
            EvatransMethod::Gr4j,
            InfiltrationMethod::Gr4j,
            PercolationMethod::Gr4j,
            BaseflowMethod::Gr4j,
        );
        let routing = Routing::new().with_channel(Channel::Runoff, IuhMethod::Clark { response_time: array![1.0] });
        let caps = Capacities::new(array![100.0], array![50.0]).unwrap();
        let result = Assembly::new("bad", chain, routing, caps, Stores::new(array![150.0], array![0.0]));
        assert!(result.is_err());
    }

    #[test]
    fn logs_under_the_assembly_name() {
        let mini = crate::mini::MiniParameters::uniform(1).assemble().unwrap();
        let snow = crate::snow::SnowParameters::uniform(1).assemble().unwrap();
        assert_eq!(HydrologicalModel::name(&mini), "mini");
        assert_eq!(HydrologicalModel::name(&snow), "snow");
        assert_eq!(HydrologicalModel::name(&assembly(1)), assembly(1).name);
    }
}
