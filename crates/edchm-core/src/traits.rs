use log::debug;
use ndarray::Array2;

use crate::error::ModelResult;
use crate::fluxes::FullOutput;
use crate::forcing::{Forcing, ForcingRow};

/// Core trait for lumped hydrological models over one or more spatial units.
///
/// Defines the interface every assembly implements: validate inputs,
/// prepare context, initialize state, step, and route the recorded fluxes
/// into streamflow.
pub trait HydrologicalModel {
    const NAME: &'static str;

    type State: Clone;
    type Fluxes;
    type Trajectory: TrajectoryOps<Self::Fluxes>;
    /// Precomputed context derived from parameters, constant for a given run
    /// (unit hydrograph kernels).
    type Context;

    /// Name used in log messages; assemblies sharing one type override it.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Number of spatial units the parameters describe.
    fn n_spat(&self) -> usize;

    /// Check parameters against the forcing before anything runs.
    fn validate(&self, forcing: &Forcing) -> ModelResult<()>;

    fn prepare(&self) -> ModelResult<Self::Context>;

    /// Initial state from the parameters.
    fn initial_state(&self) -> Self::State;

    /// Check a caller-supplied state against the parameters.
    fn validate_state(&self, state: &Self::State) -> ModelResult<()>;

    /// Execute one timestep, returning the new state and fluxes.
    fn step(
        &self,
        state: &Self::State,
        forcing: ForcingRow<'_>,
        context: &Self::Context,
        time_step_h: f64,
        t: usize,
    ) -> ModelResult<(Self::State, Self::Fluxes)>;

    /// Routed streamflow `[n_time, n_spat]` from the recorded fluxes.
    fn streamflow(&self, trajectory: &Self::Trajectory, context: &Self::Context) -> ModelResult<Array2<f64>>;

    /// Run the model over a forcing timeseries and keep everything.
    ///
    /// Default implementation: validate, prepare context, initialize or
    /// check the provided state, loop over forcing calling step, then route.
    fn simulate(
        &self,
        forcing: &Forcing,
        initial_state: Option<&Self::State>,
    ) -> ModelResult<FullOutput<Self::Trajectory, Self::State>> {
        self.validate(forcing)?;
        let context = self.prepare()?;
        let mut state = match initial_state {
            Some(s) => {
                self.validate_state(s)?;
                s.clone()
            }
            None => self.initial_state(),
        };

        let (n_time, n_spat) = (forcing.n_time(), forcing.n_spat());
        debug!("{}: running {n_time} timesteps over {n_spat} units", self.name());
        let time_step_h = forcing.time_step_h();
        let mut fluxes = Self::Trajectory::zeros(n_time, n_spat);

        for t in 0..n_time {
            let (new_state, step_fluxes) = self.step(&state, forcing.row(t), &context, time_step_h, t)?;
            fluxes.record(t, &step_fluxes);
            state = new_state;
        }

        let streamflow = self.streamflow(&fluxes, &context)?;
        debug!("{}: finished", self.name());
        Ok(FullOutput {
            fluxes,
            streamflow,
            final_state: state,
        })
    }

    /// Routed streamflow only.
    fn run(&self, forcing: &Forcing, initial_state: Option<&Self::State>) -> ModelResult<Array2<f64>> {
        Ok(self.simulate(forcing, initial_state)?.streamflow)
    }
}

/// Operations required on the trajectory type.
pub trait TrajectoryOps<F> {
    fn zeros(n_time: usize, n_spat: usize) -> Self;
    fn record(&mut self, t: usize, f: &F);
    fn n_time(&self) -> usize;
    fn n_spat(&self) -> usize;
}

/// Forward [`TrajectoryOps`] to the inherent methods `#[derive(Trajectory)]` generates.
macro_rules! impl_trajectory_ops {
    ($fluxes:ty, $trajectory:ty) => {
        impl $crate::traits::TrajectoryOps<$fluxes> for $trajectory {
            fn zeros(n_time: usize, n_spat: usize) -> Self {
                <$trajectory>::zeros(n_time, n_spat)
            }
            fn record(&mut self, t: usize, f: &$fluxes) {
                <$trajectory>::record(self, t, f)
            }
            fn n_time(&self) -> usize {
                <$trajectory>::n_time(self)
            }
            fn n_spat(&self) -> usize {
                <$trajectory>::n_spat(self)
            }
        }
    };
}
pub(crate) use impl_trajectory_ops;

impl_trajectory_ops!(crate::fluxes::StepFluxes, crate::fluxes::StepFluxesTrajectory);
