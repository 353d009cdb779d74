/// Water-balance integrator.
///
/// Advances every spatial unit by one timestep through a fixed process
/// order. Each flux is evaluated on whole vectors, checked, and then
/// applied by computing the new store value and storing it back.
///
/// Process order:
/// 0. snow partition and melt (when a snow routine is wired)
/// 1. evapotranspiration: interception store at the potential rate first,
///    the remaining demand from soil
/// 2. rain fills the interception store; rain remainder plus melt pond on land
/// 3. infiltration into soil, the remainder runs off
/// 4. interflow out of soil (optional)
/// 5. percolation soil to ground
/// 6. capillary rise ground to soil (optional)
/// 7. lateral exchange on the ground store (optional, signed)
/// 8. ground overflow above capacity leaves as baseflow
/// 9. baseflow formula on the capped ground store
use ndarray::Array1;

use crate::error::{ModelError, ModelResult};
use crate::fluxes::StepFluxes;
use crate::forcing::ForcingRow;
use crate::processes::{
    checked_depletion, checked_exchange, BaseflowMethod, CapiriseMethod, EvatransMethod, InfiltrationMethod,
    InterceptionMethod, InterflowMethod, LateralMethod, PercolationMethod, SnowfallMethod, SnowmeltMethod,
};
use crate::state::{Capacities, Stores};
use crate::vecmath::{minimum, positive_part};

/// Snow routine: partition plus melt.
#[derive(Debug, Clone, PartialEq)]
pub struct SnowRoutine {
    pub partition: SnowfallMethod,
    pub melt: SnowmeltMethod,
}

/// One flux method per process slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessChain {
    pub snow: Option<SnowRoutine>,
    pub interception: Option<InterceptionMethod>,
    pub evatrans: EvatransMethod,
    pub infiltration: InfiltrationMethod,
    pub interflow: Option<InterflowMethod>,
    pub percolation: PercolationMethod,
    pub capirise: Option<CapiriseMethod>,
    pub lateral: Option<LateralMethod>,
    pub baseflow: BaseflowMethod,
}

impl ProcessChain {
    /// The mandatory slots; every optional slot empty.
    pub fn new(
        evatrans: EvatransMethod,
        infiltration: InfiltrationMethod,
        percolation: PercolationMethod,
        baseflow: BaseflowMethod,
    ) -> Self {
        Self {
            snow: None,
            interception: None,
            evatrans,
            infiltration,
            interflow: None,
            percolation,
            capirise: None,
            lateral: None,
            baseflow,
        }
    }

    pub fn with_snow(mut self, partition: SnowfallMethod, melt: SnowmeltMethod) -> Self {
        self.snow = Some(SnowRoutine { partition, melt });
        self
    }

    pub fn with_interception(mut self, method: InterceptionMethod) -> Self {
        self.interception = Some(method);
        self
    }

    pub fn with_interflow(mut self, method: InterflowMethod) -> Self {
        self.interflow = Some(method);
        self
    }

    pub fn with_capirise(mut self, method: CapiriseMethod) -> Self {
        self.capirise = Some(method);
        self
    }

    pub fn with_lateral(mut self, method: LateralMethod) -> Self {
        self.lateral = Some(method);
        self
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        if let Some(snow) = &self.snow {
            snow.partition.validate(n_spat)?;
            snow.melt.validate(n_spat)?;
        }
        self.evatrans.validate(n_spat)?;
        self.infiltration.validate(n_spat)?;
        if let Some(m) = &self.interflow {
            m.validate(n_spat)?;
        }
        self.percolation.validate(n_spat)?;
        if let Some(m) = &self.capirise {
            m.validate(n_spat)?;
        }
        if let Some(m) = &self.lateral {
            m.validate(n_spat)?;
        }
        self.baseflow.validate(n_spat)
    }

    pub fn needs_temperature(&self) -> bool {
        self.snow.is_some()
    }

    /// Method names in process order, for logging.
    pub fn describe(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(snow) = &self.snow {
            names.push(snow.partition.name());
            names.push(snow.melt.name());
        }
        if let Some(m) = &self.interception {
            names.push(m.name());
        }
        names.push(self.evatrans.name());
        names.push(self.infiltration.name());
        if let Some(m) = &self.interflow {
            names.push(m.name());
        }
        names.push(self.percolation.name());
        if let Some(m) = &self.capirise {
            names.push(m.name());
        }
        if let Some(m) = &self.lateral {
            names.push(m.name());
        }
        names.push(self.baseflow.name());
        names
    }
}

/// Advance all spatial units by one timestep.
///
/// `t` is only used to locate errors. Returns the new stores and every
/// flux moved during the step.
pub fn step(
    chain: &ProcessChain,
    capacities: &Capacities,
    stores: &Stores,
    forcing: ForcingRow<'_>,
    time_step_h: f64,
    t: usize,
) -> ModelResult<(Stores, StepFluxes)> {
    let n = stores.n_spat();
    let precipitation = forcing.precipitation.to_owned();
    let pet = forcing.potential_evatrans.to_owned();

    // Snow
    let (snowfall, snow_melt, snow_ice) = match &chain.snow {
        Some(snow) => {
            let temperature = forcing.temperature.ok_or(ModelError::MissingForcing {
                name: "atmos_temperature_Cel",
            })?;
            let snowfall = checked_depletion(
                snow.partition.snowfall(forcing.precipitation, temperature),
                snow.partition.name(),
                t,
            )?;
            let melt = checked_depletion(
                snow.melt.melt(&stores.snow_ice, temperature, time_step_h),
                snow.melt.name(),
                t,
            )?;
            let snow_ice = positive_part(&(&stores.snow_ice - &melt + &snowfall));
            (snowfall, melt, snow_ice)
        }
        None => (Array1::zeros(n), Array1::zeros(n), stores.snow_ice.clone()),
    };
    let rainfall = &precipitation - &snowfall;

    // Evapotranspiration
    let intercept_evatrans = minimum(&pet, &stores.intercept_water);
    let intercept_water = &stores.intercept_water - &intercept_evatrans;
    let soil_demand = positive_part(&(&pet - &intercept_evatrans));
    let evatrans = checked_depletion(
        chain
            .evatrans
            .flux(&soil_demand, &stores.soil_water, &capacities.soil),
        chain.evatrans.name(),
        t,
    )?;
    let soil_water = positive_part(&(&stores.soil_water - &evatrans));

    // Interception
    let intercepted = match &chain.interception {
        Some(m) => checked_depletion(
            m.flux(&rainfall, &intercept_water, &capacities.intercept),
            m.name(),
            t,
        )?,
        None => Array1::zeros(n),
    };
    let intercept_water = &intercept_water + &intercepted;
    let land_water = &rainfall - &intercepted + &snow_melt;

    // Infiltration
    let infiltration = checked_depletion(
        chain
            .infiltration
            .flux(&land_water, &soil_water, &capacities.soil),
        chain.infiltration.name(),
        t,
    )?;
    let soil_water = &soil_water + &infiltration;
    let runoff = positive_part(&(&land_water - &infiltration));

    // Interflow
    let interflow = match &chain.interflow {
        Some(m) => checked_depletion(m.flux(&soil_water, &capacities.soil), m.name(), t)?,
        None => Array1::zeros(n),
    };
    let soil_water = &soil_water - &interflow;

    // Percolation
    let percolation = checked_depletion(
        chain.percolation.flux(&soil_water, &capacities.soil),
        chain.percolation.name(),
        t,
    )?;
    let soil_water = positive_part(&(&soil_water - &percolation));
    let ground_water = &stores.ground_water + &percolation;

    // Capillary rise
    let capirise = match &chain.capirise {
        Some(m) => checked_depletion(
            m.flux(&ground_water, &soil_water, &capacities.soil),
            m.name(),
            t,
        )?,
        None => Array1::zeros(n),
    };
    let soil_water = &soil_water + &capirise;
    let ground_water = positive_part(&(&ground_water - &capirise));

    // Lateral exchange acts on the part of the store within capacity; any
    // excess is carried into the overflow below.
    let (lateral, ground_water) = match &chain.lateral {
        Some(m) => {
            let within = minimum(&ground_water, &capacities.ground);
            let excess = &ground_water - &within;
            let lateral = checked_exchange(m.flux(&within, &capacities.ground), m.name(), t)?;
            let ground_water = positive_part(&(&within + &lateral)) + &excess;
            (lateral, ground_water)
        }
        None => (Array1::zeros(n), ground_water),
    };

    // Overflow
    let overflow = positive_part(&(&ground_water - &capacities.ground));
    let ground_water = &ground_water - &overflow;

    // Baseflow
    let formula = checked_depletion(
        chain.baseflow.flux(&ground_water, &capacities.ground),
        chain.baseflow.name(),
        t,
    )?;
    let ground_water = positive_part(&(&ground_water - &formula));
    let baseflow = &formula + &overflow;

    let next = Stores {
        soil_water,
        ground_water,
        snow_ice,
        intercept_water,
    };
    let fluxes = StepFluxes {
        precipitation,
        rainfall,
        snowfall,
        snow_melt,
        intercepted,
        intercept_evatrans,
        evatrans,
        infiltration,
        runoff,
        interflow,
        percolation,
        capirise,
        lateral,
        overflow,
        baseflow,
        snow_ice: next.snow_ice.clone(),
        intercept_water: next.intercept_water.clone(),
        soil_water: next.soil_water.clone(),
        ground_water: next.ground_water.clone(),
    };
    Ok((next, fluxes))
}

/// Per-unit residual of the water balance for one step; zero up to round-off.
///
/// `P - (Δstores + runoff + interflow + baseflow + ET - lateral)`.
pub fn balance_residual(before: &Stores, after: &Stores, fluxes: &StepFluxes) -> Array1<f64> {
    let storage_change = after.total_water() - before.total_water();
    let outflow = &fluxes.runoff + &fluxes.interflow + &fluxes.baseflow + &fluxes.total_evatrans() - &fluxes.lateral;
    &fluxes.precipitation - &storage_change - &outflow
}
