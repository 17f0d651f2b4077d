//! Run configuration
//!
//! JSON description of a run: time bounds, seed, parameters and the
//! exchanges to create. Exchange names and algorithm selectors go through
//! `${name}` parameter substitution, so one configuration can describe every
//! run of a batch.

use std::collections::BTreeMap;

use matching_engine::MatchingPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use venue_types::errors::SimulationError;
use venue_types::ids::Timestamp;

use crate::exchange::ExchangeAgent;
use crate::parameters::ParameterStorage;
use crate::scheduler::Simulation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub name: String,
    pub algorithm: String,
    pub processing_delay: Timestamp,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: "EXCHANGE".to_string(),
            algorithm: MatchingPolicy::default().name().to_string(),
            processing_delay: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub start: Timestamp,
    pub duration: Timestamp,
    pub seed: u64,
    pub parameters: BTreeMap<String, String>,
    pub exchanges: Vec<ExchangeConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: 0,
            duration: 1_000,
            seed: 0,
            parameters: BTreeMap::new(),
            exchanges: vec![ExchangeConfig::default()],
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SimulationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.duration <= 0 {
            return Err(SimulationError::InvalidConfig {
                reason: format!("duration must be positive, got {}", self.duration),
            });
        }
        if self.start < 0 {
            return Err(SimulationError::InvalidConfig {
                reason: format!("start must not be negative, got {}", self.start),
            });
        }
        if let Some(exchange) = self.exchanges.iter().find(|e| e.processing_delay < 0) {
            return Err(SimulationError::InvalidConfig {
                reason: format!("negative processing delay for exchange '{}'", exchange.name),
            });
        }
        Ok(())
    }

    /// Parameters declared by the configuration, overridden by `overrides`
    pub fn parameter_storage(&self, overrides: &ParameterStorage) -> ParameterStorage {
        let mut storage: ParameterStorage = self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        storage.merge(overrides);
        storage
    }
}

impl Simulation {
    /// Build a simulation and its exchanges from a configuration
    pub fn from_config(config: &SimulationConfig, parameters: &ParameterStorage) -> Result<Self, SimulationError> {
        Self::from_config_with_seed(config, parameters, config.seed)
    }

    pub fn from_config_with_seed(
        config: &SimulationConfig,
        parameters: &ParameterStorage,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let parameters = config.parameter_storage(parameters);

        let mut exchanges = Vec::with_capacity(config.exchanges.len());
        for exchange in &config.exchanges {
            let name = parameters.process_string(&exchange.name)?;
            let policy: MatchingPolicy = parameters.process_string(&exchange.algorithm)?.parse()?;
            debug!(exchange = %name, algorithm = %policy, processing_delay = exchange.processing_delay, "exchange configured");
            exchanges.push(ExchangeAgent::new(name, policy, exchange.processing_delay));
        }

        let mut simulation = Simulation::with_parameters(config.start, config.duration, seed, parameters);
        for exchange in exchanges {
            simulation.add_agent(Box::new(exchange))?;
        }
        Ok(simulation)
    }
}
