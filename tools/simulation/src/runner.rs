//! Batch runner
//!
//! Independent runs share nothing, so a batch is split over worker threads:
//! each thread takes a contiguous block of run indices and executes them one
//! after another. Every run gets its own parameters (`runIndex` set to its
//! index) and its own seed (`base_seed + run_index`).

use std::ops::Range;
use std::thread;

use matching_engine::{MatchingPolicy, TopOfBook};
use serde::{Deserialize, Serialize};
use tracing::info;
use venue_types::errors::SimulationError;
use venue_types::ids::Timestamp;

use crate::agent::Agent;
use crate::config::SimulationConfig;
use crate::exchange::ExchangeAgent;
use crate::parameters::{ParameterStorage, RUN_INDEX};
use crate::scheduler::Simulation;

/// Inputs for building one run
#[derive(Debug, Clone)]
pub struct RunSetup {
    pub run_index: usize,
    pub seed: u64,
    pub parameters: ParameterStorage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSummary {
    pub name: String,
    pub policy: MatchingPolicy,
    pub trade_count: u64,
    pub live_orders: usize,
    pub top: TopOfBook,
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_index: usize,
    pub seed: u64,
    pub delivered: u64,
    pub final_timestamp: Timestamp,
    pub journal_digest: String,
    pub exchanges: Vec<ExchangeSummary>,
}

impl RunReport {
    pub fn of(run_index: usize, simulation: &Simulation) -> Self {
        let exchanges = simulation
            .agents()
            .filter_map(|agent| agent.as_any().downcast_ref::<ExchangeAgent>())
            .map(|exchange| ExchangeSummary {
                name: exchange.name().to_string(),
                policy: exchange.book().policy(),
                trade_count: exchange.book().trade_count(),
                live_orders: exchange.book().live_order_count(),
                top: exchange.book().top_of_book(),
            })
            .collect();

        Self {
            run_index,
            seed: simulation.seed(),
            delivered: simulation.delivered_count(),
            final_timestamp: simulation.current_timestamp(),
            journal_digest: simulation.journal().digest(),
            exchanges,
        }
    }
}

/// Contiguous run-index blocks, one per thread
///
/// Each thread gets `runs / threads` runs; the first `runs % threads`
/// threads take one more.
pub fn split_runs(runs: usize, threads: usize) -> Vec<Range<usize>> {
    if threads == 0 {
        return Vec::new();
    }
    let share = runs / threads;
    let remainder = runs % threads;

    let mut next = 0;
    (0..threads)
        .map(|thread_index| {
            let end = next + share + usize::from(thread_index < remainder);
            let block = next..end;
            next = end;
            block
        })
        .collect()
}

/// Run `runs` simulations built by `build` on up to `threads` threads
///
/// Reports come back ordered by run index. The first failing run aborts the
/// batch with its error.
pub fn run_batch_with<F>(
    runs: usize,
    threads: usize,
    base_seed: u64,
    parameters: &ParameterStorage,
    build: F,
) -> Result<Vec<RunReport>, SimulationError>
where
    F: Fn(&RunSetup) -> Result<Simulation, SimulationError> + Sync,
{
    if threads == 0 {
        return Err(SimulationError::InvalidConfig {
            reason: "can not run a batch on 0 threads".to_string(),
        });
    }

    let blocks = split_runs(runs, threads);
    let build = &build;

    let results: Vec<Result<Vec<RunReport>, SimulationError>> = thread::scope(|scope| {
        let handles: Vec<_> = blocks
            .into_iter()
            .filter(|block| !block.is_empty())
            .map(|block| scope.spawn(move || run_block(block, base_seed, parameters, build)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut reports = Vec::with_capacity(runs);
    for result in results {
        reports.extend(result?);
    }
    Ok(reports)
}

/// Run every configured run to completion
pub fn run_batch(
    config: &SimulationConfig,
    parameters: &ParameterStorage,
    runs: usize,
    threads: usize,
) -> Result<Vec<RunReport>, SimulationError> {
    config.validate()?;
    run_batch_with(runs, threads, config.seed, parameters, |setup| {
        Simulation::from_config_with_seed(config, &setup.parameters, setup.seed)
    })
}

fn run_block<F>(
    block: Range<usize>,
    base_seed: u64,
    parameters: &ParameterStorage,
    build: &F,
) -> Result<Vec<RunReport>, SimulationError>
where
    F: Fn(&RunSetup) -> Result<Simulation, SimulationError>,
{
    let mut reports = Vec::with_capacity(block.len());
    for run_index in block {
        let mut run_parameters = parameters.clone();
        run_parameters.set(RUN_INDEX, run_index.to_string());
        let setup = RunSetup {
            run_index,
            seed: base_seed.wrapping_add(run_index as u64),
            parameters: run_parameters,
        };

        let mut simulation = build(&setup)?;
        simulation.simulate()?;

        let report = RunReport::of(run_index, &simulation);
        info!(
            run_index,
            seed = report.seed,
            delivered = report.delivered,
            digest = %report.journal_digest,
            "run finished"
        );
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_runs() {
        assert_eq!(split_runs(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(split_runs(2, 4), vec![0..1, 1..2, 2..2, 2..2]);
        assert_eq!(split_runs(6, 1), vec![0..6]);
        assert!(split_runs(5, 0).is_empty());
    }

    #[test]
    fn test_zero_threads_is_an_error() {
        let config = SimulationConfig::default();
        assert!(matches!(
            run_batch(&config, &ParameterStorage::new(), 1, 0),
            Err(SimulationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_batch_reports_in_run_order() {
        let config = SimulationConfig {
            duration: 100,
            seed: 7,
            ..SimulationConfig::default()
        };
        let reports = run_batch(&config, &ParameterStorage::new(), 5, 2).unwrap();

        let indices: Vec<_> = reports.iter().map(|r| r.run_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(reports[3].seed, 10);
        assert!(reports.iter().all(|r| r.delivered == 2 && r.final_timestamp == 100));
        assert_eq!(reports[0].exchanges[0].name, "EXCHANGE");
    }
}
