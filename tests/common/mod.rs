#![allow(dead_code)]

use uc_events::{
    GenerationEngine, PolicyKind, SimulationConfig, SimulationResult, Simulator,
};

/// Run `target` for `generations` on the calling thread.
pub fn run_sequential(target: &str, generations: usize, policy: PolicyKind) -> SimulationResult {
    let config = SimulationConfig::new(target, generations)
        .expect("valid configuration")
        .with_policy(policy);
    Simulator::with_engine(config, GenerationEngine::sequential()).run()
}

/// Report text for a sequential run.
pub fn report_text(target: &str, generations: usize, policy: PolicyKind) -> String {
    run_sequential(target, generations, policy).report().to_string()
}
