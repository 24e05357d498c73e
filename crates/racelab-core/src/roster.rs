//! Generates the work units for a run.
//!
//! Names and prompts come from the multi-agent walkthrough the demos follow.
//! Past the sixth unit names repeat with a numeric suffix (`Researcher-2`),
//! which keeps every id, and therefore every payload, unique.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::DemoConfig,
    domain::{UnitId, WorkUnit},
    Result,
};

/// Agent names paired with the prompt each one works on.
pub const AGENTS: [(&str, &str); 6] = [
    (
        "Researcher",
        "Research the latest trends in multi-agent AI systems",
    ),
    (
        "Analyzer",
        "Analyze the key challenges in implementing these systems",
    ),
    (
        "Writer",
        "Write a summary of the main findings and recommendations",
    ),
    (
        "Critic",
        "Critique the proposed approaches for potential issues",
    ),
    ("Summarizer", "Summarize the key insights from the research"),
    (
        "Validator",
        "Validate the conclusions against best practices",
    ),
];

/// Build `config.units` work units.
///
/// Each latency is `config.latency` plus a uniform draw from
/// `[0, config.jitter]`. With `config.seed` set, the same config always
/// yields the same units.
pub fn generate(config: &DemoConfig) -> Result<Vec<WorkUnit>> {
    config.validate()?;
    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    (0..config.units)
        .map(|index| {
            let (name, prompt) = AGENTS[index % AGENTS.len()];
            let round = index / AGENTS.len();
            let id = if round == 0 {
                UnitId::parse(name)?
            } else {
                UnitId::parse(format!("{name}-{}", round + 1))?
            };
            let latency = config.latency + jitter(&mut rng, config);
            let payload = format!("{id}: {prompt}");
            WorkUnit::new(id, latency, payload)
        })
        .collect()
}

fn jitter(rng: &mut StdRng, config: &DemoConfig) -> std::time::Duration {
    if config.jitter.is_zero() {
        return std::time::Duration::ZERO;
    }
    let max_micros = u64::try_from(config.jitter.as_micros()).unwrap_or(u64::MAX);
    std::time::Duration::from_micros(rng.gen_range(0..=max_micros))
}
