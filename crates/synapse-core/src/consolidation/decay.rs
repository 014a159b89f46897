//! Scheduled power-law decay (§4.F "Power-law decay").
//!
//! Time-parameterized, not rate-parameterized: running the pass more
//! often does not forget faster, because the decay formula is a
//! function of elapsed wall-clock hours, not of how many times it runs.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::DecayConfig;
use crate::error::Result;
use crate::memory::NodeKind;
use crate::storage::Storage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayStats {
    pub memories_decayed: u64,
    pub concepts_decayed: u64,
    pub zeroed: u64,
}

/// `act' = act * h^(-rho)`, h clamped to >= `min_hours`; values below
/// `zero_threshold` snap to zero.
fn decay_one(current: f32, hours_elapsed: f64, config: &DecayConfig) -> f32 {
    let h = hours_elapsed.max(config.min_hours);
    let decayed = (current as f64) * h.powf(-config.exponent);
    if decayed < config.zero_threshold {
        0.0
    } else {
        decayed as f32
    }
}

/// Run the decay pass over every memory and concept with positive
/// activation and a `last_activated` older than `min_hours` (§4.F).
pub fn run_decay(storage: &Storage, config: &DecayConfig) -> Result<DecayStats> {
    let now = Utc::now();
    let mut stats = DecayStats::default();

    for memory in storage.all_memories()? {
        let Some(last_activated) = memory.last_activated else {
            continue;
        };
        if memory.current_activation <= 0.0 {
            continue;
        }
        let hours_elapsed = (now - last_activated).num_milliseconds() as f64 / 3_600_000.0;
        if hours_elapsed < config.min_hours {
            continue;
        }

        let next = decay_one(memory.current_activation, hours_elapsed, config);
        if (next - memory.current_activation).abs() > f32::EPSILON {
            storage.set_activation(&memory.id, NodeKind::Memory, next)?;
            stats.memories_decayed += 1;
            if next == 0.0 {
                stats.zeroed += 1;
            }
        }
    }

    for concept in storage.all_concepts()? {
        let Some(last_activated) = concept.last_activated else {
            continue;
        };
        if concept.current_activation <= 0.0 {
            continue;
        }
        let hours_elapsed = (now - last_activated).num_milliseconds() as f64 / 3_600_000.0;
        if hours_elapsed < config.min_hours {
            continue;
        }

        let next = decay_one(concept.current_activation, hours_elapsed, config);
        if (next - concept.current_activation).abs() > f32::EPSILON {
            storage.set_activation(&concept.id, NodeKind::Concept, next)?;
            stats.concepts_decayed += 1;
            if next == 0.0 {
                stats.zeroed += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_elapsed_time_decays_more() {
        let config = DecayConfig::default();
        let short = decay_one(1.0, 2.0, &config);
        let long = decay_one(1.0, 200.0, &config);
        assert!(long < short);
    }

    #[test]
    fn below_zero_threshold_snaps_to_zero() {
        let config = DecayConfig {
            zero_threshold: 0.5,
            ..DecayConfig::default()
        };
        assert_eq!(decay_one(0.6, 10.0, &config), 0.0);
    }

    #[test]
    fn elapsed_below_min_hours_is_clamped_not_amplified() {
        let config = DecayConfig::default();
        let clamped = decay_one(1.0, 0.1, &config);
        let at_min = decay_one(1.0, config.min_hours, &config);
        assert!((clamped - at_min).abs() < 1e-6);
    }
}
