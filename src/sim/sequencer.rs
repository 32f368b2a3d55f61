//! Beat sequencing and the difficulty ramp
//!
//! The sequencer owns a plan of beats that is extended lazily so it never runs
//! out, plus the ramp scalars that tighten after every executed beat. It only
//! decides *what* to spawn and *when*; the game turns a [`BeatPlan`] into
//! spawns and deferred tasks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawn::ForceBomb;
use crate::tuning::Tuning;

/// One scheduling unit of enemy spawning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Beat {
    /// One guaranteed target
    SingleSafe,
    /// One enemy, bomb by chance
    SingleRandom,
    /// A target and a bomb together
    PairOneBomb,
    PairRandom,
    Triple,
    Quadruple,
    /// Five enemies spread over the chain spacing
    Chain,
    /// Five enemies spread over half the chain spacing
    FastChain,
}

impl Beat {
    pub const ALL: [Beat; 8] = [
        Beat::SingleSafe,
        Beat::SingleRandom,
        Beat::PairOneBomb,
        Beat::PairRandom,
        Beat::Triple,
        Beat::Quadruple,
        Beat::Chain,
        Beat::FastChain,
    ];

    /// Gentle start before the random tail kicks in
    pub const OPENING: [Beat; 7] = [
        Beat::SingleSafe,
        Beat::SingleSafe,
        Beat::PairOneBomb,
        Beat::PairOneBomb,
        Beat::Triple,
        Beat::SingleRandom,
        Beat::Chain,
    ];
}

/// Difficulty ramp scalars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampState {
    /// Seconds between the field emptying and the next beat
    pub spawn_interval: f64,
    /// Seconds a chain spreads its spawns over
    pub chain_spacing: f64,
    /// Physics speed multiplier (0 when frozen)
    pub fall_speed: f32,
}

impl RampState {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            spawn_interval: tuning.spawn_interval,
            chain_spacing: tuning.chain_spacing,
            fall_speed: tuning.fall_speed,
        }
    }

    /// Tighten the ramp by one beat
    pub fn step(&mut self, tuning: &Tuning) {
        self.spawn_interval *= tuning.spawn_interval_decay;
        self.chain_spacing *= tuning.chain_spacing_decay;
        self.fall_speed *= tuning.fall_speed_growth;
    }

    /// Stop all motion
    pub fn freeze(&mut self) {
        self.fall_speed = 0.0;
    }
}

/// Spawns resolved from one beat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatPlan {
    /// Spawned right away
    pub immediate: Vec<ForceBomb>,
    /// (delay in seconds, forcing) spawned later if the run is still alive
    pub deferred: Vec<(f64, ForceBomb)>,
}

impl BeatPlan {
    pub fn total(&self) -> usize {
        self.immediate.len() + self.deferred.len()
    }

    fn simultaneous(count: usize) -> Self {
        Self {
            immediate: vec![ForceBomb::Random; count],
            deferred: Vec::new(),
        }
    }

    fn chain(spacing: f64, divisor: f64) -> Self {
        Self {
            immediate: vec![ForceBomb::Random],
            deferred: (1..=4)
                .map(|k| (spacing / divisor * k as f64, ForceBomb::Random))
                .collect(),
        }
    }

    /// Resolve a beat against the current chain spacing
    pub fn for_beat(beat: Beat, chain_spacing: f64) -> Self {
        match beat {
            Beat::SingleSafe => Self {
                immediate: vec![ForceBomb::Never],
                deferred: Vec::new(),
            },
            Beat::SingleRandom => Self::simultaneous(1),
            Beat::PairOneBomb => Self {
                immediate: vec![ForceBomb::Never, ForceBomb::Always],
                deferred: Vec::new(),
            },
            Beat::PairRandom => Self::simultaneous(2),
            Beat::Triple => Self::simultaneous(3),
            Beat::Quadruple => Self::simultaneous(4),
            Beat::Chain => Self::chain(chain_spacing, 5.0),
            Beat::FastChain => Self::chain(chain_spacing, 10.0),
        }
    }
}

/// Owns the beat plan, the play position and the ramp
#[derive(Debug, Clone)]
pub struct Sequencer {
    plan: Vec<Beat>,
    opening: Vec<Beat>,
    position: usize,
    ramp: RampState,
    tuning: Tuning,
}

impl Sequencer {
    pub fn new(tuning: &Tuning) -> Self {
        Self::with_opening(tuning, &Beat::OPENING)
    }

    /// Sequencer with a custom opening in place of the default one
    pub fn with_opening(tuning: &Tuning, opening: &[Beat]) -> Self {
        Self {
            plan: Vec::new(),
            opening: opening.to_vec(),
            position: 0,
            ramp: RampState::from_tuning(tuning),
            tuning: tuning.clone(),
        }
    }

    /// Append a batch of random beats, after the opening if the plan is empty
    pub fn extend_plan(&mut self, rng: &mut impl Rng) {
        if self.plan.is_empty() {
            self.plan.extend_from_slice(&self.opening);
        }
        let batch = self.tuning.plan_batch.max(1);
        self.plan.reserve(batch);
        for _ in 0..batch {
            let beat = Beat::ALL[rng.random_range(0..Beat::ALL.len())];
            self.plan.push(beat);
        }
        log::debug!("Beat plan extended to {} beats", self.plan.len());
    }

    /// Execute the beat at the current position and ramp up.
    ///
    /// Returns `None` once the run has ended.
    pub fn advance(&mut self, ended: bool, rng: &mut impl Rng) -> Option<(Beat, BeatPlan)> {
        if ended {
            return None;
        }
        if self.position >= self.plan.len() {
            self.extend_plan(rng);
        }

        let beat = self.plan[self.position];
        let plan = BeatPlan::for_beat(beat, self.ramp.chain_spacing);

        self.ramp.step(&self.tuning);
        self.position += 1;

        log::debug!(
            "Beat #{} {:?}: {} spawns, next interval {:.3}s",
            self.position,
            beat,
            plan.total(),
            self.ramp.spawn_interval
        );
        Some((beat, plan))
    }

    pub fn ramp(&self) -> &RampState {
        &self.ramp
    }

    pub fn freeze(&mut self) {
        self.ramp.freeze();
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn plan(&self) -> &[Beat] {
        &self.plan
    }
}
