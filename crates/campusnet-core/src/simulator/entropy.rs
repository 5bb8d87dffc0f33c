// ── Randomness capability ──
//
// The simulator never reaches for a global RNG. Each task owns an
// `Entropy` value, so runs can be OS-seeded, reproducible from a seed, or
// scripted draw-by-draw in tests.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the uniform draws the simulator needs.
pub trait Entropy: Send + 'static {
    /// Uniform integer in the closed range `[low, high]`.
    fn int_in(&mut self, low: i32, high: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

/// [`Entropy`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngEntropy<R = StdRng>(R);

impl RngEntropy<StdRng> {
    /// Seeded from the operating system.
    pub fn from_os() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Deterministic stream for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + 'static> RngEntropy<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng + Send + 'static> Entropy for RngEntropy<R> {
    fn int_in(&mut self, low: i32, high: i32) -> i32 {
        self.0.gen_range(low..=high)
    }

    fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// Replays fixed draws in order.
///
/// Once a queue runs dry, integer draws yield 0 and float draws yield
/// 0.0. Scripted values are clamped into the requested range so a script
/// can never push the simulator outside its documented bounds.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
    ints: VecDeque<i32>,
    units: VecDeque<f64>,
}

impl ScriptedEntropy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ints(mut self, draws: impl IntoIterator<Item = i32>) -> Self {
        self.ints.extend(draws);
        self
    }

    pub fn with_units(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(draws);
        self
    }

    /// Draws not yet consumed, as `(ints, units)`.
    pub fn remaining(&self) -> (usize, usize) {
        (self.ints.len(), self.units.len())
    }
}

impl Entropy for ScriptedEntropy {
    fn int_in(&mut self, low: i32, high: i32) -> i32 {
        self.ints.pop_front().unwrap_or(0).clamp(low, high)
    }

    fn unit(&mut self) -> f64 {
        let draw = self.units.pop_front().unwrap_or(0.0);
        draw.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
