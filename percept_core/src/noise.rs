// percept_core/src/noise.rs

//! Stochastic and deterministic measurement perturbations.
//!
//! `Gaussian` owns its random stream so that every channel of every sensor
//! can be given an independent, individually seedable source. `Bias` is a
//! pure additive offset.

use nalgebra::SVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Open01;
use std::f64::consts::TAU;

/// Zero-mean Gaussian noise drawn with the Box–Muller transform.
#[derive(Debug, Clone)]
pub struct Gaussian<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl Gaussian<ChaCha8Rng> {
    /// A reproducible stream.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// A reproducible stream that is independent of every other `stream`
    /// index derived from the same seed.
    pub fn seeded_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self::with_rng(rng)
    }

    /// A stream seeded from the operating system, for runtime variability.
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Gaussian<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// One standard-normal draw. Both uniforms are fresh per call and `u1`
    /// comes from the open interval (0, 1), so `ln(u1)` is always finite.
    pub fn standard_normal(&mut self) -> f64 {
        let u1: f64 = self.rng.sample(Open01);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    /// Returns `value + N(0, sigma²)`. A zero sigma returns `value` untouched.
    pub fn apply(&mut self, value: f64, sigma: f64) -> f64 {
        if sigma == 0.0 {
            return value;
        }
        value + sigma * self.standard_normal()
    }

    /// Component-wise `apply` with an independent draw per component.
    pub fn apply_vector<const D: usize>(
        &mut self,
        value: &SVector<f64, D>,
        sigma: &SVector<f64, D>,
    ) -> SVector<f64, D> {
        SVector::<f64, D>::from_fn(|i, _| self.apply(value[i], sigma[i]))
    }
}

/// Constant additive offset. Deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bias;

impl Bias {
    pub fn apply(value: f64, bias: f64) -> f64 {
        value + bias
    }

    pub fn apply_vector<const D: usize>(
        value: &SVector<f64, D>,
        bias: &SVector<f64, D>,
    ) -> SVector<f64, D> {
        value + bias
    }
}
