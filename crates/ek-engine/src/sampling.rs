//! Index sampling: a reproducible "derandomized" stream and a seeded
//! bootstrap sampler.
//!
//! Code that needs bit-identical results across runs takes a
//! [`DerandomizedStream`]; resampling for dispersion estimates takes a
//! [`BootstrapSampler`] with an explicit seed.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DERANDOMIZED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Endless sequence of indices in `0..pool` built from consecutive shuffled
/// permutations of the pool.
///
/// Within every block of `pool` draws each index appears exactly once, so
/// any index appears at most `ceil(n / pool)` times in the first `n` draws.
/// The stream is a pure function of `(pool, sample_size)`.
#[derive(Debug, Clone)]
pub struct DerandomizedStream {
    pool: usize,
    rng: ChaCha8Rng,
    permutation: Vec<usize>,
    position: usize,
}

impl DerandomizedStream {
    pub fn new(pool: usize, sample_size: usize) -> Self {
        let seed = ((pool as u64) << 32) ^ (sample_size as u64) ^ DERANDOMIZED_SALT;
        Self {
            pool,
            rng: ChaCha8Rng::seed_from_u64(seed),
            permutation: Vec::with_capacity(pool),
            position: 0,
        }
    }

    /// Next `n` indices of the stream; empty when the pool is empty.
    pub fn draw(&mut self, n: usize) -> Vec<usize> {
        self.by_ref().take(n).collect()
    }
}

impl Iterator for DerandomizedStream {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pool == 0 {
            return None;
        }
        if self.position == self.permutation.len() {
            self.permutation.clear();
            self.permutation.extend(0..self.pool);
            self.permutation.shuffle(&mut self.rng);
            self.position = 0;
        }
        let index = self.permutation[self.position];
        self.position += 1;
        Some(index)
    }
}

/// `size` indices in `0..pool`, each appearing at most `ceil(size / pool)`
/// times. Identical arguments always give identical output.
pub fn randint_derandomized(pool: usize, size: usize) -> Vec<usize> {
    DerandomizedStream::new(pool, size).draw(size)
}

/// Select `size` entries of `data` with [`randint_derandomized`].
pub fn resample_derandomized(data: &[f64], size: usize) -> Vec<f64> {
    randint_derandomized(data.len(), size)
        .into_iter()
        .map(|i| data[i])
        .collect()
}

/// Sampling with replacement for bootstrap estimates.
#[derive(Debug, Clone)]
pub struct BootstrapSampler {
    rng: ChaCha8Rng,
}

impl BootstrapSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// `n` indices drawn uniformly with replacement from `0..n`.
    pub fn indices(&mut self, n: usize) -> Vec<usize> {
        (0..n).map(|_| self.rng.gen_range(0..n)).collect()
    }

    pub fn resample(&mut self, data: &[f64]) -> Vec<f64> {
        self.indices(data.len()).into_iter().map(|i| data[i]).collect()
    }
}
