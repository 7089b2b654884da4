//! # Sequence Generators Module
//!
//! The integer sequences whose spectra the pipeline studies. Every generator
//! is a deterministic function of `(trial_index, length)`; randomized ones
//! draw from [`seeded_rng`] keyed by the trial index.
//!
//! ## Generators
//! - Random Fibonacci: each term is the sum or difference of the previous two
//! - Uniform white noise over the non-negative 32-bit range
//! - Prime numbers, identical for every trial
//! - Coin toss random walk with unit steps

use once_cell::sync::Lazy;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::rng::seeded_rng;

/// Upper bound of the precomputed prime sieve.
const SIEVE_LIMIT: usize = 200_000;

/// Primes below [`SIEVE_LIMIT`], computed once on first use.
///
/// This covers the first ~18k primes; longer requests continue by trial
/// division against the table.
static PRIME_TABLE: Lazy<Vec<i64>> = Lazy::new(|| {
    let mut composite = vec![false; SIEVE_LIMIT];
    let mut primes = Vec::new();
    for n in 2..SIEVE_LIMIT {
        if composite[n] {
            continue;
        }
        primes.push(n as i64);
        for multiple in (n * n..SIEVE_LIMIT).step_by(n) {
            composite[multiple] = true;
        }
    }
    primes
});

/// Anything that can produce the integer sequence for one trial.
///
/// Sources must be `Sync` so trial workers can share them.
pub trait SequenceSource: Sync {
    /// Produces `len` values for trial `trial_index`.
    fn generate(&self, trial_index: u64, len: usize) -> Vec<i64>;
}

impl<F> SequenceSource for F
where
    F: Fn(u64, usize) -> Vec<i64> + Sync,
{
    fn generate(&self, trial_index: u64, len: usize) -> Vec<i64> {
        self(trial_index, len)
    }
}

/// The built-in generators, selectable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    RandomFibonacci,
    UniformWhite,
    Primes,
    CoinToss,
}

impl SequenceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SequenceKind::RandomFibonacci => "RandomFibonacci",
            SequenceKind::UniformWhite => "UniformWhite",
            SequenceKind::Primes => "Primes",
            SequenceKind::CoinToss => "CoinToss",
        }
    }
}

impl SequenceSource for SequenceKind {
    fn generate(&self, trial_index: u64, len: usize) -> Vec<i64> {
        match self {
            SequenceKind::RandomFibonacci => random_fibonacci(trial_index, len),
            SequenceKind::UniformWhite => uniform_white_noise(trial_index, len),
            SequenceKind::Primes => primes(len),
            SequenceKind::CoinToss => coin_toss_walk(trial_index, len),
        }
    }
}

/// Random Fibonacci sequence: starts `1, 1`, then each term is
/// `v[n-2] + v[n-1]` or `v[n-2] - v[n-1]` depending on a random bit.
///
/// Bits are consumed least-significant first from 32-bit draws. Terms wrap
/// on overflow, which only happens for very long sequences.
pub fn random_fibonacci(trial_index: u64, len: usize) -> Vec<i64> {
    let mut rng = seeded_rng(trial_index);
    let mut values = Vec::with_capacity(len);
    values.extend([1i64, 1].into_iter().take(len));

    let mut bits = 0u32;
    let mut bits_left = 0;
    for n in 2..len {
        if bits_left == 0 {
            bits = rng.next_u32();
            bits_left = 32;
        }
        let add = bits & 1 == 1;
        bits >>= 1;
        bits_left -= 1;

        let (a, b) = (values[n - 2], values[n - 1]);
        values.push(if add { a.wrapping_add(b) } else { a.wrapping_sub(b) });
    }
    values
}

/// Uniformly distributed integers in `[0, i32::MAX]`.
pub fn uniform_white_noise(trial_index: u64, len: usize) -> Vec<i64> {
    let mut rng = seeded_rng(trial_index);
    (0..len)
        .map(|_| i64::from(rng.gen_range(0..=i32::MAX)))
        .collect()
}

/// The first `len` primes, starting at 2.
pub fn primes(len: usize) -> Vec<i64> {
    let table = &*PRIME_TABLE;
    if len <= table.len() {
        return table[..len].to_vec();
    }

    let mut values = table.clone();
    let mut candidate = values.last().copied().unwrap_or(1) + 2;
    while values.len() < len {
        if is_prime(candidate, &values) {
            values.push(candidate);
        }
        candidate += 2;
    }
    values
}

/// Trial division against already known primes, which must cover
/// `sqrt(value)`.
fn is_prime(value: i64, known: &[i64]) -> bool {
    known
        .iter()
        .take_while(|&&p| p * p <= value)
        .all(|&p| value % p != 0)
}

/// Random walk from zero taking `+1` or `-1` steps with equal odds.
pub fn coin_toss_walk(trial_index: u64, len: usize) -> Vec<i64> {
    let mut rng = seeded_rng(trial_index);
    let mut position = 0i64;
    (0..len)
        .map(|_| {
            let current = position;
            position += if rng.gen_bool(0.5) { 1 } else { -1 };
            current
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_fibonacci_rules() {
        let values = random_fibonacci(3, 64);
        assert_eq!(values.len(), 64);
        assert_eq!(&values[..2], &[1, 1]);
        for n in 2..values.len() {
            let (a, b) = (values[n - 2], values[n - 1]);
            assert!(values[n] == a + b || values[n] == a - b, "term {n}");
        }
    }

    #[test]
    fn test_random_fibonacci_short_lengths() {
        assert!(random_fibonacci(0, 0).is_empty());
        assert_eq!(random_fibonacci(0, 1), vec![1]);
        assert_eq!(random_fibonacci(0, 2), vec![1, 1]);
    }

    #[test]
    fn test_generators_are_deterministic_per_trial() {
        for kind in [
            SequenceKind::RandomFibonacci,
            SequenceKind::UniformWhite,
            SequenceKind::CoinToss,
        ] {
            assert_eq!(kind.generate(11, 100), kind.generate(11, 100), "{}", kind.name());
            assert_ne!(kind.generate(11, 100), kind.generate(12, 100), "{}", kind.name());
        }
    }

    #[test]
    fn test_uniform_white_range() {
        let values = uniform_white_noise(5, 1000);
        assert!(values.iter().all(|&v| (0..=i64::from(i32::MAX)).contains(&v)));
        // not constant
        assert!(values.iter().any(|&v| v != values[0]));
    }

    #[test]
    fn test_primes_prefix() {
        assert_eq!(primes(10), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(SequenceKind::Primes.generate(0, 5), SequenceKind::Primes.generate(9, 5));
        assert!(primes(0).is_empty());
    }

    #[test]
    fn test_primes_beyond_sieve() {
        let count = PRIME_TABLE.len() + 10;
        let values = primes(count);
        assert_eq!(values.len(), count);
        for window in values.windows(2) {
            assert!(window[0] < window[1]);
        }
        let tail = &values[PRIME_TABLE.len()..];
        for &p in tail {
            assert!(p as usize > SIEVE_LIMIT);
            assert!((2..).take_while(|d| d * d <= p).all(|d| p % d != 0));
        }
    }

    #[test]
    fn test_coin_toss_unit_steps() {
        let walk = coin_toss_walk(2, 200);
        assert_eq!(walk[0], 0);
        assert!(walk.windows(2).all(|w| (w[1] - w[0]).abs() == 1));
    }

    #[test]
    fn test_closure_source() {
        let source = |trial: u64, len: usize| vec![trial as i64; len];
        assert_eq!(source.generate(4, 3), vec![4, 4, 4]);
    }

    #[test]
    fn test_kind_serializes_by_name() {
        let json = serde_json::to_string(&SequenceKind::UniformWhite).unwrap();
        assert_eq!(json, "\"UniformWhite\"");
    }
}
