use std::sync::LazyLock;

use parking_lot::Mutex;
use rand::distr::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/* 📖 # Why SmallRng for random strings?

The strings produced here are for scratch file names and test fixtures, not secrets. SmallRng
is fast and can be seeded from a single `u64`, which makes runs reproducible when a seed is
configured. It is NOT cryptographically secure; anything that needs unguessable tokens must use
an OS-backed generator instead.
*/

static SHARED: LazyLock<TokenGenerator> = LazyLock::new(TokenGenerator::from_entropy);

/// Generator of alphanumeric (`0-9A-Za-z`) strings.
#[derive(Debug)]
pub struct TokenGenerator {
    rng: Mutex<SmallRng>,
}

impl TokenGenerator {
    /// Seeded once from the thread-local generator, which itself draws on OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_rng(&mut rand::rng())),
        }
    }

    /// Deterministic generator: the same seed always yields the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// The process-wide generator, created on first use.
    pub fn shared() -> &'static TokenGenerator {
        &SHARED
    }

    pub fn generate(&self, length: usize) -> String {
        let mut rng = self.rng.lock();
        std::iter::repeat_with(|| char::from(rng.sample(Alphanumeric)))
            .take(length)
            .collect()
    }
}
