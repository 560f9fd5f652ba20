use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const ID_LENGTH: usize = 10;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Source of fresh user ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Draw `ID_LENGTH` characters uniformly from `[A-Za-z0-9]`.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Ids from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        generate_id(&mut rand::rng())
    }
}

/// Reproducible ids for tests and fixed-seed deployments.
pub struct SeededIdGenerator {
    rng: Mutex<StdRng>,
}

impl SeededIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IdGenerator for SeededIdGenerator {
    fn next_id(&self) -> String {
        generate_id(&mut *self.rng.lock())
    }
}
