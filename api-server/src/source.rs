//! Where the mock handlers get their values from.
//!
//! Handlers never call `rand` directly. They draw every synthesized field from a
//! [`DataSource`], so a server started with `--seed` answers identically for an
//! identical sequence of requests.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub trait DataSource: Send + Sync {
    /// Current time as seen by the handlers.
    fn now(&self) -> DateTime<Utc>;

    /// Next raw 64-bit value.
    fn next_u64(&self) -> u64;

    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, n)`; zero when `n == 0`.
    fn below(&self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.next_u64() % n
        }
    }

    /// Uniform integer in `[lo, hi]`.
    fn between(&self, lo: u64, hi: u64) -> u64 {
        lo + self.below(hi.saturating_sub(lo) + 1)
    }

    fn index(&self, len: usize) -> usize {
        self.below(len as u64) as usize
    }

    fn coin(&self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// `value * max`, rounded to `places` decimals.
    fn scaled(&self, max: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (self.unit() * max * factor).round() / factor
    }

    /// Decimal string in `[0, max)` with fixed `places`.
    fn fixed(&self, max: f64, places: usize) -> String {
        format!("{:.*}", places, self.unit() * max)
    }

    /// `chars` lowercase hex digits.
    fn hex(&self, chars: usize) -> String {
        let mut out = String::with_capacity(chars);
        while out.len() < chars {
            let mut word = self.next_u64();
            for _ in 0..16 {
                if out.len() == chars {
                    break;
                }
                out.push(HEX_DIGITS[(word & 0xf) as usize] as char);
                word >>= 4;
            }
        }
        out
    }

    fn address(&self) -> String {
        format!("0x{}", self.hex(40))
    }

    fn tx_hash(&self) -> String {
        format!("0x{}", self.hex(64))
    }

    /// `<prefix>_<unix millis>`, the id shape every created entity uses.
    fn id(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.now().timestamp_millis())
    }
}

/// Thread-local OS-seeded randomness and the wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSource;

impl DataSource for RandomSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn next_u64(&self) -> u64 {
        rand::thread_rng().gen()
    }
}

/// Deterministic source: a ChaCha8 stream and a clock frozen at construction.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<ChaCha8Rng>,
    clock: DateTime<Utc>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, Utc::now())
    }

    pub fn with_clock(seed: u64, clock: DateTime<Utc>) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            clock,
        }
    }
}

impl DataSource for SeededSource {
    fn now(&self) -> DateTime<Utc> {
        self.clock
    }

    fn next_u64(&self) -> u64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen()
    }
}
