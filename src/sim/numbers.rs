//! Monster values and chain products
//!
//! A monster dies only when the chain product of the blast that reaches it
//! equals its value, so both sides of the comparison live here.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;

/// Smallest and largest single draw used by the product policy
pub const DRAW_MIN: u64 = 1;
pub const DRAW_MAX: u64 = 9;

/// Running product of fire ranges within one explosion cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    product: u64,
    bombs: u32,
}

impl ChainContext {
    /// Start a cascade at the first bomb's fire range
    pub fn start(fire_range: u32) -> Self {
        Self {
            product: u64::from(fire_range),
            bombs: 1,
        }
    }

    /// Fold a chained bomb into the running product
    pub fn extend(&mut self, fire_range: u32) {
        self.product = self.product.saturating_mul(u64::from(fire_range));
        self.bombs += 1;
    }

    pub fn product(&self) -> u64 {
        self.product
    }

    /// Number of bombs detonated in this cascade so far
    pub fn bombs(&self) -> u32 {
        self.bombs
    }
}

/// Strategy that picks the value a monster must be hit with
pub trait MonsterValuePolicy: fmt::Debug {
    fn generate(&self, monster_level: u32, rng: &mut SimRng) -> u64;
}

/// Product of `monster_level` independent uniform draws from [1, 9].
///
/// Level 1 gives 1..=9, level 2 gives products of two digits, and so on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductOfDraws;

impl MonsterValuePolicy for ProductOfDraws {
    fn generate(&self, monster_level: u32, rng: &mut SimRng) -> u64 {
        let draw = rng.random_range(DRAW_MIN..=DRAW_MAX);
        if monster_level <= 1 {
            draw
        } else {
            draw.saturating_mul(self.generate(monster_level - 1, rng))
        }
    }
}

/// Uniform draw from [1, max] resampled while prime. Ignores the level.
///
/// Alternative target policy. Products of bomb ranges can never
/// reach a prime above 9, so primes are excluded up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPrimeDraw {
    pub max: u64,
}

impl Default for NonPrimeDraw {
    fn default() -> Self {
        Self { max: 98 }
    }
}

impl MonsterValuePolicy for NonPrimeDraw {
    fn generate(&self, _monster_level: u32, rng: &mut SimRng) -> u64 {
        let max = self.max.max(1);
        loop {
            let value = rng.random_range(1..=max);
            if !is_prime(value) {
                return value;
            }
        }
    }
}

/// Serializable selector for the built-in value policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePolicyKind {
    #[default]
    ProductOfDraws,
    NonPrimeDraw,
}

impl ValuePolicyKind {
    pub fn build(self) -> Box<dyn MonsterValuePolicy> {
        match self {
            ValuePolicyKind::ProductOfDraws => Box::new(ProductOfDraws),
            ValuePolicyKind::NonPrimeDraw => Box::new(NonPrimeDraw::default()),
        }
    }
}

/// Trial division; inputs stay small
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
