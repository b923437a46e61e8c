use std::fmt::{self, Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::Color;

/// Supplies colors for newly created pieces.
///
/// The board calls this once per spawned piece. Any `FnMut() -> Color`
/// closure is a color source, which makes scripted sequences easy to inject
/// in tests; [`SeededColors`] is the uniform random source used in play.
pub trait ColorSource {
    /// Returns the color of the next piece from a palette of `color_count`
    /// colors.
    fn next_color(&mut self, color_count: u8) -> Color;
}

impl<F> ColorSource for F
where
    F: FnMut() -> Color,
{
    fn next_color(&mut self, _color_count: u8) -> Color {
        self()
    }
}

/// Seed for deterministic color generation.
///
/// A 128-bit seed that initializes the generator behind [`SeededColors`].
/// Two sessions built from the same seed and fed the same swaps produce the
/// same boards, events and score.
///
/// Serialized as a 32-character lowercase hex string.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use tilecrush_engine::ColorSeed;
///
/// let seed: ColorSeed = rand::rng().random();
/// let text = seed.to_string();
/// assert_eq!(text.parse::<ColorSeed>().unwrap(), seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSeed([u8; 16]);

impl ColorSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl fmt::Display for ColorSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.to_u128())
    }
}

impl std::str::FromStr for ColorSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for ColorSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for ColorSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `ColorSeed` values with `rng.random()`.
impl Distribution<ColorSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ColorSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ColorSeed(seed)
    }
}

/// Uniform random colors from a seeded PCG generator.
#[derive(Debug, Clone)]
pub struct SeededColors {
    rng: Pcg32,
    seed: ColorSeed,
}

impl Default for SeededColors {
    fn default() -> Self {
        Self::new()
    }
}

impl SeededColors {
    /// Creates a source seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: ColorSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> ColorSeed {
        self.seed
    }
}

impl ColorSource for SeededColors {
    fn next_color(&mut self, color_count: u8) -> Color {
        Color::new(self.rng.random_range(0..color_count))
    }
}
