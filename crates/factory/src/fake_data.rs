//! Random value sources for factories
//!
//! Factories never reach for a global generator. Every random value is drawn
//! from the [`RandomSource`] carried by the [`FactoryContext`](crate::FactoryContext),
//! so a seeded source makes a whole synthesis run reproducible.

use chrono::{DateTime, Duration, Utc};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of random values consumed by factory definitions and states.
///
/// The trait is object safe; generic helpers live on [`RandomSourceExt`].
pub trait RandomSource {
    /// Raw 64 random bits
    fn next_u64(&mut self) -> u64;

    /// Uniform index in `0..len`. Panics when `len` is zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform integer in `min..=max`
    fn int_between(&mut self, min: i64, max: i64) -> i64;

    /// Uniform float in `min..=max`, rounded to `decimals` places
    fn float_between(&mut self, min: f64, max: f64, decimals: u32) -> f64;

    /// `true` with the given probability (clamped to `0.0..=1.0`)
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform instant in `start..=end`; returns `start` when the range is empty
    fn date_time_between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc>;

    /// Reference instant that relative dates are computed from
    fn now(&self) -> DateTime<Utc>;

    fn word(&mut self) -> String;
    fn words(&mut self, min: usize, max: usize) -> Vec<String>;
    fn sentence(&mut self, min_words: usize, max_words: usize) -> String;
    fn paragraph(&mut self, min_sentences: usize, max_sentences: usize) -> String;
    fn name(&mut self) -> String;
    fn user_name(&mut self) -> String;
    fn safe_email(&mut self) -> String;
    fn company_name(&mut self) -> String;
    fn city(&mut self) -> String;
}

/// Generic helpers built on top of any [`RandomSource`]
pub trait RandomSourceExt: RandomSource {
    /// Pick one element uniformly. Panics when `items` is empty.
    fn element<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.index(items.len());
        &items[idx]
    }

    /// Pick one element with probability proportional to its weight.
    /// Panics when `items` is empty or every weight is zero.
    fn weighted<'a, T>(&mut self, items: &'a [(T, u32)]) -> &'a T {
        let total: u64 = items.iter().map(|(_, w)| u64::from(*w)).sum();
        assert!(total > 0, "weighted choice needs a positive total weight");

        let mut roll = self.int_between(0, total as i64 - 1) as u64;
        for (item, weight) in items {
            let weight = u64::from(*weight);
            if roll < weight {
                return item;
            }
            roll -= weight;
        }
        &items[items.len() - 1].0
    }

    /// Produce a value with the given probability, `None` otherwise
    fn optional<T, F>(&mut self, probability: f64, generate: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> T,
    {
        if self.chance(probability) {
            Some(generate(self))
        } else {
            None
        }
    }

    /// Instant within the last `days` days
    fn past_date_time(&mut self, days: i64) -> DateTime<Utc> {
        let now = self.now();
        self.date_time_between(now - Duration::days(days), now)
    }

    /// Instant within the next `days` days
    fn future_date_time(&mut self, days: i64) -> DateTime<Utc> {
        let now = self.now();
        self.date_time_between(now + Duration::minutes(1), now + Duration::days(days))
    }

    /// `#rrggbb` colour
    fn hex_color(&mut self) -> String {
        format!("#{:06x}", self.int_between(0, 0xFF_FFFF))
    }

    /// Lowercase words joined by dashes
    fn slug(&mut self, min_words: usize, max_words: usize) -> String {
        self.words(min_words, max_words)
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Alphanumeric token of the given length
    fn token(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(*self.element(TOKEN_ALPHABET)))
            .collect()
    }

    /// Numeric string of the given length without a leading zero
    fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|i| {
                let min = if i == 0 { 1 } else { 0 };
                char::from(b'0' + self.int_between(min, 9) as u8)
            })
            .collect()
    }

    /// Version 4 UUID built from the source's bits
    fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.next_u64().to_le_bytes());
        bytes[8..].copy_from_slice(&self.next_u64().to_le_bytes());
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

impl<R: RandomSource + ?Sized> RandomSourceExt for R {}

/// [`RandomSource`] backed by a `StdRng` and the `fake` crate's English locale
pub struct SeededRandom {
    rng: StdRng,
    anchor: DateTime<Utc>,
    seed: Option<u64>,
}

impl SeededRandom {
    /// Deterministic source for the given seed, anchored at the current time
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            anchor: Utc::now(),
            seed: Some(seed),
        }
    }

    /// Non-reproducible source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            anchor: Utc::now(),
            seed: None,
        }
    }

    /// Pin the reference instant so relative dates are reproducible too
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl std::fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededRandom")
            .field("seed", &self.seed)
            .field("anchor", &self.anchor)
            .finish()
    }
}

impl RandomSource for SeededRandom {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn int_between(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn float_between(&mut self, min: f64, max: f64, decimals: u32) -> f64 {
        let raw = if max <= min {
            min
        } else {
            self.rng.gen_range(min..=max)
        };
        let factor = 10f64.powi(decimals as i32);
        ((raw * factor).round() / factor).clamp(min, max.max(min))
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn date_time_between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
        let span = (end - start).num_seconds();
        if span <= 0 {
            return start;
        }
        start + Duration::seconds(self.rng.gen_range(0..=span))
    }

    fn now(&self) -> DateTime<Utc> {
        self.anchor
    }

    fn word(&mut self) -> String {
        Word().fake_with_rng(&mut self.rng)
    }

    fn words(&mut self, min: usize, max: usize) -> Vec<String> {
        Words(min..max.max(min) + 1).fake_with_rng(&mut self.rng)
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        Sentence(min_words..max_words.max(min_words) + 1).fake_with_rng(&mut self.rng)
    }

    fn paragraph(&mut self, min_sentences: usize, max_sentences: usize) -> String {
        Paragraph(min_sentences..max_sentences.max(min_sentences) + 1).fake_with_rng(&mut self.rng)
    }

    fn name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    fn user_name(&mut self) -> String {
        Username().fake_with_rng(&mut self.rng)
    }

    fn safe_email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    fn company_name(&mut self) -> String {
        CompanyName().fake_with_rng(&mut self.rng)
    }

    fn city(&mut self) -> String {
        CityName().fake_with_rng(&mut self.rng)
    }
}
