//! Slug allocation in random or sequential mode.

use super::registry::SlugRegistry;
use crate::config::SlugMode;
use anyhow::{Result, bail};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Smallest slug drawn in random mode.
pub const RANDOM_MIN: u32 = 100_000;
/// Largest slug drawn in random mode.
pub const RANDOM_MAX: u32 = 999_999;

/// Upper bound on random draws before giving up.
const MAX_RANDOM_ATTEMPTS: usize = 100_000;

/// Where the sequential counter lives between allocations.
///
/// `advance_to` is called after every sequential allocation with the next
/// start value and must persist it before returning.
pub trait SequenceStore {
    /// The configured starting point for the next sequential scan.
    fn sequence_start(&self) -> i64;

    /// Persist the next starting point.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted
    fn advance_to(&mut self, next: i64) -> Result<()>;
}

impl SequenceStore for i64 {
    fn sequence_start(&self) -> i64 {
        *self
    }

    fn advance_to(&mut self, next: i64) -> Result<()> {
        *self = next;
        Ok(())
    }
}

/// Issues slugs that are unique across the registry and any extra known ids.
pub struct SlugAllocator<'a, R: Rng> {
    /// Registry of every slug issued so far
    registry: &'a mut SlugRegistry,
    /// Allocation strategy
    mode: SlugMode,
    /// Random source for [`SlugMode::Random`]
    rng: R,
    /// Ids known to be taken but not in the registry
    reserved: HashSet<String>,
}

impl<'a> SlugAllocator<'a, rand::rngs::ThreadRng> {
    /// Create an allocator backed by the thread-local random generator.
    #[must_use]
    pub fn new(registry: &'a mut SlugRegistry, mode: SlugMode) -> Self {
        Self::with_rng(registry, mode, rand::rng())
    }
}

impl<'a, R: Rng> SlugAllocator<'a, R> {
    /// Create an allocator with an explicit random source.
    #[must_use]
    pub fn with_rng(registry: &'a mut SlugRegistry, mode: SlugMode, rng: R) -> Self {
        Self {
            registry,
            mode,
            rng,
            reserved: HashSet::new(),
        }
    }

    /// Treat `ids` as taken in addition to the registry contents.
    #[must_use]
    pub fn reserve<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if `id` may not be issued.
    fn is_taken(&self, id: &str) -> bool {
        self.registry.contains(id) || self.reserved.contains(id)
    }

    /// Allocate a fresh slug and record it in the registry.
    ///
    /// In sequential mode the counter in `sequence` is advanced past the
    /// issued value. A start below 1 is treated as 1.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The random space is exhausted
    /// - The registry or the sequence counter cannot be persisted
    pub fn allocate(&mut self, sequence: &mut dyn SequenceStore) -> Result<String> {
        let slug = match self.mode {
            SlugMode::Random => self.next_random()?,
            SlugMode::Sequential => {
                let (slug, found) = self.next_sequential(sequence.sequence_start());
                sequence.advance_to(found + 1)?;
                slug
            }
        };

        self.registry.record(&slug)?;
        debug!(slug = %slug, mode = ?self.mode, "allocated slug");
        Ok(slug)
    }

    /// Draw random six-digit values until one is free.
    fn next_random(&mut self) -> Result<String> {
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let candidate = self.rng.random_range(RANDOM_MIN..=RANDOM_MAX).to_string();
            if !self.is_taken(&candidate) {
                return Ok(candidate);
            }
        }
        bail!("Could not find an unused random slug after {MAX_RANDOM_ATTEMPTS} attempts")
    }

    /// Scan upward from `start` for the first free integer.
    fn next_sequential(&self, start: i64) -> (String, i64) {
        let mut value = start.max(1);
        loop {
            let candidate = value.to_string();
            if !self.is_taken(&candidate) {
                return (candidate, value);
            }
            value += 1;
        }
    }
}
