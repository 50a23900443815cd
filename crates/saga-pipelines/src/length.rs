//! Message-count policy for a synthesized month.

use saga_settings::SynthesisSettings;

/// How a month's message count compares to the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthCheck {
    /// Within `[min, max]`.
    Within,
    /// Below the floor by `missing` messages.
    Short {
        /// Messages needed to reach the floor.
        missing: usize,
    },
    /// Above the ceiling by `excess` messages.
    Long {
        /// Messages past the ceiling.
        excess: usize,
    },
}

/// Floor and ceiling on messages per month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthPolicy {
    /// Floor; shorter months trigger continuation.
    pub min: usize,
    /// Ceiling; longer months are truncated.
    pub max: usize,
}

impl LengthPolicy {
    /// Policy with the given bounds.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Classify a message count.
    pub fn check(&self, len: usize) -> LengthCheck {
        if len < self.min {
            LengthCheck::Short {
                missing: self.min - len,
            }
        } else if len > self.max {
            LengthCheck::Long {
                excess: len - self.max,
            }
        } else {
            LengthCheck::Within
        }
    }

    /// Keep the first `max` items; returns how many were dropped.
    pub fn truncate<T>(&self, items: &mut Vec<T>) -> usize {
        let dropped = items.len().saturating_sub(self.max);
        items.truncate(self.max);
        dropped
    }
}

impl From<&SynthesisSettings> for LengthPolicy {
    fn from(settings: &SynthesisSettings) -> Self {
        Self::new(settings.min_messages, settings.max_messages)
    }
}
