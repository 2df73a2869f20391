use chrono::DateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use redate_core::commit::Timestamp;

use crate::RewriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    pub fn seconds(self) -> i64 {
        match self {
            IntervalUnit::Seconds => 1,
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 3600,
            IntervalUnit::Days => 86400,
        }
    }
}

impl std::str::FromStr for IntervalUnit {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "sec" | "seconds" => Ok(IntervalUnit::Seconds),
            "m" | "min" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hours" => Ok(IntervalUnit::Hours),
            "d" | "days" => Ok(IntervalUnit::Days),
            other => Err(RewriteError::InvalidRuleConfig(format!(
                "unknown interval unit '{other}'"
            ))),
        }
    }
}

/// Which end of the history the start instant is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The root commit lands on the start instant; time runs forward.
    OldestFirst,
    /// The newest commit lands on the start instant; earlier commits are
    /// pushed back one interval each.
    NewestFirst,
}

impl std::str::FromStr for Direction {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oldest-first" => Ok(Direction::OldestFirst),
            "newest-first" => Ok(Direction::NewestFirst),
            other => Err(RewriteError::InvalidRuleConfig(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    pub bound_seconds: i64,
    pub seed: u64,
}

/// Timestamp assignment rule. Pure given its inputs: compiling the same
/// config against the same commit count always yields the same schedule.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    pub start: Timestamp,
    pub interval: i64,
    pub unit: IntervalUnit,
    pub direction: Direction,
    pub jitter: Option<Jitter>,
}

impl RuleConfig {
    /// Parse an RFC 3339 start timestamp; its offset becomes the timezone
    /// offset of every assigned timestamp.
    pub fn parse_start(s: &str) -> Result<Timestamp, RewriteError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            RewriteError::InvalidRuleConfig(format!("unparseable start timestamp '{s}': {e}"))
        })?;
        Ok(Timestamp::new(
            dt.timestamp(),
            dt.offset().local_minus_utc() / 60,
        ))
    }

    pub fn step_seconds(&self) -> i64 {
        self.interval.saturating_mul(self.unit.seconds())
    }

    pub fn validate(&self) -> Result<(), RewriteError> {
        if self.interval <= 0 {
            return Err(RewriteError::InvalidRuleConfig(format!(
                "interval must be positive, got {}",
                self.interval
            )));
        }
        if let Some(jitter) = self.jitter {
            if jitter.bound_seconds < 0 {
                return Err(RewriteError::InvalidRuleConfig(format!(
                    "jitter bound must be non-negative, got {}",
                    jitter.bound_seconds
                )));
            }
            if jitter.bound_seconds >= self.step_seconds() {
                return Err(RewriteError::InvalidRuleConfig(format!(
                    "jitter bound {}s must be smaller than the interval {}s",
                    jitter.bound_seconds,
                    self.step_seconds()
                )));
            }
        }
        Ok(())
    }

    /// Compile the rule against a known commit count, producing one instant
    /// per ordinal position in topological order.
    pub fn compile(&self, commit_count: usize) -> Result<Schedule, RewriteError> {
        self.validate()?;
        let step = self.step_seconds();
        let count = commit_count as i64;
        let mut seconds: Vec<i64> = (0..count)
            .map(|i| match self.direction {
                Direction::OldestFirst => self.start.seconds + i * step,
                Direction::NewestFirst => self.start.seconds - (count - 1 - i) * step,
            })
            .collect();
        if let Some(jitter) = self.jitter {
            for (ordinal, s) in seconds.iter_mut().enumerate() {
                *s += jitter_offset(jitter, ordinal as u64);
            }
            // Jitter may reorder neighbouring instants; children must never
            // be scheduled before their parents, so re-sort over the
            // topological order.
            seconds.sort_unstable();
        }
        Ok(Schedule {
            offset_minutes: self.start.offset_minutes,
            seconds,
        })
    }
}

fn jitter_offset(jitter: Jitter, ordinal: u64) -> i64 {
    if jitter.bound_seconds == 0 {
        return 0;
    }
    let stream = jitter.seed ^ ordinal.wrapping_mul(0x9e3779b97f4a7c15);
    let mut rng = StdRng::seed_from_u64(stream);
    rng.gen_range(-jitter.bound_seconds..=jitter.bound_seconds)
}

/// A rule compiled against a fixed commit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    offset_minutes: i32,
    seconds: Vec<i64>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }

    /// The instant assigned to the given ordinal. `ordinal` must be below
    /// `len()`; the scheduler guarantees this by compiling against the
    /// graph's commit count.
    pub fn timestamp_for(&self, ordinal: usize) -> Timestamp {
        Timestamp::new(self.seconds[ordinal], self.offset_minutes)
    }
}
