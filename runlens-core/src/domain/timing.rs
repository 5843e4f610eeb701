//! Timestamps and durations shared by runs and nodes

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parse a platform timestamp
///
/// Timestamps must be Zulu (UTC) and end with a literal `Z`. Anything else
/// is rejected rather than reinterpreted in another timezone.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if !value.ends_with('Z') {
        return Err(Error::InvalidTimestamp {
            value: value.to_string(),
            reason: "does not appear to be a Zulu (UTC) timestamp".to_string(),
        });
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parse an optional timestamp field
pub(crate) fn parse_optional(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Start/end instants of a run or node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimingFields")]
pub struct Timing {
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct TimingFields {
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<TimingFields> for Timing {
    type Error = Error;

    fn try_from(fields: TimingFields) -> Result<Self> {
        Timing::observed(fields.started_at, fields.finished_at)
    }
}

impl Timing {
    /// Build a run timing, rejecting an end without a start or an end before the start
    pub fn new(
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if let (None, Some(end)) = (started_at, finished_at) {
            return Err(Error::InvalidTiming(format!(
                "finished at {} without a start time",
                end
            )));
        }
        Self::observed(started_at, finished_at)
    }

    /// Build a node timing
    ///
    /// Nodes the engine never started (skipped, omitted) may still report an
    /// end time; their duration is zero. An end before the start is rejected.
    pub fn observed(
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if let (Some(start), Some(end)) = (started_at, finished_at) {
            if end < start {
                return Err(Error::InvalidTiming(format!(
                    "finished at {} before starting at {}",
                    end, start
                )));
            }
        }

        Ok(Self {
            started_at,
            finished_at,
        })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Elapsed time as of now
    ///
    /// While started but unfinished this is measured against the local UTC
    /// clock, so it keeps growing until the platform reports an end time.
    /// Expect a small drop once the reported end replaces the local clock.
    pub fn duration(&self) -> TimeDelta {
        self.duration_at(Utc::now())
    }

    /// Elapsed time as of `now`
    pub fn duration_at(&self, now: DateTime<Utc>) -> TimeDelta {
        let Some(started_at) = self.started_at else {
            return TimeDelta::zero();
        };

        if let Some(finished_at) = self.finished_at {
            return finished_at - started_at;
        }

        now - started_at
    }
}

/// Format a duration as `H:MM:SS[.ffffff]`
pub fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let duration = duration.abs();
    let total = duration.num_seconds();
    let micros = duration.subsec_nanos() / 1_000;

    let base = format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    );

    if micros == 0 {
        base
    } else {
        format!("{}.{:06}", base, micros)
    }
}
