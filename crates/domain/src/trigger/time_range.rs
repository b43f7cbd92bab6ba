//! Time range leaf: true while the current UTC time lies in a window.

use chrono::NaiveTime;
use serde::Deserialize;

use super::Trigger;
use crate::error::TreeError;

const FORMAT: &str = "%H:%M";

/// Leaf matching when the current time is within `after..=before`.
///
/// A window whose start is after its end spans midnight
/// (e.g. `22:00..06:00`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeTrigger {
    after: NaiveTime,
    before: NaiveTime,
}

#[derive(Deserialize)]
struct TimeRangeData {
    /// Start of the window, `HH:MM` in 24-hour format.
    after: String,
    /// End of the window, `HH:MM` in 24-hour format.
    before: String,
}

impl Default for TimeRangeTrigger {
    fn default() -> Self {
        Self {
            after: NaiveTime::MIN,
            before: NaiveTime::MIN,
        }
    }
}

impl TimeRangeTrigger {
    pub const TAG: &'static str = "ruletree.time_range";

    #[must_use]
    pub fn new(after: NaiveTime, before: NaiveTime) -> Self {
        Self { after, before }
    }

    /// Whether `time` falls within the window.
    #[must_use]
    pub fn matches_at(&self, time: NaiveTime) -> bool {
        if self.after <= self.before {
            time >= self.after && time <= self.before
        } else {
            time >= self.after || time <= self.before
        }
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, TreeError> {
    NaiveTime::parse_from_str(value, FORMAT)
        .map_err(|err| TreeError::MalformedDocument(format!("{field}: {value:?}: {err}")))
}

impl Trigger for TimeRangeTrigger {
    fn type_tag(&self) -> &'static str {
        Self::TAG
    }

    fn evaluate(&self) -> bool {
        self.matches_at(crate::time::time_of_day())
    }

    fn describe(&self) -> String {
        format!(
            "time between {} and {}",
            self.after.format(FORMAT),
            self.before.format(FORMAT)
        )
    }

    fn to_data(&self) -> serde_json::Value {
        serde_json::json!({
            "after": self.after.format(FORMAT).to_string(),
            "before": self.before.format(FORMAT).to_string(),
        })
    }

    fn load(&mut self, data: &serde_json::Value) -> Result<(), TreeError> {
        let raw = TimeRangeData::deserialize(data)?;
        self.after = parse_time("after", &raw.after)?;
        self.before = parse_time("before", &raw.before)?;
        Ok(())
    }
}
