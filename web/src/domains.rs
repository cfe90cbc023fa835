use time::{macros::format_description, Duration, OffsetDateTime, PrimitiveDateTime};

use crate::error::SegmentError;

/// Display form used for every timestamp: `YYYY/MM/DD HH:MM:SS`.
const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

/// A single finished game, as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub player_name: String,
    pub start_time: PrimitiveDateTime,
    pub end_time: PrimitiveDateTime,
    pub max_mass: f64,
    pub max_rank: i32,
}

impl GameRecord {
    /// Duration of the game truncated to whole minutes.
    pub fn whole_minutes(&self) -> i64 {
        (self.end_time - self.start_time).whole_minutes()
    }
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct HighScoreRow {
    pub player_name: String,
    pub best_mass: f64,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct PlayerHistoryRow {
    pub max_mass: f64,
    pub max_rank: i32,
    pub start_time: PrimitiveDateTime,
    pub end_time: PrimitiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct PlaytimeRow {
    pub player_name: String,
    pub total_minutes: i64,
}

/// Outcome of an idempotent schema initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaStatus {
    pub already_existed: bool,
}

/// Converts milliseconds since the Unix epoch into a naive calendar timestamp.
pub fn timestamp_from_millis(millis: i64) -> Option<PrimitiveDateTime> {
    let at = OffsetDateTime::UNIX_EPOCH.checked_add(Duration::milliseconds(millis))?;
    Some(PrimitiveDateTime::new(at.date(), at.time()))
}

pub fn format_timestamp(timestamp: &PrimitiveDateTime) -> String {
    // Every component of the description is numeric and always formattable.
    timestamp
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// The raw segments of a `scores/{name}/{mass}/{rank}/{start}/{end}` write.
#[derive(Clone, Copy, Debug)]
pub struct GameSegments<'a> {
    pub name: &'a str,
    pub max_mass: &'a str,
    pub max_rank: &'a str,
    pub start_ms: &'a str,
    pub end_ms: &'a str,
}

impl GameSegments<'_> {
    pub fn parse(&self) -> Result<GameRecord, SegmentError> {
        let max_mass = self
            .max_mass
            .parse::<f64>()
            .ok()
            .filter(|mass| mass.is_finite())
            .ok_or_else(|| SegmentError::Mass(self.max_mass.to_string()))?;
        let max_rank = self
            .max_rank
            .parse::<i32>()
            .map_err(|_| SegmentError::Rank(self.max_rank.to_string()))?;

        let start_time = parse_millis(self.start_ms)?;
        let end_time = parse_millis(self.end_ms)?;

        Ok(GameRecord {
            player_name: self.name.to_string(),
            start_time,
            end_time,
            max_mass,
            max_rank,
        })
    }
}

fn parse_millis(segment: &str) -> Result<PrimitiveDateTime, SegmentError> {
    segment
        .parse::<i64>()
        .ok()
        .and_then(timestamp_from_millis)
        .ok_or_else(|| SegmentError::Timestamp(segment.to_string()))
}
