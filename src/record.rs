use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A row schema the [`Store`](crate::Store) can persist.
///
/// Each schema owns its header row and date format. Two schemas never share
/// a file: a store is opened for exactly one record type.
///
/// The serialized field order of the implementing struct must match
/// [`Record::HEADERS`]; rows are written positionally under that header and
/// read back by column name.
pub trait Record: Serialize + DeserializeOwned {
    /// Column names of the header row, in write order.
    const HEADERS: &'static [&'static str];

    /// Free-text grouping label used by filtering and summaries.
    fn category(&self) -> &str;

    /// Reduce the record to what its row can represent, so that a stored
    /// record equals its reloaded copy. Applied by the store on insert.
    fn canonical(self) -> Self {
        self
    }
}

/// A record pinned to a fixed instant, which the
/// [`QueryEngine`](crate::QueryEngine) places in a timeframe.
pub trait Dated: Record {
    /// The instant this record is scheduled for.
    fn when(&self) -> NaiveDateTime;
}

/// A record that carries a duration, summed by
/// [`QueryEngine::summarize_duration`](crate::QueryEngine::summarize_duration).
pub trait Timed: Dated {
    /// Duration in whole minutes.
    fn duration_minutes(&self) -> u64;
}
