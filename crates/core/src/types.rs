/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A record as delivered by the data service: an arbitrary bag of fields
/// whose shape depends on the collection it came from.
pub type Record = serde_json::Map<String, serde_json::Value>;
