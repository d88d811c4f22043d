/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (project start/end, expense and payment dates).
pub type Date = chrono::NaiveDate;

/// Currency amounts and percentages. Currency is implicitly USD.
pub type Money = rust_decimal::Decimal;

/// Largest amount a `NUMERIC(14,2)` money column holds: 999,999,999,999.99.
pub const MAX_AMOUNT: Money = Money::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);
