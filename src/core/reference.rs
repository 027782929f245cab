use chrono::{DateTime, Timelike, Utc};

/// Correlation reference for prompts: one letter and five digits.
///
/// The letter is indexed by the current second of the day, the digits come
/// from the sub-second clock, so references issued within a day rarely repeat
/// and always sort as plain text.
pub fn transaction_reference(now: DateTime<Utc>) -> String {
    let letter = (b'A' + (now.num_seconds_from_midnight() % 26) as u8) as char;
    let digits = (now.nanosecond() / 10_000) % 100_000;

    format!("{}{:05}", letter, digits)
}

/// Reference for the current instant
pub fn new_transaction_reference() -> String {
    transaction_reference(Utc::now())
}
