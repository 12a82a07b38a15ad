//! Conversion of the level tick counter into a wall-clock reading.

/// Ticks in one in-game hour.
pub const TICKS_PER_HOUR: i64 = 1000;

/// Converts a tick timestamp into `(hour, minute)` on a 24-hour clock.
///
/// Tick 0 is sunrise at 06:00; every 1000 ticks advance one hour.
pub fn split_time(ticks: i64) -> (u8, u8) {
    let day_ticks = ticks.rem_euclid(24 * TICKS_PER_HOUR);
    let hours = (day_ticks / TICKS_PER_HOUR + 6) % 24;
    let minutes = (day_ticks % TICKS_PER_HOUR) * 60 / TICKS_PER_HOUR;
    (hours as u8, minutes as u8)
}
