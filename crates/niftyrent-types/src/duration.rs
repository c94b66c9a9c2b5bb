//! Human-readable lease durations.

pub const NS_PER_MS: u64 = 1_000_000;

const UNITS: [(&str, f64); 5] = [
    ("year", 365.0 * 24.0 * 3600.0),
    ("day", 24.0 * 3600.0),
    ("hour", 3600.0),
    ("minute", 60.0),
    ("second", 1.0),
];

/// Largest whole unit, e.g. `"3 days"` or `"1 hour"`. `None` under a second.
pub fn duration_string(duration_ns: u64) -> Option<String> {
    let secs = duration_ns as f64 / (NS_PER_MS as f64 * 1000.0);
    UNITS.iter().find_map(|&(unit, unit_secs)| {
        let value = secs / unit_secs;
        if value >= 2.0 {
            Some(format!("{} {unit}s", value.round()))
        } else if value >= 1.0 {
            Some(format!("1 {unit}"))
        } else {
            None
        }
    })
}
