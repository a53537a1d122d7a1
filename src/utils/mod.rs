//! Shared helpers for duration expressions and humanized output.

use regex::Regex;
use std::time::Duration;

/// Parse a human duration expression into a [`Duration`].
///
/// Units may be combined and appear in any order: `90s`, `30m`, `1h30m`,
/// `2d`, `1w`. Returns `None` when the expression contains no recognized
/// unit.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let re = Regex::new(r"([0-9]+)([smhdw])").unwrap();

    let mut seconds: u64 = 0;
    let mut matched = false;

    for caps in re.captures_iter(s) {
        let amount: u64 = caps[1].parse().ok()?;
        let factor = match &caps[2] {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 60 * 60 * 24,
            "w" => 60 * 60 * 24 * 7,
            _ => unreachable!(),
        };
        seconds = seconds.checked_add(amount.checked_mul(factor)?)?;
        matched = true;
    }

    if matched {
        Some(Duration::from_secs(seconds))
    } else {
        None
    }
}

/// Format a duration in abbreviated human units, e.g. `1m 23s` or `450ms`.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        return format!("{}ms", d.as_millis());
    }

    let total = d.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}
