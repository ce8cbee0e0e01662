//! `"H:MM[:SS]"` duration strings <-> fractional hours.

/// Parse `"H:MM"` or `"H:MM:SS"` into hours. Never fails: missing, empty, or
/// malformed input parses to `0.0`.
pub fn parse_duration(s: Option<&str>) -> f64 {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };
    try_parse(s).filter(|h| h.is_finite()).unwrap_or(0.0)
}

fn try_parse(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = match parts.next() {
        Some(sec) => sec.trim().parse().ok()?,
        None => 0.0,
    };
    Some(hours + minutes / 60.0 + seconds / 3600.0)
}

/// Render hours as `"[-]HH:MM"`, rounding to the nearest minute.
pub fn format_duration(hours: f64) -> String {
    let hours = if hours.is_finite() { hours } else { 0.0 };
    let sign = if hours < 0.0 { "-" } else { "" };
    let magnitude = hours.abs();
    let mut h = magnitude.floor() as u64;
    let mut m = ((magnitude - h as f64) * 60.0).round_ties_even() as u64;
    if m == 60 {
        h += 1;
        m = 0;
    }
    format!("{sign}{h:02}:{m:02}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parses_hours_minutes_seconds() {
        assert!(approx(parse_duration(Some("1:30")), 1.5));
        assert!(approx(parse_duration(Some("0:45:00")), 0.75));
        assert!(approx(parse_duration(Some("2:00:36")), 2.01));
        assert!(approx(parse_duration(Some(" 12:06 ")), 12.1));
    }

    #[test]
    fn malformed_input_parses_to_zero() {
        for s in ["", "   ", "abc", "1", "1:xx", "1:30:zz", ":", "NaN:00", "inf:00"] {
            assert_eq!(parse_duration(Some(s)), 0.0, "input: {s:?}");
        }
        assert_eq!(parse_duration(None), 0.0);
    }

    #[test]
    fn formats_with_padding_and_sign() {
        assert_eq!(format_duration(1.5), "01:30");
        assert_eq!(format_duration(0.0), "00:00");
        assert_eq!(format_duration(-2.25), "-02:15");
        assert_eq!(format_duration(123.0), "123:00");
    }

    #[test]
    fn minute_overflow_carries_into_hours() {
        // 1h 59.9min rounds to 2:00, not 1:60
        assert_eq!(format_duration(1.0 + 59.9 / 60.0), "02:00");
    }

    #[test]
    fn roundtrip_keeps_hour_minute_component() {
        for s in ["0:00", "1:05", "3:59", "12:30", "1:05:10", "7:45:29"] {
            let expected: String = {
                let mut it = s.split(':');
                let h: u64 = it.next().unwrap().parse().unwrap();
                let m: u64 = it.next().unwrap().parse().unwrap();
                format!("{h:02}:{m:02}")
            };
            assert_eq!(format_duration(parse_duration(Some(s))), expected, "input: {s}");
        }
    }
}
