use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

// Naive shapes are read as local time; the browser's `datetime-local` input produced the first one.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a stored timestamp: RFC 3339, naive local date-time, or bare date (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return resolve_forward(naive, |n| Local.from_local_datetime(n));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// Map a wall-clock time to an instant. A time skipped by a DST jump moves
/// forward by the size of the jump, so 02:30 in a 02:00-03:00 gap becomes 03:30.
fn resolve_forward<Tz: TimeZone>(
    naive: NaiveDateTime,
    lookup: impl Fn(&NaiveDateTime) -> LocalResult<DateTime<Tz>>,
) -> Option<DateTime<Tz>> {
    if let Some(dt) = lookup(&naive).earliest() {
        return Some(dt);
    }
    let offset_at = |n: NaiveDateTime| {
        lookup(&n)
            .earliest()
            .map(|dt| dt.offset().fix().local_minus_utc())
    };
    let before = offset_at(naive - Duration::days(1))?;
    let after = offset_at(naive + Duration::days(1))?;
    lookup(&(naive + Duration::seconds(i64::from(after - before)))).earliest()
}

/// Render a timestamp for the details pane.
///
/// Unparseable input comes back unchanged. Same-day values show only `HH:MM`,
/// anything else the full local date and time.
pub fn format_timestamp(raw: &str, now: DateTime<Local>) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_timestamp(raw) {
        None => raw.to_string(),
        Some(dt) if dt.date_naive() == now.date_naive() => dt.format("%H:%M").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, SecondsFormat};

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_day_shows_time_only() {
        assert_eq!(format_timestamp("2026-10-18T09:05", noon()), "09:05");
        assert_eq!(format_timestamp("2026-10-18 23:59", noon()), "23:59");
    }

    #[test]
    fn other_day_shows_date_and_time() {
        assert_eq!(
            format_timestamp("2026-10-17T09:05", noon()),
            "2026-10-17 09:05:00"
        );
    }

    #[test]
    fn unparseable_input_is_returned_verbatim() {
        assert_eq!(format_timestamp("next tuesday", noon()), "next tuesday");
        assert_eq!(format_timestamp("", noon()), "");
    }

    #[test]
    fn rfc3339_is_converted_to_local() {
        let local = Local.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let raw = local
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        assert_eq!(parse_timestamp(&raw), Some(local));
        assert_eq!(format_timestamp(&raw, noon()), "2026-10-16 08:30:00");
    }

    #[test]
    fn seconds_and_fractions_are_accepted() {
        let expected = Local.with_ymd_and_hms(2026, 10, 18, 7, 0, 30).unwrap();
        assert_eq!(parse_timestamp("2026-10-18T07:00:30"), Some(expected));
        assert!(parse_timestamp("2026-10-18T07:00:30.250").is_some());
    }

    #[test]
    fn times_inside_a_dst_gap_move_forward() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let jump = day.and_hms_opt(2, 0, 0).unwrap();
        let winter = FixedOffset::east_opt(3600).unwrap();
        let summer = FixedOffset::east_opt(7200).unwrap();
        let lookup = |n: &NaiveDateTime| {
            if *n < jump {
                winter.from_local_datetime(n)
            } else if *n < jump + Duration::hours(1) {
                LocalResult::None
            } else {
                summer.from_local_datetime(n)
            }
        };

        let resolved = resolve_forward(day.and_hms_opt(2, 30, 0).unwrap(), lookup).unwrap();
        assert_eq!(resolved.naive_local(), day.and_hms_opt(3, 30, 0).unwrap());
        assert_eq!(resolved.offset(), &summer);

        let plain = resolve_forward(day.and_hms_opt(1, 15, 0).unwrap(), lookup).unwrap();
        assert_eq!(plain.offset(), &winter);
    }
}
