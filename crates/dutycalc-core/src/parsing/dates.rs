use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Expand a two-digit year in an "M/D/YY" schedule date for display.
///
/// "7/1/20" -> "7/1/2020", "1/1/99" -> "1/1/1999". Other shapes pass through.
pub fn format_display_date(date: Option<&str>) -> String {
    let Some(date) = date else {
        return String::new();
    };

    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() == 3 && parts[2].len() == 2 {
        if let Ok(year) = parts[2].parse::<u32>() {
            let century = if year <= 50 { "20" } else { "19" };
            return format!("{}/{}/{}{}", parts[0], parts[1], century, parts[2]);
        }
    }
    date.to_string()
}

/// Parse an expiry instant.
///
/// Accepts RFC 3339, "YYYY-MM-DDTHH:MM:SS", "YYYY-MM-DD" and "M/D/YYYY".
/// Zone-less forms are read as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
