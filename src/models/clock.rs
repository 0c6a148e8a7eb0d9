//! Clock times expressed as minutes since midnight.

/// Minutes since midnight. Fractional minutes come from mileage-derived
/// truck clocks.
pub type Minutes = f64;

/// Sentinel deadline meaning "end of day" (24:00).
pub const END_OF_DAY: Minutes = 24.0 * 60.0;

/// Time every truck leaves the hub for the first time (08:00).
pub const DAY_START: Minutes = 8.0 * 60.0;

/// Parses a deadline or availability string.
///
/// Accepts `EOD` and 12-hour clock times such as `9:05 am` or
/// `10:30 PM`. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{parse_clock, END_OF_DAY};
///
/// assert_eq!(parse_clock("10:30 AM"), Some(630.0));
/// assert_eq!(parse_clock("12:15 pm"), Some(735.0));
/// assert_eq!(parse_clock("EOD"), Some(END_OF_DAY));
/// assert_eq!(parse_clock("noon"), None);
/// ```
pub fn parse_clock(text: &str) -> Option<Minutes> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("EOD") {
        return Some(END_OF_DAY);
    }
    find_clock(text).map(|(minutes, _)| minutes)
}

/// Finds the first `H:MM am|pm` pattern anywhere in `text`.
///
/// Returns the parsed minutes and the byte offset where the match starts.
pub(crate) fn find_clock(text: &str) -> Option<(Minutes, usize)> {
    let bytes = text.as_bytes();
    for (colon, _) in text.match_indices(':') {
        let Some(hour_start) = digits_before(bytes, colon) else {
            continue;
        };
        let Some(rest) = text.get(colon + 1..) else {
            continue;
        };
        let Some(minutes) = two_digits(rest) else {
            continue;
        };
        let Some(meridiem) = rest.get(2..).and_then(|s| s.strip_prefix(' ')) else {
            continue;
        };
        let pm = match meridiem.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("am") => false,
            Some("pm") => true,
            _ => continue,
        };
        let Ok(hour) = text[hour_start..colon].parse::<u32>() else {
            continue;
        };
        if !(1..=12).contains(&hour) || minutes > 59 {
            continue;
        }
        let hour24 = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        return Some((f64::from(hour24 * 60 + minutes), hour_start));
    }
    None
}

/// Start of the one- or two-digit run that ends right before `end`.
fn digits_before(bytes: &[u8], end: usize) -> Option<usize> {
    let mut start = end;
    while start > 0 && end - start < 2 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    (start < end).then_some(start)
}

fn two_digits(text: &str) -> Option<u32> {
    let head = text.get(..2)?;
    if head.bytes().all(|b| b.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

/// Formats minutes as a 24-hour `HH:MM` string.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::format_clock;
///
/// assert_eq!(format_clock(545.9), "09:05");
/// assert_eq!(format_clock(480.0), "08:00");
/// ```
pub fn format_clock(minutes: Minutes) -> String {
    let whole = minutes.max(0.0).floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
