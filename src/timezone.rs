//! Resolves the server's configured timezone and parses dates from forms.

use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of a canonical timezone name, e.g. "Asia/Manila".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the timezone `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone name is not recognised.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {canonical_timezone}");
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// The format of `<input type="date">` values, e.g. "2026-10-18".
pub const DATE_INPUT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// Parse the value of a date input.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw_date` is not a "YYYY-MM-DD" date.
pub fn parse_date_input(raw_date: &str) -> Result<Date, Error> {
    let raw_date = raw_date.trim();

    Date::parse(raw_date, DATE_INPUT_FORMAT).map_err(|error| {
        tracing::debug!("could not parse date {raw_date}: {error}");
        Error::InvalidDate(raw_date.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, macros::date};

    use crate::Error;

    use super::{local_today, parse_date_input};

    #[test]
    fn parses_date_input() {
        assert_eq!(parse_date_input("2026-10-18"), Ok(date!(2026 - 10 - 18)));
        assert_eq!(
            parse_date_input("18/10/2026"),
            Err(Error::InvalidDate("18/10/2026".to_owned()))
        );
    }

    #[test]
    fn utc_today_matches_system_date() {
        let today = local_today("Etc/UTC").unwrap();

        assert_eq!(today, OffsetDateTime::now_utc().date());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert_eq!(
            local_today("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}
