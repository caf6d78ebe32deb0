//! HTTP-date formatting and parsing
//!
//! Requests are dated with the preferred IMF-fixdate form
//! (`Sun, 06 Nov 1994 08:49:37 GMT`). Parsing also accepts the two obsolete
//! forms HTTP/1.1 recipients must understand: RFC 850
//! (`Sunday, 06-Nov-94 08:49:37 GMT`) and asctime (`Sun Nov  6 08:49:37 1994`).

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate, the format clients should send
pub const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

const RFC850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp as an IMF-fixdate
pub fn format(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// The current time as an IMF-fixdate
pub fn now() -> String {
    format(Utc::now())
}

/// Parse any of the accepted HTTP-date forms
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    [IMF_FIXDATE, RFC850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
    }

    #[test]
    fn test_format_imf_fixdate() {
        assert_eq!(format(reference()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_all_forms() {
        assert_eq!(parse("Sun, 06 Nov 1994 08:49:37 GMT"), Some(reference()));
        assert_eq!(parse("Sunday, 06-Nov-94 08:49:37 GMT"), Some(reference()));
        assert_eq!(
            parse("Sun Nov 13 08:49:37 1994"),
            Some(Utc.with_ymd_and_hms(1994, 11, 13, 8, 49, 37).unwrap())
        );
    }

    #[test]
    fn test_parse_round_trips_now() {
        let now = now();
        let parsed = parse(&now).unwrap();
        assert_eq!(format(parsed), now);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("1994-11-06T08:49:37Z"), None);
        assert_eq!(parse("Sun, 06 Nov 1994 08:49:37 PST"), None);
    }
}
