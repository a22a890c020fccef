use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

fn parse_offset(buf: &str, date_str: &str) -> Result<FixedOffset, String> {
    let seconds = if buf == "Z" {
        0
    } else {
        let sign = if buf.starts_with('-') { -1 } else { 1 };
        let digits: String = buf[1..].chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 {
            return Err(format!("Invalid offset {} in the date {}", buf, date_str));
        }
        let hours: i32 = to_int(&digits[0..2], date_str)?;
        let minutes: i32 = to_int(&digits[2..4], date_str)?;
        sign * (hours * 3600 + minutes * 60)
    };

    FixedOffset::east_opt(seconds).ok_or_else(|| format!("Invalid offset {} in the date {}", buf, date_str))
}

/// Parses a post date.
///
/// RFC 3339 is tried first. Then `YYYY-MM-DD HH:MM[:SS][.fff][offset]` and a bare
/// `YYYY-MM-DD`. Values without an offset are taken as UTC.
pub fn parse_date_time(buf: &str) -> Result<DateTime<FixedOffset>, String> {
    let buf = buf.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Ok(date_time);
    }

    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2}))?(?:\.\d+)?\s*(Z|[+-]\d{2}:?\d{2})?)?$"
        ).unwrap();
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(&caps[1])?;
    let m: u32 = to_u32(&caps[2])?;
    let d: u32 = to_u32(&caps[3])?;
    let (h, mn, s) = match caps.get(4) {
        Some(hour) => {
            let seconds = match caps.get(6) {
                Some(sec) => to_u32(sec.as_str())?,
                None => 0,
            };
            (to_u32(hour.as_str())?, to_u32(&caps[5])?, seconds)
        }
        None => (0, 0, 0),
    };

    let date = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s).ok_or_else(|| format!("Invalid time {}", buf))?;
    let offset = match caps.get(7) {
        Some(offset) => parse_offset(offset.as_str(), buf)?,
        None => parse_offset("Z", buf)?,
    };

    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .ok_or_else(|| format!("Ambiguous date time {}", buf))
}

pub fn format_date_time(date_time: &DateTime<FixedOffset>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// Turns a title into a url slug: transliterated to ASCII, lower case, words joined by `-`.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode::unidecode(title);

    let mut slug = String::new();
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
