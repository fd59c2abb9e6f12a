use chrono::{NaiveDate, NaiveDateTime};

/// Render a PDF date string (`D:YYYYMMDDHHmmSS...`) as `YYYY-MM-DD HH:MM:SS`.
///
/// Missing trailing components default to the start of the period. The
/// timezone suffix is ignored. Returns `None` for text that is not a date.
pub fn format_pdf_date(raw: &str) -> Option<String> {
    let digits: String = raw
        .trim()
        .trim_start_matches("D:")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + len) {
            Some(s) => s.parse().ok(),
            None => Some(default),
        }
    };

    let year = digits.get(0..4)?.parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 2, 1)?, field(6, 2, 1)?)?;
    let stamp: NaiveDateTime = date.and_hms_opt(field(8, 2, 0)?, field(10, 2, 0)?, field(12, 2, 0)?)?;

    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        assert_eq!(
            format_pdf_date("D:20230415093000+02'00'"),
            Some("2023-04-15 09:30:00".to_string())
        );
    }

    #[test]
    fn test_partial_date() {
        assert_eq!(
            format_pdf_date("D:2019"),
            Some("2019-01-01 00:00:00".to_string())
        );
        assert_eq!(
            format_pdf_date("20191231"),
            Some("2019-12-31 00:00:00".to_string())
        );
    }

    #[test]
    fn test_invalid_date() {
        assert_eq!(format_pdf_date("yesterday"), None);
        assert_eq!(format_pdf_date("D:20231345"), None);
    }
}
