//! Label formatting for dates and hours.

use chrono::{Datelike, NaiveDate};

/// Suffix for a day of month: `st`, `nd` and `rd` for the 1st to 3rd,
/// `th` for every other day.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// "1st January", "12th March".
pub fn human_date(date: NaiveDate) -> String {
    let day = date.day();
    format!("{}{} {}", day, ordinal_suffix(day), date.format("%B"))
}

/// "January 2024".
pub fn month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Whole-hour label for a minute offset: `floor(minutes / 60):00`.
pub fn hour_label(minutes: f64) -> String {
    format!("{}:00", (minutes / 60.0).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn first_three_days_get_special_suffixes() {
        assert_eq!(human_date(day(1)), "1st January");
        assert_eq!(human_date(day(2)), "2nd January");
        assert_eq!(human_date(day(3)), "3rd January");
        assert_eq!(human_date(day(4)), "4th January");
    }

    #[test]
    fn teens_are_th() {
        assert_eq!(human_date(day(11)), "11th January");
        assert_eq!(human_date(day(12)), "12th January");
        assert_eq!(human_date(day(13)), "13th January");
    }

    #[test]
    fn later_days_are_th() {
        for d in 4..=31 {
            assert_eq!(ordinal_suffix(d), "th", "day {d}");
        }
    }

    #[test]
    fn month_year_and_hour_labels() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(month_year(date), "December 2023");
        assert_eq!(hour_label(0.0), "0:00");
        assert_eq!(hour_label(719.0), "11:00");
        assert_eq!(hour_label(1440.0), "24:00");
    }
}
