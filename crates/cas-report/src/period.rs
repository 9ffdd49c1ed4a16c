//! Billing period formatting

use chrono::Datelike;

/// Previous month as `MM/YYYY`, the `targetMonth` of the monthly usage lookup.
///
/// Only the month steps back: January gives `12` of the *same* year. Callers
/// auditing December usage in January get the wrong year.
// TODO: roll the year back for January once usage figures feed the report rows.
pub fn last_period<D: Datelike>(today: &D) -> String {
    let month = match today.month() {
        1 => 12,
        m => m - 1,
    };
    format!("{:02}/{}", month, today.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn on(year: i32, month: u32) -> String {
        last_period(&NaiveDate::from_ymd_opt(year, month, 15).unwrap())
    }

    #[test]
    fn test_steps_back_one_month() {
        assert_eq!(on(2024, 3), "02/2024");
        assert_eq!(on(2024, 10), "09/2024");
        assert_eq!(on(2024, 11), "10/2024");
        assert_eq!(on(2024, 12), "11/2024");
    }

    #[test]
    fn test_january_keeps_the_year() {
        assert_eq!(on(2025, 1), "12/2025");
    }
}
