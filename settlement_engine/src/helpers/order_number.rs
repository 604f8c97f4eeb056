use chrono::NaiveDate;

/// Formats a human-readable order number from the order date and that day's sequence value:
/// `ORD` + 2-digit year + 2-digit month + 2-digit day + 4-digit zero-padded daily counter.
pub fn format_order_number(date: NaiveDate, seq: i64) -> String {
    format!("ORD{}{seq:04}", date.format("%y%m%d"))
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn order_numbers_follow_the_daily_sequence_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_order_number(date, 1), "ORD2503070001");
        assert_eq!(format_order_number(date, 42), "ORD2503070042");
        assert_eq!(format_order_number(date, 9999), "ORD2503079999");
    }
}
