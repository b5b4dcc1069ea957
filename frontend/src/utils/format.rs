/// Re-groups whatever the user typed into `3-4-4` as they type.
///
/// Non-digits are dropped. Digits past the eleventh are kept unformatted
/// after the last group.
pub fn format_phone_number(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11.. => format!(
            "{}-{}-{}{}",
            &digits[..3],
            &digits[3..7],
            &digits[7..11],
            &digits[11..]
        ),
        7..=10 => format!("{}-{}{}", &digits[..3], &digits[3..7], &digits[7..]),
        3..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => digits,
    }
}
