// Pure civic domain logic: no I/O, no database, no HTTP.

pub mod district;
pub mod election;
pub mod matching;
pub mod votes;

/// Integer percentage of `numerator / denominator`, rounding halves upward.
///
/// Works on exact integers so that `-2.5` rounds to `-2` and `50.5` to `51`,
/// the same way the browser client rounds. `denominator` must be positive.
pub fn rounded_percent(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    (2 * numerator * 100 + denominator).div_euclid(2 * denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_halves_up() {
        assert_eq!(rounded_percent(1, 2), 50);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 200), 1);
    }

    #[test]
    fn rounds_negative_halves_toward_positive() {
        // -1/40 * 100 = -2.5
        assert_eq!(rounded_percent(-1, 40), -2);
        assert_eq!(rounded_percent(-40, 40), -100);
        assert_eq!(rounded_percent(-3, 40), -7);
    }
}
