//! Axis interval selection for the row chart.

/// Number of axis intervals that evenly divides `max_votes`.
///
/// Probes `desired`, `desired + 1`, `desired - 1`, `desired + 2`, ... and
/// keeps the first candidate in `1..=2 * desired` that divides `max_votes`.
/// A `max_votes` of 0 is treated as 1. Since 1 divides everything the search
/// always ends inside the window. Candidates above `max_votes` never divide
/// it, so the window is capped there.
#[must_use]
pub fn interval_count(max_votes: u64, desired: u32) -> u32 {
    let max_votes = max_votes.max(1);
    let desired = u64::from(desired.max(1));
    let upper = (desired * 2).min(max_votes);

    // every candidate nearer to `desired` is too large, and `max_votes` divides itself
    if desired > upper {
        return to_count(max_votes);
    }

    for distance in 0..=desired {
        let above = desired + distance;
        if above <= upper && max_votes % above == 0 {
            return to_count(above);
        }
        if distance == 0 || distance == desired {
            continue;
        }
        let below = desired - distance;
        if max_votes % below == 0 {
            return to_count(below);
        }
    }
    1
}

fn to_count(candidate: u64) -> u32 {
    u32::try_from(candidate).unwrap_or(1)
}

/// Vote value covered by one interval.
#[must_use]
pub fn interval_step(max_votes: u64, count: u32) -> f64 {
    max_votes.max(1) as f64 / f64::from(count.max(1))
}

/// Axis label for an interval boundary, without a trailing `.0` on whole values.
#[must_use]
pub fn format_interval_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{format_interval_value, interval_count, interval_step};

    #[test]
    fn seven_divides_742() {
        assert_eq!(interval_count(742, 5), 7);
        assert_eq!(interval_step(742, 7), 106.0);
    }

    #[test]
    fn desired_count_wins_when_it_divides() {
        assert_eq!(interval_count(100, 5), 5);
        assert_eq!(interval_count(0, 5), 1);
    }

    #[test]
    fn probes_upward_before_downward() {
        // 12 is divisible by both 6 and 4; +1 comes first
        assert_eq!(interval_count(12, 5), 6);
    }

    #[test]
    fn prime_maximum_falls_back_to_one() {
        assert_eq!(interval_count(9973, 5), 1);
    }

    #[test]
    fn window_is_capped_at_the_maximum() {
        assert_eq!(interval_count(3, 5), 3);
        assert_eq!(interval_count(7, u32::MAX), 7);
        assert_eq!(interval_count(1_000_000_007, 100_000), 1);
    }

    #[test]
    fn formats_whole_steps_without_fraction() {
        assert_eq!(format_interval_value(106.0), "106");
        assert_eq!(format_interval_value(0.5), "0.5");
    }

    proptest! {
        #[test]
        fn result_divides_max_and_stays_in_window(max_votes in 0_u64..100_000, desired in 1_u32..20) {
            let count = interval_count(max_votes, desired);
            prop_assert!(count >= 1);
            prop_assert!(count <= desired * 2);
            prop_assert_eq!(max_votes.max(1) % u64::from(count), 0);
        }
    }
}
