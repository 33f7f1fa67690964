//! Hybrid linear/proportional easing shared by every animated value.
//!
//! A value moves toward its target by `min(linear_rate, distance / ease)`
//! per unit frame. Far from the target the constant linear rate dominates;
//! close to it the proportional term takes over. Once the remaining distance
//! is within `epsilon` the value snaps onto the target, so no trajectory
//! creeps forever.

/// Converts milliseconds of wall-clock time into unit frames (~16.7 ms).
pub const UNIT_FRAMES_PER_MS: f64 = 0.06;

/// Tuning of one eased trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    /// Upper bound on the per-unit-frame step.
    pub linear_rate: f64,
    /// Divisor of the remaining distance; 1 means no asymptotic slow-down.
    pub ease: f64,
    /// Distance at which the value snaps onto its target.
    pub epsilon: f64,
}

/// Result of advancing one value by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eased {
    pub value: f64,
    /// The value sits exactly on its target.
    pub settled: bool,
    /// The value differs from the input value.
    pub changed: bool,
}

impl Easing {
    #[must_use]
    pub const fn hybrid(linear_rate: f64, ease: f64, epsilon: f64) -> Self {
        Self {
            linear_rate,
            ease,
            epsilon,
        }
    }

    /// Pure proportional easing without a linear cap.
    #[must_use]
    pub const fn proportional(ease: f64, epsilon: f64) -> Self {
        Self::hybrid(f64::INFINITY, ease, epsilon)
    }

    /// Advances `value` toward `target` by `time_delta` unit frames.
    ///
    /// The step never overshoots the target.
    #[must_use]
    pub fn step(self, value: f64, target: f64, time_delta: f64) -> Eased {
        let distance = target - value;
        if distance.abs() <= self.epsilon {
            return Eased {
                value: target,
                settled: true,
                changed: value != target,
            };
        }

        let time_delta = if time_delta.is_finite() {
            time_delta.max(0.0)
        } else {
            0.0
        };
        let ease = if self.ease.is_finite() && self.ease >= 1.0 {
            self.ease
        } else {
            1.0
        };
        let rate = if self.linear_rate.is_nan() || self.linear_rate < 0.0 {
            0.0
        } else {
            self.linear_rate
        };

        let speed = rate.min(distance.abs() / ease);
        let travel = speed * time_delta;
        let mut next = if travel >= distance.abs() {
            target
        } else {
            value + travel.copysign(distance)
        };
        if (target - next).abs() <= self.epsilon {
            next = target;
        }

        Eased {
            value: next,
            settled: next == target,
            changed: next != value,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::Easing;

    #[test]
    fn linear_rate_caps_speed_far_from_target() {
        let eased = Easing::hybrid(0.05, 5.0, 0.001).step(0.0, 1.0, 1.0);
        assert_relative_eq!(eased.value, 0.05, epsilon = 1e-12);
        assert!(!eased.settled);
        assert!(eased.changed);
    }

    #[test]
    fn proportional_term_takes_over_near_target() {
        let eased = Easing::hybrid(0.05, 5.0, 0.001).step(0.9, 1.0, 1.0);
        assert_relative_eq!(eased.value, 0.92, epsilon = 1e-12);
    }

    #[test]
    fn snaps_once_within_epsilon() {
        let eased = Easing::proportional(4.0, 0.01).step(24.995, 25.0, 1.0);
        assert_eq!(eased.value, 25.0);
        assert!(eased.settled);
        assert!(eased.changed);

        let resting = Easing::proportional(4.0, 0.01).step(25.0, 25.0, 1.0);
        assert!(resting.settled);
        assert!(!resting.changed);
    }

    #[test]
    fn large_time_delta_never_overshoots() {
        let eased = Easing::proportional(2.0, 0.01).step(0.0, 1.0, 50.0);
        assert_eq!(eased.value, 1.0);
        assert!(eased.settled);

        let down = Easing::proportional(2.0, 0.01).step(1.0, 0.5, 50.0);
        assert_eq!(down.value, 0.5);
    }

    #[test]
    fn moves_downward_toward_lower_targets() {
        let eased = Easing::proportional(4.0, 0.01).step(1.0, 0.0, 1.0);
        assert_relative_eq!(eased.value, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn zero_time_delta_holds_value() {
        let eased = Easing::proportional(4.0, 0.01).step(0.3, 1.0, 0.0);
        assert_eq!(eased.value, 0.3);
        assert!(!eased.changed);
    }
}
