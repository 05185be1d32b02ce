//! Piecewise-linear animation over time
//!
//! A [`MultiLerp`] holds matching lists of key times and key values and
//! walks a current value through them as it is ticked. Used for body-part
//! translation (`Vec3`), Z rotation (`f32`) and colour (`Vec4` RGBA).

use std::ops::{Add, Mul, Sub};

use crate::consts::EPSILON;

/// Values that can be linearly interpolated
pub trait Lerpable: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {}

impl<T> Lerpable for T where T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T> {}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLerp<T> {
    times: Vec<f32>,
    values: Vec<T>,
    /// Elapsed time since the animation started
    x: f32,
    /// Index of the key that starts the current interval
    tracker: usize,
    repeat: bool,
    value: T,
}

impl<T: Lerpable> MultiLerp<T> {
    /// An idle animation resting at `value`
    pub fn new(value: T) -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            x: 0.0,
            tracker: 0,
            repeat: false,
            value,
        }
    }

    /// Animation through the given keys, starting at the first value
    pub fn with_keys(times: Vec<f32>, values: Vec<T>) -> Self {
        let mut anim = Self::new(values[0]);
        anim.set_lerp(times, values);
        anim
    }

    /// Replace the keys. Needs at least two keys of matching length with
    /// non-decreasing times.
    pub fn set_lerp(&mut self, times: Vec<f32>, values: Vec<T>) {
        assert!(times.len() >= 2, "an animation needs at least two keys");
        assert_eq!(times.len(), values.len(), "every key time needs a value");
        debug_assert!(times.windows(2).all(|w| w[0] <= w[1]), "key times must not decrease");

        self.x = 0.0;
        self.tracker = 0;
        self.times = times;
        self.values = values;
    }

    /// Animate from the current value to `final_value` over `final_time` seconds
    pub fn set_lerp_to(&mut self, final_time: f32, final_value: T) {
        self.set_lerp(vec![0.0, final_time], vec![self.value, final_value]);
    }

    /// Add one more key after the last one
    pub fn append(&mut self, time: f32, value: T) {
        debug_assert!(self.times.last().is_none_or(|&last| last <= time));
        self.times.push(time);
        self.values.push(value);
    }

    /// Drop every key; the value stays where it is
    pub fn clear(&mut self) {
        self.x = 0.0;
        self.tracker = 0;
        self.times.clear();
        self.values.clear();
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    #[inline]
    pub fn value(&self) -> T {
        self.value
    }

    /// Whether ticking would change nothing (no keys, or done without repeat)
    pub fn is_finished(&self) -> bool {
        self.times.len() < 2 || (!self.repeat && self.tracker == self.times.len() - 1)
    }

    /// Back to the first key
    pub fn reset_to_start(&mut self) {
        if let Some(&first) = self.values.first() {
            self.x = 0.0;
            self.tracker = 0;
            self.value = first;
        }
    }

    /// Advance by `dt` seconds. Returns true once the animation is finished.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.times.len() < 2 {
            return true;
        }

        let last = self.times.len() - 1;
        if self.tracker == last {
            if !self.repeat {
                return true;
            }
            // Time already spent past the last key belongs to the next loop
            let overshoot = (self.x - self.times[last]).max(0.0);
            self.reset_to_start();
            self.x = overshoot;
        }

        self.x += dt;
        if self.x < self.times[0] {
            return false;
        }

        while self.tracker < last && self.x >= self.times[self.tracker + 1] {
            self.tracker += 1;
        }

        if self.tracker == last {
            if !self.repeat {
                self.x = self.times[last];
            }
            self.value = self.values[last];
            return !self.repeat;
        }

        let (t0, t1) = (self.times[self.tracker], self.times[self.tracker + 1]);
        let (v0, v1) = (self.values[self.tracker], self.values[self.tracker + 1]);
        self.value = v0 + (v1 - v0) * ((self.x - t0) / (t1 - t0));
        false
    }

    /// Rate of change over the current interval (zero when idle or done)
    pub fn dxdt(&self) -> T {
        let zero = self.value * 0.0;
        if self.is_finished() || self.tracker + 1 >= self.times.len() {
            return zero;
        }
        let dt = self.times[self.tracker + 1] - self.times[self.tracker];
        if dt.abs() < EPSILON {
            return zero;
        }
        (self.values[self.tracker + 1] - self.values[self.tracker]) * (1.0 / dt)
    }
}

impl<T: Lerpable + Default> Default for MultiLerp<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_idle_animation_is_finished() {
        let mut anim = MultiLerp::new(3.0f32);
        assert!(anim.is_finished());
        assert!(anim.tick(1.0));
        assert_eq!(anim.value(), 3.0);
        assert_eq!(anim.dxdt(), 0.0);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let mut anim = MultiLerp::with_keys(vec![0.0, 1.0, 3.0], vec![0.0f32, 10.0, 0.0]);
        assert!(!anim.tick(0.5));
        assert!((anim.value() - 5.0).abs() < 1e-5);
        assert!((anim.dxdt() - 10.0).abs() < 1e-5);

        assert!(!anim.tick(1.5));
        assert!((anim.value() - 5.0).abs() < 1e-5);
        assert!((anim.dxdt() + 5.0).abs() < 1e-5);

        assert!(anim.tick(5.0));
        assert_eq!(anim.value(), 0.0);
        assert!(anim.is_finished());
    }

    #[test]
    fn test_repeat_restarts() {
        let mut anim = MultiLerp::with_keys(vec![0.0, 1.0], vec![0.0f32, 1.0]);
        anim.set_repeat(true);

        assert!(!anim.tick(1.0));
        assert_eq!(anim.value(), 1.0);
        assert!(!anim.is_finished());

        // Wraps back to the start, then advances
        assert!(!anim.tick(0.25));
        assert!((anim.value() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_repeat_carries_overshoot_into_next_loop() {
        let mut anim = MultiLerp::with_keys(vec![0.0, 1.0], vec![0.0f32, 1.0]);
        anim.set_repeat(true);

        assert!(!anim.tick(0.75));
        assert!(!anim.tick(0.5));
        assert_eq!(anim.value(), 1.0);

        // 0.25 left over from the first loop plus this tick
        assert!(!anim.tick(0.25));
        assert!((anim.value() - 0.5).abs() < 1e-5);

        // Stays in phase over many loops
        for _ in 0..40 {
            anim.tick(0.3);
        }
        // 0.5 + 12.0 elapsed, so half way through a loop
        assert!((anim.value() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_delayed_start_holds_value() {
        let mut anim = MultiLerp::with_keys(vec![1.0, 2.0], vec![Vec3::ZERO, Vec3::X]);
        assert!(!anim.tick(0.5));
        assert_eq!(anim.value(), Vec3::ZERO);
        assert!(!anim.tick(1.0));
        assert!((anim.value() - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_set_lerp_to_starts_from_current() {
        let mut anim = MultiLerp::new(Vec4::ONE);
        anim.set_lerp_to(2.0, Vec4::ZERO);
        anim.tick(1.0);
        assert!((anim.value() - Vec4::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_append_and_clear() {
        let mut anim = MultiLerp::with_keys(vec![0.0, 1.0], vec![0.0f32, 1.0]);
        anim.append(2.0, 3.0);
        anim.tick(1.5);
        assert!((anim.value() - 2.0).abs() < 1e-5);

        anim.clear();
        assert!(anim.is_finished());
        assert!((anim.value() - 2.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic]
    fn test_single_key_rejected() {
        let _ = MultiLerp::with_keys(vec![0.0], vec![1.0f32]);
    }
}
