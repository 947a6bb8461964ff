use std::f32::consts::PI;

pub const TWO_PI: f32 = 2.0 * PI;

/// Margin that keeps pitch away from the poles, where the orbit basis degenerates.
pub const PITCH_EPSILON: f32 = 1e-3;

/// A closed interval of angles (or any scalar) that values are kept inside,
/// either by wrapping around or by clamping at the ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// `value + delta`, wrapped into `[min, max)`.
    pub fn wrap(&self, value: f32, delta: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 {
            return self.min;
        }
        let wrapped = self.min + (value + delta - self.min).rem_euclid(span);
        // rem_euclid can round up to exactly `span` for tiny negative inputs.
        if wrapped >= self.max { self.min } else { wrapped }
    }

    /// `value + delta`, clamped into `[min, max]`.
    pub fn clamp(&self, value: f32, delta: f32) -> f32 {
        (value + delta).clamp(self.min, self.max)
    }
}

/// Yaw range, `[0, 2π)`.
pub const YAW_RANGE: AngleRange = AngleRange::new(0.0, TWO_PI);

/// Pitch range, `[ε, π − ε]`.
pub const PITCH_RANGE: AngleRange = AngleRange::new(PITCH_EPSILON, PI - PITCH_EPSILON);

pub fn wrap_angle(value: f32, delta: f32) -> f32 {
    YAW_RANGE.wrap(value, delta)
}

pub fn clamp_angle(value: f32, delta: f32) -> f32 {
    PITCH_RANGE.clamp(value, delta)
}
