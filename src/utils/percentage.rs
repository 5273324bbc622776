use std::{fmt::Display, ops::Deref};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", round_to(self.0, 1))
    }
}

impl Percentage {
    /// `part / whole * 100`. An empty whole is 0%, never NaN.
    pub fn ratio(part: usize, whole: usize) -> Percentage {
        if whole == 0 {
            Percentage(0.)
        } else {
            Percentage(part as f64 / whole as f64 * 100.)
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
