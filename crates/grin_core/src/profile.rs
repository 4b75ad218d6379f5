//! Profile curves mapping normalized radial position to an interpolation
//! factor between the inner and outer IOR.
//!
//! Every curve maps `t = 0` to `0` and `t = 1` to `1` (for `gamma > 0`) and
//! is monotonic on `[0, 1]`. Each shape also reports its derivative so the
//! evaluator can produce an analytic gradient.

use std::fmt;
use std::str::FromStr;

use grin_math::{floor_magnitude, EPSILON};
use serde::{Deserialize, Serialize};

use crate::error::GrinError;

/// Floor for `t` when evaluating derivatives with a negative exponent.
const T_FLOOR: f64 = 1e-6;

/// Exponential rates below this use the linear limit of the curve.
const LINEAR_GAMMA: f64 = 1e-6;

/// The functional shape of the index profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// `t^gamma`
    #[default]
    Power,
    /// Normalized base-10 log curve raised to `gamma`
    Log10,
    /// Normalized natural log curve raised to `gamma`
    LogE,
    /// `(exp(gamma t) - 1) / (exp(gamma) - 1)`
    Exponential,
    /// `(r / r_outer)^gamma` with no inner radius split
    Radial,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 5] = [
        ProfileKind::Power,
        ProfileKind::Log10,
        ProfileKind::LogE,
        ProfileKind::Exponential,
        ProfileKind::Radial,
    ];

    /// Name used in engine property maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Power => "power",
            ProfileKind::Log10 => "log10",
            ProfileKind::LogE => "loge",
            ProfileKind::Exponential => "exponential",
            ProfileKind::Radial => "radial",
        }
    }

    /// Whether the profile holds `ior_inner` flat inside `r_inner`.
    pub fn has_inner_split(&self) -> bool {
        !matches!(self, ProfileKind::Radial)
    }

    /// Evaluate the curve at normalized position `t` in `[0, 1]`.
    ///
    /// Returns `(t', dt'/dt)`.
    pub fn shape(&self, t: f64, gamma: f64) -> (f64, f64) {
        match self {
            ProfileKind::Power | ProfileKind::Radial => power(t, gamma),
            ProfileKind::Log10 => log_curve(t, gamma, 10.0),
            ProfileKind::LogE => log_curve(t, gamma, std::f64::consts::E),
            ProfileKind::Exponential => exponential(t, gamma),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = GrinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ProfileKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| GrinError::UnknownProfile(s.to_string()))
    }
}

/// `t^gamma`, with `0^0 = 1`.
fn power(t: f64, gamma: f64) -> (f64, f64) {
    let value = t.powf(gamma);
    if gamma == 0.0 {
        return (value, 0.0);
    }
    let slope = gamma * t.max(T_FLOOR).powf(gamma - 1.0);
    (value, slope)
}

/// `(ln(1 + t(b - 1)) / ln(b))^gamma`
fn log_curve(t: f64, gamma: f64, base: f64) -> (f64, f64) {
    let ln_base = base.ln();
    let arg = (1.0 + t * (base - 1.0)).max(EPSILON);
    let l = arg.ln() / ln_base;
    let dl = (base - 1.0) / (arg * ln_base);

    let (value, outer_slope) = power(l, gamma);
    (value, outer_slope * dl)
}

/// `(exp(gamma t) - 1) / (exp(gamma) - 1)`
fn exponential(t: f64, gamma: f64) -> (f64, f64) {
    if gamma.abs() < LINEAR_GAMMA {
        return (t, 1.0);
    }

    if gamma > 1.0 {
        // Rewritten in terms of exp(-gamma) so large rates don't overflow.
        let tail = (-gamma).exp();
        let denom = floor_magnitude(1.0 - tail, EPSILON);
        let head = (gamma * (t - 1.0)).exp();
        return ((head - tail) / denom, gamma * head / denom);
    }

    let denom = floor_magnitude(gamma.exp_m1(), EPSILON);
    let value = (gamma * t).exp_m1() / denom;
    let slope = gamma * (gamma * t).exp() / denom;
    (value, slope)
}
