//! Deterministic sine and cosine lookup.
//!
//! The table is built at compile time from an integer form of Bhaskara's
//! approximation, so no platform floating point is involved. A full circle is
//! [`ANGLE_STEPS`] units and results are [`Fixed`] values in `[-F1, F1]`.

use crate::fixed::{Fixed, F1};

/// Angle units in a full circle.
pub const ANGLE_STEPS: i32 = 1024;

const HALF: i64 = (ANGLE_STEPS / 2) as i64;

const SIN_TABLE: [Fixed; ANGLE_STEPS as usize] = build_sin_table();

const fn build_sin_table() -> [Fixed; ANGLE_STEPS as usize] {
    let mut table = [0; ANGLE_STEPS as usize];
    let mut i = 0;
    while i < ANGLE_STEPS as usize {
        let u = (i as i64) % HALF;
        // sin(t) ~ 16t(pi - t) / (5pi^2 - 4t(pi - t)), with t = u * pi / HALF
        let p = u * (HALF - u);
        let value = (F1 as i64 * 4 * p / (5 * HALF * HALF / 4 - p)) as Fixed;
        table[i] = if (i as i64) < HALF { value } else { -value };
        i += 1;
    }
    table
}

/// Sine of `angle`, where [`ANGLE_STEPS`] units make a full turn.
#[inline]
pub fn fsin(angle: i32) -> Fixed {
    SIN_TABLE[(angle & (ANGLE_STEPS - 1)) as usize]
}

/// Cosine of `angle`, where [`ANGLE_STEPS`] units make a full turn.
#[inline]
pub fn fcos(angle: i32) -> Fixed {
    fsin(angle.wrapping_add(ANGLE_STEPS / 4))
}
