//! Numeric guards
//!
//! A single NaN in the shared particle list spreads through collisions to
//! every neighbour within a few frames, so every value that enters the
//! simulation from the outside goes through one of these first.

/// Returns `value` when finite, otherwise `fallback`.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Finite check + clamp in one go. Non-finite input maps to `fallback`
/// (which is itself clamped).
#[inline]
pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    finite_or(value, fallback).clamp(min, max)
}

/// Clamp for externally supplied pointer coordinates: non-finite input is
/// discarded (`None`) rather than replaced.
#[inline]
pub fn finite_clamped(value: f32, min: f32, max: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(min, max))
}

/// Clamp for frame timestamps coming from the host environment.
#[inline]
pub fn sanitize_time(now_ms: f64, last_ms: f64) -> f64 {
    if now_ms.is_finite() && now_ms >= last_ms {
        now_ms
    } else {
        last_ms
    }
}
