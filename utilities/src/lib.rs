use nalgebra::Vector3;

pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !(1e-2..=1e4).contains(&value.abs()) {
        // Format in scientific notation with 4 significant digits
        format!("{:.4e}", value)
    } else {
        // Format with up to 4 decimal places, removing trailing zeros
        format!("{:.4}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn format_vector(v: &Vector3<f64>) -> String {
    format!(
        "[{}, {}, {}]",
        format_number(v.x),
        format_number(v.y),
        format_number(v.z)
    )
}

/// Reciprocal of `x`, or 0 when the reciprocal is not finite.
#[inline]
pub fn reciprocal_or_zero(x: f64) -> f64 {
    let inv = 1.0 / x;
    if inv.is_finite() { inv } else { 0.0 }
}

/// Componentwise reciprocal where zero (or a value small enough to overflow
/// the reciprocal) maps to zero instead of infinity.
pub fn invert_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(reciprocal_or_zero)
}

/// `a / b` with the same zero guard as [`reciprocal_or_zero`].
#[inline]
pub fn divide_or_zero(a: f64, b: f64) -> f64 {
    let q = a / b;
    if q.is_finite() { q } else { 0.0 }
}

/// Sign of each component, with 0 for exact zeros (unlike `f64::signum`).
pub fn signum_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(|x| {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        }
    })
}

pub fn component_max(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.zip_map(b, f64::max)
}

pub fn component_abs(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(f64::abs)
}
