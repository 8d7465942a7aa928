/// Linear interpolation of a tabulated function at `x`.
///
/// `xp` must be ascending. Returns `None` outside `[xp[0], xp[last]]`
/// instead of clamping, so callers can report the table bounds.
pub fn interp_linear(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    let (&first, &last) = (xp.first()?, xp.last()?);
    if !(first..=last).contains(&x) || xp.len() != fp.len() {
        return None;
    }
    if xp.len() == 1 {
        return Some(fp[0]);
    }

    let hi = xp.partition_point(|&v| v < x).clamp(1, xp.len() - 1);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return Some(fp[lo]);
    }
    let t = (x - xp[lo]) / span;
    Some(fp[lo] + t * (fp[hi] - fp[lo]))
}
