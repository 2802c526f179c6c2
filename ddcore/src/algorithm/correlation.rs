/// Full discrete cross-correlation of `a` and `v`.
///
/// Output has `a.len() + v.len() - 1` lags, the first being `v`'s last sample
/// over `a`'s first. `c[k] = sum_n a[n + k - (v.len() - 1)] * v[n]`.
pub fn correlate_full(a: &[f64], v: &[f64]) -> Vec<f64> {
    if a.is_empty() || v.is_empty() {
        return Vec::new();
    }

    let na = a.len() as isize;
    let nv = v.len() as isize;
    let mut out = Vec::with_capacity((na + nv - 1) as usize);

    for k in 0..(na + nv - 1) {
        let shift = k - (nv - 1);
        let n_lo = (-shift).max(0);
        let n_hi = (na - shift).min(nv);
        let mut acc = 0.0;
        for n in n_lo..n_hi {
            acc += a[(n + shift) as usize] * v[n as usize];
        }
        out.push(acc);
    }

    out
}

pub fn energy(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Peak cross-correlation normalized by the geometric mean energy.
///
/// `max(correlate(a, b)) / sqrt(sum(a^2) * sum(b^2))`. Returns `None` when
/// either segment is empty or carries no energy.
pub fn cc_ratio(a: &[f64], b: &[f64]) -> Option<f64> {
    let denom = (energy(a) * energy(b)).sqrt();
    if !(denom.is_finite() && denom > 0.0) {
        return None;
    }

    let peak = correlate_full(a, b)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);

    if peak.is_finite() {
        Some(peak / denom)
    } else {
        None
    }
}
