use std::f64::consts::PI;

/// Symmetric Hann window of `m` points (`0.5 - 0.5 cos(2 pi n / (m - 1))`).
pub fn hann(m: usize) -> Vec<f64> {
    match m {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (m - 1) as f64;
            (0..m)
                .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
                .collect()
        }
    }
}

/// Multiplies both ends of `data` with half Hann windows.
///
/// Each side spans `floor(max_percentage * npts)` samples, capped at half the
/// trace length. The middle is left untouched.
pub fn taper_in_place(data: &mut [f64], max_percentage: f64) {
    let npts = data.len();
    if npts == 0 {
        return;
    }

    let wlen = ((max_percentage * npts as f64) as usize).min(npts / 2);
    if wlen == 0 {
        return;
    }

    let sides = if 2 * wlen == npts {
        hann(2 * wlen)
    } else {
        hann(2 * wlen + 1)
    };

    for i in 0..wlen {
        data[i] *= sides[i];
        data[npts - wlen + i] *= sides[sides.len() - wlen + i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_endpoints() {
        let w = hann(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!(w[4].abs() < 1e-12);
        assert_eq!(hann(1), vec![1.0]);
        assert!(hann(0).is_empty());
    }

    #[test]
    fn test_taper_five_percent() {
        let mut data = vec![1.0; 101];
        taper_in_place(&mut data, 0.05);

        // 5 samples on each side are tapered, first one to zero
        assert!(data[0].abs() < 1e-12);
        assert!(data[100].abs() < 1e-12);
        assert!(data[4] < 1.0);
        assert!(data[96] < 1.0);
        assert_eq!(data[5], 1.0);
        assert_eq!(data[95], 1.0);

        // symmetric ramps
        for i in 0..5 {
            assert!((data[i] - data[100 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_taper_short_trace_untouched() {
        let mut data = vec![2.0; 10];
        taper_in_place(&mut data, 0.05);
        assert!(data.iter().all(|&x| x == 2.0));
    }
}
