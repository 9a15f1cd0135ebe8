use std::cmp::Ordering;

pub fn stumpff_c(x: f64) -> [f64; 4] {
    [c0(x), c1(x), c2(x), c3(x)]
}

#[allow(non_snake_case)]
pub fn stumpff_G(beta: f64, s: f64) -> [f64; 4] {
    // the kth entry should be s^k c_k(beta s^2)
    let mut output = stumpff_c(beta * s * s);
    for (k, value) in output.iter_mut().enumerate() {
        *value *= s.powi(k as i32);
    }

    output
}

// NaN has no ordering against zero; it falls through every branch below and
// comes back out as NaN, so callers can detect it instead of panicking.

pub fn c0(x: f64) -> f64 {
    match x.partial_cmp(&0.0) {
        Some(Ordering::Greater) => x.sqrt().cos(),
        Some(Ordering::Less) => (-x).sqrt().cosh(),
        Some(Ordering::Equal) => 1.0,
        None => f64::NAN,
    }
}

pub fn c1(x: f64) -> f64 {
    match x.partial_cmp(&0.0) {
        Some(Ordering::Greater) => x.sqrt().sin() / x.sqrt(),
        Some(Ordering::Less) => (-x).sqrt().sinh() / (-x).sqrt(),
        Some(Ordering::Equal) => 1.0,
        None => f64::NAN,
    }
}

pub fn c2(x: f64) -> f64 {
    match x.partial_cmp(&0.0) {
        // 1 - cos u = 2 sin^2(u/2)
        Some(Ordering::Greater) => 2.0 * (x.sqrt() / 2.0).sin().powi(2) / x,
        // 1 - cosh u = -2 sinh^2(u/2)
        Some(Ordering::Less) => -2.0 * ((-x).sqrt() / 2.0).sinh().powi(2) / x,
        Some(Ordering::Equal) => 0.5,
        None => f64::NAN,
    }
}

// Chebyshev fit of c3 on [-1, 1]
const C3_CHEBYSHEV: [f64; 9] = [
    1.6676588241065263e-1,
    -8.335400232645692e-3,
    9.921887561900632e-5,
    -6.889831660341532e-7,
    3.1316569342984595e-9,
    -1.0037209903903158e-11,
    2.3897900455039615e-14,
    -4.392970771382075e-17,
    6.422446836919863e-20,
];

pub fn c3(x: f64) -> f64 {
    // Check if we're close to the origin. If so, do fancy Chebyshev math,
    // to avoid catastrophic cancellation.
    // Otherwise we're good with the naive formula.
    if x.abs() < 1.0 {
        evaluate_chebyshev(x, &C3_CHEBYSHEV)
    } else {
        (1.0 - c1(x)) / x
    }
}

pub fn evaluate_chebyshev(x: f64, coeffs: &[f64]) -> f64 {
    // uses clenshaw's algorithm to evaluate a sum of chebyshev polynomials.
    // apparently it's nice and stable

    let n = coeffs.len() - 1; // max degree

    let mut b_k_plus_2 = 0.0;
    let mut b_k_plus_1 = 0.0;

    // recurrence is b_k = a_k + 2x b_(k+1) - b_(k+2)
    for k in (1..=n).rev() {
        let b_k = coeffs[k] + 2.0 * x * b_k_plus_1 - b_k_plus_2;

        // shift down
        b_k_plus_2 = b_k_plus_1;
        b_k_plus_1 = b_k;
    }

    // we just finished k = 1, so now k = 0 here
    // and we have b_1 and b_2
    coeffs[0] + x * b_k_plus_1 - b_k_plus_2
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_values_at_origin() {
        assert_eq!(stumpff_c(0.0), [1.0, 1.0, 0.5, c3(0.0)]);
        assert_relative_eq!(c3(0.0), 1.0 / 6.0, max_relative = 1e-15);
    }

    #[test]
    fn test_c3_is_continuous_across_chebyshev_boundary() {
        // The series and the closed form have to agree where we swap between them
        for x in [-1.0, 1.0] {
            let naive = (1.0 - c1(x)) / x;
            assert_relative_eq!(c3(x), naive, max_relative = 1e-14);
        }
        for x in [-0.999_999, 0.999_999] {
            let naive = (1.0 - c1(x)) / x;
            assert_relative_eq!(c3(x), naive, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_known_values() {
        // With x = u^2, c2 = (1 - cos u)/u^2 and c3 = (u - sin u)/u^3
        let u = std::f64::consts::PI;
        assert_relative_eq!(c2(u * u), 2.0 / (u * u), max_relative = 1e-14);
        assert_relative_eq!(c3(u * u), 1.0 / (u * u), max_relative = 1e-14);

        // Hyperbolic side: (cosh u - 1)/u^2
        let u: f64 = 2.0;
        assert_relative_eq!(c2(-u * u), (u.cosh() - 1.0) / (u * u), max_relative = 1e-14);
        assert_relative_eq!(
            c3(-u * u),
            (u.sinh() - u) / (u * u * u),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_nan_propagates() {
        assert!(c0(f64::NAN).is_nan());
        assert!(c2(f64::NAN).is_nan());
        assert!(c3(f64::NAN).is_nan());
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_stumpff_G_scaling() {
        let (beta, s) = (0.3, 1.7);
        let G = stumpff_G(beta, s);
        let c = stumpff_c(beta * s * s);
        for k in 0..4 {
            assert_relative_eq!(G[k], c[k] * s.powi(k as i32), max_relative = 1e-15);
        }
    }
}
