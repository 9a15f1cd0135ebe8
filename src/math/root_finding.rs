use super::intervals::Interval;

/// Very primitive way to construct a bracket for future root-finding.
/// Simply doubles the radius until a bracket with opposite signs at the
/// endpoints is found. Returns `None` if none turns up in time.
pub fn find_root_bracket(
    f: impl Fn(f64) -> f64,
    center: f64,
    mut radius: f64,
    num_iterations: usize,
) -> Option<Interval> {
    for _ in 0..num_iterations {
        let a = center - radius;
        let b = center + radius;

        if f(a) * f(b) < 0.0 {
            return Some(Interval::new(a, b));
        }

        // Double the search radius
        radius *= 2.0;
    }

    log::debug!(
        "No sign change found around {} after {} doublings",
        center,
        num_iterations
    );
    None
}

#[allow(clippy::float_cmp)]
pub fn bisection(
    f: impl Fn(f64) -> f64,
    mut interval: Interval,
    num_iterations: usize,
) -> Option<f64> {
    // We need to determine which way f is oriented in our interval.
    let lo_is_neg = f(interval.lo()) < 0.0;

    for _ in 0..num_iterations {
        // Check right in the middle of the interval
        let guess = interval.midpoint();

        // If the interval is too small, we've converged.
        if guess == interval.lo() || guess == interval.hi() {
            return Some(guess);
        }

        // Check the value and update the interval
        let value = f(guess);
        if value.is_nan() {
            return None;
        }
        interval = match (lo_is_neg, value < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        }
    }

    log::debug!(
        "Hit max iterations ({}) when trying to find a root in {}",
        num_iterations,
        interval
    );
    None
}

// Adapted from `rtsafe` in http://www.grad.hr/nastava/gs/prg/NumericalRecipesinC.pdf
#[allow(clippy::float_cmp)]
pub fn newton_plus_bisection(
    f_and_f_prime: impl Fn(f64) -> (f64, f64),
    mut interval: Interval,
    num_iterations: usize,
) -> Option<f64> {
    // Initial setup: we guess right in the middle of the interval. Also, we need to
    // determine which way f is oriented.
    let mut guess = interval.midpoint();
    let lo_is_neg = f_and_f_prime(interval.lo()).0 < 0.0;

    for _ in 0..num_iterations {
        let (f, f_prime) = f_and_f_prime(guess);
        if f == 0.0 {
            return Some(guess);
        }
        if f.is_nan() {
            return None;
        }

        // Update the bracket
        interval = match (lo_is_neg, f < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        };

        // If the interval is too small, return
        let midpoint = interval.midpoint();
        if midpoint == interval.lo() || midpoint == interval.hi() {
            return Some(guess);
        }

        // What's our next guess? Let's try one from Newton's method
        let newton_guess = guess - f / f_prime;

        // If it's outside the interval (or on the edge); discard it. It won't help
        // us shrink our search space. NaN fails `contains` too.
        guess = if interval.contains(newton_guess)
            && newton_guess != interval.lo()
            && newton_guess != interval.hi()
        {
            newton_guess
        } else {
            // If we can't use Newton, use the midpoint
            interval.midpoint()
        };
    }

    log::debug!(
        "Hit max iterations ({}) when trying to find a root in {}",
        num_iterations,
        interval
    );
    None
}
