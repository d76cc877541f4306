//! Numerical conditioning diagnostics for the design matrix

use ndarray::{Array2, Axis};

const MAX_SWEEPS: usize = 100;

/// Singular values of `x` by one-sided (Hestenes) Jacobi rotations, sorted descending.
///
/// Column pairs of a working copy are rotated until mutually orthogonal; the singular
/// values are then the column norms. `XᵀX` is never formed, so values down to about
/// `ε · σmax` survive. A wide matrix is handled through its transpose, giving
/// `min(nrows, ncols)` values.
pub fn singular_values(x: &Array2<f64>) -> Vec<f64> {
    let mut u = if x.nrows() < x.ncols() {
        x.t().to_owned()
    } else {
        x.clone()
    };
    let n = u.ncols();

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..n {
            for q in (p + 1)..n {
                let up = u.column(p);
                let uq = u.column(q);
                let alpha = up.dot(&up);
                let beta = uq.dot(&uq);
                let gamma = up.dot(&uq);
                let orthogonal = gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt();
                if alpha == 0.0 || beta == 0.0 || orthogonal {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for k in 0..u.nrows() {
                    let ukp = u[[k, p]];
                    let ukq = u[[k, q]];
                    u[[k, p]] = c * ukp - s * ukq;
                    u[[k, q]] = s * ukp + c * ukq;
                }
            }
        }

        if !rotated {
            break;
        }
    }

    let mut values: Vec<f64> = u
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col).sqrt())
        .collect();
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    values
}

/// 2-norm condition number of `x`: `σmax / σmin` over its singular values.
///
/// `+∞` only when the smallest singular value is exactly zero; a nearly singular
/// design reports its large finite ratio. `NaN` for an empty matrix.
pub fn condition_number(x: &Array2<f64>) -> f64 {
    if x.ncols() == 0 || x.nrows() == 0 {
        return f64::NAN;
    }

    let values = singular_values(x);
    let largest = values.first().copied().unwrap_or(0.0);
    let smallest = values.last().copied().unwrap_or(0.0);

    if smallest <= 0.0 {
        return f64::INFINITY;
    }

    largest / smallest
}
