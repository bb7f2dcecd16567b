//! Two-dimensional Nelder-Mead simplex.

/// Configuration for [`nelder_mead_2d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: u32,
    /// Convergence threshold on simplex diameter.
    pub diameter_tol: f64,
    /// Convergence threshold on objective value spread.
    pub fvalue_tol: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            diameter_tol: 1e-10,
            fvalue_tol: 1e-14,
        }
    }
}

/// Result of a 2D Nelder-Mead optimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadResult {
    /// Optimal x coordinate.
    pub x: f64,
    /// Optimal y coordinate.
    pub y: f64,
    /// Objective value at the optimum.
    pub fval: f64,
    /// Iterations performed.
    pub iterations: u32,
    /// Whether a convergence criterion was met before the iteration cap.
    pub converged: bool,
}

/// Minimize `objective(x, y)` with the Nelder-Mead simplex method.
///
/// Starts from `(x0, y0)` with initial perturbations `(step_x, step_y)`.
/// Non-finite objective values are treated as `+inf`, so the objective may
/// signal an infeasible point by returning NaN.
pub fn nelder_mead_2d<F>(
    objective: F,
    x0: f64,
    y0: f64,
    step_x: f64,
    step_y: f64,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(f64, f64) -> f64,
{
    let eval = |x: f64, y: f64| {
        let v = objective(x, y);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let mut simplex = [(x0, y0), (x0 + step_x, y0), (x0, y0 + step_y)];
    let mut f_vals = [
        eval(simplex[0].0, simplex[0].1),
        eval(simplex[1].0, simplex[1].1),
        eval(simplex[2].0, simplex[2].1),
    ];

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        let mut idx = [0usize, 1, 2];
        idx.sort_by(|&a, &b| f_vals[a].total_cmp(&f_vals[b]));
        simplex = [simplex[idx[0]], simplex[idx[1]], simplex[idx[2]]];
        f_vals = [f_vals[idx[0]], f_vals[idx[1]], f_vals[idx[2]]];

        let diameter = simplex
            .iter()
            .flat_map(|a| {
                simplex
                    .iter()
                    .map(move |b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt())
            })
            .fold(0.0_f64, f64::max);
        let f_spread = f_vals[2] - f_vals[0];

        if f_vals[0].is_finite() && (diameter < config.diameter_tol || f_spread < config.fvalue_tol)
        {
            converged = true;
            break;
        }
        iterations += 1;

        let cx = (simplex[0].0 + simplex[1].0) / 2.0;
        let cy = (simplex[0].1 + simplex[1].1) / 2.0;

        // Reflection
        let rx = cx + (cx - simplex[2].0);
        let ry = cy + (cy - simplex[2].1);
        let fr = eval(rx, ry);

        if fr < f_vals[1] && fr >= f_vals[0] {
            simplex[2] = (rx, ry);
            f_vals[2] = fr;
        } else if fr < f_vals[0] {
            // Expansion
            let ex = cx + 2.0 * (rx - cx);
            let ey = cy + 2.0 * (ry - cy);
            let fe = eval(ex, ey);
            if fe < fr {
                simplex[2] = (ex, ey);
                f_vals[2] = fe;
            } else {
                simplex[2] = (rx, ry);
                f_vals[2] = fr;
            }
        } else {
            // Contraction
            let (hx, hy) = if fr < f_vals[2] {
                (cx + 0.5 * (rx - cx), cy + 0.5 * (ry - cy))
            } else {
                (
                    cx + 0.5 * (simplex[2].0 - cx),
                    cy + 0.5 * (simplex[2].1 - cy),
                )
            };
            let fh = eval(hx, hy);
            if fh < f_vals[2].min(fr) {
                simplex[2] = (hx, hy);
                f_vals[2] = fh;
            } else {
                // Shrink toward best vertex
                for j in 1..3 {
                    simplex[j].0 = simplex[0].0 + 0.5 * (simplex[j].0 - simplex[0].0);
                    simplex[j].1 = simplex[0].1 + 0.5 * (simplex[j].1 - simplex[0].1);
                    f_vals[j] = eval(simplex[j].0, simplex[j].1);
                }
            }
        }
    }

    let best = (0..3)
        .min_by(|&a, &b| f_vals[a].total_cmp(&f_vals[b]))
        .unwrap_or(0);

    NelderMeadResult {
        x: simplex[best].0,
        y: simplex[best].1,
        fval: f_vals[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead_2d(
            |x, y| (x - 1.0).powi(2) + 2.0 * (y + 0.5).powi(2),
            0.0,
            0.0,
            0.5,
            0.5,
            &NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.y, -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_rosenbrock() {
        let config = NelderMeadConfig {
            max_iter: 5000,
            ..NelderMeadConfig::default()
        };
        let result = nelder_mead_2d(
            |x, y| (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2),
            -1.2,
            1.0,
            0.1,
            0.1,
            &config,
        );
        assert!(result.converged);
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_iteration_cap_reported() {
        let config = NelderMeadConfig {
            max_iter: 3,
            ..NelderMeadConfig::default()
        };
        let result = nelder_mead_2d(|x, y| x * x + y * y, 5.0, 5.0, 1.0, 1.0, &config);
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_nan_treated_as_infeasible() {
        let result = nelder_mead_2d(
            |x, y| if x < 0.0 { f64::NAN } else { (x - 0.3).powi(2) + y * y },
            0.5,
            0.5,
            0.2,
            0.2,
            &NelderMeadConfig::default(),
        );
        assert_relative_eq!(result.x, 0.3, epsilon = 1e-4);
    }
}
