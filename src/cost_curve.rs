//! Normalisation of generator cost curves into MILP-compatible linear forms.
//!
//! A generator's production cost arrives either as quadratic coefficients
//! `a0 + a1*p + a2*p^2` or as explicit piecewise (power, cost) points. Both
//! are reduced to a set of linear lower-bound cuts on the production-cost
//! variable. Costs in the cuts are measured *above* the minimum production
//! cost (the cost of running at `pmin`), which the objective charges
//! separately per committed period.
use crate::error::CostCurveError;
use crate::generator::Generator;
use itertools::Itertools;
use serde::Deserialize;

/// Increment applied to the sampling range when `pmin == pmax`, so the
/// linearisation never works on a zero-width domain.
const DEGENERATE_RANGE_INCREMENT: f64 = 1.0;

/// A generator's cost representation as provided by the case
#[derive(PartialEq, Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum CostCurve {
    /// Quadratic coefficients: cost = a0 + a1*p + a2*p^2 ($/h at output p MW)
    Quadratic {
        /// Constant term ($/h)
        a0: f64,
        /// Linear term ($/MWh)
        a1: f64,
        /// Quadratic term ($/MW^2 h)
        a2: f64,
    },
    /// Explicit piecewise points: `values[i]` is the cost at `points[i]` MW
    Piecewise {
        /// Power breakpoints (MW), strictly increasing, within [pmin, pmax]
        points: Vec<f64>,
        /// Cost at each breakpoint ($/h), non-decreasing
        values: Vec<f64>,
    },
}

impl CostCurve {
    /// Evaluate the curve at output `p`.
    ///
    /// Piecewise curves interpolate linearly between breakpoints and
    /// extrapolate the end segments.
    pub fn evaluate(&self, p: f64) -> f64 {
        match self {
            CostCurve::Quadratic { a0, a1, a2 } => a0 + a1 * p + a2 * p * p,
            CostCurve::Piecewise { points, values } => {
                // Find the segment containing p (clamped to the end segments)
                let last = points.len() - 2;
                let i = points[1..last + 1]
                    .iter()
                    .position(|&x| p < x)
                    .unwrap_or(last);
                let slope = (values[i + 1] - values[i]) / (points[i + 1] - points[i]);
                values[i] + slope * (p - points[i])
            }
        }
    }
}

/// One linear lower-bound cut on the production-cost variable.
///
/// The cut reads `ProductionCost >= value + slope * (p - power)` with `value`
/// already net of the minimum production cost.
#[derive(PartialEq, Clone, Debug)]
pub struct CostCut {
    /// The output the cut is anchored at (MW)
    pub power: f64,
    /// Cost above minimum at the anchor ($/h)
    pub value: f64,
    /// Marginal cost along the cut ($/MWh)
    pub slope: f64,
}

/// The linearised production cost for one generator
#[derive(PartialEq, Clone, Debug)]
pub struct LinearisedCost {
    /// The ordered (power, cost) breakpoints the cuts were derived from
    pub breakpoints: Vec<(f64, f64)>,
    /// Cost of running at `pmin` ($/h); charged per committed period
    pub minimum_cost: f64,
    /// Lower-bound cuts for the production-cost variable
    pub cuts: Vec<CostCut>,
}

/// Normalise a generator's cost curve to `segments + 1` ordered breakpoints
/// and derive the linear cuts.
///
/// Quadratic curves are sampled at equally spaced points between `pmin` and
/// `pmax`; piecewise curves are validated and passed through. With
/// `use_chords` the cuts are the chords between consecutive breakpoints (the
/// classic piecewise-linear lower envelope); without it, quadratic curves get
/// tangent cuts at the sampled points instead (exact at the breakpoints), and
/// piecewise curves fall back to chords since no derivative is available.
pub fn linearise(
    generator: &Generator,
    segments: usize,
    use_chords: bool,
) -> Result<LinearisedCost, CostCurveError> {
    let breakpoints = breakpoints(generator, segments)?;
    let minimum_cost = generator.cost_curve.evaluate(generator.pmin);

    let cuts = match (&generator.cost_curve, use_chords) {
        (CostCurve::Quadratic { a1, a2, .. }, false) => breakpoints
            .iter()
            .map(|&(p, c)| CostCut {
                power: p,
                value: c - minimum_cost,
                slope: a1 + 2.0 * a2 * p,
            })
            .collect(),
        _ => chord_cuts(&breakpoints, minimum_cost),
    };

    Ok(LinearisedCost {
        breakpoints,
        minimum_cost,
        cuts,
    })
}

/// Chord cuts between consecutive breakpoints
fn chord_cuts(breakpoints: &[(f64, f64)], minimum_cost: f64) -> Vec<CostCut> {
    breakpoints
        .iter()
        .tuple_windows()
        .map(|(&(p0, c0), &(p1, c1))| CostCut {
            power: p0,
            value: c0 - minimum_cost,
            slope: (c1 - c0) / (p1 - p0),
        })
        .collect()
}

/// Sample or validate the curve into ordered (power, cost) breakpoints
fn breakpoints(
    generator: &Generator,
    segments: usize,
) -> Result<Vec<(f64, f64)>, CostCurveError> {
    match &generator.cost_curve {
        CostCurve::Quadratic { .. } => {
            let lower = generator.pmin;
            let mut upper = generator.pmax;
            if lower == upper {
                // Zero-width domain; nudge the upper bound so the segment
                // slopes are well defined
                upper += DEGENERATE_RANGE_INCREMENT;
            }

            Ok(linspace(lower, upper, segments + 1)
                .map(|p| (p, generator.cost_curve.evaluate(p)))
                .collect())
        }
        CostCurve::Piecewise { points, values } => {
            let id = &generator.id;
            if points.len() < 2 || points.len() != values.len() {
                return Err(CostCurveError::TooFewPoints {
                    generator: id.to_string(),
                    count: points.len().min(values.len()),
                });
            }
            if points.iter().tuple_windows().any(|(a, b)| a >= b) {
                return Err(CostCurveError::NonIncreasingPoints {
                    generator: id.to_string(),
                });
            }
            if values.iter().tuple_windows().any(|(a, b)| a > b) {
                return Err(CostCurveError::DecreasingValues {
                    generator: id.to_string(),
                });
            }
            if let Some(&point) = points
                .iter()
                .find(|&&p| p < generator.pmin || p > generator.pmax)
            {
                return Err(CostCurveError::PointOutOfRange {
                    generator: id.to_string(),
                    point,
                    pmin: generator.pmin,
                    pmax: generator.pmax,
                });
            }

            Ok(points.iter().copied().zip(values.iter().copied()).collect())
        }
    }
}

/// `n` equally spaced values from `start` to `end` inclusive
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    debug_assert!(n >= 2);
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(move |i| {
        if i == n - 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::generator;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_quadratic_breakpoints(mut generator: Generator) {
        generator.pmin = 10.0;
        generator.pmax = 100.0;
        generator.cost_curve = CostCurve::Quadratic {
            a0: 5.0,
            a1: 2.0,
            a2: 0.01,
        };

        let linearised = linearise(&generator, 2, true).unwrap();
        assert_eq!(linearised.breakpoints.len(), 3);
        assert_approx_eq!(f64, linearised.breakpoints[0].0, 10.0);
        assert_approx_eq!(f64, linearised.breakpoints[1].0, 55.0);
        assert_approx_eq!(f64, linearised.breakpoints[2].0, 100.0);
        // Cost at pmin: 5 + 20 + 1 = 26
        assert_approx_eq!(f64, linearised.minimum_cost, 26.0);
        // Chord values are measured above minimum cost
        assert_approx_eq!(f64, linearised.cuts[0].value, 0.0);
    }

    #[rstest]
    fn test_quadratic_degenerate_range(mut generator: Generator) {
        generator.pmin = 50.0;
        generator.pmax = 50.0;
        generator.cost_curve = CostCurve::Quadratic {
            a0: 0.0,
            a1: 1.0,
            a2: 0.0,
        };

        // A zero-width range must still produce distinct breakpoints
        let linearised = linearise(&generator, 2, true).unwrap();
        let (first, last) = (
            linearised.breakpoints.first().unwrap().0,
            linearised.breakpoints.last().unwrap().0,
        );
        assert!(last > first);
    }

    #[rstest]
    fn test_tangent_cuts_exact_at_endpoints(mut generator: Generator) {
        generator.pmin = 10.0;
        generator.pmax = 100.0;
        let curve = CostCurve::Quadratic {
            a0: 5.0,
            a1: 2.0,
            a2: 0.01,
        };
        generator.cost_curve = curve.clone();

        let linearised = linearise(&generator, 4, false).unwrap();

        // Each tangent cut touches the quadratic at its anchor point
        for cut in &linearised.cuts {
            let expected = curve.evaluate(cut.power) - linearised.minimum_cost;
            assert_approx_eq!(f64, cut.value, expected, epsilon = 1e-6);
        }

        // The chord and tangent renderings agree at pmin and pmax
        let chords = linearise(&generator, 4, true).unwrap();
        for p in [generator.pmin, generator.pmax] {
            let tangent_max = envelope_at(&linearised.cuts, p);
            let chord_max = envelope_at(&chords.cuts, p);
            assert_approx_eq!(f64, tangent_max, chord_max, epsilon = 1e-6);
            assert_approx_eq!(
                f64,
                tangent_max,
                curve.evaluate(p) - linearised.minimum_cost,
                epsilon = 1e-6
            );
        }
    }

    /// The lower envelope's value at output p
    fn envelope_at(cuts: &[CostCut], p: f64) -> f64 {
        cuts.iter()
            .map(|cut| cut.value + cut.slope * (p - cut.power))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[rstest]
    fn test_piecewise_passthrough(mut generator: Generator) {
        generator.pmin = 0.0;
        generator.pmax = 100.0;
        generator.cost_curve = CostCurve::Piecewise {
            points: vec![0.0, 50.0, 100.0],
            values: vec![0.0, 60.0, 140.0],
        };

        let linearised = linearise(&generator, 7, true).unwrap();
        // Segment count comes from the data, not from the config
        assert_eq!(linearised.breakpoints.len(), 3);
        assert_eq!(linearised.cuts.len(), 2);
        assert_approx_eq!(f64, linearised.cuts[0].slope, 1.2);
        assert_approx_eq!(f64, linearised.cuts[1].slope, 1.6);
    }

    #[rstest]
    fn test_piecewise_validation(mut generator: Generator) {
        generator.pmin = 0.0;
        generator.pmax = 100.0;

        generator.cost_curve = CostCurve::Piecewise {
            points: vec![0.0],
            values: vec![0.0],
        };
        assert!(matches!(
            linearise(&generator, 2, true),
            Err(CostCurveError::TooFewPoints { .. })
        ));

        generator.cost_curve = CostCurve::Piecewise {
            points: vec![0.0, 50.0, 50.0],
            values: vec![0.0, 1.0, 2.0],
        };
        assert!(matches!(
            linearise(&generator, 2, true),
            Err(CostCurveError::NonIncreasingPoints { .. })
        ));

        generator.cost_curve = CostCurve::Piecewise {
            points: vec![0.0, 50.0, 100.0],
            values: vec![0.0, 2.0, 1.0],
        };
        assert!(matches!(
            linearise(&generator, 2, true),
            Err(CostCurveError::DecreasingValues { .. })
        ));

        generator.cost_curve = CostCurve::Piecewise {
            points: vec![0.0, 150.0],
            values: vec![0.0, 1.0],
        };
        assert!(matches!(
            linearise(&generator, 2, true),
            Err(CostCurveError::PointOutOfRange { .. })
        ));
    }
}
