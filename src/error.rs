//! Error types for the model build and solve pipeline.
//!
//! Build-time problems are reported with the offending entity and period so
//! that a bad case can be diagnosed without re-running under a debugger.
use thiserror::Error;

/// The network topology is inconsistent with the case data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// A generator references a bus that is not in the bus set
    #[error("generator {generator} references unknown bus {bus}")]
    UnknownGeneratorBus {
        /// The offending generator
        generator: String,
        /// The bus it references
        bus: String,
    },
    /// A branch endpoint is not in the bus set
    #[error("branch endpoint references unknown bus {bus}")]
    UnknownBranchBus {
        /// The bus the branch references
        bus: String,
    },
    /// A storage or non-dispatchable unit references a bus that is not in the bus set
    #[error("unit {unit} references unknown bus {bus}")]
    UnknownUnitBus {
        /// The offending unit
        unit: String,
        /// The bus it references
        bus: String,
    },
    /// Bus contribution factors for a generator do not sum to 1
    #[error("bus contribution factors for generator {generator} sum to {total}, expected 1")]
    ContributionFactorSum {
        /// The offending generator
        generator: String,
        /// The actual sum of its factors
        total: f64,
    },
    /// The susceptance matrix is singular, so no PTDF matrix exists
    #[error("network is disconnected or degenerate; cannot compute PTDF matrix")]
    SingularNetwork,
}

/// A generator's cost-curve data cannot be linearised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostCurveError {
    /// Fewer than two breakpoints
    #[error("cost curve for generator {generator} has {count} points, need at least 2")]
    TooFewPoints {
        /// The offending generator
        generator: String,
        /// How many points it has
        count: usize,
    },
    /// Power breakpoints not strictly increasing
    #[error("cost curve for generator {generator} has non-increasing power points")]
    NonIncreasingPoints {
        /// The offending generator
        generator: String,
    },
    /// Cost values decrease along the curve
    #[error("cost curve for generator {generator} has decreasing cost values")]
    DecreasingValues {
        /// The offending generator
        generator: String,
    },
    /// A breakpoint lies outside the generator's output range
    #[error("cost curve point {point} for generator {generator} is outside [{pmin}, {pmax}]")]
    PointOutOfRange {
        /// The offending generator
        generator: String,
        /// The out-of-range breakpoint
        point: f64,
        /// The generator's minimum output
        pmin: f64,
        /// The generator's maximum output
        pmax: f64,
    },
}

/// An invalid configuration option value, rejected before the build starts.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid configuration: {0}")]
pub struct ConfigurationError(pub String);

/// Case data violated a constructor-time invariant.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid case data: {0}")]
pub struct ValidationError(pub String);

/// Any error raised while assembling the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// See [`TopologyError`]
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// See [`CostCurveError`]
    #[error(transparent)]
    CostCurve(#[from] CostCurveError),
    /// See [`ConfigurationError`]
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// See [`ValidationError`]
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// An error raised by the solve step.
///
/// The model snapshot is left untouched by all of these, so the caller may
/// retry with different options or a different solver configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The solver crashed or returned an unusable status
    #[error("solver failed: {0}")]
    Solver(String),
    /// The problem was proven infeasible. A business-logic outcome, not a
    /// crash; no partial results are returned.
    #[error("problem is infeasible ({0})")]
    Infeasible(String),
    /// The wall-clock limit was hit before the gap was closed
    #[error("solver hit the time limit")]
    Timeout,
}
