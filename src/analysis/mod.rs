/// Numeric core of the evaluation service.
///
/// Submodules:
/// - `align`   — joins observed and modeled series on their common timestamps
///               and clips the result to a requested date window.
/// - `metrics` — goodness-of-fit statistics over an aligned pair.

pub mod align;
pub mod metrics;
