/// Evaluation of one site's model against its observed record.
///
/// Submodules:
/// - `request`  — parses UI parameters into an `EvaluationRequest` and
///                validates what the requested evaluation needs.
/// - `fallback` — the date-filter and leading-points strategies and the
///                default configuration used when a request cannot be served.
/// - `pipeline` — `Evaluator`, which wires the source, aligner, metrics and
///                formatter together behind the single-level fallback.

pub mod fallback;
pub mod pipeline;
pub mod request;

pub use fallback::{FallbackPolicy, WindowStrategy};
pub use pipeline::{Evaluation, Evaluator};
