/// Evaluation pipeline: load → align → score → format.
///
/// `Evaluator::evaluate` runs the requested evaluation and, if it fails with
/// one of the recoverable errors (`EvalError::triggers_fallback`), runs the
/// default evaluation exactly once. A failure of the default evaluation is
/// terminal and comes back as `EvalError::EvaluationFailed`; nothing is
/// retried beyond that.

use crate::analysis::metrics;
use crate::evaluate::fallback::{FallbackPolicy, WindowStrategy};
use crate::evaluate::request::requested_plan;
use crate::ingest::{SeriesQuery, SeriesSource};
use crate::logging::{self, Component};
use crate::model::{EvalError, EvaluationRequest, MetricSet};
use crate::plot::{format_result, PlotLabel, PlotResult};

/// A completed evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub plot: PlotResult,
    pub metrics: MetricSet,
    /// Model actually scored (the default one after a fallback).
    pub model_id: String,
    pub strategy: WindowStrategy,
    pub label: PlotLabel,
    /// Number of aligned points the metrics were computed over.
    pub points: usize,
    /// Why the requested evaluation was abandoned, if it was.
    pub fallback_trigger: Option<String>,
}

impl Evaluation {
    pub fn is_fallback(&self) -> bool {
        self.label == PlotLabel::DefaultConfiguration
    }
}

/// Runs evaluations against one series source. Holds no per-request state,
/// so one evaluator can serve any number of requests.
pub struct Evaluator<'a, S: SeriesSource + ?Sized> {
    source: &'a S,
    policy: FallbackPolicy,
}

impl<'a, S: SeriesSource + ?Sized> Evaluator<'a, S> {
    pub fn new(source: &'a S, policy: FallbackPolicy) -> Self {
        Self { source, policy }
    }

    /// Evaluates `request`, falling back to the default configuration once.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<Evaluation, EvalError> {
        let site = request.site_id.as_str();

        let requested = requested_plan(request).and_then(|plan| {
            self.run(
                request,
                &plan.model_id,
                WindowStrategy::DateFilter(plan.window),
                PlotLabel::Requested,
            )
        });

        let trigger = match requested {
            Ok(evaluation) => return Ok(evaluation),
            Err(e) if e.triggers_fallback() => e,
            Err(e) => {
                logging::error(Component::Evaluation, Some(site), &format!("Evaluation aborted: {}", e));
                return Err(e);
            }
        };

        logging::log_fallback(site, &trigger);

        match self.run(
            request,
            &self.policy.default_model_id,
            self.policy.strategy(),
            PlotLabel::DefaultConfiguration,
        ) {
            Ok(mut evaluation) => {
                evaluation.fallback_trigger = Some(trigger.to_string());
                Ok(evaluation)
            }
            Err(cause) => {
                let failed = EvalError::EvaluationFailed {
                    trigger: Box::new(trigger),
                    cause: Box::new(cause),
                };
                logging::error(Component::Evaluation, Some(site), &failed.to_string());
                Err(failed)
            }
        }
    }

    /// One pass of the pipeline for a fixed model and strategy.
    pub fn run(
        &self,
        request: &EvaluationRequest,
        model_id: &str,
        strategy: WindowStrategy,
        label: PlotLabel,
    ) -> Result<Evaluation, EvalError> {
        let site = request.site_id.as_str();
        let state = request.state_code.as_deref();

        let observed = self.source.fetch_series(&SeriesQuery::observed(site, state))?;
        let modeled = self.source.fetch_series(&SeriesQuery::modeled(
            site,
            request.segment_id.as_deref(),
            state,
            model_id,
        ))?;

        let pair = strategy.apply(&observed, &modeled);
        logging::debug(
            Component::Align,
            Some(site),
            &format!(
                "{} observed × {} modeled → {} aligned points ({:?})",
                observed.len(),
                modeled.len(),
                pair.len(),
                strategy
            ),
        );

        let scores = metrics::compute(&pair)?;
        logging::info(
            Component::Metrics,
            Some(site),
            &format!(
                "{}: r2={:.3} rmse={:.1} kge={:.3} over {} points",
                model_id,
                scores.r2,
                scores.rmse,
                scores.kge,
                pair.len()
            ),
        );

        Ok(Evaluation {
            plot: format_result(&pair, &scores, model_id, site, label),
            metrics: scores,
            model_id: model_id.to_string(),
            strategy,
            label,
            points: pair.len(),
            fallback_trigger: None,
        })
    }
}
