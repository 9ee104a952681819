/// Plot-ready packaging of an evaluation.
///
/// The map UI renders whatever comes out of here directly as a Plotly line
/// chart: a title, two line series, and a static axis layout. The title text
/// is a presentation contract with the UI; consumers parse the embedded
/// metrics in the order RMSE, KGE, MaxError, so that order is fixed.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{AlignedPair, MetricSet};

pub const Y_AXIS_TITLE: &str = "Streamflow (cfs)";
pub const X_AXIS_TITLE: &str = "Date";

const OBSERVED_NAME: &str = "USGS Observed";
const OBSERVED_COLOR: &str = "blue";
const MODELED_COLOR: &str = "red";
const LINE_WIDTH: u32 = 2;

/// Which configuration produced the plotted evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotLabel {
    /// The model and dates the user asked for.
    Requested,
    /// The degraded default configuration.
    DefaultConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: u32,
    pub color: &'static str,
}

/// One line on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub name: String,
    pub mode: &'static str,
    pub x: Vec<NaiveDateTime>,
    pub y: Vec<f64>,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub yaxis: AxisTitle,
    pub xaxis: AxisTitle,
}

impl Default for AxisLayout {
    fn default() -> Self {
        Self {
            yaxis: AxisTitle { title: Y_AXIS_TITLE },
            xaxis: AxisTitle { title: X_AXIS_TITLE },
        }
    }
}

/// The `(title, series, layout)` triple handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotResult {
    pub title: String,
    #[serde(rename = "data")]
    pub series: Vec<SeriesSpec>,
    pub layout: AxisLayout,
}

impl PlotResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Builds the chart for an evaluated pair.
pub fn format_result(
    pair: &AlignedPair,
    metrics: &MetricSet,
    model_id: &str,
    site_id: &str,
    label: PlotLabel,
) -> PlotResult {
    let shown = metrics.rounded();

    let heading = match label {
        PlotLabel::Requested => {
            format!("{} and Observed Streamflow at USGS site: {}", model_id, site_id)
        }
        PlotLabel::DefaultConfiguration => format!(
            "Default Configuration:{} Observed Streamflow at USGS site: {}",
            model_id, site_id
        ),
    };
    let title = format!(
        "{} <br> RMSE: {:.0} cfs <br> KGE: {:.2} <br> MaxError: {:.0} cfs",
        heading, shown.rmse, shown.kge, shown.max_error
    );

    let modeled_name = match label {
        PlotLabel::Requested => format!("{} Modeled", model_id),
        PlotLabel::DefaultConfiguration => {
            format!("Default Configuration: {} Modeled", model_id)
        }
    };

    let x = pair.timestamps();
    let series = vec![
        SeriesSpec {
            name: OBSERVED_NAME.to_string(),
            mode: "lines",
            x: x.clone(),
            y: pair.observed(),
            line: LineStyle {
                width: LINE_WIDTH,
                color: OBSERVED_COLOR,
            },
        },
        SeriesSpec {
            name: modeled_name,
            mode: "lines",
            x,
            y: pair.modeled(),
            line: LineStyle {
                width: LINE_WIDTH,
                color: MODELED_COLOR,
            },
        },
    ];

    PlotResult {
        title,
        series,
        layout: AxisLayout::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlignedPoint;
    use chrono::NaiveDate;

    fn sample_pair() -> AlignedPair {
        let t = |d| {
            NaiveDate::from_ymd_opt(2019, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        AlignedPair {
            points: vec![
                AlignedPoint { timestamp: t(1), observed: 100.0, modeled: 110.0 },
                AlignedPoint { timestamp: t(2), observed: 120.0, modeled: 90.0 },
            ],
        }
    }

    fn sample_metrics() -> MetricSet {
        MetricSet {
            r2: 0.5,
            rmse: 22.36,
            max_error: 30.0,
            mape_percent: 17.5,
            kge: 0.4567,
            kge_r: -1.0,
            kge_alpha: 2.0,
            kge_beta: 0.909,
        }
    }

    #[test]
    fn test_requested_title_embeds_metrics_in_order() {
        let plot = format_result(&sample_pair(), &sample_metrics(), "LSTM", "10171000", PlotLabel::Requested);
        assert_eq!(
            plot.title,
            "LSTM and Observed Streamflow at USGS site: 10171000 <br> RMSE: 22 cfs <br> KGE: 0.46 <br> MaxError: 30 cfs"
        );
        let rmse = plot.title.find("RMSE").unwrap();
        let kge = plot.title.find("KGE").unwrap();
        let max = plot.title.find("MaxError").unwrap();
        assert!(rmse < kge && kge < max);
    }

    #[test]
    fn test_default_configuration_labels() {
        let plot = format_result(
            &sample_pair(),
            &sample_metrics(),
            "NWM_v2.1",
            "10171000",
            PlotLabel::DefaultConfiguration,
        );
        assert!(plot.title.starts_with("Default Configuration:NWM_v2.1 Observed Streamflow at USGS site: 10171000"));
        assert_eq!(plot.series[1].name, "Default Configuration: NWM_v2.1 Modeled");
    }

    #[test]
    fn test_exactly_two_styled_series() {
        let plot = format_result(&sample_pair(), &sample_metrics(), "CNN", "10171000", PlotLabel::Requested);
        assert_eq!(plot.series.len(), 2);

        let observed = &plot.series[0];
        assert_eq!(observed.name, "USGS Observed");
        assert_eq!(observed.y, vec![100.0, 120.0]);
        assert_eq!(observed.line.color, "blue");

        let modeled = &plot.series[1];
        assert_eq!(modeled.name, "CNN Modeled");
        assert_eq!(modeled.y, vec![110.0, 90.0]);
        assert_eq!(modeled.line.color, "red");
        assert_eq!(observed.x, modeled.x);
    }

    #[test]
    fn test_json_shape() {
        let plot = format_result(&sample_pair(), &sample_metrics(), "CNN", "10171000", PlotLabel::Requested);
        let json: serde_json::Value = serde_json::from_str(&plot.to_json().unwrap()).unwrap();

        assert_eq!(json["layout"]["yaxis"]["title"], "Streamflow (cfs)");
        assert_eq!(json["layout"]["xaxis"]["title"], "Date");
        assert_eq!(json["data"][0]["mode"], "lines");
        assert_eq!(json["data"][0]["line"]["width"], 2);
        assert_eq!(json["data"][0]["x"][0], "2019-01-01T00:00:00");
    }
}
