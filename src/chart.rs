//! Scatter chart specifications built from a filtered subset.
//!
//! The builder only decides what is drawn where and in which colour;
//! `ui::plot` hands the result to egui_plot.

use eframe::egui::Color32;
use serde::{Serialize, Serializer};

use crate::color::{self, ColorMap};
use crate::data::model::{FundRecord, Horizon, HorizonMetrics, Subset};

/// Which pair of metrics a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    RiskReturn,
    AlphaBeta,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::RiskReturn => "Risk / Return",
            ChartKind::AlphaBeta => "Alpha / Beta",
        }
    }

    /// Column names of the x and y axes for `horizon`.
    pub fn axes(self, horizon: Horizon) -> (&'static str, &'static str) {
        let cols = horizon.columns();
        match self {
            ChartKind::RiskReturn => (cols.stdev, cols.ret),
            ChartKind::AlphaBeta => (cols.alpha, cols.beta),
        }
    }

    fn project(self, m: &HorizonMetrics) -> [f64; 2] {
        match self {
            ChartKind::RiskReturn => [m.stdev, m.ret],
            ChartKind::AlphaBeta => [m.alpha, m.beta],
        }
    }
}

/// Hover details of one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointTooltip {
    pub fund_symbol: String,
    pub metrics: HorizonValues,
    pub asset_bonds: f64,
    pub asset_stocks: f64,
    pub investment_type: Option<String>,
    pub size_type: Option<String>,
}

/// Serializable copy of [`HorizonMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonValues {
    pub stdev: f64,
    #[serde(rename = "return")]
    pub ret: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl From<HorizonMetrics> for HorizonValues {
    fn from(m: HorizonMetrics) -> Self {
        HorizonValues {
            stdev: m.stdev,
            ret: m.ret,
            alpha: m.alpha,
            beta: m.beta,
        }
    }
}

impl PointTooltip {
    fn new(rec: &FundRecord, metrics: HorizonMetrics) -> Self {
        PointTooltip {
            fund_symbol: rec.fund_symbol.clone(),
            metrics: metrics.into(),
            asset_bonds: rec.asset_bonds,
            asset_stocks: rec.asset_stocks,
            investment_type: rec.investment_type.clone(),
            size_type: rec.size_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    #[serde(serialize_with = "serialize_color")]
    pub color: Color32,
    pub highlighted: bool,
    pub tooltip: PointTooltip,
}

fn serialize_color<S: Serializer>(c: &Color32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&color::to_hex(*c))
}

/// One renderable scatterplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_field: &'static str,
    pub y_field: &'static str,
    /// Highlighted points come last so they draw on top.
    pub points: Vec<ScatterPoint>,
}

impl ScatterSpec {
    /// Point closest to `(x, y)` within `max_dist`, measured after dividing
    /// each axis by its `scale` (data units per screen unit).
    pub fn nearest(&self, x: f64, y: f64, scale: [f64; 2], max_dist: f64) -> Option<&ScatterPoint> {
        let sx = if scale[0] > 0.0 { scale[0] } else { 1.0 };
        let sy = if scale[1] > 0.0 { scale[1] } else { 1.0 };
        self.points
            .iter()
            .map(|p| {
                let dx = (p.x - x) / sx;
                let dy = (p.y - y) / sy;
                (p, dx * dx + dy * dy)
            })
            .filter(|(_, d)| *d <= max_dist * max_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

/// Build the risk/return and alpha/beta charts for `subset` at `horizon`.
///
/// * Funds without data for `horizon` are left out.
/// * With `highlight`, the matching fund is blue and every other point grey;
///   `color_by` is ignored.
/// * Otherwise points take their `color_by` category colour, or the default.
pub fn build_charts(
    subset: &Subset<'_>,
    horizon: Horizon,
    highlight: Option<&str>,
    color_by: Option<&ColorMap>,
) -> [ScatterSpec; 2] {
    [ChartKind::RiskReturn, ChartKind::AlphaBeta]
        .map(|kind| build_chart(subset, horizon, kind, highlight, color_by))
}

fn build_chart(
    subset: &Subset<'_>,
    horizon: Horizon,
    kind: ChartKind,
    highlight: Option<&str>,
    color_by: Option<&ColorMap>,
) -> ScatterSpec {
    let mut points: Vec<ScatterPoint> = subset
        .iter()
        .filter_map(|rec| {
            let metrics = rec.metrics(horizon)?;
            let [x, y] = kind.project(&metrics);
            let highlighted = highlight == Some(rec.fund_symbol.as_str());
            let color = match (highlight, color_by) {
                (Some(_), _) if highlighted => color::HIGHLIGHT_POINT,
                (Some(_), _) => color::MUTED_POINT,
                (None, Some(cm)) => cm.color_for(cm.column.value_of(rec)),
                (None, None) => color::DEFAULT_POINT,
            };
            Some(ScatterPoint {
                x,
                y,
                color,
                highlighted,
                tooltip: PointTooltip::new(rec, metrics),
            })
        })
        .collect();
    // stable: keeps row order within each group
    points.sort_by_key(|p| p.highlighted);

    let (x_field, y_field) = kind.axes(horizon);
    ScatterSpec {
        kind,
        title: format!("{} ({})", kind.title(), horizon.label()),
        x_field,
        y_field,
        points,
    }
}
