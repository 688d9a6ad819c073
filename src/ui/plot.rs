use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::chart::{PointTooltip, ScatterPoint, ScatterSpec};
use crate::color::ColorMap;
use crate::data::model::{CategoryColumn, Horizon, Subset};
use crate::state::AppState;
use crate::ui::metrics::{self, decimal, percent};

/// Hover radius in screen points.
const HOVER_RADIUS: f64 = 8.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the central panel: metric tiles + highlighted charts when a fund is
/// selected, otherwise plain charts + the fund table.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            let msg = state
                .status_message
                .clone()
                .unwrap_or_else(|| "Open a file to view funds  (File → Open…)".to_string());
            ui.heading(msg);
        });
        return;
    }

    let Some(charts) = state.charts() else {
        return;
    };
    if state.subset().is_some_and(|s| s.is_empty()) {
        let msg = if state.dataset.as_ref().is_some_and(|ds| ds.is_empty()) {
            "The dataset has no funds."
        } else {
            "No funds match the current filters."
        };
        ui.label(RichText::new(msg).weak());
    }

    if let Some(m) = state.selected_metrics() {
        metrics::metrics_panel(ui, &m);
        ui.separator();
        let height = ui.available_height();
        chart_row(ui, &charts, None, state.point_radius, height);
        return;
    }

    let height = ui.available_height() * 0.55;
    chart_row(ui, &charts, state.color_map.as_ref(), state.point_radius, height);
    ui.separator();

    let picked = state
        .subset()
        .and_then(|subset| fund_table(ui, &subset, state.selection.horizon));
    if let Some(symbol) = picked {
        state.set_symbol(Some(symbol));
    }
}

fn chart_row(
    ui: &mut Ui,
    charts: &[ScatterSpec; 2],
    color_map: Option<&ColorMap>,
    radius: f32,
    height: f32,
) {
    ui.columns(2, |cols: &mut [Ui]| {
        for (col, spec) in cols.iter_mut().zip(charts) {
            scatter_plot(col, spec, color_map, radius, height);
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// Legend name of the series a point belongs to.
fn series_name(p: &ScatterPoint, color_map: Option<&ColorMap>) -> String {
    if p.highlighted {
        return p.tooltip.fund_symbol.clone();
    }
    match color_map {
        Some(cm) => {
            let value = match cm.column {
                CategoryColumn::InvestmentType => &p.tooltip.investment_type,
                CategoryColumn::SizeType => &p.tooltip.size_type,
            };
            value.clone().unwrap_or_else(|| "n/a".to_string())
        }
        None => "Funds".to_string(),
    }
}

/// Group points into one series per (name, colour), keeping first-seen
/// order so highlighted points are drawn last.
fn series(spec: &ScatterSpec, color_map: Option<&ColorMap>) -> Vec<(String, Color32, Vec<[f64; 2]>)> {
    let mut out: Vec<(String, Color32, Vec<[f64; 2]>)> = Vec::new();
    for p in &spec.points {
        let name = series_name(p, color_map);
        match out.iter_mut().find(|(n, c, _)| *n == name && *c == p.color) {
            Some((_, _, pts)) => pts.push([p.x, p.y]),
            None => out.push((name, p.color, vec![[p.x, p.y]])),
        }
    }
    out
}

fn tooltip_text(t: &PointTooltip) -> String {
    let m = &t.metrics;
    format!(
        "{}\nstdev: {}  return: {}\nalpha: {}  beta: {}\nbonds: {}  stocks: {}\n{} / {}",
        t.fund_symbol,
        decimal(m.stdev),
        decimal(m.ret),
        decimal(m.alpha),
        decimal(m.beta),
        percent(t.asset_bonds),
        percent(t.asset_stocks),
        t.investment_type.as_deref().unwrap_or("–"),
        t.size_type.as_deref().unwrap_or("–"),
    )
}

fn scatter_plot(ui: &mut Ui, spec: &ScatterSpec, color_map: Option<&ColorMap>, radius: f32, height: f32) {
    ui.label(RichText::new(&spec.title).strong());

    let mut plot = Plot::new(spec.x_field)
        .height(height)
        .x_axis_label(spec.x_field)
        .y_axis_label(spec.y_field)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if color_map.is_some() {
        plot = plot.legend(Legend::default());
    }

    let response = plot.show(ui, |plot_ui| {
        for (name, color, pts) in series(spec, color_map) {
            let points = Points::new(PlotPoints::from(pts))
                .name(name)
                .color(color)
                .shape(MarkerShape::Circle)
                .filled(true)
                .radius(radius);
            plot_ui.points(points);
        }
        plot_ui.pointer_coordinate()
    });

    if let Some(pointer) = response.inner {
        let [dx, dy] = response.transform.dvalue_dpos();
        if let Some(p) = spec.nearest(pointer.x, pointer.y, [dx.abs(), dy.abs()], HOVER_RADIUS) {
            response.response.on_hover_text_at_pointer(tooltip_text(&p.tooltip));
        }
    }
}

// ---------------------------------------------------------------------------
// Fund table (aggregate view)
// ---------------------------------------------------------------------------

/// Table of the filtered funds. Returns the symbol the user clicked, if any.
fn fund_table(ui: &mut Ui, subset: &Subset<'_>, horizon: Horizon) -> Option<String> {
    let records: Vec<_> = subset.iter().collect();
    let mut picked = None;

    ui.label(format!("{} funds", records.len()));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder().at_least(160.0).clip(true))
        .columns(Column::auto().at_least(70.0), 7)
        .header(20.0, |mut header| {
            for title in [
                "Symbol", "Name", "Quote", "Investment", "Size", "Risk", "Return", "Alpha", "Beta",
            ] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let rec = records[row.index()];
                let perf = rec.metrics(horizon);
                row.col(|ui: &mut Ui| {
                    if ui.link(rec.fund_symbol.as_str()).clicked() {
                        picked = Some(rec.fund_symbol.clone());
                    }
                });
                let cells = [
                    rec.fund_long_name.clone(),
                    rec.quote_type.clone(),
                    rec.investment_type.clone().unwrap_or_default(),
                    rec.size_type.clone().unwrap_or_default(),
                    perf.map(|p| decimal(p.stdev)).unwrap_or_default(),
                    perf.map(|p| percent(p.ret)).unwrap_or_default(),
                    perf.map(|p| decimal(p.alpha)).unwrap_or_default(),
                    perf.map(|p| decimal(p.beta)).unwrap_or_default(),
                ];
                for text in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });

    picked
}
