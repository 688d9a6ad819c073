use eframe::egui::{RichText, Ui};

use crate::data::lookup::FundMetrics;

/// Whole percentage of a fraction, e.g. `0.256` → `26%`.
pub fn percent(fraction: f64) -> String {
    if fraction.is_finite() {
        format!("{:.0}%", fraction * 100.0)
    } else {
        "–".to_string()
    }
}

/// Two decimals, or a dash for missing values.
pub fn decimal(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "–".to_string()
    }
}

fn tile(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).heading());
    });
}

/// Metric tiles for the selected fund.
pub fn metrics_panel(ui: &mut Ui, m: &FundMetrics) {
    ui.horizontal(|ui: &mut Ui| {
        tile(ui, "Symbol", &m.symbol);
        ui.add_space(24.0);
        tile(ui, "Name", &m.name);
    });
    ui.add_space(6.0);

    let (risk, ret, alpha, beta) = match m.performance {
        Some(p) => (decimal(p.stdev), percent(p.ret), decimal(p.alpha), decimal(p.beta)),
        None => Default::default(),
    };
    let tiles = [
        ("Investment Type", m.investment_type.clone().unwrap_or_default()),
        ("Size Type", m.size_type.clone().unwrap_or_default()),
        ("Bond Allocation", percent(m.asset_bonds)),
        ("Stock Allocation", percent(m.asset_stocks)),
        ("Risk", risk),
        ("Return", ret),
        ("Alpha", alpha),
        ("Beta", beta),
    ];
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(&tiles) {
            let value = if value.is_empty() { "–" } else { value.as_str() };
            tile(col, label, value);
        }
    });
}
