use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::chart::ScatterSpec;
use crate::data::model::{CategoryColumn, Horizon, InvestmentType, QuoteType, SizeType};
use crate::state::AppState;

/// Label of the "no filter" / "no selection" entry.
const NONE_LABEL: &str = "None";

// ---------------------------------------------------------------------------
// Left side panel – selectors
// ---------------------------------------------------------------------------

/// Combo box over `options` plus a leading "None" entry. Returns the new
/// value when the user picked something different.
fn optional_combo<T: Copy + PartialEq>(
    ui: &mut Ui,
    label: &str,
    current: Option<T>,
    options: &[T],
    label_of: fn(T) -> &'static str,
) -> Option<Option<T>> {
    let mut picked = None;
    ui.strong(label);
    egui::ComboBox::from_id_salt(label)
        .width(ui.available_width())
        .selected_text(current.map(label_of).unwrap_or(NONE_LABEL))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), NONE_LABEL).clicked() {
                picked = Some(None);
            }
            for &opt in options {
                if ui
                    .selectable_label(current == Some(opt), label_of(opt))
                    .clicked()
                {
                    picked = Some(Some(opt));
                }
            }
        });
    ui.add_space(6.0);
    picked.filter(|p| *p != current)
}

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("US Funds Dashboard");
    ui.separator();

    // ---- Horizon ----
    ui.strong("Horizon");
    let mut horizon = state.selection.horizon;
    egui::ComboBox::from_id_salt("horizon")
        .width(ui.available_width())
        .selected_text(horizon.label())
        .show_ui(ui, |ui: &mut Ui| {
            for h in Horizon::ALL {
                ui.selectable_value(&mut horizon, h, h.label());
            }
        });
    if horizon != state.selection.horizon {
        state.set_horizon(horizon);
    }
    ui.add_space(6.0);

    // ---- Categorical filters ----
    let mut criteria = state.selection.criteria;
    if let Some(q) = optional_combo(ui, "Quote type", criteria.quote, &QuoteType::ALL, QuoteType::label) {
        criteria.quote = q;
    }
    if let Some(i) = optional_combo(
        ui,
        "Investment type",
        criteria.investment,
        &InvestmentType::ALL,
        InvestmentType::label,
    ) {
        criteria.investment = i;
    }
    if let Some(s) = optional_combo(ui, "Size type", criteria.size, &SizeType::ALL, SizeType::label) {
        criteria.size = s;
    }
    state.set_criteria(criteria);

    // ---- Symbol ----
    let symbols: Vec<String> = state.symbols().into_iter().map(String::from).collect();
    let current = state.selection.symbol.clone();
    let mut picked: Option<Option<String>> = None;
    ui.strong(format!("Symbol  ({})", symbols.len()));
    egui::ComboBox::from_id_salt("symbol")
        .width(ui.available_width())
        .height(400.0)
        .selected_text(current.as_deref().unwrap_or(NONE_LABEL))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), NONE_LABEL).clicked() {
                picked = Some(None);
            }
            for sym in &symbols {
                if ui
                    .selectable_label(current.as_deref() == Some(sym.as_str()), sym.as_str())
                    .clicked()
                {
                    picked = Some(Some(sym.clone()));
                }
            }
        });
    if let Some(sym) = picked {
        state.set_symbol(sym);
    }

    ui.separator();

    // ---- Colour-by selector (aggregate view only) ----
    if let Some(col) = optional_combo(
        ui,
        "Color by",
        state.color_by,
        &CategoryColumn::ALL,
        CategoryColumn::label,
    ) {
        state.set_color_by(col);
    }
    if let Some(cm) = &state.color_map {
        for (value, color) in cm.legend_entries() {
            ui.label(RichText::new(format!("● {value}")).color(color));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export charts…"))
                .clicked()
            {
                export_charts_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.subset().map_or(0, |s| s.len());
            let shown = if state.selection.criteria.is_unfiltered() {
                "all visible".to_string()
            } else {
                format!("{visible} visible")
            };
            ui.label(format!(
                "{} funds loaded from {}, {shown}",
                ds.len(),
                state.source().display(),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open fund data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
    }
}

pub fn export_charts_dialog(state: &mut AppState) {
    let Some(charts) = state.charts() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export chart specs")
        .add_filter("JSON", &["json"])
        .set_file_name("charts.json")
        .save_file();

    let Some(path) = file else {
        return;
    };
    match write_charts(&path, &charts) {
        Ok(()) => {
            log::info!("Exported charts to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export charts: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}

fn write_charts(path: &Path, charts: &[ScatterSpec; 2]) -> Result<()> {
    let text = serde_json::to_string_pretty(charts).context("serializing chart specs")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
