use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Dimension, LoadFailure, StatusMessage, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filter_group(ui, state, Dimension::Operator, "Operator", &dataset.operators);
            filter_group(ui, state, Dimension::Generation, "Generation", &dataset.generations);

            ui.separator();
            ui.strong("Legend");
            if let Some(cm) = &state.color_map {
                for (operator, color) in cm.legend_entries() {
                    ui.label(RichText::new(format!("● {operator}")).color(color));
                }
            }
        });
}

/// One collapsible checkbox list with All/None buttons.
fn filter_group(
    ui: &mut Ui,
    state: &mut AppState,
    dimension: Dimension,
    title: &str,
    all_values: &std::collections::BTreeSet<String>,
) {
    let selected = match dimension {
        Dimension::Operator => &state.filters.operators,
        Dimension::Generation => &state.filters.generations,
    };
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dimension);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dimension);
                }
            });

            for value in all_values {
                let is_selected = match dimension {
                    Dimension::Operator => state.filters.operators.contains(value),
                    Dimension::Generation => state.filters.generations.contains(value),
                };

                let mut text = RichText::new(value);
                if dimension == Dimension::Operator {
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(value));
                    }
                }

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(dimension, value);
                }
            }
        });
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
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} sites loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if let Some(encoding) = ds.encoding {
                ui.separator();
                ui.label(format!("Data loaded via {encoding}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = match msg {
                StatusMessage::Info(_) => Color32::LIGHT_GREEN,
                StatusMessage::Error(_) => Color32::RED,
            };
            ui.label(RichText::new(msg.text()).color(color));
        }
    });

    if state.using_sample_data {
        ui.label(
            RichText::new(format!(
                "⚠ Running on SAMPLE DATA because {} could not be loaded.",
                state.data_path.display()
            ))
            .color(Color32::YELLOW),
        );
    }
}

// ---------------------------------------------------------------------------
// Central panel pieces
// ---------------------------------------------------------------------------

/// Headline numbers above the tabs.
pub fn metrics(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.visible() else {
        return;
    };
    let set = view.set();
    let operators = view.count_by(|r| r.operator.as_str()).len();
    let generations = view.count_by(|r| r.generation_label()).len();

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total Sites", view.len());
        metric(ui, "Operators", operators);
        metric(ui, "Generations", generations);
        metric(ui, "Rows Dropped", set.dropped_rows);
    });
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(label);
            ui.heading(value.to_string());
        });
    });
}

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for (tab, label) in [(Tab::Map, "Map"), (Tab::Charts, "Charts"), (Tab::Table, "Table")] {
            if ui.selectable_label(state.tab == tab, label).clicked() {
                state.tab = tab;
            }
        }
    });
}

/// Full-panel message shown instead of the dashboard when loading failed.
pub fn load_error(ui: &mut Ui, failure: &LoadFailure) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new(format!("Error: {}", failure.message)).color(Color32::RED));
        ui.add_space(8.0);
        ui.label(failure.tip);
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open mast data")
        .add_filter("Delimited text", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.load_from(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered sites")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered_masts.csv")
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
