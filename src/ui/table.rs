use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 6] = ["MNC", "Cell_ID", "Latitude", "Longitude", "Gen", "Operator"];

/// First `preview_rows` filtered records as a table: the canonical columns,
/// then any extra columns of the source file.
pub fn preview(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.visible() else {
        return;
    };

    let shown = view.len().min(state.config.preview_rows);
    if shown < view.len() {
        ui.label(format!("Previewing {shown} of {} rows. Export for the full set.", view.len()));
    }

    let extra_columns = &view.set().extra_columns;
    let titles: Vec<&str> = HEADERS
        .into_iter()
        .chain(extra_columns.iter().map(String::as_str))
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(70.0), titles.len() - 1)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in &titles {
                header.col(|ui| {
                    ui.label(RichText::new(*title).strong());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, shown, |mut row| {
                let Some(record) = view.get(row.index()) else {
                    return;
                };
                let mut cells = vec![
                    record.mnc.map(|m| m.to_string()).unwrap_or_default(),
                    record.cell_id.clone().unwrap_or_default(),
                    format!("{:.4}", record.latitude),
                    format!("{:.4}", record.longitude),
                    record.generation.clone().unwrap_or_default(),
                    record.operator.clone(),
                ];
                cells.extend((0..extra_columns.len()).map(|i| record.extra_value(i).to_string()));
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
