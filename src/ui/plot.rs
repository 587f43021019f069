use std::collections::BTreeMap;

use eframe::egui::{self, Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::state::{count_by_group, AppState, GroupBy};

// ---------------------------------------------------------------------------
// Site map (central panel, Map tab)
// ---------------------------------------------------------------------------

/// Scatter of longitude/latitude, one series per operator.
pub fn site_map(ui: &mut Ui, state: &AppState) {
    let Some(points) = state.map_points() else {
        return;
    };
    if points.set().is_empty() {
        ui.label("No sites with valid coordinates in this file.");
        return;
    }

    if points.len() < state.visible_indices.len() {
        ui.label(format!(
            "Showing {} of {} sites on the map",
            points.len(),
            state.visible_indices.len()
        ));
    }

    // Group by operator so the legend has one entry each.
    let mut by_operator: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for record in points.iter() {
        by_operator
            .entry(record.operator.as_str())
            .or_default()
            .push([record.longitude, record.latitude]);
    }

    Plot::new("site_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (operator, coords) in by_operator {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(operator))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let series = Points::new(PlotPoints::from(coords))
                    .name(operator)
                    .color(color)
                    .radius(3.0);
                plot_ui.points(series);
            }
        });
}

// ---------------------------------------------------------------------------
// Charts (central panel, Charts tab)
// ---------------------------------------------------------------------------

/// Bar charts: sites per operator, and sites per a selectable column
/// (Generation by default, or any extra column of the file).
pub fn charts(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.visible() else {
        return;
    };
    if view.is_empty() {
        ui.label("No sites match the current filters.");
        return;
    }
    let set = view.set();

    let per_operator = view.count_by(|r| r.operator.as_str());
    let half_height = (ui.available_height() / 2.0 - 30.0).max(120.0);

    ui.strong("Sites per operator");
    count_chart(ui, "operator_chart", &per_operator, half_height, |name| {
        state
            .color_map
            .as_ref()
            .map(|cm| cm.color_for(name))
            .unwrap_or(Color32::LIGHT_BLUE)
    });

    let mut group_by = state.group_by;
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Sites per");
        egui::ComboBox::from_id_salt("group_by")
            .selected_text(group_by.label(set))
            .show_ui(ui, |ui: &mut Ui| {
                for choice in GroupBy::choices(set) {
                    ui.selectable_value(&mut group_by, choice, choice.label(set));
                }
            });
    });
    let grouped = count_by_group(&view, group_by);
    count_chart(ui, "group_chart", &grouped, half_height, |_| Color32::LIGHT_BLUE);

    state.group_by = group_by;
}

fn count_chart<F>(ui: &mut Ui, id: &str, counts: &BTreeMap<String, usize>, height: f32, color_of: F)
where
    F: Fn(&str) -> Color32,
{
    let labels: Vec<String> = counts.keys().cloned().collect();

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, (name, count)) in counts.iter().enumerate() {
                let bar = Bar::new(i as f64, *count as f64).width(0.6).name(name);
                let chart = BarChart::new(vec![bar]).name(name).color(color_of(name));
                plot_ui.bar_chart(chart);
            }
        });
}
