//! Left panel UI: filters, boundary capture results, legend.

use super::colors;
use crate::state::{format_area, AppState};
use eframe::egui::{self, RichText};
use habitat_map::editor::EditorState;
use habitat_map::geo::geodesic_area;
use habitat_map::habitat::{MapEntity, ProtectionStatus, StatusColor};
use habitat_map::overview::{
    FilterOptions, HabitatFilters, OverviewRenderer, SortOrder, Verification,
};

pub fn render_left_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    overview: &OverviewRenderer,
    editor_state: EditorState,
) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(260.0)
        .min_width(200.0)
        .max_width(400.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Filters");
                ui.separator();
                render_filters(ui, state, overview.filter_options());

                if let Some(entity) = overview.selected_entity() {
                    ui.add_space(10.0);
                    ui.heading("Selected habitat");
                    ui.separator();
                    render_selection(ui, entity);
                }

                ui.add_space(10.0);
                ui.heading("Boundary");
                ui.separator();
                render_capture(ui, state, editor_state);

                ui.add_space(10.0);
                ui.heading("Legend");
                ui.separator();
                render_legend(ui);

                ui.add_space(10.0);
                render_summary(ui, overview);
            });
        });
}

fn render_filters(ui: &mut egui::Ui, state: &mut AppState, options: &FilterOptions) {
    let filters = &mut state.filters;

    ui.add(egui::TextEdit::singleline(&mut filters.search).hint_text("Search name or location"));
    ui.add_space(4.0);

    option_list(ui, "Municipality", &options.municipalities, &mut filters.municipality);
    option_list(ui, "Habitat type", &options.habitat_types, &mut filters.classification);
    option_list(ui, "Habitat family", &options.habitat_families, &mut filters.family);
    option_list(ui, "Recorded by", &options.recorders, &mut filters.recorded_by);
    option_list(ui, "Organization", &options.organizations, &mut filters.organization);

    egui::CollapsingHeader::new("Protection status")
        .default_open(true)
        .show(ui, |ui| {
            for status in ProtectionStatus::all() {
                let mut checked = filters.protection_status.contains(status);
                if ui.checkbox(&mut checked, status.label()).changed() {
                    if checked {
                        filters.protection_status.push(*status);
                    } else {
                        filters.protection_status.retain(|s| s != status);
                    }
                }
            }
        });

    ui.horizontal(|ui| {
        ui.label(RichText::new("Verified:").color(colors::ui::LABEL));
        ui.selectable_value(&mut filters.verification, None, "All");
        ui.selectable_value(&mut filters.verification, Some(Verification::Verified), "Yes");
        ui.selectable_value(&mut filters.verification, Some(Verification::Unverified), "No");
    });

    egui::ComboBox::from_label("Sort")
        .selected_text(filters.sort.label())
        .show_ui(ui, |ui| {
            for order in SortOrder::all() {
                ui.selectable_value(&mut filters.sort, *order, order.label());
            }
        });

    ui.checkbox(&mut state.limit_to_view, "Limit to visible area");

    ui.horizontal(|ui| {
        let active = state.filters.active_count();
        ui.label(
            RichText::new(format!("{} active", active))
                .size(11.0)
                .color(colors::ui::VALUE),
        );
        let reset = ui.add_enabled(!state.filters.is_empty(), egui::Button::new("Reset"));
        if reset.clicked() {
            state.filters = HabitatFilters {
                bbox: state.filters.bbox,
                ..HabitatFilters::default()
            };
        }
    });

    ui.checkbox(&mut state.viewer.authenticated, "Signed in");
}

/// Checkbox list for one multi-value filter. Selected values stay listed
/// even when the latest load no longer offers them.
fn option_list(ui: &mut egui::Ui, title: &str, offered: &[String], selected: &mut Vec<String>) {
    if offered.is_empty() && selected.is_empty() {
        return;
    }

    let mut values: Vec<String> = offered.to_vec();
    for value in selected.iter() {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }

    let header = if selected.is_empty() {
        title.to_string()
    } else {
        format!("{} ({})", title, selected.len())
    };

    egui::CollapsingHeader::new(header)
        .id_salt(title)
        .show(ui, |ui| {
            for value in &values {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    HabitatFilters::toggle(selected, value);
                }
            }
        });
}

fn render_capture(ui: &mut egui::Ui, state: &AppState, editor_state: EditorState) {
    let capture = state.capture.borrow();

    egui::Grid::new("capture_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("State").color(colors::ui::LABEL));
            let color = match editor_state {
                EditorState::Idle => colors::ui::VALUE,
                _ => colors::ui::ACTIVE,
            };
            ui.label(RichText::new(editor_state.label()).color(color));
            ui.end_row();

            ui.label(RichText::new("Vertices").color(colors::ui::LABEL));
            ui.label(RichText::new(capture.points.len().to_string()).color(colors::ui::VALUE));
            ui.end_row();

            ui.label(RichText::new("Area").color(colors::ui::LABEL));
            ui.label(RichText::new(format_area(capture.area_m2)).color(colors::ui::VALUE));
            ui.end_row();
        });

    if let Some(saved) = &capture.saved {
        ui.add_space(4.0);
        ui.group(|ui| {
            ui.label(
                RichText::new(format!(
                    "{} Saved boundary",
                    egui_phosphor::regular::CHECK_CIRCLE
                ))
                .color(colors::ui::SUCCESS),
            );
            ui.label(
                RichText::new(format!(
                    "{} vertices, {}",
                    saved.vertices().len(),
                    format_area(geodesic_area(saved.vertices()))
                ))
                .size(11.0)
                .color(colors::ui::VALUE),
            );
        });
    }

    if let Some(error) = &capture.error {
        ui.add_space(4.0);
        ui.label(RichText::new(error).size(11.0).color(colors::ui::ERROR));
    }
}

fn render_selection(ui: &mut egui::Ui, entity: &MapEntity) {
    ui.label(RichText::new(&entity.name).strong().color(entity.color.color()));
    for line in entity.metadata.tooltip_lines() {
        ui.label(RichText::new(line).size(11.0).color(colors::ui::VALUE));
    }
    let boundary = match &entity.polygon {
        Some(polygon) => format!("Boundary, {}", format_area(geodesic_area(polygon.vertices()))),
        None => "Point only".to_string(),
    };
    ui.label(RichText::new(boundary).size(11.0).color(colors::ui::LABEL));
}

fn render_legend(ui: &mut egui::Ui) {
    for status in StatusColor::all() {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, status.color());
            ui.label(status.label());
        });
    }
    ui.label(
        RichText::new("Faded entries are not verified")
            .size(11.0)
            .color(colors::ui::LABEL),
    );
}

fn render_summary(ui: &mut egui::Ui, overview: &OverviewRenderer) {
    let summary = overview.summary();
    let mut text = format!("{} of {} shown", summary.shown, summary.total_matching);
    if summary.dropped > 0 {
        text.push_str(&format!(", {} without location", summary.dropped));
    }
    if summary.skipped > 0 {
        text.push_str(&format!(", {} unreadable", summary.skipped));
    }
    ui.label(RichText::new(text).size(11.0).color(colors::ui::LABEL));
}
