//! Top bar UI: app title, status, and load errors.

use super::colors;
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};
use habitat_map::overview::OverviewRenderer;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, overview: &mut OverviewRenderer) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("Habitat Map")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.label(
                    RichText::new(&state.source_label)
                        .size(12.0)
                        .color(colors::ui::LABEL),
                );

                ui.separator();

                if overview.is_loading() {
                    ui.spinner();
                }

                // Status text
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });

    // Load errors never block the map
    let Some(banner) = overview.banner().map(str::to_string) else {
        return;
    };
    egui::TopBottomPanel::top("error_banner")
        .frame(egui::Frame::new().fill(colors::ui::ERROR_BG).inner_margin(6.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(banner).color(colors::ui::ERROR));
                if ui.small_button(egui_phosphor::regular::X).clicked() {
                    overview.dismiss_banner();
                }
            });
        });
}
