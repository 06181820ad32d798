use std::cell::RefCell;
use std::rc::Rc;

use egui::Context;

use crate::controller::session::{GameState, AMMO_RESERVE};

/// Build the complete overlay UI and return egui output.
///
/// The start button's callback is the only place the UI writes shared
/// state; everything else is a read-only view.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    game_state: &Rc<RefCell<GameState>>,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        if game_state.borrow().started() {
            draw_crosshair(ctx);
            draw_status_readout(ctx, &game_state.borrow());
        } else {
            draw_start_overlay(ctx, game_state);
        }
    })
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    painter.line_segment(
        [
            egui::Pos2::new(center.x - size, center.y),
            egui::Pos2::new(center.x + size, center.y),
        ],
        egui::Stroke::new(1.5, egui::Color32::WHITE),
    );
    painter.line_segment(
        [
            egui::Pos2::new(center.x, center.y - size),
            egui::Pos2::new(center.x, center.y + size),
        ],
        egui::Stroke::new(1.5, egui::Color32::WHITE),
    );
}

/// Bottom-left health/ammo/score readout
fn draw_status_readout(ctx: &Context, state: &GameState) {
    egui::Area::new(egui::Id::new("status_readout"))
        .anchor(egui::Align2::LEFT_BOTTOM, [20.0, -20.0])
        .show(ctx, |ui| {
            let line = |text: String| {
                egui::RichText::new(text)
                    .monospace()
                    .size(18.0)
                    .color(egui::Color32::WHITE)
            };
            ui.label(line(format!("Health: {}", state.health)));
            ui.label(line(format!("Ammo: {}/{}", state.ammo, AMMO_RESERVE)));
            ui.label(line(format!("Score: {}", state.score)));
        });
}

/// Full-screen start overlay with the controls listing. Dismissed for good
/// by the start button.
fn draw_start_overlay(ctx: &Context, game_state: &Rc<RefCell<GameState>>) {
    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Middle, egui::Id::new("start_dim")));
    painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(204));

    egui::Area::new(egui::Id::new("start_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("SKIRMISH")
                        .size(48.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.add_space(30.0);
                ui.label(egui::RichText::new("Controls:").size(24.0).color(egui::Color32::WHITE));
                ui.add_space(10.0);
                for line in [
                    "WASD - Move",
                    "Mouse - Look around",
                    "Left Click - Shoot",
                    "Shift - Sprint",
                ] {
                    ui.label(egui::RichText::new(line).size(16.0).color(egui::Color32::WHITE));
                }
                ui.add_space(30.0);

                let button = egui::Button::new(
                    egui::RichText::new("START GAME")
                        .size(24.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                )
                .fill(egui::Color32::from_rgb(0x4c, 0xaf, 0x50));
                if ui.add(button).clicked() {
                    game_state.borrow_mut().start();
                }
            });
        });
}
