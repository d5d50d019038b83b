/// Main application GUI for Pico Timer
use crate::config::Config;
use crate::controller::Controller;
use crate::timer::{parse_duration, DisplayState, PRESETS};
use crate::types::ConnectionStatus;
use eframe::egui;
use egui::*;
use std::time::{Duration, Instant};

/// Dark theme color palette
struct Colors;

impl Colors {
    const BACKGROUND: Color32 = Color32::from_rgb(15, 20, 30);
    const SURFACE: Color32 = Color32::from_rgb(25, 32, 45);
    const SURFACE_ELEVATED: Color32 = Color32::from_rgb(35, 42, 55);
    const BORDER: Color32 = Color32::from_rgb(55, 62, 75);
    const TEXT_PRIMARY: Color32 = Color32::from_rgb(248, 250, 252);
    const TEXT_MUTED: Color32 = Color32::from_rgb(115, 125, 140);
    const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    const SUCCESS_LIGHT: Color32 = Color32::from_rgb(74, 222, 128);
    const SUCCESS_SURFACE: Color32 = Color32::from_rgb(20, 83, 45);
    const WARNING_LIGHT: Color32 = Color32::from_rgb(253, 224, 71);
    const WARNING_SURFACE: Color32 = Color32::from_rgb(113, 63, 18);
    const ERROR: Color32 = Color32::from_rgb(220, 38, 38);
    const ERROR_LIGHT: Color32 = Color32::from_rgb(248, 113, 113);
    const ERROR_SURFACE: Color32 = Color32::from_rgb(127, 29, 29);
}

/// Button styles
struct ButtonStyle;

impl ButtonStyle {
    fn primary() -> (Color32, Color32) {
        (Colors::ACCENT, Colors::TEXT_PRIMARY)
    }

    fn error() -> (Color32, Color32) {
        (Colors::ERROR, Colors::TEXT_PRIMARY)
    }

    fn secondary() -> (Color32, Color32) {
        (Colors::SURFACE_ELEVATED, Colors::TEXT_PRIMARY)
    }
}

fn format_secs(secs: f64) -> String {
    format!("{:.1}", secs)
}

/// Main application state
pub struct TimerApp {
    controller: Controller,
    address: String,
    port: u16,
    duration_input: String,
}

impl TimerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.visuals = Visuals::dark();
        style.visuals.window_fill = Colors::BACKGROUND;
        style.visuals.panel_fill = Colors::BACKGROUND;
        style.visuals.extreme_bg_color = Colors::SURFACE;
        style.visuals.window_rounding = Rounding::same(16.0);
        style.spacing.button_padding = Vec2::new(16.0, 8.0);
        style.spacing.item_spacing = Vec2::new(8.0, 8.0);
        cc.egui_ctx.set_style(style);

        let duration = config.duration_secs();

        Self {
            controller: Controller::new(duration),
            address: config.address.clone(),
            port: config.port,
            duration_input: format_secs(duration),
        }
    }

    fn set_duration(&mut self, secs: f64) {
        self.controller.set_initial_duration(secs);
        self.duration_input = format_secs(self.controller.timer().initial_secs());
    }

    /// Title bar with connection status badge
    fn draw_header(&mut self, ui: &mut Ui) {
        ui.add_space(20.0);

        ui.horizontal(|ui| {
            ui.add_space(24.0);
            ui.colored_label(Colors::TEXT_PRIMARY,
                             RichText::new("Timer").size(24.0).strong());

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.add_space(24.0);

                let status = self.controller.status();
                let (status_color, status_bg) = match status {
                    ConnectionStatus::Connected => (Colors::SUCCESS_LIGHT, Colors::SUCCESS_SURFACE),
                    ConnectionStatus::Connecting => (Colors::WARNING_LIGHT, Colors::WARNING_SURFACE),
                    ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                        (Colors::ERROR_LIGHT, Colors::ERROR_SURFACE)
                    }
                };

                Frame::none()
                    .fill(status_bg)
                    .rounding(24.0)
                    .inner_margin(Margin::symmetric(16.0, 8.0))
                    .stroke(Stroke::new(1.5, status_color))
                    .show(ui, |ui| {
                        ui.colored_label(status_color,
                                         RichText::new(status.label()).size(13.0).strong());
                    });
            });
        });

        ui.add_space(16.0);
    }

    /// Address field and connect/disconnect button
    fn draw_connection_card(&mut self, ui: &mut Ui) {
        Frame::none()
            .fill(Colors::SURFACE)
            .rounding(16.0)
            .inner_margin(20.0)
            .outer_margin(Margin::symmetric(24.0, 0.0))
            .stroke(Stroke::new(1.5, Colors::BORDER))
            .show(ui, |ui| {
                ui.colored_label(Colors::TEXT_MUTED,
                                 RichText::new(format!("Device address (port {})", self.port)).size(12.0));
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    let has_connection = self.controller.has_connection();

                    ui.add_enabled(
                        !has_connection,
                        TextEdit::singleline(&mut self.address)
                            .hint_text("Device IP address")
                            .desired_width(200.0),
                    );

                    let (label, (bg, text)) = if has_connection {
                        ("Disconnect", ButtonStyle::error())
                    } else {
                        ("Connect", ButtonStyle::primary())
                    };

                    if ui.add_sized([110.0, 32.0],
                                    Button::new(RichText::new(label).color(text).size(13.0).strong())
                                        .fill(bg)
                                        .rounding(10.0)
                    ).on_hover_cursor(CursorIcon::PointingHand).clicked() {
                        if has_connection {
                            self.controller.disconnect();
                        } else {
                            self.controller.connect(&self.address, self.port);
                        }
                    }
                });
            });

        ui.add_space(16.0);
    }

    /// Duration input and presets; hidden while the countdown runs
    fn draw_duration_input(&mut self, ui: &mut Ui) {
        ui.colored_label(Colors::TEXT_MUTED,
                         RichText::new("Timer duration (seconds)").size(12.0));
        ui.add_space(4.0);

        let response = ui.add(
            TextEdit::singleline(&mut self.duration_input)
                .font(TextStyle::Heading)
                .horizontal_align(Align::Center)
                .desired_width(200.0),
        );
        if response.changed() {
            self.controller.set_initial_duration(parse_duration(&self.duration_input));
        }
        if response.lost_focus() {
            self.duration_input = format_secs(self.controller.timer().initial_secs());
        }

        ui.add_space(6.0);

        let mut chosen = None;
        ui.horizontal(|ui| {
            let width = 4.0 * 72.0 + 3.0 * ui.spacing().item_spacing.x;
            ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));

            for (label, secs) in PRESETS {
                let (bg, text) = ButtonStyle::secondary();
                if ui.add_sized([72.0, 28.0],
                                Button::new(RichText::new(label).color(text).size(12.0))
                                    .fill(bg)
                                    .rounding(8.0)
                ).on_hover_cursor(CursorIcon::PointingHand).clicked() {
                    chosen = Some(secs);
                }
            }
        });
        if let Some(secs) = chosen {
            self.set_duration(secs);
        }
    }

    /// Countdown display and start/stop toggle
    fn draw_timer_card(&mut self, ui: &mut Ui) {
        Frame::none()
            .fill(Colors::SURFACE)
            .rounding(16.0)
            .inner_margin(20.0)
            .outer_margin(Margin::symmetric(24.0, 0.0))
            .stroke(Stroke::new(1.5, Colors::BORDER))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    let timer = self.controller.timer();
                    let running = timer.is_running();

                    if !running {
                        self.draw_duration_input(ui);
                    }

                    let timer = self.controller.timer();
                    let color = match timer.display_state() {
                        DisplayState::Running => Colors::ACCENT,
                        DisplayState::Idle => Colors::TEXT_PRIMARY,
                        DisplayState::Expired => Colors::ERROR,
                    };

                    ui.add_space(24.0);
                    ui.colored_label(color,
                                     RichText::new(format_secs(timer.remaining_secs())).size(72.0).strong());
                    ui.add_space(24.0);

                    let (label, (bg, text)) = if running {
                        ("Stop", ButtonStyle::error())
                    } else {
                        ("Start", ButtonStyle::primary())
                    };

                    let button = ui.add_enabled(
                        self.controller.is_connected(),
                        Button::new(RichText::new(label).color(text).size(16.0).strong())
                            .fill(bg)
                            .rounding(10.0)
                            .min_size(Vec2::new(ui.available_width(), 44.0)),
                    );
                    if button.clicked() {
                        self.controller.toggle(Instant::now());
                    }
                });
            });
    }
}

impl eframe::App for TimerApp {
    /// Main GUI update loop
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.controller.process_network_events();
        self.controller.poll_timer(Instant::now());

        CentralPanel::default()
            .frame(Frame::central_panel(&ctx.style())
                .fill(Colors::BACKGROUND)
                .inner_margin(0.0))
            .show(ctx, |ui| {
                self.draw_header(ui);
                self.draw_connection_card(ui);
                self.draw_timer_card(ui);
            });

        // Ticks are 100ms apart; repaint often enough to show each one
        ctx.request_repaint_after(Duration::from_millis(50));
    }
}

impl Drop for TimerApp {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
