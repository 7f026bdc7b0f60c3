//! eframe window hosting one annotation session

use anyhow::Result;
use eframe::egui;
use pdf_engine::{PdfPageRenderer, RgbaImage};
use simplepres_core::{
    Action, Canvas, Color, PagePoint, PageTransform, Response, Session, SessionError, Stroke,
    ViewportPoint, ViewportSize, HELP_TEXT,
};
use std::path::Path;
use storage::Settings;
use tracing::{info, warn};

use crate::keymap;

pub type PresSession = Session<PdfPageRenderer, Canvas<RgbaImage>>;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 120, 215);

pub fn run(session: PresSession, path: &Path, settings: &Settings) -> Result<()> {
    let title = window_title(path);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_title(title.clone()),
        ..Default::default()
    };

    let app = SimplePresApp::new(session);
    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn window_title(path: &Path) -> String {
    match path.file_name() {
        Some(name) => format!("simplepres - {}", name.to_string_lossy()),
        None => "simplepres".to_owned(),
    }
}

/// Uploaded background and the canvas generation it was made from
struct PageTexture {
    handle: egui::TextureHandle,
    generation: u64,
}

struct ErrorDialogState {
    title: String,
    message: String,
}

struct ColorPickerState {
    color: egui::Color32,
}

pub struct SimplePresApp {
    session: PresSession,
    page_texture: Option<PageTexture>,

    // Primary button went down on the canvas and is still held
    primary_down: bool,

    show_help: bool,
    color_picker: Option<ColorPickerState>,
    error_dialog: Option<ErrorDialogState>,
}

impl SimplePresApp {
    pub fn new(session: PresSession) -> Self {
        Self {
            session,
            page_texture: None,
            primary_down: false,
            show_help: false,
            color_picker: None,
            error_dialog: None,
        }
    }

    fn dialog_open(&self) -> bool {
        self.show_help || self.color_picker.is_some() || self.error_dialog.is_some()
    }

    fn close_dialogs(&mut self) {
        self.show_help = false;
        self.color_picker = None;
        self.error_dialog = None;
    }

    fn show_error(&mut self, title: &str, error: SessionError) {
        let message = format!("{:#}", anyhow::Error::new(error));
        warn!(%message, "{title}");
        self.error_dialog = Some(ErrorDialogState { title: title.to_owned(), message });
    }

    fn perform(&mut self, ctx: &egui::Context, action: Action) {
        match self.session.perform(action) {
            Ok(Response::Forward(Action::Quit)) => {
                info!("Quit requested");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Ok(Response::Forward(Action::ShowHelp)) => self.show_help = true,
            Ok(Response::Forward(Action::PickColor)) => {
                if let Some(stroke) = self.session.selection() {
                    self.color_picker = Some(ColorPickerState { color: to_color32(stroke.color()) });
                }
            }
            Ok(_) => {}
            Err(error) => self.show_error("Page could not be shown", error),
        }
    }

    /// Feed this frame's raw input to the session
    fn handle_input(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let events = ctx.input(|i| i.events.clone());
        let origin = canvas_rect.min;

        for event in events {
            let blocked = self.dialog_open();
            match event {
                egui::Event::Key { key: egui::Key::Escape, pressed: true, .. } => self.close_dialogs(),
                egui::Event::Key { key, pressed, repeat, modifiers, .. } => {
                    // Releases always pass so a held delete key cannot stay armed
                    if (blocked && pressed) || modifiers.command {
                        continue;
                    }
                    if let Some(action) = keymap::action_for(key, pressed, repeat) {
                        self.perform(ctx, action);
                    }
                }
                egui::Event::PointerButton { pos, button: egui::PointerButton::Primary, pressed: true, .. } => {
                    if !blocked && canvas_rect.contains(pos) {
                        self.primary_down = true;
                        self.session.pointer_down(to_viewport(origin, pos));
                    }
                }
                egui::Event::PointerButton { button: egui::PointerButton::Primary, pressed: false, .. } => {
                    if self.primary_down {
                        self.primary_down = false;
                        self.session.pointer_up();
                    }
                }
                egui::Event::PointerMoved(pos) if !blocked => {
                    self.session.pointer_move(to_viewport(origin, pos), self.primary_down);
                }
                _ => {}
            }
        }
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let canvas = self.session.surface();
        let generation = canvas.background_generation();
        if self.page_texture.as_ref().is_some_and(|texture| texture.generation == generation) {
            return;
        }
        let Some(page) = canvas.background() else {
            return;
        };

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [page.width_px as usize, page.height_px as usize],
            page.bitmap.as_raw(),
        );
        let handle =
            ctx.load_texture(format!("page_{}", page.page_index), image, egui::TextureOptions::LINEAR);
        self.page_texture = Some(PageTexture { handle, generation });
    }

    fn draw_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::from_gray(48)))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;

                let size = ViewportSize::new(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);
                // A failed resize is retried once its error window is closed
                if self.error_dialog.is_none() {
                    if let Err(error) = self.session.resize(size) {
                        self.show_error("Page could not be resized", error);
                    }
                }

                self.handle_input(ctx, rect);
                self.sync_texture(ctx);
                if self.session.surface_mut().take_damage().is_some() {
                    ctx.request_repaint();
                }

                self.paint(&painter, rect.min);
            });
    }

    fn paint(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let canvas = self.session.surface();
        let transform = canvas.transform();

        if let (Some(texture), Some(page)) = (&self.page_texture, canvas.background()) {
            let min = origin + egui::vec2(transform.origin.x, transform.origin.y);
            let rect = egui::Rect::from_min_size(min, egui::vec2(page.width_px as f32, page.height_px as f32));
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.handle.id(), rect, uv, egui::Color32::WHITE);
        }

        for stroke in self.session.strokes() {
            paint_stroke(painter, stroke, &transform, origin);
        }

        if let Some(stroke) = self.session.selection() {
            let bounds = stroke.render_bounds().inflate(2.0);
            let rect = egui::Rect::from_two_pos(
                to_screen(&transform, origin, PagePoint::new(bounds.min_x, bounds.min_y)),
                to_screen(&transform, origin, PagePoint::new(bounds.max_x, bounds.max_y)),
            );
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, SELECTION_COLOR), egui::StrokeKind::Outside);
        }
    }

    fn draw_help(&mut self, ctx: &egui::Context) {
        if !self.show_help {
            return;
        }

        let mut should_close = false;
        egui::Window::new("Help")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(HELP_TEXT).monospace());
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.show_help = false;
        }
    }

    fn draw_color_picker(&mut self, ctx: &egui::Context) {
        let Some(picker) = &mut self.color_picker else {
            return;
        };

        let mut chosen = None;
        let mut cancelled = false;
        egui::Window::new("Stroke color")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::color_picker::color_picker_color32(
                    ui,
                    &mut picker.color,
                    egui::color_picker::Alpha::OnlyBlend,
                );
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        chosen = Some(picker.color);
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if let Some(color) = chosen {
            self.session.set_color(from_color32(color));
            self.color_picker = None;
        } else if cancelled {
            self.color_picker = None;
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(error) = &self.error_dialog else {
            return;
        };

        let title = error.title.clone();
        let message = error.message.clone();

        let mut should_close = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.error_dialog = None;
        }
    }
}

impl eframe::App for SimplePresApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.draw_canvas(ctx);
        self.draw_help(ctx);
        self.draw_color_picker(ctx);
        self.draw_error_dialog(ctx);
    }
}

fn paint_stroke(painter: &egui::Painter, stroke: &Stroke, transform: &PageTransform, origin: egui::Pos2) {
    let color = to_color32(stroke.color());
    let width = stroke.width() * transform.scale;

    match stroke.points() {
        [single] => {
            painter.circle_filled(to_screen(transform, origin, *single), width / 2.0, color);
        }
        points => {
            let line: Vec<egui::Pos2> =
                points.iter().map(|point| to_screen(transform, origin, *point)).collect();
            painter.add(egui::Shape::line(line, egui::Stroke::new(width, color)));
        }
    }
}

fn to_viewport(origin: egui::Pos2, pos: egui::Pos2) -> ViewportPoint {
    ViewportPoint::new(pos.x - origin.x, pos.y - origin.y)
}

fn to_screen(transform: &PageTransform, origin: egui::Pos2, point: PagePoint) -> egui::Pos2 {
    let viewport = transform.to_viewport(point);
    origin + egui::vec2(viewport.x, viewport.y)
}

fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn from_color32(color: egui::Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::new(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_file_name() {
        assert_eq!(window_title(Path::new("/talks/deck.pdf")), "simplepres - deck.pdf");
        assert_eq!(window_title(Path::new("/")), "simplepres");
    }

    #[test]
    fn opaque_colors_convert_both_ways() {
        for color in [Color::BLACK, Color::RED, Color::BLUE, Color::rgb(12, 200, 99)] {
            assert_eq!(from_color32(to_color32(color)), color);
        }
    }

    #[test]
    fn pointer_positions_are_relative_to_canvas() {
        let point = to_viewport(egui::pos2(110.0, 45.0), egui::pos2(130.0, 50.0));
        assert_eq!(point, ViewportPoint::new(20.0, 5.0));

        let transform = PageTransform { scale: 2.0, origin: ViewportPoint::new(10.0, 0.0) };
        let screen = to_screen(&transform, egui::pos2(100.0, 100.0), PagePoint::new(5.0, 5.0));
        assert_eq!(screen, egui::pos2(120.0, 110.0));
    }
}
