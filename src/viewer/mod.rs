use eframe::egui::{
    self, Align2, Color32, Context, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2,
};

use crate::engine::{EngineConfig, FrameScene, GraphView, PointerEvent, SelectionNotice};
use crate::graph::{ContentGraph, LinkKind, NodeKind};
use crate::util::short_label;

pub struct ViewerApp {
    engine: GraphView,
    search: String,
}

impl ViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph: ContentGraph,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: GraphView::new(graph, config),
            search: String::new(),
        }
    }

    fn controls(&mut self, ui: &mut Ui) {
        ui.heading("memograph");
        ui.add_space(8.0);

        ui.label("Filter kinds (none checked = all)");
        for kind in NodeKind::ALL {
            let mut active = self.engine.active_filters().contains(&kind);
            if ui.checkbox(&mut active, kind.label()).changed() {
                self.engine.toggle_filter(kind);
            }
        }

        ui.add_space(10.0);
        if ui.button("Declutter layout").clicked() {
            self.engine.reorganize();
        }
        if ui.button("Reset view").clicked() {
            self.engine.reset_view();
        }

        ui.add_space(10.0);
        ui.label("Search labels");
        if ui.text_edit_singleline(&mut self.search).changed() {
            let query = self.search.clone();
            self.engine.set_search(&query);
        }

        let dropped = self.engine.graph().dropped_links();
        if dropped > 0 {
            ui.add_space(10.0);
            ui.colored_label(
                Color32::from_rgb(230, 160, 90),
                format!("{dropped} link(s) dropped at load"),
            );
        }

        let selected = self.engine.selected_record().cloned();
        if let Some(record) = selected {
            ui.add_space(12.0);
            ui.separator();
            ui.strong(short_label(&record.label, 40));
            ui.label(format!("kind: {}", record.kind.label()));
            if let Some(date) = &record.metadata.date {
                ui.label(format!("date: {date}"));
            }
            if let Some(snippet) = &record.metadata.snippet {
                ui.label(short_label(snippet, 120));
            }
            if !record.metadata.tags.is_empty() {
                ui.label(format!("tags: {}", record.metadata.tags.join(", ")));
            }
            if ui.button("Close").clicked() {
                self.engine.close_selection();
            }
        }
    }

    fn graph_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect);

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.engine.zoom_by(scroll * 0.0015);
            }
        }

        let (pressed, released) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
            )
        });

        let mut notice: Option<SelectionNotice> = None;
        if let Some(pointer) = response.hover_pos() {
            let local = (pointer - rect.min).to_pos2();
            let event = if pressed {
                PointerEvent::Down(local)
            } else {
                PointerEvent::Move(local)
            };
            notice = self.engine.handle_pointer(event);
        } else {
            self.engine.handle_pointer(PointerEvent::Leave);
        }
        if released {
            notice = notice.or(self.engine.handle_pointer(PointerEvent::Up));
        }

        if let Some(notice) = notice {
            // Navigation hand-off: the surrounding app maps this onto a route.
            log::info!(
                "selected node {} (kind {}, entry {:?}/{:?})",
                notice.node.id,
                notice.node.kind.label(),
                notice.node.metadata.entry_type,
                notice.node.metadata.entry_id,
            );
        }

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        self.engine.advance(frame_delta_seconds);

        let scene = self.engine.scene();
        paint_scene(&painter, rect, &scene);

        if scene.nodes.iter().any(|sprite| sprite.hovered) {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .default_width(240.0)
            .show(ctx, |ui| self.controls(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.graph_canvas(ui));

        // The simulation runs continuously.
        ctx.request_repaint();
    }
}

fn draw_background(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = 56.0;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 60));

    let mut x = rect.left() + step;
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            stroke,
        );
        x += step;
    }

    let mut y = rect.top() + step;
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            stroke,
        );
        y += step;
    }
}

fn link_color(kind: LinkKind) -> Color32 {
    match kind {
        LinkKind::Tag => Color32::from_rgba_unmultiplied(96, 132, 160, 150),
        LinkKind::Topic => Color32::from_rgba_unmultiplied(96, 150, 110, 150),
        LinkKind::Temporal => Color32::from_rgba_unmultiplied(140, 110, 160, 150),
        LinkKind::Semantic => Color32::from_rgba_unmultiplied(110, 110, 110, 150),
    }
}

fn paint_scene(painter: &egui::Painter, rect: Rect, scene: &FrameScene) {
    let origin = rect.min.to_vec2();

    for link in &scene.links {
        painter.line_segment(
            [link.start + origin, link.end + origin],
            Stroke::new(link.width, link_color(link.kind)),
        );
    }

    for sprite in &scene.nodes {
        let position = sprite.screen_pos + origin;

        painter.circle_filled(position, sprite.radius, sprite.color);

        if sprite.selected {
            painter.circle_stroke(
                position,
                sprite.radius + 4.0,
                Stroke::new(2.0, Color32::from_rgb(245, 206, 93)),
            );
        } else if sprite.matched {
            painter.circle_stroke(
                position,
                sprite.radius + 3.0,
                Stroke::new(1.5, Color32::from_rgb(103, 196, 255)),
            );
        }

        let outline_width = if sprite.hovered { 1.8 } else { 1.0 };
        painter.circle_stroke(
            position,
            sprite.radius,
            Stroke::new(outline_width, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
        );

        let labeled =
            sprite.hovered || sprite.selected || sprite.matched || sprite.radius > 14.0;
        if labeled {
            painter.text(
                position + vec2(sprite.radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                short_label(&sprite.label, 28),
                FontId::proportional(12.0),
                Color32::from_gray(238),
            );
        }
    }
}
