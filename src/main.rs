//! StateCanvas GUI - Diagram Editor
//! Interactive canvas for drawing node/link diagrams and checking them as FSMs

use eframe::egui;
use std::path::Path;
use std::time::Duration;

use statecanvas::fsm::{errors_to_html, to_html_table, FsmModel};
use statecanvas::model::Selection;
use statecanvas::persistence::{restore_backup, save_backup, KeyValueStore, StoreError, StoreResult};
use statecanvas::render::{draw_document, PainterTarget};
use statecanvas::{export_latex, export_svg, load_document, to_json_string, Config, Document, FsmOptions, Preset};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_title("StateCanvas - Diagram Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "StateCanvas",
        options,
        Box::new(|cc| Ok(Box::new(StateCanvasApp::new(cc)))),
    )
}

/// Read-only view of eframe storage, used while the app is being created
struct StorageReader<'a>(&'a dyn eframe::Storage);

impl KeyValueStore for StorageReader<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.0.get_string(key))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable)
    }
}

/// Writable eframe storage handed to `App::save`
struct StorageWriter<'a>(&'a mut dyn eframe::Storage);

impl KeyValueStore for StorageWriter<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.0.get_string(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.0.set_string(key, value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Pointer {
    Idle,
    Moving,
    Linking,
}

struct StateCanvasApp {
    document: Document,
    preset: Preset,
    surface: PainterTarget,
    pointer: Pointer,
    /// Last status line (load report, export result, IO errors)
    status: Option<String>,
    show_fsm_panel: bool,
}

impl StateCanvasApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut document = Document::new(Config::default());
        if let Some(storage) = cc.storage {
            if restore_backup(&StorageReader(storage), &mut document) {
                log::info!("Restored backup with {} node(s)", document.nodes.len());
            }
        }

        Self {
            document,
            preset: Preset::default(),
            surface: PainterTarget::new(),
            pointer: Pointer::Idle,
            status: None,
            show_fsm_panel: true,
        }
    }

    fn model(&self) -> FsmModel {
        FsmModel::build(&self.document, FsmOptions::default())
    }

    fn set_preset(&mut self, preset: Preset) {
        self.preset = preset;
        self.document.set_config(Config::preset(preset));
    }

    fn open_json(&mut self, path: &Path) {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                self.status = Some(format!("Could not read {}: {}", path.display(), e));
                return;
            }
        };
        self.status = Some(match load_document(&mut self.document, &source) {
            Ok(report) if report.dropped_nodes + report.dropped_links > 0 => format!(
                "Loaded {} node(s), {} link(s); dropped {} node(s), {} link(s)",
                report.nodes, report.links, report.dropped_nodes, report.dropped_links
            ),
            Ok(report) => format!("Loaded {} node(s), {} link(s)", report.nodes, report.links),
            Err(e) => e.to_string(),
        });
    }

    fn write_file(&mut self, path: &Path, contents: &str) {
        self.status = Some(match std::fs::write(path, contents) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(e) => format!("Could not write {}: {}", path.display(), e),
        });
    }

    fn export(&mut self, name: &str, extension: &str, contents: String) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(name, &[extension])
            .save_file()
        {
            self.write_file(&path, &contents);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (typed, backspace, delete, escape) = ctx.input(|i| {
            let typed: String = i
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            (
                typed,
                i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Delete),
                i.key_pressed(egui::Key::Escape),
            )
        });

        if escape {
            self.document.cancel_link_gesture();
            self.pointer = Pointer::Idle;
        }
        if delete {
            self.document.delete_selected();
            return;
        }
        if let Some(text) = self.document.selected_text_mut() {
            text.push_str(&typed);
            if backspace {
                text.pop();
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let to_canvas = |pos: egui::Pos2| {
            let local = pos - rect.min;
            (local.x as f64, local.y as f64)
        };
        let shift = ui.input(|i| i.modifiers.shift);

        let pointer = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|i| i.pointer.latest_pos()));

        if let Some(pos) = pointer {
            let (x, y) = to_canvas(pos);

            if response.double_clicked() {
                match self.document.node_at(x, y) {
                    Some(i) => {
                        self.document.toggle_accept_state(i);
                    }
                    None => {
                        let i = self.document.add_node(x, y);
                        self.document.selection = Some(Selection::Node(i));
                    }
                }
            } else if response.clicked() {
                self.document.select_at(x, y);
            }

            if response.drag_started() {
                if shift {
                    self.document.begin_link_gesture(x, y);
                    self.pointer = Pointer::Linking;
                } else {
                    self.document.select_at(x, y);
                    self.document.begin_drag(x, y);
                    self.pointer = Pointer::Moving;
                }
            } else if response.dragged() {
                match self.pointer {
                    Pointer::Moving => self.document.drag_to(x, y),
                    Pointer::Linking => self.document.update_link_gesture(x, y),
                    Pointer::Idle => {}
                }
            }

            if response.drag_stopped() {
                if let Pointer::Linking = self.pointer {
                    self.document.finish_link_gesture(x, y);
                }
                self.pointer = Pointer::Idle;
            }
        } else if response.drag_stopped() {
            self.document.cancel_link_gesture();
            self.pointer = Pointer::Idle;
        }

        let caret_visible = (ui.input(|i| i.time) * 2.0) as i64 % 2 == 0;
        painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
        draw_document(&mut self.surface, &self.document, caret_visible);
        self.surface.paint(&painter, rect.min.to_vec2());

        if self.document.selection.is_some() {
            ui.ctx().request_repaint_after(Duration::from_millis(500));
        }
    }

    fn fsm_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Alphabet");
        ui.add(
            egui::TextEdit::singleline(&mut self.document.alphabet)
                .hint_text("a, b, c")
                .desired_width(f32::INFINITY),
        );
        ui.separator();

        let model = self.model();
        if model.is_valid() {
            ui.heading("Transition table");
            if let Some(table) = model.transition_table() {
                egui::Grid::new("fsm_table").striped(true).show(ui, |ui| {
                    ui.label("");
                    for symbol in &table.symbols {
                        ui.strong(symbol.to_string());
                    }
                    ui.end_row();
                    for row in &table.rows {
                        ui.strong(format!("{} {}", row.markers(), row.state).trim());
                        for cell in &row.cells {
                            ui.monospace(cell.as_str());
                        }
                        ui.end_row();
                    }
                });
            }
        } else {
            ui.heading("FSM is not valid");
            for error in &model.errors {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 60), format!("• {}", error));
            }
        }

        if let Some(status) = &self.status {
            ui.separator();
            ui.small(status.as_str());
        }
    }
}

impl eframe::App for StateCanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.document.clear();
                        self.status = None;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("📂 Open JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                        {
                            self.open_json(&path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("💾 Save JSON...").clicked() {
                        match to_json_string(&self.document) {
                            Ok(json) => self.export("JSON", "json", json),
                            Err(e) => self.status = Some(e.to_string()),
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("📤 Export", |ui| {
                        if ui.button("SVG...").clicked() {
                            let svg = export_svg(&self.document);
                            self.export("SVG", "svg", svg);
                            ui.close_menu();
                        }
                        if ui.button("LaTeX (TikZ)...").clicked() {
                            let latex = export_latex(&self.document);
                            self.export("LaTeX", "tex", latex);
                            ui.close_menu();
                        }
                        if ui.button("FSM table (HTML)...").clicked() {
                            let model = self.model();
                            let html = if model.is_valid() {
                                to_html_table(&model)
                            } else {
                                errors_to_html(&model)
                            };
                            self.export("HTML", "html", html);
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.show_fsm_panel, "FSM panel").clicked() {
                        ui.close_menu();
                    }
                });

                ui.separator();
                let mut preset = self.preset;
                egui::ComboBox::from_label("Preset")
                    .selected_text(preset.name())
                    .show_ui(ui, |ui| {
                        for option in Preset::ALL {
                            ui.selectable_value(&mut preset, option, option.name());
                        }
                    });
                if preset != self.preset {
                    self.set_preset(preset);
                }
            });
        });

        egui::TopBottomPanel::bottom("hints").show(ctx, |ui| {
            ui.small(
                "Double-click: add node / toggle accept state  •  Shift-drag: draw link  •  \
                 Type to edit the selected label  •  Delete: remove selection",
            );
        });

        if self.show_fsm_panel {
            egui::SidePanel::right("fsm_panel")
                .default_width(300.0)
                .resizable(true)
                .show(ctx, |ui| self.fsm_panel(ui));
        }

        self.handle_keyboard(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas(ui));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        save_backup(&mut StorageWriter(storage), &self.document);
    }
}
