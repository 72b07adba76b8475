// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Explorer puts the pieces together the way a windowed front-end
//! would: commands go to the viewport, the viewport tells the damage
//! engine, and the engine's updates queue up on a canvas until the
//! next `present`, which applies them to a framebuffer.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::backend::{BackendFactory, BackendKind, ComputeBackend};
use crate::command::Command;
use crate::damage::DamageEngine;
use crate::errors::ComputeError;
use crate::planes::Size;
use crate::update::{Framebuffer, Update};
use crate::viewport::{Viewport, ViewportModel, DEFAULT_VIEW_SIZE};

/// How to start an Explorer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Initial view size.
    pub view_size: Size,
    /// Largest rectangle the scratch buffer is sized for up front.
    pub max_size: Size,
    /// Which backend computes pixels.
    pub backend: BackendKind,
    /// Pans answered with copies and strips rather than full redraws.
    pub incremental: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            view_size: DEFAULT_VIEW_SIZE,
            max_size: Size::new(1920, 1200),
            backend: BackendKind::Tiled(num_cpus::get()),
            incremental: true,
        }
    }
}

/// Updates waiting to be shown, and the surface they go to.
#[derive(Debug)]
pub struct Canvas {
    framebuffer: Framebuffer,
    pending: VecDeque<(Update, u64)>,
    last_elapsed: Option<u64>,
}

impl Canvas {
    fn new(size: Size) -> Canvas {
        Canvas {
            framebuffer: Framebuffer::new(size),
            pending: VecDeque::new(),
            last_elapsed: None,
        }
    }

    fn push(&mut self, update: &Update, elapsed: u64) {
        self.pending.push_back((update.clone(), elapsed));
        self.last_elapsed = Some(elapsed);
    }

    fn present(&mut self, size: Size) -> usize {
        self.framebuffer.resize(size);
        let count = self.pending.len();
        for (update, _) in self.pending.drain(..) {
            update.apply(&mut self.framebuffer);
        }
        count
    }
}

/// A viewer without a window.
pub struct Explorer {
    model: ViewportModel,
    engine: Rc<RefCell<DamageEngine>>,
    canvas: Rc<RefCell<Canvas>>,
    factory: BackendFactory,
}

impl Explorer {
    /// Build everything with CPU backends only and queue the first frame.
    pub fn new(settings: Settings) -> Result<Explorer, ComputeError> {
        Explorer::with_factory(settings, BackendFactory::new(settings.max_size))
    }

    /// Build everything with the given factory, which may know about an
    /// accelerator, and queue the first frame.
    pub fn with_factory(
        settings: Settings,
        factory: BackendFactory,
    ) -> Result<Explorer, ComputeError> {
        let backend = factory.create(settings.backend)?;
        let mut engine = DamageEngine::new(backend, settings.max_size);
        engine.set_incremental(settings.incremental);

        let canvas = Rc::new(RefCell::new(Canvas::new(settings.view_size)));
        let sink = canvas.clone();
        engine.subscribe(Box::new(move |update, elapsed| {
            sink.borrow_mut().push(update, elapsed)
        }));

        let engine = Rc::new(RefCell::new(engine));
        let listener = engine.clone();
        let mut model = ViewportModel::new(settings.view_size);
        model.add_listener(Box::new(move |event, viewport| {
            listener.borrow_mut().on_event(event, viewport)
        }));

        info!(
            "viewer {}x{} on {} backend",
            settings.view_size.width, settings.view_size.height, settings.backend
        );
        model.refresh();

        Ok(Explorer {
            model,
            engine,
            canvas,
            factory,
        })
    }

    /// Carry out one command.  Only switching to a backend that cannot
    /// be built fails.
    pub fn apply(&mut self, command: &Command) -> Result<(), ComputeError> {
        match *command {
            Command::Move(dx, dy) => {
                self.model.move_by(dx, dy);
            }
            Command::Locate(x, y) => {
                self.model.set_view_location(x, y);
            }
            Command::Left => {
                self.model.move_left();
            }
            Command::Right => {
                self.model.move_right();
            }
            Command::Up => {
                self.model.move_up();
            }
            Command::Down => {
                self.model.move_down();
            }
            Command::ZoomIn => {
                self.model.zoom_in();
            }
            Command::ZoomOut => {
                self.model.zoom_out();
            }
            Command::Reset => self.model.reset(),
            Command::Refresh => self.model.refresh(),
            Command::Resize(size) => {
                if size != self.model.viewport().view_size() {
                    self.model.set_view_size(size);
                }
            }
            Command::Backend(kind) => self.select_backend(kind)?,
            Command::Incremental(on) => self.engine.borrow_mut().set_incremental(on),
        }
        Ok(())
    }

    /// Switch backends.  The old one is released, and the picture is
    /// recomputed with the new one.
    pub fn select_backend(&mut self, kind: BackendKind) -> Result<(), ComputeError> {
        let backend = self.factory.create(kind)?;
        let mut old = self.engine.borrow_mut().set_backend(backend);
        if let Err(e) = old.dispose() {
            warn!("releasing {} backend: {}", old.kind(), e);
        }
        self.model.refresh();
        Ok(())
    }

    /// Apply every queued update to the framebuffer, in order.  Returns
    /// how many there were.
    pub fn present(&mut self) -> usize {
        let size = self.model.viewport().view_size();
        self.canvas.borrow_mut().present(size)
    }

    /// Number of updates queued since the last `present`.
    pub fn pending(&self) -> usize {
        self.canvas.borrow().pending.len()
    }

    /// How long the most recent update took to compute.
    pub fn last_elapsed(&self) -> Option<u64> {
        self.canvas.borrow().last_elapsed
    }

    /// The displayed frame.
    pub fn framebuffer(&self) -> Ref<Framebuffer> {
        Ref::map(self.canvas.borrow(), |c| &c.framebuffer)
    }

    /// Viewport queries.
    pub fn viewport(&self) -> &Viewport {
        self.model.viewport()
    }

    /// The backend in use.
    pub fn backend_kind(&self) -> BackendKind {
        self.engine.borrow().backend_kind()
    }

    /// What a backend chooser would offer.
    pub fn available_backends(&self) -> Vec<BackendKind> {
        self.factory.available_kinds()
    }

    /// Are pans incremental?
    pub fn is_incremental(&self) -> bool {
        self.engine.borrow().is_incremental()
    }

    /// The center, formatted for a status line.
    pub fn position_label(&self) -> String {
        let c = self.model.viewport().center();
        format!("({:.6}, {:.6})", c.re, c.im)
    }

    /// A window title.
    pub fn title(&self) -> String {
        let size = self.model.viewport().view_size();
        format!("Mandelbrot set ({}x{})", size.width, size.height)
    }

    /// Release the backend.  Failures are logged, not returned.
    pub fn dispose(&mut self) {
        let mut engine = self.engine.borrow_mut();
        let kind = engine.backend_kind();
        if let Err(e) = engine.backend_mut().dispose() {
            warn!("releasing {} backend: {}", kind, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, SequentialBackend};

    fn settings(w: i32, h: i32) -> Settings {
        Settings {
            view_size: Size::new(w, h),
            max_size: Size::new(w, h),
            backend: BackendKind::Sequential,
            incremental: true,
        }
    }

    // A fresh full render of the same viewport.
    fn reference(viewport: &Viewport) -> Framebuffer {
        let mut engine = DamageEngine::new(
            Backend::Sequential(SequentialBackend),
            viewport.view_size(),
        );
        let mut fb = Framebuffer::new(viewport.view_size());
        engine.change_update(viewport).unwrap().apply(&mut fb);
        fb
    }

    fn differing(a: &Framebuffer, b: &Framebuffer) -> usize {
        a.pixels()
            .iter()
            .zip(b.pixels())
            .filter(|(x, y)| x != y)
            .count()
    }

    #[test]
    fn the_first_frame_is_queued_on_creation() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        assert_eq!(explorer.pending(), 1);
        assert_eq!(explorer.present(), 1);
        assert_eq!(explorer.pending(), 0);
        assert!(explorer.last_elapsed().is_some());
        assert_eq!(*explorer.framebuffer(), reference(explorer.viewport()));
    }

    #[test]
    fn incremental_pans_track_a_full_redraw() {
        let mut explorer = Explorer::new(settings(64, 48)).unwrap();
        for command in &[Command::ZoomIn, Command::ZoomIn, Command::ZoomIn] {
            explorer.apply(command).unwrap();
        }
        for command in &[
            Command::Move(5, 3),
            Command::Move(-7, 2),
            Command::Move(0, -4),
            Command::Left,
            Command::Down,
        ] {
            explorer.apply(command).unwrap();
            explorer.present();
        }
        // Strips are computed from offsets rounded separately from the
        // copied pixels, so a stray boundary pixel may differ.
        let fresh = reference(explorer.viewport());
        assert!(differing(&explorer.framebuffer(), &fresh) <= 3);
    }

    #[test]
    fn backend_switch_refreshes_and_keeps_the_picture() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        explorer.present();
        let before = explorer.framebuffer().clone();
        explorer.apply(&Command::Backend(BackendKind::Tiled(3))).unwrap();
        assert_eq!(explorer.backend_kind(), BackendKind::Tiled(3));
        assert_eq!(explorer.present(), 1);
        assert_eq!(*explorer.framebuffer(), before);
        explorer.dispose();
    }

    #[test]
    fn unavailable_backends_leave_things_alone() {
        let mut explorer = Explorer::new(settings(20, 20)).unwrap();
        assert_eq!(
            explorer.select_backend(BackendKind::Accelerator),
            Err(ComputeError::Unavailable)
        );
        assert_eq!(explorer.backend_kind(), BackendKind::Sequential);
        assert!(!explorer
            .available_backends()
            .contains(&BackendKind::Accelerator));
    }

    #[test]
    fn resize_resizes_the_framebuffer() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        explorer.apply(&Command::Resize(Size::new(50, 20))).unwrap();
        explorer.present();
        assert_eq!(explorer.framebuffer().size(), Size::new(50, 20));
        assert_eq!(*explorer.framebuffer(), reference(explorer.viewport()));
        assert_eq!(explorer.title(), "Mandelbrot set (50x20)");
    }

    #[test]
    fn incremental_toggle_and_status() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        assert!(explorer.is_incremental());
        explorer.apply(&Command::Incremental(false)).unwrap();
        assert!(!explorer.is_incremental());
        assert_eq!(explorer.position_label(), "(-0.750000, 0.000000)");
    }

    #[test]
    fn scripted_locates_at_the_integer_limits_stay_on_the_canvas() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        let script = "zoom-in;locate:-2147483648,0;locate:2147483647,2147483647";
        for command in crate::command::parse_script(script).unwrap() {
            explorer.apply(&command).unwrap();
        }
        let v = explorer.viewport();
        let full = v.full_size();
        assert_eq!(v.view_bounds().right(), full.width);
        assert_eq!(v.view_bounds().bottom(), full.height);
    }

    #[test]
    fn blind_moves_emit_nothing() {
        let mut explorer = Explorer::new(settings(40, 30)).unwrap();
        explorer.present();
        // Fully zoomed out there is nowhere to go sideways.
        explorer.apply(&Command::Move(10, 0)).unwrap();
        assert_eq!(explorer.pending(), 0);
        assert_eq!(explorer.present(), 0);
    }
}
