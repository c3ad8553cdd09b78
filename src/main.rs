use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::editor::{EditorSession, ViewMode};
use crate::input::{InputAction, InputManager, RawInputEvent, window_to_world};
use crate::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};
use crate::textures::{ProceduralTextures, TextureBank};

mod camera;
mod config;
mod construction;
mod drag;
mod editor;
mod error;
mod grid_view;
mod input;
mod persistence;
mod renderer;
mod scaler;
mod selection;
mod textures;
mod world;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    session: EditorSession,
    textures: ProceduralTextures,
    input: InputManager,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal low resolution buffer
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,
    win_w: usize,
    win_h: usize,

    scale_lut: ScaleLut,

    // Last cursor position in window pixels
    cursor: (f64, f64),
}

impl App {
    fn new(cfg: EditorConfig) -> Self {
        let textures = ProceduralTextures::new();
        let (fb_w, fb_h) = (cfg.view.width, cfg.view.height);
        let mut session = EditorSession::new(cfg, textures.max_id());
        if let Err(e) = session.load() {
            log::warn!("MAIN: starting with an empty level: {}", e);
        }

        Self {
            window: None,
            surface: None,
            session,
            textures,
            input: InputManager::new(),

            frame_counter: 0,
            last_fps_print: Instant::now(),

            fb_small: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,
            win_w: 0,
            win_h: 0,

            scale_lut: ScaleLut::empty(),

            cursor: (0.0, 0.0),
        }
    }

    /// World position under the cursor, or `None` over the panel or in the preview.
    fn cursor_world(&self) -> Option<[i32; 2]> {
        if self.session.view != ViewMode::Grid {
            return None;
        }
        window_to_world(
            self.cursor,
            (self.win_w, self.win_h),
            (self.fb_w, self.fb_h),
            self.session.config().view.panel_width,
            self.session.ctx.scale,
        )
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        self.win_w = dst_w;
        self.win_h = dst_h;
        self.scale_lut = build_scale_lut(dst_w, dst_h, self.fb_w, self.fb_h);
    }

    fn draw(&mut self) {
        match self.session.view {
            ViewMode::Grid => grid_view::render_grid(
                &mut self.fb_small,
                self.fb_w,
                self.fb_h,
                &self.session,
                &self.textures,
            ),
            ViewMode::Preview => {
                let preview = &self.session.config().preview;
                let mut camera = Camera::from_nav(&self.session.nav, preview.look_step_px);
                camera.set_fov_from_horizontal(self.fb_w as f32, self.fb_h as f32, preview.fov_deg);
                renderer::render_frame(
                    &mut self.fb_small,
                    self.fb_w,
                    self.fb_h,
                    &self.session.store,
                    &camera,
                    &self.textures,
                );
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let win = &self.session.config().window;
        let attributes = Window::default_attributes()
            .with_title("Sector Grid")
            .with_inner_size(LogicalSize::new(win.width as f64, win.height as f64));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(e) => {
                log::error!("MAIN: could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(s) => s,
            Err(e) => {
                log::error!("MAIN: could not create drawing surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);
        log::info!(
            "MAIN: window {}x{}, view {}x{}",
            size.width,
            size.height,
            self.fb_w,
            self.fb_h
        );

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if let Some(raw) = RawInputEvent::from_winit(&event) {
            match self.input.process(raw) {
                Some(InputAction::Command(cmd)) => self.session.apply(cmd),
                Some(InputAction::Nav(nav)) => self.session.navigate(nav),
                None => {}
            }
            self.request_redraw();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("MAIN: close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if let Some(p) = self.cursor_world() {
                    self.session.pointer_moved(p);
                    self.request_redraw();
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => {
                        if let Some(p) = self.cursor_world() {
                            self.session.primary_pressed(p);
                        }
                    }
                    (MouseButton::Right, ElementState::Pressed) => {
                        if let Some(p) = self.cursor_world() {
                            self.session.secondary_pressed(p);
                        }
                    }
                    (MouseButton::Right, ElementState::Released) => {
                        self.session.secondary_released();
                    }
                    _ => {}
                }
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let Some(window) = self.window.as_ref().filter(|w| w.id() == id) else {
                    return;
                };
                let size = window.inner_size();
                let (Some(nw), Some(nh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw != self.win_w || dh != self.win_h {
                    self.rebuild_lut(dw, dh);
                }

                self.draw();

                let Some(surface) = self.surface.as_mut() else {
                    return;
                };
                // Set softbuffer to window size
                if let Err(e) = surface.resize(nw, nh) {
                    log::error!("MAIN: surface resize failed: {}", e);
                    return;
                }
                let mut buf = match surface.buffer_mut() {
                    Ok(b) => b,
                    Err(e) => {
                        log::error!("MAIN: no frame buffer: {}", e);
                        return;
                    }
                };
                blit_nearest_stretch(&mut buf, dw, &self.fb_small, &self.scale_lut);
                if let Err(e) = buf.present() {
                    log::error!("MAIN: present failed: {}", e);
                }

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
                if elapsed >= 1.0 {
                    log::debug!("MAIN: FPS {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
                self.request_redraw();
            }
            _ => (),
        }
    }
}

impl App {
    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("MAIN: starting sector grid editor");

    let cfg = EditorConfig::load();

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            log::error!("MAIN: could not create event loop: {}", e);
            return;
        }
    };

    // The editor only changes in response to input, so sleep between events.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(cfg);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("MAIN: event loop ended with an error: {}", e);
    }
}
