use std::collections::HashMap;

use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::editor::{EditorCommand, NavCommand};

#[derive(Debug, Clone, Copy)]
pub struct RawInputEvent {
    pub keycode: KeyCode,
    pub state: ElementState,
}

impl RawInputEvent {
    pub fn from_winit(event: &WindowEvent) -> Option<Self> {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(keycode),
                    state,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            Some(Self {
                keycode: *keycode,
                state: *state,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Command(EditorCommand),
    Nav(NavCommand),
}

/// Key bindings for the editor commands and the navigation keys. Holding
/// the modifier (`M`) turns walk/turn into climb/look.
pub struct InputManager {
    bindings: HashMap<KeyCode, EditorCommand>,
    modifier_held: bool,
}

impl InputManager {
    pub fn new() -> Self {
        let mut manager = Self {
            bindings: HashMap::new(),
            modifier_held: false,
        };
        manager.load_default_bindings();
        manager
    }

    fn load_default_bindings(&mut self) {
        use EditorCommand::*;
        let defaults = [
            (KeyCode::F2, Save),
            (KeyCode::F3, Load),
            (KeyCode::BracketLeft, CycleWallTexture(-1)),
            (KeyCode::BracketRight, CycleWallTexture(1)),
            (KeyCode::Digit1, StepWallU(-1)),
            (KeyCode::Digit2, StepWallU(1)),
            (KeyCode::Digit3, StepWallV(-1)),
            (KeyCode::Digit4, StepWallV(1)),
            (KeyCode::Comma, CycleSurfaceTexture(-1)),
            (KeyCode::Period, CycleSurfaceTexture(1)),
            (KeyCode::Digit5, StepSurfaceScale(-1)),
            (KeyCode::Digit6, StepSurfaceScale(1)),
            (KeyCode::PageDown, StepTop(-1)),
            (KeyCode::PageUp, StepTop(1)),
            (KeyCode::End, StepBottom(-1)),
            (KeyCode::Home, StepBottom(1)),
            (KeyCode::KeyN, ToggleAddSector),
            (KeyCode::KeyZ, CycleSector(-1)),
            (KeyCode::KeyX, CycleSector(1)),
            (KeyCode::KeyC, CycleWall(-1)),
            (KeyCode::KeyV, CycleWall(1)),
            (KeyCode::Delete, DeleteSector),
            (KeyCode::KeyI, ToggleInfo),
            (KeyCode::Tab, ToggleView),
        ];
        self.bindings.extend(defaults);
    }

    pub fn process(&mut self, event: RawInputEvent) -> Option<InputAction> {
        if event.keycode == KeyCode::KeyM {
            self.modifier_held = event.state == ElementState::Pressed;
            return None;
        }
        if event.state != ElementState::Pressed {
            return None;
        }
        if let Some(cmd) = self.bindings.get(&event.keycode) {
            return Some(InputAction::Command(*cmd));
        }
        let nav = match (self.modifier_held, event.keycode) {
            (false, KeyCode::KeyW) => NavCommand::Walk(1),
            (false, KeyCode::KeyS) => NavCommand::Walk(-1),
            (false, KeyCode::KeyA) => NavCommand::Turn(-1),
            (false, KeyCode::KeyD) => NavCommand::Turn(1),
            (true, KeyCode::KeyW) => NavCommand::Climb(1),
            (true, KeyCode::KeyS) => NavCommand::Climb(-1),
            (true, KeyCode::KeyA) => NavCommand::Look(1),
            (true, KeyCode::KeyD) => NavCommand::Look(-1),
            (_, KeyCode::ArrowLeft) => NavCommand::Strafe(-1),
            (_, KeyCode::ArrowRight) => NavCommand::Strafe(1),
            _ => return None,
        };
        Some(InputAction::Nav(nav))
    }
}

/// Maps a window-space cursor position to world units through the internal
/// framebuffer, with y pointing up. Returns `None` over the side panel.
pub fn window_to_world(
    pos: (f64, f64),
    window: (usize, usize),
    fb: (usize, usize),
    panel_width: usize,
    scale: i32,
) -> Option<[i32; 2]> {
    if window.0 == 0 || window.1 == 0 {
        return None;
    }
    let fx = pos.0 * fb.0 as f64 / window.0 as f64;
    let fy = pos.1 * fb.1 as f64 / window.1 as f64;
    if fx < 0.0 || fx >= (fb.0 - panel_width) as f64 {
        return None;
    }
    let vy = fb.1 as f64 - fy;
    let s = scale as f64;
    Some([(fx * s).floor() as i32, (vy * s).floor() as i32])
}
