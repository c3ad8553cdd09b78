//! The editing session: owns the geometry, the player, the edit buffers and
//! the construction and drag state, and turns commands and pointer events
//! into mutations. Errors stop here; they are logged and the session goes on.

use crate::camera::NavState;
use crate::config::EditorConfig;
use crate::construction::{ClickOutcome, ConstructionState, ConstructionStateMachine};
use crate::drag::DragEditor;
use crate::error::{EditorError, Result};
use crate::persistence;
use crate::selection::EditContext;
use crate::world::{GeometryStore, snap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Save,
    Load,
    CycleWallTexture(i32),
    StepWallU(i32),
    StepWallV(i32),
    CycleSurfaceTexture(i32),
    StepSurfaceScale(i32),
    StepTop(i32),
    StepBottom(i32),
    ToggleAddSector,
    CycleSector(i32),
    CycleWall(i32),
    DeleteSector,
    ToggleInfo,
    ToggleView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Walk(i32),
    Turn(i32),
    Strafe(i32),
    Climb(i32),
    Look(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    Preview,
}

pub struct EditorSession {
    pub store: GeometryStore,
    pub nav: NavState,
    pub ctx: EditContext,
    pub show_info: bool,
    pub view: ViewMode,
    construction: ConstructionStateMachine,
    drag: DragEditor,
    secondary_down: bool,
    pointer: [i32; 2], // raw pointer in world units
    max_texture: i32,
    cfg: EditorConfig,
}

impl EditorSession {
    pub fn new(cfg: EditorConfig, max_texture: i32) -> Self {
        Self {
            store: GeometryStore::new(),
            nav: NavState::from_config(&cfg.nav),
            ctx: EditContext::default(),
            show_info: false,
            view: ViewMode::default(),
            construction: ConstructionStateMachine::new(),
            drag: DragEditor::new(),
            secondary_down: false,
            pointer: [0, 0],
            max_texture,
            cfg,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.cfg
    }

    pub fn construction_state(&self) -> ConstructionState {
        self.construction.state()
    }

    pub fn pointer(&self) -> [i32; 2] {
        self.pointer
    }

    /// Pointer position rounded to the construction grid.
    pub fn quantized_pointer(&self) -> [i32; 2] {
        snap(self.pointer, self.cfg.grid.click_cell)
    }

    pub fn apply(&mut self, cmd: EditorCommand) {
        if let Err(e) = self.try_apply(cmd) {
            report(&e);
        }
    }

    pub fn try_apply(&mut self, cmd: EditorCommand) -> Result<()> {
        let max = self.max_texture;
        match cmd {
            EditorCommand::Save => self.save()?,
            EditorCommand::Load => self.load()?,
            EditorCommand::CycleWallTexture(d) => self.ctx.cycle_wall_texture(&mut self.store, d, max),
            EditorCommand::StepWallU(d) => self.ctx.step_wall_u(&mut self.store, d),
            EditorCommand::StepWallV(d) => self.ctx.step_wall_v(&mut self.store, d),
            EditorCommand::CycleSurfaceTexture(d) => {
                self.ctx.cycle_surface_texture(&mut self.store, d, max)
            }
            EditorCommand::StepSurfaceScale(d) => self.ctx.step_surface_scale(&mut self.store, d),
            EditorCommand::StepTop(d) => self.ctx.step_top(&mut self.store, d),
            EditorCommand::StepBottom(d) => self.ctx.step_bottom(&mut self.store, d),
            EditorCommand::ToggleAddSector => {
                self.ctx.clear_selection();
                self.drag.release();
                self.construction.toggle_arm(&mut self.store);
            }
            EditorCommand::CycleSector(d) => self.ctx.cycle_sector(&self.store, d),
            EditorCommand::CycleWall(d) => self.ctx.cycle_wall(&self.store, d)?,
            EditorCommand::DeleteSector => self.delete_selected()?,
            EditorCommand::ToggleInfo => self.show_info = !self.show_info,
            EditorCommand::ToggleView => {
                self.view = match self.view {
                    ViewMode::Grid => ViewMode::Preview,
                    ViewMode::Preview => ViewMode::Grid,
                }
            }
        }
        Ok(())
    }

    pub fn navigate(&mut self, cmd: NavCommand) {
        let nav = &self.cfg.nav;
        match cmd {
            NavCommand::Walk(d) => self.nav.walk(d, nav),
            NavCommand::Turn(d) => self.nav.turn(d, nav),
            NavCommand::Strafe(d) => self.nav.strafe(d, nav),
            NavCommand::Climb(d) => self.nav.climb(d, nav),
            NavCommand::Look(d) => self.nav.look(d),
        }
    }

    /// Canvas click with the primary button at raw world position `raw`.
    pub fn primary_pressed(&mut self, raw: [i32; 2]) {
        if let Err(e) = self.try_primary_pressed(raw) {
            report(&e);
        }
    }

    pub fn try_primary_pressed(&mut self, raw: [i32; 2]) -> Result<ClickOutcome> {
        self.pointer = raw;
        let p = self.quantized_pointer();
        self.construction.click(&mut self.store, &self.ctx, p)
    }

    pub fn secondary_pressed(&mut self, raw: [i32; 2]) {
        self.secondary_down = true;
        self.pointer = raw;
        self.try_grab();
    }

    pub fn secondary_released(&mut self) {
        self.secondary_down = false;
        self.drag.release();
    }

    /// Pointer moved to raw world position `raw`. Grabbed endpoints follow
    /// it on the drag grid.
    pub fn pointer_moved(&mut self, raw: [i32; 2]) {
        self.pointer = raw;
        if !self.construction.is_idle() {
            return;
        }
        if self.drag.is_grabbing() {
            self.drag.move_to(&mut self.store, raw, self.cfg.grid.drag_cell);
        } else {
            self.try_grab();
        }
    }

    fn try_grab(&mut self) {
        if self.secondary_down && self.construction.is_idle() {
            let p = self.quantized_pointer();
            self.drag.hold(&self.store, p, self.cfg.grid.hit_radius);
        }
    }

    /// Writes the level file. Refused while a sector is open, since its
    /// trailing wall has not been placed.
    pub fn save(&self) -> Result<()> {
        if matches!(self.construction.state(), ConstructionState::Placing { .. }) {
            return Err(EditorError::ConstructionInProgress);
        }
        persistence::save(&self.cfg.level_file, &self.store, &self.nav)
    }

    /// Replaces the store (and the player, when the file has one). Nothing
    /// changes if the file cannot be read or fails validation.
    pub fn load(&mut self) -> Result<()> {
        let level = persistence::load(&self.cfg.level_file)?;
        self.store = level.store;
        if let Some(nav) = level.nav {
            self.nav = nav;
        }
        self.construction.reset();
        self.drag.release();
        self.ctx.clear_selection();
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        if matches!(self.construction.state(), ConstructionState::Placing { .. }) {
            return Err(EditorError::ConstructionInProgress);
        }
        let index = self
            .ctx
            .selected_sector()
            .ok_or(EditorError::NothingSelected)?;
        let removed = self
            .store
            .remove_sector(index)
            .ok_or(EditorError::NothingSelected)?;
        log::info!(
            "EDIT: deleted sector {} ({} walls)",
            index + 1,
            removed.wall_count()
        );
        self.ctx.clear_selection();
        Ok(())
    }
}

fn report(e: &EditorError) {
    match e {
        EditorError::FileOpen { .. }
        | EditorError::Io(_)
        | EditorError::Parse { .. }
        | EditorError::InvalidLevel(_) => log::error!("ERROR: {}", e),
        _ => log::warn!("EDIT: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> EditorSession {
        let cfg = EditorConfig {
            level_file: dir.path().join("level.txt"),
            ..EditorConfig::default()
        };
        EditorSession::new(cfg, 20)
    }

    fn build(s: &mut EditorSession, pts: &[[i32; 2]]) {
        s.apply(EditorCommand::ToggleAddSector);
        for &p in pts {
            s.primary_pressed(p);
        }
    }

    #[test]
    fn test_square_from_unsnapped_clicks() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[3, -5], [30, 2], [35, 29], [-4, 33], [1, 1]]);

        assert_eq!(s.construction_state(), ConstructionState::Idle);
        assert_eq!(s.store.num_sectors(), 1);
        assert_eq!(s.store.sector(0).unwrap().wall_count(), 4);
        let shades: Vec<i32> = s.store.walls().iter().map(|w| w.shade).collect();
        assert_eq!(shades, vec![0, 90, 0, 90]);
        assert!(s.store.is_closed(0));
    }

    #[test]
    fn test_winding_abort_restores_counts() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        let (sectors, walls) = (s.store.num_sectors(), s.store.num_walls());

        s.apply(EditorCommand::ToggleAddSector);
        s.primary_pressed([128, 128]);
        let err = s.try_primary_pressed([96, 160]);
        assert!(matches!(err, Err(EditorError::WindingViolation)));
        assert_eq!(s.construction_state(), ConstructionState::Idle);
        assert_eq!((s.store.num_sectors(), s.store.num_walls()), (sectors, walls));
    }

    #[test]
    fn test_arming_resets_edit_context() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        s.apply(EditorCommand::CycleSector(1));
        s.apply(EditorCommand::StepTop(1));
        assert_eq!(s.ctx.sel_s, 1);
        s.apply(EditorCommand::ToggleAddSector);
        assert_eq!(s.ctx, EditContext::default());
        assert_eq!(s.construction_state(), ConstructionState::Armed);
        assert_eq!(s.store.sector(0).unwrap().z2, 45);
    }

    #[test]
    fn test_delete_only_sector_then_save_empty() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        s.apply(EditorCommand::Save);
        assert!(!fs::read_to_string(dir.path().join("level.txt")).unwrap().is_empty());

        s.apply(EditorCommand::CycleSector(1));
        s.try_apply(EditorCommand::DeleteSector).unwrap();
        assert_eq!(s.store.num_sectors(), 0);
        assert_eq!(s.store.num_walls(), 0);
        assert_eq!(s.ctx.sel_s, 0);

        s.try_apply(EditorCommand::Save).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("level.txt")).unwrap(), "");
    }

    #[test]
    fn test_delete_requires_selection() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        assert!(matches!(
            s.try_apply(EditorCommand::DeleteSector),
            Err(EditorError::NothingSelected)
        ));
        assert_eq!(s.store.num_sectors(), 1);
    }

    #[test]
    fn test_delete_blocked_while_placing() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        build(&mut s, &[[128, 0], [160, 0]]);
        s.apply(EditorCommand::CycleSector(1));
        assert!(matches!(
            s.try_apply(EditorCommand::DeleteSector),
            Err(EditorError::ConstructionInProgress)
        ));
    }

    #[test]
    fn test_save_blocked_while_placing() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        s.save().unwrap();
        let saved = fs::read_to_string(dir.path().join("level.txt")).unwrap();

        build(&mut s, &[[128, 0], [192, 0], [192, 64]]);
        assert!(matches!(
            s.try_apply(EditorCommand::Save),
            Err(EditorError::ConstructionInProgress)
        ));
        assert_eq!(fs::read_to_string(dir.path().join("level.txt")).unwrap(), saved);

        s.load().unwrap();
        assert_eq!(s.construction_state(), ConstructionState::Idle);
        assert_eq!(s.store.num_sectors(), 1);
        assert!(s.store.is_closed(0));
    }

    #[test]
    fn test_new_sector_after_middle_delete_appends_at_tail() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        build(&mut s, &[[128, 0], [192, 0], [192, 64], [128, 64], [128, 0]]);
        build(&mut s, &[[256, 0], [320, 0], [288, 64], [256, 0]]);

        s.apply(EditorCommand::CycleSector(2));
        s.try_apply(EditorCommand::DeleteSector).unwrap();
        assert_eq!(s.store.num_walls(), 6);

        build(&mut s, &[[0, 128], [64, 128], [64, 192], [0, 128]]);
        assert_eq!(s.store.num_sectors(), 3);
        assert_eq!(s.store.sector(2).unwrap().ws, 6);

        let mut next = 0;
        for (i, sector) in s.store.sectors().iter().enumerate() {
            assert_eq!(sector.ws, next);
            assert!(s.store.is_closed(i));
            next = sector.we;
        }
        assert_eq!(next, s.store.num_walls());
    }

    #[test]
    fn test_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 64], [0, 0]]);
        build(&mut s, &[[128, 0], [192, 0], [160, 64], [128, 0]]);
        s.navigate(NavCommand::Turn(1));
        s.navigate(NavCommand::Walk(1));
        s.save().unwrap();

        let store = s.store.clone();
        let nav = s.nav;
        let mut other = session(&dir);
        other.load().unwrap();
        assert_eq!(other.store, store);
        assert_eq!(other.nav, nav);
    }

    #[test]
    fn test_failed_load_leaves_store() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        let before = s.store.clone();

        s.apply(EditorCommand::Load);
        assert_eq!(s.store, before);

        fs::write(dir.path().join("level.txt"), "2\n0 3 0 40 1 4\n").unwrap();
        assert!(s.load().is_err());
        assert_eq!(s.store, before);
    }

    #[test]
    fn test_drag_shared_vertex() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 64], [0, 0]]);

        s.secondary_pressed([63, 65]);
        s.pointer_moved([100, 90]);
        s.secondary_released();

        assert_eq!(s.store.wall(1).unwrap().end(), [96, 96]);
        assert_eq!(s.store.wall(2).unwrap().start(), [96, 96]);
        assert!(s.store.is_closed(0));

        s.pointer_moved([200, 200]);
        assert_eq!(s.store.wall(2).unwrap().start(), [96, 96]);
    }

    #[test]
    fn test_drag_inactive_while_armed() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        build(&mut s, &[[0, 0], [64, 0], [64, 64], [0, 0]]);
        let before = s.store.clone();
        s.apply(EditorCommand::ToggleAddSector);
        s.secondary_pressed([0, 0]);
        s.pointer_moved([96, 96]);
        assert_eq!(s.store, before);
    }

    #[test]
    fn test_view_and_info_toggles() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let before = s.store.clone();
        s.apply(EditorCommand::ToggleInfo);
        s.apply(EditorCommand::ToggleView);
        assert!(s.show_info);
        assert_eq!(s.view, ViewMode::Preview);
        assert_eq!(s.store, before);
    }
}
