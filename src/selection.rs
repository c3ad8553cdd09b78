//! Selection cycling over sectors and walls, and the edit buffers that
//! mediate between panel commands and the geometry store.
//!
//! Field changes are committed to the selected sector or wall as soon as
//! they happen; selecting only loads values into the buffers.

use crate::error::{EditorError, Result};
use crate::world::GeometryStore;

pub const HEIGHT_STEP: i32 = 5;
pub const Z1_RANGE: (i32, i32) = (0, 90);
pub const Z2_RANGE: (i32, i32) = (5, 95);
pub const TILE_RANGE: (i32, i32) = (1, 9);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditContext {
    pub scale: i32,   // grid scale divisor for the 2D view
    pub sel_s: usize, // selected sector, 0 = none, else 1-based
    pub sel_w: usize, // selected wall within the sector, 0 = all walls
    pub wt: i32,      // wall texture
    pub wu: i32,      // wall u tile
    pub wv: i32,      // wall v tile
    pub st: i32,      // surface texture
    pub ss: i32,      // surface scale
    pub z1: i32,      // bottom height
    pub z2: i32,      // top height
}

impl Default for EditContext {
    fn default() -> Self {
        Self {
            scale: 4,
            sel_s: 0,
            sel_w: 0,
            wt: 0,
            wu: 1,
            wv: 1,
            st: 1,
            ss: 4,
            z1: 0,
            z2: 40,
        }
    }
}

/// Steps `value` by `dir` and wraps within `[0, max]`.
fn wrap(value: i32, dir: i32, max: i32) -> i32 {
    (value + dir).rem_euclid(max + 1)
}

fn wrap_index(value: usize, dir: i32, max: usize) -> usize {
    (value as i64 + dir as i64).rem_euclid(max as i64 + 1) as usize
}

impl EditContext {
    /// Drops the selection and restores every buffer to its default.
    pub fn clear_selection(&mut self) {
        *self = Self::default();
    }

    /// 0-based index of the selected sector, if any.
    pub fn selected_sector(&self) -> Option<usize> {
        self.sel_s.checked_sub(1)
    }

    /// Absolute wall index of the selected wall, if a single wall is selected.
    pub fn selected_wall(&self, store: &GeometryStore) -> Option<usize> {
        let s = store.sector(self.selected_sector()?)?;
        let w = self.sel_w.checked_sub(1)?;
        (w < s.wall_count()).then_some(s.ws + w)
    }

    /// Cycles the selected sector through `[0, num_sectors]`, wrapping both ways.
    pub fn cycle_sector(&mut self, store: &GeometryStore, dir: i32) {
        let sel_s = wrap_index(self.sel_s, dir, store.num_sectors());
        if sel_s == 0 {
            self.clear_selection();
            log::debug!("SELECT: none");
            return;
        }
        self.sel_s = sel_s;
        self.sel_w = 0;
        self.load_sector(store);
        log::debug!("SELECT: sector {}", sel_s);
    }

    /// Cycles the selected wall through `[0, wall_count]` of the selected sector.
    pub fn cycle_wall(&mut self, store: &GeometryStore, dir: i32) -> Result<()> {
        let s = self
            .selected_sector()
            .and_then(|i| store.sector(i))
            .ok_or(EditorError::NothingSelected)?;
        self.sel_w = wrap_index(self.sel_w, dir, s.wall_count());
        if let Some(w) = self.selected_wall(store).and_then(|i| store.wall(i)) {
            self.wt = w.wt;
            self.wu = w.u;
            self.wv = w.v;
        }
        log::debug!("SELECT: sector {} wall {}", self.sel_s, self.sel_w);
        Ok(())
    }

    fn load_sector(&mut self, store: &GeometryStore) {
        let Some(index) = self.selected_sector() else {
            return;
        };
        if let Some(s) = store.sector(index) {
            self.z1 = s.z1;
            self.z2 = s.z2;
            self.st = s.st;
            self.ss = s.ss;
        }
        if let Some(w) = store.sector_walls(index).first() {
            self.wt = w.wt;
            self.wu = w.u;
            self.wv = w.v;
        }
    }

    pub fn cycle_wall_texture(&mut self, store: &mut GeometryStore, dir: i32, max_id: i32) {
        self.wt = wrap(self.wt, dir, max_id);
        self.commit_walls(store);
    }

    pub fn step_wall_u(&mut self, store: &mut GeometryStore, dir: i32) {
        self.wu = (self.wu + dir).clamp(TILE_RANGE.0, TILE_RANGE.1);
        self.commit_walls(store);
    }

    pub fn step_wall_v(&mut self, store: &mut GeometryStore, dir: i32) {
        self.wv = (self.wv + dir).clamp(TILE_RANGE.0, TILE_RANGE.1);
        self.commit_walls(store);
    }

    pub fn cycle_surface_texture(&mut self, store: &mut GeometryStore, dir: i32, max_id: i32) {
        self.st = wrap(self.st, dir, max_id);
        self.commit_sector(store);
    }

    pub fn step_surface_scale(&mut self, store: &mut GeometryStore, dir: i32) {
        self.ss = (self.ss + dir).clamp(TILE_RANGE.0, TILE_RANGE.1);
        self.commit_sector(store);
    }

    /// Moves the top height; lowering it onto the bottom pushes the bottom down too.
    pub fn step_top(&mut self, store: &mut GeometryStore, dir: i32) {
        self.z2 += dir * HEIGHT_STEP;
        if dir < 0 && self.z2 <= self.z1 {
            self.z1 = self.z2 - HEIGHT_STEP;
        }
        self.clamp_heights();
        self.commit_sector(store);
    }

    /// Moves the bottom height; raising it onto the top pushes the top up too.
    pub fn step_bottom(&mut self, store: &mut GeometryStore, dir: i32) {
        self.z1 += dir * HEIGHT_STEP;
        if dir > 0 && self.z1 >= self.z2 {
            self.z2 = self.z1 + HEIGHT_STEP;
        }
        self.clamp_heights();
        self.commit_sector(store);
    }

    fn clamp_heights(&mut self) {
        self.z1 = self.z1.clamp(Z1_RANGE.0, Z1_RANGE.1);
        self.z2 = self.z2.clamp(Z2_RANGE.0, Z2_RANGE.1);
        if self.z1 >= self.z2 {
            self.z1 = self.z2 - HEIGHT_STEP;
        }
    }

    /// Writes heights and surface fields into the selected sector.
    pub fn commit_sector(&self, store: &mut GeometryStore) {
        let Some(s) = self.selected_sector().and_then(|i| store.sector_mut(i)) else {
            return;
        };
        s.z1 = self.z1;
        s.z2 = self.z2;
        s.st = self.st;
        s.ss = self.ss;
    }

    /// Writes wall texture and tiling into the selected wall, or into every
    /// wall of the selected sector when no single wall is selected.
    pub fn commit_walls(&self, store: &mut GeometryStore) {
        let Some(sector) = self.selected_sector() else {
            return;
        };
        let selected = self.selected_wall(store);
        if self.sel_w > 0 {
            if let Some(w) = selected.and_then(|i| store.wall_mut(i)) {
                w.wt = self.wt;
                w.u = self.wu;
                w.v = self.wv;
            }
            return;
        }
        for w in store.sector_walls_mut(sector) {
            w.wt = self.wt;
            w.u = self.wu;
            w.v = self.wv;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Sector, Wall};

    fn store_with_sectors(n: usize) -> GeometryStore {
        let mut store = GeometryStore::new();
        for i in 0..n {
            let ws = store.num_walls();
            let o = i as i32 * 64;
            let pts = [[o, 0], [o + 32, 0], [o + 32, 32], [o, 32]];
            for k in 0..4 {
                let mut w = Wall::degenerate(pts[k], k as i32, 1 + k as i32, 2);
                w.set_end(pts[(k + 1) % 4]);
                store.append_wall(w).unwrap();
            }
            store
                .append_sector(Sector {
                    ws,
                    we: ws + 4,
                    z1: 10 + i as i32,
                    z2: 50,
                    st: 3,
                    ss: 2,
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_sector_cycle_wraps_both_ways() {
        let store = store_with_sectors(2);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, 1);
        assert_eq!(ctx.sel_s, 1);
        ctx.cycle_sector(&store, 1);
        assert_eq!(ctx.sel_s, 2);
        ctx.cycle_sector(&store, 1);
        assert_eq!(ctx.sel_s, 0);
        ctx.cycle_sector(&store, -1);
        assert_eq!(ctx.sel_s, 2);
        ctx.cycle_sector(&store, -1);
        ctx.cycle_sector(&store, -1);
        assert_eq!(ctx.sel_s, 0);
        assert_eq!(ctx, EditContext::default());
    }

    #[test]
    fn test_selecting_sector_loads_fields() {
        let store = store_with_sectors(2);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, -1);
        assert_eq!(ctx.sel_s, 2);
        assert_eq!((ctx.z1, ctx.z2, ctx.st, ctx.ss), (11, 50, 3, 2));
        assert_eq!((ctx.wt, ctx.wu, ctx.wv), (0, 1, 2));
    }

    #[test]
    fn test_selecting_wall_loads_wall_fields() {
        let store = store_with_sectors(1);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, 1);
        ctx.cycle_wall(&store, 1).unwrap();
        ctx.cycle_wall(&store, 1).unwrap();
        assert_eq!(ctx.sel_w, 2);
        assert_eq!((ctx.wt, ctx.wu, ctx.wv), (1, 2, 2));
        ctx.cycle_wall(&store, -1).unwrap();
        ctx.cycle_wall(&store, -1).unwrap();
        ctx.cycle_wall(&store, -1).unwrap();
        assert_eq!(ctx.sel_w, 4);
    }

    #[test]
    fn test_wall_cycle_without_sector() {
        let store = store_with_sectors(1);
        let mut ctx = EditContext::default();
        assert!(matches!(
            ctx.cycle_wall(&store, 1),
            Err(EditorError::NothingSelected)
        ));
    }

    #[test]
    fn test_height_push_and_clamp() {
        let mut store = GeometryStore::new();
        let mut ctx = EditContext {
            z1: 0,
            z2: 5,
            ..EditContext::default()
        };
        ctx.step_top(&mut store, -1);
        assert_eq!((ctx.z1, ctx.z2), (0, 5));

        ctx.z1 = 30;
        ctx.z2 = 35;
        ctx.step_top(&mut store, -1);
        assert_eq!((ctx.z1, ctx.z2), (25, 30));
        ctx.step_bottom(&mut store, 1);
        assert_eq!((ctx.z1, ctx.z2), (30, 35));

        ctx.z1 = 90;
        ctx.z2 = 95;
        ctx.step_bottom(&mut store, 1);
        assert_eq!((ctx.z1, ctx.z2), (90, 95));
        ctx.step_top(&mut store, 1);
        assert_eq!(ctx.z2, 95);
    }

    #[test]
    fn test_texture_wrap_and_tile_clamp() {
        let mut store = GeometryStore::new();
        let mut ctx = EditContext::default();
        ctx.cycle_wall_texture(&mut store, -1, 20);
        assert_eq!(ctx.wt, 20);
        ctx.cycle_wall_texture(&mut store, 1, 20);
        assert_eq!(ctx.wt, 0);
        ctx.step_wall_u(&mut store, -1);
        assert_eq!(ctx.wu, 1);
        for _ in 0..12 {
            ctx.step_wall_v(&mut store, 1);
        }
        assert_eq!(ctx.wv, 9);
        ctx.cycle_surface_texture(&mut store, 1, 20);
        assert_eq!(ctx.st, 2);
    }

    #[test]
    fn test_commit_single_wall() {
        let mut store = store_with_sectors(1);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, 1);
        ctx.cycle_wall(&store, 1).unwrap();
        ctx.cycle_wall(&store, 1).unwrap();
        ctx.cycle_wall_texture(&mut store, 1, 20);
        assert_eq!(store.wall(1).unwrap().wt, 2);
        assert_eq!(store.wall(0).unwrap().wt, 0);
        assert_eq!(store.wall(2).unwrap().wt, 2);
    }

    #[test]
    fn test_commit_all_walls_when_none_selected() {
        let mut store = store_with_sectors(2);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, 1);
        ctx.step_wall_u(&mut store, 1);
        assert!(store.sector_walls(0).iter().all(|w| w.u == 2 && w.wt == 0));
        assert_eq!(store.sector_walls(1)[3].u, 4);
    }

    #[test]
    fn test_commit_sector_fields() {
        let mut store = store_with_sectors(1);
        let mut ctx = EditContext::default();
        ctx.cycle_sector(&store, 1);
        ctx.step_top(&mut store, 1);
        ctx.step_surface_scale(&mut store, 1);
        let s = store.sector(0).unwrap();
        assert_eq!((s.z1, s.z2, s.st, s.ss), (10, 55, 3, 3));
    }

    #[test]
    fn test_no_commit_without_selection() {
        let mut store = store_with_sectors(1);
        let before = store.clone();
        let mut ctx = EditContext::default();
        ctx.step_top(&mut store, 1);
        ctx.cycle_wall_texture(&mut store, 1, 20);
        assert_eq!(store, before);
    }
}
