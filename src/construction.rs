//! Click-driven construction of new sectors.
//!
//! Arming makes the next canvas click open a sector with a single zero-length
//! wall. Each further click fixes the open wall's second endpoint and either
//! closes the sector (the point is the sector's first vertex) or continues
//! with a new zero-length wall from that point.

use crate::error::{ArenaKind, EditorError, Result};
use crate::selection::EditContext;
use crate::world::{GeometryStore, MAX_SECTORS, MAX_WALLS, Sector, Wall};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructionState {
    #[default]
    Idle,
    /// The next canvas click starts a sector.
    Armed,
    /// Sector `sector` is open and accumulating walls.
    Placing { sector: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Started,
    Extended,
    Closed,
}

#[derive(Debug, Default)]
pub struct ConstructionStateMachine {
    state: ConstructionState,
}

impl ConstructionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConstructionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ConstructionState::Idle
    }

    /// The "add sector" command. Toggles between idle and armed; while
    /// placing it discards the open sector instead.
    pub fn toggle_arm(&mut self, store: &mut GeometryStore) -> ConstructionState {
        self.state = match self.state {
            ConstructionState::Idle => {
                log::info!("BUILD: armed");
                ConstructionState::Armed
            }
            ConstructionState::Armed => {
                log::info!("BUILD: disarmed");
                ConstructionState::Idle
            }
            ConstructionState::Placing { sector } => {
                rollback(store, sector);
                log::info!("BUILD: open sector {} discarded", sector);
                ConstructionState::Idle
            }
        };
        self.state
    }

    /// Drops any construction in progress without touching the store. Used
    /// when the store is replaced wholesale.
    pub fn reset(&mut self) {
        self.state = ConstructionState::Idle;
    }

    /// Handles a quantized canvas click at world position `p`.
    pub fn click(
        &mut self,
        store: &mut GeometryStore,
        ctx: &EditContext,
        p: [i32; 2],
    ) -> Result<ClickOutcome> {
        match self.state {
            ConstructionState::Idle => Ok(ClickOutcome::Ignored),
            ConstructionState::Armed => {
                let sector = start_sector(store, ctx, p)?;
                self.state = ConstructionState::Placing { sector };
                log::info!("BUILD: sector {} started at {:?}", sector, p);
                Ok(ClickOutcome::Started)
            }
            ConstructionState::Placing { sector } => {
                let outcome = place_point(store, ctx, sector, p);
                match outcome {
                    Ok(ClickOutcome::Closed) => {
                        self.state = ConstructionState::Idle;
                        log::info!(
                            "BUILD: sector {} closed with {} walls",
                            sector,
                            store.sector(sector).map_or(0, |s| s.wall_count())
                        );
                        if !store.is_closed(sector) {
                            log::warn!("BUILD: sector {} closed with a gap", sector);
                        } else if store.signed_area2(sector) <= 0 {
                            log::warn!("BUILD: sector {} does not wind counter clockwise", sector);
                        }
                    }
                    Err(EditorError::WindingViolation) => {
                        self.state = ConstructionState::Idle;
                    }
                    _ => {}
                }
                outcome
            }
        }
    }
}

fn start_sector(store: &mut GeometryStore, ctx: &EditContext, p: [i32; 2]) -> Result<usize> {
    if !store.has_sector_room() {
        return Err(EditorError::CapacityExceeded {
            kind: ArenaKind::Sectors,
            capacity: MAX_SECTORS,
        });
    }
    let ws = store.append_wall(Wall::degenerate(p, ctx.wt, ctx.wu, ctx.wv))?;
    store.append_sector(Sector {
        ws,
        we: ws + 1,
        z1: ctx.z1,
        z2: ctx.z2,
        st: ctx.st,
        ss: ctx.ss,
    })
}

fn place_point(
    store: &mut GeometryStore,
    ctx: &EditContext,
    sector: usize,
    p: [i32; 2],
) -> Result<ClickOutcome> {
    let Some(&s) = store.sector(sector) else {
        return Err(EditorError::InvalidLevel(format!(
            "open sector {} is missing",
            sector
        )));
    };
    let Some(&first) = store.wall(s.ws) else {
        return Err(EditorError::InvalidLevel(format!(
            "open sector {} has no walls",
            sector
        )));
    };

    // Only the first edge is checked: it must run towards +x.
    if s.wall_count() == 1 && p[0] <= first.x1 {
        rollback(store, sector);
        return Err(EditorError::WindingViolation);
    }

    let closing = p == first.start();
    if !closing && !store.has_wall_room(1) {
        return Err(EditorError::CapacityExceeded {
            kind: ArenaKind::Walls,
            capacity: MAX_WALLS,
        });
    }

    let last = s.we - 1;
    if let Some(w) = store.wall_mut(last) {
        w.set_end(p);
        w.update_shade();
        w.wt = ctx.wt;
        w.u = ctx.wu;
        w.v = ctx.wv;
    }
    if closing {
        return Ok(ClickOutcome::Closed);
    }

    store.append_wall(Wall::degenerate(p, ctx.wt, ctx.wu, ctx.wv))?;
    if let Some(s) = store.sector_mut(sector) {
        s.we += 1;
    }
    Ok(ClickOutcome::Extended)
}

/// Removes the open sector and its walls; both are always at the tail of
/// their arenas.
fn rollback(store: &mut GeometryStore, sector: usize) {
    let Some(&s) = store.sector(sector) else {
        return;
    };
    while store.num_walls() > s.ws {
        store.pop_wall();
    }
    while store.num_sectors() > sector {
        store.pop_sector();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> (ConstructionStateMachine, GeometryStore, EditContext) {
        let mut store = GeometryStore::new();
        let mut csm = ConstructionStateMachine::new();
        csm.toggle_arm(&mut store);
        (csm, store, EditContext::default())
    }

    #[test]
    fn test_arm_toggles() {
        let (mut csm, mut store, _) = armed();
        assert_eq!(csm.state(), ConstructionState::Armed);
        assert_eq!(csm.toggle_arm(&mut store), ConstructionState::Idle);
    }

    #[test]
    fn test_idle_click_ignored() {
        let mut store = GeometryStore::new();
        let mut csm = ConstructionStateMachine::new();
        let out = csm.click(&mut store, &EditContext::default(), [0, 0]).unwrap();
        assert_eq!(out, ClickOutcome::Ignored);
        assert_eq!(store.num_walls(), 0);
    }

    #[test]
    fn test_square_sector() {
        let (mut csm, mut store, ctx) = armed();
        assert_eq!(csm.click(&mut store, &ctx, [0, 0]).unwrap(), ClickOutcome::Started);
        let w = store.wall(0).unwrap();
        assert_eq!((w.start(), w.end()), ([0, 0], [0, 0]));
        assert_eq!(csm.state(), ConstructionState::Placing { sector: 0 });

        for p in [[32, 0], [32, 32], [0, 32]] {
            assert_eq!(csm.click(&mut store, &ctx, p).unwrap(), ClickOutcome::Extended);
        }
        assert_eq!(csm.click(&mut store, &ctx, [0, 0]).unwrap(), ClickOutcome::Closed);
        assert!(csm.is_idle());

        assert_eq!(store.num_walls(), 4);
        let s = store.sector(0).unwrap();
        assert_eq!((s.ws, s.we), (0, 4));
        assert_eq!((s.z1, s.z2, s.st, s.ss), (0, 40, 1, 4));
        let shades: Vec<i32> = store.walls().iter().map(|w| w.shade).collect();
        assert_eq!(shades, vec![0, 90, 0, 90]);
        assert!(store.is_closed(0));
        assert!(store.signed_area2(0) > 0);
    }

    #[test]
    fn test_winding_guard_rolls_back() {
        let mut store = GeometryStore::new();
        let mut csm = ConstructionStateMachine::new();
        let ctx = EditContext::default();

        // an existing sector must survive the abort untouched
        csm.toggle_arm(&mut store);
        for p in [[0, 0], [32, 0], [32, 32], [0, 0]] {
            csm.click(&mut store, &ctx, p).unwrap();
        }
        let before = store.clone();

        csm.toggle_arm(&mut store);
        csm.click(&mut store, &ctx, [64, 64]).unwrap();
        assert_eq!(store.num_walls(), 4);
        let err = csm.click(&mut store, &ctx, [64, 96]);
        assert!(matches!(err, Err(EditorError::WindingViolation)));
        assert!(csm.is_idle());
        assert_eq!(store, before);
    }

    #[test]
    fn test_winding_only_checks_first_edge() {
        let (mut csm, mut store, ctx) = armed();
        csm.click(&mut store, &ctx, [0, 0]).unwrap();
        csm.click(&mut store, &ctx, [32, 0]).unwrap();
        // going back in x on a later edge is accepted
        assert_eq!(
            csm.click(&mut store, &ctx, [-32, 32]).unwrap(),
            ClickOutcome::Extended
        );
    }

    #[test]
    fn test_edit_context_textures_committed() {
        let (mut csm, mut store, mut ctx) = armed();
        ctx.wt = 7;
        ctx.wu = 3;
        ctx.wv = 2;
        for p in [[0, 0], [64, 0], [32, 32], [0, 0]] {
            csm.click(&mut store, &ctx, p).unwrap();
        }
        assert!(store.walls().iter().all(|w| (w.wt, w.u, w.v) == (7, 3, 2)));
    }

    #[test]
    fn test_toggle_while_placing_discards() {
        let (mut csm, mut store, ctx) = armed();
        csm.click(&mut store, &ctx, [0, 0]).unwrap();
        csm.click(&mut store, &ctx, [32, 0]).unwrap();
        assert_eq!(store.num_walls(), 2);
        assert_eq!(csm.toggle_arm(&mut store), ConstructionState::Idle);
        assert_eq!(store.num_walls(), 0);
        assert_eq!(store.num_sectors(), 0);
    }

    #[test]
    fn test_wall_capacity_while_placing() {
        let (mut csm, mut store, ctx) = armed();
        for _ in 0..MAX_WALLS - 2 {
            store.append_wall(Wall::degenerate([0, 0], 0, 1, 1)).unwrap();
        }
        csm.click(&mut store, &ctx, [0, 0]).unwrap();
        csm.click(&mut store, &ctx, [32, 0]).unwrap();
        assert_eq!(store.num_walls(), MAX_WALLS);

        let err = csm.click(&mut store, &ctx, [32, 32]);
        assert!(matches!(
            err,
            Err(EditorError::CapacityExceeded {
                kind: ArenaKind::Walls,
                ..
            })
        ));
        // still placing, and closing needs no new slot
        assert_eq!(csm.state(), ConstructionState::Placing { sector: 0 });
        assert_eq!(csm.click(&mut store, &ctx, [0, 0]).unwrap(), ClickOutcome::Closed);
    }

    #[test]
    fn test_start_without_sector_room() {
        let (mut csm, mut store, ctx) = armed();
        let full = Sector {
            ws: 0,
            we: 0,
            z1: 0,
            z2: 40,
            st: 1,
            ss: 4,
        };
        for _ in 0..MAX_SECTORS {
            store.append_sector(full).unwrap();
        }
        let err = csm.click(&mut store, &ctx, [0, 0]);
        assert!(matches!(
            err,
            Err(EditorError::CapacityExceeded {
                kind: ArenaKind::Sectors,
                ..
            })
        ));
        assert_eq!(csm.state(), ConstructionState::Armed);
        assert_eq!(store.num_walls(), 0);
        assert_eq!(store.num_sectors(), MAX_SECTORS);
    }

    #[test]
    fn test_start_without_wall_room() {
        let (mut csm, mut store, ctx) = armed();
        for _ in 0..MAX_WALLS {
            store.append_wall(Wall::degenerate([0, 0], 0, 1, 1)).unwrap();
        }
        assert!(csm.click(&mut store, &ctx, [0, 0]).is_err());
        assert_eq!(csm.state(), ConstructionState::Armed);
        assert_eq!(store.num_sectors(), 0);
    }
}
