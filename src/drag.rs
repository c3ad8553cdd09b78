//! Moving wall endpoints with a held secondary button.
//!
//! Two slots are tracked: one for a wall whose first endpoint is under the
//! pointer and one for a wall whose second endpoint is. A vertex shared by two
//! consecutive walls fills both, so both ends move together and the boundary
//! stays closed. Shades are not recomputed.

use crate::world::{GeometryStore, snap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grab {
    pub wall: usize,
    pub endpoint: Endpoint,
}

#[derive(Debug, Default)]
pub struct DragEditor {
    starts: Option<Grab>,
    ends: Option<Grab>,
}

/// True when `p` lies strictly within `radius` of `q` on both axes.
#[inline]
fn near(p: [i32; 2], q: [i32; 2], radius: i32) -> bool {
    (p[0] - q[0]).abs() < radius && (p[1] - q[1]).abs() < radius
}

impl DragEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_grabbing(&self) -> bool {
        self.starts.is_some() || self.ends.is_some()
    }

    pub fn grabs(&self) -> impl Iterator<Item = Grab> + '_ {
        self.starts.iter().chain(self.ends.iter()).copied()
    }

    /// Endpoints of sector walls near `p`; the last match wins in each slot.
    pub fn hit_test(
        store: &GeometryStore,
        p: [i32; 2],
        radius: i32,
    ) -> (Option<Grab>, Option<Grab>) {
        let mut starts = None;
        let mut ends = None;
        for s in store.sectors() {
            for wall in s.walls() {
                let Some(w) = store.wall(wall) else {
                    continue;
                };
                if near(p, w.start(), radius) {
                    starts = Some(Grab {
                        wall,
                        endpoint: Endpoint::Start,
                    });
                }
                if near(p, w.end(), radius) {
                    ends = Some(Grab {
                        wall,
                        endpoint: Endpoint::End,
                    });
                }
            }
        }
        (starts, ends)
    }

    /// Called every frame the gesture is held with the quantized pointer.
    /// Grabs endpoints the first time the pointer is over one and keeps
    /// them until release.
    pub fn hold(&mut self, store: &GeometryStore, p: [i32; 2], radius: i32) {
        if self.is_grabbing() {
            return;
        }
        let (starts, ends) = Self::hit_test(store, p, radius);
        self.starts = starts;
        self.ends = ends;
        if self.is_grabbing() {
            log::debug!("DRAG: grabbed {:?} {:?}", self.starts, self.ends);
        }
    }

    /// Moves every grabbed endpoint to the raw pointer position snapped to
    /// `cell`.
    pub fn move_to(&self, store: &mut GeometryStore, raw: [i32; 2], cell: i32) {
        let p = snap(raw, cell);
        for g in self.grabs() {
            let Some(w) = store.wall_mut(g.wall) else {
                continue;
            };
            match g.endpoint {
                Endpoint::Start => w.set_start(p),
                Endpoint::End => w.set_end(p),
            }
        }
    }

    pub fn release(&mut self) {
        if self.is_grabbing() {
            log::debug!("DRAG: released");
        }
        self.starts = None;
        self.ends = None;
    }
}
