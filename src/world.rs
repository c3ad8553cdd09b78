use std::ops::Range;

use crate::error::{ArenaKind, EditorError, Result};

pub const MAX_WALLS: usize = 256;
pub const MAX_SECTORS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall {
    pub x1: i32, // first endpoint in world units
    pub y1: i32,
    pub x2: i32, // second endpoint in world units
    pub y2: i32,
    pub wt: i32,    // wall texture id
    pub u: i32,     // horizontal tiling, 1..=9
    pub v: i32,     // vertical tiling, 1..=9
    pub shade: i32, // 0..=90, derived from the direction angle
}

impl Wall {
    /// A zero-length wall at `p`, used as the open edge while a sector is placed.
    pub fn degenerate(p: [i32; 2], wt: i32, u: i32, v: i32) -> Self {
        Self {
            x1: p[0],
            y1: p[1],
            x2: p[0],
            y2: p[1],
            wt,
            u,
            v,
            shade: 0,
        }
    }

    #[inline]
    pub fn start(&self) -> [i32; 2] {
        [self.x1, self.y1]
    }

    #[inline]
    pub fn end(&self) -> [i32; 2] {
        [self.x2, self.y2]
    }

    pub fn set_start(&mut self, p: [i32; 2]) {
        self.x1 = p[0];
        self.y1 = p[1];
    }

    pub fn set_end(&mut self, p: [i32; 2]) {
        self.x2 = p[0];
        self.y2 = p[1];
    }

    /// Recomputes `shade` from the current endpoints.
    pub fn update_shade(&mut self) {
        self.shade = direction_shade(self.x2 - self.x1, self.y2 - self.y1);
    }
}

/// Folds the direction angle of `(dx, dy)` into a lighting proxy in [0, 90].
///
/// The angle in degrees [0, 360) is reflected around 180 and then around 90, so
/// axis-aligned walls alternate between 0 and 90 as the direction turns.
pub fn direction_shade(dx: i32, dy: i32) -> i32 {
    let deg = (dy as f64).atan2(dx as f64).to_degrees().rem_euclid(360.0);
    // Nudge so exact axis angles survive the f64 round trip before truncation.
    let mut shade = ((deg + 1e-6) as i32) % 360;
    if shade > 180 {
        shade = 180 - (shade - 180);
    }
    if shade > 90 {
        shade = 90 - (shade - 90);
    }
    shade
}

/// Rounds each coordinate to the nearest multiple of `cell`.
pub fn snap(p: [i32; 2], cell: i32) -> [i32; 2] {
    let half = cell / 2;
    p.map(|v| (v + half).div_euclid(cell) * cell)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    pub ws: usize, // first wall index
    pub we: usize, // one past the last wall index
    pub z1: i32,   // bottom height
    pub z2: i32,   // top height
    pub st: i32,   // floor/ceiling texture id
    pub ss: i32,   // surface scale
}

impl Sector {
    #[inline]
    pub fn walls(&self) -> Range<usize> {
        self.ws..self.we
    }

    #[inline]
    pub fn wall_count(&self) -> usize {
        self.we.saturating_sub(self.ws)
    }
}

/// Fixed-capacity arenas of walls and sectors. Sector wall ranges partition a
/// prefix of the wall arena in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryStore {
    walls: Vec<Wall>,
    sectors: Vec<Sector>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self {
            walls: Vec::with_capacity(MAX_WALLS),
            sectors: Vec::with_capacity(MAX_SECTORS),
        }
    }

    /// Builds a store from loaded records, rejecting anything that breaks the
    /// arena capacities or points outside the wall arena.
    pub fn from_parts(sectors: Vec<Sector>, walls: Vec<Wall>) -> Result<Self> {
        if sectors.len() > MAX_SECTORS {
            return Err(EditorError::InvalidLevel(format!(
                "{} sectors exceed capacity {}",
                sectors.len(),
                MAX_SECTORS
            )));
        }
        if walls.len() > MAX_WALLS {
            return Err(EditorError::InvalidLevel(format!(
                "{} walls exceed capacity {}",
                walls.len(),
                MAX_WALLS
            )));
        }
        for (i, s) in sectors.iter().enumerate() {
            if s.ws > s.we || s.we > walls.len() {
                return Err(EditorError::InvalidLevel(format!(
                    "sector {} wall range {}..{} outside {} walls",
                    i,
                    s.ws,
                    s.we,
                    walls.len()
                )));
            }
        }
        Ok(Self { walls, sectors })
    }

    pub fn num_walls(&self) -> usize {
        self.walls.len()
    }

    pub fn num_sectors(&self) -> usize {
        self.sectors.len()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn wall(&self, index: usize) -> Option<&Wall> {
        self.walls.get(index)
    }

    pub fn wall_mut(&mut self, index: usize) -> Option<&mut Wall> {
        self.walls.get_mut(index)
    }

    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    pub fn sector_mut(&mut self, index: usize) -> Option<&mut Sector> {
        self.sectors.get_mut(index)
    }

    /// Walls bounding sector `index`; empty if the index is out of range.
    pub fn sector_walls(&self, index: usize) -> &[Wall] {
        match self.sectors.get(index) {
            Some(s) => self.walls.get(s.walls()).unwrap_or(&[]),
            None => &[],
        }
    }

    pub fn sector_walls_mut(&mut self, index: usize) -> &mut [Wall] {
        match self.sectors.get(index) {
            Some(s) => {
                let range = s.walls();
                self.walls.get_mut(range).unwrap_or(&mut [])
            }
            None => &mut [],
        }
    }

    pub fn append_wall(&mut self, wall: Wall) -> Result<usize> {
        if self.walls.len() >= MAX_WALLS {
            return Err(EditorError::CapacityExceeded {
                kind: ArenaKind::Walls,
                capacity: MAX_WALLS,
            });
        }
        self.walls.push(wall);
        Ok(self.walls.len() - 1)
    }

    pub fn append_sector(&mut self, sector: Sector) -> Result<usize> {
        if self.sectors.len() >= MAX_SECTORS {
            return Err(EditorError::CapacityExceeded {
                kind: ArenaKind::Sectors,
                capacity: MAX_SECTORS,
            });
        }
        self.sectors.push(sector);
        Ok(self.sectors.len() - 1)
    }

    pub fn has_wall_room(&self, n: usize) -> bool {
        self.walls.len() + n <= MAX_WALLS
    }

    pub fn has_sector_room(&self) -> bool {
        self.sectors.len() < MAX_SECTORS
    }

    /// Drops the most recently appended wall.
    pub fn pop_wall(&mut self) -> Option<Wall> {
        self.walls.pop()
    }

    /// Drops the most recently appended sector.
    pub fn pop_sector(&mut self) -> Option<Sector> {
        self.sectors.pop()
    }

    /// Removes sector `index` (0-based) together with its walls.
    ///
    /// Later sectors shift down one slot and their wall ranges are remapped
    /// onto the compacted wall arena, so the wall count shrinks by exactly
    /// the removed sector's wall count.
    pub fn remove_sector(&mut self, index: usize) -> Option<Sector> {
        if index >= self.sectors.len() {
            return None;
        }
        let removed = self.sectors.remove(index);
        let count = removed.wall_count();
        let end = removed.we.min(self.walls.len());
        let start = removed.ws.min(end);
        self.walls.drain(start..end);
        for s in self.sectors.iter_mut() {
            if s.ws >= removed.we {
                s.ws -= count;
                s.we -= count;
            }
        }
        Some(removed)
    }

    /// True when the last wall of the sector ends where the first one starts.
    pub fn is_closed(&self, index: usize) -> bool {
        let walls = self.sector_walls(index);
        match (walls.first(), walls.last()) {
            (Some(first), Some(last)) => last.end() == first.start(),
            _ => false,
        }
    }

    /// Twice the signed area of the sector boundary; positive when the walls
    /// run counter-clockwise with y pointing up.
    pub fn signed_area2(&self, index: usize) -> i64 {
        self.sector_walls(index)
            .iter()
            .map(|w| w.x1 as i64 * w.y2 as i64 - w.x2 as i64 * w.y1 as i64)
            .sum()
    }
}
