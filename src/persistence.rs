//! Plain-text level files.
//!
//! ```text
//! numSectors
//! ws we z1 z2 st ss          (one line per sector)
//! numWalls
//! x1 y1 x2 y2 wt u v shade   (one line per wall)
//!
//! x y z a l                  (player)
//! ```
//!
//! Reading is token based, so line breaks only matter for error messages.

use std::fmt::{self, Write as _};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::camera::NavState;
use crate::error::{EditorError, Result};
use crate::world::{GeometryStore, MAX_SECTORS, MAX_WALLS, Sector, Wall};

/// Everything a level file carries. `nav` is absent for an empty file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub store: GeometryStore,
    pub nav: Option<NavState>,
}

pub fn encode(store: &GeometryStore, nav: &NavState) -> String {
    let mut out = String::new();
    if store.num_sectors() > 0 {
        write_level(&mut out, store, nav).unwrap_or_else(|e| log::error!("LEVEL: {}", e));
    }
    out
}

fn write_level(out: &mut String, store: &GeometryStore, nav: &NavState) -> fmt::Result {
    writeln!(out, "{}", store.num_sectors())?;
    for s in store.sectors() {
        writeln!(out, "{} {} {} {} {} {}", s.ws, s.we, s.z1, s.z2, s.st, s.ss)?;
    }
    writeln!(out, "{}", store.num_walls())?;
    for w in store.walls() {
        writeln!(
            out,
            "{} {} {} {} {} {} {} {}",
            w.x1, w.y1, w.x2, w.y2, w.wt, w.u, w.v, w.shade
        )?;
    }
    writeln!(out)?;
    writeln!(out, "{} {} {} {} {}", nav.x, nav.y, nav.z, nav.a, nav.l)
}

struct Tokens<'a> {
    iter: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        let iter = content
            .lines()
            .enumerate()
            .flat_map(|(i, l)| l.split_whitespace().map(move |t| (i + 1, t)));
        Self {
            iter: Box::new(iter),
            line: 0,
        }
    }

    fn next_raw(&mut self) -> Option<&'a str> {
        let (line, tok) = self.iter.next()?;
        self.line = line;
        Some(tok)
    }

    fn int(&mut self, what: &str) -> Result<i32> {
        let Some(tok) = self.next_raw() else {
            return Err(EditorError::Parse {
                line: self.line,
                message: format!("unexpected end of file, expected {}", what),
            });
        };
        tok.parse::<i32>().map_err(|_| EditorError::Parse {
            line: self.line,
            message: format!("expected integer {}, found {:?}", what, tok),
        })
    }

    fn count(&mut self, what: &str, capacity: usize) -> Result<usize> {
        let n = self.int(what)?;
        if n < 0 || n as usize > capacity {
            return Err(EditorError::InvalidLevel(format!(
                "{} {} outside 0..={}",
                what, n, capacity
            )));
        }
        Ok(n as usize)
    }

    fn index(&mut self, what: &str) -> Result<usize> {
        let n = self.int(what)?;
        usize::try_from(n).map_err(|_| EditorError::Parse {
            line: self.line,
            message: format!("negative {} {}", what, n),
        })
    }
}

/// Parses a level, validating counts and wall ranges before anything is built.
pub fn decode(content: &str) -> Result<Level> {
    let mut t = Tokens::new(content);
    if content.trim().is_empty() {
        return Ok(Level {
            store: GeometryStore::new(),
            nav: None,
        });
    }

    let num_sectors = t.count("sector count", MAX_SECTORS)?;
    let mut sectors = Vec::with_capacity(num_sectors);
    for _ in 0..num_sectors {
        sectors.push(Sector {
            ws: t.index("ws")?,
            we: t.index("we")?,
            z1: t.int("z1")?,
            z2: t.int("z2")?,
            st: t.int("st")?,
            ss: t.int("ss")?,
        });
    }

    let num_walls = t.count("wall count", MAX_WALLS)?;
    let mut walls = Vec::with_capacity(num_walls);
    for _ in 0..num_walls {
        walls.push(Wall {
            x1: t.int("x1")?,
            y1: t.int("y1")?,
            x2: t.int("x2")?,
            y2: t.int("y2")?,
            wt: t.int("wt")?,
            u: t.int("u")?,
            v: t.int("v")?,
            shade: t.int("shade")?,
        });
    }

    let nav = match t.next_raw() {
        None => None,
        Some(first) => {
            let x = first.parse::<i32>().map_err(|_| EditorError::Parse {
                line: t.line,
                message: format!("expected integer x, found {:?}", first),
            })?;
            Some(NavState {
                x,
                y: t.int("y")?,
                z: t.int("z")?,
                a: t.int("a")?,
                l: t.int("l")?,
            })
        }
    };

    Ok(Level {
        store: GeometryStore::from_parts(sectors, walls)?,
        nav,
    })
}

/// Writes the level to `path`. With no sectors the file is truncated and
/// left empty.
pub fn save(path: &Path, store: &GeometryStore, nav: &NavState) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|source| EditorError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(encode(store, nav).as_bytes())?;
    log::info!(
        "LEVEL: saved {} sectors, {} walls to {:?}",
        store.num_sectors(),
        store.num_walls(),
        path
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<Level> {
    let content = fs::read_to_string(path).map_err(|source| EditorError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let level = decode(&content)?;
    log::info!(
        "LEVEL: loaded {} sectors, {} walls from {:?}",
        level.store.num_sectors(),
        level.store.num_walls(),
        path
    );
    Ok(level)
}
