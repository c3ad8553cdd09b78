//! Editor configuration, read from a TOML file next to the level.
//!
//! Every table falls back to its defaults, so a partial file only overrides
//! what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "sector-grid.toml";
pub const CONFIG_ENV: &str = "SECTOR_GRID_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub level_file: PathBuf,
    pub window: WindowConfig,
    pub view: ViewConfig,
    pub grid: GridConfig,
    pub nav: NavConfig,
    pub preview: PreviewConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            level_file: PathBuf::from("level.txt"),
            window: WindowConfig::default(),
            view: ViewConfig::default(),
            grid: GridConfig::default(),
            nav: NavConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: usize,       // internal framebuffer width
    pub height: usize,      // internal framebuffer height
    pub panel_width: usize, // view pixels reserved for the parameter panel
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
            panel_width: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub click_cell: i32, // quantization of canvas clicks, world units
    pub drag_cell: i32,  // snap of dragged endpoints, world units
    pub hit_radius: i32, // endpoint grab window, exclusive
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            click_cell: 32,
            drag_cell: 32,
            hit_radius: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub move_step: i32,
    pub turn_step: i32,
    pub climb_step: i32,
    pub start: [i32; 3],
    pub heading: i32,
    pub look: i32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            move_step: 10,
            turn_step: 4,
            climb_step: 4,
            start: [32 * 9, 48, 30],
            heading: 0,
            look: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub fov_deg: f32,
    pub look_step_px: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            fov_deg: 90.0,
            look_step_px: 4.0,
        }
    }
}

impl EditorConfig {
    /// Loads from `$SECTOR_GRID_CONFIG` or `sector-grid.toml`, falling back to
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                log::info!("CONFIG: {:?} not found, using defaults", path);
                return Self::default();
            }
        };
        match Self::from_toml(&content) {
            Ok(cfg) => {
                log::info!("CONFIG: loaded {:?}", path);
                cfg
            }
            Err(e) => {
                log::error!("CONFIG: failed to parse {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let mut cfg: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        cfg.sanitize();
        Ok(cfg)
    }

    // Zero or negative cells would break quantization.
    fn sanitize(&mut self) {
        self.view.width = self.view.width.max(self.view.panel_width + 16);
        self.view.height = self.view.height.max(16);
        self.grid.click_cell = self.grid.click_cell.max(1);
        self.grid.drag_cell = self.grid.drag_cell.max(1);
        self.grid.hit_radius = self.grid.hit_radius.max(1);
    }
}
