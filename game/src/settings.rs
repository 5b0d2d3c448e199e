use std::fs;
use std::io;
use std::path::PathBuf;

use engine::graphics::Color;
use serde::{Deserialize, Serialize};

use crate::grid::{GridGeometry, WorldPos};
use crate::levels::PaletteOverflow;

const MAX_GRID_SIDE: i32 = 64;
const MAX_PALETTE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridSettings {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
    pub origin: WorldPos,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cell_size: 1.0,
            origin: WorldPos::ZERO,
        }
    }
}

impl GridSettings {
    pub fn clamp(mut self) -> Self {
        self.width = self.width.clamp(1, MAX_GRID_SIDE);
        self.height = self.height.clamp(1, MAX_GRID_SIDE);
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            self.cell_size = 1.0;
        }
        self
    }

    pub fn geometry(self) -> GridGeometry {
        GridGeometry::new(self.width, self.height, self.cell_size, self.origin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameplaySettings {
    pub nodes_per_color: usize,
    pub palette_overflow: PaletteOverflow,
    /// Level file to play instead of the built-in rounds.
    pub levels_path: Option<PathBuf>,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            nodes_per_color: 2,
            palette_overflow: PaletteOverflow::Clamp,
            levels_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaletteSettings {
    pub colors: Vec<Color>,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            colors: vec![
                [255, 0, 0, 255],
                [0, 255, 0, 255],
                [0, 0, 255, 255],
                [255, 235, 4, 255],
            ],
        }
    }
}

impl PaletteSettings {
    /// Color for `color_id`, clamped to the last entry.
    pub fn color(&self, color_id: u8) -> Color {
        self.colors
            .get(color_id as usize)
            .or_else(|| self.colors.last())
            .copied()
            .unwrap_or([255, 255, 255, 255])
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PuzzleSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub gameplay: GameplaySettings,
    #[serde(default)]
    pub palette: PaletteSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            grid: GridSettings::default(),
            gameplay: GameplaySettings::default(),
            palette: PaletteSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl PuzzleSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.grid = self.grid.clamp();
        self.gameplay.nodes_per_color = self.gameplay.nodes_per_color.max(1);
        if self.palette.colors.is_empty() {
            self.palette = PaletteSettings::default();
        }
        self.palette.colors.truncate(MAX_PALETTE_LEN);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("FLOWGRID_SETTINGS_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("flowgrid");
        path.push("settings.json");
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn load(&self) -> PuzzleSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PuzzleSettings::default();
        };
        match serde_json::from_slice::<PuzzleSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable settings");
                PuzzleSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PuzzleSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
