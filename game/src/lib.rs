pub mod board;
pub mod debug;
pub mod editor_actions;
pub mod editor_api;
pub mod error;
pub mod grid;
pub mod levels;
pub mod logging;
pub mod nodes;
pub mod occupancy;
pub mod path;
pub mod playtest;
pub mod render;
pub mod serde_cell_map;
pub mod session;
pub mod settings;
pub mod state;
pub mod view;
