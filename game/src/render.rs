//! Draws a `GameState` through `Renderer2d` and maps screen pixels back to world positions.

use engine::graphics::{Color, Renderer2d, text_width};
use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Rect};

use crate::grid::{Cell, GridGeometry, WorldPos};
use crate::settings::PaletteSettings;
use crate::state::GameState;
use crate::view::GameView;

const COLOR_BACKGROUND: Color = [10, 10, 14, 255];
const COLOR_BOARD: Color = [22, 22, 30, 255];
const COLOR_GRID_LINE: Color = [40, 40, 55, 255];
const COLOR_TEXT: Color = [235, 235, 245, 255];
const COLOR_BANNER: Color = [0, 0, 0, 255];

const HUD_HEIGHT: u32 = 28;
const MARGIN: u32 = 12;
const TEXT_SCALE: u32 = 3;
const PATH_ALPHA: u8 = 110;
const TRAIL_ALPHA: u8 = 70;

/// Where the board sits on screen for a given surface size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub board: Rect,
    pub hud: Rect,
    pub cell_px: u32,
    grid_w: u32,
    grid_h: u32,
}

impl BoardLayout {
    /// Largest square cells that fit below the HUD strip, centred horizontally.
    pub fn fit(size: SurfaceSize, geometry: &GridGeometry) -> Self {
        let grid_w = geometry.width.max(1) as u32;
        let grid_h = geometry.height.max(1) as u32;
        let hud = Rect::new(0, 0, size.width, HUD_HEIGHT.min(size.height));
        let area = Rect::new(
            0,
            hud.bottom(),
            size.width,
            size.height.saturating_sub(hud.h),
        )
        .inset(MARGIN);

        let cell_px = (area.w / grid_w).min(area.h / grid_h).max(1);
        let board = area.place(cell_px * grid_w, cell_px * grid_h, Anchor::Center);

        Self {
            board,
            hud,
            cell_px,
            grid_w,
            grid_h,
        }
    }

    /// Screen rect of `cell`. Row 0 is drawn at the bottom.
    pub fn cell_rect(&self, cell: Cell) -> Option<Rect> {
        if cell.x < 0 || cell.y < 0 || cell.x as u32 >= self.grid_w || cell.y as u32 >= self.grid_h
        {
            return None;
        }
        let row_from_top = self.grid_h - 1 - cell.y as u32;
        Some(Rect::new(
            self.board.x + cell.x as u32 * self.cell_px,
            self.board.y + row_from_top * self.cell_px,
            self.cell_px,
            self.cell_px,
        ))
    }

    /// World position under a screen pixel. Cell centres map to whole cell coordinates.
    pub fn screen_to_world(&self, px: u32, py: u32, geometry: &GridGeometry) -> WorldPos {
        let cell_px = self.cell_px as f32;
        let cx = (px as f32 - self.board.x as f32) / cell_px - 0.5;
        let cy = self.grid_h as f32 - 0.5 - (py as f32 - self.board.y as f32) / cell_px;
        WorldPos::new(
            geometry.origin.x + cx * geometry.cell_size,
            geometry.origin.y + cy * geometry.cell_size,
        )
    }

    fn link_rect(&self, a: Cell, b: Cell) -> Option<Rect> {
        let ra = self.cell_rect(a)?;
        let rb = self.cell_rect(b)?;
        let t = (self.cell_px / 3).max(1);
        let (ax, ay) = ra.center();
        let (bx, by) = rb.center();
        let x0 = ax.min(bx).saturating_sub(t / 2);
        let y0 = ay.min(by).saturating_sub(t / 2);
        Some(Rect::new(
            x0,
            y0,
            ax.abs_diff(bx) + t,
            ay.abs_diff(by) + t,
        ))
    }
}

pub fn draw_game(
    gfx: &mut dyn Renderer2d,
    state: &GameState,
    palette: &PaletteSettings,
    layout: &BoardLayout,
) {
    gfx.clear(COLOR_BACKGROUND);
    gfx.fill_rect(layout.board, COLOR_BOARD);
    for cell in state.geometry().cells() {
        if let Some(rect) = layout.cell_rect(cell) {
            gfx.rect_outline(rect, COLOR_GRID_LINE);
        }
    }

    for (_, path) in state.board().paths() {
        draw_line(gfx, layout, path.cells(), palette.color(path.color()), PATH_ALPHA);
    }
    if let Some(session) = state.session() {
        draw_line(gfx, layout, session.trail(), palette.color(session.color()), TRAIL_ALPHA);
    }

    for marker in state.board().nodes().iter() {
        let Some(rect) = layout.cell_rect(marker.cell) else {
            continue;
        };
        let (cx, cy) = rect.center();
        let radius = (layout.cell_px * 3 / 8).max(1);
        if marker.is_connected() {
            gfx.fill_disc(cx, cy, radius + 2, COLOR_TEXT);
        }
        gfx.fill_disc(cx, cy, radius, palette.color(marker.color));
    }

    draw_hud(gfx, state, layout);
}

fn draw_line(
    gfx: &mut dyn Renderer2d,
    layout: &BoardLayout,
    cells: &[Cell],
    color: Color,
    alpha: u8,
) {
    for cell in cells {
        if let Some(rect) = layout.cell_rect(*cell) {
            gfx.blend_rect(rect.inset(1), color, alpha);
        }
    }
    for pair in cells.windows(2) {
        if let Some(rect) = layout.link_rect(pair[0], pair[1]) {
            gfx.fill_rect(rect, color);
        }
    }
}

fn draw_hud(gfx: &mut dyn Renderer2d, state: &GameState, layout: &BoardLayout) {
    let label = format!("ROUND {}/{}", state.round(), state.max_rounds());
    draw_centered(gfx, layout.hud, &label, Anchor::Center);

    let banner = match state.view {
        GameView::Playing => return,
        GameView::RoundComplete => "CLEAR! N: NEXT",
        GameView::GameComplete => "ALL ROUNDS CLEAR!",
    };
    gfx.blend_rect(layout.board, COLOR_BANNER, 150);
    draw_centered(gfx, layout.board, banner, Anchor::Center);
}

fn draw_centered(gfx: &mut dyn Renderer2d, area: Rect, text: &str, anchor: Anchor) {
    let w = text_width(text, TEXT_SCALE);
    let h = 5 * TEXT_SCALE;
    let at = area.place(w, h, anchor);
    gfx.draw_text_scaled(at.x, at.y, text, COLOR_TEXT, TEXT_SCALE);
}
