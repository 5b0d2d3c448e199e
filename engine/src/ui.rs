//! Screen-space layout primitives.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Shrinks every side by `px`, saturating at an empty rect.
    pub fn inset(&self, px: u32) -> Self {
        let dx = px.min(self.w / 2);
        let dy = px.min(self.h / 2);
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w - 2 * dx,
            h: self.h - 2 * dy,
        }
    }

    /// Places a `w` x `h` child inside this rect. The child is clamped to fit.
    pub fn place(&self, w: u32, h: u32, anchor: Anchor) -> Self {
        let w = w.min(self.w);
        let h = h.min(self.h);
        let x = self.x + (self.w - w) / 2;
        let y = match anchor {
            Anchor::TopCenter => self.y,
            Anchor::Center => self.y + (self.h - h) / 2,
            Anchor::BottomCenter => self.y + (self.h - h),
        };
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopCenter,
    Center,
    BottomCenter,
}
