use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::grid::Cell;
use crate::nodes::ColorId;

/// What to do when a level has more color groups than the palette, or a short last group.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaletteOverflow {
    /// Extra groups reuse the last palette color.
    #[default]
    Clamp,
    /// Reject the level at load time.
    Reject,
}

/// One round: authored marker cells, colored in consecutive groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Level {
    #[serde(with = "cell_pairs")]
    pub nodes: Vec<Cell>,
}

impl Level {
    pub fn new(nodes: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Cell::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelSet {
    pub levels: Vec<Level>,
}

impl LevelSet {
    /// The five 5x5 rounds shipped with the game (four colors, two markers each).
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                Level::new([(1, 4), (2, 2), (3, 3), (4, 0), (1, 1), (4, 4), (4, 1), (4, 3)]),
                Level::new([(0, 4), (1, 0), (1, 4), (4, 4), (1, 3), (2, 0), (1, 1), (3, 2)]),
                Level::new([(0, 4), (1, 2), (1, 3), (4, 1), (1, 1), (3, 3), (3, 4), (4, 2)]),
                Level::new([(1, 0), (4, 2), (1, 1), (2, 2), (1, 3), (4, 1), (2, 1), (4, 0)]),
                Level::new([(0, 4), (4, 2), (1, 4), (2, 1), (3, 4), (3, 1), (3, 3), (4, 4)]),
            ],
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let set: LevelSet = serde_json::from_str(text)?;
        if set.levels.is_empty() {
            return Err(PuzzleError::NoLevels);
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// 1-based lookup.
    pub fn round(&self, round: usize) -> Result<&Level> {
        round
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .ok_or(PuzzleError::UnknownRound {
                round,
                max: self.levels.len(),
            })
    }

    /// Checks every level against the palette under `policy`.
    pub fn validate(
        &self,
        nodes_per_color: usize,
        palette_len: usize,
        policy: PaletteOverflow,
    ) -> Result<()> {
        for level in &self.levels {
            assign_colors(&level.nodes, nodes_per_color, palette_len, policy)?;
        }
        Ok(())
    }
}

/// Groups `nodes` into runs of `nodes_per_color`, giving each run the next color id.
pub fn assign_colors(
    nodes: &[Cell],
    nodes_per_color: usize,
    palette_len: usize,
    policy: PaletteOverflow,
) -> Result<Vec<(Cell, ColorId)>> {
    if palette_len == 0 {
        return Err(PuzzleError::EmptyPalette);
    }
    if nodes_per_color == 0 {
        return Err(PuzzleError::ZeroNodesPerColor);
    }

    if policy == PaletteOverflow::Reject {
        if nodes.len() % nodes_per_color != 0 {
            return Err(PuzzleError::IncompleteColorGroup {
                nodes: nodes.len(),
                nodes_per_color,
            });
        }
        let groups = nodes.len() / nodes_per_color;
        if groups > palette_len {
            return Err(PuzzleError::PaletteOverflow {
                groups,
                colors: palette_len,
            });
        }
    }

    let last = (palette_len - 1).min(ColorId::MAX as usize);
    Ok(nodes
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let color = (i / nodes_per_color).min(last) as ColorId;
            (*cell, color)
        })
        .collect())
}

/// `assign_colors` with the clamping policy.
pub fn clamp_colors(
    nodes: &[Cell],
    nodes_per_color: usize,
    palette_len: usize,
) -> Result<Vec<(Cell, ColorId)>> {
    assign_colors(nodes, nodes_per_color, palette_len, PaletteOverflow::Clamp)
}

/// Level files write cells as `[x, y]` pairs.
mod cell_pairs {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::grid::Cell;

    pub fn serialize<S>(cells: &[Cell], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(cells.iter().map(|c| [c.x, c.y]))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Cell>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<[i32; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Cell::new(x, y)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(n: i32) -> Vec<Cell> {
        (0..n).map(|i| Cell::new(i, 0)).collect()
    }

    #[test]
    fn colors_advance_every_group() {
        let placed = clamp_colors(&cells(6), 2, 4).unwrap();
        let colors: Vec<ColorId> = placed.iter().map(|(_, c)| *c).collect();
        assert_eq!(colors, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn clamp_reuses_last_palette_color() {
        let placed = clamp_colors(&cells(7), 2, 2).unwrap();
        let colors: Vec<ColorId> = placed.iter().map(|(_, c)| *c).collect();
        assert_eq!(colors, vec![0, 0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn reject_flags_overflow_and_short_groups() {
        let err = assign_colors(&cells(6), 2, 2, PaletteOverflow::Reject).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::PaletteOverflow {
                groups: 3,
                colors: 2
            }
        ));

        let err = assign_colors(&cells(5), 2, 4, PaletteOverflow::Reject).unwrap_err();
        assert!(matches!(err, PuzzleError::IncompleteColorGroup { nodes: 5, .. }));
    }

    #[test]
    fn empty_palette_and_zero_group_size_are_errors() {
        assert!(matches!(
            clamp_colors(&cells(2), 2, 0),
            Err(PuzzleError::EmptyPalette)
        ));
        assert!(matches!(
            clamp_colors(&cells(2), 0, 4),
            Err(PuzzleError::ZeroNodesPerColor)
        ));
    }

    #[test]
    fn builtin_levels_pass_strict_validation() {
        let set = LevelSet::builtin();
        assert_eq!(set.len(), 5);
        set.validate(2, 4, PaletteOverflow::Reject).unwrap();
    }

    #[test]
    fn level_json_uses_coordinate_pairs() {
        let set = LevelSet::from_json(r#"{"levels":[{"nodes":[[0,0],[2,0]]}]}"#).unwrap();
        assert_eq!(set.levels[0].nodes, vec![Cell::new(0, 0), Cell::new(2, 0)]);

        let text = serde_json::to_string(&set).unwrap();
        assert_eq!(text, r#"{"levels":[{"nodes":[[0,0],[2,0]]}]}"#);
    }

    #[test]
    fn round_lookup_is_one_based() {
        let set = LevelSet::builtin();
        assert_eq!(set.round(1).unwrap().nodes[0], Cell::new(1, 4));
        assert!(matches!(
            set.round(0),
            Err(PuzzleError::UnknownRound { round: 0, max: 5 })
        ));
        assert!(set.round(6).is_err());
    }

    #[test]
    fn empty_level_file_is_rejected() {
        assert!(matches!(
            LevelSet::from_json(r#"{"levels":[]}"#),
            Err(PuzzleError::NoLevels)
        ));
    }
}
