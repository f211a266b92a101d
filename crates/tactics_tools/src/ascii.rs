//! ASCII board renderer.
//!
//! Implements the engine's [`Renderer`] seam by painting into a character
//! grid, for quick terminal review of maps, ranges and paths.

use std::fmt::Write as _;

use tactics_core::grid::{Grid, Walkable};
use tactics_core::range::HighlightTile;
use tactics_core::render::{HighlightKind, Renderer, UnitRenderData};
use tactics_core::units::Side;

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Print column and row numbers around the board.
    pub show_coords: bool,
    /// List units below the board.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_coords: true,
            show_legend: true,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Terrain character for a field.
fn terrain_char(grid: &Grid, x: u32, y: u32) -> char {
    if grid.get(x, y).is_none() {
        ' '
    } else if grid.is_tagged(x, y) {
        '='
    } else if grid.is_walkable(x, y) {
        '.'
    } else {
        '#'
    }
}

const fn highlight_char(kind: HighlightKind) -> char {
    match kind {
        HighlightKind::Move => '+',
        HighlightKind::Attack => 'x',
        HighlightKind::Path => '*',
    }
}

const fn highlight_color(kind: HighlightKind) -> &'static str {
    match kind {
        HighlightKind::Move => colors::GREEN,
        HighlightKind::Attack => colors::YELLOW,
        HighlightKind::Path => colors::CYAN,
    }
}

/// Unit character: a letter from its id, lowercase for the player and
/// uppercase for the enemy.
#[must_use]
pub fn unit_char(id: u32, side: Side) -> char {
    let letter = char::from(b'a' + (id.saturating_sub(1) % 26) as u8);
    match side {
        Side::Player => letter,
        Side::Enemy => letter.to_ascii_uppercase(),
    }
}

const fn side_color(side: Side) -> &'static str {
    match side {
        Side::Player => colors::BLUE,
        Side::Enemy => colors::RED,
    }
}

/// A [`Renderer`] painting into a character grid.
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    config: AsciiConfig,
    width: u32,
    height: u32,
    /// Row-major `(char, color)` cells.
    cells: Vec<(char, &'static str)>,
    legend: Vec<String>,
}

impl AsciiRenderer {
    /// Start from the terrain of `grid`.
    #[must_use]
    pub fn new(grid: &Grid, config: AsciiConfig) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| (terrain_char(grid, x, y), ""))
            .collect();
        Self {
            config,
            width,
            height,
            cells,
            legend: Vec::new(),
        }
    }

    fn paint(&mut self, x: u32, y: u32, ch: char, color: &'static str) {
        if x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = (ch, color);
        }
    }

    /// Finish and return the board text.
    #[must_use]
    pub fn finish(&self) -> String {
        let mut output = String::new();

        if self.config.show_coords {
            output.push_str("   ");
            for x in 0..self.width {
                let _ = write!(output, "{}", x % 10);
            }
            output.push('\n');
        }

        for (y, row) in self.cells.chunks(self.width.max(1) as usize).enumerate() {
            if self.config.show_coords {
                let _ = write!(output, "{y:>2} ");
            }
            for &(ch, color) in row {
                if self.config.use_color && !color.is_empty() {
                    output.push_str(color);
                    output.push(ch);
                    output.push_str(colors::RESET);
                } else {
                    output.push(ch);
                }
            }
            output.push('\n');
        }

        if self.config.show_legend && !self.legend.is_empty() {
            output.push('\n');
            for line in &self.legend {
                output.push_str(line);
                output.push('\n');
            }
        }
        output
    }
}

impl Renderer for AsciiRenderer {
    fn draw_highlight(&mut self, kind: HighlightKind, tiles: &[HighlightTile]) {
        let ch = highlight_char(kind);
        let color = highlight_color(kind);
        for tile in tiles {
            self.paint(tile.field.x, tile.field.y, ch, color);
        }
    }

    fn draw_unit(&mut self, unit: &UnitRenderData) {
        let ch = unit_char(unit.id, unit.side);
        self.paint(unit.field.x, unit.field.y, ch, side_color(unit.side));
        self.legend.push(format!(
            "{ch} #{id} {side:?} at ({x}, {y}) x{count}{wounded} {pose:?}",
            id = unit.id,
            side = unit.side,
            x = unit.field.x,
            y = unit.field.y,
            count = unit.count,
            wounded = if unit.wounded { " wounded" } else { "" },
            pose = unit.pose,
        ));
    }
}
