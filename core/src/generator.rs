use rand::Rng;

use crate::config::Rules;
use crate::error::GenerateError;
use crate::geometry::Point;
use crate::grid::{grid_for_count, GridChoice};
use crate::groups::GroupTracker;
use crate::model::{EdgeKind, EdgeSignature, Piece, PuzzleImage, Rect};

/// Grid, cell size and board placement derived from an image and a canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleLayout {
    pub grid: GridChoice,
    /// Cell size in source pixels.
    pub piece_width: f32,
    pub piece_height: f32,
    /// World units per source pixel.
    pub scale: f32,
    pub board: Rect,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl PuzzleLayout {
    pub fn scaled_cell(&self) -> (f32, f32) {
        (self.piece_width * self.scale, self.piece_height * self.scale)
    }

    /// World position of a cell when the piece sits in its solved spot.
    pub fn board_target(&self, row: u32, col: u32) -> Point {
        let (cell_w, cell_h) = self.scaled_cell();
        (
            self.board.x + col as f32 * cell_w,
            self.board.y + row as f32 * cell_h,
        )
    }
}

pub fn plan_layout(
    image: &PuzzleImage,
    target_count: u32,
    canvas: (f32, f32),
    rules: &Rules,
) -> Result<PuzzleLayout, GenerateError> {
    if target_count == 0 {
        return Err(GenerateError::InvalidPieceCount);
    }
    if image.width == 0 || image.height == 0 {
        return Err(GenerateError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }
    let (canvas_width, canvas_height) = canvas;
    if !(canvas_width > 0.0 && canvas_height > 0.0) {
        return Err(GenerateError::EmptyCanvas {
            width: canvas_width,
            height: canvas_height,
        });
    }
    let grid = grid_for_count(image.width, image.height, target_count, rules)
        .ok_or(GenerateError::InvalidPieceCount)?;
    let (image_w, image_h) = image.size();
    let piece_width = image_w / grid.cols as f32;
    let piece_height = image_h / grid.rows as f32;
    let puzzle_w = piece_width * grid.cols as f32;
    let puzzle_h = piece_height * grid.rows as f32;
    let scale = (canvas_width * rules.board_fill_ratio / puzzle_w)
        .min(canvas_height * rules.board_fill_ratio / puzzle_h);
    let board_w = puzzle_w * scale;
    let board_h = puzzle_h * scale;
    let board = Rect::new(
        (canvas_width - board_w) / 2.0,
        (canvas_height - board_h) / 2.0,
        board_w,
        board_h,
    );
    log::debug!(
        "layout {}x{} cells, piece {:.1}x{:.1}px, scale {:.3}",
        grid.cols,
        grid.rows,
        piece_width,
        piece_height,
        scale
    );
    Ok(PuzzleLayout {
        grid,
        piece_width,
        piece_height,
        scale,
        board,
        canvas_width,
        canvas_height,
    })
}

fn random_edge<R: Rng + ?Sized>(rng: &mut R) -> EdgeKind {
    if rng.random::<bool>() {
        EdgeKind::Tab
    } else {
        EdgeKind::Slot
    }
}

/// Edge signatures in row-major order. Top and left edges mirror the neighbour generated
/// before them; border edges are flat.
pub fn generate_edges<R: Rng + ?Sized>(rows: u32, cols: u32, rng: &mut R) -> Vec<EdgeSignature> {
    let cols_usize = cols as usize;
    let mut edges: Vec<EdgeSignature> = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let id = edges.len();
            let top = if row == 0 {
                EdgeKind::Flat
            } else {
                edges[id - cols_usize].bottom.opposite()
            };
            let left = if col == 0 {
                EdgeKind::Flat
            } else {
                edges[id - 1].right.opposite()
            };
            let right = if col + 1 < cols {
                random_edge(rng)
            } else {
                EdgeKind::Flat
            };
            let bottom = if row + 1 < rows {
                random_edge(rng)
            } else {
                EdgeKind::Flat
            };
            edges.push(EdgeSignature {
                top,
                right,
                bottom,
                left,
            });
        }
    }
    edges
}

/// Pieces in their solved spots on the board, unlocked.
pub fn build_pieces(layout: &PuzzleLayout, edges: &[EdgeSignature]) -> Vec<Piece> {
    debug_assert_eq!(edges.len(), layout.grid.piece_count());
    edges
        .iter()
        .enumerate()
        .map(|(id, edges)| {
            let (row, col) = layout.grid.cell_of(id);
            let (x, y) = layout.board_target(row, col);
            Piece {
                id,
                row,
                col,
                x,
                y,
                width: layout.piece_width,
                height: layout.piece_height,
                edges: *edges,
                locked: false,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

fn eligible_sides(layout: &PuzzleLayout) -> Vec<Side> {
    let (cell_w, cell_h) = layout.scaled_cell();
    let board = layout.board;
    let margin_left = board.x;
    let margin_right = layout.canvas_width - board.right();
    let margin_top = board.y;
    let margin_bottom = layout.canvas_height - board.bottom();
    let mut sides = Vec::with_capacity(4);
    if margin_top > cell_h * 0.5 {
        sides.push(Side::Top);
    }
    if margin_bottom > cell_h * 0.5 {
        sides.push(Side::Bottom);
    }
    if margin_left > cell_w * 0.5 {
        sides.push(Side::Left);
    }
    if margin_right > cell_w * 0.5 {
        sides.push(Side::Right);
    }
    sides
}

fn spread<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    rng.random::<f32>() * range.max(0.0)
}

/// Top-left corner for a box of size `w`x`h` in the strip beside the board on `side`,
/// or anywhere on the canvas when `side` is `None`.
fn place_box<R: Rng + ?Sized>(
    layout: &PuzzleLayout,
    side: Option<Side>,
    w: f32,
    h: f32,
    pad: f32,
    rng: &mut R,
) -> Point {
    let board = layout.board;
    let (canvas_w, canvas_h) = (layout.canvas_width, layout.canvas_height);
    match side {
        Some(Side::Top) => (
            spread(rng, canvas_w - w),
            spread(rng, board.y - h - pad),
        ),
        Some(Side::Bottom) => {
            let start = board.bottom() + pad;
            (spread(rng, canvas_w - w), start + spread(rng, canvas_h - start - h))
        }
        Some(Side::Left) => (
            spread(rng, board.x - w - pad),
            spread(rng, canvas_h - h),
        ),
        Some(Side::Right) => {
            let start = board.right() + pad;
            (start + spread(rng, canvas_w - start - w), spread(rng, canvas_h - h))
        }
        None => (spread(rng, canvas_w - w), spread(rng, canvas_h - h)),
    }
}

/// Moves every group to a random spot beside the board and unlocks it. With `keep_locked`,
/// groups that are locked stay where they are. Returns how many groups moved.
pub fn scatter<R: Rng + ?Sized>(
    pieces: &mut [Piece],
    groups: &GroupTracker,
    layout: &PuzzleLayout,
    rules: &Rules,
    keep_locked: bool,
    rng: &mut R,
) -> usize {
    let (cell_w, cell_h) = layout.scaled_cell();
    let sides = eligible_sides(layout);
    let mut moved = 0;
    for &group in groups.order() {
        let members = groups.members(group);
        if members.is_empty() {
            continue;
        }
        if keep_locked && members.iter().any(|id| pieces[*id].locked) {
            continue;
        }
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for &id in members {
            let piece = &pieces[id];
            min_x = min_x.min(piece.x);
            min_y = min_y.min(piece.y);
            max_x = max_x.max(piece.x + cell_w);
            max_y = max_y.max(piece.y + cell_h);
        }
        let side = if sides.is_empty() {
            None
        } else {
            Some(sides[rng.random_range(0..sides.len())])
        };
        let (x, y) = place_box(
            layout,
            side,
            max_x - min_x,
            max_y - min_y,
            rules.scatter_padding,
            rng,
        );
        let (dx, dy) = (x - min_x, y - min_y);
        for &id in members {
            let piece = &mut pieces[id];
            piece.x += dx;
            piece.y += dy;
            piece.locked = false;
        }
        moved += 1;
    }
    log::debug!(
        "scattered {moved} groups over {} sides (keep_locked={keep_locked})",
        sides.len()
    );
    moved
}
