use crate::geometry::{piece_path, PiecePath, Point};
use crate::groups::GroupId;
use crate::model::{PieceId, Rect};
use crate::session::PuzzleSession;

/// Straight (non-premultiplied) RGBA.
pub type Rgba = [u8; 4];

pub const TRAY_COLOR: Rgba = [0x2c, 0x3e, 0x50, 0xff];
pub const BOARD_COLOR: Rgba = [0xec, 0xf0, 0xf1, 0xff];
pub const FRAME_COLOR: Rgba = [0x8e, 0x44, 0xad, 0xff];
pub const FRAME_WIDTH: f32 = 10.0;
pub const OUTLINE_COLOR: Rgba = [0x00, 0x00, 0x00, 0xff];
pub const OUTLINE_WIDTH: f32 = 1.0;
pub const GUIDE_ALPHA: f32 = 0.2;
pub const HIGHLIGHT_COLOR: Rgba = [0xf1, 0xc4, 0x0f, 0xff];
pub const HIGHLIGHT_WIDTH: f32 = 3.0;
pub const HIGHLIGHT_ALPHA_MIN: f32 = 0.35;
pub const FRAME_SHADOW: Shadow = Shadow {
    color: [0x00, 0x00, 0x00, 0x80],
    blur: 20.0,
    offset: (10.0, 10.0),
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f32,
    pub offset: Point,
}

/// Drawing backend supplied by the host. Coordinates after `set_view` are world units.
pub trait Surface {
    fn clear(&mut self, width: f32, height: f32, color: Rgba);
    fn set_view(&mut self, offset: Point, zoom: f32);
    fn fill_rect(&mut self, rect: Rect, color: Rgba, shadow: Option<Shadow>);
    /// Draws the `src` region of the puzzle image (source pixels) into `dst`.
    fn draw_image(&mut self, src: Rect, dst: Rect, alpha: f32, clip: Option<&PiecePath>);
    fn stroke_path(&mut self, path: &PiecePath, color: Rgba, width: f32, alpha: f32);
}

/// Pieces bottom to top, with the held group moved to the end.
pub fn draw_order(session: &PuzzleSession, dragging: Option<GroupId>) -> Vec<PieceId> {
    let groups = session.groups();
    let mut order = Vec::with_capacity(session.pieces().len());
    for &group in groups.order() {
        if Some(group) != dragging {
            order.extend_from_slice(groups.members(group));
        }
    }
    if let Some(group) = dragging {
        order.extend_from_slice(groups.members(group));
    }
    order
}

/// Source and destination rectangles for one piece, both grown by the image bleed.
pub fn piece_image_rects(session: &PuzzleSession, id: PieceId) -> Option<(Rect, Rect)> {
    let piece = session.piece(id)?;
    let layout = session.layout();
    let bleed = piece.width.max(piece.height) * session.rules().render_bleed_ratio;
    let src = Rect::new(
        piece.col as f32 * piece.width,
        piece.row as f32 * piece.height,
        piece.width,
        piece.height,
    )
    .inflate(bleed, bleed);
    let (cell_w, cell_h) = layout.scaled_cell();
    let scaled_bleed = bleed * layout.scale;
    let dst = Rect::new(piece.x, piece.y, cell_w, cell_h).inflate(scaled_bleed, scaled_bleed);
    Some((src, dst))
}

pub fn render<S: Surface + ?Sized>(
    session: &PuzzleSession,
    dragging: Option<GroupId>,
    surface: &mut S,
) {
    let (canvas_w, canvas_h) = session.canvas_size();
    surface.clear(canvas_w, canvas_h, TRAY_COLOR);
    let viewport = session.viewport();
    surface.set_view(viewport.offset(), viewport.zoom());

    let board = session.board();
    surface.fill_rect(
        board.inflate(FRAME_WIDTH, FRAME_WIDTH),
        FRAME_COLOR,
        Some(FRAME_SHADOW),
    );
    surface.fill_rect(board, BOARD_COLOR, None);
    if session.show_guide() {
        let (image_w, image_h) = session.image().size();
        surface.draw_image(
            Rect::new(0.0, 0.0, image_w, image_h),
            board,
            GUIDE_ALPHA,
            None,
        );
    }

    let (cell_w, cell_h) = session.layout().scaled_cell();
    for id in draw_order(session, dragging) {
        let Some((src, dst)) = piece_image_rects(session, id) else {
            continue;
        };
        let piece = &session.pieces()[id];
        let outline = piece_path(piece.x, piece.y, cell_w, cell_h, &piece.edges);
        surface.draw_image(src, dst, 1.0, Some(&outline));
        surface.stroke_path(&outline, OUTLINE_COLOR, OUTLINE_WIDTH, 1.0);
    }

    if let Some(group) = dragging {
        let alpha = HIGHLIGHT_ALPHA_MIN + (1.0 - HIGHLIGHT_ALPHA_MIN) * session.assist_intensity();
        for &id in session.groups().members(group) {
            if let Some(outline) = session.piece_outline(id) {
                surface.stroke_path(&outline, HIGHLIGHT_COLOR, HIGHLIGHT_WIDTH, alpha);
            }
        }
    }
}
