use serde::{Deserialize, Serialize};

pub type PieceId = usize;

/// Shape of one piece edge. Serialized as -1 (slot), 0 (flat) or 1 (tab).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[serde(into = "i8", try_from = "i8")]
pub enum EdgeKind {
    Slot,
    Flat,
    Tab,
}

impl EdgeKind {
    pub fn sign(self) -> f32 {
        match self {
            EdgeKind::Slot => -1.0,
            EdgeKind::Flat => 0.0,
            EdgeKind::Tab => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            EdgeKind::Slot => EdgeKind::Tab,
            EdgeKind::Flat => EdgeKind::Flat,
            EdgeKind::Tab => EdgeKind::Slot,
        }
    }

    pub fn is_flat(self) -> bool {
        self == EdgeKind::Flat
    }
}

impl From<EdgeKind> for i8 {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Slot => -1,
            EdgeKind::Flat => 0,
            EdgeKind::Tab => 1,
        }
    }
}

impl TryFrom<i8> for EdgeKind {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(EdgeKind::Slot),
            0 => Ok(EdgeKind::Flat),
            1 => Ok(EdgeKind::Tab),
            other => Err(format!("edge value {other} is not -1, 0 or 1")),
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub struct EdgeSignature {
    pub top: EdgeKind,
    pub right: EdgeKind,
    pub bottom: EdgeKind,
    pub left: EdgeKind,
}

impl EdgeSignature {
    pub const FLAT: EdgeSignature = EdgeSignature {
        top: EdgeKind::Flat,
        right: EdgeKind::Flat,
        bottom: EdgeKind::Flat,
        left: EdgeKind::Flat,
    };
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x - dx, self.y - dy, self.w + 2.0 * dx, self.h + 2.0 * dy)
    }

    /// True when the interiors overlap. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// One cell of the puzzle. `x`/`y` is the world position of the cell's
/// top-left corner; `width`/`height` are in source pixels.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub struct Piece {
    pub id: PieceId,
    #[serde(alias = "r")]
    pub row: u32,
    #[serde(alias = "c")]
    pub col: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(alias = "shapes")]
    pub edges: EdgeSignature,
    #[serde(alias = "isLocked", default)]
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleImage {
    pub width: u32,
    pub height: u32,
    /// Opaque reference handed back to the host when drawing.
    pub source: Option<String>,
}

impl PuzzleImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kinds_serialize_as_integers() {
        let json = serde_json::to_string(&EdgeSignature {
            top: EdgeKind::Flat,
            right: EdgeKind::Tab,
            bottom: EdgeKind::Slot,
            left: EdgeKind::Flat,
        })
        .expect("serialize");
        assert_eq!(json, r#"{"top":0,"right":1,"bottom":-1,"left":0}"#);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let parsed: Result<EdgeSignature, _> =
            serde_json::from_str(r#"{"top":2,"right":0,"bottom":0,"left":0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn legacy_piece_keys_are_accepted() {
        let piece: Piece = serde_json::from_str(
            r#"{"id":4,"r":1,"c":2,"x":10.5,"y":3,"width":50,"height":40,
                "shapes":{"top":-1,"right":0,"bottom":1,"left":1},"isLocked":true}"#,
        )
        .expect("parse piece");
        assert_eq!((piece.row, piece.col), (1, 2));
        assert_eq!(piece.edges.top, EdgeKind::Slot);
        assert!(piece.locked);
    }

    #[test]
    fn opposite_is_a_mirror() {
        for kind in [EdgeKind::Slot, EdgeKind::Flat, EdgeKind::Tab] {
            assert_eq!(kind.opposite().sign(), -kind.sign());
            assert_eq!(kind.opposite().opposite(), kind);
        }
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(a.inflate(1.0, 1.0).contains(-1.0, 11.0));
    }
}
