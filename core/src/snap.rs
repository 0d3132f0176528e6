use crate::grid::{neighbor_id, SNAP_NEIGHBOR_ORDER};
use crate::groups::GroupId;
use crate::model::PieceId;
use crate::session::PuzzleSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapOutcome {
    /// Group holding the released pieces after any merge.
    pub group: GroupId,
    pub board_snapped: bool,
    /// Group that was absorbed by the released one.
    pub merged_with: Option<GroupId>,
    pub locked: bool,
}

/// Settles a released group: first against the board, then against one grid neighbour.
pub fn resolve_snaps(session: &mut PuzzleSession, group: GroupId) -> SnapOutcome {
    let snap_distance = session.rules.snap_distance;
    let dragged: Vec<PieceId> = session.groups.members(group).to_vec();
    let mut outcome = SnapOutcome {
        group,
        board_snapped: false,
        merged_with: None,
        locked: session.group_locked(group),
    };
    if dragged.is_empty() {
        return outcome;
    }

    for &id in &dragged {
        let piece = &session.pieces[id];
        let (target_x, target_y) = session.layout.board_target(piece.row, piece.col);
        let dx = target_x - piece.x;
        let dy = target_y - piece.y;
        if dx.hypot(dy) < snap_distance {
            session.translate_pieces(&dragged, dx, dy);
            session.lock_group(group);
            outcome.board_snapped = true;
            outcome.locked = true;
            log::debug!("group {group} snapped to board via piece {id}");
            break;
        }
    }

    let (cell_w, cell_h) = session.layout.scaled_cell();
    let cols = session.layout.grid.cols as usize;
    let rows = session.layout.grid.rows as usize;
    for &id in &dragged {
        for dir in SNAP_NEIGHBOR_ORDER {
            let Some(other) = neighbor_id(id, cols, rows, dir) else {
                continue;
            };
            if session.groups.same_group(id, other) {
                continue;
            }
            let piece = &session.pieces[id];
            let neighbor = &session.pieces[other];
            let ideal_x = (piece.col as f32 - neighbor.col as f32) * cell_w;
            let ideal_y = (piece.row as f32 - neighbor.row as f32) * cell_h;
            let actual_x = piece.x - neighbor.x;
            let actual_y = piece.y - neighbor.y;
            if (actual_x - ideal_x).hypot(actual_y - ideal_y) >= snap_distance {
                continue;
            }
            let align = (
                neighbor.x + ideal_x - piece.x,
                neighbor.y + ideal_y - piece.y,
            );
            let was_locked =
                session.group_locked(group) || session.group_locked(session.groups.group_of(other));
            let Some(merge) = session.groups.merge(id, other) else {
                continue;
            };
            let merged = merge.repoint(group);
            if was_locked {
                session.lock_group(merged);
            }
            if !outcome.board_snapped {
                session.translate_pieces(&dragged, align.0, align.1);
            }
            log::debug!(
                "piece {id} joined piece {other}: group {} absorbed {}",
                merge.survivor,
                merge.absorbed
            );
            outcome.group = merged;
            outcome.merged_with = Some(merge.absorbed);
            outcome.locked = was_locked;
            break;
        }
        if outcome.merged_with.is_some() {
            break;
        }
    }

    if outcome.locked {
        session.groups.lower(outcome.group);
    }
    outcome
}
