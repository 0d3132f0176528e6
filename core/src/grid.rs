use serde::{Deserialize, Serialize};

use crate::config::Rules;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridChoice {
    pub target_count: u32,
    pub cols: u32,
    pub rows: u32,
    pub actual_count: u32,
}

impl GridChoice {
    pub fn from_dims(target_count: u32, rows: u32, cols: u32) -> Self {
        Self {
            target_count,
            cols,
            rows,
            actual_count: rows.saturating_mul(cols),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.actual_count as usize
    }

    pub fn piece_id(&self, row: u32, col: u32) -> usize {
        (row * self.cols + col) as usize
    }

    pub fn cell_of(&self, id: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((id / cols) as u32, (id % cols) as u32)
    }
}

pub const DIFFICULTY_PIECE_COUNTS: [u32; 5] = [12, 24, 48, 96, 192];
pub const DEFAULT_TARGET_COUNT: u32 = 12;
pub const GRID_ROW_MIN: u32 = 1;
pub const GRID_COL_MIN: u32 = 2;

pub const DIR_UP: usize = 0;
pub const DIR_RIGHT: usize = 1;
pub const DIR_DOWN: usize = 2;
pub const DIR_LEFT: usize = 3;

/// Order in which grid neighbours are considered when snapping.
pub const SNAP_NEIGHBOR_ORDER: [usize; 4] = [DIR_UP, DIR_DOWN, DIR_LEFT, DIR_RIGHT];

pub fn neighbor_id(id: usize, cols: usize, rows: usize, dir: usize) -> Option<usize> {
    if cols == 0 || rows == 0 {
        return None;
    }
    let row = id / cols;
    let col = id % cols;
    match dir {
        DIR_UP if row > 0 => Some(id - cols),
        DIR_RIGHT if col + 1 < cols => Some(id + 1),
        DIR_DOWN if row + 1 < rows => Some(id + cols),
        DIR_LEFT if col > 0 => Some(id - 1),
        _ => None,
    }
}

pub fn grid_choice_label(choice: &GridChoice) -> String {
    if choice.actual_count == choice.target_count {
        format!(
            "{} pieces ({}x{})",
            choice.target_count, choice.cols, choice.rows
        )
    } else {
        format!(
            "{} pieces ({}x{}, actual {})",
            choice.target_count, choice.cols, choice.rows, choice.actual_count
        )
    }
}

/// Picks rows and columns so cells come out close to square for the image aspect.
pub fn grid_for_count(width: u32, height: u32, target: u32, rules: &Rules) -> Option<GridChoice> {
    if target == 0 || width == 0 || height == 0 {
        return None;
    }
    let aspect = width as f32 / height as f32;
    let rows = ((target as f32 / aspect).sqrt().round() as u32).max(rules.min_rows.max(1));
    let cols = ((rows as f32 * aspect).round() as u32).max(rules.min_cols.max(1));
    Some(GridChoice::from_dims(target, rows, cols))
}

pub fn build_grid_choices(width: u32, height: u32, rules: &Rules) -> Vec<GridChoice> {
    DIFFICULTY_PIECE_COUNTS
        .iter()
        .filter_map(|target| grid_for_count(width, height, *target, rules))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_image_rounds_to_square_grid() {
        let choice = grid_for_count(400, 400, 12, &Rules::default()).expect("grid");
        assert_eq!((choice.rows, choice.cols), (3, 3));
        assert_eq!(choice.actual_count, 9);
        assert_eq!(grid_choice_label(&choice), "12 pieces (3x3, actual 9)");
    }

    #[test]
    fn landscape_image_gets_more_columns() {
        let choice = grid_for_count(1600, 1200, 48, &Rules::default()).expect("grid");
        assert_eq!(choice.rows, 6);
        assert_eq!(choice.cols, 8);
        assert_eq!(grid_choice_label(&choice), "48 pieces (8x6)");
    }

    #[test]
    fn floors_apply_to_tiny_counts_and_extreme_aspects() {
        let rules = Rules::default();
        let tall = grid_for_count(100, 2000, 1, &rules).expect("grid");
        assert!(tall.rows >= GRID_ROW_MIN);
        assert!(tall.cols >= GRID_COL_MIN);
        let wide = grid_for_count(5000, 10, 2, &rules).expect("grid");
        assert_eq!(wide.rows, 1);
        assert!(wide.cols >= 2);
    }

    #[test]
    fn zero_inputs_have_no_grid() {
        let rules = Rules::default();
        assert!(grid_for_count(0, 10, 12, &rules).is_none());
        assert!(grid_for_count(10, 0, 12, &rules).is_none());
        assert!(grid_for_count(10, 10, 0, &rules).is_none());
    }

    #[test]
    fn huge_dims_saturate_instead_of_overflowing() {
        let choice = GridChoice::from_dims(12, 70_000, 70_000);
        assert_eq!(choice.actual_count, u32::MAX);
        assert_eq!(choice.piece_count(), u32::MAX as usize);
    }

    #[test]
    fn neighbors_stop_at_borders() {
        // 3 columns, 2 rows
        assert_eq!(neighbor_id(0, 3, 2, DIR_UP), None);
        assert_eq!(neighbor_id(0, 3, 2, DIR_LEFT), None);
        assert_eq!(neighbor_id(0, 3, 2, DIR_RIGHT), Some(1));
        assert_eq!(neighbor_id(0, 3, 2, DIR_DOWN), Some(3));
        assert_eq!(neighbor_id(5, 3, 2, DIR_RIGHT), None);
        assert_eq!(neighbor_id(5, 3, 2, DIR_DOWN), None);
        assert_eq!(neighbor_id(5, 3, 2, DIR_UP), Some(2));
    }

    #[test]
    fn difficulty_menu_covers_every_count() {
        let choices = build_grid_choices(1600, 1200, &Rules::default());
        assert_eq!(choices.len(), DIFFICULTY_PIECE_COUNTS.len());
        assert!(choices.iter().all(|choice| choice.actual_count > 0));
    }
}
