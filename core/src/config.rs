use serde::{Deserialize, Serialize};

use crate::grid::{GRID_COL_MIN, GRID_ROW_MIN};

pub const SNAP_DISTANCE_DEFAULT: f32 = 30.0;
pub const BOARD_FILL_RATIO_DEFAULT: f32 = 0.6;
pub const HIT_BLEED_RATIO_DEFAULT: f32 = 0.2;
pub const RENDER_BLEED_RATIO_DEFAULT: f32 = 0.3;
pub const SCATTER_PADDING_DEFAULT: f32 = 10.0;
pub const ZOOM_MIN_DEFAULT: f32 = 0.5;
pub const ZOOM_MAX_DEFAULT: f32 = 3.0;
pub const BOARD_FILL_RATIO_MIN: f32 = 0.05;
pub const ZOOM_FLOOR: f32 = 0.01;

/// Tunable constants of a puzzle session. Missing keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// World-unit distance under which a piece snaps to the board or a neighbour.
    pub snap_distance: f32,
    /// Fraction of the canvas the board may cover.
    pub board_fill_ratio: f32,
    /// Hit-box margin, as a fraction of the scaled cell width.
    pub hit_bleed_ratio: f32,
    /// Image margin drawn around each cell, as a fraction of the longer cell side.
    pub render_bleed_ratio: f32,
    pub scatter_padding: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Hit-test against the piece outline instead of the bleed box.
    pub precise_hit_test: bool,
    pub min_rows: u32,
    pub min_cols: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            snap_distance: SNAP_DISTANCE_DEFAULT,
            board_fill_ratio: BOARD_FILL_RATIO_DEFAULT,
            hit_bleed_ratio: HIT_BLEED_RATIO_DEFAULT,
            render_bleed_ratio: RENDER_BLEED_RATIO_DEFAULT,
            scatter_padding: SCATTER_PADDING_DEFAULT,
            zoom_min: ZOOM_MIN_DEFAULT,
            zoom_max: ZOOM_MAX_DEFAULT,
            precise_hit_test: false,
            min_rows: GRID_ROW_MIN,
            min_cols: GRID_COL_MIN,
        }
    }
}

impl Rules {
    /// Clamps user-supplied values into ranges the engine can work with.
    pub fn sanitized(self) -> Self {
        let zoom_min = if self.zoom_min.is_finite() {
            self.zoom_min.max(ZOOM_FLOOR)
        } else {
            ZOOM_MIN_DEFAULT
        };
        let zoom_max = if self.zoom_max.is_finite() {
            self.zoom_max.max(zoom_min)
        } else {
            ZOOM_MAX_DEFAULT.max(zoom_min)
        };
        Self {
            snap_distance: finite_or(self.snap_distance, SNAP_DISTANCE_DEFAULT).max(0.0),
            board_fill_ratio: finite_or(self.board_fill_ratio, BOARD_FILL_RATIO_DEFAULT)
                .clamp(BOARD_FILL_RATIO_MIN, 1.0),
            hit_bleed_ratio: finite_or(self.hit_bleed_ratio, HIT_BLEED_RATIO_DEFAULT).max(0.0),
            render_bleed_ratio: finite_or(self.render_bleed_ratio, RENDER_BLEED_RATIO_DEFAULT)
                .max(0.0),
            scatter_padding: finite_or(self.scatter_padding, SCATTER_PADDING_DEFAULT).max(0.0),
            zoom_min,
            zoom_max,
            precise_hit_test: self.precise_hit_test,
            min_rows: self.min_rows.max(1),
            min_cols: self.min_cols.max(1),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let rules: Rules = toml::from_str("snap_distance = 45.0\nprecise_hit_test = true\n")
            .expect("parse rules");
        assert_eq!(rules.snap_distance, 45.0);
        assert!(rules.precise_hit_test);
        assert_eq!(rules.board_fill_ratio, BOARD_FILL_RATIO_DEFAULT);
        assert_eq!(rules.zoom_max, ZOOM_MAX_DEFAULT);
    }

    #[test]
    fn rules_survive_toml_round_trip() {
        let rules = Rules {
            scatter_padding: 4.0,
            min_cols: 3,
            ..Rules::default()
        };
        let text = toml::to_string(&rules).expect("serialize rules");
        let parsed: Rules = toml::from_str(&text).expect("parse rules");
        assert_eq!(parsed, rules);
    }

    #[test]
    fn sanitize_fixes_inverted_zoom_and_bad_ratios() {
        let rules = Rules {
            zoom_min: 2.0,
            zoom_max: 1.0,
            board_fill_ratio: 4.0,
            snap_distance: -5.0,
            hit_bleed_ratio: f32::NAN,
            min_rows: 0,
            ..Rules::default()
        }
        .sanitized();
        assert_eq!(rules.zoom_min, 2.0);
        assert_eq!(rules.zoom_max, 2.0);
        assert_eq!(rules.board_fill_ratio, 1.0);
        assert_eq!(rules.snap_distance, 0.0);
        assert_eq!(rules.hit_bleed_ratio, HIT_BLEED_RATIO_DEFAULT);
        assert_eq!(rules.min_rows, 1);
    }
}
