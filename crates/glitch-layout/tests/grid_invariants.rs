// ABOUTME: Property tests for grid construction.
// ABOUTME: Every row of both grids has exactly `cols` characters and texts survive padding.

use glitch_layout::{split_lines, GridPair, Side, TextGridModel};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z #.█]{0,30}", 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn rows_are_padded_to_a_shared_width(left in text_strategy(), right in text_strategy()) {
        let grids = GridPair::build(&left, &right);
        let rows = split_lines(&left).len().max(split_lines(&right).len());

        for side in Side::ALL {
            let grid = grids.get(side);
            prop_assert_eq!(grid.rows(), rows);
            prop_assert_eq!(grid.cols(), grids.left.cols());
            for row in 0..grid.rows() {
                prop_assert_eq!(grid.row_string(row).chars().count(), grid.cols());
            }
        }
    }

    #[test]
    fn input_lines_are_row_prefixes(left in text_strategy(), right in text_strategy()) {
        let model = TextGridModel::new(&left, &right);
        for (row, line) in split_lines(&left).iter().enumerate() {
            let padded = model.row(Side::Left, row);
            prop_assert!(padded.starts_with(line));
            prop_assert!(padded[line.len()..].chars().all(|c| c == ' '));
        }
    }
}
