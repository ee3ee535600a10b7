// ABOUTME: Fixed-width character grids for the left and right text columns.
// ABOUTME: Both grids share one row/column count so rows line up across columns.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Split text into lines, normalizing CRLF to LF. Always yields at least one line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterGrid {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl CharacterGrid {
    /// Build a `rows x cols` grid, padding short lines with spaces and
    /// truncating long ones.
    pub fn from_lines(lines: &[&str], rows: usize, cols: usize) -> Self {
        let mut cells = vec![' '; rows * cols];
        for (row, line) in lines.iter().take(rows).enumerate() {
            let start = row * cols;
            for (col, c) in line.chars().take(cols).enumerate() {
                cells[start + col] = c;
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<char> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn row_string(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row * self.cols;
        self.cells[start..start + self.cols].iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPair {
    pub left: CharacterGrid,
    pub right: CharacterGrid,
}

impl GridPair {
    /// Build both grids sized to the larger of the two texts.
    pub fn build(left_text: &str, right_text: &str) -> Self {
        let left_lines = split_lines(left_text);
        let right_lines = split_lines(right_text);

        let rows = left_lines.len().max(right_lines.len());
        let cols = left_lines
            .iter()
            .chain(right_lines.iter())
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        Self {
            left: CharacterGrid::from_lines(&left_lines, rows, cols),
            right: CharacterGrid::from_lines(&right_lines, rows, cols),
        }
    }

    pub fn get(&self, side: Side) -> &CharacterGrid {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Row strings of one grid, read every frame by the compositor and spawners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStringCache {
    rows: Vec<String>,
}

impl RowStringCache {
    pub fn from_grid(grid: &CharacterGrid) -> Self {
        Self {
            rows: (0..grid.rows()).map(|row| grid.row_string(row)).collect(),
        }
    }

    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map(String::as_str).unwrap_or("")
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Source texts, their grids, and the derived row strings.
#[derive(Debug, Clone)]
pub struct TextGridModel {
    texts: [String; 2],
    grids: GridPair,
    row_cache: [RowStringCache; 2],
    generation: u64,
}

impl TextGridModel {
    pub fn new(left_text: &str, right_text: &str) -> Self {
        let grids = GridPair::build(left_text, right_text);
        let row_cache = [
            RowStringCache::from_grid(&grids.left),
            RowStringCache::from_grid(&grids.right),
        ];
        Self {
            texts: [left_text.to_string(), right_text.to_string()],
            grids,
            row_cache,
            generation: 0,
        }
    }

    /// Replace one side's text and rebuild both grids and row caches.
    pub fn set_text(&mut self, side: Side, text: &str) {
        self.texts[side.index()] = text.to_string();
        self.rebuild();
    }

    pub fn set_texts(&mut self, left_text: &str, right_text: &str) {
        self.texts = [left_text.to_string(), right_text.to_string()];
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.grids = GridPair::build(&self.texts[0], &self.texts[1]);
        self.row_cache = [
            RowStringCache::from_grid(&self.grids.left),
            RowStringCache::from_grid(&self.grids.right),
        ];
        self.generation += 1;
        tracing::debug!(
            "Rebuilt text grids: {}x{} (generation {})",
            self.cols(),
            self.rows(),
            self.generation
        );
    }

    pub fn text(&self, side: Side) -> &str {
        &self.texts[side.index()]
    }

    pub fn grid(&self, side: Side) -> &CharacterGrid {
        self.grids.get(side)
    }

    pub fn row_cache(&self, side: Side) -> &RowStringCache {
        &self.row_cache[side.index()]
    }

    pub fn row(&self, side: Side, row: usize) -> &str {
        self.row_cache[side.index()].row(row)
    }

    pub fn rows(&self) -> usize {
        self.grids.left.rows()
    }

    pub fn cols(&self) -> usize {
        self.grids.left.cols()
    }

    /// Incremented on every rebuild
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for TextGridModel {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_shorter_side() {
        let grids = GridPair::build("AB\nCD", "X");
        assert_eq!((grids.left.rows(), grids.left.cols()), (2, 2));
        assert_eq!((grids.right.rows(), grids.right.cols()), (2, 2));
        assert_eq!(grids.left.row_string(0), "AB");
        assert_eq!(grids.left.row_string(1), "CD");
        assert_eq!(grids.right.row_string(0), "X ");
        assert_eq!(grids.right.row_string(1), "  ");
    }

    #[test]
    fn crlf_is_normalized() {
        let grids = GridPair::build("ab\r\ncd\r\n", "");
        assert_eq!(grids.left.rows(), 3);
        assert_eq!(grids.left.cols(), 2);
        assert_eq!(grids.left.row_string(1), "cd");
    }

    #[test]
    fn empty_text_is_a_single_blank_row() {
        let grids = GridPair::build("", "");
        assert_eq!(grids.left.rows(), 1);
        assert_eq!(grids.left.cols(), 0);
        assert_eq!(grids.left.row_string(0), "");
    }

    #[test]
    fn from_lines_truncates_long_lines() {
        let grid = CharacterGrid::from_lines(&["abcdef", "x"], 3, 3);
        assert_eq!(grid.row_string(0), "abc");
        assert_eq!(grid.row_string(1), "x  ");
        assert_eq!(grid.row_string(2), "   ");
        assert_eq!(grid.cell(0, 5), None);
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let grids = GridPair::build("█▌", "ab");
        assert_eq!(grids.left.cols(), 2);
        assert_eq!(grids.left.cell(0, 1), Some('▌'));
    }

    #[test]
    fn set_text_bumps_generation_and_rebuilds_cache() {
        let mut model = TextGridModel::new("A", "B");
        assert_eq!(model.generation(), 0);
        model.set_text(Side::Right, "long line\nsecond");
        assert_eq!(model.generation(), 1);
        assert_eq!(model.rows(), 2);
        assert_eq!(model.cols(), 9);
        assert_eq!(model.row(Side::Left, 0), "A        ");
        assert_eq!(model.row(Side::Right, 1), "second   ");
        assert_eq!(model.row(Side::Right, 7), "");
        assert_eq!(model.text(Side::Right), "long line\nsecond");
    }
}
