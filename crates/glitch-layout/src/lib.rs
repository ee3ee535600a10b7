// ABOUTME: Text grid model and canvas layout for the two text columns.
// ABOUTME: Converts raw text into padded grids and derives pixel metrics.

mod grid;
mod metrics;

pub use grid::{split_lines, CharacterGrid, GridPair, RowStringCache, Side, TextGridModel};
pub use metrics::{LayoutEngine, LayoutState};
