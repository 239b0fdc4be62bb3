//! Layout strategies: turn a sequence of label/control pairs into grid coordinates.
//!
//! A render pass threads one [`InsertionPosition`] through every placement. Each placement returns
//! the position for the next one; positions only ever move down.
//!
//! ## Strategies
//!
//! | Strategy  | Columns | Pair placement                         | Pair advance |
//! |-----------|---------|----------------------------------------|--------------|
//! | `Paired`  | 2       | label at `column`, control at `column+1` | 1 row        |
//! | `Stacked` | 1       | label on one row, control beneath it   | 2 rows       |
//!
//! Standalone nodes and separators always take one row. Separators span the strategy's column count.

use crate::toolkit::{GridContainer, Node};

/// The closed set of layout strategies an engine can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    /// Label and control side by side on one row.
    #[default]
    Paired,
    /// Label above its control.
    Stacked,
}

impl LayoutStrategy {
    /// Return the placement implementation for this strategy.
    pub fn layout(self) -> &'static dyn Layout {
        match self {
            LayoutStrategy::Paired => &PairedLayout,
            LayoutStrategy::Stacked => &StackedLayout,
        }
    }

    pub fn column_count(self) -> usize {
        self.layout().column_count()
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutStrategy::Paired => "paired",
            LayoutStrategy::Stacked => "stacked",
        }
    }
}

/// Row/column cursor for the next placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertionPosition {
    row: usize,
    column: usize,
}

impl InsertionPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    fn down(self, rows: usize) -> Self {
        Self {
            row: self.row + rows,
            column: self.column,
        }
    }
}

/// Grid cell a node is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
    pub column_span: usize,
}

impl Cell {
    pub fn at(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            column_span: 1,
        }
    }
}

/// The three placement operations every strategy supports.
pub trait Layout {
    /// Number of grid columns one logical form column occupies.
    fn column_count(&self) -> usize;

    /// Place a label and its control.
    fn place_pair(
        &self,
        at: InsertionPosition,
        label: Node,
        control: Node,
        grid: &mut dyn GridContainer,
    ) -> InsertionPosition;

    /// Place a node on a row of its own.
    fn place_single(&self, at: InsertionPosition, node: Node, grid: &mut dyn GridContainer) -> InsertionPosition {
        grid.add(node, Cell::at(at.row, at.column));
        at.down(1)
    }

    /// Place a separator spanning every column of the strategy.
    fn place_separator(&self, at: InsertionPosition, grid: &mut dyn GridContainer) -> InsertionPosition {
        grid.add(
            Node::Separator,
            Cell {
                row: at.row,
                column: at.column,
                column_span: self.column_count(),
            },
        );
        at.down(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PairedLayout;

impl Layout for PairedLayout {
    fn column_count(&self) -> usize {
        2
    }

    fn place_pair(
        &self,
        at: InsertionPosition,
        label: Node,
        control: Node,
        grid: &mut dyn GridContainer,
    ) -> InsertionPosition {
        grid.add(label, Cell::at(at.row, at.column));
        grid.add(control, Cell::at(at.row, at.column + 1));
        at.down(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StackedLayout;

impl Layout for StackedLayout {
    fn column_count(&self) -> usize {
        1
    }

    fn place_pair(
        &self,
        at: InsertionPosition,
        label: Node,
        control: Node,
        grid: &mut dyn GridContainer,
    ) -> InsertionPosition {
        grid.add(label, Cell::at(at.row, at.column));
        grid.add(control, Cell::at(at.row + 1, at.column));
        at.down(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::headless::HeadlessGrid;

    fn label(text: &str) -> Node {
        Node::label(text, None)
    }

    #[test]
    fn paired_places_side_by_side() {
        let mut grid = HeadlessGrid::default();
        let next = PairedLayout.place_pair(InsertionPosition::default(), label("a"), label("b"), &mut grid);
        assert_eq!(next, InsertionPosition::new(1, 0));
        let cells: Vec<Cell> = grid.cells().collect();
        assert_eq!(cells, [Cell::at(0, 0), Cell::at(0, 1)]);
    }

    #[test]
    fn stacked_places_label_above_control() {
        let mut grid = HeadlessGrid::default();
        let next = StackedLayout.place_pair(InsertionPosition::new(3, 0), label("a"), label("b"), &mut grid);
        assert_eq!(next, InsertionPosition::new(5, 0));
        let cells: Vec<Cell> = grid.cells().collect();
        assert_eq!(cells, [Cell::at(3, 0), Cell::at(4, 0)]);
    }

    #[test]
    fn separators_span_the_column_count() {
        for strategy in [LayoutStrategy::Paired, LayoutStrategy::Stacked] {
            let mut grid = HeadlessGrid::default();
            let next = strategy
                .layout()
                .place_separator(InsertionPosition::new(2, 0), &mut grid);
            assert_eq!(next.row(), 3);
            let cells: Vec<Cell> = grid.cells().collect();
            assert_eq!(cells[0].column_span, strategy.column_count());
        }
    }

    #[test]
    fn singles_advance_one_row_in_both_strategies() {
        for strategy in [LayoutStrategy::Paired, LayoutStrategy::Stacked] {
            let mut grid = HeadlessGrid::default();
            let next = strategy
                .layout()
                .place_single(InsertionPosition::new(0, 0), label("heading"), &mut grid);
            assert_eq!(next, InsertionPosition::new(1, 0));
        }
    }
}
