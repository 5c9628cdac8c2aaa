//! Slot Grid - Slot-to-component lookup.
//!
//! Row-major grid the size of the open window. Each cell holds the index of
//! the leaf component drawing into it, or `usize::MAX` when empty. Filled on
//! mount, cleared on unmount, read by interaction dispatch.

use crate::types::{ComponentId, SlotIndex, SlotRect};

const EMPTY: usize = usize::MAX;

pub(crate) struct SlotGrid {
    columns: u16,
    rows: u16,
    cells: Vec<usize>,
}

impl SlotGrid {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            cells: vec![EMPTY; columns as usize * rows as usize],
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Resize the grid, clearing all contents.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        self.cells.resize(columns as usize * rows as usize, EMPTY);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Assign every slot of `rect` to `component`. Slots outside the grid are skipped.
    pub fn fill_rect(&mut self, rect: &SlotRect, component: ComponentId) {
        for row in rect.row..rect.row.saturating_add(rect.height).min(self.rows) {
            for column in rect.column..rect.column.saturating_add(rect.width).min(self.columns) {
                let index = row as usize * self.columns as usize + column as usize;
                self.cells[index] = component.0;
            }
        }
    }

    /// Empty every slot owned by `component`.
    pub fn clear_component(&mut self, component: ComponentId) {
        for cell in self.cells.iter_mut().filter(|cell| **cell == component.0) {
            *cell = EMPTY;
        }
    }

    pub fn get(&self, slot: SlotIndex) -> Option<ComponentId> {
        match self.cells.get(slot) {
            Some(&index) if index != EMPTY => Some(ComponentId(index)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_grid_fill_rect() {
        let mut grid = SlotGrid::new(9, 3);
        grid.fill_rect(&SlotRect::new(1, 1, 2, 2), ComponentId(4));

        assert_eq!(grid.get(10), Some(ComponentId(4)));
        assert_eq!(grid.get(20), Some(ComponentId(4)));
        assert_eq!(grid.get(9), None);
        assert_eq!(grid.get(12), None);
    }

    #[test]
    fn test_slot_grid_clear_component() {
        let mut grid = SlotGrid::new(9, 1);
        grid.fill_rect(&SlotRect::new(0, 0, 2, 1), ComponentId(1));
        grid.fill_rect(&SlotRect::new(2, 0, 1, 1), ComponentId(2));

        grid.clear_component(ComponentId(1));
        assert_eq!(grid.get(0), None);
        assert_eq!(grid.get(1), None);
        assert_eq!(grid.get(2), Some(ComponentId(2)));
    }

    #[test]
    fn test_slot_grid_out_of_bounds() {
        let mut grid = SlotGrid::new(3, 3);
        grid.fill_rect(&SlotRect::new(2, 2, 4, 4), ComponentId(0));

        assert_eq!(grid.get(8), Some(ComponentId(0)));
        assert_eq!(grid.get(9), None);
        assert_eq!(grid.get(100), None);
    }

    #[test]
    fn test_slot_grid_resize_clears() {
        let mut grid = SlotGrid::new(3, 3);
        grid.fill_rect(&SlotRect::new(0, 0, 3, 3), ComponentId(0));
        grid.resize(5, 1);

        assert_eq!(grid.size(), 5);
        assert_eq!(grid.get(0), None);
        assert_eq!((grid.columns(), grid.rows()), (5, 1));
    }
}
