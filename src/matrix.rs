//! Row-major `rows × columns` container used for tiles, centers and
//! measurements.
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileMatrix<T> {
    rows: usize,
    columns: usize,
    cells: Vec<T>,
}

impl<T> TileMatrix<T> {
    /// Build from row-major cells. Panics if the cell count does not match.
    pub fn from_cells(rows: usize, columns: usize, cells: Vec<T>) -> Self {
        assert_eq!(cells.len(), rows * columns, "tile matrix shape mismatch");
        Self {
            rows,
            columns,
            cells,
        }
    }

    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * columns);
        for r in 0..rows {
            for c in 0..columns {
                cells.push(f(r, c));
            }
        }
        Self::from_cells(rows, columns, cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        (row < self.rows && column < self.columns).then(|| &self.cells[row * self.columns + column])
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut T> {
        if row < self.rows && column < self.columns {
            Some(&mut self.cells[row * self.columns + column])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &T> + '_ {
        self.cells.iter().skip(column).step_by(self.columns.max(1))
    }

    /// Row-major iteration yielding `(row, column, cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / columns, i % columns, cell))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn map<U>(&self, mut f: impl FnMut(usize, usize, &T) -> U) -> TileMatrix<U> {
        let cells = self.iter().map(|(r, c, cell)| f(r, c, cell)).collect();
        TileMatrix::from_cells(self.rows, self.columns, cells)
    }

    pub fn first(&self) -> Option<&T> {
        self.cells.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.cells.last()
    }
}
