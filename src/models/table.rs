use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProcessingError, Result};

/// A single value in a [`Table`], mirroring SQLite storage classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Integer,
    Real,
    Text,
}

impl CellKind {
    /// Whether a column holding `observed` values can stand for a column of this kind
    pub fn accepts(&self, observed: CellKind) -> bool {
        match self {
            CellKind::Integer => observed == CellKind::Integer,
            CellKind::Real => matches!(observed, CellKind::Integer | CellKind::Real),
            CellKind::Text => observed == CellKind::Text,
        }
    }
}

impl Cell {
    /// Infer a typed cell from raw CSV text
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Null
        } else if let Ok(value) = trimmed.parse::<i64>() {
            Cell::Integer(value)
        } else if let Ok(value) = trimmed.parse::<f64>() {
            Cell::Real(value)
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Null => None,
            Cell::Integer(_) => Some(CellKind::Integer),
            Cell::Real(_) => Some(CellKind::Real),
            Cell::Text(_) => Some(CellKind::Text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            Cell::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// How strictly [`Table::require_columns`] compares labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCheck {
    /// Same labels, any order
    ExactSet,
    /// Same labels, same order
    ExactOrder,
    /// At least these labels, extra columns allowed
    Contains,
}

/// In-memory result set: ordered column labels plus rows of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ProcessingError::data(format!(
                "Row {} has {} cells but the table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column label, exact match first then case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.trim().eq_ignore_ascii_case(name.trim()))
            })
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ProcessingError::data(format!("Column '{}' not found", name)))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |r| r.get(column))
    }

    /// Dominant kind of the non-null values in a column; any text makes it text
    pub fn column_kind(&self, column: usize) -> Option<CellKind> {
        let mut kind = None;
        for cell in self.column_values(column) {
            match cell.kind() {
                Some(CellKind::Text) => return Some(CellKind::Text),
                Some(CellKind::Real) => kind = Some(CellKind::Real),
                Some(CellKind::Integer) if kind.is_none() => kind = Some(CellKind::Integer),
                _ => {}
            }
        }
        kind
    }

    /// Exchange the labels of two columns, leaving the data in place
    pub fn swap_labels(&mut self, left: usize, right: usize) -> Result<()> {
        if left >= self.width() || right >= self.width() {
            return Err(ProcessingError::data(format!(
                "Cannot swap columns {} and {} in a table of width {}",
                left,
                right,
                self.width()
            )));
        }
        self.columns.swap(left, right);
        Ok(())
    }

    /// Rewrite every cell of one column, stopping on the first error
    pub fn try_map_column<F>(&mut self, column: usize, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &Cell) -> Result<Cell>,
    {
        if column >= self.width() {
            return Err(ProcessingError::data(format!(
                "Column index {} out of range",
                column
            )));
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            let updated = f(index, &row[column])?;
            row[column] = updated;
        }
        Ok(())
    }

    /// Compare the table's labels with an expected list
    pub fn require_columns(&self, expected: &[&str], check: ColumnCheck) -> Result<()> {
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|e| !self.columns.iter().any(|c| c == e))
            .collect();
        let unexpected: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !expected.contains(c))
            .collect();

        let set_ok =
            missing.is_empty() && (check == ColumnCheck::Contains || unexpected.is_empty());
        if !set_ok {
            return Err(ProcessingError::data(format!(
                "Unexpected column set: missing [{}], unexpected [{}]",
                missing.join(", "),
                if check == ColumnCheck::Contains {
                    String::new()
                } else {
                    unexpected.join(", ")
                }
            )));
        }

        if check == ColumnCheck::ExactOrder
            && self.columns.iter().map(String::as_str).ne(expected.iter().copied())
        {
            return Err(ProcessingError::data(format!(
                "Columns out of order: expected [{}], found [{}]",
                expected.join(", "),
                self.columns.join(", ")
            )));
        }

        Ok(())
    }
}
