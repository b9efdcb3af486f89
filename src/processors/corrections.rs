//! Named corrections for known defects in the field survey table
//!
//! Each correction takes the table by value and returns the corrected table.
//! All of them are idempotent.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::{field_column_kind, Cell, CellKind, CropType, Table};
use crate::utils::constants::{FIELD_COLUMNS, FIELD_ID};

/// Map a configured label onto the canonical field column label
pub fn canonical_field_column(name: &str) -> Option<&'static str> {
    FIELD_COLUMNS
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(name.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    /// Labels already match the data
    Correct,
    /// Each column holds the data the other label describes
    Swapped,
}

/// Repairs an upstream defect where two columns arrive carrying each other's
/// labels (the survey export delivers `Crop_type` and `Annual_yield` swapped).
///
/// Precondition: the source is known to swap the pair. The data is checked
/// before relabeling: one column of the pair must be text and the other
/// numeric, and labels are exchanged only when each column's data matches
/// the other label. When the pair holds no data to decide from, the column
/// positions decide: labels out of the documented field order are swapped
/// back. Correctly labeled input is returned unchanged, so the correction can
/// be applied any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSwap {
    left: &'static str,
    right: &'static str,
}

impl ColumnSwap {
    pub fn new(left: &str, right: &str) -> Result<Self> {
        let resolve = |name: &str| {
            canonical_field_column(name).ok_or_else(|| {
                ProcessingError::Config(format!("Unknown column in columns_to_rename: '{}'", name))
            })
        };
        let left = resolve(left)?;
        let right = resolve(right)?;

        if left == right {
            return Err(ProcessingError::Config(format!(
                "Cannot swap column '{}' with itself",
                left
            )));
        }

        let left_is_text = field_column_kind(left) == Some(CellKind::Text);
        let right_is_text = field_column_kind(right) == Some(CellKind::Text);
        if left_is_text == right_is_text {
            return Err(ProcessingError::Config(format!(
                "Swap of '{}' and '{}' cannot be detected from the data: exactly one must be a text column",
                left, right
            )));
        }

        // keep a stable order so symmetric config entries collapse to one swap
        let (left, right) = if left <= right { (left, right) } else { (right, left) };
        Ok(Self { left, right })
    }

    /// Build the swaps named by a `columns_to_rename` map; `a -> b` and `b -> a`
    /// describe the same swap
    pub fn from_rename_map(map: &BTreeMap<String, String>) -> Result<Vec<ColumnSwap>> {
        let mut swaps = BTreeSet::new();
        for (from, to) in map {
            let swap = ColumnSwap::new(from, to)?;
            swaps.insert((swap.left, swap.right));
        }
        Ok(swaps
            .into_iter()
            .map(|(left, right)| ColumnSwap { left, right })
            .collect())
    }

    pub fn state(&self, table: &Table) -> Result<SwapState> {
        let left_index = table.require_column(self.left)?;
        let right_index = table.require_column(self.right)?;

        // empty or all-null columns: fall back to the documented column order
        let (Some(left_observed), Some(right_observed)) =
            (table.column_kind(left_index), table.column_kind(right_index))
        else {
            return Ok(self.positional_state(left_index, right_index));
        };

        let expects = |column: &str, observed: CellKind| {
            field_column_kind(column).is_some_and(|kind| kind.accepts(observed))
        };

        if expects(self.left, left_observed) && expects(self.right, right_observed) {
            Ok(SwapState::Correct)
        } else if expects(self.left, right_observed) && expects(self.right, left_observed) {
            Ok(SwapState::Swapped)
        } else {
            Err(ProcessingError::data(format!(
                "Columns '{}' ({:?}) and '{}' ({:?}) match neither labeling",
                self.left, left_observed, self.right, right_observed
            )))
        }
    }

    fn positional_state(&self, left_index: usize, right_index: usize) -> SwapState {
        let documented = |name: &str| FIELD_COLUMNS.iter().position(|c| *c == name);
        let documented_order = documented(self.left) < documented(self.right);
        if documented_order == (left_index < right_index) {
            SwapState::Correct
        } else {
            SwapState::Swapped
        }
    }

    pub fn apply(&self, mut table: Table) -> Result<Table> {
        match self.state(&table)? {
            SwapState::Swapped => {
                let left_index = table.require_column(self.left)?;
                let right_index = table.require_column(self.right)?;
                table.swap_labels(left_index, right_index)?;
                info!("Swapped labels of '{}' and '{}'", self.left, self.right);
            }
            SwapState::Correct => {
                debug!("'{}' and '{}' already correctly labeled", self.left, self.right);
            }
        }
        Ok(table)
    }
}

/// Trim and lower-case a categorical value
pub fn normalize_label(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Harmonizes crop labels and rejects anything outside the known crops
#[derive(Debug, Clone)]
pub struct CropTypeNormalizer {
    column: &'static str,
    renames: HashMap<String, String>,
}

impl CropTypeNormalizer {
    pub fn new(column: &'static str, values_to_rename: &BTreeMap<String, String>) -> Self {
        let renames = values_to_rename
            .iter()
            .map(|(from, to)| (normalize_label(from), normalize_label(to)))
            .collect();
        Self { column, renames }
    }

    pub fn normalize(&self, value: &str) -> String {
        let key = normalize_label(value);
        match self.renames.get(&key) {
            Some(renamed) => renamed.clone(),
            None => key,
        }
    }

    pub fn apply(&self, mut table: Table) -> Result<Table> {
        let column = table.require_column(self.column)?;
        let id_column = table.column_index(FIELD_ID);
        let ids: Vec<Option<Cell>> = table
            .rows()
            .iter()
            .map(|row| id_column.map(|i| row[i].clone()))
            .collect();

        let mut changed = 0usize;
        table.try_map_column(column, |row, cell| {
            let describe = || match &ids[row] {
                Some(id) => format!("row {} ({} {})", row, FIELD_ID, id),
                None => format!("row {}", row),
            };

            let raw = cell.as_str().ok_or_else(|| {
                ProcessingError::validation(format!(
                    "{} in {} is not a crop label: '{}'",
                    self.column,
                    describe(),
                    cell
                ))
            })?;

            let normalized = self.normalize(raw);
            if CropType::parse(&normalized).is_none() {
                return Err(ProcessingError::validation(format!(
                    "{} in {} is '{}', expected one of: {}",
                    self.column,
                    describe(),
                    raw,
                    CropType::ALL.map(|c| c.as_str()).join(", ")
                )));
            }

            if normalized != raw {
                changed += 1;
            }
            Ok(Cell::Text(normalized))
        })?;

        info!("Normalized {} {} values", changed, self.column);
        Ok(table)
    }
}

/// Treats negative elevations as sign errors at data entry
#[derive(Debug, Clone)]
pub struct ElevationCorrection {
    column: &'static str,
}

impl ElevationCorrection {
    pub fn new(column: &'static str) -> Self {
        Self { column }
    }

    pub fn apply(&self, mut table: Table) -> Result<Table> {
        let column = table.require_column(self.column)?;
        let mut corrected = 0usize;

        table.try_map_column(column, |row, cell| match cell {
            Cell::Integer(v) if *v < 0 => {
                corrected += 1;
                Ok(Cell::Integer(v.saturating_abs()))
            }
            Cell::Real(v) if *v < 0.0 => {
                corrected += 1;
                Ok(Cell::Real(v.abs()))
            }
            Cell::Text(s) => Err(ProcessingError::data(format!(
                "{} in row {} is not numeric: '{}'",
                self.column, row, s
            ))),
            other => Ok(other.clone()),
        })?;

        if corrected > 0 {
            info!("Corrected sign of {} negative {} values", corrected, self.column);
        }
        Ok(table)
    }
}
