use std::collections::BTreeMap;

use super::model::{CellValue, EarningsTable};

// ---------------------------------------------------------------------------
// Equality constraints (the dashboard's single-choice selectors)
// ---------------------------------------------------------------------------

/// One equality predicate: keep rows whose `column` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub column: String,
    pub value: CellValue,
}

/// Per-column selection state: `None` means "All" (no constraint).
/// Only columns that actually have a selector appear as keys.
pub type FilterSelection = BTreeMap<String, Option<CellValue>>;

/// Collapse the UI selection into the active constraint list.
pub fn constraints_from(selection: &FilterSelection) -> Vec<Constraint> {
    selection
        .iter()
        .filter_map(|(col, choice)| {
            choice.as_ref().map(|value| Constraint {
                column: col.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Apply all constraints, AND-combined, producing a fresh table.
///
/// Rules per constraint:
/// * the column is absent from the table → the constraint is a no-op
/// * the row's value differs (or the row lacks the cell) → row is dropped
///
/// Constraints commute, and an all-rows-filtered result is a valid empty
/// table rather than an error.
pub fn apply(table: &EarningsTable, constraints: &[Constraint]) -> EarningsTable {
    let active: Vec<&Constraint> = constraints
        .iter()
        .filter(|c| table.has_column(&c.column))
        .collect();

    let records: Vec<_> = table
        .records
        .iter()
        .filter(|rec| {
            active
                .iter()
                .all(|c| rec.get(&c.column) == Some(&c.value))
        })
        .cloned()
        .collect();

    EarningsTable::new(table.column_names.clone(), records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn table() -> EarningsTable {
        let rows = vec![
            row(&[("industry", "IT"), ("skill", "Rust")]),
            row(&[("industry", "IT"), ("skill", "Python")]),
            row(&[("industry", "Art"), ("skill", "Rust")]),
        ];
        EarningsTable::new(vec!["industry".into(), "skill".into()], rows)
    }

    fn row(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::String(v.to_string())))
            .collect()
    }

    fn constraint(col: &str, val: &str) -> Constraint {
        Constraint {
            column: col.into(),
            value: CellValue::String(val.into()),
        }
    }

    #[test]
    fn no_constraints_keeps_every_row() {
        let t = table();
        let out = apply(&t, &[]);
        assert_eq!(out.len(), t.len());
    }

    #[test]
    fn constraints_and_together_and_commute() {
        let t = table();
        let a = constraint("industry", "IT");
        let b = constraint("skill", "Rust");

        let ab = apply(&t, &[a.clone(), b.clone()]);
        let ba = apply(&t, &[b, a]);
        assert_eq!(ab.len(), 1);
        assert_eq!(
            ab.records[0].get("skill"),
            Some(&CellValue::String("Rust".into()))
        );
        assert_eq!(ba.len(), ab.len());
    }

    #[test]
    fn filtered_rows_are_a_subset_of_the_input() {
        let t = table();
        let out = apply(&t, &[constraint("industry", "IT")]);
        assert_eq!(out.len(), 2);
        for rec in &out.records {
            assert_eq!(
                rec.get("industry"),
                Some(&CellValue::String("IT".into()))
            );
        }
        // Derived table, column set preserved.
        assert_eq!(out.column_names, t.column_names);
    }

    #[test]
    fn absent_column_constraint_is_a_no_op() {
        let t = table();
        let out = apply(&t, &[constraint("platform", "Upwork")]);
        assert_eq!(out.len(), t.len());
    }

    #[test]
    fn removing_all_rows_yields_a_valid_empty_table() {
        let t = table();
        let out = apply(&t, &[constraint("industry", "Finance")]);
        assert!(out.is_empty());
        assert_eq!(out.column_names, t.column_names);
    }

    #[test]
    fn selection_with_all_choices_produces_no_constraints() {
        let mut selection = FilterSelection::new();
        selection.insert("industry".into(), None);
        selection.insert(
            "skill".into(),
            Some(CellValue::String("Rust".into())),
        );
        let constraints = constraints_from(&selection);
        assert_eq!(constraints, vec![constraint("skill", "Rust")]);
    }
}
