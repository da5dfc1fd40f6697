//! Tests for the sparse matrix primitives.
//!
//! Tests cover:
//! - Implicit defaults and default-value removal
//! - Row views on rank-2 and rank-3 matrices
//! - Agreement with a plain hash-map model under random writes

use proptest::prelude::*;
use spatial_lattice::{LatticeError, SparseMatrix};
use std::collections::HashMap;

#[test]
fn test_absent_entries_read_default() {
    let m: SparseMatrix<f64> = SparseMatrix::new(&[4, 6]).unwrap();
    assert_eq!(m.get(&[3, 5]).unwrap(), 0.0);
    assert!(m.is_empty());
    assert_eq!(m.row_max(2).unwrap(), None);
}

#[test]
fn test_set_and_overwrite() {
    let mut m: SparseMatrix<f64> = SparseMatrix::new(&[4, 6]).unwrap();
    m.set(&[1, 2], 0.4).unwrap();
    m.set(&[1, 2], 0.7).unwrap();
    m.set(&[1, 5], 0.2).unwrap();

    assert_eq!(m.nnz(), 2);
    assert_eq!(m.row(1).unwrap(), vec![(2, 0.7), (5, 0.2)]);
    assert_eq!(m.row_max(1).unwrap(), Some(0.7));
    assert!((m.row_sum(1).unwrap() - 0.9).abs() < 1e-12);

    m.set(&[1, 2], 0.0).unwrap();
    assert_eq!(m.nnz(), 1);
    assert_eq!(m.row_offsets(1).unwrap(), vec![5]);
}

#[test]
fn test_rank_three_rows() {
    // Row 1 spans offsets 0..12 over the trailing [3, 4] block
    let mut m: SparseMatrix<u32> = SparseMatrix::new(&[2, 3, 4]).unwrap();
    m.set(&[1, 0, 3], 7).unwrap();
    m.set(&[1, 2, 1], 9).unwrap();
    m.set(&[0, 1, 1], 1).unwrap();

    assert_eq!(m.row_len(), 12);
    assert_eq!(m.row(1).unwrap(), vec![(3, 7), (9, 9)]);
    assert_eq!(m.get_index(12 + 9).unwrap(), 9);
    assert_eq!(m.populated_rows().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn test_clear_row_leaves_others() {
    let mut m: SparseMatrix<bool> = SparseMatrix::new(&[3, 5]).unwrap();
    for row in 0..3 {
        m.set(&[row, row], true).unwrap();
    }
    m.clear_row(1).unwrap();

    assert_eq!(m.nnz(), 2);
    assert_eq!(m.row_nnz(1).unwrap(), 0);
    assert!(m.get(&[2, 2]).unwrap());
    assert_eq!(m.populated_rows().collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn test_bad_coordinates() {
    let mut m: SparseMatrix<f64> = SparseMatrix::new(&[4, 6]).unwrap();

    assert!(m.get(&[4, 0]).unwrap_err().is_index_error());
    assert!(m.set(&[0, 6], 1.0).unwrap_err().is_index_error());
    assert!(matches!(
        m.get(&[1]),
        Err(LatticeError::RankMismatch { expected: 2, actual: 1 })
    ));
    assert!(m.row(4).unwrap_err().is_index_error());
    assert!(m.get_index(24).unwrap_err().is_index_error());
}

#[test]
fn test_empty_dims_rejected() {
    assert!(matches!(
        SparseMatrix::<f64>::new(&[]),
        Err(LatticeError::Configuration(_))
    ));
    assert!(matches!(
        SparseMatrix::<f64>::new(&[3, 0]),
        Err(LatticeError::Configuration(_))
    ));
}

proptest! {
    #[test]
    fn prop_matches_hash_map_model(
        writes in proptest::collection::vec((0usize..5, 0usize..8, 0u8..4), 0..80),
    ) {
        let mut m: SparseMatrix<u8> = SparseMatrix::new(&[5, 8]).unwrap();
        let mut model: HashMap<(usize, usize), u8> = HashMap::new();

        for (r, c, v) in writes {
            m.set(&[r, c], v).unwrap();
            if v == 0 {
                model.remove(&(r, c));
            } else {
                model.insert((r, c), v);
            }
        }

        prop_assert_eq!(m.nnz(), model.len());
        for r in 0..5 {
            let mut expected: Vec<(usize, u8)> = model
                .iter()
                .filter(|((row, _), _)| *row == r)
                .map(|(&(_, c), &v)| (c, v))
                .collect();
            expected.sort_unstable();
            prop_assert_eq!(m.row(r).unwrap(), expected);
            for c in 0..8 {
                prop_assert_eq!(m.get(&[r, c]).unwrap(), model.get(&(r, c)).copied().unwrap_or(0));
            }
        }
    }
}
