//! Optimal assignment between two label sets
//!
//! Kuhn-Munkres with row and column potentials, `O(n^3)` on a square cost matrix.
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Returns, for every row, the column assigned to it so that the total weight is maximal.
///
/// Rectangular inputs are padded with zero weights, so every row of a tall matrix still receives
/// a distinct column index which may lie outside the original column range.
pub fn max_weight_assignment<S: Data<Elem = f64>>(weights: &ArrayBase<S, Ix2>) -> Vec<usize> {
    let (nrows, ncols) = weights.dim();
    let n = nrows.max(ncols);
    if n == 0 {
        return Vec::new();
    }

    let max = weights.iter().cloned().fold(0.0, f64::max);
    let mut cost = Array2::from_elem((n, n), max);
    cost.slice_mut(ndarray::s![..nrows, ..ncols])
        .zip_mut_with(weights, |c, w| *c = max - w);

    let assignment = min_cost_assignment(&cost);
    assignment.into_iter().take(nrows).collect()
}

/// Square minimum-cost assignment, returns the column assigned to each row
fn min_cost_assignment(cost: &Array2<f64>) -> Vec<usize> {
    let n = cost.nrows();
    // one-based bookkeeping, index 0 is the virtual start column
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut row_of = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        row_of[0] = row;
        let mut col0 = 0;
        let mut min_to = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = row_of[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = cost[[row0 - 1, col - 1]] - u[row0] - v[col];
                if reduced < min_to[col] {
                    min_to[col] = reduced;
                    way[col] = col0;
                }
                if min_to[col] < delta {
                    delta = min_to[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if used[col] {
                    u[row_of[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_to[col] -= delta;
                }
            }

            col0 = col1;
            if row_of[col0] == 0 {
                break;
            }
        }

        // augment along the alternating path
        loop {
            let prev = way[col0];
            row_of[col0] = row_of[prev];
            col0 = prev;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for col in 1..=n {
        assignment[row_of[col] - 1] = col - 1;
    }

    assignment
}
