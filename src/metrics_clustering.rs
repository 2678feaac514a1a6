//! Agreement metrics between a predicted clustering and ground truth
//!
//! All metrics are computed from the contingency table of the two partitions. The
//! [`evaluate`] function returns the disagreement triple reported by the experiment drivers:
//! the clustering error rate, `1 - NMI` and `1 - ARI`.
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;

use crate::dataset::distinct_labels;
use crate::error::{Error, Result};
use crate::hungarian::max_weight_assignment;

/// Co-occurrence counts of true classes (rows) and predicted clusters (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    classes: Vec<usize>,
    clusters: Vec<usize>,
    counts: Array2<f64>,
}

impl ContingencyTable {
    /// Builds the table for two aligned label vectors
    pub fn new<S1, S2>(
        labels: &ArrayBase<S1, Ix1>,
        labels_pred: &ArrayBase<S2, Ix1>,
    ) -> Result<ContingencyTable>
    where
        S1: Data<Elem = usize>,
        S2: Data<Elem = usize>,
    {
        if labels.len() != labels_pred.len() {
            return Err(Error::LabelLength(labels.len(), labels_pred.len()));
        }
        if labels.is_empty() {
            return Err(Error::NotEnoughSamples);
        }

        let classes = distinct_labels(labels);
        let clusters = distinct_labels(labels_pred);
        let class_idx = index_of(&classes);
        let cluster_idx = index_of(&clusters);

        let mut counts = Array2::zeros((classes.len(), clusters.len()));
        for (t, p) in labels.iter().zip(labels_pred.iter()) {
            counts[[class_idx[t], cluster_idx[p]]] += 1.0;
        }

        Ok(ContingencyTable {
            classes,
            clusters,
            counts,
        })
    }

    /// Distinct true labels, in row order
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Distinct predicted labels, in column order
    pub fn clusters(&self) -> &[usize] {
        &self.clusters
    }

    /// Raw co-occurrence counts
    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    /// Total number of samples
    pub fn nsamples(&self) -> f64 {
        self.counts.sum()
    }

    fn class_sizes(&self) -> Array1<f64> {
        self.counts.sum_axis(Axis(1))
    }

    fn cluster_sizes(&self) -> Array1<f64> {
        self.counts.sum_axis(Axis(0))
    }

    /// Fraction of samples misassigned after the best one-to-one matching of clusters to classes
    ///
    /// Clusters that cannot be matched to any class (because there are more clusters than
    /// classes) count entirely as errors.
    pub fn error_rate(&self) -> f64 {
        let assignment = max_weight_assignment(&self.counts);
        let matched: f64 = assignment
            .iter()
            .enumerate()
            .filter(|(_, col)| **col < self.clusters.len())
            .map(|(row, col)| self.counts[[row, *col]])
            .sum();

        1.0 - matched / self.nsamples()
    }

    /// Mutual information of the two partitions in nats
    pub fn mutual_info(&self) -> f64 {
        let n = self.nsamples();
        let a = self.class_sizes();
        let b = self.cluster_sizes();

        let mut mi = 0.0;
        for ((i, j), n_ij) in self.counts.indexed_iter() {
            if *n_ij > 0.0 {
                mi += n_ij / n * (n * n_ij / (a[i] * b[j])).ln();
            }
        }

        mi.max(0.0)
    }

    /// Normalized mutual information, normalized by the geometric mean of both entropies
    pub fn normalized_mutual_info(&self) -> f64 {
        // both labelings put everything into one cluster: a perfect match
        if self.classes.len() == 1 && self.clusters.len() == 1 {
            return 1.0;
        }

        let mi = self.mutual_info();
        if mi == 0.0 {
            return 0.0;
        }

        let n = self.nsamples();
        let h_true = entropy(&self.class_sizes(), n);
        let h_pred = entropy(&self.cluster_sizes(), n);
        let normalizer = (h_true * h_pred).sqrt().max(f64::EPSILON);

        mi / normalizer
    }

    /// Rand index adjusted for chance, computed from the pair confusion matrix
    pub fn adjusted_rand_index(&self) -> f64 {
        let n = self.nsamples();
        let sum_squares = self.counts.mapv(|c| c * c).sum();
        let class_sizes = self.class_sizes();
        let cluster_sizes = self.cluster_sizes();

        let tp = sum_squares - n;
        let fp = self.counts.dot(&cluster_sizes).sum() - sum_squares;
        let fn_ = self.counts.t().dot(&class_sizes).sum() - sum_squares;
        let tn = n * n - fp - fn_ - sum_squares;

        if fn_ == 0.0 && fp == 0.0 {
            return 1.0;
        }

        2.0 * (tp * tn - fn_ * fp) / ((tp + fn_) * (fn_ + tn) + (tp + fp) * (fp + tn))
    }
}

fn index_of(values: &[usize]) -> HashMap<usize, usize> {
    values.iter().enumerate().map(|(i, v)| (*v, i)).collect()
}

fn entropy(sizes: &Array1<f64>, n: f64) -> f64 {
    sizes
        .iter()
        .filter(|s| **s > 0.0)
        .map(|s| {
            let p = s / n;
            -p * p.ln()
        })
        .sum()
}

/// Disagreement between predicted and true clusterings
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Fraction of misclustered samples under the best label permutation
    pub error_rate: f64,
    /// `1 - NMI` with geometric normalization
    pub one_minus_nmi: f64,
    /// `1 - ARI`
    pub one_minus_ari: f64,
}

impl Evaluation {
    /// The triple in reporting order
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.error_rate, self.one_minus_nmi, self.one_minus_ari)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error rate = {:.4}, 1-NMI = {:.4}, 1-ARI = {:.4}",
            self.error_rate, self.one_minus_nmi, self.one_minus_ari
        )
    }
}

/// Compares predicted labels to known ground truth
pub fn evaluate<S1, S2>(
    labels: &ArrayBase<S1, Ix1>,
    labels_pred: &ArrayBase<S2, Ix1>,
) -> Result<Evaluation>
where
    S1: Data<Elem = usize>,
    S2: Data<Elem = usize>,
{
    let table = ContingencyTable::new(labels, labels_pred)?;

    Ok(Evaluation {
        error_rate: table.error_rate(),
        one_minus_nmi: 1.0 - table.normalized_mutual_info(),
        one_minus_ari: 1.0 - table.adjusted_rand_index(),
    })
}

/// Clustering error rate under the best label permutation
pub fn error_rate<S1, S2>(
    labels: &ArrayBase<S1, Ix1>,
    labels_pred: &ArrayBase<S2, Ix1>,
) -> Result<f64>
where
    S1: Data<Elem = usize>,
    S2: Data<Elem = usize>,
{
    ContingencyTable::new(labels, labels_pred).map(|t| t.error_rate())
}

/// Normalized mutual information with geometric-mean normalization
pub fn normalized_mutual_info<S1, S2>(
    labels: &ArrayBase<S1, Ix1>,
    labels_pred: &ArrayBase<S2, Ix1>,
) -> Result<f64>
where
    S1: Data<Elem = usize>,
    S2: Data<Elem = usize>,
{
    ContingencyTable::new(labels, labels_pred).map(|t| t.normalized_mutual_info())
}

/// Adjusted Rand index
pub fn adjusted_rand_index<S1, S2>(
    labels: &ArrayBase<S1, Ix1>,
    labels_pred: &ArrayBase<S2, Ix1>,
) -> Result<f64>
where
    S1: Data<Elem = usize>,
    S2: Data<Elem = usize>,
{
    ContingencyTable::new(labels, labels_pred).map(|t| t.adjusted_rand_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn contingency_counts() {
        let table = ContingencyTable::new(&array![0, 0, 1, 1, 2], &array![5, 5, 5, 7, 7]).unwrap();
        assert_eq!(table.classes(), &[0, 1, 2]);
        assert_eq!(table.clusters(), &[5, 7]);
        assert_eq!(table.counts(), &array![[2., 0.], [1., 1.], [0., 1.]]);
    }

    #[test]
    fn permuted_labels_are_a_perfect_match() {
        let labels = array![0, 0, 1, 1, 2, 2, 2];
        let labels_pred = array![4, 4, 0, 0, 9, 9, 9];

        let eval = evaluate(&labels, &labels_pred).unwrap();
        assert_abs_diff_eq!(eval.error_rate, 0.0);
        assert_abs_diff_eq!(eval.one_minus_nmi, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval.one_minus_ari, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn invariant_under_consistent_relabeling() {
        let labels = array![0, 0, 1, 1, 1, 2, 2, 0];
        let labels_pred = array![0, 1, 1, 1, 2, 2, 2, 0];
        let relabel = |l: &usize| [7, 3, 11][*l];

        let eval = evaluate(&labels, &labels_pred).unwrap();
        let eval_relabeled = evaluate(&labels.map(relabel), &labels_pred.map(relabel)).unwrap();

        assert_abs_diff_eq!(eval.error_rate, eval_relabeled.error_rate);
        assert_abs_diff_eq!(eval.one_minus_nmi, eval_relabeled.one_minus_nmi, epsilon = 1e-12);
        assert_abs_diff_eq!(eval.one_minus_ari, eval_relabeled.one_minus_ari, epsilon = 1e-12);
    }

    #[test]
    fn error_rate_counts_misassigned_samples() {
        let labels = array![0, 0, 0, 1, 1, 1];
        let labels_pred = array![1, 1, 0, 0, 0, 0];
        // best map: 1 -> 0, 0 -> 1, one sample of class 0 lands in cluster 0
        assert_abs_diff_eq!(error_rate(&labels, &labels_pred).unwrap(), 1.0 / 6.0);
    }

    #[test]
    fn surplus_clusters_are_errors() {
        let labels = array![0, 0, 0, 0];
        let labels_pred = array![0, 0, 1, 2];
        assert_abs_diff_eq!(error_rate(&labels, &labels_pred).unwrap(), 0.5);
    }

    #[test]
    fn values_match_scikit_learn() {
        // MI = 2/3 ln 2, H(true) = ln 2, H(pred) = ln 3
        let labels = array![0, 0, 0, 1, 1, 1];
        let labels_pred = array![0, 0, 1, 1, 2, 2];

        assert_abs_diff_eq!(
            normalized_mutual_info(&labels, &labels_pred).unwrap(),
            2.0 / 3.0 * (2f64.ln() / 3f64.ln()).sqrt(),
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            adjusted_rand_index(&labels, &labels_pred).unwrap(),
            0.24242424242424243,
            epsilon = 1e-10
        );
    }

    #[test]
    fn single_cluster_edge_cases() {
        let ones = array![3, 3, 3];
        assert_abs_diff_eq!(normalized_mutual_info(&ones, &ones).unwrap(), 1.0);
        assert_abs_diff_eq!(adjusted_rand_index(&ones, &ones).unwrap(), 1.0);

        // one side collapsed: no information shared
        let labels = array![0, 1, 2];
        assert_abs_diff_eq!(normalized_mutual_info(&labels, &ones).unwrap(), 0.0);
        assert_abs_diff_eq!(adjusted_rand_index(&labels, &ones).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let res = evaluate(&array![0, 1], &array![0]);
        assert!(matches!(res, Err(Error::LabelLength(2, 1))));
    }

    #[test]
    fn empty_labels_are_rejected() {
        let empty = Array1::<usize>::zeros(0);
        assert!(matches!(
            evaluate(&empty, &empty),
            Err(Error::NotEnoughSamples)
        ));
    }
}
