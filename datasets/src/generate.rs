//! Utility functions for randomly generating datasets
use dssc::Labels;
use ndarray::{s, Array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, Normal, StandardNormal},
    RandomExt,
};

/// Special case of `blobs_with_distribution` with a standard normal distribution.
pub fn blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> (Array2<f64>, Labels) {
    blobs_with_distribution(blob_size, blob_centroids, StandardNormal, rng)
}

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob centroids.
///
/// More specifically, each blob is formed by `blob_size` points sampled from a distribution
/// centered in the blob centroid. The label of a point is the row index of its centroid.
///
/// `blobs` can be used to quickly assemble a synthetic dataset to test or
/// benchmark the evaluation of clusterings on a best-case scenario input.
pub fn blobs_with_distribution(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    distribution: impl Distribution<f64> + Clone,
    rng: &mut impl Rng,
) -> (Array2<f64>, Labels) {
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<f64> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = make_blob(blob_size, &blob_centroid, distribution.clone(), rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    let labels = Array1::from_shape_fn(n_centroids * blob_size, |i| i / blob_size.max(1));

    (blobs, labels)
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid` using the given distribution.
fn make_blob(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    distribution: impl Distribution<f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<f64> = Array::random_using(shape, distribution, rng);
    origin_blob + blob_centroid
}

/// Samples points from a union of random linear subspaces
///
/// Each of the `n_subspaces` subspaces of dimension `subspace_dim` is spanned by a random
/// orthonormal basis of the `ambient_dim`-dimensional space. `per_subspace` points are drawn
/// from each with standard normal coordinates, perturbed by gaussian noise of standard deviation
/// `noise` and scaled to unit length. Points are ordered by subspace and labelled with its index.
///
/// This is the best-case input of sparse subspace clustering: every point is a sparse linear
/// combination of points from its own subspace.
pub fn subspaces(
    n_subspaces: usize,
    per_subspace: usize,
    ambient_dim: usize,
    subspace_dim: usize,
    noise: f64,
    rng: &mut impl Rng,
) -> (Array2<f64>, Labels) {
    let subspace_dim = subspace_dim.min(ambient_dim);
    let n = n_subspaces * per_subspace;
    let mut records = Array2::zeros((n, ambient_dim));

    for (idx, mut block) in records
        .axis_chunks_iter_mut(Axis(0), per_subspace.max(1))
        .enumerate()
        .take(n_subspaces)
    {
        let basis = random_basis(ambient_dim, subspace_dim, rng);
        let coords: Array2<f64> =
            Array::random_using((per_subspace, subspace_dim), StandardNormal, rng);
        block.assign(&coords.dot(&basis.t()));

        if noise > 0.0 {
            if let Ok(distribution) = Normal::new(0.0, noise) {
                block += &Array::random_using(block.raw_dim(), distribution, rng);
            }
        }
        tracing::trace!(subspace = idx, "sampled subspace");
    }

    for mut row in records.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    let labels = Array1::from_shape_fn(n, |i| i / per_subspace.max(1));

    (records, labels)
}

/// Orthonormal `(ambient_dim, subspace_dim)` basis from Gram-Schmidt on gaussian columns
fn random_basis(ambient_dim: usize, subspace_dim: usize, rng: &mut impl Rng) -> Array2<f64> {
    loop {
        let mut basis: Array2<f64> =
            Array::random_using((ambient_dim, subspace_dim), StandardNormal, rng);
        let mut degenerate = false;

        for j in 0..subspace_dim {
            for k in 0..j {
                let prev = basis.column(k).to_owned();
                let proj = basis.column(j).dot(&prev);
                basis.column_mut(j).scaled_add(-proj, &prev);
            }
            let norm = basis.column(j).dot(&basis.column(j)).sqrt();
            if norm < 1e-10 {
                degenerate = true;
                break;
            }
            basis.column_mut(j).mapv_inplace(|x| x / norm);
        }

        if !degenerate {
            return basis;
        }
    }
}
