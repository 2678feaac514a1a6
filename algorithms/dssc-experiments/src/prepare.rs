//! Turning an image dataset into a partitioned feature set
use dssc::dataset::BatchShape;
use dssc::{ImageBatch, Labels};
use dssc_datasets::Partitioned;
use dssc_preprocessing::{flatten, preprocess, rescale, split_with_ratio, DescriptorExtractor};
use ndarray::{Array2, ArrayBase, Data, Ix1};
use rand::Rng;
use tracing::info;

use crate::error::Result;

/// How images become feature rows
pub enum Features<'a> {
    /// Downsampled and rescaled pixels
    Pixels,
    /// Dense descriptors reduced to the given number of principal components
    Descriptors {
        extractor: &'a dyn DescriptorExtractor,
        n_components: usize,
    },
}

/// Computes the features of every image and holds out a shuffled validation part
///
/// Features are computed over the whole dataset before splitting, so both parts share the same
/// normalization and projection. `ratio` is the fraction of samples kept for training.
pub fn prepare<S, R>(
    images: &ImageBatch,
    labels: &ArrayBase<S, Ix1>,
    features: Features<'_>,
    ratio: f32,
    rng: &mut R,
) -> Result<Partitioned>
where
    S: Data<Elem = usize>,
    R: Rng + ?Sized,
{
    let records = match features {
        Features::Pixels => flatten(&rescale(images)?)?,
        Features::Descriptors {
            extractor,
            n_components,
        } => preprocess(images, extractor, n_components)?,
    };

    // every row becomes a 1 x d image so the split keeps it intact
    let (n, d) = records.dim();
    let batch = records
        .into_shape((n, 1, d))
        .map_err(dssc::error::Error::from)?
        .into_dyn();
    let (train, validation) = split_with_ratio(&batch, labels, ratio, rng)?;
    info!(
        n_train = train.images.nsamples(),
        n_validation = validation.images.nsamples(),
        n_features = d,
        "prepared dataset"
    );

    Ok(Partitioned::new(
        flatten(&train.images)?,
        &train.labels,
        flatten(&validation.images)?,
        &validation.labels,
    )?)
}

/// Ground truth and features of a partitioned dataset, joined back together
pub fn merged(dataset: &Partitioned) -> Result<(Array2<f64>, Labels)> {
    let records = ndarray::concatenate(
        ndarray::Axis(0),
        &[dataset.train.view(), dataset.validation.view()],
    )
    .map_err(dssc::error::Error::from)?;
    let labels = ndarray::concatenate(
        ndarray::Axis(0),
        &[dataset.labels.view(), dataset.labels_validation.view()],
    )
    .map_err(dssc::error::Error::from)?;

    Ok((records, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array3};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn pixels_are_rescaled_and_split() {
        let images = Array3::from_shape_fn((10, 4, 3), |(n, i, j)| (n * 12 + i * 3 + j) as f64)
            .into_dyn();
        let labels = Labels::from_iter((0..10).map(|n| n % 2));
        let mut rng = Xoshiro256Plus::seed_from_u64(3);

        let dataset = prepare(&images, &labels, Features::Pixels, 0.8, &mut rng).unwrap();
        assert_eq!(dataset.train.dim(), (8, 12));
        assert_eq!(dataset.validation.dim(), (2, 12));

        // labels stay attached to their rows
        for (row, label) in dataset.train.rows().into_iter().zip(dataset.labels.iter()) {
            let n = ((row[0] + 1.0) / 2.0 * 119.0 / 12.0).round() as usize;
            assert_eq!(n % 2, *label);
        }

        let (records, labels) = merged(&dataset).unwrap();
        assert_eq!(records.nrows(), 10);
        assert_eq!(labels.len(), 10);
        assert_abs_diff_eq!(records.fold(f64::MIN, |m, v| m.max(*v)), 1.0);
        assert_abs_diff_eq!(records.fold(f64::MAX, |m, v| m.min(*v)), -1.0);
    }

    #[test]
    fn misaligned_labels_fail() {
        let images = Array3::<f64>::zeros((3, 2, 2)).into_dyn();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        assert!(prepare(&images, &array![0, 1], Features::Pixels, 0.5, &mut rng).is_err());
    }
}
