//! Descriptor extraction followed by PCA and normalization
use dssc::dataset::{check_batch, BatchShape};
use dssc::progress::Progress;
use dssc::traits::{Fit, Transformer};
use dssc::ImageBatch;
use ndarray::Array2;

use crate::descriptor::DescriptorExtractor;
use crate::error::{PreprocessingError, Result};
use crate::pca::Pca;
use crate::rescale::normalize;

/// Number of principal components kept by default
pub const DEFAULT_COMPONENTS: usize = 300;

/// Computes one descriptor row per image
pub fn extract_descriptors<E>(images: &ImageBatch, extractor: &E) -> Result<Array2<f64>>
where
    E: DescriptorExtractor + ?Sized,
{
    check_batch(images)?;
    if images.nsamples() == 0 {
        return Err(PreprocessingError::NotEnoughSamples);
    }
    if images.ndim() == 4 && images.shape()[3] != 1 {
        return Err(PreprocessingError::MultiChannel(images.shape()[3]));
    }

    let (h, w) = (images.shape()[1], images.shape()[2]);
    let mut rows = Vec::with_capacity(images.nsamples());
    for image in images.outer_iter() {
        let image = image.to_shape((h, w)).map_err(dssc::error::Error::from)?;
        rows.push(extractor.extract(image.view())?);
    }

    let len = rows[0].len();
    let mut descriptors = Array2::zeros((rows.len(), len));
    for (row, mut target) in rows.iter().zip(descriptors.rows_mut()) {
        if row.len() != len {
            return Err(PreprocessingError::DescriptorLength {
                expected: len,
                found: row.len(),
            });
        }
        target.assign(row);
    }

    Ok(descriptors)
}

/// Extracts dense descriptors, reduces them to `n_components` principal components and rescales
/// the projection into `[-1, 1]`
pub fn preprocess<E>(
    images: &ImageBatch,
    extractor: &E,
    n_components: usize,
) -> Result<Array2<f64>>
where
    E: DescriptorExtractor + ?Sized,
{
    let progress = Progress::new(true);

    let stage = progress.stage("Running DSIFT");
    let descriptors = extract_descriptors(images, extractor)?;
    stage.finish();

    let stage = progress.stage("Performing PCA");
    let pca = Pca::params(n_components).fit(&descriptors)?;
    let mut projected = pca.transform(&descriptors);
    stage.finish();

    let stage = progress.stage("Normalizing data");
    normalize(&mut projected);
    stage.finish();

    Ok(projected)
}
