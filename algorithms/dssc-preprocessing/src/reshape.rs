//! Conversion between image batches and flat sample-by-feature matrices
use dssc::dataset::BatchShape;
use dssc::ImageBatch;
use ndarray::{Array2, ArrayBase, Data, Ix2, IxDyn};

use crate::error::Result;

/// Collapses all per-image axes into one feature row per sample
///
/// Pixels are laid out in row-major order, so `unflatten` with the original image shape restores
/// the batch exactly.
pub fn flatten(images: &ImageBatch) -> Result<Array2<f64>> {
    let shape = (images.nsamples(), images.nfeatures());
    let flat = images
        .as_standard_layout()
        .into_owned()
        .into_shape(shape)
        .map_err(dssc::error::Error::from)?;

    Ok(flat)
}

/// Restores an image batch from flat rows and the shape of a single image
pub fn unflatten<S: Data<Elem = f64>>(
    records: &ArrayBase<S, Ix2>,
    image_shape: &[usize],
) -> Result<ImageBatch> {
    let mut shape = Vec::with_capacity(image_shape.len() + 1);
    shape.push(records.nrows());
    shape.extend_from_slice(image_shape);

    let batch = records
        .as_standard_layout()
        .into_owned()
        .into_shape(IxDyn(&shape))
        .map_err(dssc::error::Error::from)?;

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array, ShapeBuilder};

    #[test]
    fn rows_are_images() {
        let images = array![[[1., 2.], [3., 4.]], [[5., 6.], [7., 8.]]].into_dyn();
        let flat = flatten(&images).unwrap();
        assert_eq!(flat, array![[1., 2., 3., 4.], [5., 6., 7., 8.]]);
    }

    #[test]
    fn round_trip_restores_shape() {
        let images = Array::from_shape_fn((4, 3, 5, 1), |(n, h, w, _)| (n * 15 + h * 5 + w) as f64)
            .into_dyn();
        let flat = flatten(&images).unwrap();
        assert_eq!(flat.dim(), (4, 15));

        let restored = unflatten(&flat, &[3, 5, 1]).unwrap();
        assert_eq!(restored, images);
    }

    #[test]
    fn column_major_input_is_flattened_row_major() {
        let fortran =
            Array::from_shape_vec(IxDyn(&[1, 2, 2]).f(), vec![1., 3., 2., 4.]).unwrap();
        assert_eq!(fortran, array![[[1., 2.], [3., 4.]]].into_dyn());
        assert_eq!(flatten(&fortran).unwrap(), array![[1., 2., 3., 4.]]);
    }

    #[test]
    fn wrong_image_shape_is_an_error() {
        let flat = array![[1., 2., 3.]];
        assert!(unflatten(&flat, &[2, 2]).is_err());
    }
}
