use approx::assert_abs_diff_eq;
use dssc::dataset::BatchShape;
use dssc_preprocessing::{flatten, preprocess, rescale, split_with_ratio, unflatten, DenseSift};
use ndarray::{Array, Array1};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

#[test]
fn flatten_round_trip() {
    let mut rng = Xoshiro256Plus::seed_from_u64(5);
    let images = Array::random_using((4, 6, 5, 1), Uniform::new(0., 1.), &mut rng).into_dyn();

    let rows = flatten(&images).unwrap();
    assert_eq!(rows.dim(), (4, 30));

    let restored = unflatten(&rows, images.image_shape()).unwrap();
    assert_abs_diff_eq!(restored, images);
}

#[test]
fn face_sized_images_are_rescaled() {
    let mut rng = Xoshiro256Plus::seed_from_u64(9);
    let images = Array::random_using((5, 48, 42), Uniform::new(0., 255.), &mut rng).into_dyn();

    let scaled = rescale(&images).unwrap();
    assert_eq!(scaled.image_shape(), &[32, 28]);
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = scaled.iter().copied().fold(f64::INFINITY, f64::min);
    assert_abs_diff_eq!(max, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(min, -1.0, epsilon = 1e-12);
}

#[test]
fn dense_sift_features_are_projected() {
    let mut rng = Xoshiro256Plus::seed_from_u64(21);
    let images = Array::random_using((12, 24, 24), Uniform::new(0., 1.), &mut rng).into_dyn();

    let features = preprocess(&images, &DenseSift::default(), 5).unwrap();
    assert_eq!(features.dim(), (12, 5));
    assert!(features.iter().all(|x| x.abs() <= 1.0 + 1e-12));
}

#[test]
fn split_then_preprocess_the_training_part() {
    let mut rng = Xoshiro256Plus::seed_from_u64(2);
    let images = Array::random_using((10, 16, 16), Uniform::new(0., 1.), &mut rng).into_dyn();
    let labels = Array1::from_shape_fn(10, |i| i % 2);

    let (train, val) = split_with_ratio(&images, &labels, 0.8, &mut rng).unwrap();
    assert_eq!(train.images.nsamples(), 8);
    assert_eq!(val.images.nsamples(), 2);

    let features = preprocess(&train.images, &DenseSift::default(), 3).unwrap();
    assert_eq!(features.nrows(), train.labels.len());
}
