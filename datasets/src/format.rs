//! Array files on disk
//!
//! Datasets are stored as NumPy `.npy` arrays, so files written by numpy (`np.save`) load
//! directly. Two-dimensional data and label vectors may also be plain or gzipped CSV without
//! header.
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use dssc::container::labels_from_values;
use dssc::Labels;
use flate2::read::GzDecoder;
use ndarray::{Array2, ArrayBase, ArrayD, Data, Dimension, Ix1};
use ndarray_csv::{Array2Reader, ReadError};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};

use crate::error::{DatasetError, Result};

/// File formats recognized by their extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Npy,
    Csv,
    GzCsv,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Format> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if name.ends_with(".npy") {
            Ok(Format::Npy)
        } else if name.ends_with(".csv.gz") {
            Ok(Format::GzCsv)
        } else if name.ends_with(".csv") {
            Ok(Format::Csv)
        } else {
            Err(DatasetError::UnsupportedFormat(path.to_path_buf()))
        }
    }
}

/// Convert Gzipped CSV bytes into 2D array
pub fn array_from_gz_csv<R: Read>(
    gz: R,
    has_headers: bool,
    separator: u8,
) -> std::result::Result<Array2<f64>, ReadError> {
    array_from_csv(GzDecoder::new(gz), has_headers, separator)
}

/// Convert CSV bytes into 2D array
pub fn array_from_csv<R: Read>(
    csv: R,
    has_headers: bool,
    separator: u8,
) -> std::result::Result<Array2<f64>, ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .delimiter(separator)
        .from_reader(csv);

    reader.deserialize_array2_dynamic()
}

fn read_csv(path: &Path, format: Format) -> Result<Array2<f64>> {
    let file = BufReader::new(File::open(path)?);
    let array = match format {
        Format::GzCsv => array_from_gz_csv(file, false, b',')?,
        _ => array_from_csv(file, false, b',')?,
    };

    Ok(array)
}

/// Reads a floating point npy array, converting `f32` and `u8` (8-bit images) on the way
fn read_npy_f64(path: &Path) -> Result<ArrayD<f64>> {
    match read_npy::<_, ArrayD<f64>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        res => return Ok(res?),
    }
    match read_npy::<_, ArrayD<f32>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        res => return Ok(res?.mapv(f64::from)),
    }

    Ok(read_npy::<_, ArrayD<u8>>(path)?.mapv(f64::from))
}

/// Reads an array of any dimensionality
pub fn read_array(path: &Path) -> Result<ArrayD<f64>> {
    match Format::from_path(path)? {
        Format::Npy => read_npy_f64(path),
        format => Ok(read_csv(path, format)?.into_dyn()),
    }
}

/// Reads labels stored as integers or as integral floating point values
///
/// Row and column vectors are flattened.
pub fn read_labels(path: &Path) -> Result<Labels> {
    let values = match Format::from_path(path)? {
        Format::Npy => match read_npy::<_, ArrayD<i64>>(path) {
            Ok(ints) => {
                return ints
                    .iter()
                    .map(|l| usize::try_from(*l).map_err(|_| DatasetError::InvalidLabel(*l)))
                    .collect::<Result<Vec<_>>>()
                    .map(Labels::from)
            }
            Err(ReadNpyError::WrongDescriptor(_)) => read_npy_f64(path)?,
            Err(err) => return Err(err.into()),
        },
        format => read_csv(path, format)?.into_dyn(),
    };

    Ok(labels_from_values(values)?)
}

/// Writes an array as npy
pub fn write_array<P, S, D>(path: P, array: &ArrayBase<S, D>) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = f64>,
    D: Dimension,
{
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Npy => Ok(write_npy(path, array)?),
        _ => Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Writes labels as an `int64` npy vector, the way numpy stores integer labels
pub fn write_labels<P, S>(path: P, labels: &ArrayBase<S, Ix1>) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = usize>,
{
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Npy => Ok(write_npy(path, &labels.mapv(|l| l as i64))?),
        _ => Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
    }
}
