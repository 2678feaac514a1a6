//! Binary interchange container
//!
//! Matrices travel between the orchestrating process and its external collaborators (the numeric
//! engine and the autoencoder trainer) through files in a small self-describing format:
//!
//! | field     | type                | notes                        |
//! |-----------|---------------------|------------------------------|
//! | magic     | 4 bytes             | `DSSC`                       |
//! | version   | `u32`               | currently `1`                |
//! | ndim      | `u32`               |                              |
//! | shape     | `ndim` x `u64`      |                              |
//! | values    | `f64`               | column-major (Fortran) order |
//!
//! All integers and floats are little-endian. The column-major layout matches how MATLAB and
//! Octave store arrays, so the engine side reads a matrix with a single `fread` call.
use ndarray::{Array1, Array2, ArrayBase, ArrayD, Data, Dimension, IxDyn, ShapeBuilder};

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

pub const MAGIC: &[u8; 4] = b"DSSC";
pub const VERSION: u32 = 1;

/// Serializes an array of any dimensionality
pub fn write_array<W, S, D>(mut writer: W, array: &ArrayBase<S, D>) -> Result<()>
where
    W: Write,
    S: Data<Elem = f64>,
    D: Dimension,
{
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(array.ndim() as u32).to_le_bytes())?;
    for dim in array.shape() {
        writer.write_all(&(*dim as u64).to_le_bytes())?;
    }

    // iterating the transposed view walks the original in column-major order
    for value in array.t().iter() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;

    Ok(())
}

/// Deserializes an array written by [`write_array`] or by the engine
pub fn read_array<R: Read>(mut reader: R) -> Result<ArrayD<f64>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::Container(format!("bad magic {:?}", magic)));
    }

    let version = read_u32(&mut reader)?;
    if version != VERSION {
        return Err(Error::Container(format!("unsupported version {}", version)));
    }

    let ndim = read_u32(&mut reader)? as usize;
    let shape = (0..ndim)
        .map(|_| read_u64(&mut reader).map(|d| d as usize))
        .collect::<Result<Vec<_>>>()?;

    let len = shape.iter().product::<usize>();
    let mut values = Vec::with_capacity(len);
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        values.push(f64::from_le_bytes(buf));
    }

    let array = ArrayD::from_shape_vec(IxDyn(&shape).f(), values)?;

    Ok(array.as_standard_layout().into_owned())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Writes an array to `path`, replacing any previous content
pub fn save<P, S, D>(path: P, array: &ArrayBase<S, D>) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = f64>,
    D: Dimension,
{
    let file = File::create(path)?;
    write_array(BufWriter::new(file), array)
}

/// Reads an array of arbitrary dimensionality from `path`
pub fn load<P: AsRef<Path>>(path: P) -> Result<ArrayD<f64>> {
    let file = File::open(path)?;
    read_array(BufReader::new(file))
}

/// Reads a two-dimensional matrix from `path`
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let array = load(path)?;
    let ndim = array.ndim();

    array.into_dimensionality().map_err(|_| Error::Dimension {
        expected: 2,
        found: ndim,
    })
}

/// Converts integral floating point values into labels
///
/// Any array whose elements are non-negative integers is accepted; row and column vectors are
/// flattened.
pub fn labels_from_values(values: ArrayD<f64>) -> Result<Array1<usize>> {
    let labels = values
        .t()
        .iter()
        .map(|v| {
            if v.is_finite() && *v >= 0.0 && v.fract() == 0.0 {
                Ok(*v as usize)
            } else {
                Err(Error::Container(format!("{} is not a valid label", v)))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array1::from(labels))
}
