//! The byte format of a serialized `LinearModel`.
//!
//! ```text
//! | magic "LRQR" | version: u32 BE | meta len: u32 BE | meta: json | coefficients: f64 | factor: f64 |
//! ```
//!
//! The floats are little endian whatever the host's byte order.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{LinearModel, LinregErr, Result};

const MAGIC: &[u8; 4] = b"LRQR";
const VERSION: u32 = 1;

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();
const F64_SIZE: usize = size_of::<f64>();

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ModelMeta {
    n_features: usize,
    fit_intercept: bool,
    n_observations: usize,
    n_coefficients: usize,
}

fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(LinregErr::InvalidFormat(msg.into()))
}

fn read_header(buf: &[u8], at: usize) -> Result<Header> {
    match buf.get(at..at + HEADER_SIZE) {
        // SAFETY: The range is exactly `HEADER_SIZE` bytes long.
        Some(bytes) => Ok(Header::from_be_bytes(bytes.try_into().unwrap())),
        None => invalid(format!("the buffer is too small ({} bytes)", buf.len())),
    }
}

fn read_f64s(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(F64_SIZE)
        .map(|chunk| f64::from_bits(u64::from_le(bytemuck::pod_read_unaligned(chunk))))
        .collect()
}

fn write_f64s<'a>(buf: &mut Vec<u8>, values: impl IntoIterator<Item = &'a f64>) {
    let bits: Vec<u64> = values.into_iter().map(|x| x.to_bits().to_le()).collect();
    buf.extend_from_slice(bytemuck::cast_slice(&bits));
}

impl LinearModel {
    /// Serializes the model into `buf`, replacing its contents.
    pub fn write_bytes(&self, buf: &mut Vec<u8>) -> Result<()> {
        let meta = ModelMeta {
            n_features: self.n_features(),
            fit_intercept: self.fit_intercept(),
            n_observations: self.n_observations(),
            n_coefficients: self.coefficients().len(),
        };

        buf.clear();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_be_bytes());
        buf.extend_from_slice(&[0; HEADER_SIZE]);

        let start = buf.len();
        serde_json::to_writer(&mut *buf, &meta)?;
        let len = (buf.len() - start) as Header;
        buf[start - HEADER_SIZE..start].copy_from_slice(&len.to_be_bytes());

        write_f64s(buf, self.coefficients());
        write_f64s(buf, self.factor().iter());
        Ok(())
    }

    /// Serializes the model into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Restores a model written by `to_bytes`.
    ///
    /// # Returns
    /// The model or an `InvalidFormat` error describing the first inconsistency found.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.get(..MAGIC.len()) != Some(MAGIC.as_slice()) {
            return invalid("missing magic bytes");
        }

        let version = read_header(buf, MAGIC.len())?;
        if version != VERSION {
            return invalid(format!("unsupported version {version}"));
        }

        let meta_start = MAGIC.len() + 2 * HEADER_SIZE;
        let meta_len = read_header(buf, MAGIC.len() + HEADER_SIZE)? as usize;
        let Some(meta_bytes) = buf.get(meta_start..meta_start + meta_len) else {
            return invalid("truncated metadata");
        };
        let meta: ModelMeta = serde_json::from_slice(meta_bytes)?;

        let k = meta.n_coefficients;
        let side = k + 1;
        let Some(expected) = side
            .checked_mul(side)
            .and_then(|cells| cells.checked_add(k))
            .and_then(|cells| cells.checked_mul(F64_SIZE))
        else {
            return invalid(format!("{k} coefficients don't fit in memory"));
        };
        let payload = &buf[meta_start + meta_len..];

        if payload.len() != expected {
            return invalid(format!(
                "payload has {} bytes, expected {expected}",
                payload.len()
            ));
        }

        let (coefficients, factor) = payload.split_at(k * F64_SIZE);
        let factor = Array2::from_shape_vec((side, side), read_f64s(factor))
            .map_err(|e| LinregErr::InvalidFormat(e.to_string()))?;

        LinearModel::from_parts(
            meta.n_features,
            meta.fit_intercept,
            meta.n_observations,
            read_f64s(coefficients),
            factor,
        )
    }
}
