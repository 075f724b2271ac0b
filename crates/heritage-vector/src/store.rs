//! On-disk layout of a saved index.
//!
//! A saved index is a directory holding two files written together:
//! `vectors.safetensors` with one `[count, dim]` f32 tensor named `vectors`,
//! and `documents.json`, a manifest carrying the documents in row order plus
//! the count, dim and a blake3 checksum of the vector bytes. Loading checks
//! every one of those against the tensor and refuses a pair that disagrees.
use std::fs;
use std::path::Path;

use candle_core::Device;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use heritage_core::error::{Error, Result};
use heritage_core::types::Document;

use crate::flat::{candle_err, FlatIndex};

pub const VECTORS_FILE: &str = "vectors.safetensors";
pub const DOCUMENTS_FILE: &str = "documents.json";
const TENSOR_NAME: &str = "vectors";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    dim: usize,
    count: usize,
    checksum: String,
    documents: Vec<Document>,
}

fn checksum(values: &[f32]) -> String {
    let mut hasher = blake3::Hasher::new();
    for v in values {
        hasher.update(&v.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Write both files into `dir`, creating it if needed.
///
/// Each file is written under a temporary name first and renamed into place
/// only after both writes succeeded.
pub fn save(index: &FlatIndex, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let values = index
        .matrix()
        .flatten_all()
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(candle_err)?;
    let manifest = Manifest {
        version: FORMAT_VERSION,
        dim: index.dim(),
        count: index.len(),
        checksum: checksum(&values),
        documents: index.documents().to_vec(),
    };

    let vectors_tmp = dir.join(format!("{}.tmp", VECTORS_FILE));
    let documents_tmp = dir.join(format!("{}.tmp", DOCUMENTS_FILE));
    index.matrix().save_safetensors(TENSOR_NAME, &vectors_tmp).map_err(candle_err)?;
    fs::write(&documents_tmp, serde_json::to_vec_pretty(&manifest)?)?;

    fs::rename(&vectors_tmp, dir.join(VECTORS_FILE))?;
    fs::rename(&documents_tmp, dir.join(DOCUMENTS_FILE))?;
    info!(
        dir = %dir.display(),
        count = manifest.count,
        dim = manifest.dim,
        "saved similarity index"
    );
    Ok(())
}

/// True when `dir` holds at least one of the two index files.
pub fn exists(dir: &Path) -> bool {
    dir.join(VECTORS_FILE).exists() || dir.join(DOCUMENTS_FILE).exists()
}

/// Read and cross-check both files in `dir`.
pub fn load(dir: &Path) -> Result<FlatIndex> {
    let vectors_path = dir.join(VECTORS_FILE);
    let documents_path = dir.join(DOCUMENTS_FILE);
    for path in [&vectors_path, &documents_path] {
        if !path.exists() {
            return Err(Error::IndexMismatch(format!("missing {}", path.display())));
        }
    }

    let manifest: Manifest =
        serde_json::from_slice(&fs::read(&documents_path)?).map_err(|e| {
            Error::IndexMismatch(format!("{} is not an index manifest: {}", DOCUMENTS_FILE, e))
        })?;
    if manifest.version != FORMAT_VERSION {
        return Err(Error::IndexMismatch(format!("unsupported index version {}", manifest.version)));
    }
    if manifest.count != manifest.documents.len() {
        return Err(Error::IndexMismatch(format!(
            "manifest declares {} documents but lists {}",
            manifest.count,
            manifest.documents.len()
        )));
    }

    let mut tensors = candle_core::safetensors::load(&vectors_path, &Device::Cpu)
        .map_err(|e| Error::IndexMismatch(format!("unreadable {}: {}", VECTORS_FILE, e)))?;
    let tensor = tensors.remove(TENSOR_NAME).ok_or_else(|| {
        Error::IndexMismatch(format!("{} has no '{}' tensor", VECTORS_FILE, TENSOR_NAME))
    })?;
    let (rows, dim) = tensor.dims2().map_err(|e| Error::IndexMismatch(e.to_string()))?;
    if rows != manifest.count || dim != manifest.dim {
        return Err(Error::IndexMismatch(format!(
            "vectors are [{}, {}] but manifest expects [{}, {}]",
            rows,
            dim,
            manifest.count,
            manifest.dim
        )));
    }
    let values = tensor
        .flatten_all()
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(|e| Error::IndexMismatch(format!("{} is not f32 data: {}", VECTORS_FILE, e)))?;
    if checksum(&values) != manifest.checksum {
        return Err(Error::IndexMismatch("vector checksum does not match manifest".into()));
    }
    debug!(dir = %dir.display(), count = rows, dim, "index artifacts verified");
    FlatIndex::from_parts(tensor, manifest.documents)
}
