//! Kernel archive loading.
//!
//! An archive is a JSON object mapping parameter keys to N×N arrays, with
//! the label vector under the reserved key "y". Files ending in `.gz` are
//! transparently decompressed.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use gramcv::{KernelMatrixCollection, LABEL_KEY};
use scirs2_core::ndarray::Array2;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Kernel name for an archive path: the file stem, with a `.json` stem
/// unwrapped once more for `.json.gz` files.
pub fn kernel_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    stem.strip_suffix(".json")
        .map(str::to_string)
        .unwrap_or(stem)
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn parse_matrix(key: &str, value: &Value, path: &Path) -> Result<Array2<f64>> {
    let rows: Vec<Vec<f64>> = serde_json::from_value(value.clone()).with_context(|| {
        format!(
            "matrix '{key}' in {} is not a 2-D array of numbers",
            path.display()
        )
    })?;

    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            bail!(
                "matrix '{key}' in {} is ragged: row {i} has {} entries, expected {n_cols}",
                path.display(),
                row.len()
            );
        }
    }

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(i, j)| rows[i][j]))
}

/// Load one kernel archive into a validated collection.
pub fn load_archive(path: &Path) -> Result<KernelMatrixCollection> {
    let reader = open(path)?;
    let archive: BTreeMap<String, Value> = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", path.display()))?;

    let labels_value = archive
        .get(LABEL_KEY)
        .with_context(|| format!("{} has no '{LABEL_KEY}' label vector", path.display()))?;
    let labels: Vec<i64> = serde_json::from_value(labels_value.clone()).with_context(|| {
        format!(
            "'{LABEL_KEY}' in {} is not a vector of integer labels",
            path.display()
        )
    })?;

    let mut matrices = BTreeMap::new();
    for (key, value) in &archive {
        if key == LABEL_KEY {
            continue;
        }
        matrices.insert(key.clone(), parse_matrix(key, value, path)?);
    }

    let name = kernel_name(path);
    KernelMatrixCollection::new(name, matrices, labels)
        .with_context(|| format!("validating {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_name() {
        assert_eq!(kernel_name(Path::new("data/wl_subtree.json")), "wl_subtree");
        assert_eq!(kernel_name(Path::new("wl_subtree.json.gz")), "wl_subtree");
        assert_eq!(kernel_name(Path::new("plain")), "plain");
    }

    #[test]
    fn test_parse_matrix_ragged() {
        let value = serde_json::json!([[1.0, 2.0], [3.0]]);
        assert!(parse_matrix("K", &value, Path::new("x.json")).is_err());
    }

    #[test]
    fn test_parse_matrix_ok() {
        let value = serde_json::json!([[1.0, 0.5], [0.5, 1.0]]);
        let matrix = parse_matrix("K", &value, Path::new("x.json")).unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[0, 1]], 0.5);
    }
}
