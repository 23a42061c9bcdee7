use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{MigrateError, Result};
use crate::model::{DistributionTable, MigratedConfig};

pub const SCHEMA_VERSION: &str = "1.0";
pub const VERSION_KEY: &str = "version";
/// Zero-based position of `version` in a migrated config.
pub const VERSION_KEY_POSITION: usize = 2;

pub const INNER_SIZE_PROBS: &str = "inner_size_probs";
pub const OUTER_MARGIN_PROBS: &str = "outer_margin_probs";
pub const SHIFT_WEIGHTS: &str = "shift_weights";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub backup: PathBuf,
}

/// Rewrite a legacy (unversioned) generation config into the v1.0 layout.
///
/// Pair lists become `{values, probs}` tables, shift weights are normalized
/// into a positional table and `version` is spliced in as the third key.
/// Missing probability fields are treated as empty lists.
pub fn convert_to_v1(legacy: &Value) -> Result<MigratedConfig> {
    let object = legacy.as_object().ok_or(MigrateError::NotAnObject)?;

    if let Some(version) = object.get(VERSION_KEY) {
        let version = match version {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(MigrateError::AlreadyVersioned(version));
    }

    let inner_size_probs = split_pairs(object, INNER_SIZE_PROBS)?;
    let outer_margin_probs = split_pairs(object, OUTER_MARGIN_PROBS)?;
    let shift_weights = normalize_weights(object, SHIFT_WEIGHTS)?;

    let mut config: MigratedConfig = object
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, table) in [
        (INNER_SIZE_PROBS, inner_size_probs),
        (OUTER_MARGIN_PROBS, outer_margin_probs),
        (SHIFT_WEIGHTS, shift_weights),
    ] {
        if !table.is_consistent() {
            return Err(MigrateError::InconsistentTable(key));
        }
        config.set(key, serde_json::to_value(table)?);
    }

    config.insert_at(
        VERSION_KEY_POSITION,
        VERSION_KEY,
        Value::String(SCHEMA_VERSION.into()),
    );

    tracing::info!("updated to version {SCHEMA_VERSION}");
    Ok(config)
}

fn field_items<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> Result<&'a [Value]> {
    match object.get(field) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MigrateError::InvalidField { field, expected }),
    }
}

fn split_pairs(object: &Map<String, Value>, field: &'static str) -> Result<DistributionTable> {
    let items = field_items(object, field, "a list of [value, probability] pairs")?;

    let mut values = Vec::with_capacity(items.len());
    let mut probs = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match item.as_array().map(Vec::as_slice) {
            Some([value, prob]) => {
                values.push(value.clone());
                probs.push(prob.clone());
            }
            _ => return Err(MigrateError::InvalidPair { field, index }),
        }
    }

    Ok(DistributionTable::new(Some(values), probs))
}

fn normalize_weights(object: &Map<String, Value>, field: &'static str) -> Result<DistributionTable> {
    const EXPECTED: &str = "a list of numbers";

    let weights = field_items(object, field, EXPECTED)?
        .iter()
        .map(|weight| {
            weight
                .as_f64()
                .ok_or(MigrateError::InvalidField { field, expected: EXPECTED })
        })
        .collect::<Result<Vec<f64>>>()?;

    if weights.is_empty() {
        return Ok(DistributionTable::positional(weights));
    }

    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return Err(MigrateError::ZeroWeightSum);
    }
    if sum.is_finite() {
        return Ok(DistributionTable::positional(
            weights.iter().map(|weight| weight / sum).collect(),
        ));
    }

    // The raw sum overflowed; scale into [0, 1] first so it stays finite.
    let max = weights.iter().copied().fold(f64::MIN, f64::max);
    let scaled: Vec<f64> = weights.iter().map(|weight| weight / max).collect();
    let sum: f64 = scaled.iter().sum();
    if !sum.is_finite() || sum == 0.0 {
        return Err(MigrateError::ZeroWeightSum);
    }

    Ok(DistributionTable::positional(
        scaled.iter().map(|weight| weight / sum).collect(),
    ))
}

/// `<path>.bak`, appended to the full file name.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Migrate one config file in place, keeping the original as `<path>.bak`.
///
/// Nothing on disk changes unless conversion succeeds and the backup slot is
/// free. The original is renamed, not copied, so the backup keeps its exact
/// bytes.
pub fn migrate_file(path: &Path) -> Result<MigrationReport> {
    tracing::info!("loading {}", path.display());

    let data = fs::read_to_string(path).map_err(|source| MigrateError::io(path, source))?;
    let legacy: Value = serde_json::from_str(&data).map_err(|source| MigrateError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let config = convert_to_v1(&legacy)?;
    let json = serde_json::to_string_pretty(&config)?;

    let backup = backup_path(path);
    if backup
        .try_exists()
        .map_err(|source| MigrateError::io(&backup, source))?
    {
        return Err(MigrateError::BackupExists(backup));
    }
    fs::rename(path, &backup).map_err(|source| MigrateError::io(path, source))?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| MigrateError::io(path, source))?;
    file.write_all(json.as_bytes())
        .map_err(|source| MigrateError::io(path, source))?;

    tracing::info!("saved {}", path.display());
    Ok(MigrationReport { backup })
}

/// Migrate files in order, stopping at the first failure.
pub fn migrate_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<MigrationReport>> {
    paths
        .iter()
        .map(|path| migrate_file(path.as_ref()))
        .collect()
}
