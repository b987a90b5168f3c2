//! CSV ingest for the sample table.
//!
//! The input is a delimited table with `LATITUDE MIN` / `LONGITUDE MIN`
//! coordinate columns and one `<OXIDE>(WT%)` column per supported oxide.
//! All required headers are validated up front so a missing column fails the
//! load with a report instead of silently producing empty columns. Rows that
//! fail to parse are skipped and counted, never fatal.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::oxide::Oxide;

/// Header of the latitude column.
pub const LATITUDE_COLUMN: &str = "LATITUDE MIN";
/// Header of the longitude column.
pub const LONGITUDE_COLUMN: &str = "LONGITUDE MIN";

/// Errors that end a dataset load.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse table: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column(s): {0}")]
    MissingColumns(String),
}

/// One row of the dataset.
///
/// Coordinates and values may be undefined; undefined entries are excluded
/// from range computation and rendering rather than defaulted.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    values: [Option<f64>; Oxide::COUNT],
}

impl Sample {
    /// Weight-percent value for one oxide, if defined.
    pub fn value(&self, oxide: Oxide) -> Option<f64> {
        self.values[oxide.index()]
    }
}

/// Raw CSV record; the renames carry the oxide-name to column-header mapping.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "LATITUDE MIN")]
    latitude: Option<f64>,
    #[serde(rename = "LONGITUDE MIN")]
    longitude: Option<f64>,
    #[serde(rename = "TIO2(WT%)")]
    tio2: Option<f64>,
    #[serde(rename = "AL2O3(WT%)")]
    al2o3: Option<f64>,
    #[serde(rename = "FEOT(WT%)")]
    feot: Option<f64>,
    #[serde(rename = "CAO(WT%)")]
    cao: Option<f64>,
    #[serde(rename = "MNO(WT%)")]
    mno: Option<f64>,
    #[serde(rename = "NA2O(WT%)")]
    na2o: Option<f64>,
    #[serde(rename = "MGO(WT%)")]
    mgo: Option<f64>,
}

impl From<RawRecord> for Sample {
    fn from(raw: RawRecord) -> Self {
        // Column order matches Oxide::ALL.
        let values = [
            raw.tio2, raw.al2o3, raw.feot, raw.cao, raw.mno, raw.na2o, raw.mgo,
        ]
        .map(finite);
        Sample {
            latitude: finite(raw.latitude),
            longitude: finite(raw.longitude),
            values,
        }
    }
}

/// NaN and infinities count as undefined, like empty cells.
fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// The loaded dataset. Immutable after load; every interaction recomputes
/// from it.
#[derive(Clone, Debug, Default)]
pub struct SampleTable {
    samples: Vec<Sample>,
}

impl SampleTable {
    /// Load a table from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<SampleTable, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::load_from_reader(file)?;
        log::info!(
            "loaded {} samples from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load a table from any reader. Validates headers, then parses rows.
    pub fn load_from_reader(reader: impl Read) -> Result<SampleTable, DatasetError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<&str> = required_columns()
            .into_iter()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns(missing.join(", ")));
        }

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for record in csv_reader.deserialize::<RawRecord>() {
            match record {
                Ok(raw) => samples.push(Sample::from(raw)),
                Err(err) => {
                    skipped += 1;
                    log::warn!("skipping unparsable row: {err}");
                }
            }
        }
        if skipped > 0 {
            log::warn!("skipped {skipped} unparsable rows");
        }

        Ok(SampleTable { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The selected oxide's column, one entry per sample.
    pub fn values(&self, oxide: Oxide) -> impl Iterator<Item = Option<f64>> + '_ {
        self.samples.iter().map(move |s| s.value(oxide))
    }
}

/// Every column a valid table must carry.
fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![LATITUDE_COLUMN, LONGITUDE_COLUMN];
    columns.extend(Oxide::ALL.iter().map(|oxide| oxide.column()));
    columns
}
