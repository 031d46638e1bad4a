// 🚗 Catalog Store - car records <-> flat 5-field CSV
//
// Row format (no header): code,year,name,company,rate
// Bad rows never abort a load: they are skipped and reported in LoadReport.

use crate::error::{RentalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Number of fields every catalog row must carry
pub const FIELD_COUNT: usize = 5;

// ============================================================================
// CAR RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Identifier used for booking lookups (not guaranteed unique)
    pub code: String,
    pub year: i32,
    pub name: String,
    pub company: String,
    /// Daily rate, non-negative by convention
    pub rate: f64,
}

impl Car {
    pub fn new(code: &str, year: i32, name: &str, company: &str, rate: f64) -> Self {
        Car {
            code: code.to_string(),
            year,
            name: name.to_string(),
            company: company.to_string(),
            rate,
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered car records, file order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    cars: Vec<Car>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog { cars: Vec::new() }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Car> {
        self.cars.iter()
    }

    /// Lookup by code. Duplicate codes are allowed, so the first row wins.
    pub fn find_by_code(&self, code: &str) -> Option<&Car> {
        self.cars.iter().find(|car| car.code == code)
    }

    /// Drop every record and take `cars` as the new contents
    pub fn replace_all(&mut self, cars: Vec<Car>) {
        self.cars = cars;
    }

    pub fn into_cars(self) -> Vec<Car> {
        self.cars
    }
}

impl From<Vec<Car>> for Catalog {
    fn from(cars: Vec<Car>) -> Self {
        Catalog { cars }
    }
}

impl FromIterator<Car> for Catalog {
    fn from_iter<I: IntoIterator<Item = Car>>(iter: I) -> Self {
        Catalog {
            cars: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Car;
    type IntoIter = std::slice::Iter<'a, Car>;

    fn into_iter(self) -> Self::IntoIter {
        self.cars.iter()
    }
}

// ============================================================================
// LOAD REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowIssueKind {
    /// Row did not have exactly 5 fields
    FieldCount { found: usize },
    InvalidYear(String),
    InvalidRate(String),
    /// Row bytes could not be decoded
    Unreadable(String),
    /// Row was accepted, but an earlier row already uses this code
    DuplicateCode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 1-based line in the source file
    pub line: u64,
    pub raw: String,
    pub kind: RowIssueKind,
}

impl RowIssue {
    /// Whether the row was left out of the catalog
    pub fn is_rejected(&self) -> bool {
        !matches!(self.kind, RowIssueKind::DuplicateCode(_))
    }

    pub fn describe(&self) -> String {
        let what = match &self.kind {
            RowIssueKind::FieldCount { found } => {
                format!("expected {} fields, found {}", FIELD_COUNT, found)
            }
            RowIssueKind::InvalidYear(text) => format!("year '{}' is not an integer", text),
            RowIssueKind::InvalidRate(text) => format!("rate '{}' is not a number", text),
            RowIssueKind::Unreadable(reason) => format!("unreadable row: {}", reason),
            RowIssueKind::DuplicateCode(code) => {
                format!("code '{}' already used by an earlier row", code)
            }
        };
        format!("line {}: {}", self.line, what)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub catalog: Catalog,
    pub issues: Vec<RowIssue>,
}

impl LoadReport {
    pub fn rejected_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_rejected()).count()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &RowIssue> {
        self.issues.iter().filter(|i| i.is_rejected())
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Loaded {} cars, skipped {} rows, {} duplicate codes",
            self.catalog.len(),
            self.rejected_count(),
            self.issues.len() - self.rejected_count()
        )
    }
}

// ============================================================================
// LOAD
// ============================================================================

/// Read the catalog at `path`.
///
/// Fails only when the file cannot be opened or read. Malformed rows land in
/// `LoadReport::issues` and loading carries on with the next row.
pub fn load(path: &Path) -> Result<LoadReport> {
    let file = File::open(path).map_err(|e| RentalError::from_io(path, e))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut report = LoadReport::default();
    let mut cars = Vec::new();
    let mut seen_codes = HashSet::new();

    for result in rdr.byte_records() {
        let bytes = result.map_err(|e| RentalError::from_csv(path, e))?;
        let line = bytes.position().map(|p| p.line()).unwrap_or(0);

        let record = match csv::StringRecord::from_byte_record(bytes) {
            Ok(record) => record,
            Err(err) => {
                let reason = err.utf8_error().to_string();
                let issue = RowIssue {
                    line,
                    raw: lossy_row(&err.into_byte_record()),
                    kind: RowIssueKind::Unreadable(reason),
                };
                warn!(path = %path.display(), "Skipping catalog row, {}", issue.describe());
                report.issues.push(issue);
                continue;
            }
        };

        // Whitespace-only lines carry no data
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        let raw = record.iter().collect::<Vec<_>>().join(",");

        match parse_row(&record) {
            Ok(car) => {
                if !seen_codes.insert(car.code.clone()) {
                    report.issues.push(RowIssue {
                        line,
                        raw,
                        kind: RowIssueKind::DuplicateCode(car.code.clone()),
                    });
                }
                cars.push(car);
            }
            Err(kind) => {
                let issue = RowIssue { line, raw, kind };
                warn!(path = %path.display(), "Skipping catalog row, {}", issue.describe());
                report.issues.push(issue);
            }
        }
    }

    report.catalog = Catalog::from(cars);
    info!(path = %path.display(), "{}", report.summary());
    Ok(report)
}

fn lossy_row(record: &csv::ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_row(record: &csv::StringRecord) -> std::result::Result<Car, RowIssueKind> {
    if record.len() != FIELD_COUNT {
        return Err(RowIssueKind::FieldCount {
            found: record.len(),
        });
    }

    let year = record[1]
        .trim()
        .parse::<i32>()
        .map_err(|_| RowIssueKind::InvalidYear(record[1].to_string()))?;
    let rate = record[4]
        .trim()
        .parse::<f64>()
        .map_err(|_| RowIssueKind::InvalidRate(record[4].to_string()))?;

    Ok(Car {
        code: record[0].to_string(),
        year,
        name: record[2].to_string(),
        company: record[3].to_string(),
        rate,
    })
}

/// Load for a caller that must keep running: on failure the catalog is empty
/// and the error is handed back for display.
pub fn load_catalog(path: &Path) -> (LoadReport, Option<RentalError>) {
    match load(path) {
        Ok(report) => (report, None),
        Err(err) => {
            warn!(path = %path.display(), "Catalog load failed: {}", err);
            (LoadReport::default(), Some(err))
        }
    }
}

/// Load ahead of a full rewrite of `path`.
///
/// A missing file counts as an empty catalog. Every other failure is returned,
/// so the caller never replaces a file it could not read.
pub fn load_for_rewrite(path: &Path) -> Result<LoadReport> {
    match load(path) {
        Err(RentalError::FileNotFound { .. }) => Ok(LoadReport::default()),
        other => other,
    }
}

// ============================================================================
// SAVE
// ============================================================================

/// Replace the file at `path` with one row per car.
///
/// Rows go to a temp file in the same directory which is then renamed over
/// `path`, so a failed save leaves the previous file in place.
pub fn save(path: &Path, catalog: &Catalog) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RentalError::from_io(dir, e))?;

    {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        for car in catalog {
            wtr.serialize(car).map_err(|e| RentalError::from_csv(path, e))?;
        }
        wtr.flush().map_err(|e| RentalError::from_io(path, e))?;
    }
    tmp.as_file_mut()
        .flush()
        .map_err(|e| RentalError::from_io(path, e))?;

    tmp.persist(path)
        .map_err(|e| RentalError::from_io(path, e.error))?;

    info!(path = %path.display(), "Saved {} cars", catalog.len());
    Ok(())
}

/// Save for a caller that must keep running; `None` means success
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Option<RentalError> {
    match save(path, catalog) {
        Ok(()) => None,
        Err(err) => {
            warn!(path = %path.display(), "Catalog save failed: {}", err);
            Some(err)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
