//! CSV listing reader with row-level validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info, instrument};

use crate::domain::{column, current_year, Listing, ListingTable, VehicleCategory};
use crate::IoError;

/// Lower bound on a plausible manufacturing year.
const MIN_YEAR: i32 = 1900;

/// Reads a scraped listing CSV into a [`ListingTable`].
///
/// Expected CSV format:
/// - Header row required; column order is free
/// - `make`, `model`, `year`, `price` are required
/// - `mileage_min`/`mileage_max` (averaged) or `mileage_avg`, `transmission`,
///   `fuel_type`, `location`, `ad_url` are optional
///
/// Rows that cannot be parsed or fail validation are dropped, not reported:
/// empty make or model, a price outside `(0, cap)` for the category, a
/// non-integer year or one outside `[1900, current_year]`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Header row cannot be parsed |
/// | [`IoError::MissingColumn`] | A required column is absent |
/// | [`IoError::EmptyDataset`] | No row survives validation |
pub struct ListingReader {
    path: PathBuf,
    category: VehicleCategory,
    current_year: i32,
}

/// Header positions of the columns the reader understands.
struct ColumnIndex {
    make: usize,
    model: usize,
    year: usize,
    price: usize,
    mileage_min: Option<usize>,
    mileage_max: Option<usize>,
    mileage_avg: Option<usize>,
    transmission: Option<usize>,
    fuel_type: Option<usize>,
    location: Option<usize>,
    ad_url: Option<usize>,
}

impl ColumnIndex {
    fn mileage_derivable(&self) -> bool {
        (self.mileage_min.is_some() && self.mileage_max.is_some()) || self.mileage_avg.is_some()
    }
}

impl ListingReader {
    /// Create a new reader for the given CSV file and vehicle category.
    pub fn new(path: &Path, category: VehicleCategory) -> Self {
        Self {
            path: path.to_path_buf(),
            category,
            current_year: current_year(),
        }
    }

    /// Override the calendar year used for age derivation and the year bound.
    #[must_use]
    pub fn with_current_year(mut self, current_year: i32) -> Self {
        self.current_year = current_year;
        self
    }

    /// Read and validate the CSV file, returning a [`ListingTable`].
    #[instrument(skip(self), fields(path = %self.path.display(), category = %self.category))]
    pub fn read(&self) -> Result<ListingTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // Short or long rows are dropped individually rather than failing the load.
        // Scraped titles quote with either `""` or `\"` inside quoted fields.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .escape(Some(b'\\'))
            .from_reader(file);

        let header = rdr
            .headers()
            .map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?
            .clone();
        let index = self.index_columns(&header)?;
        debug!(n_columns = header.len(), "read CSV header");

        let mut listings = Vec::new();
        let mut n_dropped = 0usize;
        for (row_index, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) if record.len() == header.len() => record,
                Ok(record) => {
                    debug!(row_index, got = record.len(), "dropping row with wrong field count");
                    n_dropped += 1;
                    continue;
                }
                Err(e) => {
                    debug!(row_index, error = %e, "dropping unparseable row");
                    n_dropped += 1;
                    continue;
                }
            };
            match self.parse_listing(&record, &index) {
                Some(listing) => listings.push(listing),
                None => n_dropped += 1,
            }
        }

        if listings.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let mut columns: Vec<String> = header.iter().map(str::to_string).collect();
        columns.push(column::AGE.to_string());
        if index.mileage_derivable() && index.mileage_avg.is_none() {
            columns.push(column::MILEAGE_AVG.to_string());
        }

        info!(n_listings = listings.len(), n_dropped, "listing table loaded");

        Ok(ListingTable::new(self.category, columns, listings))
    }

    fn index_columns(&self, header: &StringRecord) -> Result<ColumnIndex, IoError> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        let required = |column: &'static str| {
            positions
                .get(column)
                .copied()
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })
        };
        Ok(ColumnIndex {
            make: required(column::MAKE)?,
            model: required(column::MODEL)?,
            year: required(column::YEAR)?,
            price: required(column::PRICE)?,
            mileage_min: positions.get(column::MILEAGE_MIN).copied(),
            mileage_max: positions.get(column::MILEAGE_MAX).copied(),
            mileage_avg: positions.get(column::MILEAGE_AVG).copied(),
            transmission: positions.get(column::TRANSMISSION).copied(),
            fuel_type: positions.get(column::FUEL_TYPE).copied(),
            location: positions.get(column::LOCATION).copied(),
            ad_url: positions.get(column::AD_URL).copied(),
        })
    }

    /// Parse one record, returning `None` if it fails validation.
    fn parse_listing(&self, record: &StringRecord, index: &ColumnIndex) -> Option<Listing> {
        let make = cell(record, Some(index.make))?;
        let model = cell(record, Some(index.model))?;

        let price = parse_number(cell(record, Some(index.price))?)?;
        if price <= 0.0 || price >= self.category.price_cap() {
            return None;
        }

        let year = parse_number(cell(record, Some(index.year))?)?;
        if year.fract() != 0.0 {
            return None;
        }
        let year = year as i32;
        if !(MIN_YEAR..=self.current_year).contains(&year) {
            return None;
        }

        let mileage_avg = match (index.mileage_min, index.mileage_max) {
            (Some(lo), Some(hi)) => {
                match (mileage(record, Some(lo)), mileage(record, Some(hi))) {
                    (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
                    _ => mileage(record, index.mileage_avg),
                }
            }
            _ => mileage(record, index.mileage_avg),
        };

        Some(Listing {
            make: make.to_string(),
            model: model.to_string(),
            year,
            price,
            age: self.current_year - year,
            mileage_avg,
            transmission: cell(record, index.transmission).map(str::to_string),
            fuel_type: cell(record, index.fuel_type).map(str::to_lowercase),
            location: cell(record, index.location).map(str::to_string),
            ad_url: cell(record, index.ad_url).map(str::to_string),
        })
    }
}

/// Return the trimmed, non-empty cell at `idx`.
fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a finite number, tolerating thousands separators ("85,000").
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn mileage(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    cell(record, idx)
        .and_then(parse_number)
        .filter(|&v| v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YEAR: i32 = 2024;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn read(content: &str, category: VehicleCategory) -> Result<ListingTable, IoError> {
        let f = write_csv(content);
        ListingReader::new(f.path(), category)
            .with_current_year(YEAR)
            .read()
    }

    #[test]
    fn read_valid_cars() {
        let csv = "make,model,year,price,mileage_min,mileage_max,transmission,fuel_type\n\
                   Honda,Civic,2018,70000,45000,55000,Automatic,Petrol\n\
                   Perodua,Myvi,2020,42000,20000,30000,Automatic,PETROL\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.len(), 2);
        let civic = &table.listings()[0];
        assert_eq!(civic.make, "Honda");
        assert_eq!(civic.age, 6);
        assert_eq!(civic.mileage_avg, Some(50_000.0));
        assert_eq!(table.listings()[1].fuel_type.as_deref(), Some("petrol"));
        assert!(table.has_column(column::MILEAGE_AVG));
        assert!(table.has_column(column::AGE));
    }

    #[test]
    fn mileage_avg_column_used_directly() {
        let csv = "make,model,year,price,mileage_avg\nHonda,City,2019,60000,38000\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.listings()[0].mileage_avg, Some(38_000.0));
        let n_mileage_cols = table
            .columns()
            .iter()
            .filter(|c| c.as_str() == column::MILEAGE_AVG)
            .count();
        assert_eq!(n_mileage_cols, 1);
    }

    #[test]
    fn invalid_rows_dropped() {
        let csv = "make,model,year,price\n\
                   Honda,Civic,2018,70000\n\
                   ,Civic,2018,70000\n\
                   Honda,Civic,2018.5,70000\n\
                   Honda,Civic,1850,70000\n\
                   Honda,Civic,2030,70000\n\
                   Honda,Civic,2018,0\n\
                   Honda,Civic,2018,1000000\n\
                   Honda,Civic,2018,abc\n\
                   Honda,Civic,2018\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn motorcycle_price_cap() {
        let csv = "make,model,year,price\n\
                   Yamaha,Y15ZR,2021,9000\n\
                   Ducati,Panigale,2021,120000\n";
        let table = read(csv, VehicleCategory::Motorcycle).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.category(), VehicleCategory::Motorcycle);
        assert!(!table.has_column(column::MILEAGE_AVG));
    }

    #[test]
    fn thousands_separator_in_price() {
        let csv = "make,model,year,price\nToyota,Vios,2017,\"55,500\"\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.listings()[0].price, 55_500.0);
    }

    #[test]
    fn backslash_escaped_quotes_stay_in_one_field() {
        let csv = "make,model,year,price,url\n\
                   Honda,\"Civic \\\"Type R\\\", FK8\",2018,70000,u1\n\
                   Toyota,Vios,2017,55000,u2\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings()[0].model, "Civic \"Type R\", FK8");
        assert_eq!(table.listings()[1].make, "Toyota");
    }

    #[test]
    fn doubled_quotes_still_parse() {
        let csv = "make,model,year,price\nHonda,\"Civic \"\"Type R\"\"\",2018,70000\n";
        let table = read(csv, VehicleCategory::Car).unwrap();
        assert_eq!(table.listings()[0].model, "Civic \"Type R\"");
    }

    #[test]
    fn missing_required_column() {
        let csv = "make,model,price\nHonda,Civic,70000\n";
        let err = read(csv, VehicleCategory::Car).unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { column: "year", .. }));
    }

    #[test]
    fn all_rows_invalid_is_empty_dataset() {
        let csv = "make,model,year,price\nHonda,Civic,2018,-5\n";
        let err = read(csv, VehicleCategory::Car).unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn file_not_found() {
        let err = ListingReader::new(Path::new("/nonexistent/cars.csv"), VehicleCategory::Car)
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
