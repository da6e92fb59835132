use crate::types::{Listing, PetPolicy, RawRow, SizeCluster};
use crate::util::{parse_f64_br, parse_u32_safe};
use csv::{ReaderBuilder, StringRecord};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io;

/// Columns that must exist (after lower-casing) for the dashboard to render
/// at all. The grand-total column is deliberately not in this list: its
/// absence only degrades the sections that depend on it.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "city",
    "area",
    "rent amount (r$)",
    "hoa (r$)",
    "property tax (r$)",
    "fire insurance (r$)",
    "animal",
];

pub const TOTAL_COLUMN: &str = "total (r$)";

/// Descriptive schema-mismatch error raised when required columns are
/// missing, so the failure points at the file rather than at some later
/// computation.
#[derive(Debug, Clone)]
pub struct SchemaError {
    pub missing: Vec<String>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schema mismatch: missing required column(s): {}",
            self.missing.join(", ")
        )
    }
}

impl Error for SchemaError {}

#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Data rows read from the file (capped at `nrows`).
    pub total_rows: usize,
    /// Rows that survived parsing and validation.
    pub loaded_rows: usize,
    /// Rows dropped for unparseable numerics, non-positive area, negative
    /// monetary values, or an unrecognized animal flag.
    pub skipped_rows: usize,
    pub total_column_present: bool,
}

pub fn load_dataset(path: &str, nrows: usize) -> Result<(Vec<Listing>, LoadReport), Box<dyn Error>> {
    let file = File::open(path)?;
    load_from_reader(file, nrows)
}

/// Read at most `nrows` listings, lower-casing headers before the typed
/// deserialization so column matching is case-insensitive.
pub fn load_from_reader<R: io::Read>(
    input: R,
    nrows: usize,
) -> Result<(Vec<Listing>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);

    let lowered: StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !lowered.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Box::new(SchemaError { missing }));
    }
    let total_column_present = lowered.iter().any(|h| h == TOTAL_COLUMN);
    rdr.set_headers(lowered);

    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut listings: Vec<Listing> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        if total_rows >= nrows {
            break;
        }
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                skipped_rows += 1;
                continue;
            }
        };

        let city = match row.city.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        // Area must be strictly positive: `aluguel_m2` divides by it.
        let area = match parse_f64_br(row.area.as_deref()) {
            Some(a) if a > 0.0 => a,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let hoa = match parse_f64_br(row.hoa.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let rent_amount = match parse_f64_br(row.rent_amount.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let property_tax = match parse_f64_br(row.property_tax.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let fire_insurance = match parse_f64_br(row.fire_insurance.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let animal = match row.animal.as_deref().and_then(PetPolicy::parse) {
            Some(p) => p,
            None => {
                skipped_rows += 1;
                continue;
            }
        };

        listings.push(Listing {
            city,
            area,
            rooms: parse_u32_safe(row.rooms.as_deref()),
            bathroom: parse_u32_safe(row.bathroom.as_deref()),
            parking_spaces: parse_u32_safe(row.parking_spaces.as_deref()),
            animal,
            furniture: row.furniture.map(|s| s.trim().to_string()),
            hoa,
            rent_amount,
            property_tax,
            fire_insurance,
            total: parse_f64_br(row.total.as_deref()),
            custo_total: 0.0,
            aluguel_m2: 0.0,
            cluster: SizeCluster::UpTo50,
            lat: None,
            lon: None,
        });
    }

    // The original view is ordered by the precomputed grand total when that
    // column exists; rows without a parseable total sink to the end.
    if total_column_present {
        listings.sort_by(|a, b| {
            a.total
                .unwrap_or(f64::INFINITY)
                .partial_cmp(&b.total.unwrap_or(f64::INFINITY))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: listings.len(),
        skipped_rows,
        total_column_present,
    };
    Ok((listings, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "City,Area,Rooms,Bathroom,Parking spaces,Animal,Furniture,HOA (R$),Rent amount (R$),Property tax (R$),Fire insurance (R$),Total (R$)";

    fn load(csv: &str) -> (Vec<Listing>, LoadReport) {
        load_from_reader(Cursor::new(csv.to_string()), 10_000).unwrap()
    }

    #[test]
    fn lower_cases_headers_before_matching() {
        let csv = format!(
            "{}\nSão Paulo,70,2,1,1,acept,furnished,500,2000,100,30,2630\n",
            HEADER
        );
        let (listings, report) = load(&csv);
        assert_eq!(report.loaded_rows, 1);
        assert!(report.total_column_present);
        assert_eq!(listings[0].city, "São Paulo");
        assert_eq!(listings[0].rent_amount, 2000.0);
        assert_eq!(listings[0].total, Some(2630.0));
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let csv = "city,area,animal\nCampinas,50,acept\n";
        let err = load_from_reader(Cursor::new(csv.to_string()), 100).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("schema mismatch"));
        assert!(msg.contains("rent amount (r$)"));
        assert!(msg.contains("hoa (r$)"));
    }

    #[test]
    fn absent_total_column_degrades_instead_of_failing() {
        let csv = "city,area,animal,hoa (r$),rent amount (r$),property tax (r$),fire insurance (r$)\nCampinas,50,acept,100,900,40,12\n";
        let (listings, report) = load(csv);
        assert!(!report.total_column_present);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(listings[0].total, None);
    }

    #[test]
    fn zero_area_rows_are_skipped_and_counted() {
        let csv = format!(
            "{}\nCampinas,0,1,1,0,acept,not furnished,0,800,25,11,836\nCampinas,45,1,1,0,acept,not furnished,0,800,25,11,836\n",
            HEADER
        );
        let (listings, report) = load(&csv);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(listings[0].area, 45.0);
    }

    #[test]
    fn unrecognized_animal_flag_is_skipped() {
        let csv = format!(
            "{}\nCampinas,45,1,1,0,maybe,not furnished,0,800,25,11,836\n",
            HEADER
        );
        let (_, report) = load(&csv);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.loaded_rows, 0);
    }

    #[test]
    fn row_cap_limits_the_read() {
        let mut csv = String::from(HEADER);
        for i in 0..10 {
            csv.push_str(&format!(
                "\nCampinas,{},1,1,0,acept,not furnished,0,800,25,11,836",
                40 + i
            ));
        }
        let (listings, report) = load_from_reader(Cursor::new(csv), 3).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(listings.len(), 3);
    }

    #[test]
    fn sorts_ascending_by_total_when_present() {
        let csv = format!(
            "{}\nSão Paulo,70,2,1,1,acept,furnished,500,2000,100,30,2630\nCampinas,45,1,1,0,not acept,not furnished,0,800,25,11,836\n",
            HEADER
        );
        let (listings, _) = load(&csv);
        assert_eq!(listings[0].city, "Campinas");
        assert_eq!(listings[1].city, "São Paulo");
    }

    #[test]
    fn decimal_comma_values_parse() {
        let csv = format!(
            "{}\nCampinas,\"55,5\",1,1,0,acept,not furnished,\"1.100,25\",900,40,12,\"2.052,25\"\n",
            HEADER
        );
        let (listings, report) = load(&csv);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(listings[0].area, 55.5);
        assert_eq!(listings[0].hoa, 1100.25);
        assert_eq!(listings[0].total, Some(2052.25));
    }
}
