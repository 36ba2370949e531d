//! CSV output and input of location records.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use locscrape_scraper::LocationRecord;

const COLUMNS: [&str; 8] = [
    "Name",
    "Address",
    "Street",
    "City",
    "Region",
    "PostalCode",
    "Country",
    "SearchTerm",
];
const PHONE_COLUMN: &str = "Phone";

/// Write `records` as CSV. The header row is always written, so an empty
/// slice produces a header-only file.
pub(crate) fn write_locations<W: Write>(
    writer: W,
    records: &[LocationRecord],
    with_phone: bool,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);

    let mut header = COLUMNS.to_vec();
    if with_phone {
        header.push(PHONE_COLUMN);
    }
    csv_writer.write_record(&header)?;

    for r in records {
        let mut row = vec![
            r.name.as_str(),
            r.address.as_str(),
            r.street.as_str(),
            r.city.as_str(),
            r.region.as_str(),
            r.postal_code.as_str(),
            r.country.as_str(),
            r.search_term.as_str(),
        ];
        if with_phone {
            row.push(r.phone.as_deref().unwrap_or_default());
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Create (or overwrite) `path` and write `records` into it.
pub(crate) fn write_locations_file(
    path: &Path,
    records: &[LocationRecord],
    with_phone: bool,
) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_locations(BufWriter::new(file), records, with_phone)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote CSV");
    Ok(())
}

/// Read location records from CSV. `Name` and `Address` columns are required;
/// the others default to empty.
pub(crate) fn read_locations<R: Read>(reader: R) -> anyhow::Result<Vec<LocationRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for required in ["Name", "Address"] {
        if !headers.iter().any(|h| h == required) {
            anyhow::bail!("input CSV has no '{required}' column");
        }
    }

    let mut records = Vec::new();
    for (idx, row) in csv_reader.deserialize::<LocationRecord>().enumerate() {
        // +2: one for the header row, one for 1-based numbering.
        records.push(row.with_context(|| format!("invalid CSV row {}", idx + 2))?);
    }
    Ok(records)
}

/// `dir/name.csv` becomes `dir/name_with_phones.csv`.
pub(crate) fn enriched_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "locations".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_with_phones.csv"))
}
