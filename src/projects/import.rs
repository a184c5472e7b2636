use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

use super::domain::ParcelDraft;

#[derive(Debug, thiserror::Error)]
pub enum ParcelImportError {
    #[error("invalid parcel CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {field} '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("parcel CSV contained no rows")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct ParcelRow {
    #[serde(rename = "Parcel ID")]
    parcel_id: String,
    #[serde(rename = "Acres")]
    acres: String,
    #[serde(rename = "Sq Ft", default, deserialize_with = "empty_string_as_none")]
    sq_ft: Option<String>,
    #[serde(
        rename = "County Value",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    county_value: Option<String>,
    #[serde(rename = "Legal Description", default)]
    legal_description: String,
    #[serde(rename = "Coordinates", default)]
    coordinates: String,
}

/// Reads a county parcel export into drafts. Rows are numbered from 1, excluding the header.
pub fn parse_parcels<R: Read>(reader: R) -> Result<Vec<ParcelDraft>, ParcelImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut drafts = Vec::new();

    for (index, record) in csv_reader.deserialize::<ParcelRow>().enumerate() {
        let row = record?;
        let line = index + 1;

        drafts.push(ParcelDraft {
            parcel_id: row.parcel_id,
            acres: parse_decimal(line, "Acres", &row.acres)?,
            sq_ft: row
                .sq_ft
                .as_deref()
                .map(|value| parse_decimal(line, "Sq Ft", value))
                .transpose()?,
            county_value: row
                .county_value
                .as_deref()
                .map(|value| parse_decimal(line, "County Value", value))
                .transpose()?
                .unwrap_or(Decimal::ZERO),
            legal_description: row.legal_description,
            coordinates: row.coordinates,
        });
    }

    if drafts.is_empty() {
        return Err(ParcelImportError::Empty);
    }

    Ok(drafts)
}

fn parse_decimal(
    row: usize,
    field: &'static str,
    raw: &str,
) -> Result<Decimal, ParcelImportError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| ParcelImportError::InvalidNumber {
        row,
        field,
        value: raw.to_string(),
    })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_currency_formatting() {
        let csv = "Parcel ID,Acres,Sq Ft,County Value,Legal Description,Coordinates\n\
R100,2.5,,\"$48,000.00\",ABS 12 TR 4,\"30.26,-97.74\"\n\
R101,1,43560,12000,ABS 12 TR 5,\n";

        let drafts = parse_parcels(csv.as_bytes()).expect("csv parses");

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].parcel_id, "R100");
        assert_eq!(drafts[0].acres, Decimal::new(25, 1));
        assert!(drafts[0].sq_ft.is_none());
        assert_eq!(drafts[0].county_value, Decimal::from(48_000));
        assert_eq!(drafts[0].coordinates, "30.26,-97.74");
        assert_eq!(drafts[1].sq_ft, Some(Decimal::from(43_560)));
        assert!(drafts[1].coordinates.is_empty());
    }

    #[test]
    fn reports_the_offending_row() {
        let csv = "Parcel ID,Acres,Sq Ft,County Value,Legal Description,Coordinates\n\
R100,2.5,,1000,,\n\
R101,lots,,1000,,\n";

        match parse_parcels(csv.as_bytes()) {
            Err(ParcelImportError::InvalidNumber { row, field, value }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "Acres");
                assert_eq!(value, "lots");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }

    #[test]
    fn header_only_export_is_empty() {
        let csv = "Parcel ID,Acres,Sq Ft,County Value,Legal Description,Coordinates\n";
        assert!(matches!(
            parse_parcels(csv.as_bytes()),
            Err(ParcelImportError::Empty)
        ));
    }
}
