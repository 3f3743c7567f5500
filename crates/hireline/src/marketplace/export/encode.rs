use std::io;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_xlsxwriter::Workbook;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::ExportError;

pub const WORKSHEET_NAME: &str = "Applications";

/// Comma-delimited text. Only cells holding a delimiter, quote or line break are quoted.
pub(crate) fn encode_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    finish(writer)
}

/// Tab-delimited text, never quoted. Embedded tabs collapse to a single space.
pub(crate) fn encode_tsv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.replace('\t', " ")))?;
    }
    finish(writer)
}

/// Pretty-printed array of objects keyed by column header, keys kept in header order.
pub(crate) fn encode_json(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let records: Vec<Record<'_>> = rows
        .iter()
        .map(|cells| Record { headers, cells })
        .collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

/// Single-sheet workbook: header row, then one row per application.
pub(crate) fn encode_xlsx(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(WORKSHEET_NAME)?;

    for (col, header) in (0u16..).zip(headers.iter()) {
        sheet.write_string(0, col, *header)?;
    }
    for (row_index, row) in (1u32..).zip(rows.iter()) {
        for (col, cell) in (0u16..).zip(row.iter()) {
            sheet.write_string(row_index, col, cell.as_str())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer.into_inner().map_err(|err| {
        let cause = err.error();
        ExportError::Csv(csv::Error::from(io::Error::new(cause.kind(), cause.to_string())))
    })
}

struct Record<'a> {
    headers: &'a [&'a str],
    cells: &'a [String],
}

impl Serialize for Record<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells.iter()) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}
