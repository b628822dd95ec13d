use std::fs::File;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::StoreError;
use crate::models::Book;

/// Column order of the CSV export. Matches the field order of [`Book`].
pub const EXPORT_HEADER: [&str; 5] = ["title", "author", "year", "genre", "read"];

/// Write `books` as CSV to `destination`, truncating whatever was there.
/// `read` is serialized as `true`/`false`. Returns the number of data rows.
pub(crate) fn write_csv(destination: &Path, books: &[Book]) -> Result<usize, StoreError> {
    let file = File::create(destination).map_err(|err| StoreError::io(destination, err))?;

    // Headers are written by hand so an empty library still gets a header row.
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(EXPORT_HEADER)?;
    for book in books {
        writer.serialize(book)?;
    }
    writer
        .flush()
        .map_err(|err| StoreError::io(destination, err))?;

    Ok(books.len())
}
