//! ASCII raster import.
//!
//! The text format carries a header followed by cell values in row-major
//! order, highest (northernmost) row first:
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    100.0
//! yllcorner    200.0
//! cellsize     0.5
//! NODATA_value -9999
//! 1 2 3 4
//! 5 6 7 8
//! 9 10 11 12
//! ```
//!
//! Header keys are case-insensitive; the no-data line is optional and
//! defaults to the cell type's conventional sentinel. The header is read
//! once at construction; values stream through [`AsciiGridReader::into_grid`]
//! without ever holding a full row set in memory.

use std::collections::VecDeque;
use std::io::BufRead;

use tracing::info;

use chunk_store::ChunkStore;
use raster_common::{CellValue, ChunkId, GridGeometry};
use raster_grid::{Grid, GridConfig};

use crate::error::{RasterIoError, Result};

/// Parsed ASCII raster header.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGridHeader {
    /// Number of columns.
    pub ncols: i64,
    /// Number of rows.
    pub nrows: i64,
    /// X coordinate of the lower left corner.
    pub xllcorner: f64,
    /// Y coordinate of the lower left corner.
    pub yllcorner: f64,
    /// Cell side length.
    pub cellsize: f64,
    /// Raw no-data token, if the header carried one.
    pub nodata_value: Option<String>,
}

/// Streaming reader for ASCII raster files.
pub struct AsciiGridReader<R: BufRead> {
    reader: R,
    header: AsciiGridHeader,
    pending: VecDeque<String>,
}

impl<R: BufRead> AsciiGridReader<R> {
    /// Read the header and position the stream at the first cell value.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut pending = VecDeque::new();
        let header = read_header(&mut reader, &mut pending)?;
        Ok(Self {
            reader,
            header,
            pending,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &AsciiGridHeader {
        &self.header
    }

    /// Stream every cell value into a new grid.
    ///
    /// Chunk extents come from the config; geometry and sentinel come from
    /// the header. The bulk load goes through the grid's `init` path (no
    /// incremental statistics) with each chunk-row band pinned and a
    /// proactive memory check at every band boundary. Cells holding the
    /// sentinel are skipped so fully-empty chunks are never materialized.
    pub fn into_grid<T, S>(mut self, grid_id: &str, config: GridConfig, store: S) -> Result<Grid<T, S>>
    where
        T: CellValue,
        S: ChunkStore,
    {
        let no_data = match &self.header.nodata_value {
            Some(token) => T::parse(token).ok_or_else(|| {
                RasterIoError::malformed(format!("unparseable NODATA_value token '{token}'"))
            })?,
            None => T::default_no_data(),
        };

        let geometry = GridGeometry::new(
            self.header.nrows,
            self.header.ncols,
            config.chunk_rows,
            config.chunk_cols,
        )
        .with_origin(self.header.xllcorner, self.header.yllcorner, self.header.cellsize);

        let mut grid = Grid::with_geometry(grid_id, geometry, no_data, config, store)?;
        // The grid may have substituted an invalid sentinel.
        let no_data = grid.no_data();
        let (_, chunk_cols) = grid.geometry().num_chunks();

        let mut cells_loaded: u64 = 0;
        let mut band: Option<i64> = None;
        for row in 0..self.header.nrows {
            // Pin the chunk-row band being filled and run the proactive
            // pressure check at each band boundary.
            let row_band = row.div_euclid(grid.geometry().chunk_rows);
            if band != Some(row_band) {
                if let Some(prior) = band {
                    set_band_pins(&mut grid, prior, chunk_cols, false);
                }
                set_band_pins(&mut grid, row_band, chunk_cols, true);
                grid.check_and_maybe_free_memory()?;
                band = Some(row_band);
            }

            for col in 0..self.header.ncols {
                let token = self.next_token()?.ok_or_else(|| {
                    RasterIoError::malformed(format!(
                        "expected {} cell values, stream ended at row {row}, col {col}",
                        self.header.nrows * self.header.ncols
                    ))
                })?;
                let value = T::parse(&token).ok_or_else(|| {
                    RasterIoError::malformed(format!(
                        "unparseable cell token '{token}' at row {row}, col {col}"
                    ))
                })?;
                if value != no_data {
                    grid.init_cell(row, col, value)?;
                    cells_loaded += 1;
                }
            }
        }
        if let Some(prior) = band {
            set_band_pins(&mut grid, prior, chunk_cols, false);
        }

        if let Some(extra) = self.next_token()? {
            return Err(RasterIoError::malformed(format!(
                "trailing token '{extra}' after {} cell values",
                self.header.nrows * self.header.ncols
            )));
        }

        info!(
            grid = grid_id,
            rows = self.header.nrows,
            cols = self.header.ncols,
            cells_loaded,
            "Imported ASCII raster"
        );
        Ok(grid)
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }
}

fn set_band_pins<T: CellValue, S: ChunkStore>(
    grid: &mut Grid<T, S>,
    band: i64,
    chunk_cols: i64,
    pinned: bool,
) {
    for chunk_col in 0..chunk_cols {
        let id = ChunkId::new(band, chunk_col);
        if pinned {
            grid.pin(id);
        } else {
            grid.unpin(id);
        }
    }
}

fn parse_field<F: std::str::FromStr>(key: &str, raw: &str) -> Result<F> {
    raw.parse()
        .map_err(|_| RasterIoError::malformed(format!("invalid {key} '{raw}'")))
}

fn read_header<R: BufRead>(
    reader: &mut R,
    pending: &mut VecDeque<String>,
) -> Result<AsciiGridHeader> {
    let mut values: Vec<String> = Vec::new();
    let mut nodata_value = None;

    // Five required "key value" lines, in order.
    const REQUIRED: [&str; 5] = ["ncols", "nrows", "xllcorner", "yllcorner", "cellsize"];
    for expected in REQUIRED {
        let (key, value) = header_line(reader)?
            .ok_or_else(|| RasterIoError::MissingHeader(expected.to_string()))?;
        if key != expected {
            return Err(RasterIoError::malformed(format!(
                "expected header field '{expected}', found '{key}'"
            )));
        }
        values.push(value);
    }

    // The no-data line is optional; anything else on the next line is the
    // first row of cell values.
    let mut line = String::new();
    if reader.read_line(&mut line)? > 0 {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [key, value] if key.eq_ignore_ascii_case("nodata_value") => {
                nodata_value = Some(value.to_string());
            }
            _ => pending.extend(tokens.iter().map(|t| t.to_string())),
        }
    }

    let header = AsciiGridHeader {
        ncols: parse_field("ncols", &values[0])?,
        nrows: parse_field("nrows", &values[1])?,
        xllcorner: parse_field("xllcorner", &values[2])?,
        yllcorner: parse_field("yllcorner", &values[3])?,
        cellsize: parse_field("cellsize", &values[4])?,
        nodata_value,
    };

    if header.ncols <= 0 || header.nrows <= 0 {
        return Err(RasterIoError::malformed(format!(
            "grid extents must be positive, got {}x{}",
            header.nrows, header.ncols
        )));
    }
    if header.cellsize <= 0.0 {
        return Err(RasterIoError::malformed(format!(
            "cellsize must be positive, got {}",
            header.cellsize
        )));
    }

    Ok(header)
}

/// Read one "key value" header line, lowercasing the key.
fn header_line<R: BufRead>(reader: &mut R) -> Result<Option<(String, String)>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue, // skip blank lines
            [key, value] => return Ok(Some((key.to_lowercase(), value.to_string()))),
            _ => {
                return Err(RasterIoError::malformed(format!(
                    "expected 'key value' header line, found '{}'",
                    line.trim()
                )))
            }
        }
    }
}
