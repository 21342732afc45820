//! ASCII raster export.

use std::io::Write;

use tracing::info;

use chunk_store::ChunkStore;
use raster_common::CellValue;
use raster_grid::Grid;

use crate::error::Result;

/// Writer emitting the same text format the importer consumes.
///
/// Cells holding the grid's sentinel are rendered with a caller-supplied
/// no-data token, which also becomes the header's `NODATA_value`.
#[derive(Debug, Clone)]
pub struct AsciiGridWriter {
    no_data_token: String,
}

impl AsciiGridWriter {
    /// Create a writer with the given no-data token.
    pub fn new(no_data_token: impl Into<String>) -> Self {
        Self {
            no_data_token: no_data_token.into(),
        }
    }

    /// Write the header and every cell value, row-major, highest row
    /// first. Evicted chunks are reloaded transparently by the cell reads.
    pub fn write<T, S, W>(&self, grid: &mut Grid<T, S>, out: &mut W) -> Result<()>
    where
        T: CellValue,
        S: ChunkStore,
        W: Write,
    {
        let geometry = *grid.geometry();
        writeln!(out, "ncols        {}", geometry.cols)?;
        writeln!(out, "nrows        {}", geometry.rows)?;
        writeln!(out, "xllcorner    {}", geometry.xllcorner)?;
        writeln!(out, "yllcorner    {}", geometry.yllcorner)?;
        writeln!(out, "cellsize     {}", geometry.cellsize)?;
        writeln!(out, "NODATA_value {}", self.no_data_token)?;

        let no_data = grid.no_data();
        let mut line = String::new();
        for row in 0..geometry.rows {
            line.clear();
            for col in 0..geometry.cols {
                if col > 0 {
                    line.push(' ');
                }
                let value = grid.get_cell(row, col)?;
                if value == no_data {
                    line.push_str(&self.no_data_token);
                } else {
                    line.push_str(&value.to_string());
                }
            }
            writeln!(out, "{line}")?;
        }

        info!(
            grid = grid.id(),
            rows = geometry.rows,
            cols = geometry.cols,
            "Exported ASCII raster"
        );
        Ok(())
    }
}
