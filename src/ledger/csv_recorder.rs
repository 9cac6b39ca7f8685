//! CSV Trade Recorder
//!
//! Writes the trade history to a CSV file for reporting.

use super::record::TradeRecord;
use super::recorder::{RecordError, TradeRecorder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV file recorder. The file is truncated and the header written on creation.
pub struct CsvRecorder {
    writer: BufWriter<File>,
}

impl CsvRecorder {
    pub fn create(file_path: &Path) -> Result<Self, RecordError> {
        let mut writer = BufWriter::new(File::create(file_path)?);
        writeln!(writer, "{}", TradeRecord::csv_header())?;
        Ok(Self { writer })
    }
}

impl TradeRecorder for CsvRecorder {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), RecordError> {
        trade.write_csv_to(&mut self.writer)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }
}
