//! Append-only CSV log of polled accelerometer readings.
//!
//! # Storage Format
//!
//! A single comma-separated text file:
//! - line 1: the [`ACCEL_FIELDS`] header, written once when the file is new
//! - every later line: one [`AccelRecord`], written and synced on receipt
//!
//! Reopening a non-empty log appends to it without repeating the header, so
//! the header appears exactly once over the file's lifetime. Because each
//! record is flushed and `fsync`ed before `append` returns, an abrupt stop
//! loses at most the record being written. If that stop left a partial last
//! line, reopening terminates it first so the next record starts on a line of
//! its own; the partial row is then skipped by [`read_log`].

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::record::{ACCEL_FIELDS, AccelRecord};
use crate::sample::TelemetrySample;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Durable, line-at-a-time writer for the CSV log.
pub struct AccelLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    records_written: u64,
}

impl AccelLogWriter {
    /// Open (or create) the log at `path`, writing the header if the file is
    /// empty.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let is_new = file.metadata()?.len() == 0;
        let torn_tail = !is_new && !ends_with_newline(&mut file)?;
        let mut writer = BufWriter::new(file);

        if is_new {
            writeln!(writer, "{}", ACCEL_FIELDS.join(","))?;
        } else if torn_tail {
            log::warn!("{} ends mid-line; terminating it", path.display());
            writeln!(writer)?;
        }
        if is_new || torn_tail {
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }

        Ok(Self {
            path,
            writer,
            records_written: 0,
        })
    }

    /// Append one record and push it to durable storage.
    pub fn append(&mut self, record: &AccelRecord) -> std::io::Result<()> {
        writeln!(self.writer, "{}", record.to_csv_line())?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush and close the log, returning its path.
    pub fn finish(mut self) -> std::io::Result<PathBuf> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this writer (not counting earlier runs).
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Samples recovered from a log file.
#[derive(Debug, Clone, Default)]
pub struct LogContents {
    pub samples: Vec<TelemetrySample>,
    /// Per-axis `[x, y, z]` acceleration, one entry per sample.
    pub axes: Vec<[f64; 3]>,
    /// Data rows that could not be parsed.
    pub skipped: usize,
}

/// Load every parsable row of a CSV log in file order.
pub fn read_log(path: impl AsRef<Path>) -> std::io::Result<LogContents> {
    let reader = BufReader::new(File::open(path)?);
    let header = ACCEL_FIELDS.join(",");
    let mut contents = LogContents::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || (i == 0 && line.trim() == header) {
            continue;
        }
        let row = AccelRecord::parse(&line).and_then(|r| Ok((r.to_sample()?, r.to_axes()?)));
        match row {
            Ok((sample, axes)) => {
                contents.samples.push(sample);
                contents.axes.push(axes);
            }
            Err(e) => {
                log::debug!("skipping log line {}: {e}", i + 1);
                contents.skipped += 1;
            }
        }
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> AccelRecord {
        AccelRecord::parse(line).unwrap()
    }

    #[test]
    fn new_log_has_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("accel_log.csv");
        let writer = AccelLogWriter::open(&path).unwrap();
        assert_eq!(writer.records_written(), 0);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "timestamp_ms,accel_x_g,accel_y_g,accel_z_g,magnitude_g,filtered_magnitude_g,steps\n"
        );
    }

    #[test]
    fn append_is_visible_to_independent_reader() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut writer = AccelLogWriter::open(&path).unwrap();

        writer.append(&record("1000,0,0,1,1,1,0")).unwrap();
        // writer still open: the line must already be on disk
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1000,0,0,1,1,1,0");
        assert_eq!(writer.records_written(), 1);
    }

    #[test]
    fn reopen_does_not_repeat_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        {
            let mut w = AccelLogWriter::open(&path).unwrap();
            w.append(&record("1,0,0,0,1,1,0")).unwrap();
            w.finish().unwrap();
        }
        {
            let mut w = AccelLogWriter::open(&path).unwrap();
            w.append(&record("2,0,0,0,1,1,1")).unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        let header_count = text
            .lines()
            .filter(|l| l.starts_with("timestamp_ms"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn reopen_terminates_partial_last_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        {
            let mut w = AccelLogWriter::open(&path).unwrap();
            w.append(&record("1,0,0,0,1,1,0")).unwrap();
        }
        // Simulate a stop in the middle of writing the next row.
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"2,0,0,").unwrap();
        drop(f);

        let mut w = AccelLogWriter::open(&path).unwrap();
        w.append(&record("3,0,0,0,1,1,2")).unwrap();
        w.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "2,0,0,");
        assert_eq!(lines[3], "3,0,0,0,1,1,2");

        let contents = read_log(&path).unwrap();
        assert_eq!(contents.samples.len(), 2);
        assert_eq!(contents.skipped, 1);
    }

    #[test]
    fn reopen_intact_log_adds_no_blank_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        AccelLogWriter::open(&path).unwrap().finish().unwrap();
        AccelLogWriter::open(&path).unwrap().finish().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn open_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("runs").join("today").join("log.csv");
        let w = AccelLogWriter::open(&path).unwrap();
        assert_eq!(w.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn read_log_skips_header_and_bad_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut w = AccelLogWriter::open(&path).unwrap();
        w.append(&record("1500,0,0,1,1.2,1.1,3")).unwrap();
        w.append(&record("2000,0,0,1,oops,1.1,3")).unwrap();
        w.append(&record("2500,0,0,1,1.4,1.3,4")).unwrap();
        w.finish().unwrap();

        let contents = read_log(&path).unwrap();
        assert_eq!(contents.samples.len(), 2);
        assert_eq!(contents.skipped, 1);
        assert_eq!(contents.samples[0].timestamp, 1.5);
        assert_eq!(contents.samples[1].step_count, 4);
        assert_eq!(contents.axes.len(), contents.samples.len());
    }

    #[test]
    fn read_log_keeps_axis_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut w = AccelLogWriter::open(&path).unwrap();
        w.append(&record("1000,0.1,-0.9,0.3,1.0,1.0,0")).unwrap();
        w.append(&record("1050,bad,-0.9,0.3,1.0,1.0,0")).unwrap();
        w.finish().unwrap();

        let contents = read_log(&path).unwrap();
        assert_eq!(contents.axes, vec![[0.1, -0.9, 0.3]]);
        assert_eq!(contents.skipped, 1);
    }

    #[test]
    fn read_log_missing_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_log(tmp.path().join("nope.csv")).is_err());
    }
}
