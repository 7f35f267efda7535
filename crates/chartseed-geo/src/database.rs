//! Reader for the chart box database.
//!
//! One box per line: `name zoom swlat swlng nelat nelng`, whitespace
//! separated. Blank lines and `#` comments are ignored, malformed lines are
//! logged and skipped.

use chartseed_core::models::{LatLng, ZoomBox};
use chartseed_core::{ChartseedError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A box database file on disk
#[derive(Debug, Clone)]
pub struct BoxDatabase {
    path: PathBuf,
}

impl BoxDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream every well-formed box to `f`.
    ///
    /// Returns the number of skipped lines. Only failing to open or read the
    /// file is an error.
    pub fn for_each_box<F: FnMut(ZoomBox)>(&self, mut f: F) -> Result<usize> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut skipped = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_line(trimmed) {
                Ok(b) => f(b),
                Err(e) => {
                    tracing::warn!("skipping box line: {}", e);
                    skipped += 1;
                }
            }
        }

        Ok(skipped)
    }

    /// Read all well-formed boxes
    pub fn read_boxes(&self) -> Result<Vec<ZoomBox>> {
        let mut boxes = Vec::new();
        let skipped = self.for_each_box(|b| boxes.push(b))?;
        tracing::debug!(
            "read {} boxes from {} ({} skipped)",
            boxes.len(),
            self.path.display(),
            skipped
        );
        Ok(boxes)
    }

    /// Boxes within the zoom window that overlap or touch `region`
    pub fn boxes_in_region(
        &self,
        region: &ZoomBox,
        min_zoom: i32,
        max_zoom: i32,
    ) -> Result<Vec<ZoomBox>> {
        let mut boxes = Vec::new();
        self.for_each_box(|b| {
            if b.zoom >= min_zoom && b.zoom <= max_zoom && b.touches(region) {
                boxes.push(b);
            }
        })?;
        Ok(boxes)
    }

    /// Write boxes in database line format
    pub fn write_boxes(path: impl AsRef<Path>, boxes: &[ZoomBox]) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        for b in boxes {
            writeln!(file, "{}", to_line(b))?;
        }
        file.flush()?;
        Ok(())
    }
}

/// Parse one database line
pub fn parse_line(line: &str) -> Result<ZoomBox> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(invalid(line, format!("expected 6 fields, found {}", parts.len())));
    }

    let zoom: i32 =
        parts[1].parse().map_err(|_| invalid(line, format!("invalid zoom '{}'", parts[1])))?;

    let mut values = [0.0f64; 4];
    for (value, part) in values.iter_mut().zip(&parts[2..]) {
        *value = part.parse().map_err(|_| invalid(line, format!("invalid number '{}'", part)))?;
    }
    let [sw_lat, sw_lng, ne_lat, ne_lng] = values;

    Ok(ZoomBox::new(LatLng::new(ne_lat, ne_lng), LatLng::new(sw_lat, sw_lng), zoom)
        .with_name(parts[0]))
}

/// Format a box as a database line
pub fn to_line(b: &ZoomBox) -> String {
    format!(
        "{} {} {} {} {} {}",
        b.name.as_deref().unwrap_or("BOX"),
        b.zoom,
        b.southwest.lat,
        b.southwest.lng,
        b.northeast.lat,
        b.northeast.lng
    )
}

fn invalid(line: &str, reason: String) -> ChartseedError {
    ChartseedError::InvalidBoxLine { line: line.to_string(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_line() {
        let b = parse_line("1U319240 12 24.0 119.0 25.0 120.0").unwrap();
        assert_eq!(b.name.as_deref(), Some("1U319240"));
        assert_eq!(b.zoom, 12);
        assert_eq!(b.southwest, LatLng::new(24.0, 119.0));
        assert_eq!(b.northeast, LatLng::new(25.0, 120.0));
    }

    #[test]
    fn test_parse_line_tolerates_repeated_spaces() {
        let b = parse_line("A  7   1.5 2.5  3.5 4.5").unwrap();
        assert_eq!(b.zoom, 7);
        assert_eq!(b.northeast, LatLng::new(3.5, 4.5));
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(
            parse_line("A 7 1.0 2.0 3.0"),
            Err(ChartseedError::InvalidBoxLine { .. })
        ));
        assert!(matches!(
            parse_line("A seven 1.0 2.0 3.0 4.0"),
            Err(ChartseedError::InvalidBoxLine { .. })
        ));
        assert!(matches!(
            parse_line("A 7 1.0 north 3.0 4.0"),
            Err(ChartseedError::InvalidBoxLine { .. })
        ));
    }

    #[test]
    fn test_line_roundtrip() {
        let b = ZoomBox::from_edges(24.0, 119.0, 25.5, 120.25, 12).with_name("COMP00001");
        assert_eq!(parse_line(&to_line(&b)).unwrap(), b);
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "A 12 24.0 119.0 25.0 120.0").unwrap();
        writeln!(file, "broken line").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "B x 24.0 119.0 25.0 120.0").unwrap();
        writeln!(file, "C 10 20.0 100.0 21.0 101.0").unwrap();

        let db = BoxDatabase::new(file.path());
        let mut count = 0;
        let skipped = db.for_each_box(|_| count += 1).unwrap();

        assert_eq!(count, 2);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_boxes_in_region() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "IN 12 24.0 119.0 25.0 120.0").unwrap();
        writeln!(file, "OUT 12 40.0 10.0 41.0 11.0").unwrap();
        writeln!(file, "DEEP 18 24.0 119.0 25.0 120.0").unwrap();
        writeln!(file, "EDGE 12 25.0 120.0 26.0 121.0").unwrap();

        let db = BoxDatabase::new(file.path());
        let region = ZoomBox::from_edges(24.5, 119.5, 25.0, 120.0, 0);
        let found = db.boxes_in_region(&region, 0, 16).unwrap();
        let names: Vec<String> = found.into_iter().filter_map(|b| b.name).collect();

        assert_eq!(names, vec!["IN".to_string(), "EDGE".to_string()]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let db = BoxDatabase::new("/nonexistent/boxes.bbox");
        assert!(matches!(db.read_boxes(), Err(ChartseedError::Io(_))));
    }
}
