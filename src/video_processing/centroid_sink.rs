use std::io::{self, Write};

use serde::Serialize;

use crate::{definitions::NO_GROUP_SENTINEL, Group};

/// Receives the largest group of each frame, one call per frame, in order.
pub trait CentroidSink {
    /// Record the result for the frame shown at `timestamp`. `best` is `None` when
    /// the frame contained no foreground pixels.
    fn write_frame(&mut self, timestamp: f64, best: Option<&Group>) -> io::Result<()>;

    /// Flush anything buffered. No more frames will be written.
    fn finish(&mut self) -> io::Result<()>;
}

fn centroid_or_sentinel(best: Option<&Group>) -> (i64, i64) {
    best.map_or((NO_GROUP_SENTINEL, NO_GROUP_SENTINEL), |g| {
        (i64::from(g.centroid().x), i64::from(g.centroid().y))
    })
}

/// Writes `time,x,y` rows. Times have three decimal places.
#[derive(Debug)]
pub struct CsvCentroidSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvCentroidSink<W> {
    pub const HEADER: &'static str = "time,x,y";

    /// Wrap `writer` and write the header line.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", Self::HEADER)?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CentroidSink for CsvCentroidSink<W> {
    fn write_frame(&mut self, timestamp: f64, best: Option<&Group>) -> io::Result<()> {
        let (x, y) = centroid_or_sentinel(best);
        writeln!(self.writer, "{timestamp:.3},{x},{y}")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Serialize)]
struct JsonRow {
    time: f64,
    x: i64,
    y: i64,
    size: usize,
}

/// Writes one JSON object per frame, one per line.
#[derive(Debug)]
pub struct JsonLinesCentroidSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesCentroidSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CentroidSink for JsonLinesCentroidSink<W> {
    fn write_frame(&mut self, timestamp: f64, best: Option<&Group>) -> io::Result<()> {
        let (x, y) = centroid_or_sentinel(best);
        let row = JsonRow {
            // millisecond resolution, matching the csv output
            time: (timestamp * 1000.0).round() / 1000.0,
            x,
            y,
            size: best.map_or(0, Group::size),
        };

        serde_json::to_writer(&mut self.writer, &row)?;
        self.writer.write_all(b"\n")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<S: CentroidSink + ?Sized> CentroidSink for Box<S> {
    fn write_frame(&mut self, timestamp: f64, best: Option<&Group>) -> io::Result<()> {
        (**self).write_frame(timestamp, best)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Coordinate;

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_csv_rows() {
        let mut sink = CsvCentroidSink::new(vec![]).unwrap();
        sink.write_frame(0.0, Some(&Group::new(12, Coordinate::new(10, 4))))
            .unwrap();
        sink.write_frame(1.0 / 30.0, None).unwrap();
        sink.write_frame(2.5, Some(&Group::new(1, Coordinate::new(0, 0))))
            .unwrap();
        sink.finish().unwrap();

        assert_eq!(
            to_string(sink.into_inner()),
            "time,x,y\n0.000,10,4\n0.033,-1,-1\n2.500,0,0\n"
        );
    }

    #[test]
    fn test_csv_header_only() {
        let mut sink = CsvCentroidSink::new(vec![]).unwrap();
        sink.finish().unwrap();
        assert_eq!(to_string(sink.into_inner()), "time,x,y\n");
    }

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLinesCentroidSink::new(vec![]);
        sink.write_frame(1.0 / 30.0, Some(&Group::new(52, Coordinate::new(10, 4))))
            .unwrap();
        sink.write_frame(0.5, None).unwrap();
        sink.finish().unwrap();

        let text = to_string(sink.into_inner());
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["time"], 0.033);
        assert_eq!(first["x"], 10);
        assert_eq!(first["y"], 4);
        assert_eq!(first["size"], 52);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["x"], -1);
        assert_eq!(second["y"], -1);
        assert_eq!(second["size"], 0);
    }

    #[test]
    fn test_boxed_sink() {
        let mut sink: Box<dyn CentroidSink> = Box::new(JsonLinesCentroidSink::new(io::sink()));
        sink.write_frame(0.0, None).unwrap();
        sink.finish().unwrap();
    }
}
