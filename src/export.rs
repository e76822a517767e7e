use crate::error::ExportError;
use crate::simulation::ResultSet;
use image::{ImageFormat, Rgb, RgbImage};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Color used for cluster cells in rendered images
const CLUSTER_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

fn io_error(path: &Path, source: io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the `"<width>, <height>"` header followed by one `"<x>, <y>"` line per cell
pub fn write_csv_to<W: Write>(result: &ResultSet, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}, {}", result.width(), result.height())?;
    for (x, y) in result.cells() {
        writeln!(writer, "{}, {}", x, y)?;
    }
    writer.flush()
}

pub fn write_csv(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    write_csv_to(result, BufWriter::new(file)).map_err(|e| io_error(path, e))?;
    info!(path = %path.display(), cells = result.len(), "Wrote coordinate file");
    Ok(())
}

fn parse_pair(text: &str, line: usize) -> Result<(usize, usize), ExportError> {
    let parse_err = |message: String| ExportError::Parse { line, message };

    let mut fields = text.split(',').map(str::trim);
    let (Some(a), Some(b), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(parse_err(format!("expected two comma-separated values, got {:?}", text)));
    };
    let a = a
        .parse()
        .map_err(|e| parse_err(format!("bad value {:?}: {}", a, e)))?;
    let b = b
        .parse()
        .map_err(|e| parse_err(format!("bad value {:?}: {}", b, e)))?;
    Ok((a, b))
}

/// Parse a coordinate file produced by [`write_csv_to`]
pub fn read_csv_from<R: BufRead>(reader: R) -> Result<ResultSet, ExportError> {
    let mut lines = reader.lines().enumerate();

    let (width, height) = loop {
        match lines.next() {
            Some((idx, line)) => {
                let line = line.map_err(|e| ExportError::Parse {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
                if !line.trim().is_empty() {
                    break parse_pair(&line, idx + 1)?;
                }
            }
            None => {
                return Err(ExportError::Parse {
                    line: 1,
                    message: "missing size header".to_string(),
                })
            }
        }
    };

    let mut cells = Vec::new();
    for (idx, line) in lines {
        let line = line.map_err(|e| ExportError::Parse {
            line: idx + 1,
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let (x, y) = parse_pair(&line, idx + 1)?;
        if x >= width || y >= height {
            return Err(ExportError::Parse {
                line: idx + 1,
                message: format!("({}, {}) lies outside {}x{} grid", x, y, width, height),
            });
        }
        cells.push((x, y));
    }

    Ok(ResultSet::new(width, height, cells)?)
}

pub fn read_csv(path: &Path) -> Result<ResultSet, ExportError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    read_csv_from(BufReader::new(file))
}

/// Paint cluster cells onto a black `width` x `height` canvas
pub fn render_image(result: &ResultSet) -> RgbImage {
    let mut img = RgbImage::new(result.width() as u32, result.height() as u32);
    for &(x, y) in result.cells() {
        img.put_pixel(x as u32, y as u32, CLUSTER_COLOR);
    }
    img
}

pub fn render_png(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    render_image(result).save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "Wrote cluster image");
    Ok(())
}
