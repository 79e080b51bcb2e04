use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use chrono::NaiveDate;
use flate2::{Compression, write::GzEncoder};
use rand::Rng;

use crate::generator::{generate_combined_log, random_timestamp, truncate};

#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub lines: usize,
    pub bot_share: f64,
    pub malformed_share: f64,
    pub start_date: NaiveDate,
    pub days: u32,
}

/// Writes `shape.lines` lines to `output`, gzip-framed for `*.gz` paths.
/// Returns how many lines were written malformed.
pub fn write_log_file<R: Rng + ?Sized>(
    output: &Path,
    shape: Shape,
    rng: &mut R,
) -> io::Result<usize> {
    let file = BufWriter::new(File::create(output)?);
    let gzip = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        let malformed = write_lines(&mut encoder, shape, rng)?;
        encoder.finish()?.flush()?;
        Ok(malformed)
    } else {
        let mut file = file;
        let malformed = write_lines(&mut file, shape, rng)?;
        file.flush()?;
        Ok(malformed)
    }
}

fn write_lines<W: Write, R: Rng + ?Sized>(out: &mut W, shape: Shape, rng: &mut R) -> io::Result<usize> {
    let mut malformed = 0;
    for _ in 0..shape.lines {
        let ts = random_timestamp(rng, shape.start_date, shape.days);
        let line = generate_combined_log(rng, ts, shape.bot_share);
        if rng.random::<f64>() < shape.malformed_share {
            malformed += 1;
            writeln!(out, "{}", truncate(&line))?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    Ok(malformed)
}
