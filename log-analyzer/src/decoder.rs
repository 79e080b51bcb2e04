use std::{io::Read, path::Path};

use flate2::read::MultiGzDecoder;

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Plain,
    Gzip,
}

impl Framing {
    /// `access.log.gz` is gzip, anything else is plain text.
    pub fn from_filename(name: impl AsRef<Path>) -> Self {
        match name.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Self::Gzip,
            _ => Self::Plain,
        }
    }
}

impl From<bool> for Framing {
    fn from(is_gzip: bool) -> Self {
        if is_gzip { Self::Gzip } else { Self::Plain }
    }
}

pub fn decode_lines(bytes: &[u8], framing: Framing) -> Result<Vec<String>, DecodeError> {
    let text = match framing {
        Framing::Plain => String::from_utf8(bytes.to_vec())?,
        Framing::Gzip => {
            let mut raw = Vec::with_capacity(bytes.len() * 4);
            MultiGzDecoder::new(bytes)
                .read_to_end(&mut raw)
                .map_err(DecodeError::Gzip)?;
            String::from_utf8(raw)?
        }
    };
    Ok(text.lines().map(str::to_owned).collect())
}
