use std::fs;
use std::path;
use std::str;

use encoding_rs::WINDOWS_1252;

use crate::errors::{Result, StatsError};

/// The decoded text of one `.bib` source together with the name it was loaded under.
#[derive(Debug, Clone)]
pub struct Document {
    /// path or label of the source, used for diagnostics and the report
    pub name: String,
    /// decoded text
    pub text: String,
}

impl Document {
    /// Read the file at `path`. The bytes are decoded as UTF-8; if that fails,
    /// they are decoded again with a single-byte Latin encoding, which never fails.
    pub fn from_file<P: AsRef<path::Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| StatsError::io(path, e))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    valid_up_to = e.utf8_error().valid_up_to(),
                    "not valid UTF-8, decoding as Latin-1"
                );
                let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(e.as_bytes());
                decoded.into_owned()
            }
        };
        Ok(Document {
            name: path.display().to_string(),
            text,
        })
    }

    /// Use a string as document content.
    pub fn from_string<N: Into<String>>(name: N, text: String) -> Document {
        Document {
            name: name.into(),
            text,
        }
    }
}

impl str::FromStr for Document {
    type Err = StatsError;

    fn from_str(text: &str) -> Result<Self> {
        Ok(Document::from_string("<string>", text.to_string()))
    }
}
