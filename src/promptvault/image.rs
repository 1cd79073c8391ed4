use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use regex::Regex;

use crate::errors::Result;
use crate::specific_fail;

/// A parsed `data:` URI as stored in a prompt's reference image.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    pub mime: String,
    pub data: Vec<u8>,
}

/// guess an image mime type from a file extension
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match &ext[..] {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<DataUri> {
        let re = Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+)?(?P<params>(?:;[\w.+-]+=[^;,]*)*)(?P<b64>;base64)?,(?P<payload>.*)$")?;
        let caps = match re.captures(uri) {
            Some(c) => c,
            None => return specific_fail!("reference image is not a data URI".to_string()),
        };
        let mime = caps.name("mime").map_or("text/plain", |m| m.as_str()).to_string();
        let payload = caps.name("payload").map_or("", |m| m.as_str());
        let data = if caps.name("b64").is_some() {
            general_purpose::STANDARD.decode(payload.trim())?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(DataUri { mime: mime, data: data })
    }

    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime, general_purpose::STANDARD.encode(&self.data))
    }

    /// read an image file into a data URI
    pub fn from_file(path: &Path) -> Result<DataUri> {
        let mime = match image_mime(path) {
            Some(m) => m,
            None => return specific_fail!(format!("{} is not a supported image file", path.display())),
        };
        let mut file = File::open(path)?;
        let mut data = vec![];
        file.read_to_end(&mut data)?;
        Ok(DataUri {
            mime: mime.to_string(),
            data: data,
        })
    }

    /// short description for listings, e.g. `image/png, 2.1 KiB`
    pub fn summary(&self) -> String {
        let len = self.data.len();
        if len < 1024 {
            format!("{}, {} bytes", self.mime, len)
        } else {
            format!("{}, {:.1} KiB", self.mime, len as f64 / 1024.0)
        }
    }
}
