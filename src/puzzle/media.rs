//! Puzzle board images.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Error, Result};

const MEDIA_BASE: &str = "https://pbs.twimg.com/media";

/// Produces PNG bytes ready for upload.
pub trait ImageSource {
    fn fetch_png(&self, image_id: &str) -> Result<Vec<u8>>;
}

/// Fetches board images from the media CDN by id.
pub struct MediaCdn {
    http: Client,
    base: String,
}

impl MediaCdn {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            base: MEDIA_BASE.to_string(),
        })
    }

    pub fn url(&self, image_id: &str) -> String {
        format!("{}/{}?format=png&name=900x900", self.base, image_id)
    }
}

impl ImageSource for MediaCdn {
    fn fetch_png(&self, image_id: &str) -> Result<Vec<u8>> {
        let url = self.url(image_id);
        let response = self.http.get(&url).send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Http {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;
        let png = reencode_png(&bytes)?;
        debug!(image_id, fetched = bytes.len(), encoded = png.len(), "re-encoded image");
        Ok(png)
    }
}

/// Decode any supported format and write it back as a maximally compressed
/// PNG. Lossless.
pub fn reencode_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let mut out = Cursor::new(Vec::new());
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}
