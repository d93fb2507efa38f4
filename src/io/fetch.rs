//! Source image acquisition.
//!
//! An [`ImageSource`] turns a reference (URL or path) into raw bytes. Decoding
//! is shared by every source through [`acquire`].

use crate::core::config::FetchConfig;
use crate::core::error::FetchError;
use crate::core::types::Image;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Something that can produce the encoded bytes of a source image.
pub trait ImageSource: Send + Sync {
    /// Fetch the raw bytes behind `reference`.
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetch `reference` from `source` and decode it.
pub fn acquire(source: &dyn ImageSource, reference: &str) -> Result<Image, FetchError> {
    let bytes = source.fetch(reference).inspect_err(|e| {
        log::warn!("fetch of {reference} failed: {e}");
    })?;
    decode(&bytes)
}

/// Decode any supported format into 8-bit RGB.
///
/// Alpha is dropped and grayscale is expanded. Zero-area images are rejected.
pub fn decode(bytes: &[u8]) -> Result<Image, FetchError> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(FetchError::EmptyImage);
    }
    Ok(image)
}

fn is_http(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// HTTP(S) source backed by a blocking `ureq` agent.
pub struct HttpSource {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            max_bytes: config.max_bytes,
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl ImageSource for HttpSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let response = match self.agent.get(reference).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => return Err(FetchError::Status { status }),
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Network {
                    url: reference.to_string(),
                    reason: transport.to_string(),
                })
            }
        };
        // Only a plain 200 carries an image body.
        if response.status() != 200 {
            return Err(FetchError::Status {
                status: response.status(),
            });
        }

        let mut body = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Network {
                url: reference.to_string(),
                reason: e.to_string(),
            })?;
        if body.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(body)
    }
}

/// Local file source. Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone)]
pub struct FileSource {
    max_bytes: u64,
}

impl FileSource {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
        }
    }

    fn path_of(reference: &str) -> PathBuf {
        Path::new(reference.strip_prefix("file://").unwrap_or(reference)).to_path_buf()
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl ImageSource for FileSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let path = Self::path_of(reference);
        let io_error = |source| FetchError::Io {
            path: path.clone(),
            source,
        };

        let size = std::fs::metadata(&path).map_err(io_error)?.len();
        if size > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }
        std::fs::read(&path).map_err(io_error)
    }
}

/// Routes `http(s)://` references to HTTP and everything else to the
/// filesystem. Used by the command line; the server only fetches over HTTP.
pub struct DefaultSource {
    http: HttpSource,
    file: FileSource,
}

impl DefaultSource {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            http: HttpSource::new(config),
            file: FileSource::new(config),
        }
    }
}

impl ImageSource for DefaultSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        if is_http(reference) {
            self.http.fetch(reference)
        } else {
            self.file.fetch(reference)
        }
    }
}

/// In-memory source keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `reference` (builder style).
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(reference.into(), bytes);
        self
    }
}

impl ImageSource for MemorySource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::textured;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        textured(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let image = decode(&png_bytes(20, 10)).unwrap();
        assert_eq!(image.dimensions(), (20, 10));
        assert_eq!(image, textured(20, 10));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode(b"not an image"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_decode_drops_alpha() {
        let rgba = image::RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 0]));
        let mut bytes = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let image = decode(&bytes).unwrap();
        assert_eq!(image.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("mem://a", png_bytes(8, 8));
        assert_eq!(acquire(&source, "mem://a").unwrap().dimensions(), (8, 8));
        assert!(matches!(
            acquire(&source, "mem://b"),
            Err(FetchError::Status { status: 404 })
        ));
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.png");
        std::fs::write(&path, png_bytes(12, 6)).unwrap();

        let source = FileSource::default();
        let reference = path.to_string_lossy().to_string();
        assert_eq!(acquire(&source, &reference).unwrap().dimensions(), (12, 6));

        let url = format!("file://{reference}");
        assert_eq!(acquire(&source, &url).unwrap().dimensions(), (12, 6));
    }

    #[test]
    fn test_file_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let result = FileSource::default().fetch(&missing.to_string_lossy());
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }

    #[test]
    fn test_file_source_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, png_bytes(16, 16)).unwrap();

        let config = FetchConfig {
            max_bytes: 8,
            ..FetchConfig::default()
        };
        let result = FileSource::new(&config).fetch(&path.to_string_lossy());
        assert!(matches!(result, Err(FetchError::TooLarge { limit: 8 })));
    }

    #[test]
    fn test_scheme_routing() {
        assert!(is_http("http://example.com/a.jpg"));
        assert!(is_http("HTTPS://example.com/a.jpg"));
        assert!(!is_http("/tmp/a.jpg"));
        assert!(!is_http("file:///tmp/a.jpg"));
    }

    #[test]
    fn test_http_connection_refused() {
        // Port 9 on loopback is discard; nothing should be listening.
        let result = HttpSource::default().fetch("http://127.0.0.1:9/image.jpg");
        assert!(matches!(result, Err(FetchError::Network { .. })));
    }
}
