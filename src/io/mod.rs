//! Edges of the pipeline: acquiring source images and encoding results.
//!
//! - [`fetch`]: [`ImageSource`] implementations for HTTP, local files and
//!   in-memory fixtures, plus decoding into an RGB image
//! - [`encode`]: JPEG encoding and `data:` URL transport strings

pub mod encode;
pub mod fetch;

pub use encode::{encode_jpeg, to_data_url, DATA_URL_PREFIX};
pub use fetch::{acquire, decode, DefaultSource, FileSource, HttpSource, ImageSource, MemorySource};
