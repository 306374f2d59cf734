//! Container image management
//!
//! Images are keyed by upstream format and built from the upstream base
//! archive. Both levels are cached: the image by name, the archive by
//! checksum.

pub mod archive;
pub mod builder;

pub use archive::{ensure_base_archive, BaseArchive, ARCHIVE_FILE};
pub use builder::{image_name, EnsuredImage, ImageBuilder};
