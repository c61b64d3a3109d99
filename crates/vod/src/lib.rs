// VOD download engine: resolve a stream manifest to its media playlist and
// materialize the segments as local files, in manifest order.

mod client;
pub mod config;
mod download;
mod error;
mod output;
mod playlist;

pub use client::MediaClient;
pub use config::FetchConfig;
pub use download::{DownloadSummary, download_rendition};
pub use error::VodError;
pub use output::{RenditionSink, clear_directory_files};
pub use playlist::{ResolvedManifest, join_parent_collection, resolve_media_playlist};
