// Output handling: the per-event download directory and the append-only
// files each rendition's segments land in.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Media bytes are flushed to disk in chunks of this size.
const WRITE_CHUNK_SIZE: usize = 8 * 1024;

/// Removes regular files directly under `dir` and ensures the directory
/// exists. Non-recursive; subdirectories are left alone.
///
/// Run once per event before any rendition is written, so output from an
/// earlier run cannot be appended to.
pub fn clear_directory_files(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                debug!(path = %entry.path().display(), "removing stale output file");
                fs::remove_file(entry.path())?;
            }
        }
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Append-only output for one rendition, keyed by segment file extension.
///
/// Files are named `stream_{index}.{ext}` and opened lazily: the first write
/// to an extension truncates whatever is on disk, later writes append through
/// the same handle. Buffered writes keep media bytes hitting the file in
/// fixed-size chunks.
pub struct RenditionSink {
    dir: PathBuf,
    index: usize,
    writers: HashMap<String, BufWriter<File>>,
}

impl RenditionSink {
    pub fn new(dir: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            dir: dir.into(),
            index,
            writers: HashMap::new(),
        }
    }

    /// Appends `data` to the output file matching `segment_uri`'s extension.
    pub fn append(&mut self, segment_uri: &str, data: &[u8]) -> io::Result<()> {
        self.writer_for(segment_uri)?.write_all(data)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn writer_for(&mut self, segment_uri: &str) -> io::Result<&mut BufWriter<File>> {
        let extension = segment_extension(segment_uri);
        if !self.writers.contains_key(extension) {
            let path = self.dir.join(format!("stream_{}.{extension}", self.index));
            info!(path = %path.display(), "opening rendition output");
            let file = File::create(&path)?;
            self.writers.insert(
                extension.to_string(),
                BufWriter::with_capacity(WRITE_CHUNK_SIZE, file),
            );
        }
        Ok(self
            .writers
            .get_mut(extension)
            .expect("writer inserted above"))
    }
}

/// File extension of a segment URI, with query and fragment stripped.
/// URIs without an extension map to `ts`, the only bare form seen upstream.
fn segment_extension(segment_uri: &str) -> &str {
    let path = segment_uri
        .split_once(['?', '#'])
        .map_or(segment_uri, |(path, _)| path);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => extension,
        _ => "ts",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_the_final_path_segment() {
        assert_eq!(segment_extension("v/seg_0001.ts"), "ts");
        assert_eq!(segment_extension("init.mp4"), "mp4");
        assert_eq!(segment_extension("a/b/chunk_12.m4s"), "m4s");
    }

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(segment_extension("v/seg_0001.ts?sig=a.b"), "ts");
        assert_eq!(segment_extension("v/seg_0001.m4s#frag"), "m4s");
    }

    #[test]
    fn missing_extension_defaults_to_ts() {
        assert_eq!(segment_extension("v/segment"), "ts");
        assert_eq!(segment_extension(".hidden"), "ts");
    }

    #[test]
    fn appends_preserve_order_within_one_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = RenditionSink::new(dir.path(), 1);

        sink.append("init.mp4", b"head").expect("append");
        sink.append("a.m4s", b"one").expect("append");
        sink.append("b.m4s", b"two").expect("append");
        sink.flush().expect("flush");

        let init = fs::read(dir.path().join("stream_1.mp4")).expect("init file");
        let media = fs::read(dir.path().join("stream_1.m4s")).expect("media file");
        assert_eq!(init, b"head");
        assert_eq!(media, b"onetwo");
    }

    #[test]
    fn first_write_truncates_output_from_an_earlier_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stale = dir.path().join("stream_1.ts");
        fs::write(&stale, b"stale bytes").expect("seed stale file");

        let mut sink = RenditionSink::new(dir.path(), 1);
        sink.append("seg_0001.ts", b"fresh").expect("append");
        sink.flush().expect("flush");

        assert_eq!(fs::read(&stale).expect("output"), b"fresh");
    }

    #[test]
    fn sink_without_writes_creates_no_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = RenditionSink::new(dir.path(), 1);
        sink.flush().expect("flush");

        assert_eq!(
            fs::read_dir(dir.path()).expect("read_dir").count(),
            0,
            "an empty rendition must not create output files"
        );
    }

    #[test]
    fn clear_directory_files_removes_only_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("old.ts"), b"x").expect("seed file");
        fs::create_dir(dir.path().join("nested")).expect("seed dir");

        clear_directory_files(dir.path()).expect("clear");

        assert!(!dir.path().join("old.ts").exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn clear_directory_files_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("videos").join("42");

        clear_directory_files(&target).expect("clear");

        assert!(target.is_dir());
    }
}
