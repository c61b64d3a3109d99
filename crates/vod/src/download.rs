// Sequential segment download: initialization segments first, then media
// segments, appended to the rendition's output in manifest order.

use std::time::Instant;

use futures::StreamExt;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use m3u8_rs::MediaPlaylist;
use tracing::debug;
use url::Url;

use crate::client::MediaClient;
use crate::error::VodError;
use crate::output::RenditionSink;
use crate::playlist::{ResolvedManifest, join_parent_collection};

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadSummary {
    pub init_segments: usize,
    pub segments: usize,
    pub bytes_written: u64,
}

/// Downloads every segment of `manifest` into `sink`, strictly in manifest
/// order and one at a time.
///
/// Any fetch failure aborts the rendition; bytes appended before the failure
/// stay on disk. An empty manifest is not an error and writes nothing.
pub async fn download_rendition(
    client: &MediaClient,
    manifest: &ResolvedManifest,
    sink: &mut RenditionSink,
) -> Result<DownloadSummary, VodError> {
    let init_uris = init_segment_uris(&manifest.playlist);
    let total = init_uris.len() + manifest.playlist.segments.len();

    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.yellow} [{bar:20.yellow/white}] {pos}/{len} segments {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let started = Instant::now();
    let mut summary = DownloadSummary::default();

    for uri in &init_uris {
        let url = join_parent_collection(&manifest.url, uri)?;
        let body = fetch_segment_body(client, &url, "init segment fetch").await?;
        sink.append(uri, &body)?;

        summary.init_segments += 1;
        summary.bytes_written += body.len() as u64;
        debug!(uri = %url, size = body.len(), "downloaded init segment");
        advance(&progress, &summary, started);
    }

    for segment in &manifest.playlist.segments {
        let url = join_parent_collection(&manifest.url, &segment.uri)?;
        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VodError::http_status(
                status,
                response.url().as_str(),
                "segment fetch",
            ));
        }

        let mut written = 0usize;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.append(&segment.uri, &chunk)?;
            written += chunk.len();
        }

        summary.segments += 1;
        summary.bytes_written += written as u64;
        debug!(uri = %url, size = written, "downloaded segment");
        advance(&progress, &summary, started);
    }

    sink.flush()?;
    progress.finish_with_message(format!("{}", HumanBytes(summary.bytes_written)));
    Ok(summary)
}

async fn fetch_segment_body(
    client: &MediaClient,
    url: &Url,
    operation: &'static str,
) -> Result<bytes::Bytes, VodError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(VodError::http_status(
            status,
            response.url().as_str(),
            operation,
        ));
    }
    Ok(response.bytes().await?)
}

fn advance(progress: &ProgressBar, summary: &DownloadSummary, started: Instant) {
    progress.inc(1);

    let elapsed = started.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        summary.bytes_written as f64 / elapsed
    } else {
        0.0
    };
    progress.set_message(format!(
        "{} ({}/s)",
        HumanBytes(summary.bytes_written),
        HumanBytes(rate as u64)
    ));
}

/// Initialization-segment URIs in listed order.
///
/// The parser attaches an `EXT-X-MAP` to every segment it governs, so
/// consecutive repeats collapse to one download each.
fn init_segment_uris(playlist: &MediaPlaylist) -> Vec<String> {
    let mut uris: Vec<String> = Vec::new();
    if let Some(uri) = playlist_level_map_uri(playlist) {
        uris.push(uri);
    }
    for segment in &playlist.segments {
        if let Some(map) = &segment.map
            && uris.last().map(String::as_str) != Some(map.uri.as_str())
        {
            uris.push(map.uri.clone());
        }
    }
    uris
}

/// An `EXT-X-MAP` that appears before the first segment is not attached to
/// any `MediaSegment` by the parser; it ends up in `unknown_tags` as an
/// "X-MAP" ext tag, so the URI attribute is picked out by hand.
fn playlist_level_map_uri(playlist: &MediaPlaylist) -> Option<String> {
    let tag = playlist
        .unknown_tags
        .iter()
        .rev()
        .find(|tag| tag.tag == "X-MAP")?;
    let rest = tag.rest.as_deref()?;
    let (_, after) = rest.split_once("URI=\"")?;
    let (uri, _) = after.split_once('"')?;
    (!uri.is_empty()).then(|| uri.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use m3u8_rs::Playlist;

    fn parse_media_playlist(input: &str) -> MediaPlaylist {
        match m3u8_rs::parse_playlist_res(input.as_bytes()).expect("playlist should parse") {
            Playlist::MediaPlaylist(pl) => pl,
            Playlist::MasterPlaylist(_) => panic!("expected media playlist"),
        }
    }

    #[test]
    fn init_uris_collapse_consecutive_repeats() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n\
             #EXT-X-VERSION:7\n\
             #EXT-X-TARGETDURATION:4\n\
             #EXTINF:4.0,\n\
             #EXT-X-MAP:URI=\"init.mp4\"\n\
             seg_0001.m4s\n\
             #EXTINF:4.0,\n\
             #EXT-X-MAP:URI=\"init.mp4\"\n\
             seg_0002.m4s\n",
        );

        assert_eq!(init_segment_uris(&playlist), vec!["init.mp4".to_string()]);
    }

    #[test]
    fn init_uris_keep_listed_order_across_changes() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n\
             #EXT-X-VERSION:7\n\
             #EXT-X-TARGETDURATION:4\n\
             #EXTINF:4.0,\n\
             #EXT-X-MAP:URI=\"init_a.mp4\"\n\
             seg_0001.m4s\n\
             #EXTINF:4.0,\n\
             #EXT-X-MAP:URI=\"init_b.mp4\"\n\
             seg_0002.m4s\n",
        );

        assert_eq!(
            init_segment_uris(&playlist),
            vec!["init_a.mp4".to_string(), "init_b.mp4".to_string()]
        );
    }

    #[test]
    fn playlist_level_map_is_downloaded_first() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n\
             #EXT-X-VERSION:7\n\
             #EXT-X-TARGETDURATION:4\n\
             #EXT-X-MAP:URI=\"init.mp4\",BYTERANGE=\"720@0\"\n\
             #EXTINF:4.0,\n\
             seg_0001.m4s\n\
             #EXTINF:4.0,\n\
             seg_0002.m4s\n",
        );

        assert_eq!(init_segment_uris(&playlist), vec!["init.mp4".to_string()]);
    }

    #[test]
    fn playlist_without_maps_has_no_init_uris() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n\
             #EXT-X-VERSION:3\n\
             #EXT-X-TARGETDURATION:4\n\
             #EXTINF:4.0,\n\
             seg_0001.ts\n",
        );

        assert!(init_segment_uris(&playlist).is_empty());
    }
}
