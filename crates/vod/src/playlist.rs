// Manifest resolution: fetch a playlist, pick the best variant of a master,
// and hand back the media playlist the segments come from.

use m3u8_rs::{MasterPlaylist, MediaPlaylist, Playlist, VariantStream};
use tracing::debug;
use url::Url;

use crate::client::MediaClient;
use crate::error::VodError;

/// A media playlist together with its effective location.
///
/// The location is the final response URL, not the requested one: manifests
/// can live behind redirects, and segment references resolve against where
/// the document actually came from.
#[derive(Debug)]
pub struct ResolvedManifest {
    pub playlist: MediaPlaylist,
    pub url: Url,
}

/// Resolves `manifest_url` to the media playlist to download.
///
/// A master playlist is narrowed to its highest-bandwidth variant and the
/// variant's playlist is fetched with the same credentials; a media playlist
/// is returned as-is. Non-success statuses and unparsable bodies are errors.
pub async fn resolve_media_playlist(
    client: &MediaClient,
    manifest_url: &str,
) -> Result<ResolvedManifest, VodError> {
    let url = Url::parse(manifest_url)
        .map_err(|e| VodError::invalid_url(manifest_url, e.to_string()))?;

    let (playlist, final_url) = fetch_playlist(client, &url, "manifest fetch").await?;
    match playlist {
        Playlist::MediaPlaylist(playlist) => Ok(ResolvedManifest {
            playlist,
            url: final_url,
        }),
        Playlist::MasterPlaylist(master) => {
            let variant = select_variant(&master)?;
            debug!(
                bandwidth = variant.bandwidth,
                uri = %variant.uri,
                "selected highest-bandwidth variant"
            );

            let media_url = join_parent_collection(&final_url, &variant.uri)?;
            let (playlist, final_url) =
                fetch_playlist(client, &media_url, "media manifest fetch").await?;
            match playlist {
                Playlist::MediaPlaylist(playlist) => Ok(ResolvedManifest {
                    playlist,
                    url: final_url,
                }),
                Playlist::MasterPlaylist(_) => Err(VodError::playlist(format!(
                    "expected a media playlist at {final_url}, got another master"
                ))),
            }
        }
    }
}

async fn fetch_playlist(
    client: &MediaClient,
    url: &Url,
    operation: &'static str,
) -> Result<(Playlist, Url), VodError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(VodError::http_status(
            status,
            response.url().as_str(),
            operation,
        ));
    }

    let final_url = response.url().clone();
    let body = response.bytes().await?;
    let playlist = m3u8_rs::parse_playlist_res(&body)
        .map_err(|e| VodError::playlist(format!("failed to parse playlist {final_url}: {e}")))?;

    Ok((playlist, final_url))
}

/// Picks the variant with the strictly highest declared bandwidth.
///
/// Ties keep the earliest entry, and a master whose variants all declare zero
/// bandwidth falls back to the first one. A master with no variants at all
/// cannot be resolved and is an error.
fn select_variant(master: &MasterPlaylist) -> Result<&VariantStream, VodError> {
    let mut variants = master.variants.iter();
    let mut best = variants
        .next()
        .ok_or_else(|| VodError::playlist("master playlist has no variants"))?;

    for variant in variants {
        if variant.bandwidth > best.bandwidth {
            best = variant;
        }
    }
    Ok(best)
}

/// Joins `relative` against the collection two levels above the manifest
/// document.
///
/// Variant and segment URIs in these manifests are rooted at the grandparent
/// of the document rather than its own directory: for a manifest at
/// `https://host/a/b/c/master.m3u8`, `v/playlist.m3u8` resolves to
/// `https://host/a/v/playlist.m3u8`. Absolute references pass through
/// untouched. A manifest URL with fewer than two directory levels above the
/// document cannot anchor such a reference and is rejected.
pub fn join_parent_collection(manifest_url: &Url, relative: &str) -> Result<Url, VodError> {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return Url::parse(relative).map_err(|e| VodError::invalid_url(relative, e.to_string()));
    }

    let mut segments: Vec<&str> = manifest_url
        .path_segments()
        .map(|segments| segments.collect())
        .ok_or_else(|| VodError::invalid_url(manifest_url.as_str(), "cannot be a base"))?;

    // The last segment is the manifest document itself.
    segments.pop();
    if segments.len() < 2 {
        return Err(VodError::playlist(format!(
            "cannot resolve `{relative}`: `{manifest_url}` has fewer than two path levels above the manifest"
        )));
    }
    segments.truncate(segments.len() - 2);

    let mut parent = manifest_url.clone();
    parent.set_query(None);
    parent.set_fragment(None);

    let mut path = String::new();
    for segment in &segments {
        path.push('/');
        path.push_str(segment);
    }
    path.push('/');
    parent.set_path(&path);

    parent
        .join(relative)
        .map_err(|e| VodError::invalid_url(relative, e.to_string()))
}
