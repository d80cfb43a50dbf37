use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ApiSettings, LibrarySettings};

use super::local::scan;
use super::model::{Playlist, PlaylistTracks};

/// Errors produced while retrieving playlist data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no access token configured (set api.access_token or PLAYDECK__API__ACCESS_TOKEN)")]
    MissingToken,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed playlist data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a playlist reference: {0}")]
    InvalidReference(String),
}

/// Where a playlist comes from, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistRef {
    Spotify(String),
    JsonFile(PathBuf),
    LocalDir(PathBuf),
}

fn is_spotify_id(s: &str) -> bool {
    s.len() == 22 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl PlaylistRef {
    /// Accepts a directory, a `.json` export, a `spotify:playlist:<id>` URI,
    /// an `open.spotify.com/playlist/<id>` link or a bare playlist id.
    pub fn parse(arg: &str) -> Result<Self, CatalogError> {
        let arg = arg.trim();
        let path = Path::new(arg);
        if path.is_dir() {
            return Ok(Self::LocalDir(path.to_path_buf()));
        }
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json && path.is_file() {
            return Ok(Self::JsonFile(path.to_path_buf()));
        }

        if let Some(id) = arg.strip_prefix("spotify:playlist:") {
            if is_spotify_id(id) {
                return Ok(Self::Spotify(id.to_string()));
            }
        }

        if let Ok(url) = Url::parse(arg) {
            if url.host_str() == Some("open.spotify.com") {
                let mut segments = url.path_segments().into_iter().flatten();
                // Localized links look like /intl-de/playlist/<id>.
                if segments.by_ref().any(|s| s == "playlist") {
                    if let Some(id) = segments.next().filter(|id| is_spotify_id(id)) {
                        return Ok(Self::Spotify(id.to_string()));
                    }
                }
            }
        }

        if is_spotify_id(arg) {
            return Ok(Self::Spotify(arg.to_string()));
        }

        Err(CatalogError::InvalidReference(arg.to_string()))
    }

    /// Short text for the status line while loading.
    pub fn label(&self) -> String {
        match self {
            Self::Spotify(id) => format!("spotify:playlist:{id}"),
            Self::JsonFile(p) | Self::LocalDir(p) => p.display().to_string(),
        }
    }
}

/// Anything that can produce a playlist. Loading may block; callers run it
/// off the UI thread.
pub trait PlaylistSource: Send {
    fn load(&self) -> Result<Playlist, CatalogError>;
}

/// Spotify-shaped playlist JSON stored on disk.
pub struct JsonFile {
    pub path: PathBuf,
}

impl PlaylistSource for JsonFile {
    fn load(&self) -> Result<Playlist, CatalogError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub struct LocalDir {
    pub path: PathBuf,
    pub settings: LibrarySettings,
}

impl PlaylistSource for LocalDir {
    fn load(&self) -> Result<Playlist, CatalogError> {
        if !self.path.is_dir() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.path.display()),
            )));
        }
        Ok(scan(&self.path, &self.settings))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Playlist lookup against the Spotify Web API with a pre-obtained token.
pub struct SpotifyApi {
    client: Client,
    base_url: String,
    token: String,
    market: Option<String>,
    playlist_id: String,
}

impl SpotifyApi {
    pub fn new(
        playlist_id: impl Into<String>,
        settings: &ApiSettings,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let token = settings
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CatalogError::MissingToken)?
            .to_string();
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token,
            market: settings.market.clone(),
            playlist_id: playlist_id.into(),
        })
    }

    pub fn playlist_url(&self) -> String {
        let mut url = format!("{}/playlists/{}", self.base_url, self.playlist_id);
        if let Some(market) = self.market.as_deref().filter(|m| !m.is_empty()) {
            url.push_str("?market=");
            url.push_str(market);
        }
        url
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self.client.get(url).bearer_auth(&self.token).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl PlaylistSource for SpotifyApi {
    fn load(&self) -> Result<Playlist, CatalogError> {
        let url = self.playlist_url();
        tracing::info!(%url, "fetching playlist");
        let mut playlist: Playlist = self.get(&url)?;

        // Follow item pages so the whole playlist is navigable.
        while let Some(next) = playlist.tracks.next.take() {
            tracing::debug!(%next, "fetching next playlist page");
            let page: PlaylistTracks = self.get(&next)?;
            playlist.tracks.items.extend(page.items);
            playlist.tracks.next = page.next;
        }

        Ok(playlist)
    }
}

/// Pick the source implementation for `reference`.
pub fn source_for(
    reference: &PlaylistRef,
    api: &ApiSettings,
    library: &LibrarySettings,
    timeout: Duration,
) -> Result<Box<dyn PlaylistSource>, CatalogError> {
    Ok(match reference {
        PlaylistRef::Spotify(id) => Box::new(SpotifyApi::new(id.clone(), api, timeout)?),
        PlaylistRef::JsonFile(path) => Box::new(JsonFile { path: path.clone() }),
        PlaylistRef::LocalDir(path) => Box::new(LocalDir {
            path: path.clone(),
            settings: library.clone(),
        }),
    })
}
