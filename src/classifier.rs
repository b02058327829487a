// Path classification for processed media files
// Everything here is pure string work: no I/O, never fails

use regex::Regex;
use std::sync::LazyLock;

const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

static RE_SEASON_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Season|Series)\s+[0-9]+$").unwrap());
static RE_SEASON_EP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S([0-9]{1,2})E([0-9]{1,3})").unwrap());
static RE_TVDB_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{tvdb-([0-9]+)\}").unwrap());
static RE_IMDB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btt[0-9]{7,10}\b").unwrap());
static RE_4K_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:2160p|uhd|4k)\b").unwrap());
static RE_4K_DELIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s._-](?:uhd|4k)[\s._-]").unwrap());
static RE_MEDIA_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:mkv|mp4|avi|ts|m4v)$").unwrap());
static RE_SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._]+").unwrap());

/// Season/episode pair parsed from an `SxxEyy` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl std::fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}E{}", self.season, self.episode)
    }
}

/// Facts derived from a media path, computed once per invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationFacts {
    pub is_television: bool,
    pub is_4k: bool,
    /// Present only when both numbers were found
    pub episode: Option<SeasonEpisode>,
    /// `{tvdb-N}` tag, only kept for TV paths
    pub embedded_catalog_id: Option<i64>,
    /// IMDB-style `tt` token from the filename
    pub embedded_external_id: Option<String>,
    pub series_title_guess: String,
    pub file_name: String,
}

impl ClassificationFacts {
    pub fn from_path(path: &str) -> Self {
        let is_television = is_television(path);

        Self {
            is_television,
            is_4k: is_4k(path),
            episode: season_episode(path),
            embedded_catalog_id: if is_television {
                embedded_catalog_id(path)
            } else {
                None
            },
            embedded_external_id: embedded_external_id(file_name(path)),
            series_title_guess: series_title_guess(path),
            file_name: file_name(path).to_string(),
        }
    }
}

/// Last path segment (empty for an empty path or a trailing separator)
pub fn file_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATORS).next().unwrap_or("")
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATORS)
        .filter(|segment| !segment.is_empty())
        .collect()
}

pub fn is_television(path: &str) -> bool {
    path_segments(path)
        .iter()
        .any(|segment| RE_SEASON_DIR.is_match(segment))
        || season_episode(path).is_some()
}

pub fn is_4k(path: &str) -> bool {
    let lower = path.to_lowercase();
    RE_4K_WORD.is_match(&lower) || RE_4K_DELIMITED.is_match(&lower)
}

/// Parse `SxxEyy` from the filename; season 0 (specials) is valid
pub fn season_episode(path: &str) -> Option<SeasonEpisode> {
    let caps = RE_SEASON_EP.captures(file_name(path))?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;

    Some(SeasonEpisode { season, episode })
}

pub fn embedded_catalog_id(path: &str) -> Option<i64> {
    RE_TVDB_TAG
        .captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn embedded_external_id(file_name: &str) -> Option<String> {
    RE_IMDB_ID
        .find(file_name)
        .map(|m| m.as_str().to_string())
}

/// Best-effort series title
/// Prefers the folder above a `Season N` folder, otherwise cleans the filename
pub fn series_title_guess(path: &str) -> String {
    let segments = path_segments(path);
    if let Some(pair) = segments
        .windows(2)
        .find(|pair| RE_SEASON_DIR.is_match(pair[1]))
    {
        return pair[0].to_string();
    }

    let base = RE_MEDIA_EXT.replace(file_name(path), "");
    let head = match RE_SEASON_EP.find(&base) {
        Some(m) if m.start() > 0 => &base[..m.start()],
        _ => &base[..],
    };

    RE_SEPARATOR_RUN.replace_all(head, " ").trim().to_string()
}
