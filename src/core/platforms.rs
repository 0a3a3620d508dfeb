//! Platform name to profile URL templates, used only to print human-facing
//! profile links next to probe results.

use crate::config::storage::atomic_write;
use crate::core::catalog_store::to_pretty_json;
use crate::utils::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder for the username in profile URL templates.
pub const PROFILE_PLACEHOLDER: &str = "{}";

const DEFAULT_PLATFORMS: &[(&str, &str)] = &[
    ("Bandcamp", "https://bandcamp.com/{}"),
    ("Chess.com", "https://www.chess.com/member/{}"),
    ("Codeforces", "https://codeforces.com/profile/{}"),
    ("DeviantArt", "https://www.deviantart.com/{}"),
    ("Disqus", "https://disqus.com/by/{}/"),
    ("DockerHub", "https://hub.docker.com/u/{}"),
    ("Eyeem", "https://www.eyeem.com/u/{}"),
    ("GitHub", "https://github.com/{}"),
    ("GitLab", "https://gitlab.com/{}"),
    ("Hacker News", "https://news.ycombinator.com/user?id={}"),
    ("Hackerearth", "https://www.hackerearth.com/@{}"),
    ("Imgur", "https://imgur.com/user/{}"),
    ("Instructables", "https://www.instructables.com/member/{}"),
    ("Keybase", "https://keybase.io/{}"),
    ("Livejournal", "https://{}.livejournal.com"),
    ("Patreon", "https://www.patreon.com/{}"),
    ("Reddit", "https://www.reddit.com/user/{}"),
    ("SoundCloud", "https://soundcloud.com/{}"),
    ("Spotify", "https://open.spotify.com/user/{}"),
    ("Steam", "https://steamcommunity.com/user/{}"),
    ("Telegram", "https://t.me/{}"),
    ("TikTok", "https://www.tiktok.com/@{}"),
    ("Tumblr", "https://{}.tumblr.com"),
    ("Trello", "https://trello.com/u/{}"),
    ("Twitch", "https://www.twitch.tv/{}"),
    ("Twitter", "https://twitter.com/{}"),
    ("Vimeo", "https://vimeo.com/{}"),
    ("YouTube", "https://www.youtube.com/{}"),
    ("About.me", "https://about.me/{}"),
    ("Academia.edu", "https://independent.academia.edu/{}"),
    ("AngelList", "https://angel.co/{}"),
    ("Behance", "https://www.behance.net/{}"),
    ("Bitbucket", "https://bitbucket.org/{}"),
    ("Blogger", "https://{}.blogspot.com"),
    ("Codepen", "https://codepen.io/{}"),
    ("Dribbble", "https://dribbble.com/{}"),
    ("Etsy", "https://www.etsy.com/shop/{}"),
    ("Facebook", "https://www.facebook.com/{}"),
    ("Flickr", "https://www.flickr.com/people/{}"),
    ("Freelancer", "https://www.freelancer.com/u/{}"),
    ("Goodreads", "https://www.goodreads.com/user/show/{}"),
    ("Instagram", "https://www.instagram.com/{}"),
    ("Last.fm", "https://www.last.fm/user/{}"),
    ("LinkedIn", "https://www.linkedin.com/in/{}"),
    ("Medium", "https://medium.com/@{}"),
    ("Pinterest", "https://www.pinterest.com/{}"),
    ("Product Hunt", "https://www.producthunt.com/@{}"),
    ("Quora", "https://www.quora.com/profile/{}"),
    ("ResearchGate", "https://www.researchgate.net/profile/{}"),
    ("Snapchat", "https://www.snapchat.com/add/{}"),
    ("TripAdvisor", "https://www.tripadvisor.com/members/{}"),
    ("VK", "https://vk.com/{}"),
    ("Wikipedia", "https://en.wikipedia.org/wiki/User:{}"),
    ("Duolingo", "https://www.duolingo.com/profile/{}"),
    ("smule", "https://www.smule.com/{}"),
    ("TryHackMe", "https://tryhackme.com/p/{}"),
    ("Hackerrank", "https://www.hackerrank.com/{}"),
    ("lichess.org", "https://lichess.org/@/{}"),
];

const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "social",
        &[
            "Facebook", "Twitter", "Instagram", "LinkedIn", "Pinterest", "Snapchat", "TikTok",
            "Reddit", "Tumblr", "VK",
        ],
    ),
    (
        "professional",
        &[
            "LinkedIn", "GitHub", "GitLab", "Bitbucket", "DockerHub", "Behance", "Dribbble",
            "Freelancer", "AngelList", "Product Hunt",
        ],
    ),
    (
        "creative",
        &[
            "DeviantArt", "Behance", "Dribbble", "SoundCloud", "Bandcamp", "YouTube", "Vimeo",
            "Flickr", "Etsy", "Medium",
        ],
    ),
    (
        "gaming",
        &["Steam", "Twitch", "Chess.com", "lichess.org", "TryHackMe"],
    ),
    (
        "tech",
        &[
            "GitHub", "GitLab", "Bitbucket", "DockerHub", "Codeforces", "Hackerrank",
            "Hackerearth", "Hacker News", "Codepen",
        ],
    ),
    (
        "education",
        &["Academia.edu", "ResearchGate", "Duolingo", "Quora"],
    ),
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformDirectory {
    #[serde(default)]
    platforms: BTreeMap<String, String>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
}

impl PlatformDirectory {
    pub fn with_defaults() -> Self {
        let platforms = DEFAULT_PLATFORMS
            .iter()
            .map(|(name, template)| (name.to_string(), template.to_string()))
            .collect();
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(category, names)| {
                (
                    category.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();
        Self {
            platforms,
            categories,
        }
    }

    /// Reads the map at `path`.
    ///
    /// A missing file is created from the built-in table. An unreadable or
    /// malformed file falls back to the built-in table without touching disk.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            let directory = Self::with_defaults();
            if let Err(e) = directory.save(path) {
                tracing::warn!(
                    "⚠️ Could not write default platform URLs to {}: {}",
                    path.display(),
                    e
                );
            }
            return directory;
        }

        match Self::read(path) {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("❌ Error loading platform URLs: {}", e);
                Self::with_defaults()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        serde_json::from_slice(&content).map_err(|e| ProbeError::parse("platform URL map", e))
    }

    /// Writes the map atomically, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = to_pretty_json(self)?;

        atomic_write(path, &data)?;
        Ok(())
    }

    /// Profile link for `username` on `platform`, if the platform is known.
    pub fn profile_url(&self, platform: &str, username: &str) -> Option<String> {
        self.platforms
            .get(platform)
            .map(|template| template.replacen(PROFILE_PLACEHOLDER, username, 1))
    }

    /// Like [`profile_url`](Self::profile_url), but always yields something
    /// printable.
    pub fn profile_url_or(&self, platform: &str, username: &str, fallback: Option<&str>) -> String {
        match (self.profile_url(platform, username), fallback) {
            (Some(url), _) => url,
            (None, Some(fallback)) => fallback.to_string(),
            (None, None) => format!("Unknown platform: {}", platform),
        }
    }

    pub fn add_platform(&mut self, name: &str, template: &str, categories: &[&str]) {
        self.platforms.insert(name.to_string(), template.to_string());

        for category in categories {
            let members = self.categories.entry(category.to_string()).or_default();
            if !members.iter().any(|m| m == name) {
                members.push(name.to_string());
            }
        }
    }

    /// Removes `name` from the map and from every category.
    pub fn remove_platform(&mut self, name: &str) -> bool {
        if self.platforms.remove(name).is_none() {
            return false;
        }
        for members in self.categories.values_mut() {
            members.retain(|m| m != name);
        }
        true
    }

    pub fn platforms_by_category(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn platforms(&self) -> &BTreeMap<String, String> {
        &self.platforms
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }
}
