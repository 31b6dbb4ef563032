//! Sprite, portrait and audio loading for PMD SpriteCollab style assets.

use crate::audio::{MUSIC_TRACKS, SFX_KEYS};
use crate::data::{AttackType, CompanionKind, EnemyKind, Species, Starter, LEGION};
use crate::placeholder::Placeholder;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Animations every unit sprite sheet provides.
pub const BASE_ANIMS: [&str; 4] = ["Idle", "Walk", "Hurt", "Faint"];

/// Size of a generated placeholder image.
pub const PLACEHOLDER_SIZE: u32 = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimMeta {
    pub name: &'static str,
    pub frames: u8,
}

/// Frame layout of one species' sprite sheets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteMeta {
    pub species: Species,
    pub frame_width: u16,
    pub frame_height: u16,
    pub anims: Vec<AnimMeta>,
}

impl SpriteMeta {
    pub fn frames(&self, anim: &str) -> Option<u8> {
        self.anims.iter().find(|a| a.name == anim).map(|a| a.frames)
    }
}

pub fn sprite_meta(species: Species) -> SpriteMeta {
    let (frame_width, frame_height) = match species.dex {
        // Large bodies
        95 => (64, 72),
        143 => (56, 56),
        6 | 9 | 3 | 68 => (48, 56),
        2 | 5 | 8 | 26 | 67 => (40, 48),
        _ => (32, 40),
    };
    let mut anims = vec![
        AnimMeta { name: "Idle", frames: 4 },
        AnimMeta { name: "Walk", frames: 4 },
        AnimMeta { name: "Hurt", frames: 2 },
        AnimMeta { name: "Faint", frames: 3 },
    ];
    for attack in AttackType::ALL {
        let anim = attack.anim();
        if anims.iter().all(|a| a.name != anim.name) {
            anims.push(AnimMeta {
                name: anim.name,
                frames: anim.frames,
            });
        }
    }
    SpriteMeta {
        species,
        frame_width,
        frame_height,
        anims,
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub sprite_base_url: String,
    pub portrait_base_url: String,
    /// Plain paths are read from disk.
    pub audio_base_url: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sprite_base_url: "https://raw.githubusercontent.com/PMDCollab/SpriteCollab/master/sprite"
                .to_string(),
            portrait_base_url:
                "https://raw.githubusercontent.com/PMDCollab/SpriteCollab/master/portrait"
                    .to_string(),
            audio_base_url: "assets/audio".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Sprite { dex: u16, anim: &'static str },
    AnimData { dex: u16 },
    Portrait { dex: u16 },
    Sound,
    Music,
}

impl AssetKind {
    pub fn is_image(&self) -> bool {
        matches!(self, AssetKind::Sprite { .. } | AssetKind::Portrait { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRequest {
    pub key: String,
    pub kind: AssetKind,
    pub url: String,
}

#[derive(Clone, Debug, Default)]
pub struct AssetManifest {
    pub requests: Vec<AssetRequest>,
}

impl AssetManifest {
    /// Everything a run with `starter` needs: the starter's evolution line,
    /// every enemy, companion and legion species, sound effects and music.
    pub fn for_roster(config: &AssetConfig, starter: Starter) -> Self {
        let mut species: Vec<Species> = starter.line().to_vec();
        species.extend(EnemyKind::ALL.iter().map(|k| k.stats().species));
        species.extend(CompanionKind::ALL.iter().map(|k| k.species()));
        species.push(LEGION.species);

        let mut manifest = Self::default();
        let mut seen = HashSet::new();
        for s in species {
            if !seen.insert(s.dex) {
                continue;
            }
            manifest.add_species(config, s);
        }
        // Portraits for the lobby.
        for starter in Starter::ALL {
            for s in starter.line() {
                let key = format!("portrait/{:04}", s.dex);
                if manifest.requests.iter().any(|r| r.key == key) {
                    continue;
                }
                manifest.requests.push(AssetRequest {
                    key,
                    kind: AssetKind::Portrait { dex: s.dex },
                    url: format!("{}/{:04}/Normal.png", config.portrait_base_url, s.dex),
                });
            }
        }
        for key in SFX_KEYS {
            manifest.requests.push(AssetRequest {
                key: format!("sfx/{}", key),
                kind: AssetKind::Sound,
                url: format!("{}/{}.ogg", config.audio_base_url, key),
            });
        }
        for track in MUSIC_TRACKS {
            manifest.requests.push(AssetRequest {
                key: format!("music/{}", track),
                kind: AssetKind::Music,
                url: format!("{}/{}.ogg", config.audio_base_url, track),
            });
        }
        manifest
    }

    fn add_species(&mut self, config: &AssetConfig, species: Species) {
        let dex = species.dex;
        self.requests.push(AssetRequest {
            key: format!("sprite/{:04}/AnimData", dex),
            kind: AssetKind::AnimData { dex },
            url: format!("{}/{:04}/AnimData.xml", config.sprite_base_url, dex),
        });
        for anim in sprite_meta(species).anims {
            self.requests.push(AssetRequest {
                key: format!("sprite/{:04}/{}", dex, anim.name),
                kind: AssetKind::Sprite {
                    dex,
                    anim: anim.name,
                },
                url: format!("{}/{:04}/{}-Anim.png", config.sprite_base_url, dex, anim.name),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[derive(Debug)]
pub enum FetchError {
    Status { url: String, status: u16 },
    Transport(String),
    Io(std::io::Error),
    Offline,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { url, status } => write!(f, "{} returned HTTP {}", url, status),
            FetchError::Transport(e) => write!(f, "request failed: {}", e),
            FetchError::Io(e) => write!(f, "read failed: {}", e),
            FetchError::Offline => write!(f, "network access disabled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP(S) fetches; anything that is not a URL is read from disk.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return std::fs::read(url).map_err(FetchError::Io);
        }
        let response =
            ehttp::fetch_blocking(&ehttp::Request::get(url)).map_err(FetchError::Transport)?;
        if !response.ok {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.bytes)
    }
}

/// Fails every request, so every image becomes a placeholder.
#[derive(Clone, Debug, Default)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Offline)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadedAsset {
    Bytes(Vec<u8>),
    /// RGBA pixels, `PLACEHOLDER_SIZE` square.
    Placeholder { placeholder: Placeholder, pixels: Vec<u8> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub done: usize,
    pub total: usize,
}

impl LoadProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f32 / self.total as f32
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Images replaced by generated art.
    pub placeholders: Vec<String>,
    /// Non-image assets that could not be loaded (played as silence).
    pub missing: Vec<String>,
}

pub struct AssetLoader<F: Fetcher> {
    fetcher: F,
    cache: BTreeMap<String, LoadedAsset>,
}

impl<F: Fetcher> AssetLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&LoadedAsset> {
        self.cache.get(key)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Fetch every request not already cached. Failed images get a
    /// placeholder, failed audio is reported as missing.
    pub fn load(
        &mut self,
        manifest: &AssetManifest,
        mut on_progress: impl FnMut(&LoadProgress),
    ) -> LoadReport {
        let mut report = LoadReport::default();
        let total = manifest.len();

        for (i, request) in manifest.requests.iter().enumerate() {
            if self.cache.contains_key(&request.key) {
                report.loaded += 1;
            } else {
                match self.fetcher.fetch(&request.url) {
                    Ok(bytes) => {
                        self.cache
                            .insert(request.key.clone(), LoadedAsset::Bytes(bytes));
                        report.loaded += 1;
                    }
                    Err(e) if request.kind.is_image() => {
                        tracing::debug!(key = %request.key, error = %e, "using placeholder");
                        let placeholder = Placeholder::for_key(&request.key);
                        let pixels = placeholder.rasterize(PLACEHOLDER_SIZE);
                        self.cache.insert(
                            request.key.clone(),
                            LoadedAsset::Placeholder { placeholder, pixels },
                        );
                        report.placeholders.push(request.key.clone());
                    }
                    Err(e) => {
                        tracing::debug!(key = %request.key, error = %e, "asset missing");
                        report.missing.push(request.key.clone());
                    }
                }
            }
            on_progress(&LoadProgress { done: i + 1, total });
        }

        if !report.placeholders.is_empty() || !report.missing.is_empty() {
            tracing::warn!(
                loaded = report.loaded,
                placeholders = report.placeholders.len(),
                missing = report.missing.len(),
                "some assets failed to load"
            );
        } else {
            tracing::info!(loaded = report.loaded, "assets loaded");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves fixed bytes for URLs containing `ok`, fails the rest.
    struct FakeFetcher {
        calls: RefCell<usize>,
    }

    impl Fetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            *self.calls.borrow_mut() += 1;
            if url.contains("/0004/") {
                Ok(vec![1, 2, 3])
            } else {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        }
    }

    #[test]
    fn sprite_meta_covers_attack_anims() {
        let meta = sprite_meta(Species::CHARMANDER);
        assert_eq!(meta.frames("Walk"), Some(4));
        assert_eq!(meta.frames("Attack"), Some(10));
        assert_eq!(meta.frames("Strike"), Some(6));
        assert_eq!(meta.frames("Dance"), None);
        assert_eq!(sprite_meta(Species::ONIX).frame_width, 64);
    }

    #[test]
    fn manifest_uses_spritecollab_layout() {
        let config = AssetConfig::default();
        let manifest = AssetManifest::for_roster(&config, Starter::Squirtle);
        let walk = manifest
            .requests
            .iter()
            .find(|r| r.key == "sprite/0007/Walk")
            .map(|r| r.url.clone());
        assert_eq!(
            walk.as_deref(),
            Some("https://raw.githubusercontent.com/PMDCollab/SpriteCollab/master/sprite/0007/Walk-Anim.png")
        );
        assert!(manifest
            .requests
            .iter()
            .any(|r| r.url.ends_with("/0172/Normal.png")));
        assert!(manifest.requests.iter().any(|r| r.key == "sprite/0081/AnimData"));
        let keys: HashSet<_> = manifest.requests.iter().map(|r| &r.key).collect();
        assert_eq!(keys.len(), manifest.len());
    }

    #[test]
    fn failures_fall_back_to_placeholders() {
        let config = AssetConfig::default();
        let manifest = AssetManifest::for_roster(&config, Starter::Charmander);
        let mut loader = AssetLoader::new(FakeFetcher {
            calls: RefCell::new(0),
        });
        let mut last = None;
        let report = loader.load(&manifest, |p| last = Some(p.clone()));

        assert_eq!(last.map(|p| p.fraction()), Some(1.0));
        assert!(matches!(loader.get("sprite/0004/Idle"), Some(LoadedAsset::Bytes(_))));
        assert!(matches!(
            loader.get("sprite/0019/Idle"),
            Some(LoadedAsset::Placeholder { .. })
        ));
        assert!(report.missing.contains(&"sfx/gem".to_string()));
        assert!(loader.get("sfx/gem").is_none());
        assert_eq!(
            report.loaded + report.placeholders.len() + report.missing.len(),
            manifest.len()
        );

        // Cached entries are not fetched again.
        let calls = *loader.fetcher.calls.borrow();
        loader.load(&manifest, |_| {});
        assert_eq!(*loader.fetcher.calls.borrow(), calls + report.missing.len());
    }
}
