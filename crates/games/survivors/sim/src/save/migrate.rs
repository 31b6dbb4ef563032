//! Upgrades older save layouts to the current one.
//!
//! Version 1 saves (also those written before versioning existed) look like
//! `{"gold": 120, "unlocked": ["Charmander"], "bestTime": 312.5,
//! "musicVolume": 0.4, "sfxVolume": 0.8}`.

use super::{SaveError, SAVE_VERSION};
use crate::data::Starter;
use serde_json::{json, Map, Value};

pub fn migrate(mut raw: Value) -> Result<Value, SaveError> {
    let version = raw.get("version").and_then(Value::as_u64).unwrap_or(1);
    if version > SAVE_VERSION as u64 {
        return Err(SaveError::UnsupportedVersion(version));
    }
    if version < 2 {
        raw = v1_to_v2(&raw);
        tracing::info!(from = version, to = 2, "migrated save data");
    }
    Ok(raw)
}

fn v1_to_v2(old: &Value) -> Value {
    let empty = Map::new();
    let obj = old.as_object().unwrap_or(&empty);
    let f64_field = |key: &str| obj.get(key).and_then(Value::as_f64);

    let mut unlocked: Vec<Starter> = obj
        .get("unlocked")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(Starter::from_name)
                .collect()
        })
        .unwrap_or_default();
    unlocked.extend(super::default_unlocked());
    unlocked.sort();
    unlocked.dedup();

    let selected = obj
        .get("selected")
        .and_then(Value::as_str)
        .and_then(Starter::from_name)
        .filter(|s| unlocked.contains(s))
        .unwrap_or(Starter::Charmander);

    json!({
        "version": 2,
        "coins": obj.get("gold").and_then(Value::as_u64).unwrap_or(0),
        "unlocked": unlocked,
        "selected": selected,
        "records": {
            "best_survival_secs": f64_field("bestTime").unwrap_or(0.0),
            "max_cycle": obj.get("maxWave").and_then(Value::as_u64).unwrap_or(0),
            "max_kills": obj.get("maxKills").and_then(Value::as_u64).unwrap_or(0),
            "max_level": 0,
        },
        "runs_played": obj.get("runs").and_then(Value::as_u64).unwrap_or(0),
        "settings": {
            "music_volume": f64_field("musicVolume").unwrap_or(0.6),
            "sfx_volume": f64_field("sfxVolume").unwrap_or(0.8),
            "muted": obj.get("muted").and_then(Value::as_bool).unwrap_or(false),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_fields_are_renamed() {
        let old = json!({
            "gold": 120,
            "unlocked": ["Charmander", "pichu", "Missingno"],
            "bestTime": 312.5,
            "musicVolume": 0.4,
            "sfxVolume": 0.9,
            "selected": "Pichu"
        });
        let new = migrate(old).unwrap();
        assert_eq!(new["version"], 2);
        assert_eq!(new["coins"], 120);
        assert_eq!(new["selected"], "Pichu");
        assert_eq!(new["records"]["best_survival_secs"], 312.5);
        assert_eq!(new["settings"]["music_volume"], 0.4);
        let unlocked = new["unlocked"].as_array().unwrap();
        assert_eq!(unlocked.len(), 4);
    }

    #[test]
    fn current_version_is_untouched() {
        let current = json!({"version": 2, "coins": 7});
        assert_eq!(migrate(current.clone()).unwrap(), current);
    }

    #[test]
    fn future_versions_are_rejected() {
        let err = migrate(json!({"version": 9})).unwrap_err();
        assert!(matches!(err, SaveError::UnsupportedVersion(9)));
    }

    #[test]
    fn garbage_migrates_to_defaults() {
        let new = migrate(json!("not an object")).unwrap();
        assert_eq!(new["coins"], 0);
        assert_eq!(new["selected"], "Charmander");
    }
}
