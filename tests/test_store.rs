use serde_json::Value;

use wave_shooter::entities::{Difficulty, HighScoreEntry, LifetimeStats, Preferences};
use wave_shooter::ledger::Ledger;
use wave_shooter::store::*;

fn sample_record() -> PersistedRecord {
    let mut ledger = Ledger::new();
    let _ = ledger.record("ace", 420, 5, 1_000).unwrap();
    let _ = ledger.record("bee", 90, 2, 2_000).unwrap();
    PersistedRecord::from_parts(
        &ledger,
        LifetimeStats {
            games_played: 12,
            enemies_defeated: 340,
            best_wave: 6,
        },
        Preferences {
            sound_enabled: false,
            effects_enabled: true,
            difficulty: Difficulty::Hard,
        },
    )
}

#[test]
fn defaults_when_nothing_saved() {
    let record = MemoryStore::new().load();
    assert_eq!(record, PersistedRecord::default());
    assert!(record.high_scores.is_empty());
    assert!(record.sound_enabled);
    assert!(record.effects_enabled);
    assert_eq!(record.difficulty, Difficulty::Normal);
}

#[test]
fn memory_store_round_trip() {
    let mut store = MemoryStore::new();
    let record = sample_record();
    store.save(&record).unwrap();
    assert_eq!(store.load(), record);
}

#[test]
fn record_uses_camel_case_keys_only() {
    let json: Value = serde_json::from_str(&sample_record().to_json().unwrap()).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "bestWave",
            "difficulty",
            "effectsEnabled",
            "highScores",
            "soundEnabled",
            "totalEnemiesDefeated",
            "totalGamesPlayed",
        ]
    );
    assert_eq!(json["difficulty"], "hard");
    assert_eq!(json["highScores"][0]["score"], 420);
}

#[test]
fn malformed_fields_fall_back_individually() {
    let text = r#"{
        "highScores": [
            {"name": "ACE", "score": 5, "wave": 1, "timestamp": 0},
            {"bogus": true},
            {"name": "TOP", "score": 50, "wave": 3, "timestamp": 9}
        ],
        "totalGamesPlayed": "many",
        "totalEnemiesDefeated": 77,
        "bestWave": 7,
        "soundEnabled": false,
        "effectsEnabled": null,
        "difficulty": "nightmare"
    }"#;
    let record = PersistedRecord::from_json(text);
    assert_eq!(record.high_scores.len(), 2);
    assert_eq!(record.total_games_played, 0);
    assert_eq!(record.total_enemies_defeated, 77);
    assert_eq!(record.best_wave, 7);
    assert!(!record.sound_enabled);
    assert!(record.effects_enabled);
    assert_eq!(record.difficulty, Difficulty::Normal);

    // ledger view restores ordering
    let ledger = record.ledger();
    assert_eq!(ledger.entries()[0].name, "TOP");
}

#[test]
fn garbage_and_wrong_shapes_give_defaults() {
    assert_eq!(PersistedRecord::from_json("not json {"), PersistedRecord::default());
    assert_eq!(PersistedRecord::from_json("[1, 2, 3]"), PersistedRecord::default());
    assert_eq!(
        PersistedRecord::from_json(r#"{"highScores": "nope"}"#),
        PersistedRecord::default()
    );
}

#[test]
fn seeded_memory_store_decodes_contents() {
    let store = MemoryStore::with_contents(r#"{"bestWave": 4, "difficulty": "insane"}"#);
    let record = store.load();
    assert_eq!(record.best_wave, 4);
    assert_eq!(record.difficulty, Difficulty::Insane);
    assert_eq!(record.total_games_played, 0);
}

#[test]
fn clones_share_the_slot() {
    let store = MemoryStore::new();
    let mut writer = store.clone();
    writer.save(&sample_record()).unwrap();
    assert!(store.contents().unwrap().contains("\"ACE\""));
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("nested").join("save.json"));
    assert_eq!(store.load(), PersistedRecord::default());

    let record = sample_record();
    store.save(&record).unwrap();
    assert_eq!(store.load(), record);

    // last write wins
    let mut updated = record.clone();
    updated.best_wave = 9;
    store.save(&updated).unwrap();
    assert_eq!(store.load().best_wave, 9);
}

#[test]
fn file_store_tolerates_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    std::fs::write(&path, "{\"bestWave\": 3, \"soundEnabled\": ").unwrap();
    let store = JsonFileStore::new(&path);
    assert_eq!(store.load(), PersistedRecord::default());
}

#[test]
fn entry_shape_matches_save_format() {
    let entry: HighScoreEntry =
        serde_json::from_str(r#"{"name":"ZED","score":1,"wave":2,"timestamp":3}"#).unwrap();
    assert_eq!(entry.wave, 2);
}

#[test]
fn loaded_names_are_normalized() {
    let store = MemoryStore::with_contents(
        r#"{"highScores": [
            {"name": "zed the great", "score": 9, "wave": 1, "timestamp": 0},
            {"name": "", "score": 5, "wave": 1, "timestamp": 0}
        ]}"#,
    );
    let ledger = store.load().ledger();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries()[0].name, "ZED THE GR");
}
