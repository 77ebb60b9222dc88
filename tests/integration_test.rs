// Integration tests for Region Sounds
// These tests drive the public API from files on disk, the way the binary does

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use region_sounds::config::{Settings, SOUNDS_FILE};
use region_sounds::geometry::{Location, WorldId};
use region_sounds::messaging::DispatchEvent;
use region_sounds::playback::{LoggingAudioHost, Subject};
use region_sounds::region::{AnyWorld, JsonRegionStore, KnownWorlds, RegionRegistry, RegionStore, SoundRegion};
use region_sounds::trigger::{Trigger, TriggerEvent, TriggerKind};
use region_sounds::SoundDispatcher;

fn at(x: f64, y: f64, z: f64) -> Location {
    Location::new(WorldId::new("world"), x, y, z)
}

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

/// One data folder whose sounds are all prefixed with `tag`.
fn write_sounds(dir: &Path, tag: &str) {
    write_json(
        &dir.join(SOUNDS_FILE),
        json!({
            "Player Swing": {
                "Enabled": true,
                "Sounds": {
                    "0": { "Sound": format!("{}_DEFAULT", tag) },
                    "1": { "Sound": format!("{}_DEFAULT_ECHO", tag), "Delay": 3 }
                }
            },
            "Join Server": {
                "Enabled": true,
                "Sounds": { "0": { "Sound": format!("{}_WELCOME", tag) } }
            }
        }),
    );
    write_json(
        &dir.join("items_swung.json"),
        json!({
            "DIAMOND_SWORD, IRON_SWORD": {
                "Enabled": true,
                "Sounds": {
                    "0": { "Sound": format!("{}_SWORD", tag) },
                    "1": { "Sound": format!("{}_SWORD_RING", tag), "Pitch": 2 }
                }
            },
            "*_AXE": {
                "Enabled": true,
                "Prevent Other Sounds": { "Default Sound": true },
                "Sounds": { "0": { "Sound": format!("{}_AXE", tag) } }
            }
        }),
    );
}

fn dispatcher() -> SoundDispatcher {
    SoundDispatcher::new(Arc::new(LoggingAudioHost::new()), Arc::new(RegionRegistry::new()))
}

fn swing(held: &str) -> TriggerEvent {
    TriggerEvent::new(
        Trigger::PlayerSwing {
            held: held.to_string(),
        },
        at(0.5, 64.0, 0.5),
    )
}

#[test]
fn test_full_flow_from_data_folder() {
    let dir = TempDir::new().unwrap();
    write_sounds(dir.path(), "A");

    let dispatcher = dispatcher();
    let report = dispatcher.reload(dir.path());
    assert!(report.is_clean(), "{:?}", report.failures);
    assert!(dispatcher.listeners().is_listening(TriggerKind::PlayerSwing));
    assert!(dispatcher.listeners().is_listening(TriggerKind::Join));
    assert!(!dispatcher.listeners().is_listening(TriggerKind::Chat));

    let outcome = dispatcher.dispatch(&swing("IRON_SWORD"));
    let names: Vec<&str> = outcome.resolved.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["A_SWORD", "A_SWORD_RING", "A_DEFAULT", "A_DEFAULT_ECHO"]);
    assert_eq!(outcome.played, 3);
    assert_eq!(outcome.scheduled, 1);

    let axe = dispatcher.dispatch(&swing("GOLDEN_AXE"));
    let names: Vec<&str> = axe.resolved.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["A_AXE"]);

    for _ in 0..3 {
        dispatcher.advance();
    }
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn test_reload_swaps_listeners_and_reports_bad_files() {
    let dir = TempDir::new().unwrap();
    write_sounds(dir.path(), "A");

    let dispatcher = dispatcher();
    let (events, _) = dispatcher.events().subscribe();
    dispatcher.reload(dir.path());

    write_json(
        &dir.path().join(SOUNDS_FILE),
        json!({ "Player Chat": { "Enabled": true, "Sounds": { "0": { "Sound": "PING" } } } }),
    );
    fs::write(dir.path().join("items_swung.json"), "{ not json").unwrap();

    let report = dispatcher.reload(dir.path());
    assert_eq!(report.failures.len(), 1);
    assert!(dispatcher.listeners().is_listening(TriggerKind::Chat));
    assert!(!dispatcher.listeners().is_listening(TriggerKind::PlayerSwing));
    assert_eq!(dispatcher.snapshot().generation(), 2);

    let reloads: Vec<u64> = events
        .try_iter()
        .filter_map(|e| match e {
            DispatchEvent::ConfigReloaded { generation, .. } => Some(generation),
            _ => None,
        })
        .collect();
    assert_eq!(reloads, vec![1, 2]);
}

#[test]
fn test_reload_during_resolution_never_mixes_generations() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_sounds(first.path(), "A");
    write_sounds(second.path(), "B");

    let dispatcher = Arc::new(dispatcher());
    dispatcher.reload(first.path());

    let done = Arc::new(AtomicBool::new(false));
    let reloader = {
        let dispatcher = Arc::clone(&dispatcher);
        let done = Arc::clone(&done);
        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        thread::spawn(move || {
            let mut i = 0;
            while !done.load(Ordering::Acquire) {
                dispatcher.reload(&dirs[i % 2]);
                i += 1;
            }
            i
        })
    };

    for _ in 0..500 {
        let outcome = dispatcher.dispatch(&swing("DIAMOND_SWORD"));
        assert_eq!(outcome.resolved.len(), 4);

        let tag = &outcome.resolved[0].as_str()[..2];
        assert!(
            outcome.resolved.iter().all(|s| s.as_str().starts_with(tag)),
            "mixed generations in {:?}",
            outcome.resolved
        );
    }

    done.store(true, Ordering::Release);
    assert!(reloader.join().unwrap() > 0);
}

#[test]
fn test_region_persistence_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonRegionStore::new(dir.path().join("regions"));

    let creator = Uuid::new_v4();
    let region = SoundRegion::new(
        "market",
        &at(10.0, 70.0, 5.0),
        &at(0.0, 60.0, -5.0),
        Some(creator),
        Some("Stalls and fountain".to_string()),
    )
    .unwrap();
    let id = region.id();

    let registry = RegionRegistry::new();
    registry.add(region).unwrap();
    assert!(registry.save(&store, id).unwrap());

    let reloaded = RegionRegistry::new();
    let report = reloaded.load_from(&store, &KnownWorlds(vec![WorldId::new("world")]));
    assert!(report.is_clean(), "{:?}", report.failures);

    let loaded = reloaded.get(id).unwrap();
    let original = registry.get(id).unwrap();
    assert!(loaded.is_similar(&original));
    assert_eq!(loaded.creator(), Some(creator));
    assert_eq!(loaded.description(), Some("Stalls and fountain"));
    assert_eq!(loaded.min_diagonal(), original.min_diagonal());
    assert_eq!(loaded.max_diagonal(), original.max_diagonal());
    assert!(loaded.contains(&at(5.5, 65.0, 0.0)));

    assert!(reloaded.delete(&store, id).unwrap().is_some());
    assert!(store.list_ids().unwrap().is_empty());
}

#[test]
fn test_record_without_world_is_not_loaded() {
    let dir = TempDir::new().unwrap();
    let regions = dir.path().join("regions");
    fs::create_dir_all(&regions).unwrap();

    let good = Uuid::new_v4();
    write_json(
        &regions.join(format!("{}.json", good)),
        json!({
            "Name": "spawn",
            "Creation Date": "2021-03-04T10:15:30-03:00",
            "World": "world",
            "Diagonals": { "First": { "X": 0, "Y": 0, "Z": 0 }, "Second": { "X": 4, "Y": 4, "Z": 4 } }
        }),
    );
    write_json(
        &regions.join(format!("{}.json", Uuid::new_v4())),
        json!({
            "Name": "lost",
            "Creation Date": "2021-03-04T10:15:30-03:00",
            "Diagonals": { "First": { "X": 0, "Y": 0, "Z": 0 }, "Second": { "X": 4, "Y": 4, "Z": 4 } }
        }),
    );

    let registry = RegionRegistry::new();
    let report = registry.load_from(&JsonRegionStore::new(&regions), &AnyWorld);

    assert_eq!(report.loaded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.get(good).is_some());
    assert!(registry.find_by_name("lost").is_none());
}

#[test]
fn test_region_sounds_follow_movement() {
    let dir = TempDir::new().unwrap();
    write_json(
        &dir.path().join(SOUNDS_FILE),
        json!({
            "Region Enter": { "Enabled": true, "Sounds": { "0": { "Sound": "ENTER_ANY" } } }
        }),
    );
    write_json(
        &dir.path().join("regions_entered.json"),
        json!({
            "SHOP": {
                "Enabled": true,
                "Prevent Other Sounds": { "Default Sound": true },
                "Sounds": { "0": { "Sound": "SHOP_BELL", "Options": { "Eye Location": true } } }
            }
        }),
    );

    let dispatcher = dispatcher();
    dispatcher.reload(dir.path());
    dispatcher
        .add_region(SoundRegion::new("shop", &at(0.0, 60.0, 0.0), &at(5.0, 70.0, 5.0), None, None).unwrap())
        .unwrap();
    dispatcher
        .add_region(SoundRegion::new("plaza", &at(-20.0, 60.0, -20.0), &at(20.0, 70.0, 20.0), None, None).unwrap())
        .unwrap();

    let subject = Subject::new(Uuid::new_v4(), at(2.0, 64.0, 2.0));
    let outcomes = dispatcher.handle_movement(&subject, &at(30.0, 64.0, 2.0), &at(2.0, 64.0, 2.0));

    let mut played: Vec<&str> = outcomes
        .iter()
        .flat_map(|o| o.resolved.iter().map(|s| s.as_str()))
        .collect();
    played.sort_unstable();
    assert_eq!(played, vec!["ENTER_ANY", "SHOP_BELL"]);
}

#[test]
fn test_settings_resolve_data_folder() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_from(dir.path()).unwrap();

    assert!(dir.path().join("config.json").exists());
    assert_eq!(settings.data_path(dir.path()), dir.path().join("data"));
    assert_eq!(settings.regions_path(dir.path()), dir.path().join("data").join("regions"));
}

#[test]
fn test_out_of_range_delay_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    write_json(
        &dir.path().join(SOUNDS_FILE),
        json!({
            "Join Server": {
                "Enabled": true,
                "Sounds": { "0": { "Sound": "LATER", "Delay": 1e20 } }
            }
        }),
    );

    let dispatcher = dispatcher();
    let report = dispatcher.reload(dir.path());
    assert_eq!(report.failures.len(), 1);
    assert!(!dispatcher.listeners().is_listening(TriggerKind::Join));

    dispatcher.advance();
    let outcome = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(0.0, 64.0, 0.0)));
    assert_eq!(outcome.scheduled, 0);
    assert_eq!(dispatcher.pending(), 0);
}
