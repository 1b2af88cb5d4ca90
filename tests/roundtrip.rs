use packsmith::commands::compile::compile_tree;
use packsmith::commands::extract::extract_store;
use packsmith::key::is_folder_key;
use packsmith::migrate::migrate;
use packsmith::model::{StatsStamp, Store};
use packsmith::store::blob;
use serde_json::{json, Value};
use std::path::Path;

fn stamp() -> StatsStamp {
    StatsStamp::new("12.343", "fantastic-depths")
}

fn store(value: Value) -> Store {
    value.as_object().cloned().unwrap()
}

/// What a store should look like after one pass through the converter.
fn migrated(original: &Store) -> Store {
    original
        .iter()
        .map(|(key, value)| {
            let value = match value.as_object() {
                Some(doc) if !is_folder_key(key) => {
                    Value::Object(migrate(key, doc.clone(), &stamp()))
                }
                _ => value.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn round_trip(original: &Store, root: &Path) -> Store {
    let tree = root.join("packsrc").join("pack");
    let blob_path = root.join("packs").join("pack.db");
    extract_store(original, &tree, &stamp()).unwrap();
    compile_tree(&tree, &blob_path, &stamp()).unwrap();
    blob::read_store(&blob_path).unwrap()
}

#[test]
fn test_actor_with_embedded_item_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let original = store(json!({
        "!actors!A1": {"name": "Bob", "system": {"hp": 12}, "_stats": {"coreVersion": "11.315"}},
        "!actors.items!A1.E1": {"name": "Sword", "system": {"damage": "1d8"}},
    }));

    let tree = dir.path().join("packsrc").join("pack");
    let report = extract_store(&original, &tree, &stamp()).unwrap();
    assert_eq!(report.files_written(), 1);
    let bob = blob::read_json(&tree.join("Bob.json")).unwrap();
    assert_eq!(bob["embedded"].as_array().unwrap().len(), 1);

    let compiled = round_trip(&original, dir.path());
    assert_eq!(compiled, migrated(&original));
    assert_eq!(compiled["!actors!A1"]["_stats"]["coreVersion"], "12.343");
}

#[test]
fn test_folders_tables_and_journals_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let original = store(json!({
        "!folders!f1": {"name": "Treasure & Loot", "folder": null, "type": "RollTable"},
        "!folders!f2": {"name": "Level 1/2", "folder": "f1", "type": "RollTable"},
        "!tables!T1": {"name": "Wandering Monsters", "folder": "f2", "formula": "1d6"},
        "!tables.results!T1.R1": {"type": "text", "description": "You flee", "name": null},
        "!tables.results!T1.R2": {"type": "document", "name": "Goblin", "documentUuid": "x"},
        "!journal!J1": {"name": "Intro", "folder": "missing"},
        "!journal.pages!J1.P1": {"name": "Page 1", "text": {"content": "<p>Hi</p>"}},
        "!macros!M1": {"name": "Roll (Secret)"},
    }));

    let compiled = round_trip(&original, dir.path());
    assert_eq!(compiled, migrated(&original));

    assert_eq!(compiled["!tables.results!T1.R1"]["name"], "You flee");
    assert_eq!(compiled["!tables.results!T1.R2"]["text"], "Goblin");
    assert!(compiled["!folders!f1"].get("_stats").is_none());
}

#[test]
fn test_second_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let original = store(json!({
        "!tables!T1": {"name": "Loot"},
        "!tables.results!T1.R1": {"type": "text", "description": "Gold", "name": null},
    }));

    let first = round_trip(&original, dir.path());
    let second = round_trip(&first, dir.path());
    assert_eq!(first, second);

    let blob_path = dir.path().join("packs").join("pack.db");
    let second_text = std::fs::read_to_string(&blob_path).unwrap();
    round_trip(&second, dir.path());
    let third_text = std::fs::read_to_string(&blob_path).unwrap();
    assert_eq!(second_text, third_text);
}

#[test]
fn test_dot_named_folders_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let original = store(json!({
        "!folders!up": {"name": "..", "folder": null},
        "!folders!here": {"name": ".", "folder": null},
        "!actors!A1": {"name": "Bob"},
        "!actors!A2": {"name": "Bob", "folder": "up"},
        "!actors!A3": {"name": "Bob", "folder": "here"},
    }));

    let compiled = round_trip(&original, dir.path());
    assert_eq!(compiled, migrated(&original));
    assert!(!dir.path().join("packsrc").join("Bob.json").exists());
}
