//! Test helpers for composing seed datasets on disk.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

/// A temporary directory holding a dataset and a database path.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) dataset: Utf8PathBuf,
    pub(super) database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            dataset: root.join("dataset.json"),
            database: root.join("db/community.db"),
            _dir: dir,
        }
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Four users and two groups. Dee blocks Ada, so Ada's matches are Bob (49)
/// then Cy (10), and the chess club is the only group Ada has not joined.
pub(super) fn community() -> Value {
    json!({
        "users": [
            {
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1",
                "age": 21,
                "interests": ["Chess", "Go", "Music"],
                "location": "Lyon",
                "userType": "student"
            },
            {
                "name": "Bob",
                "email": "bob@example.com",
                "password": "secret1",
                "age": 22,
                "interests": ["chess", "music"],
                "location": "lyon",
                "userType": "student"
            },
            {
                "name": "Cy",
                "email": "cy@example.com",
                "password": "secret1",
                "age": 40,
                "interests": ["Go"],
                "userType": "professional"
            },
            {
                "name": "Dee",
                "email": "dee@example.com",
                "password": "secret1",
                "interests": ["Chess"]
            }
        ],
        "groups": [
            {
                "name": "Chess club",
                "description": "Weekly blitz",
                "category": "other",
                "interests": ["Chess"],
                "creator": "bob@example.com",
                "members": ["bob@example.com", "cy@example.com"]
            },
            {
                "name": "Go circle",
                "description": "Stones and coffee",
                "category": "other",
                "interests": ["Go"],
                "creator": "ada@example.com",
                "members": ["CY@example.com"]
            }
        ],
        "blocks": [
            { "blocker": "dee@example.com", "blocked": "ada@example.com" }
        ]
    })
}

pub(super) fn write_dataset(path: &Utf8Path, dataset: &Value) {
    let payload = serde_json::to_string_pretty(dataset).expect("serialise dataset");
    write_utf8(path, payload.as_bytes());
}
