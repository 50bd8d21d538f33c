use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::Connection;
use tempfile::TempDir;
use zip::ZipArchive;

const NOTE_TYPES: &str = r#"{
    "vocab": {"name": "Vocabulary", "model_id": 1607392319, "default_deck": "French", "fields": ["front", "back"]},
    "phrase": {"name": "Phrase", "model_id": 1607392320, "default_deck": "Phrases", "fields": ["text", "meaning"]},
    "listen": {"name": "Listening", "model_id": 1607392321, "fields": ["word", "audio"]}
}"#;

const RECIPES: &str = r#"{
    "animals": {"deck_name": "Animals", "output": "out/animals.apkg", "query": "note_type:vocab tag:animals"}
}"#;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_deckforge"))
}

struct Library {
    dir: TempDir,
}

impl Library {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config");
        std::fs::create_dir_all(&config).expect("create config dir");
        std::fs::create_dir_all(dir.path().join("data").join("media")).expect("create media dir");
        std::fs::write(config.join("note_types.json"), NOTE_TYPES).expect("write note types");
        std::fs::write(config.join("recipes.json"), RECIPES).expect("write recipes");
        std::fs::create_dir_all(dir.path().join("xdg")).expect("create xdg dir");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn log_path(&self) -> PathBuf {
        self.root().join("data").join("library.jsonl")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.current_dir(self.root())
            .env_remove("DECKFORGE_ROOT")
            .env_remove("DECKFORGE_CONFIG")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.root().join("xdg"))
            .env("XDG_DATA_HOME", self.root().join("xdg"))
            .env("NO_COLOR", "1")
            .arg("--root")
            .arg(self.root());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run deckforge")
    }

    fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["--quiet", "add", "--no-input"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "add failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn list_json(&self, args: &[&str]) -> Vec<serde_json::Value> {
        let mut full = vec!["list", "--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "list failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("list json")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn deck_counts(apkg: &Path) -> Vec<(String, i64)> {
    let mut archive = ZipArchive::new(File::open(apkg).expect("open apkg")).expect("zip");
    let mut collection = Vec::new();
    archive
        .by_name("collection.anki2")
        .expect("collection entry")
        .read_to_end(&mut collection)
        .expect("read collection");
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("collection.anki2");
    std::fs::write(&db, collection).expect("write collection");
    let conn = Connection::open(&db).expect("open collection");

    let decks: String = conn
        .query_row("SELECT decks FROM col", [], |row| row.get(0))
        .expect("decks");
    let decks: serde_json::Value = serde_json::from_str(&decks).expect("decks json");

    let mut stmt = conn
        .prepare("SELECT did, COUNT(*) FROM cards GROUP BY did")
        .expect("prepare");
    let mut counts: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
        .expect("query")
        .map(|row| {
            let (did, count) = row.expect("row");
            let name = decks[did.to_string()]["name"]
                .as_str()
                .expect("deck name")
                .to_string();
            (name, count)
        })
        .collect();
    counts.sort();
    counts
}

#[test]
fn test_cli_add_list_show() {
    let lib = Library::new();
    let guid = lib.add(&["vocab", "--field", "front=dog", "--field", "back=chien", "--tags", "animals,nouns"]);
    assert_eq!(guid.len(), 10);

    let cards = lib.list_json(&[]);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["guid"], guid.as_str());
    assert_eq!(cards[0]["fields"]["back"], "chien");
    assert_eq!(cards[0]["tags"], serde_json::json!(["animals", "nouns"]));

    let show = lib.run(&["show", &guid]);
    assert!(show.status.success());
    let text = stdout(&show);
    assert!(text.contains("front: dog"));
    assert!(text.contains("Tags: animals, nouns"));

    let table = lib.run(&["list"]);
    assert!(table.status.success());
    assert!(stdout(&table).contains(&guid));
}

#[test]
fn test_cli_add_duplicate_returns_existing_guid() {
    let lib = Library::new();
    let first = lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien", "-t", "animals"]);
    let second = lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien"]);

    assert_eq!(first, second);
    let log = std::fs::read_to_string(lib.log_path()).expect("read log");
    assert_eq!(log.lines().count(), 1);

    let animals = lib.list_json(&["--tag", "animals"]);
    assert_eq!(animals.len(), 1);
    assert_eq!(animals[0]["guid"], first.as_str());
}

#[test]
fn test_cli_add_with_supplied_guid() {
    let lib = Library::new();
    let guid = lib.add(&["vocab", "--guid", "my-card", "-f", "front=a", "-f", "back=b"]);
    assert_eq!(guid, "my-card");
}

#[test]
fn test_cli_add_requires_every_field_without_prompts() {
    let lib = Library::new();
    let output = lib.run(&["add", "--no-input", "vocab", "-f", "front=dog"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("back"));
}

#[test]
fn test_cli_unknown_note_type_exit_code() {
    let lib = Library::new();
    let output = lib.run(&["add", "--no-input", "cloze", "-f", "text=x"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Hint:"));
}

#[test]
fn test_cli_list_filters_are_anded() {
    let lib = Library::new();
    let dog = lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien", "-t", "animals"]);
    lib.add(&["vocab", "-f", "front=cat", "-f", "back=chat", "-t", "animals"]);
    lib.add(&["phrase", "-f", "text=hot dog", "-f", "meaning=food", "-t", "animals"]);

    let cards = lib.list_json(&["--tag", "animals", "--note-type", "vocab", "--search", "DOG"]);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["guid"], dog.as_str());

    let plain = lib.run(&["list", "--format", "plain", "--search", "dog"]);
    assert_eq!(stdout(&plain).lines().count(), 2);

    let both = lib.run(&["list", "--json", "--format", "plain"]);
    assert!(!both.status.success());
}

#[test]
fn test_cli_edit_and_delete() {
    let lib = Library::new();
    let keep = lib.add(&["vocab", "-f", "front=cat", "-f", "back=chat"]);
    let guid = lib.add(&["vocab", "-f", "front=dog", "-f", "back=chein"]);
    let before = std::fs::read_to_string(lib.log_path()).expect("read log");

    let edit = lib.run(&["edit", &guid, "--no-input", "-f", "back=chien", "-t", "animals"]);
    assert!(edit.status.success(), "{}", stderr(&edit));

    let after = std::fs::read_to_string(lib.log_path()).expect("read log");
    assert_eq!(after.lines().next(), before.lines().next());

    let show = lib.run(&["show", &guid, "--json"]);
    let card: serde_json::Value = serde_json::from_slice(&show.stdout).expect("show json");
    assert_eq!(card["fields"]["front"], "dog");
    assert_eq!(card["fields"]["back"], "chien");
    assert_eq!(card["tags"], serde_json::json!(["animals"]));
    assert!(card["updated_at"].is_string());

    let delete = lib.run(&["delete", &guid]);
    assert!(delete.status.success());
    let remaining = lib.list_json(&[]);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["guid"], keep.as_str());

    let missing = lib.run(&["delete", &guid]);
    assert_eq!(missing.status.code(), Some(3));
    let missing = lib.run(&["show", &guid]);
    assert_eq!(missing.status.code(), Some(3));
    assert!(stderr(&missing).contains("Hint:"));
}

#[test]
fn test_cli_edit_without_changes_fails() {
    let lib = Library::new();
    let guid = lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien"]);
    let output = lib.run(&["edit", &guid, "--no-input"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_import_file_reports_bad_lines() {
    let lib = Library::new();
    let import = lib.root().join("words.txt");
    std::fs::write(
        &import,
        "dog :: chien\ncat :: chat :: extra\n# comment line\nbird::oiseau\n",
    )
    .expect("write import");

    let output = lib.run(&["add", "vocab", "--no-input", "--tags", "animals", "--file", import.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("line 2"));

    let cards = lib.list_json(&["--tag", "animals"]);
    let fronts: Vec<&str> = cards
        .iter()
        .map(|c| c["fields"]["front"].as_str().unwrap())
        .collect();
    assert_eq!(fronts, vec!["dog", "bird"]);
}

#[test]
fn test_cli_import_missing_file_exit_code() {
    let lib = Library::new();
    let output = lib.run(&["add", "vocab", "--file", "nope.txt"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_pack_uses_default_decks() {
    let lib = Library::new();
    lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien"]);
    lib.add(&["phrase", "-f", "text=bonjour", "-f", "meaning=hello"]);
    lib.add(&["listen", "-f", "word=chat", "-f", "audio=[sound:chat.mp3]"]);
    std::fs::write(
        lib.root().join("data").join("media").join("chat.mp3"),
        b"ID3",
    )
    .expect("write media");

    let output = lib.run(&["pack", "--output", "decks.apkg"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Packed 3 note(s)"));
    assert!(text.contains("media files: 1"));

    let counts = deck_counts(&lib.root().join("decks.apkg"));
    assert_eq!(
        counts,
        vec![
            ("Default".to_string(), 1),
            ("French".to_string(), 1),
            ("Phrases".to_string(), 1)
        ]
    );
}

#[test]
fn test_cli_pack_deck_override_and_filter() {
    let lib = Library::new();
    lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien", "-t", "animals"]);
    lib.add(&["vocab", "-f", "front=red", "-f", "back=rouge", "-t", "colors"]);

    let output = lib.run(&["pack", "-o", "colors.apkg", "--deck", "Colours", "--tag", "colors"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let counts = deck_counts(&lib.root().join("colors.apkg"));
    assert_eq!(counts, vec![("Colours".to_string(), 1)]);
}

#[test]
fn test_cli_pack_recipe() {
    let lib = Library::new();
    lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien", "-t", "animals"]);
    lib.add(&["vocab", "-f", "front=cat", "-f", "back=chat", "-t", "animals"]);
    lib.add(&["phrase", "-f", "text=dog days", "-f", "meaning=summer", "-t", "animals"]);

    let output = lib.run(&["pack", "--recipe", "animals"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let counts = deck_counts(&lib.root().join("out").join("animals.apkg"));
    assert_eq!(counts, vec![("Animals".to_string(), 2)]);

    let missing = lib.run(&["pack", "--recipe", "nope"]);
    assert_eq!(missing.status.code(), Some(3));
}

#[test]
fn test_cli_pack_strict_and_lenient_projection() {
    let lib = Library::new();
    std::fs::create_dir_all(lib.root().join("data")).expect("create data dir");
    std::fs::write(
        lib.log_path(),
        "{\"guid\":\"g1\",\"note_type\":\"vocab\",\"fields\":{\"front\":\"dog\"},\"tags\":[],\"created_at\":\"2024-01-01T00:00:00Z\"}\n",
    )
    .expect("write log");

    let strict = lib.run(&["pack", "-o", "strict.apkg"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("back"));
    assert!(!lib.root().join("strict.apkg").exists());

    let lenient = lib.run(&["pack", "-o", "lenient.apkg", "--lenient"]);
    assert!(lenient.status.success(), "{}", stderr(&lenient));
    assert_eq!(
        deck_counts(&lib.root().join("lenient.apkg")),
        vec![("French".to_string(), 1)]
    );
}

#[test]
fn test_cli_corrupt_line_policy_from_config() {
    let lib = Library::new();
    lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien"]);
    let mut log = std::fs::read_to_string(lib.log_path()).expect("read log");
    log.push_str("{not json\n");
    std::fs::write(lib.log_path(), log).expect("write log");

    let failing = lib.run(&["list", "--json"]);
    assert_eq!(failing.status.code(), Some(1));
    assert!(stderr(&failing).contains("line 2"));

    let config = lib.root().join("config.toml");
    std::fs::write(&config, "[store]\ncorrupt_lines = \"skip\"\n").expect("write config");
    let skipping = lib
        .command()
        .env("DECKFORGE_CONFIG", &config)
        .args(["list", "--json"])
        .output()
        .expect("run list");
    assert!(skipping.status.success(), "{}", stderr(&skipping));
    let cards: Vec<serde_json::Value> = serde_json::from_slice(&skipping.stdout).expect("json");
    assert_eq!(cards.len(), 1);
}

#[test]
fn test_cli_config_pack_defaults() {
    let lib = Library::new();
    lib.add(&["vocab", "-f", "front=dog", "-f", "back=chien"]);
    let config = lib.root().join("config.toml");
    std::fs::write(
        &config,
        "[pack]\ndefault_deck = \"Everything\"\ndefault_output = \"all.apkg\"\n",
    )
    .expect("write config");

    let output = lib
        .command()
        .env("DECKFORGE_CONFIG", &config)
        .arg("pack")
        .output()
        .expect("run pack");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        deck_counts(&lib.root().join("all.apkg")),
        vec![("Everything".to_string(), 1)]
    );
}

#[test]
fn test_cli_types_lists_catalog() {
    let lib = Library::new();
    let output = lib.run(&["types"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("vocab"));
    assert!(text.contains("front, back"));
}

#[test]
fn test_cli_missing_catalog_exit_code() {
    let lib = Library::new();
    std::fs::remove_file(lib.root().join("config").join("note_types.json")).expect("remove");
    let output = lib.run(&["types"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Hint:"));
}

#[test]
fn test_cli_completions() {
    let output = Command::new(bin())
        .args(["completions", "bash"])
        .output()
        .expect("run completions");
    assert!(output.status.success());
    assert!(stdout(&output).contains("deckforge"));
}

#[test]
fn test_cli_invalid_args_exit_code() {
    let output = Command::new(bin()).arg("add").output().expect("run add");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:") || stderr.contains("error:"));
}
