//! JSON-lines card log.
//!
//! One card per line, appended on create. Every operation re-reads the whole
//! file; update and delete rewrite it through a temp file and rename. This is
//! sized for a personal collection, not for tens of thousands of cards.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ForgeError, Result};
use crate::fs::{ensure_parent_dir, write_atomic};
use crate::storage::traits::CardRepository;
use crate::storage::types::{Card, CardFilter, CardUpdate, NewCard};

/// What to do with a log line that does not parse as a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptLinePolicy {
    /// Stop with `ForgeError::CorruptRecord`
    #[default]
    Fail,
    /// Log a warning and leave the line out of query results
    Skip,
}

/// A line of the log with its 1-based line number.
struct RawLine {
    number: usize,
    /// Line content without its terminator
    text: String,
    /// `"\n"`, `"\r\n"`, or empty for a final unterminated line
    ending: &'static str,
}

impl RawLine {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Card store backed by a JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
    policy: CorruptLinePolicy,
}

impl JsonlStore {
    /// Open a store at `path`. The file is created on the first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: CorruptLinePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorruptLinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> CorruptLinePolicy {
        self.policy
    }

    fn read_lines(&self) -> Result<Vec<RawLine>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let lines: Vec<RawLine> = contents
            .split_inclusive('\n')
            .enumerate()
            .map(|(idx, raw)| {
                let (text, ending) = if let Some(text) = raw.strip_suffix("\r\n") {
                    (text, "\r\n")
                } else if let Some(text) = raw.strip_suffix('\n') {
                    (text, "\n")
                } else {
                    (raw, "")
                };
                RawLine {
                    number: idx + 1,
                    text: text.to_string(),
                    ending,
                }
            })
            .collect();
        debug!(path = %self.path.display(), lines = lines.len(), "Read card log");
        Ok(lines)
    }

    /// Parse one line; `None` means it was corrupt and skipped.
    fn parse_line(&self, line: &RawLine) -> Result<Option<Card>> {
        match serde_json::from_str::<Card>(&line.text) {
            Ok(card) => Ok(Some(card)),
            Err(err) => match self.policy {
                CorruptLinePolicy::Fail => Err(ForgeError::CorruptRecord {
                    line: line.number,
                    reason: err.to_string(),
                }),
                CorruptLinePolicy::Skip => {
                    warn!(
                        path = %self.path.display(),
                        line = line.number,
                        error = %err,
                        "Skipping corrupt card record"
                    );
                    Ok(None)
                }
            },
        }
    }

    fn read_cards(&self) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        for line in self.read_lines()?.iter().filter(|line| !line.is_blank()) {
            if let Some(card) = self.parse_line(line)? {
                cards.push(card);
            }
        }
        Ok(cards)
    }

    fn append(&self, card: &Card) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut record = serde_json::to_string(card)
            .map_err(|e| ForgeError::Storage(format!("Failed to serialize card: {}", e)))?;

        // Follow the log's existing line endings; a hand-edited log may also
        // lack the final newline.
        let len = file.metadata()?.len();
        let mut ending = "\n";
        if len > 0 {
            let mut tail = [0u8; 2];
            let tail_len = len.min(2) as usize;
            file.seek(SeekFrom::End(-(tail_len as i64)))?;
            file.read_exact(&mut tail[..tail_len])?;
            match &tail[..tail_len] {
                [b'\r', b'\n'] => ending = "\r\n",
                [.., b'\n'] => {}
                _ => record.insert(0, '\n'),
            }
        }
        record.push_str(ending);

        file.write_all(record.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Rewrite the log, replacing the first card with `guid` by the result of
    /// `edit` (or dropping it when `edit` returns `None`).
    ///
    /// Every other line, including blank and skipped corrupt ones, is written
    /// back as is with its original line ending.
    fn rewrite_first<F>(&self, guid: &str, edit: F) -> Result<bool>
    where
        F: FnOnce(Card) -> Option<Card>,
    {
        let lines = self.read_lines()?;

        let mut target = None;
        for (idx, line) in lines.iter().enumerate() {
            if line.is_blank() {
                continue;
            }
            if let Some(card) = self.parse_line(line)? {
                if target.is_none() && card.guid == guid {
                    target = Some((idx, card));
                }
            }
        }
        let Some((target_idx, card)) = target else {
            return Ok(false);
        };
        let replacement = edit(card);

        let mut output = String::new();
        for (idx, line) in lines.iter().enumerate() {
            if idx == target_idx {
                if let Some(ref updated) = replacement {
                    let record = serde_json::to_string(updated).map_err(|e| {
                        ForgeError::Storage(format!("Failed to serialize card: {}", e))
                    })?;
                    output.push_str(&record);
                    output.push_str(line.ending);
                }
                continue;
            }
            output.push_str(&line.text);
            output.push_str(line.ending);
        }

        write_atomic(&self.path, output.as_bytes())?;
        debug!(path = %self.path.display(), guid, "Rewrote card log");
        Ok(true)
    }
}

impl CardRepository for JsonlStore {
    fn create(&mut self, new_card: &NewCard) -> Result<String> {
        if let Some(ref guid) = new_card.guid {
            if guid.trim().is_empty() || guid.chars().any(char::is_whitespace) {
                return Err(ForgeError::InvalidInput(format!(
                    "Invalid card guid: {:?}",
                    guid
                )));
            }
        }

        if let Some(existing) = self
            .read_cards()?
            .into_iter()
            .find(|card| card.same_content(&new_card.note_type, &new_card.fields))
        {
            info!(guid = %existing.guid, "Duplicate card detected; returning existing guid");
            return Ok(existing.guid);
        }

        let card = Card {
            guid: new_card.guid.clone().unwrap_or_else(Card::generate_guid),
            note_type: new_card.note_type.clone(),
            fields: new_card.fields.clone(),
            tags: new_card.tags.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        self.append(&card)?;
        debug!(guid = %card.guid, note_type = %card.note_type, "Appended card");
        Ok(card.guid)
    }

    fn list(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let mut cards = self.read_cards()?;
        cards.retain(|card| filter.matches(card));
        Ok(cards)
    }

    fn get(&self, guid: &str) -> Result<Option<Card>> {
        Ok(self.read_cards()?.into_iter().find(|card| card.guid == guid))
    }

    fn update(&mut self, guid: &str, update: &CardUpdate) -> Result<bool> {
        let now = Utc::now();
        self.rewrite_first(guid, |mut card| {
            update.apply(&mut card, now);
            Some(card)
        })
    }

    fn delete(&mut self, guid: &str) -> Result<bool> {
        self.rewrite_first(guid, |_| None)
    }
}
