use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::modes::Mode;
use crate::session::transcript::{Transcript, TranscriptSummary, Turn};
use crate::utils::{atomic_write, KitError};

/// Per-mode durable transcript storage: one JSON file per transcript under
/// `<root>/<mode>/<id>.json`. Appends are atomic; a crash never leaves a
/// half-written transcript on disk.
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn mode_dir(&self, mode: Mode) -> PathBuf {
        self.root.join(mode.as_str())
    }

    fn transcript_path(&self, mode: Mode, id: &str) -> PathBuf {
        self.mode_dir(mode).join(format!("{}.json", id))
    }

    /// Allocate a fresh transcript. Nothing is written until the first
    /// append, so an aborted session leaves no empty file behind.
    pub fn create(&self, mode: Mode) -> Transcript {
        Transcript::new(mode)
    }

    /// Saved transcripts for a mode, newest first (ties broken by id, which
    /// sorts consistently with creation time). Unreadable files are skipped
    /// with a warning. An empty directory is an empty list, not an error.
    pub fn list(&self, mode: Mode) -> Result<Vec<TranscriptSummary>, KitError> {
        let dir = self.mode_dir(mode);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }
            match read_transcript(&path) {
                Ok(transcript) => summaries.push(TranscriptSummary {
                    id: transcript.id.clone(),
                    created_at: transcript.created_at,
                    preview: transcript.preview(),
                    turn_count: transcript.turns.len(),
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable transcript");
                }
            }
        }

        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(summaries)
    }

    /// Load one transcript by id. A missing or unreadable file is
    /// `TranscriptNotFound`; a trailing unanswered user turn (crash between
    /// the two commit appends) is dropped before the transcript is returned.
    pub fn load(&self, mode: Mode, id: &str) -> Result<Transcript, KitError> {
        let path = self.transcript_path(mode, id);
        let mut transcript = read_transcript(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "transcript load failed");
            KitError::TranscriptNotFound {
                mode,
                id: id.to_string(),
            }
        })?;
        if transcript.repair_dangling_user_turn() {
            warn!(id, mode = %mode, "dropped dangling user turn from transcript");
        }
        Ok(transcript)
    }

    /// Append one turn and persist the transcript, durably, before
    /// returning. If the write fails the in-memory transcript is left
    /// untouched, so the caller never holds turns that storage lost.
    pub fn append(&self, transcript: &mut Transcript, turn: Turn) -> Result<(), KitError> {
        let mut updated = transcript.clone();
        updated.turns.push(turn);

        let json = serde_json::to_string_pretty(&updated)
            .map_err(|e| KitError::HistoryWrite(std::io::Error::other(e)))?;
        let dir = self.mode_dir(transcript.mode);
        fs::create_dir_all(&dir).map_err(KitError::HistoryWrite)?;
        let path = self.transcript_path(transcript.mode, &transcript.id);
        atomic_write(&path, json.as_bytes()).map_err(KitError::HistoryWrite)?;

        *transcript = updated;
        Ok(())
    }
}

fn read_transcript(path: &Path) -> Result<Transcript, std::io::Error> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(std::io::Error::other)
}
