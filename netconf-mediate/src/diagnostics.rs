//! On-disk capture of messages as they move through translation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use netconf_envelope_core::envelope::MessageKind;
use tracing::warn;

/// Translation stage a captured payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fragment as received from the caller.
    RawMsg,
    /// Envelope sent to the translation service.
    PackedMsg,
    /// Envelope text returned by the translation service.
    TranslatedMsg,
}

impl Stage {
    /// File name component of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RawMsg => "raw_msg",
            Stage::PackedMsg => "packed_msg",
            Stage::TranslatedMsg => "translated_msg",
        }
    }
}

/// Directory collecting per-stage message captures.
#[derive(Debug, Clone)]
pub struct DiagnosticsDir {
    dir: PathBuf,
}

impl DiagnosticsDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the captures are written to.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write one capture as `{timestamp}-{kind}-{stage}.xml`.
    ///
    /// Failures are logged and swallowed; a capture must never break the
    /// translation call it observes.
    pub fn record(&self, kind: &MessageKind, stage: Stage, payload: &str) {
        if let Err(err) = self.try_record(kind, stage, payload) {
            warn!(
                dir = %self.dir.display(),
                stage = stage.as_str(),
                "failed to write diagnostic capture: {err}"
            );
        }
    }

    fn try_record(&self, kind: &MessageKind, stage: Stage, payload: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let name = format!("{}-{}-{}.xml", timestamp, kind, stage.as_str());
        fs::write(self.dir.join(name), payload)
    }
}
