use std::fmt;

use tokio::sync::mpsc;

/// Pipeline stage of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Chunking,
    GeneratingQuestions,
    GeneratingSummary,
    Persisting,
    Done,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Chunking => "chunking",
            Self::GeneratingQuestions => "generating questions",
            Self::GeneratingSummary => "generating summary",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub percent: u8,
    pub label: String,
}

/// Sends progress events, never letting the percentage go backwards.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
    percent: u8,
    stage: Option<Stage>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self {
            tx: Some(tx),
            percent: 0,
            stage: None,
        }
    }

    /// Reporter that drops every event.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage.unwrap_or(Stage::Idle)
    }

    pub fn advance(&mut self, stage: Stage, percent: u8, label: impl Into<String>) {
        self.percent = self.percent.max(percent.min(100));
        self.stage = Some(stage);
        let label = label.into();
        tracing::info!(%stage, percent = self.percent, "{label}");
        self.send(ProgressEvent {
            stage,
            percent: self.percent,
            label,
        });
    }

    /// Terminal error event, carrying the last percentage.
    pub fn fail(&mut self, label: impl Into<String>) {
        self.stage = Some(Stage::Error);
        self.send(ProgressEvent {
            stage: Stage::Error,
            percent: self.percent,
            label: label.into(),
        });
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            tracing::debug!("progress receiver dropped");
        }
    }
}
