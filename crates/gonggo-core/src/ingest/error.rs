use gonggo_client::ErrorKind;
use gonggo_memory::StoreError;

use super::Stage;

/// What the user submitted, for error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Url,
    Image,
    Document,
}

/// Local checks done before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("input is empty")]
    EmptyInput,

    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("cannot read file: {0}")]
    Unreadable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{stage} failed: {message}")]
    Remote {
        stage: Stage,
        input: InputKind,
        kind: ErrorKind,
        message: String,
    },

    #[error("not enough content to generate questions")]
    InsufficientContent { input: InputKind },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Banner text shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::EmptyInput) => {
                "Please enter some text, a link or a file.".into()
            }
            Self::Validation(ValidationError::FileTooLarge { limit, .. }) => format!(
                "The file is too large. Files up to {} can be uploaded.",
                format_size(*limit)
            ),
            Self::Validation(ValidationError::InvalidUrl(url)) => {
                format!("\"{url}\" is not a valid link. Check the address and try again.")
            }
            Self::Validation(ValidationError::Unreadable(reason)) => {
                format!("The file could not be read: {reason}")
            }
            Self::Remote {
                stage: Stage::GeneratingQuestions,
                ..
            } => "The question generation request failed. Please try again.".into(),
            Self::Remote {
                input: InputKind::Url,
                kind,
                message,
                ..
            } => url_failure_message(*kind, message),
            Self::Remote {
                input, message, ..
            } => format!("{} processing failed: {message}", input_label(*input)),
            Self::InsufficientContent { input } => match input {
                InputKind::Text => {
                    "The text is too short to generate questions. Please enter more detailed content."
                        .into()
                }
                InputKind::Url => {
                    "Not enough content was found at this link to generate questions.".into()
                }
                InputKind::Image => {
                    "Not enough text was found in the image to generate questions.".into()
                }
                InputKind::Document => {
                    "The file does not contain enough content to generate questions. Please upload a more detailed file."
                        .into()
                }
            },
            Self::Store(e) => format!("The document could not be saved: {e}"),
        }
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    match bytes {
        b if b >= MIB => format!("{} MB", b / MIB),
        b if b >= KIB => format!("{} KB", b / KIB),
        b => format!("{b} bytes"),
    }
}

fn input_label(input: InputKind) -> &'static str {
    match input {
        InputKind::Text => "Text",
        InputKind::Url => "Link",
        InputKind::Image => "Image",
        InputKind::Document => "File",
    }
}

fn url_failure_message(kind: ErrorKind, message: &str) -> String {
    match kind {
        ErrorKind::Status(_) => {
            "The link could not be accessed. Check that the page is public and try again.".into()
        }
        ErrorKind::Timeout => {
            "Analyzing the link took too long. Try again later or use another link.".into()
        }
        ErrorKind::Connect | ErrorKind::Transport => {
            "A network error occurred. Check your connection and that the server is running."
                .into()
        }
        ErrorKind::Decode | ErrorKind::Remote => {
            format!("An error occurred while analyzing the link: {message}")
        }
    }
}
