// ABOUTME: Read-only sprint bulletin source
// ABOUTME: Loads <content>/sprints/*.md, parses YAML front matter, renders markdown bodies

pub mod markdown;
pub mod sprint;

use thiserror::Error;

// Re-export main types
pub use markdown::{render_markdown, split_front_matter};
pub use sprint::{parse_sprint, Sprint, SprintHealth, SprintSource};

/// Content errors
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid front matter in {file}: {source}")]
    FrontMatter {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Missing front matter in {0}")]
    MissingFrontMatter(String),
    #[error("Sprint not found: {0}")]
    NotFound(String),
}

pub type ContentResult<T> = Result<T, ContentError>;
