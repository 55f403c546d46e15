//! Filesystem-backed story store: one subdirectory per slug, one
//! frontmatter+body document per subdirectory.
//!
//! No locking and no atomic rename: concurrent writers to the same slug race
//! with last-write-wins, and a failed `create` can leave an empty directory
//! behind.

use std::cmp::Reverse;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;

use super::document::{self, StorySummary, STORY_FILE};
use super::StoryError;

/// A fully loaded story.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub slug: String,
    pub metadata: Value,
    pub content: String,
}

/// Listing result: summaries sorted by date descending, plus a count of
/// directories whose document could not be read or parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryListing {
    pub stories: Vec<StorySummary>,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct StoryStore {
    root: Option<PathBuf>,
}

/// Slugs double as directory names, so the pattern is enforced on every
/// operation, not only create.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl StoryStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn root(&self) -> Result<&Path, StoryError> {
        self.root.as_deref().ok_or(StoryError::RootUnset)
    }

    /// Liveness probe for the health endpoint: the root must be configured
    /// and present.
    pub async fn check_root(&self) -> Result<(), StoryError> {
        let root = self.root()?;
        if fs::try_exists(root).await? {
            Ok(())
        } else {
            Err(StoryError::RootNotFound)
        }
    }

    pub async fn create(
        &self,
        slug: &str,
        metadata: &Value,
        content: &str,
    ) -> Result<(), StoryError> {
        if !is_valid_slug(slug) {
            return Err(StoryError::InvalidSlug);
        }

        let dir = self.root()?.join(slug);
        if fs::try_exists(&dir).await? {
            return Err(StoryError::AlreadyExists);
        }

        let doc = document::compose(metadata, content)?;
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(STORY_FILE), doc).await?;
        Ok(())
    }

    pub async fn read(&self, slug: &str) -> Result<Story, StoryError> {
        // An invalid slug cannot name a stored story
        if !is_valid_slug(slug) {
            return Err(StoryError::NotFound);
        }

        let path = self.root()?.join(slug).join(STORY_FILE);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoryError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let (metadata, content) = document::split(&raw)?;
        Ok(Story { slug: slug.to_string(), metadata, content })
    }

    /// Full overwrite; every call must supply the complete intended metadata
    /// and body.
    pub async fn update(
        &self,
        slug: &str,
        metadata: &Value,
        content: &str,
    ) -> Result<(), StoryError> {
        if !is_valid_slug(slug) {
            return Err(StoryError::NotFound);
        }

        let path = self.root()?.join(slug).join(STORY_FILE);
        if !fs::try_exists(&path).await? {
            return Err(StoryError::NotFound);
        }

        let doc = document::compose(metadata, content)?;
        fs::write(&path, doc).await?;
        Ok(())
    }

    /// Removes the slug's entire directory subtree. Not reversible.
    pub async fn delete(&self, slug: &str) -> Result<(), StoryError> {
        if !is_valid_slug(slug) {
            return Err(StoryError::NotFound);
        }

        let dir = self.root()?.join(slug);
        if !fs::try_exists(&dir).await? {
            return Err(StoryError::NotFound);
        }

        fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    /// Enumerates every subdirectory holding a readable document, newest
    /// first. Entries that fail to read or parse are dropped from the result
    /// and counted; subdirectories without a document are not stories and are
    /// ignored without counting.
    pub async fn list(&self) -> Result<StoryListing, StoryError> {
        let root = self.root()?;
        if !fs::try_exists(root).await? {
            return Err(StoryError::RootNotFound);
        }

        let mut stories = Vec::new();
        let mut skipped = 0usize;

        let mut entries = fs::read_dir(root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let slug = entry.file_name().to_string_lossy().into_owned();
            let raw = match fs::read_to_string(entry.path().join(STORY_FILE)).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!("skipping story {}: {}", slug, e);
                    skipped += 1;
                    continue;
                }
            };

            match document::split(&raw) {
                Ok((metadata, _)) => stories.push(StorySummary::from_metadata(&slug, &metadata)),
                Err(e) => {
                    tracing::warn!("skipping story {}: {}", slug, e);
                    skipped += 1;
                }
            }
        }

        // Stable sort: ties keep enumeration order, undated entries sort last
        stories.sort_by_cached_key(|s| Reverse(document::parse_story_date(&s.date)));

        Ok(StoryListing { stories, skipped })
    }
}
