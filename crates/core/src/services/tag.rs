//! Tag service: normalization, display colors and usage counts.

use pawpost_common::{AppError, AppResult, IdGenerator};
use pawpost_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;
use serde::Serialize;

/// Maximum number of tags on one post.
pub const MAX_TAGS: usize = 10;
/// Maximum length of one tag, in characters.
pub const MAX_TAG_LEN: usize = 50;

const PALETTE: [&str; 8] = [
    "#f59e0b", "#ef4444", "#10b981", "#3b82f6", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// A tag as shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagBadge {
    pub name: String,
    pub color: String,
}

/// Display color for a tag name. Stable across processes and releases.
#[must_use]
pub fn color_for(name: &str) -> &'static str {
    // FNV-1a
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PALETTE[hash as usize % PALETTE.len()]
}

/// Badges for a list of normalized tag names.
#[must_use]
pub fn badges(names: &[String]) -> Vec<TagBadge> {
    names
        .iter()
        .map(|name| TagBadge {
            name: name.clone(),
            color: color_for(name).to_string(),
        })
        .collect()
}

/// Normalize user-supplied tags.
///
/// Each tag is trimmed, stripped of leading `#` and lowercased; empty tags
/// are dropped and duplicates keep their first position.
pub fn normalize_tags(raw: &[String]) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for tag in raw {
        let name = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if name.is_empty() || out.contains(&name) {
            continue;
        }
        if name.chars().count() > MAX_TAG_LEN {
            return Err(AppError::Validation(format!(
                "tag '{name}' is longer than {MAX_TAG_LEN} characters"
            )));
        }
        out.push(name);
    }
    if out.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "a post may carry at most {MAX_TAGS} tags"
        )));
    }
    Ok(out)
}

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Most used tags, with their approved-post counts.
    pub async fn top(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_top(limit).await
    }

    /// Count a newly published post under each of its tags.
    pub async fn record_published(&self, names: &[String]) -> AppResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now();
        let rows = names
            .iter()
            .map(|name| tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.clone()),
                color: Set(color_for(name).to_string()),
                posts_count: Set(0),
                created_at: Set(now.into()),
            })
            .collect();

        self.tag_repo.ensure(rows).await?;
        self.tag_repo.increment(names).await
    }

    /// Stop counting a published post under each of its tags.
    pub async fn record_withdrawn(&self, names: &[String]) -> AppResult<()> {
        self.tag_repo.decrement(names).await
    }

    /// Move a published post's counts from its old tags to its new ones.
    pub async fn record_retagged(&self, old: &[String], new: &[String]) -> AppResult<()> {
        let removed: Vec<String> = old.iter().filter(|t| !new.contains(t)).cloned().collect();
        let added: Vec<String> = new.iter().filter(|t| !old.contains(t)).cloned().collect();

        self.record_withdrawn(&removed).await?;
        self.record_published(&added).await
    }
}
