// Failure tag upsert: make sure the label exists, then make sure the
// series/movie carries it. Safe to repeat.

use crate::catalog::models::{set_tag_ids, tag_ids, Tag};
use crate::catalog::CatalogClient;
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAttachment {
    Attached(i64),
    AlreadyPresent(i64),
}

/// Existing tag matching `label` case-insensitively, else a newly created one
pub async fn ensure_tag(client: &CatalogClient, label: &str) -> Result<Tag, CatalogError> {
    let wanted = label.to_lowercase();
    let existing = client
        .tags()
        .await?
        .into_iter()
        .find(|tag| tag.label.to_lowercase() == wanted);

    match existing {
        Some(tag) => Ok(tag),
        None => client.create_tag(label).await,
    }
}

/// Attach `label` to the series/movie `entity_id` unless it is already there
pub async fn attach_tag(
    client: &CatalogClient,
    entity_id: i64,
    label: &str,
) -> Result<TagAttachment, CatalogError> {
    let tag = ensure_tag(client, label).await?;

    let mut record = client.entity(entity_id).await?;
    let mut ids = tag_ids(&record);
    if ids.contains(&tag.id) {
        return Ok(TagAttachment::AlreadyPresent(tag.id));
    }

    ids.push(tag.id);
    set_tag_ids(&mut record, &ids);
    client.update_entity(entity_id, &record).await?;

    Ok(TagAttachment::Attached(tag.id))
}
