use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::assembler::{
    self, Envelope, IndexResource, NoteResource, TagResource, note_resource, note_resources,
    tag_resource, tag_resources,
};
use crate::error::ApiError;
use crate::models::{NoteDraft, NoteInput, NotePatchInput, TagInput};
use crate::resolver::resolve_tags;

pub async fn index(State(state): State<AppState>) -> Json<IndexResource> {
    Json(assembler::index_resource(&state.links))
}

// --- 笔记 ---

pub async fn list_notes(
    State(state): State<AppState>,
) -> Result<Json<Envelope<NoteResource>>, ApiError> {
    let notes = state.store.find_all_notes().await?;
    debug!(count = notes.len(), "listing notes");
    Ok(Json(note_resources(&state.links, &notes)))
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<NoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    // 标签解析失败时不会写入任何数据
    let tag_uris = input.tag_uris.unwrap_or_default();
    let tags = resolve_tags(state.store.as_ref(), &state.links, &tag_uris).await?;

    let note = state
        .store
        .insert_note(NoteDraft {
            title: input.title.unwrap_or_default(),
            body: input.body.unwrap_or_default(),
            tag_ids: tags.iter().map(|tag| tag.id).collect(),
        })
        .await?;
    info!(note_id = note.id, tags = tags.len(), "note created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, state.links.note(note.id))],
    ))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NoteResource>, ApiError> {
    let note = state
        .store
        .find_note(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;
    Ok(Json(note_resource(&state.links, &note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_note(id).await?;
    info!(note_id = id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_note_tags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<TagResource>>, ApiError> {
    let note = state
        .store
        .find_note(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;

    let mut tags = Vec::with_capacity(note.tag_ids.len());
    for tag_id in &note.tag_ids {
        match state.store.find_tag(*tag_id).await? {
            Some(tag) => tags.push(tag),
            // 标签可能已在外部被删除
            None => warn!(note_id = id, tag_id = *tag_id, "note references a missing tag"),
        }
    }
    Ok(Json(tag_resources(&state.links, &tags)))
}

pub async fn patch_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<NotePatchInput>,
) -> Result<StatusCode, ApiError> {
    let mut note = state
        .store
        .find_note(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;

    if let Some(tag_uris) = &patch.tag_uris {
        let tags = resolve_tags(state.store.as_ref(), &state.links, tag_uris).await?;
        note.tag_ids = tags.iter().map(|tag| tag.id).collect();
    }
    if let Some(title) = patch.title {
        note.title = title;
    }
    if let Some(body) = patch.body {
        note.body = body;
    }

    state.store.update_note(&note).await?;
    info!(note_id = id, "note updated");
    Ok(StatusCode::NO_CONTENT)
}

// --- 标签 ---

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Envelope<TagResource>>, ApiError> {
    let tags = state.store.find_all_tags().await?;
    Ok(Json(tag_resources(&state.links, &tags)))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(input): Json<TagInput>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state.store.insert_tag(input.name).await?;
    info!(tag_id = tag.id, "tag created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, state.links.tag(tag.id))],
    ))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TagResource>, ApiError> {
    let tag = state
        .store
        .find_tag(id)
        .await?
        .ok_or_else(|| ApiError::tag_not_found(id))?;
    Ok(Json(tag_resource(&state.links, &tag)))
}

pub async fn get_tagged_notes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<NoteResource>>, ApiError> {
    if state.store.find_tag(id).await?.is_none() {
        return Err(ApiError::tag_not_found(id));
    }
    let notes = state.store.find_notes_by_tag(id).await?;
    Ok(Json(note_resources(&state.links, &notes)))
}
