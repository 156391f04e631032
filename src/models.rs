use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// 持久化的笔记，标签按顺序以 id 引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub tag_ids: Vec<i64>,
}

// 尚未分配 id 的新笔记
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    pub tag_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

// 用于创建新笔记的请求体结构，缺失或为 null 的字段按空值处理
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag_uris: Option<Vec<String>>,
}

/// Partial update of a note. A missing field and an explicit `null` both
/// mean "leave unchanged"; there is no way to clear a field.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotePatchInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tag_uris: Option<Vec<String>>,
}

// 用于创建标签的请求体结构
#[derive(Deserialize, Debug)]
pub struct TagInput {
    pub name: String,
}
