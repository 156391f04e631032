//! Hypermedia representations of notes and tags.
//!
//! Resources carry their links under `_links`, collections are wrapped in an
//! [`Envelope`] whose items live under `content`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Note, Tag};

pub const REL_SELF: &str = "self";
pub const REL_NOTE_TAGS: &str = "note-tags";
pub const REL_TAGGED_NOTES: &str = "tagged-notes";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
}

/// Named links, serialized in rel order so output is stable.
pub type Links = BTreeMap<&'static str, Link>;

/// Builds canonical URIs, optionally prefixed with the public base URL.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn notes(&self) -> String {
        format!("{}/notes", self.base)
    }

    pub fn note(&self, id: i64) -> String {
        format!("{}/notes/{}", self.base, id)
    }

    pub fn note_tags(&self, id: i64) -> String {
        format!("{}/notes/{}/tags", self.base, id)
    }

    pub fn tags(&self) -> String {
        format!("{}/tags", self.base)
    }

    pub fn tag(&self, id: i64) -> String {
        format!("{}/tags/{}", self.base, id)
    }

    pub fn tagged_notes(&self, id: i64) -> String {
        format!("{}/tags/{}/notes", self.base, id)
    }
}

fn links<const N: usize>(entries: [(&'static str, String); N]) -> Links {
    entries
        .into_iter()
        .map(|(rel, href)| (rel, Link { href }))
        .collect()
}

#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub content: Vec<T>,
}

fn envelope<E, T>(items: &[E], assemble: impl Fn(&E) -> T) -> Envelope<T> {
    Envelope {
        content: items.iter().map(assemble).collect(),
    }
}

#[derive(Serialize, Debug)]
pub struct NoteResource {
    pub title: String,
    pub body: String,
    /// Tag locations, in the note's order.
    pub tags: Vec<String>,
    #[serde(rename = "_links")]
    pub links: Links,
}

pub fn note_resource(links_to: &LinkBuilder, note: &Note) -> NoteResource {
    NoteResource {
        title: note.title.clone(),
        body: note.body.clone(),
        tags: note.tag_ids.iter().map(|id| links_to.tag(*id)).collect(),
        links: links([
            (REL_SELF, links_to.note(note.id)),
            (REL_NOTE_TAGS, links_to.note_tags(note.id)),
        ]),
    }
}

pub fn note_resources(links_to: &LinkBuilder, notes: &[Note]) -> Envelope<NoteResource> {
    envelope(notes, |note| note_resource(links_to, note))
}

#[derive(Serialize, Debug)]
pub struct TagResource {
    pub name: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

pub fn tag_resource(links_to: &LinkBuilder, tag: &Tag) -> TagResource {
    TagResource {
        name: tag.name.clone(),
        links: links([
            (REL_SELF, links_to.tag(tag.id)),
            (REL_TAGGED_NOTES, links_to.tagged_notes(tag.id)),
        ]),
    }
}

pub fn tag_resources(links_to: &LinkBuilder, tags: &[Tag]) -> Envelope<TagResource> {
    envelope(tags, |tag| tag_resource(links_to, tag))
}

/// Entry point listing the top-level collections.
#[derive(Serialize, Debug)]
pub struct IndexResource {
    #[serde(rename = "_links")]
    pub links: Links,
}

pub fn index_resource(links_to: &LinkBuilder) -> IndexResource {
    IndexResource {
        links: links([("notes", links_to.notes()), ("tags", links_to.tags())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_note() -> Note {
        Note {
            id: 4,
            title: "A".into(),
            body: "B".into(),
            tag_ids: vec![2, 1],
        }
    }

    #[test]
    fn note_resource_carries_self_and_tags_links() {
        let value = serde_json::to_value(note_resource(&LinkBuilder::default(), &sample_note())).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "A",
                "body": "B",
                "tags": ["/tags/2", "/tags/1"],
                "_links": {
                    "self": { "href": "/notes/4" },
                    "note-tags": { "href": "/notes/4/tags" }
                }
            })
        );
    }

    #[test]
    fn links_use_the_public_base() {
        let builder = LinkBuilder::new("http://notes.example/");
        let tag = Tag { id: 3, name: "rust".into() };
        let resource = tag_resource(&builder, &tag);
        assert_eq!(resource.links[REL_SELF].href, "http://notes.example/tags/3");
        assert_eq!(
            resource.links[REL_TAGGED_NOTES].href,
            "http://notes.example/tags/3/notes"
        );
    }

    #[test]
    fn envelope_keeps_order() {
        let tags = vec![
            Tag { id: 9, name: "z".into() },
            Tag { id: 1, name: "a".into() },
        ];
        let value = serde_json::to_value(tag_resources(&LinkBuilder::default(), &tags)).unwrap();
        let names: Vec<&str> = value["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn same_state_yields_same_representation() {
        let builder = LinkBuilder::default();
        let first = serde_json::to_string(&note_resource(&builder, &sample_note())).unwrap();
        let second = serde_json::to_string(&note_resource(&builder, &sample_note())).unwrap();
        assert_eq!(first, second);
    }
}
