//! Turns client-supplied tag locations (`/tags/{id}`) into stored tags.

use http::Uri;

use crate::assembler::LinkBuilder;
use crate::error::ApiError;
use crate::models::Tag;
use crate::store::NoteStore;

const TAG_PATH_PREFIX: &str = "/tags/";

/// Extracts the id from a tag location.
///
/// Accepts a root-relative path `/tags/{id}`, or an absolute URI made of the
/// configured public base followed by `/tags/{id}`. `{id}` must be a positive
/// decimal integer. Absolute URIs are rejected when no public base is set.
pub fn extract_tag_id(location: &str, links: &LinkBuilder) -> Result<i64, ApiError> {
    let invalid = || ApiError::InvalidReference(location.to_string());

    let uri: Uri = location.parse().map_err(|_| invalid())?;
    if uri.query().is_some() || location.contains('#') {
        return Err(invalid());
    }

    let path = match uri.authority() {
        None => uri.path(),
        Some(_) if !links.base().is_empty() => {
            location.strip_prefix(links.base()).ok_or_else(invalid)?
        }
        Some(_) => return Err(invalid()),
    };

    let segment = path.strip_prefix(TAG_PATH_PREFIX).ok_or_else(invalid)?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match segment.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

/// Resolves every location to its tag, preserving input order.
///
/// Stops at the first location that is malformed or names a missing tag.
pub async fn resolve_tags(
    store: &dyn NoteStore,
    links: &LinkBuilder,
    locations: &[String],
) -> Result<Vec<Tag>, ApiError> {
    let mut tags = Vec::with_capacity(locations.len());
    for location in locations {
        let id = extract_tag_id(location, links)?;
        let tag = store
            .find_tag(id)
            .await?
            .ok_or_else(|| ApiError::UnknownTag(location.clone()))?;
        tags.push(tag);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn extracts_id_from_path_and_absolute_uri() {
        let links = LinkBuilder::new("http://localhost:5600");
        assert_eq!(extract_tag_id("/tags/7", &LinkBuilder::default()).unwrap(), 7);
        assert_eq!(extract_tag_id("/tags/7", &links).unwrap(), 7);
        assert_eq!(extract_tag_id("http://localhost:5600/tags/12", &links).unwrap(), 12);
    }

    #[test]
    fn absolute_uri_must_match_public_base() {
        let links = LinkBuilder::new("http://notes.example");
        for location in [
            "http://evil.example/tags/1",
            "https://notes.example/tags/1",
            "http://notes.example.evil/tags/1",
            "http://notes.example/tags/1#frag",
        ] {
            assert!(
                matches!(extract_tag_id(location, &links), Err(ApiError::InvalidReference(_))),
                "expected {location:?} to be rejected"
            );
        }

        // without a public base every absolute URI is foreign
        assert!(matches!(
            extract_tag_id("http://notes.example/tags/1", &LinkBuilder::default()),
            Err(ApiError::InvalidReference(_))
        ));
    }

    #[test]
    fn rejects_locations_outside_the_template() {
        for location in [
            "",
            "/tags/",
            "/tags/abc",
            "/tags/0",
            "/tags/-1",
            "/tags/+1",
            "/tags/1/notes",
            "/tags/1?x=2",
            "/notes/1",
            "tags/1",
            "/tags/99999999999999999999",
            "not a uri",
        ] {
            assert!(
                matches!(extract_tag_id(location, &LinkBuilder::default()), Err(ApiError::InvalidReference(_))),
                "expected {location:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn resolves_in_input_order() {
        let store = MemoryStore::new();
        let a = store.insert_tag("a".into()).await.unwrap();
        let b = store.insert_tag("b".into()).await.unwrap();

        let locations = vec![format!("/tags/{}", b.id), format!("/tags/{}", a.id)];
        let tags = resolve_tags(&store, &LinkBuilder::default(), &locations).await.unwrap();
        assert_eq!(tags, vec![b, a]);
    }

    #[tokio::test]
    async fn missing_tag_is_unknown() {
        let store = MemoryStore::new();
        let err = resolve_tags(&store, &LinkBuilder::default(), &["/tags/999".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownTag(ref loc) if loc == "/tags/999"));
    }

    #[tokio::test]
    async fn first_bad_location_wins() {
        let store = MemoryStore::new();
        let locations = vec!["/tags/oops".to_string(), "/tags/999".to_string()];
        let err = resolve_tags(&store, &LinkBuilder::default(), &locations).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidReference(_)));
    }
}
