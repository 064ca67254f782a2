use derive_new::new;
use serde::{Deserialize, Serialize};

/// Caller-supplied primary key of a video.
pub type VideoId = i64;

/// A stored video, serialized as `{"id", "name", "views", "likes"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Video {
    pub id: VideoId,
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

impl std::fmt::Display for Video {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Video(name={}, views={}, likes={})",
            self.name, self.views, self.likes
        )
    }
}

/// Every field needed to create a video, the id comes from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct NewVideo {
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

/// A partial update. Fields left as `None` are not serialized, so merging this into a record keeps their old value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct VideoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.views.is_none() && self.likes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_matches_log_format() {
        let video = Video::new(3, "cats".into(), 120, 7);
        assert_eq!(video.to_string(), "Video(name=cats, views=120, likes=7)");
    }

    #[test]
    fn patch_only_serializes_supplied_fields() {
        let patch = VideoPatch::new(None, None, Some(10));
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "likes": 10 }));
        assert!(!patch.is_empty());
        assert!(VideoPatch::default().is_empty());
    }
}
