use serde::Serialize;
use uuid::Uuid;

/// A user viewed as a channel, with its subscription aggregates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    /// Whether the requesting viewer subscribes to this channel. Always
    /// false for anonymous viewers.
    pub is_subscribed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_profile_serializes_camel_case_counts() {
        let profile = ChannelProfile {
            id: Uuid::new_v4(),
            username: "bob".into(),
            full_name: "Bob Doe".into(),
            email: "bob@example.com".into(),
            avatar_url: "https://media.local/avatars/bob/a.png".into(),
            cover_image_url: None,
            subscribers_count: 2,
            channels_subscribed_to_count: 0,
            is_subscribed: false,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"subscribersCount\":2"));
        assert!(json.contains("\"channelsSubscribedToCount\":0"));
        assert!(json.contains("\"isSubscribed\":false"));
    }
}
