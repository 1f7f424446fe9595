use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::state::AppState;

/// One uploaded file pulled out of a multipart form.
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Upload an image under `{prefix}/{owner}/` and return its hosted URL.
pub async fn store_image(
    state: &AppState,
    prefix: &str,
    owner: &str,
    item: UploadItem,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(&item.content_type).unwrap_or("bin");
    let key = format!("{}/{}/{}.{}", prefix, owner, Uuid::new_v4(), ext);
    let url = state
        .media
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(url)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[tokio::test]
    async fn store_image_builds_scoped_key() {
        let state = AppState::fake();
        let item = UploadItem {
            body: Bytes::from_static(b"fake-png"),
            content_type: "image/png".into(),
        };

        let url = store_image(&state, "avatars", "alice", item).await.unwrap();
        assert!(url.starts_with("https://fake.local/avatars/alice/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn store_image_falls_back_to_bin_extension() {
        let state = AppState::fake();
        let item = UploadItem {
            body: Bytes::from_static(b"blob"),
            content_type: "application/octet-stream".into(),
        };

        let url = store_image(&state, "covers", "bob", item).await.unwrap();
        assert!(url.ends_with(".bin"));
    }
}
