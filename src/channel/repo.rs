use sqlx::PgPool;
use uuid::Uuid;

/// Number of subscriptions pointing at this user as the channel.
pub async fn subscriber_count(db: &PgPool, channel_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM subscriptions
        WHERE channel_id = $1
        "#,
    )
    .bind(channel_id)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Number of channels this user subscribes to.
pub async fn subscribed_to_count(db: &PgPool, subscriber_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM subscriptions
        WHERE subscriber_id = $1
        "#,
    )
    .bind(subscriber_id)
    .fetch_one(db)
    .await?;
    Ok(count)
}

pub async fn is_subscribed(
    db: &PgPool,
    channel_id: Uuid,
    subscriber_id: Uuid,
) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM subscriptions
            WHERE channel_id = $1 AND subscriber_id = $2
        )
        "#,
    )
    .bind(channel_id)
    .bind(subscriber_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
