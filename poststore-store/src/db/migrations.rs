//! Schema for the posts, channels and channel_members tables

use sqlx::PgPool;

/// Create every table and index if missing
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running post store migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id VARCHAR(26) PRIMARY KEY,
            create_at BIGINT NOT NULL,
            update_at BIGINT NOT NULL,
            delete_at BIGINT NOT NULL DEFAULT 0,
            user_id VARCHAR(26) NOT NULL,
            channel_id VARCHAR(26) NOT NULL,
            root_id VARCHAR(26) NOT NULL DEFAULT '',
            parent_id VARCHAR(26) NOT NULL DEFAULT '',
            original_id VARCHAR(26) NOT NULL DEFAULT '',
            message VARCHAR(4000) NOT NULL DEFAULT '',
            post_type VARCHAR(26) NOT NULL DEFAULT '',
            props VARCHAR(4000) NOT NULL DEFAULT '{}',
            hashtags VARCHAR(1000) NOT NULL DEFAULT '',
            filenames VARCHAR(4000) NOT NULL DEFAULT '[]',
            img_count BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channels (
            id VARCHAR(26) PRIMARY KEY,
            team_id VARCHAR(26) NOT NULL,
            last_post_at BIGINT NOT NULL DEFAULT 0,
            total_msg_count BIGINT NOT NULL DEFAULT 0,
            delete_at BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channel_members (
            channel_id VARCHAR(26) NOT NULL,
            user_id VARCHAR(26) NOT NULL,
            PRIMARY KEY (channel_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Post store migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_posts_update_at ON posts(update_at)",
        "CREATE INDEX IF NOT EXISTS idx_posts_create_at ON posts(create_at)",
        "CREATE INDEX IF NOT EXISTS idx_posts_channel_id ON posts(channel_id)",
        "CREATE INDEX IF NOT EXISTS idx_posts_root_id ON posts(root_id)",
        "CREATE INDEX IF NOT EXISTS idx_posts_message_txt ON posts USING gin(to_tsvector('simple', message))",
        "CREATE INDEX IF NOT EXISTS idx_posts_hashtags_txt ON posts USING gin(to_tsvector('simple', hashtags))",
        "CREATE INDEX IF NOT EXISTS idx_channel_members_user ON channel_members(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_channels_team ON channels(team_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
