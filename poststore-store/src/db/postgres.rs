//! sqlx backend over the posts, channels and channel_members tables

use async_trait::async_trait;
use poststore_core::search::{to_tsquery, SEARCH_LIMIT};
use poststore_core::{Channel, Post, SearchField, SearchWord};
use sqlx::{FromRow, PgPool};

use crate::backend::{BackendError, PostBackend};

const POST_COLUMNS: &str = "id, create_at, update_at, delete_at, user_id, channel_id, \
    root_id, parent_id, original_id, message, post_type, props, hashtags, filenames, img_count";

/// Post row as stored; `props` and `filenames` are JSON text
#[derive(Debug, Clone, FromRow)]
struct PostRow {
    id: String,
    create_at: i64,
    update_at: i64,
    delete_at: i64,
    user_id: String,
    channel_id: String,
    root_id: String,
    parent_id: String,
    original_id: String,
    message: String,
    post_type: String,
    props: String,
    hashtags: String,
    filenames: String,
    img_count: i64,
}

impl TryFrom<PostRow> for Post {
    type Error = BackendError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let props = decode_json("props", &row.id, &row.props)?;
        let filenames = decode_json("filenames", &row.id, &row.filenames)?;

        Ok(Post {
            id: row.id,
            create_at: row.create_at,
            update_at: row.update_at,
            delete_at: row.delete_at,
            user_id: row.user_id,
            channel_id: row.channel_id,
            root_id: row.root_id,
            parent_id: row.parent_id,
            original_id: row.original_id,
            message: row.message,
            post_type: row.post_type,
            props,
            hashtags: row.hashtags,
            filenames,
            img_count: row.img_count,
        })
    }
}

fn decode_json<T: serde::de::DeserializeOwned + Default>(
    column: &'static str,
    id: &str,
    raw: &str,
) -> Result<T, BackendError> {
    if raw.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(raw).map_err(|source| BackendError::Decode {
        column,
        id: id.to_owned(),
        source,
    })
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, BackendError> {
    rows.into_iter().map(Post::try_from).collect()
}

/// Postgres implementation of [`PostBackend`]
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PostBackend for PgBackend {
    async fn insert_post(&self, post: &Post) -> Result<(), BackendError> {
        let props = post.props_json()?;
        let filenames = post.filenames_json()?;

        let result = sqlx::query(&format!(
            "INSERT INTO posts ({POST_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(&post.id)
        .bind(post.create_at)
        .bind(post.update_at)
        .bind(post.delete_at)
        .bind(&post.user_id)
        .bind(&post.channel_id)
        .bind(&post.root_id)
        .bind(&post.parent_id)
        .bind(&post.original_id)
        .bind(&post.message)
        .bind(&post.post_type)
        .bind(props)
        .bind(&post.hashtags)
        .bind(filenames)
        .bind(post.img_count)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(BackendError::Duplicate(post.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_post(&self, post: &Post) -> Result<u64, BackendError> {
        let props = post.props_json()?;
        let filenames = post.filenames_json()?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET
                create_at = $2, update_at = $3, delete_at = $4,
                user_id = $5, channel_id = $6, root_id = $7, parent_id = $8,
                original_id = $9, message = $10, post_type = $11, props = $12,
                hashtags = $13, filenames = $14, img_count = $15
            WHERE id = $1
            "#,
        )
        .bind(&post.id)
        .bind(post.create_at)
        .bind(post.update_at)
        .bind(post.delete_at)
        .bind(&post.user_id)
        .bind(&post.channel_id)
        .bind(&post.root_id)
        .bind(&post.parent_id)
        .bind(&post.original_id)
        .bind(&post.message)
        .bind(&post.post_type)
        .bind(props)
        .bind(&post.hashtags)
        .bind(filenames)
        .bind(post.img_count)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn bump_channel(
        &self,
        channel_id: &str,
        at: i64,
        new_messages: i64,
    ) -> Result<u64, BackendError> {
        let result = sqlx::query(
            r#"
            UPDATE channels
            SET last_post_at = $2, total_msg_count = total_msg_count + $3
            WHERE id = $1
            "#,
        )
        .bind(channel_id)
        .bind(at)
        .bind(new_messages)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn touch_post(&self, id: &str, at: i64) -> Result<u64, BackendError> {
        let result = sqlx::query("UPDATE posts SET update_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete_thread(&self, post_id: &str, at: i64) -> Result<u64, BackendError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET delete_at = $2, update_at = $2
            WHERE (id = $1 OR parent_id = $1 OR root_id = $1) AND delete_at = 0
            "#,
        )
        .bind(post_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn live_post(&self, id: &str) -> Result<Option<Post>, BackendError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND delete_at = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn thread_posts(&self, root_id: &str) -> Result<Vec<Post>, BackendError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE (id = $1 OR root_id = $1) AND delete_at = 0 \
             ORDER BY create_at ASC"
        ))
        .bind(root_id)
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn page_window(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE channel_id = $1 AND delete_at = 0 \
             ORDER BY create_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(channel_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn page_threads(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError> {
        // A root's thread key is its own id; a reply's is its root_id
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "WITH page_threads AS ( \
                 SELECT COALESCE(NULLIF(root_id, ''), id) AS thread_id FROM posts \
                 WHERE channel_id = $1 AND delete_at = 0 \
                 ORDER BY create_at DESC \
                 LIMIT $2 OFFSET $3 \
             ) \
             SELECT {POST_COLUMNS} FROM posts \
             WHERE channel_id = $1 AND delete_at = 0 \
               AND COALESCE(NULLIF(root_id, ''), id) IN (SELECT thread_id FROM page_threads) \
             ORDER BY create_at ASC"
        ))
        .bind(channel_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn search_posts(
        &self,
        team_id: &str,
        user_id: &str,
        field: SearchField,
        words: &[SearchWord],
    ) -> Result<Vec<Post>, BackendError> {
        let Some(tsquery) = to_tsquery(words) else {
            return Ok(Vec::new());
        };

        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE delete_at = 0 \
               AND channel_id IN ( \
                   SELECT c.id FROM channels c \
                   JOIN channel_members m ON m.channel_id = c.id \
                   WHERE c.team_id = $1 AND m.user_id = $2 AND c.delete_at = 0 \
               ) \
               AND to_tsvector('simple', {column}) @@ to_tsquery('simple', $3) \
             ORDER BY create_at DESC \
             LIMIT $4",
            column = field.column(),
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(tsquery)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn latest_update(&self, channel_id: &str) -> Result<Option<(String, i64)>, BackendError> {
        let row: Option<(String, i64)> = sqlx::query_as(
            r#"
            SELECT id, update_at FROM posts
            WHERE channel_id = $1 AND delete_at = 0
            ORDER BY update_at DESC
            LIMIT 1
            "#,
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_channel(&self, channel: &Channel) -> Result<(), BackendError> {
        sqlx::query(
            r#"
            INSERT INTO channels (id, team_id, last_post_at, total_msg_count, delete_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                team_id = EXCLUDED.team_id,
                last_post_at = EXCLUDED.last_post_at,
                total_msg_count = EXCLUDED.total_msg_count,
                delete_at = EXCLUDED.delete_at
            "#,
        )
        .bind(&channel.id)
        .bind(&channel.team_id)
        .bind(channel.last_post_at)
        .bind(channel.total_msg_count)
        .bind(channel.delete_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_channel_member(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(), BackendError> {
        sqlx::query(
            r#"
            INSERT INTO channel_members (channel_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(channel_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_channel(&self, id: &str) -> Result<Option<Channel>, BackendError> {
        let row: Option<(String, String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, team_id, last_post_at, total_msg_count, delete_at
            FROM channels WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, team_id, last_post_at, total_msg_count, delete_at)| Channel {
                id,
                team_id,
                last_post_at,
                total_msg_count,
                delete_at,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poststore_core::new_id;

    fn row(props: &str, filenames: &str) -> PostRow {
        PostRow {
            id: new_id(),
            create_at: 1,
            update_at: 1,
            delete_at: 0,
            user_id: new_id(),
            channel_id: new_id(),
            root_id: String::new(),
            parent_id: String::new(),
            original_id: String::new(),
            message: "hi".into(),
            post_type: String::new(),
            props: props.into(),
            hashtags: String::new(),
            filenames: filenames.into(),
            img_count: 0,
        }
    }

    #[test]
    fn row_decodes_json_columns() {
        let post = Post::try_from(row(r#"{"from_webhook":"true"}"#, r#"["a.txt"]"#)).unwrap();
        assert_eq!(post.props.get("from_webhook").map(String::as_str), Some("true"));
        assert_eq!(post.filenames, vec!["a.txt".to_string()]);
    }

    #[test]
    fn empty_json_columns_decode_to_defaults() {
        let post = Post::try_from(row("", "")).unwrap();
        assert!(post.props.is_empty());
        assert!(post.filenames.is_empty());
    }

    #[test]
    fn corrupt_json_names_column() {
        let err = Post::try_from(row("{}", "not json")).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Decode {
                column: "filenames",
                ..
            }
        ));
    }

    async fn backend() -> PgBackend {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");
        PgBackend::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_then_read_back() {
        let db = backend().await;
        let mut post = Post::new(new_id(), new_id(), "round trip #tag").with_hashtags("#tag");
        post.pre_save();
        db.insert_post(&post).await.unwrap();

        let stored = db.live_post(&post.id).await.unwrap().expect("post stored");
        assert_eq!(stored, post);

        let err = db.insert_post(&post).await.unwrap_err();
        assert!(matches!(err, BackendError::Duplicate(_)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn page_threads_pulls_in_replies() {
        let db = backend().await;
        let channel = new_id();
        let user = new_id();

        let mut root = Post::new(&channel, &user, "root");
        root.create_at = 10;
        root.pre_save();
        let mut reply = Post::new(&channel, &user, "reply").reply_to(&root.id, &root.id);
        reply.create_at = 40;
        reply.pre_save();
        db.insert_post(&root).await.unwrap();
        db.insert_post(&reply).await.unwrap();

        let posts = db.page_threads(&channel, 0, 1).await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![root.id.as_str(), reply.id.as_str()]);
    }
}
