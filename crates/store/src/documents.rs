use chrono::Utc;
use eyre::Result;
use geomark_core::models::{DocumentPatch, UserDocument};
use sqlx::{Pool, Postgres};

pub async fn read_document(pool: &Pool<Postgres>, user_id: &str) -> Result<Option<UserDocument>> {
    tracing::debug!("Reading document for user: {}", user_id);

    let row: Option<(serde_json::Value,)> = sqlx::query_as(
        r#"
        SELECT doc
        FROM user_documents
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((doc,)) => {
            tracing::debug!("Document found for user: {}", user_id);
            Ok(Some(serde_json::from_value(doc)?))
        }
        None => {
            tracing::debug!("No document for user: {}", user_id);
            Ok(None)
        }
    }
}

/// Writes the fields named by the patch; unnamed fields keep their stored
/// value. Top-level JSONB concatenation gives exactly that merge.
pub async fn merge_document(
    pool: &Pool<Postgres>,
    user_id: &str,
    patch: &DocumentPatch,
) -> Result<()> {
    let fields = serde_json::to_value(patch)?;
    let now = Utc::now();

    tracing::debug!("Merging document fields for user: {}", user_id);

    sqlx::query(
        r#"
        INSERT INTO user_documents (user_id, doc, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id)
        DO UPDATE SET doc = user_documents.doc || EXCLUDED.doc, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(user_id)
    .bind(&fields)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
