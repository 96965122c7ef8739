use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::{FulfillmentRecord, FulfillmentStatus, FulfillmentUpdate, SessionId};

/// Inserts a `Pending` record for the session unless one already exists. Returns true if a row was written.
pub async fn claim(session_id: &SessionId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO fulfillments (session_id, status) VALUES ($1, 'Pending') ON CONFLICT(session_id) DO NOTHING",
    )
    .bind(session_id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Moves a `Pending` record into a terminal state. Returns `None` if there is no pending record for the session.
pub async fn update(
    session_id: &SessionId,
    update: FulfillmentUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<FulfillmentRecord>, sqlx::Error> {
    let status = update.status();
    let (supplier_order_id, detail) = match update {
        FulfillmentUpdate::Placed { supplier_order_id } => (Some(supplier_order_id), None),
        FulfillmentUpdate::Failed { detail } => (None, Some(detail)),
    };
    let record = sqlx::query_as(
        r#"
            UPDATE fulfillments SET
                status = $2,
                supplier_order_id = $3,
                detail = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE session_id = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(session_id.as_str())
    .bind(status.to_string())
    .bind(supplier_order_id)
    .bind(detail)
    .fetch_optional(conn)
    .await?;
    Ok(record)
}

pub async fn fetch(session_id: &SessionId, conn: &mut SqliteConnection) -> Result<Option<FulfillmentRecord>, sqlx::Error> {
    let record = sqlx::query_as("SELECT * FROM fulfillments WHERE session_id = $1")
        .bind(session_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

pub async fn search(
    status: Option<FulfillmentStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<FulfillmentRecord>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM fulfillments");
    if let Some(status) = status {
        builder.push(" WHERE status = ").push_bind(status.to_string());
    }
    builder.push(" ORDER BY created_at DESC, session_id ASC");
    let records = builder.build_query_as::<FulfillmentRecord>().fetch_all(conn).await?;
    Ok(records)
}
