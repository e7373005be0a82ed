use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{db::now, entity::audit_logs::ActiveModel as AuditActive};

/// Records an audit row. Failures are logged and swallowed; the action being
/// audited has already been committed.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    actor_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    let row = AuditActive {
        id: Set(Uuid::new_v4()),
        actor_id: Set(actor_id),
        action: Set(action.to_string()),
        resource: Set(resource.to_string()),
        metadata: Set(metadata),
        created_at: Set(now()),
    };
    if let Err(err) = row.insert(conn).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
