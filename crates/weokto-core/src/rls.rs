//! Row-level-security context for pooled Postgres connections.
//!
//! Policies on tenant tables read `app.current_<tenant>_user_id`. The variable
//! is set with `set_config(.., true)`, the bindable form of `SET LOCAL`, so it
//! only lives for the surrounding transaction. Handlers must go through
//! [`with_user_context`]; it clears both variables on every exit path before
//! the connection returns to the pool.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, Statement, TransactionTrait,
};
use uuid::Uuid;

use weokto_domain::tenant::Tenant;

pub const WEOKTO_USER_VAR: &str = "app.current_weokto_user_id";
pub const STAM_USER_VAR: &str = "app.current_stam_user_id";

pub fn user_var(tenant: Tenant) -> &'static str {
    match tenant {
        Tenant::Weokto => WEOKTO_USER_VAR,
        Tenant::Stam => STAM_USER_VAR,
    }
}

/// Scope the tenant's RLS variable to `user_id` for the current transaction.
pub async fn set_user_context<C>(conn: &C, tenant: Tenant, user_id: Uuid) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let stmt = Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT set_config($1, $2, true)",
        [user_var(tenant).into(), user_id.to_string().into()],
    );
    conn.execute(stmt).await?;
    Ok(())
}

/// Reset both tenant variables, whichever one was set.
pub async fn clear_user_context<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let sql = format!(
        "SELECT set_config('{WEOKTO_USER_VAR}', '', true), set_config('{STAM_USER_VAR}', '', true)"
    );
    conn.execute(Statement::from_string(conn.get_database_backend(), sql))
        .await?;
    Ok(())
}

/// Run `f` inside a transaction scoped to `user_id` for `tenant`.
///
/// The context is cleared after `f` returns, success or error. The
/// transaction commits only when both `f` and the clear succeed.
pub async fn with_user_context<F, T, E>(
    db: &DatabaseConnection,
    tenant: Tenant,
    user_id: Uuid,
    f: F,
) -> Result<T, E>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
        + Send,
    T: Send,
    E: From<DbErr>,
{
    let txn = db.begin().await?;

    if let Err(e) = set_user_context(&txn, tenant, user_id).await {
        rollback(txn).await;
        return Err(e.into());
    }

    let result = f(&txn).await;
    let cleared = clear_user_context(&txn).await;

    match (result, cleared) {
        (Ok(value), Ok(())) => {
            txn.commit().await?;
            Ok(value)
        }
        (Ok(_), Err(e)) => {
            rollback(txn).await;
            Err(e.into())
        }
        (Err(e), cleared) => {
            if let Err(clear_err) = cleared {
                tracing::warn!(error = %clear_err, %tenant, "failed to clear rls context");
            }
            rollback(txn).await;
            Err(e)
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}
