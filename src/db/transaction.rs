/*!
 * Transaction helper
 *
 * Runs a closure inside a database transaction. The closure's own error type
 * is preserved so services can abort with `NotFound` or `ValidationError`
 * and still get a rollback.
 */

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// Commits when the closure returns `Ok`, rolls back otherwise.
///
/// ```rust,ignore
/// let invoice = with_transaction(&db, |txn| {
///     Box::pin(async move {
///         let invoice = new_invoice.insert(txn).await?;
///         pos_invoice_product::Entity::insert_many(lines).exec_without_returning(txn).await?;
///         Ok(invoice)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T, E>(db: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<T, E>> + Send,
    T: Send,
    E: From<DbErr> + std::error::Error + Send,
{
    let result = db.transaction::<_, T, E>(f).await;

    match result {
        Ok(value) => {
            debug!("Transaction committed");
            Ok(value)
        }
        Err(TransactionError::Connection(db_err)) => {
            warn!(error = %db_err, "Transaction aborted by connection error");
            Err(E::from(db_err))
        }
        Err(TransactionError::Transaction(err)) => {
            debug!(error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}
