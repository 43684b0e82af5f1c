/// Postgres plumbing
///
/// - `pool`: connection pool with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Query code lives with the models; [`crate::store::postgres::PgStore`] wraps
/// the pool for the services.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod pool;
pub mod migrations;
