use std::env;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    /// Connects to the Postgres named by `STOREFRONT_TEST_DATABASE_URL`,
    /// applies migrations and empties the tables. Returns `None` (with a
    /// notice) when the variable is unset so the default test run stays
    /// hermetic.
    pub async fn setup() -> Result<Option<Self>> {
        let Ok(database_url) = env::var("STOREFRONT_TEST_DATABASE_URL") else {
            eprintln!(
                "Skipping storefront integration tests: set STOREFRONT_TEST_DATABASE_URL to run them.",
            );
            return Ok(None);
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        sqlx::query("TRUNCATE users, orders, products, reviews, product_reviews, carts")
            .execute(&pool)
            .await?;

        Ok(Some(Self { pool }))
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub async fn teardown(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
