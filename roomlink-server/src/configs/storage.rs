use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, SqlitePool};

use crate::configs::Database;
use crate::models::{ReadingTable, Table};

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(10)
            .connect(&database.url)
            .await?;

        let tables: [&dyn Table; 1] = [&ReadingTable];
        Self::create_schema(&pool, &tables, database.clean_start).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(pool: &SqlitePool, tables: &[&dyn Table], clean_start: bool) -> Result<(), Error> {
        if clean_start {
            for table in tables.iter().rev() {
                sqlx::query(&table.dispose()).execute(pool).await?;
            }

            tracing::warn!("perform a clean boot: clean and recreate schema");
        }

        for table in tables {
            sqlx::query(&table.create()).execute(pool).await?;
            tracing::debug!("table {} ready", table.name());
        }

        Ok(())
    }
}
