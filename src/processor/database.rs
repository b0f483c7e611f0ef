//! Database sink and read-back query
//!
//! One PostgreSQL connection is opened for the load phase, reused for the
//! query phase and closed explicitly at the end of the run. Loading replaces
//! the target table wholesale: drop, create, then batched multi-row inserts.
//! The statements do not share a transaction, so a failure part-way through
//! leaves the table in whatever state the last statement produced.

use crate::config::EtlConfig;
use crate::constants::{HEIGHT_COLUMN, NAME_COLUMN, WEIGHT_COLUMN};
use crate::error::{EtlError, Result};
use crate::models::{Record, Table};

use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Connection, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

/// `DROP TABLE IF EXISTS <table>`
pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table_name)
}

/// `CREATE TABLE <table> (...)` with the record columns
pub fn create_table_sql(table_name: &str) -> String {
    format!(
        "CREATE TABLE {} ({} TEXT, {} DOUBLE PRECISION, {} DOUBLE PRECISION)",
        table_name, NAME_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN
    )
}

/// Prefix of every batched insert; values are appended by the query builder
pub fn insert_prefix_sql(table_name: &str) -> String {
    format!(
        "INSERT INTO {} ({}, {}, {}) ",
        table_name, NAME_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN
    )
}

/// The fixed read-back statement
pub fn select_all_sql(table_name: &str) -> String {
    format!("SELECT * FROM {}", table_name)
}

/// Open connection plus the table it writes to
pub struct Database {
    conn: PgConnection,
    table_name: String,
    batch_size: usize,
}

impl Database {
    /// Connect using the database settings of `config`
    pub async fn connect(config: &EtlConfig) -> Result<Self> {
        config.validate()?;
        let options = config.database.connect_options()?;

        debug!(
            "Connecting to database {} on {}:{}",
            config.database.name, config.database.host, config.database.port
        );
        let conn = PgConnection::connect_with(&options).await?;

        Ok(Self {
            conn,
            table_name: config.table_name.clone(),
            batch_size: config.insert_batch_size,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Replace the table's contents with `table`. Returns the rows inserted.
    pub async fn replace_table(&mut self, table: &Table) -> Result<u64> {
        sqlx::query(&drop_table_sql(&self.table_name))
            .execute(&mut self.conn)
            .await?;
        sqlx::query(&create_table_sql(&self.table_name))
            .execute(&mut self.conn)
            .await?;

        let records = table.records()?;
        let prefix = insert_prefix_sql(&self.table_name);
        let mut inserted = 0u64;

        for chunk in records.chunks(self.batch_size) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(prefix.as_str());
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.name.clone())
                    .push_bind(record.height)
                    .push_bind(record.weight);
            });

            let result = builder.build().execute(&mut self.conn).await?;
            inserted += result.rows_affected();
        }

        info!("Loaded {} rows into table '{}'", inserted, self.table_name);
        Ok(inserted)
    }

    /// Run `SELECT * FROM <table>` and return the rows as a table
    pub async fn query_table(&mut self) -> Result<Table> {
        let rows = sqlx::query(&select_all_sql(&self.table_name))
            .fetch_all(&mut self.conn)
            .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;

        debug!("Query returned {} rows", records.len());
        Table::from_records(&records)
    }

    /// Close the connection
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(EtlError::from)
    }
}

fn record_from_row(row: &PgRow) -> Result<Record> {
    Ok(Record {
        name: row.try_get(NAME_COLUMN)?,
        height: row.try_get(HEIGHT_COLUMN)?,
        weight: row.try_get(WEIGHT_COLUMN)?,
    })
}
