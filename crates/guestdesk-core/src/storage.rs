use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::debug;

use crate::{dates::ISO_DATE, guest::GuestRecord, Error, Result};

const INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS guests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    address TEXT NOT NULL,
    country TEXT NOT NULL,
    check_in_date TEXT NOT NULL
);
"#;

type GuestRow = (i64, String, String, String, String, String, String);

pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn open(path: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{path}?mode=rwc"))
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Inserts a guest and returns its new id. Any id on `guest` is ignored.
    pub async fn add_guest(&self, guest: &GuestRecord) -> Result<i64> {
        guest.validate_for_storage()?;

        let id = sqlx::query(
            r#"
            INSERT INTO guests (first_name, last_name, date_of_birth, address, country, check_in_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(guest.date_of_birth.format(ISO_DATE).to_string())
        .bind(&guest.address)
        .bind(&guest.country)
        .bind(guest.check_in_date.to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, "Stored guest");
        Ok(id)
    }

    /// All guests, oldest first.
    pub async fn list_guests(&self) -> Result<Vec<GuestRecord>> {
        let rows: Vec<GuestRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, date_of_birth, address, country, check_in_date
            FROM guests ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(parse_guest_row).collect()
    }

    pub async fn get_guest(&self, id: i64) -> Result<Option<GuestRecord>> {
        let row: Option<GuestRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, date_of_birth, address, country, check_in_date
            FROM guests WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(parse_guest_row).transpose()
    }
}

fn parse_guest_row(row: GuestRow) -> Result<GuestRecord> {
    let (id, first_name, last_name, date_of_birth, address, country, check_in_date) = row;
    let corrupt = |reason: String| Error::CorruptRow { id, reason };

    Ok(GuestRecord {
        id: Some(id),
        first_name,
        last_name,
        date_of_birth: NaiveDate::parse_from_str(&date_of_birth, ISO_DATE)
            .map_err(|e| corrupt(format!("date_of_birth {date_of_birth:?}: {e}")))?,
        address,
        country,
        check_in_date: DateTime::parse_from_rfc3339(&check_in_date)
            .map_err(|e| corrupt(format!("check_in_date {check_in_date:?}: {e}")))?
            .with_timezone(&Utc),
    })
}
