//! SQLite-backed persistence for wallets, cards and collections.
//!
//! Both wallet writes the pack flow depends on are single conditional
//! `UPDATE ... RETURNING` statements, so SQLite performs each check and write
//! atomically.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use mindspark_domain::{
    Card, CardId, CollectionEntry, CollectionEntryId, PackOpeningId, PityState, PlayerId, Wallet,
};

use crate::infrastructure::ports::{
    CardRepo, ClockPort, CollectionRepo, DebitOutcome, RepoError, WalletRepo,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS wallets (
        player_id TEXT PRIMARY KEY,
        balance INTEGER NOT NULL CHECK (balance >= 0),
        pity_counter INTEGER NOT NULL DEFAULT 0,
        pity_revision INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cards (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        cost INTEGER NOT NULL,
        power INTEGER NOT NULL,
        defense INTEGER NOT NULL,
        element TEXT NOT NULL,
        category TEXT NOT NULL,
        rarity TEXT NOT NULL,
        theme TEXT NOT NULL,
        image_prompt TEXT NOT NULL,
        image_url TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collection_entries (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL,
        card_id TEXT NOT NULL REFERENCES cards(id),
        pack_opening_id TEXT,
        acquired_at TEXT NOT NULL,
        UNIQUE (player_id, card_id)
    )
    "#,
];

const WALLET_COLUMNS: &str = "player_id, balance, pity_counter, pity_revision, updated_at";

/// SQLite implementation of the wallet, card and collection ports.
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool, clock).await
    }

    /// Private in-memory database. Pinned to one connection so every query sees it.
    pub async fn in_memory(clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool, clock).await
    }

    async fn with_pool(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }
        Ok(Self { pool, clock })
    }

    async fn wallet_exists(&self, player_id: PlayerId) -> Result<bool, RepoError> {
        let row = sqlx::query("SELECT 1 FROM wallets WHERE player_id = ?")
            .bind(player_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("wallet_exists", e))?;
        Ok(row.is_some())
    }
}

fn to_db_amount(amount: u64) -> Result<i64, RepoError> {
    i64::try_from(amount).map_err(|_| RepoError::constraint(format!("Amount {} too large", amount)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(RepoError::serialization)
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T, RepoError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row
        .try_get(column)
        .map_err(|e| RepoError::serialization(format!("{}: {}", column, e)))?;
    raw.parse::<T>()
        .map_err(|e| RepoError::serialization(format!("{}: {}", column, e)))
}

fn get_int(row: &SqliteRow, column: &str) -> Result<i64, RepoError> {
    row.try_get(column)
        .map_err(|e| RepoError::serialization(format!("{}: {}", column, e)))
}

fn non_negative<T: TryFrom<i64>>(value: i64, column: &str) -> Result<T, RepoError> {
    T::try_from(value)
        .map_err(|_| RepoError::serialization(format!("{} out of range: {}", column, value)))
}

fn row_to_wallet(row: &SqliteRow) -> Result<Wallet, RepoError> {
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| RepoError::serialization(format!("updated_at: {}", e)))?;
    Ok(Wallet::from_parts(
        parse_column::<PlayerId>(row, "player_id")?,
        non_negative(get_int(row, "balance")?, "balance")?,
        PityState::new(non_negative(get_int(row, "pity_counter")?, "pity_counter")?),
        non_negative(get_int(row, "pity_revision")?, "pity_revision")?,
        parse_timestamp(&updated_at)?,
    ))
}

fn row_to_card(row: &SqliteRow) -> Result<Card, RepoError> {
    let text = |column: &str| -> Result<String, RepoError> {
        row.try_get(column)
            .map_err(|e| RepoError::serialization(format!("{}: {}", column, e)))
    };
    let image_url: Option<String> = row
        .try_get("image_url")
        .map_err(|e| RepoError::serialization(format!("image_url: {}", e)))?;

    Ok(Card {
        id: parse_column(row, "id")?,
        name: text("name")?,
        description: text("description")?,
        cost: non_negative(get_int(row, "cost")?, "cost")?,
        power: non_negative(get_int(row, "power")?, "power")?,
        defense: non_negative(get_int(row, "defense")?, "defense")?,
        element: parse_column(row, "element")?,
        category: parse_column(row, "category")?,
        rarity: parse_column(row, "rarity")?,
        theme: parse_column(row, "theme")?,
        image_prompt: text("image_prompt")?,
        image_url,
        created_at: parse_timestamp(&text("created_at")?)?,
    })
}

fn row_to_entry(row: &SqliteRow) -> Result<CollectionEntry, RepoError> {
    let pack_opening_id: Option<String> = row
        .try_get("pack_opening_id")
        .map_err(|e| RepoError::serialization(format!("pack_opening_id: {}", e)))?;
    let acquired_at: String = row
        .try_get("acquired_at")
        .map_err(|e| RepoError::serialization(format!("acquired_at: {}", e)))?;

    Ok(CollectionEntry {
        id: parse_column::<CollectionEntryId>(row, "id")?,
        player_id: parse_column(row, "player_id")?,
        card_id: parse_column(row, "card_id")?,
        pack_opening_id: pack_opening_id
            .map(|raw| raw.parse::<PackOpeningId>())
            .transpose()
            .map_err(RepoError::serialization)?,
        acquired_at: parse_timestamp(&acquired_at)?,
    })
}

#[async_trait]
impl WalletRepo for SqliteStore {
    async fn get(&self, player_id: PlayerId) -> Result<Option<Wallet>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE player_id = ?",
            WALLET_COLUMNS
        ))
        .bind(player_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("wallet_get", e))?;

        row.as_ref().map(row_to_wallet).transpose()
    }

    async fn ensure(&self, player_id: PlayerId, starting_balance: u64) -> Result<Wallet, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (player_id, balance, pity_counter, pity_revision, updated_at)
            VALUES (?, ?, 0, 0, ?)
            ON CONFLICT(player_id) DO NOTHING
            "#,
        )
        .bind(player_id.to_string())
        .bind(to_db_amount(starting_balance)?)
        .bind(self.clock.now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("wallet_ensure", e))?;

        WalletRepo::get(self, player_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Wallet", player_id))
    }

    async fn try_debit(&self, player_id: PlayerId, amount: u64) -> Result<DebitOutcome, RepoError> {
        let amount = to_db_amount(amount)?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallets
            SET balance = balance - ?1, updated_at = ?2
            WHERE player_id = ?3 AND balance >= ?1
            RETURNING {}
            "#,
            WALLET_COLUMNS
        ))
        .bind(amount)
        .bind(self.clock.now().to_rfc3339())
        .bind(player_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("wallet_debit", e))?;

        if let Some(row) = row {
            return Ok(DebitOutcome::Debited(row_to_wallet(&row)?));
        }

        match WalletRepo::get(self, player_id).await? {
            Some(wallet) => Ok(DebitOutcome::Insufficient {
                balance: wallet.balance(),
            }),
            None => Err(RepoError::not_found("Wallet", player_id)),
        }
    }

    async fn commit_pity(
        &self,
        player_id: PlayerId,
        expected_revision: u64,
        next: PityState,
    ) -> Result<Wallet, RepoError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallets
            SET pity_counter = ?, pity_revision = pity_revision + 1, updated_at = ?
            WHERE player_id = ? AND pity_revision = ?
            RETURNING {}
            "#,
            WALLET_COLUMNS
        ))
        .bind(i64::from(next.counter()))
        .bind(self.clock.now().to_rfc3339())
        .bind(player_id.to_string())
        .bind(to_db_amount(expected_revision)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("wallet_commit_pity", e))?;

        match row {
            Some(row) => row_to_wallet(&row),
            None if self.wallet_exists(player_id).await? => {
                Err(RepoError::conflict("Wallet", player_id))
            }
            None => Err(RepoError::not_found("Wallet", player_id)),
        }
    }

    async fn credit(&self, player_id: PlayerId, amount: u64) -> Result<Wallet, RepoError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallets
            SET balance = balance + ?, updated_at = ?
            WHERE player_id = ?
            RETURNING {}
            "#,
            WALLET_COLUMNS
        ))
        .bind(to_db_amount(amount)?)
        .bind(self.clock.now().to_rfc3339())
        .bind(player_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("wallet_credit", e))?;

        row.as_ref()
            .map(row_to_wallet)
            .transpose()?
            .ok_or_else(|| RepoError::not_found("Wallet", player_id))
    }
}

#[async_trait]
impl CardRepo for SqliteStore {
    async fn get(&self, id: CardId) -> Result<Option<Card>, RepoError> {
        let row = sqlx::query("SELECT * FROM cards WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("card_get", e))?;

        row.as_ref().map(row_to_card).transpose()
    }
}

#[async_trait]
impl CollectionRepo for SqliteStore {
    async fn add_card(&self, card: &Card, entry: &CollectionEntry) -> Result<(), RepoError> {
        if entry.card_id != card.id {
            return Err(RepoError::constraint(format!(
                "Collection entry points at {} but card is {}",
                entry.card_id, card.id
            )));
        }

        // Dropping the transaction without commit rolls the card insert back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("collection_add_begin", e))?;

        sqlx::query(
            r#"
            INSERT INTO cards (
                id, name, description, cost, power, defense, element, category,
                rarity, theme, image_prompt, image_url, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(card.id.to_string())
        .bind(&card.name)
        .bind(&card.description)
        .bind(i64::from(card.cost))
        .bind(i64::from(card.power))
        .bind(i64::from(card.defense))
        .bind(card.element.as_str())
        .bind(card.category.as_str())
        .bind(card.rarity.as_str())
        .bind(card.theme.as_str())
        .bind(&card.image_prompt)
        .bind(card.image_url.as_deref())
        .bind(card.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("card_insert", e))?;

        let linked = sqlx::query(
            r#"
            INSERT INTO collection_entries (id, player_id, card_id, pack_opening_id, acquired_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(player_id, card_id) DO NOTHING
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.player_id.to_string())
        .bind(entry.card_id.to_string())
        .bind(entry.pack_opening_id.map(|id| id.to_string()))
        .bind(entry.acquired_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("collection_link", e))?;

        if linked.rows_affected() == 0 {
            return Err(RepoError::constraint(format!(
                "Card {} already in collection of {}",
                entry.card_id, entry.player_id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("collection_add_commit", e))
    }

    async fn list(&self, player_id: PlayerId) -> Result<Vec<CollectionEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, player_id, card_id, pack_opening_id, acquired_at
            FROM collection_entries
            WHERE player_id = ?
            ORDER BY acquired_at, rowid
            "#,
        )
        .bind(player_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("collection_list", e))?;

        rows.iter().map(row_to_entry).collect()
    }
}
