use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::Config,
    error::Result,
    models::{wallet::ChatTurnRow, ChatRole, ChatTurn, Contact, ResetSummary},
};

pub mod memory;

pub use memory::MemoryStore;

/// Persistence calls the wallet actions and the HTTP layer depend on.
///
/// Contact writes are last-write-wins by alias and conversation history is
/// append-only, so concurrent requests for one caller may interleave freely.
#[async_trait::async_trait]
pub trait WalletStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get_user_wallet(&self, user_id: &str) -> Result<Option<String>>;
    async fn unlink_wallet(&self, user_id: &str) -> Result<bool>;

    async fn get_contacts(&self, user_id: &str) -> Result<Vec<Contact>>;
    async fn add_contact(&self, user_id: &str, alias: &str, address: &str) -> Result<()>;
    async fn remove_contact(&self, user_id: &str, alias: &str) -> Result<bool>;
    async fn resolve_contact(&self, user_id: &str, alias: &str) -> Result<Option<String>>;

    async fn get_conversation_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatTurn>>;
    async fn add_to_conversation(&self, user_id: &str, role: ChatRole, content: &str)
        -> Result<()>;
    async fn clear_conversation_history(&self, user_id: &str) -> Result<u64>;

    async fn full_account_reset(&self, user_id: &str) -> Result<ResetSummary>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config, database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// ==================== WALLET QUERIES ====================
#[async_trait::async_trait]
impl WalletStore for Database {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get_user_wallet(&self, user_id: &str) -> Result<Option<String>> {
        let address: Option<String> = sqlx::query_scalar(
            "SELECT address FROM wallet_links
             WHERE telegram_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn unlink_wallet(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wallet_links WHERE telegram_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== CONTACT QUERIES ====================
    async fn get_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(
            "SELECT alias, address FROM contacts WHERE telegram_id = $1 ORDER BY alias",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_contact(&self, user_id: &str, alias: &str, address: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO contacts (telegram_id, alias, address)
             VALUES ($1, $2, $3)
             ON CONFLICT (telegram_id, (LOWER(alias)))
             DO UPDATE SET alias = EXCLUDED.alias, address = EXCLUDED.address",
        )
        .bind(user_id)
        .bind(alias)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_contact(&self, user_id: &str, alias: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM contacts WHERE telegram_id = $1 AND LOWER(alias) = LOWER($2)",
        )
        .bind(user_id)
        .bind(alias)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn resolve_contact(&self, user_id: &str, alias: &str) -> Result<Option<String>> {
        let address: Option<String> = sqlx::query_scalar(
            "SELECT address FROM contacts WHERE telegram_id = $1 AND LOWER(alias) = LOWER($2)",
        )
        .bind(user_id)
        .bind(alias)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    // ==================== CONVERSATION QUERIES ====================
    async fn get_conversation_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatTurn>> {
        let mut rows = sqlx::query_as::<_, ChatTurnRow>(
            "SELECT role, content FROM conversation_history
             WHERE telegram_id = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        // Newest-first from the query; callers expect chronological order.
        rows.reverse();
        Ok(rows.into_iter().map(ChatTurn::from).collect())
    }

    async fn add_to_conversation(
        &self,
        user_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO conversation_history (telegram_id, role, content) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_conversation_history(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM conversation_history WHERE telegram_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ==================== ACCOUNT QUERIES ====================
    async fn full_account_reset(&self, user_id: &str) -> Result<ResetSummary> {
        let mut tx = self.pool.begin().await?;

        let wallets = sqlx::query("DELETE FROM wallet_links WHERE telegram_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let conversations = sqlx::query("DELETE FROM conversation_history WHERE telegram_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let contacts = sqlx::query("DELETE FROM contacts WHERE telegram_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::info!(
            "Full account reset for user={}: wallets={}, conversations={}, contacts={}",
            user_id,
            wallets,
            conversations,
            contacts
        );

        Ok(ResetSummary {
            wallets,
            conversations,
            contacts,
        })
    }
}
