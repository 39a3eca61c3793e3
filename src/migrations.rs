use anyhow::Context;
use sqlx::{
    migrate::{Migrate, Migrator},
    PgPool,
};
use tracing::info;

/// Reversible steps embedded from `./migrations`, ordered by version.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub version: i64,
    pub description: String,
    pub down_revision: Option<i64>,
    pub applied: bool,
}

/// Forward steps in application order, each linked to its predecessor.
pub fn revisions() -> Vec<(i64, String, Option<i64>)> {
    let mut prev = None;
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| {
            let entry = (m.version, m.description.to_string(), prev);
            prev = Some(m.version);
            entry
        })
        .collect()
}

async fn applied_versions(pool: &PgPool) -> anyhow::Result<Vec<i64>> {
    let mut conn = pool.acquire().await.context("acquire connection")?;
    conn.ensure_migrations_table()
        .await
        .context("ensure migrations table")?;
    let mut versions: Vec<i64> = conn
        .list_applied_migrations()
        .await
        .context("list applied migrations")?
        .into_iter()
        .map(|m| m.version)
        .collect();
    versions.sort_unstable();
    Ok(versions)
}

/// Applies every pending step. Any failing step aborts the whole run.
pub async fn upgrade(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await.context("upgrade migrations")?;
    let head = applied_versions(pool).await?.last().copied().unwrap_or(0);
    info!(head, "schema upgraded");
    Ok(())
}

/// Reverts, newest first, every applied step with a version above `target`. `0` means base.
pub async fn downgrade(pool: &PgPool, target: i64) -> anyhow::Result<()> {
    MIGRATOR
        .undo(pool, target)
        .await
        .with_context(|| format!("downgrade migrations to {target}"))?;
    info!(target, "schema downgraded");
    Ok(())
}

/// Version a one-step downgrade returns to: the predecessor of the newest applied step.
pub async fn previous_revision(pool: &PgPool) -> anyhow::Result<i64> {
    let applied = applied_versions(pool).await?;
    Ok(one_step_back(&applied))
}

fn one_step_back(applied: &[i64]) -> i64 {
    match applied {
        [.., prev, _head] => *prev,
        _ => 0,
    }
}

pub async fn history(pool: &PgPool) -> anyhow::Result<Vec<Revision>> {
    let applied = applied_versions(pool).await?;
    Ok(revisions()
        .into_iter()
        .map(|(version, description, down_revision)| Revision {
            version,
            description,
            down_revision,
            applied: applied.contains(&version),
        })
        .collect())
}
