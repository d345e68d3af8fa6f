//! Database migrations
//!
//! This module manages SQLite schema migrations for noograph.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Graph schema
///
/// `agent_id` is the scope column; the empty string is the global scope.
/// The indexes on the identifying tuples are lookup indexes, not unique
/// constraints: the find-before-create in the stores is the
/// authoritative uniqueness check.
const MIGRATION_V1: &str = r#"
    -- Node and edge type definitions (the runtime-extensible schema)
    CREATE TABLE IF NOT EXISTS graph_node_types (
        id TEXT PRIMARY KEY NOT NULL,
        agent_id TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        justification TEXT NOT NULL DEFAULT '',
        properties_schema TEXT NOT NULL DEFAULT '{}',
        example_properties TEXT NOT NULL DEFAULT '{}',
        created_by TEXT NOT NULL DEFAULT 'agent' CHECK (created_by IN ('system', 'agent')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_graph_node_types_scope_name ON graph_node_types(agent_id, name);

    CREATE TABLE IF NOT EXISTS graph_edge_types (
        id TEXT PRIMARY KEY NOT NULL,
        agent_id TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        justification TEXT NOT NULL DEFAULT '',
        properties_schema TEXT NOT NULL DEFAULT '{}',
        example_properties TEXT NOT NULL DEFAULT '{}',
        created_by TEXT NOT NULL DEFAULT 'agent' CHECK (created_by IN ('system', 'agent')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_graph_edge_types_scope_name ON graph_edge_types(agent_id, name);

    -- Graph nodes, identified by (agent_id, type_name, name)
    CREATE TABLE IF NOT EXISTS graph_nodes (
        id TEXT PRIMARY KEY NOT NULL,
        agent_id TEXT NOT NULL DEFAULT '',
        type_name TEXT NOT NULL,
        name TEXT NOT NULL,
        properties TEXT NOT NULL DEFAULT '{}',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_graph_nodes_identity ON graph_nodes(agent_id, type_name, name);
    CREATE INDEX IF NOT EXISTS idx_graph_nodes_scope ON graph_nodes(agent_id);

    -- Graph edges, identified by (agent_id, type_name, source_id, target_id)
    CREATE TABLE IF NOT EXISTS graph_edges (
        id TEXT PRIMARY KEY NOT NULL,
        agent_id TEXT NOT NULL DEFAULT '',
        type_name TEXT NOT NULL,
        source_id TEXT NOT NULL,
        target_id TEXT NOT NULL,
        properties TEXT NOT NULL DEFAULT '{}',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_graph_edges_identity ON graph_edges(agent_id, type_name, source_id, target_id);
    CREATE INDEX IF NOT EXISTS idx_graph_edges_source ON graph_edges(source_id);
    CREATE INDEX IF NOT EXISTS idx_graph_edges_target ON graph_edges(target_id);

    -- Inbox notifications written alongside advice nodes
    CREATE TABLE IF NOT EXISTS inbox_notifications (
        id TEXT PRIMARY KEY NOT NULL,
        agent_id TEXT NOT NULL DEFAULT '',
        node_id TEXT NOT NULL,
        summary TEXT NOT NULL DEFAULT '',
        read INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_inbox_notifications_agent ON inbox_notifications(agent_id);
"#;

/// Get the current schema version
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let (version,): (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;

    Ok(version.unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Graph schema");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    Ok(())
}

/// Get the migration status without applying anything
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
