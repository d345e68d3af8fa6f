//! Noograph CLI - agent knowledge graphs with runtime-extensible schemas

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use noograph_core::domain::graph::{
    CreatedBy, DerivedKnowledgeWriter, EdgeStore, GraphQueryService, GraphRepository,
    NewTypeDefinition, NodeQuery, NodeStore, Scope, SeedProvisioner, TypeKind, TypeRegistry,
};
use noograph_core::infrastructure::graph::SqliteGraphRepository;
use noograph_core::storage::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "noograph")]
#[command(author, version, about = "Agent knowledge graphs with runtime-extensible schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Agent scope to operate in (omit for the global scope)
    #[arg(short, long, global = true)]
    agent: Option<String>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    Node,
    Edge,
}

impl From<KindArg> for TypeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Node => TypeKind::Node,
            KindArg::Edge => TypeKind::Edge,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and run pending migrations
    Init,

    /// Provision the baseline analysis/advice types in the scope
    Seed,

    /// Manage node and edge types
    Types {
        #[command(subcommand)]
        action: TypeAction,
    },

    /// Manage graph nodes
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },

    /// Manage graph edges
    Edge {
        #[command(subcommand)]
        action: EdgeAction,
    },

    /// Query nodes and their connecting edges
    Query {
        /// Restrict to nodes of this type
        #[arg(short, long)]
        r#type: Option<String>,

        /// Substring match on node names
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum nodes returned
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Write a citation-verified analysis node
    AddAnalysis {
        /// Node name
        name: String,
        /// Node properties as JSON
        #[arg(short, long)]
        properties: String,
    },

    /// Write a citation-verified advice node (records a notification)
    AddAdvice {
        /// Node name
        name: String,
        /// Node properties as JSON
        #[arg(short, long)]
        properties: String,
    },

    /// List inbox notifications for the scope
    Notifications,

    /// Show per-type node and edge counts
    Stats,

    /// Delete everything owned by an agent scope
    DeleteScope {
        /// Agent whose data to delete
        agent_id: String,
        #[arg(long)]
        force: bool,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum TypeAction {
    /// List types of a kind
    List {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Create a new type
    Create {
        #[arg(value_enum)]
        kind: KindArg,
        /// Type name
        name: String,
        /// What the type is for
        #[arg(short, long)]
        description: String,
        /// Why the existing types were not enough
        #[arg(short, long)]
        justification: Option<String>,
        /// Properties schema as JSON
        #[arg(short, long)]
        schema: Option<String>,
        /// Example properties as JSON
        #[arg(short, long)]
        example: Option<String>,
    },
}

#[derive(Subcommand)]
enum NodeAction {
    /// Upsert a node
    Add {
        /// Node type name
        r#type: String,
        /// Node name
        name: String,
        /// Node properties as JSON
        #[arg(short, long)]
        properties: Option<String>,
    },
    /// Show a node by id
    Show { id: String },
    /// Look up a node by type and name
    Get {
        /// Node type name
        r#type: String,
        /// Node name
        name: String,
    },
}

#[derive(Subcommand)]
enum EdgeAction {
    /// Upsert an edge between two nodes
    Add {
        /// Edge type name
        r#type: String,
        /// Source node type
        source_type: String,
        /// Source node name
        source_name: String,
        /// Target node type
        target_type: String,
        /// Target node name
        target_name: String,
        /// Edge properties as JSON
        #[arg(short, long)]
        properties: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("noograph=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let scope = Scope::from_agent(cli.agent.clone());

    let db = open_db(cli.db.clone()).await?;
    let repo = Arc::new(SqliteGraphRepository::new(db.pool().clone()));

    match cli.command {
        Commands::Init => cmd_init(&db, cli.quiet).await,

        Commands::Seed => cmd_seed(&repo, &scope, cli.quiet).await,

        Commands::Types { action } => cmd_types(&repo, &scope, action, cli.format, cli.quiet).await,

        Commands::Node { action } => cmd_node(&repo, &scope, action, cli.format, cli.quiet).await,

        Commands::Edge { action } => cmd_edge(&repo, &scope, action, cli.quiet).await,

        Commands::Query {
            r#type,
            search,
            limit,
        } => cmd_query(&repo, &scope, r#type, search, limit, cli.format).await,

        Commands::AddAnalysis { name, properties } => {
            cmd_add_analysis(&repo, &scope, &name, &properties, cli.quiet).await
        }

        Commands::AddAdvice { name, properties } => {
            cmd_add_advice(&repo, &scope, &name, &properties, cli.quiet).await
        }

        Commands::Notifications => cmd_notifications(&repo, &scope, cli.format).await,

        Commands::Stats => cmd_stats(&repo, &scope, cli.format).await,

        Commands::DeleteScope { agent_id, force } => {
            cmd_delete_scope(&repo, &agent_id, force, cli.quiet).await
        }

        Commands::Doctor => cmd_doctor(&db, cli.quiet).await,
    }
}

async fn open_db(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let config = match path {
        Some(path) => DatabaseConfig::with_path(path),
        None => DatabaseConfig::default(),
    };
    Ok(Database::new(config).await?)
}

fn parse_json(label: &str, raw: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("Invalid JSON for {}: {}", label, e))
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_init(db: &Database, quiet: bool) -> anyhow::Result<()> {
    db.migrate().await?;
    if !quiet {
        let status = db.migration_status().await?;
        println!("Database initialized at {}", db.path().display());
        println!("  Schema version: {}", status.current_version);
    }
    Ok(())
}

async fn cmd_seed(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    quiet: bool,
) -> anyhow::Result<()> {
    SeedProvisioner::new(Arc::clone(repo))
        .ensure_seed_types(scope)
        .await?;
    if !quiet {
        println!("Seed types provisioned for scope {}.", scope);
    }
    Ok(())
}

async fn cmd_types(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    action: TypeAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let registry = TypeRegistry::new(Arc::clone(repo));

    match action {
        TypeAction::List { kind } => {
            let types = registry.list_types(scope, kind.into()).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&types)?);
                return Ok(());
            }
            if types.is_empty() {
                if !quiet {
                    println!("No types found in scope {}.", scope);
                    println!("\nCreate one with: noograph types create <kind> <name>");
                }
            } else {
                for t in types {
                    println!("  {} - {}", t.name, t.description);
                }
            }
        }
        TypeAction::Create {
            kind,
            name,
            description,
            justification,
            schema,
            example,
        } => {
            let mut definition = NewTypeDefinition {
                name,
                description,
                justification: justification.unwrap_or_default(),
                ..Default::default()
            };
            if let Some(schema) = schema {
                definition.properties_schema = parse_json("--schema", &schema)?;
            }
            if let Some(example) = example {
                definition.example_properties = parse_json("--example", &example)?;
            }

            let id = registry
                .create_type(scope, kind.into(), definition, CreatedBy::Agent)
                .await?;
            if !quiet {
                println!("Type created: {}", id);
            }
        }
    }
    Ok(())
}

async fn cmd_node(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    action: NodeAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        NodeAction::Add {
            r#type,
            name,
            properties,
        } => {
            let properties = match properties {
                Some(raw) => parse_json("--properties", &raw)?,
                None => serde_json::json!({}),
            };
            let upsert = NodeStore::new(Arc::clone(repo))
                .upsert(scope, &r#type, &name, properties)
                .await?;
            if !quiet {
                println!("Node {}: {:?}", upsert.id, upsert.action);
            }
        }
        NodeAction::Show { id } => match repo.get_node_by_id(&id).await? {
            Some(node) => print_node(&node, format),
            None => {
                return Err(anyhow::anyhow!("Node '{}' not found.", id));
            }
        },
        NodeAction::Get { r#type, name } => {
            match repo.get_node(scope, &r#type, &name).await? {
                Some(node) => print_node(&node, format),
                None => {
                    return Err(anyhow::anyhow!("Node '{}' of type '{}' not found.", name, r#type));
                }
            }
        }
    }
    Ok(())
}

fn print_node(node: &noograph_core::domain::graph::GraphNode, format: OutputFormat) {
    if format == OutputFormat::Json {
        match serde_json::to_string_pretty(node) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("Failed to render node: {}", e),
        }
        return;
    }
    println!("Node: {}", node.name);
    println!("  ID: {}", node.id);
    println!("  Type: {}", node.type_name);
    println!("  Scope: {}", node.scope);
    println!("  Properties: {}", node.properties);
    println!("  Created: {}", node.created_at.format("%Y-%m-%d %H:%M:%S"));
}

async fn cmd_edge(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    action: EdgeAction,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        EdgeAction::Add {
            r#type,
            source_type,
            source_name,
            target_type,
            target_name,
            properties,
        } => {
            let properties = properties
                .map(|raw| parse_json("--properties", &raw))
                .transpose()?;
            let upsert = EdgeStore::new(Arc::clone(repo))
                .upsert(
                    scope,
                    &r#type,
                    &source_type,
                    &source_name,
                    &target_type,
                    &target_name,
                    properties,
                )
                .await?;
            if !quiet {
                println!("Edge {}: {:?}", upsert.id, upsert.action);
            }
        }
    }
    Ok(())
}

async fn cmd_query(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    type_name: Option<String>,
    search: Option<String>,
    limit: Option<u32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let view = GraphQueryService::new(Arc::clone(repo))
        .query(
            scope,
            &NodeQuery {
                type_name,
                search_term: search,
                limit,
            },
        )
        .await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.nodes.is_empty() {
        println!("No nodes matched.");
        return Ok(());
    }

    println!("Nodes:");
    for node in &view.nodes {
        println!("  {} - {} ({})", &node.id[..8], node.name, node.type_name);
    }
    if !view.edges.is_empty() {
        println!("Edges:");
        for edge in &view.edges {
            println!(
                "  {} - {} -> {}",
                edge.type_name,
                &edge.source_id[..8],
                &edge.target_id[..8]
            );
        }
    }
    Ok(())
}

async fn cmd_add_analysis(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    name: &str,
    properties: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let properties = parse_json("--properties", properties)?;
    let upsert = DerivedKnowledgeWriter::new(Arc::clone(repo))
        .add_analysis(scope, name, properties)
        .await?;
    if !quiet {
        println!("Analysis node {}: {:?}", upsert.id, upsert.action);
    }
    Ok(())
}

async fn cmd_add_advice(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    name: &str,
    properties: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let properties = parse_json("--properties", properties)?;
    let upsert = DerivedKnowledgeWriter::new(Arc::clone(repo))
        .add_advice(scope, name, properties)
        .await?;
    if !quiet {
        println!("Advice node: {}", upsert.id);
        println!("  Notification: {}", upsert.notification_id);
    }
    Ok(())
}

async fn cmd_notifications(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let notifications = repo.list_notifications(scope.as_db()).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&notifications)?);
        return Ok(());
    }

    if notifications.is_empty() {
        println!("No notifications for scope {}.", scope);
    } else {
        for n in notifications {
            let marker = if n.read { " " } else { "*" };
            println!(
                "{} {} - {} (node {})",
                marker,
                n.created_at.format("%Y-%m-%d %H:%M"),
                n.summary,
                &n.node_id[..8]
            );
        }
    }
    Ok(())
}

async fn cmd_stats(
    repo: &Arc<SqliteGraphRepository>,
    scope: &Scope,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stats = repo.type_stats(scope).await?;

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "nodes_by_type": stats.nodes_by_type,
                "edges_by_type": stats.edges_by_type,
            })
        );
        return Ok(());
    }

    println!("Graph statistics for scope {}:", scope);
    println!("  Nodes:");
    if stats.nodes_by_type.is_empty() {
        println!("    (none)");
    }
    for (type_name, count) in &stats.nodes_by_type {
        println!("    {}: {}", type_name, count);
    }
    println!("  Edges:");
    if stats.edges_by_type.is_empty() {
        println!("    (none)");
    }
    for (type_name, count) in &stats.edges_by_type {
        println!("    {}: {}", type_name, count);
    }
    Ok(())
}

async fn cmd_delete_scope(
    repo: &Arc<SqliteGraphRepository>,
    agent_id: &str,
    force: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if !force {
        println!(
            "Warning: This will permanently delete all data for agent '{}'.",
            agent_id
        );
        println!("Use --force to confirm deletion.");
        return Ok(());
    }

    let removed = repo.delete_scope(agent_id).await?;
    if !quiet {
        println!("Deleted {} rows for agent '{}'.", removed, agent_id);
    }
    Ok(())
}

async fn cmd_doctor(db: &Database, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Noograph Health Check");
        println!("=====================");
        println!();
    }

    let mut all_ok = true;

    match db.health_check().await {
        Ok(()) => {
            println!("[OK] Database: Connected");
            println!("     Path: {}", db.path().display());

            match db.migration_status().await {
                Ok(status) => {
                    if status.needs_migration {
                        println!(
                            "[!!] Database: Migrations pending (v{} -> v{})",
                            status.current_version, status.target_version
                        );
                    } else {
                        println!("[OK] Database: Schema v{}", status.current_version);
                    }
                }
                Err(e) => {
                    println!("[!!] Database: Migration check failed - {}", e);
                }
            }
        }
        Err(e) => {
            all_ok = false;
            println!("[!!] Database: Health check failed - {}", e);
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}
