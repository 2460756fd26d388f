use std::{net::IpAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DbPool, MemoryEmployeeStore, SeaOrmEmployeeStore, connect};
use platform_obs::{ObsConfig, init_tracing};
use staffdesk_server::{
    AppConfig, AppState, EmployeeService, ServeConfig, graphql, http, seed,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "staffdesk-server", version, about = "Staffdesk employee records server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP RPC + GraphQL server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo employees, skipping emails already present.
    Seed,
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, help = "Bind address (defaults to HOST or 0.0.0.0)")]
    host: Option<IpAddr>,
    #[arg(long, help = "Listen port (defaults to PORT or 3001)")]
    port: Option<u16>,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::for_service("staffdesk-server"))?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up(&config).await,
            MigrateCommand::Down => migrate_down(&config).await,
        },
        Command::Seed => run_seed(&config).await,
        Command::SchemaPrint { output } => schema_print(output),
    }
}

async fn setup_pool(config: &AppConfig) -> Result<DbPool> {
    connect(&config.database).await.map_err(Into::into)
}

fn employee_service(pool: DbPool) -> EmployeeService {
    EmployeeService::new(Arc::new(SeaOrmEmployeeStore::new(pool)))
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let pool = setup_pool(&config).await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let serve_config = ServeConfig::new(
        cmd.host.unwrap_or(config.host),
        cmd.port.unwrap_or(config.port),
    );
    info!(
        environment = %config.environment,
        origins = ?config.cors_allowed_origins,
        "starting staffdesk server"
    );
    let state = AppState::new(employee_service(pool), config);
    http::serve(serve_config, state).await
}

async fn run_seed(config: &AppConfig) -> Result<()> {
    let pool = setup_pool(config).await?;
    ensure_migrations(&pool, false).await?;
    let inserted = seed::seed_demo(&employee_service(pool)).await?;
    info!(inserted, "demo employees seeded");
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    // the SDL does not depend on the backing store
    let schema = graphql::build_schema(EmployeeService::new(Arc::new(MemoryEmployeeStore::new())));
    let sdl = schema.sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)?;
            info!(path = %target.display(), "schema written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `staffdesk-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up(config: &AppConfig) -> Result<()> {
    let pool = setup_pool(config).await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down(config: &AppConfig) -> Result<()> {
    let pool = setup_pool(config).await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
