use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use server::{ServerConfig, WriteGate};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "travel_tracker={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = match connect_database(&settings.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("DB connection failed: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!("Database Connected");

    let engine = engine::Engine::builder().database(db).build().await?;

    let config = ServerConfig {
        gate: if settings.server.production {
            WriteGate::production(settings.server.admin_key.clone())
        } else {
            WriteGate::disabled()
        },
        public_dir: settings.server.public_dir.clone(),
    };

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, config, listener).await?;

    Ok(())
}

/// Connect, probe the connection and bring the schema up to date.
async fn connect_database(
    config: &settings::Database,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(&config.url).await?;
    let backend = database.get_database_backend();
    database
        .execute(Statement::from_string(backend, "SELECT 1"))
        .await?;

    Migrator::up(&database, None).await?;
    Ok(database)
}
