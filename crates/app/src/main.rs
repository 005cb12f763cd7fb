use engine::{Catalog, Engine};
use settings::Settings;

mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "citycredit={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let engine = build_engine(&settings)?;
    let listener = bind(&settings).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_engine(settings: &Settings) -> error::Result<Engine> {
    let catalog = match &settings.catalog.path {
        Some(path) => {
            tracing::info!("Loading catalog from {path}...");
            Catalog::from_path(path)?
        }
        None => Catalog::demo()?,
    };
    Ok(Engine::builder().catalog(catalog).build()?)
}

async fn bind(settings: &Settings) -> error::Result<tokio::net::TcpListener> {
    let addr = settings.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    Ok(listener)
}
