use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payflow::app::{self, Collaborators, Engine, Repositories};
use payflow::config::{Config, StorageKind};
use payflow::middleware::RequestIdMiddleware;
use payflow::modules::events::{DispatcherTopics, QueueEventBus, RetryPolicy, WorkerPool};
use payflow::modules::profiles::HttpProfileService;
use payflow::modules::transports::{HttpTransport, InMemoryTransport, TransportService};

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("payflow={},actix_web=info", level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    init_tracing(&config.app.log_level, config.json_logs());

    tracing::info!(
        env = %config.app.env,
        bind = %config.server.bind_address(),
        storage = ?config.database.storage,
        "Starting payflow"
    );

    let (repos, pool) = match config.database.storage {
        StorageKind::MySql => {
            let pool = config.database.create_pool().await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "Database pool initialized"
            );
            (Repositories::mysql(pool.clone()), Some(pool))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on exit");
            (Repositories::in_memory(), None)
        }
    };

    let http = Arc::new(HttpTransport::new());
    let transports = TransportService::new()
        .with("http", http.clone())
        .with("https", http)
        .with("mem", Arc::new(InMemoryTransport::new()));

    let collaborators = Collaborators {
        profiles: Arc::new(HttpProfileService::new(
            config.collaborators.profile_service_url.clone(),
        )),
        transports: Arc::new(transports),
        topics: DispatcherTopics {
            initiate_prompt: config.collaborators.prompt_topic_uri.clone(),
            create_payment_link: config.collaborators.payment_link_topic_uri.clone(),
        },
    };

    let (bus, receivers) = QueueEventBus::new(config.queue.workers, config.queue.capacity);
    let engine = Engine::build(repos, collaborators, Arc::new(bus));

    let workers = WorkerPool::start(
        receivers,
        Arc::clone(&engine.dispatcher),
        RetryPolicy::new(config.queue.max_attempts, config.queue.retry_base()),
    );

    // Start HTTP server
    let orchestrator = Arc::clone(&engine.orchestrator);
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(Arc::clone(&orchestrator)));

        if let Some(pool) = &pool {
            app = app.app_data(web::Data::new(pool.clone()));
        }

        app.configure(app::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!(bind = %bind_address, "Server started");

    let served = server.await;

    workers.shutdown().await;
    served?;
    Ok(())
}
