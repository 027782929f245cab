//! Assembly of repositories, collaborators and the event chain

use actix_web::web;
use sqlx::MySqlPool;
use std::sync::Arc;

use crate::core::in_memory::InMemoryRepository;
use crate::middleware::{json_error_handler, query_error_handler};
use crate::modules::events::{ChainStores, DispatcherTopics, EventBus, EventDispatcher};
use crate::modules::orchestrator::Orchestrator;
use crate::modules::payment_links::{MySqlPaymentLinkRepository, PaymentLinkRepository};
use crate::modules::payments::{
    CostRepository, MySqlCostRepository, MySqlPaymentRepository, PaymentRepository,
};
use crate::modules::profiles::ProfileService;
use crate::modules::prompts::{
    AccountRepository, MySqlAccountRepository, MySqlPromptRepository, PromptRepository,
};
use crate::modules::routes::{MySqlRouteRepository, RouteRepository, Router};
use crate::modules::statuses::{MySqlStatusRepository, StatusRepository, StatusTracker};
use crate::modules::transports::TransportService;
use crate::modules::{health, orchestrator};

/// Every store the engine needs, behind its repository trait
#[derive(Clone)]
pub struct Repositories {
    pub payments: Arc<dyn PaymentRepository>,
    pub costs: Arc<dyn CostRepository>,
    pub statuses: Arc<dyn StatusRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub prompts: Arc<dyn PromptRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub payment_links: Arc<dyn PaymentLinkRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            payments: Arc::new(InMemoryRepository::new()),
            costs: Arc::new(InMemoryRepository::new()),
            statuses: Arc::new(InMemoryRepository::new()),
            routes: Arc::new(InMemoryRepository::new()),
            prompts: Arc::new(InMemoryRepository::new()),
            accounts: Arc::new(InMemoryRepository::new()),
            payment_links: Arc::new(InMemoryRepository::new()),
        }
    }

    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            payments: Arc::new(MySqlPaymentRepository::new(pool.clone())),
            costs: Arc::new(MySqlCostRepository::new(pool.clone())),
            statuses: Arc::new(MySqlStatusRepository::new(pool.clone())),
            routes: Arc::new(MySqlRouteRepository::new(pool.clone())),
            prompts: Arc::new(MySqlPromptRepository::new(pool.clone())),
            accounts: Arc::new(MySqlAccountRepository::new(pool.clone())),
            payment_links: Arc::new(MySqlPaymentLinkRepository::new(pool)),
        }
    }
}

/// External systems the chain talks to
#[derive(Clone)]
pub struct Collaborators {
    pub profiles: Arc<dyn ProfileService>,
    pub transports: Arc<TransportService>,
    pub topics: DispatcherTopics,
}

/// The request side and the event side of the engine, sharing one bus
#[derive(Clone)]
pub struct Engine {
    pub orchestrator: Arc<Orchestrator>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl Engine {
    pub fn build(
        repos: Repositories,
        collaborators: Collaborators,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        let statuses = StatusTracker::new(Arc::clone(&repos.statuses));
        let router = Arc::new(Router::new(
            Arc::clone(&repos.routes),
            collaborators.profiles,
        ));

        let stores = ChainStores {
            payments: Arc::clone(&repos.payments),
            costs: repos.costs,
            prompts: repos.prompts,
            accounts: repos.accounts,
            payment_links: repos.payment_links,
        };

        let dispatcher = Arc::new(EventDispatcher::new(
            stores,
            statuses.clone(),
            router,
            collaborators.transports,
            Arc::clone(&bus),
            collaborators.topics,
        ));

        let orchestrator = Arc::new(Orchestrator::new(repos.payments, statuses, bus));

        Self {
            orchestrator,
            dispatcher,
        }
    }
}

/// Mount the HTTP surface; the orchestrator is expected as
/// `web::Data<Arc<Orchestrator>>` app data
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(health::configure)
        .configure(orchestrator::configure);
}
