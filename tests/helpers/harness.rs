// In-memory engine harness
//
// Wires the same Engine the binary builds, but with inspectable stores.

use std::sync::Arc;

use payflow::core::in_memory::InMemoryRepository;
use payflow::core::{AppError, EntityMeta, Repository, TenancyContext};
use payflow::modules::events::{DispatcherTopics, InMemoryEventBus};
use payflow::modules::payment_links::PaymentLink;
use payflow::modules::payments::{Cost, Payment};
use payflow::modules::profiles::StaticProfileService;
use payflow::modules::prompts::{Account, Prompt};
use payflow::modules::routes::{Route, RouteMode, RouteType};
use payflow::modules::statuses::{EntityType, Status, StatusTracker};
use payflow::modules::transports::{InMemoryTransport, TransportService};
use payflow::{Collaborators, Engine, Repositories};

pub const PROMPT_TOPIC: &str = "mem://initiate.prompt";
pub const PAYMENT_LINK_TOPIC: &str = "mem://create.payment.link";

pub struct TestHarness {
    pub ctx: TenancyContext,
    pub bus: InMemoryEventBus,
    pub engine: Engine,
    pub transport: InMemoryTransport,
    pub payments: InMemoryRepository<Payment>,
    pub costs: InMemoryRepository<Cost>,
    pub statuses: InMemoryRepository<Status>,
    pub routes: InMemoryRepository<Route>,
    pub prompts: InMemoryRepository<Prompt>,
    pub accounts: InMemoryRepository<Account>,
    pub payment_links: InMemoryRepository<PaymentLink>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_profiles(StaticProfileService::new())
    }

    pub fn with_profiles(profiles: StaticProfileService) -> Self {
        let payments = InMemoryRepository::new();
        let costs = InMemoryRepository::new();
        let statuses = InMemoryRepository::new();
        let routes = InMemoryRepository::new();
        let prompts = InMemoryRepository::new();
        let accounts = InMemoryRepository::new();
        let payment_links = InMemoryRepository::new();

        let repos = Repositories {
            payments: Arc::new(payments.clone()),
            costs: Arc::new(costs.clone()),
            statuses: Arc::new(statuses.clone()),
            routes: Arc::new(routes.clone()),
            prompts: Arc::new(prompts.clone()),
            accounts: Arc::new(accounts.clone()),
            payment_links: Arc::new(payment_links.clone()),
        };

        let transport = InMemoryTransport::new();
        let collaborators = Collaborators {
            profiles: Arc::new(profiles),
            transports: Arc::new(TransportService::new().with("mem", Arc::new(transport.clone()))),
            topics: DispatcherTopics {
                initiate_prompt: PROMPT_TOPIC.to_string(),
                create_payment_link: PAYMENT_LINK_TOPIC.to_string(),
            },
        };

        let bus = InMemoryEventBus::new();
        let engine = Engine::build(repos, collaborators, Arc::new(bus.clone()));

        Self {
            ctx: tenancy("partition-1"),
            bus,
            engine,
            transport,
            payments,
            costs,
            statuses,
            routes,
            prompts,
            accounts,
            payment_links,
        }
    }

    /// Run the event chain until nothing is pending
    pub async fn drain(&self) -> Vec<(&'static str, AppError)> {
        self.bus.drain(&self.engine.dispatcher).await
    }

    /// Drain and fail the test on any dispatch error
    pub async fn settle(&self) {
        let failures = self.drain().await;
        assert!(failures.is_empty(), "unexpected dispatch failures: {:?}", failures);
    }

    pub async fn add_route(
        &self,
        name: &str,
        mode: RouteMode,
        route_type: RouteType,
        uri: &str,
    ) -> Route {
        let partition_id = self.ctx.partition_id.clone();
        self.add_route_in(&partition_id, name, mode, route_type, uri)
            .await
    }

    pub async fn add_route_in(
        &self,
        partition_id: &str,
        name: &str,
        mode: RouteMode,
        route_type: RouteType,
        uri: &str,
    ) -> Route {
        let route = Route {
            meta: EntityMeta::new(None, &tenancy(partition_id)),
            name: name.to_string(),
            description: format!("{} route", name),
            mode,
            route_type,
            uri: uri.to_string(),
        };
        self.routes.save(&route).await.expect("Failed to seed route");
        route
    }

    /// Current status straight from the tracker
    pub async fn current(&self, entity_id: &str, entity_type: EntityType) -> Status {
        StatusTracker::new(Arc::new(self.statuses.clone()))
            .get_current(&self.ctx, entity_id, entity_type)
            .await
            .expect("Entity has no status")
    }

    pub async fn payment(&self, payment_id: &str) -> Payment {
        self.payments
            .get_by_id(payment_id)
            .await
            .expect("Payment not persisted")
    }
}

pub fn tenancy(partition_id: &str) -> TenancyContext {
    TenancyContext::new("tenant-1", partition_id, "access-1")
}
