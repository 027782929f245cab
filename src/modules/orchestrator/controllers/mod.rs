pub mod payment_controller;
pub mod payment_link_controller;
pub mod prompt_controller;
pub mod status_controller;

use actix_web::web;

/// Mount every orchestrator endpoint
pub fn configure(cfg: &mut web::ServiceConfig) {
    payment_controller::configure(cfg);
    status_controller::configure(cfg);
    prompt_controller::configure(cfg);
    payment_link_controller::configure(cfg);
}
