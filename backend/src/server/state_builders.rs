//! Repository selection for the HTTP state.

use std::sync::Arc;

use tracing::info;

use iam_backend::inbound::http::state::HttpState;
use iam_backend::outbound::memory::InMemoryRepository;
use iam_backend::outbound::persistence::{
    DbPool, DieselOrganisationRepository, DieselPersonRepository, DieselRoleAssignmentRepository,
    DieselRoleRepository,
};

/// Wire services over PostgreSQL when a pool exists, otherwise in memory.
pub(crate) fn build_http_state(pool: Option<&DbPool>) -> HttpState {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            HttpState::from_repositories(
                Arc::new(DieselPersonRepository::new(pool.clone())),
                Arc::new(DieselOrganisationRepository::new(pool.clone())),
                Arc::new(DieselRoleRepository::new(pool.clone())),
                Arc::new(DieselRoleAssignmentRepository::new(pool.clone())),
            )
        }
        None => {
            info!("no database configured, using in-memory repositories");
            HttpState::from_repositories(
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
            )
        }
    }
}
