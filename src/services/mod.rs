//! Business logic services

pub mod borrowings;
pub mod catalog;
pub mod users;

use crate::{config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub borrowings: borrowings::BorrowingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, loans_config: LoansConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(repository, loans_config),
        }
    }
}
