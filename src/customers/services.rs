//! Customer service functions with storage access.

use std::sync::Arc;

use validator::ValidationErrors;

use crate::db::{Store, StoreError};
use crate::models::{Customer, NewCustomer};

/// Customer error types
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("No customer with ID {id}")]
    NotFound { id: i64 },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for CustomerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => CustomerError::Validation(errors),
            other => CustomerError::Storage(other),
        }
    }
}

pub type CustomerResult<T> = Result<T, CustomerError>;

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn Store>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All customers in registration order
    pub async fn list(&self) -> CustomerResult<Vec<Customer>> {
        Ok(self.store.list_customers().await?)
    }

    pub async fn register(&self, customer: NewCustomer) -> CustomerResult<Customer> {
        customer.check().map_err(CustomerError::Validation)?;
        Ok(self.store.create_customer(customer).await?)
    }

    pub async fn show(&self, id: i64) -> CustomerResult<Customer> {
        self.store
            .find_customer_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound { id })
    }
}
