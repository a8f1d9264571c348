//! Outcome of the most recent product fetch, plus the sequence fence that
//! decides which response is allowed to write it.

use serde::Serialize;
use shared::{domain::Product, protocol::ProductPage};

/// The only failure text shown to users; causes go to the log.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch products. Please try again later.";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FetchStatus {
    /// No fetch has been issued yet.
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultState {
    pub items: Vec<Product>,
    pub total_count: u64,
    pub status: FetchStatus,
}

impl ResultState {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == FetchStatus::Ready
    }

    /// Ready with nothing to show; the view renders its "no results" state.
    pub fn is_empty_success(&self) -> bool {
        self.is_ready() && self.items.is_empty()
    }

    pub(crate) fn begin(&mut self) {
        self.status = FetchStatus::Loading;
    }

    pub(crate) fn apply_page(&mut self, page: ProductPage) {
        self.items = page.products;
        self.total_count = page.total;
        self.status = FetchStatus::Ready;
    }

    /// Leaves items and total untouched.
    pub(crate) fn apply_failure(&mut self) {
        self.status = FetchStatus::Failed(GENERIC_FETCH_ERROR.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FetchTicket(pub u64);

/// Hands out increasing tickets; only the newest one may settle a fetch.
#[derive(Debug, Default)]
pub struct RequestFence {
    issued: u64,
}

impl RequestFence {
    pub fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn latest(&self) -> Option<FetchTicket> {
        (self.issued > 0).then_some(FetchTicket(self.issued))
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::ProductId;

    use super::*;

    fn product(id: u64) -> Product {
        Product {
            id: ProductId(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: 1.0,
            thumbnail: String::new(),
            category: "misc".into(),
            rating: 3.0,
            stock: 20,
            brand: None,
            discount_percentage: 0.0,
        }
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut results = ResultState::default();
        results.begin();
        results.apply_page(ProductPage {
            products: vec![product(1), product(2)],
            total: 40,
            skip: 0,
            limit: 12,
        });

        results.begin();
        assert!(results.is_loading());
        assert_eq!(results.error_message(), None);

        results.apply_failure();
        assert!(!results.is_loading());
        assert_eq!(results.error_message(), Some(GENERIC_FETCH_ERROR));
        assert_eq!(results.items.len(), 2);
        assert_eq!(results.total_count, 40);
    }

    #[test]
    fn success_after_failure_clears_error() {
        let mut results = ResultState::default();
        results.begin();
        results.apply_failure();
        results.begin();
        results.apply_page(ProductPage {
            products: Vec::new(),
            total: 0,
            skip: 0,
            limit: 12,
        });
        assert!(results.is_empty_success());
        assert_eq!(results.error_message(), None);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut fence = RequestFence::default();
        assert_eq!(fence.latest(), None);
        let first = fence.issue();
        assert!(fence.is_current(first));
        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(second > first);
    }
}
