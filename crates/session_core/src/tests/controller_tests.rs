use super::*;

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Category, CategoryId, Product, ProductId},
    error::CatalogError,
    page::page_slice,
};
use tokio::sync::Semaphore;

use crate::UnavailableSource;

#[derive(Default)]
struct ScriptedCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    product_calls: AtomicUsize,
    failures_remaining: AtomicUsize,
    delays: HashMap<String, Duration>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedCatalog {
    fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            categories: vec![category("electronics"), category("clothing")],
            ..Self::default()
        }
    }

    fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for ScriptedCatalog {
    async fn fetch_products(
        &self,
        page: usize,
        page_size: usize,
        category_id: Option<&CategoryId>,
    ) -> Result<Vec<Product>, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }
        if let Some(delay) = category_id.and_then(|id| self.delays.get(id.as_str())) {
            tokio::time::sleep(*delay).await;
        }
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CatalogError::source_failure("catalog backend timed out"));
        }
        let filtered: Vec<Product> = self
            .products
            .iter()
            .filter(|p| category_id.map_or(true, |id| &p.category_id == id))
            .cloned()
            .collect();
        Ok(page_slice(&filtered, page, page_size).to_vec())
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("product", id.as_str()))
    }

    async fn search(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Product>, CatalogError> {
        let matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.matches_query(query))
            .cloned()
            .collect();
        Ok(page_slice(&matches, page, page_size).to_vec())
    }
}

#[async_trait]
impl CategorySource for ScriptedCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories.clone())
    }

    async fn fetch_category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("category", id.as_str()))
    }
}

fn category(id: &str) -> Category {
    Category {
        id: id.into(),
        name: id.to_uppercase(),
        parent_id: None,
    }
}

fn product(id: u32, category: &str) -> Product {
    Product {
        id: id.to_string().into(),
        name: format!("Item {id}"),
        description: format!("Catalog item number {id}"),
        price: 5.0,
        image_url: String::new(),
        category_id: category.into(),
        rating: 0.0,
        review_count: 0,
    }
}

fn numbered(count: u32, category: &str) -> Vec<Product> {
    (1..=count).map(|id| product(id, category)).collect()
}

fn spawn_with(catalog: &Arc<ScriptedCatalog>, settings: SessionSettings) -> CatalogSessionController {
    CatalogSessionController::spawn(catalog.clone(), catalog.clone(), settings)
}

#[tokio::test]
async fn bootstrap_loads_categories_and_first_page() {
    let catalog = Arc::new(ScriptedCatalog::with_products(numbered(12, "electronics")));
    let session = spawn_with(&catalog, SessionSettings::default());
    session.wait_idle().await;

    let state = session.snapshot();
    assert_eq!(state.categories.len(), 2);
    assert_eq!(state.products.len(), 10);
    assert!(state.has_more_pages);
    assert!(!state.is_loading);
    assert_eq!(state.current_page, 1);
    assert_eq!(state.error, None);
    assert_eq!(catalog.product_calls(), 1);
}

#[tokio::test]
async fn stream_observes_each_transition_in_order() {
    let catalog = Arc::new(ScriptedCatalog::with_products(numbered(3, "clothing")));
    let session = spawn_with(&catalog, SessionSettings::default());
    let mut stream = session.state();
    session.wait_idle().await;

    let mut states = Vec::new();
    while let Some(state) = stream.try_next_state() {
        states.push(state);
    }

    assert_eq!(states.len(), 4, "default, loading, categories, products");
    assert_eq!(states[0], BrowsingState::default());
    assert!(states[1].is_loading && states[1].categories.is_empty());
    assert!(states[2].is_loading && states[2].categories.len() == 2);
    assert!(!states[3].is_loading);
    assert_eq!(states[3].products.len(), 3);
    assert!(!states[3].has_more_pages);
}

#[tokio::test]
async fn load_more_while_loading_issues_no_duplicate_fetch() {
    let gate = Arc::new(Semaphore::new(0));
    let catalog = Arc::new(ScriptedCatalog {
        gate: Some(gate.clone()),
        ..ScriptedCatalog::with_products(numbered(25, "electronics"))
    });
    let session = spawn_with(&catalog, SessionSettings::default());
    let mut stream = session.state();

    session
        .dispatch(CatalogEvent::LoadMoreProducts)
        .expect("dispatch");
    session
        .dispatch(CatalogEvent::LoadMoreProducts)
        .expect("dispatch");
    session
        .dispatch(CatalogEvent::SearchQueryChanged("marker".to_string()))
        .expect("dispatch");

    let marked = stream
        .wait_for(|state| state.search_query == "marker")
        .await
        .expect("marker state");
    assert!(marked.is_loading);
    assert_eq!(marked.current_page, 1);

    gate.add_permits(8);
    session.wait_idle().await;

    let state = session.snapshot();
    assert_eq!(catalog.product_calls(), 1);
    assert_eq!(state.products.len(), 10);
    assert_eq!(state.current_page, 1);
}

#[tokio::test]
async fn unavailable_sources_surface_the_failure_message() {
    let session = CatalogSessionController::spawn(
        Arc::new(UnavailableSource),
        Arc::new(UnavailableSource),
        SessionSettings::default(),
    );
    session.wait_idle().await;

    let state = session.snapshot();
    assert!(!state.is_loading);
    assert!(state.products.is_empty());
    assert_eq!(
        state.error.as_deref(),
        Some("product source unavailable for page 1")
    );
}

#[tokio::test]
async fn refresh_after_failure_clears_the_error() {
    let catalog = Arc::new(ScriptedCatalog {
        failures_remaining: AtomicUsize::new(1),
        ..ScriptedCatalog::with_products(numbered(10, "electronics"))
    });
    let session = spawn_with(&catalog, SessionSettings::default());
    session.wait_idle().await;
    assert_eq!(
        session.snapshot().error.as_deref(),
        Some("catalog backend timed out")
    );

    session
        .dispatch(CatalogEvent::RefreshProducts)
        .expect("dispatch");
    session.wait_idle().await;

    let state = session.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.products.len(), 10);
}

#[tokio::test]
async fn load_more_walks_pages_in_source_order() {
    let catalog = Arc::new(ScriptedCatalog::with_products(numbered(25, "home")));
    let session = spawn_with(&catalog, SessionSettings::default());
    session.wait_idle().await;

    for _ in 0..2 {
        session
            .dispatch(CatalogEvent::LoadMoreProducts)
            .expect("dispatch");
        session.wait_idle().await;
    }

    let state = session.snapshot();
    let ids: Vec<String> = state.products.iter().map(|p| p.id.0.clone()).collect();
    let expected: Vec<String> = (1..=25).map(|id| id.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(state.current_page, 3);
    assert!(!state.has_more_pages);

    session
        .dispatch(CatalogEvent::LoadMoreProducts)
        .expect("dispatch");
    session.wait_idle().await;
    assert_eq!(catalog.product_calls(), 3);
}

#[tokio::test]
async fn dispatch_reports_full_queue() {
    let catalog = Arc::new(ScriptedCatalog::with_products(numbered(1, "home")));
    let session = spawn_with(
        &catalog,
        SessionSettings {
            queue_capacity: 1,
            ..SessionSettings::default()
        },
    );

    session
        .dispatch(CatalogEvent::SearchQueryChanged("first".to_string()))
        .expect("first fits");
    assert_eq!(
        session.dispatch(CatalogEvent::SearchQueryChanged("second".to_string())),
        Err(SessionError::QueueFull)
    );

    session.wait_idle().await;
    assert_eq!(session.snapshot().search_query, "first");
}

fn racing_catalog() -> Arc<ScriptedCatalog> {
    let mut products = numbered(3, "electronics");
    products.extend((4..=6).map(|id| product(id, "clothing")));
    Arc::new(ScriptedCatalog {
        delays: HashMap::from([
            ("electronics".to_string(), Duration::from_millis(50)),
            ("clothing".to_string(), Duration::from_millis(10)),
        ]),
        ..ScriptedCatalog::with_products(products)
    })
}

async fn race_category_switch(policy: StaleFetchPolicy) -> BrowsingState {
    let catalog = racing_catalog();
    let session = spawn_with(
        &catalog,
        SessionSettings {
            stale_fetch_policy: policy,
            ..SessionSettings::default()
        },
    );
    session.wait_idle().await;

    session
        .dispatch(CatalogEvent::CategorySelected(Some("electronics".into())))
        .expect("dispatch");
    session
        .dispatch(CatalogEvent::CategorySelected(Some("clothing".into())))
        .expect("dispatch");
    session.wait_idle().await;
    session.snapshot()
}

#[tokio::test(start_paused = true)]
async fn slower_superseded_fetch_wins_by_default() {
    let state = race_category_switch(StaleFetchPolicy::ApplyAll).await;
    assert_eq!(state.selected_category_id, Some("clothing".into()));
    assert!(!state.products.is_empty());
    assert!(state
        .products
        .iter()
        .all(|p| p.category_id.as_str() == "electronics"));
}

#[tokio::test(start_paused = true)]
async fn discard_stale_keeps_latest_category() {
    let state = race_category_switch(StaleFetchPolicy::DiscardStale).await;
    assert_eq!(state.selected_category_id, Some("clothing".into()));
    assert_eq!(state.products.len(), 3);
    assert!(state
        .products
        .iter()
        .all(|p| p.category_id.as_str() == "clothing"));
}

#[tokio::test]
async fn stream_ends_when_session_is_dropped() {
    let catalog = Arc::new(ScriptedCatalog::with_products(numbered(2, "home")));
    let session = spawn_with(&catalog, SessionSettings::default());
    session.wait_idle().await;
    let mut stream = session.state();
    drop(session);

    assert!(stream.wait_for(|_| false).await.is_none());
}
