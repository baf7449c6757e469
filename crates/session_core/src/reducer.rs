//! Pure state transitions for a catalog session.
//!
//! `reduce` takes the session model by value together with one message (a UI
//! event or a fetch completion) and returns the next model plus at most one
//! fetch to run. It performs no I/O; the controller owns the only model and
//! executes the returned commands.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Category, CategoryId, Product},
    error::CatalogError,
    page::{is_full_page, DEFAULT_PAGE_SIZE},
};

use crate::state::{BrowsingState, CatalogEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// What to do with a product completion that is not the latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleFetchPolicy {
    /// Apply every completion in the order it arrives; the last one to settle wins.
    #[default]
    ApplyAll,
    /// Drop product completions superseded by a later request.
    DiscardStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerConfig {
    pub page_size: usize,
    pub stale_fetch_policy: StaleFetchPolicy,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stale_fetch_policy: StaleFetchPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchCommand {
    /// Categories first, then the unfiltered first page of products.
    Bootstrap {
        request: RequestId,
        page_size: usize,
    },
    ListProducts {
        request: RequestId,
        page: usize,
        page_size: usize,
        category_id: Option<CategoryId>,
    },
    SearchProducts {
        request: RequestId,
        query: String,
        page: usize,
        page_size: usize,
    },
}

impl FetchCommand {
    pub fn request(&self) -> RequestId {
        match self {
            FetchCommand::Bootstrap { request, .. }
            | FetchCommand::ListProducts { request, .. }
            | FetchCommand::SearchProducts { request, .. } => *request,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FetchCommand::Bootstrap { .. } => "bootstrap",
            FetchCommand::ListProducts { .. } => "list_products",
            FetchCommand::SearchProducts { .. } => "search_products",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionMsg {
    Bootstrap,
    Event(CatalogEvent),
    CategoriesSettled(Result<Vec<Category>, CatalogError>),
    ProductsSettled {
        request: RequestId,
        page: usize,
        result: Result<Vec<Product>, CatalogError>,
    },
}

impl SessionMsg {
    pub fn name(&self) -> &'static str {
        match self {
            SessionMsg::Bootstrap => "bootstrap",
            SessionMsg::Event(event) => event.name(),
            SessionMsg::CategoriesSettled(_) => "categories_settled",
            SessionMsg::ProductsSettled { .. } => "products_settled",
        }
    }
}

/// Browsing state plus the request bookkeeping the reducer needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionModel {
    pub browsing: BrowsingState,
    last_issued: u64,
    latest_products_request: Option<RequestId>,
}

impl SessionModel {
    pub fn new(browsing: BrowsingState) -> Self {
        Self {
            browsing,
            ..Self::default()
        }
    }

    pub fn latest_products_request(&self) -> Option<RequestId> {
        self.latest_products_request
    }

    fn issue_products_request(&mut self) -> RequestId {
        self.last_issued += 1;
        let request = RequestId(self.last_issued);
        self.latest_products_request = Some(request);
        request
    }

    fn is_stale(&self, request: RequestId) -> bool {
        self.latest_products_request != Some(request)
    }
}

pub fn reduce(
    mut model: SessionModel,
    msg: SessionMsg,
    config: &ReducerConfig,
) -> (SessionModel, Option<FetchCommand>) {
    match msg {
        SessionMsg::Bootstrap => {
            model.browsing.is_loading = true;
            let request = model.issue_products_request();
            let command = FetchCommand::Bootstrap {
                request,
                page_size: config.page_size,
            };
            (model, Some(command))
        }
        SessionMsg::Event(event) => reduce_event(model, event, config),
        SessionMsg::CategoriesSettled(Ok(categories)) => {
            model.browsing.categories = categories;
            (model, None)
        }
        SessionMsg::CategoriesSettled(Err(err)) => {
            model.browsing.error = Some(err.to_string());
            (model, None)
        }
        SessionMsg::ProductsSettled {
            request,
            page,
            result,
        } => {
            if config.stale_fetch_policy == StaleFetchPolicy::DiscardStale
                && model.is_stale(request)
            {
                return (model, None);
            }
            apply_products(&mut model.browsing, page, result, config.page_size);
            (model, None)
        }
    }
}

fn reduce_event(
    mut model: SessionModel,
    event: CatalogEvent,
    config: &ReducerConfig,
) -> (SessionModel, Option<FetchCommand>) {
    match event {
        CatalogEvent::SearchQueryChanged(text) => {
            model.browsing.search_query = text;
            (model, None)
        }
        CatalogEvent::CategorySelected(category_id) => {
            model.browsing.selected_category_id = category_id;
            model.browsing.restart_listing();
            let command = list_products(&mut model, config);
            (model, Some(command))
        }
        CatalogEvent::LoadMoreProducts => {
            if !model.browsing.can_load_more() {
                return (model, None);
            }
            model.browsing.current_page += 1;
            model.browsing.is_loading = true;
            let command = list_products(&mut model, config);
            (model, Some(command))
        }
        CatalogEvent::RefreshProducts => {
            model.browsing.restart_listing();
            let command = list_products(&mut model, config);
            (model, Some(command))
        }
        CatalogEvent::Search => {
            if !model.browsing.has_searchable_query() {
                return (model, None);
            }
            model.browsing.restart_listing();
            let request = model.issue_products_request();
            let command = FetchCommand::SearchProducts {
                request,
                query: model.browsing.search_query.clone(),
                page: model.browsing.current_page,
                page_size: config.page_size,
            };
            (model, Some(command))
        }
    }
}

fn list_products(model: &mut SessionModel, config: &ReducerConfig) -> FetchCommand {
    let request = model.issue_products_request();
    FetchCommand::ListProducts {
        request,
        page: model.browsing.current_page,
        page_size: config.page_size,
        category_id: model.browsing.selected_category_id.clone(),
    }
}

fn apply_products(
    browsing: &mut BrowsingState,
    page: usize,
    result: Result<Vec<Product>, CatalogError>,
    page_size: usize,
) {
    browsing.is_loading = false;
    match result {
        Ok(fetched) => {
            browsing.has_more_pages = is_full_page(fetched.len(), page_size);
            if page == 1 {
                browsing.products = fetched;
            } else {
                browsing.products.extend(fetched);
            }
            browsing.error = None;
        }
        Err(err) => {
            browsing.error = Some(err.to_string());
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
