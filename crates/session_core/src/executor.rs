//! Runs fetch commands on tokio tasks and posts their completions back to the
//! session queue.

use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::{
    controller::Outstanding,
    reducer::{FetchCommand, SessionMsg},
    CategorySource, ProductSource,
};

#[derive(Clone)]
pub(crate) struct Sources {
    pub(crate) products: Arc<dyn ProductSource>,
    pub(crate) categories: Arc<dyn CategorySource>,
}

pub(crate) fn spawn_fetch(
    command: FetchCommand,
    sources: Sources,
    completions: Sender<SessionMsg>,
    outstanding: Outstanding,
) {
    outstanding.acquire();
    tokio::spawn(async move {
        run_fetch(command, &sources, &completions, &outstanding).await;
        outstanding.release();
    });
}

async fn run_fetch(
    command: FetchCommand,
    sources: &Sources,
    completions: &Sender<SessionMsg>,
    outstanding: &Outstanding,
) {
    let request = command.request();
    debug!(request = request.0, command = command.name(), "running catalog fetch");

    match command {
        FetchCommand::Bootstrap { page_size, .. } => {
            let categories = sources.categories.fetch_categories().await;
            if let Err(err) = &categories {
                warn!(request = request.0, "category fetch failed: {err}");
            }
            post(completions, outstanding, SessionMsg::CategoriesSettled(categories)).await;

            let result = sources.products.fetch_products(1, page_size, None).await;
            if let Err(err) = &result {
                warn!(request = request.0, page = 1, "product fetch failed: {err}");
            }
            post(
                completions,
                outstanding,
                SessionMsg::ProductsSettled {
                    request,
                    page: 1,
                    result,
                },
            )
            .await;
        }
        FetchCommand::ListProducts {
            page,
            page_size,
            category_id,
            ..
        } => {
            let result = sources
                .products
                .fetch_products(page, page_size, category_id.as_ref())
                .await;
            if let Err(err) = &result {
                warn!(request = request.0, page, "product fetch failed: {err}");
            }
            post(
                completions,
                outstanding,
                SessionMsg::ProductsSettled {
                    request,
                    page,
                    result,
                },
            )
            .await;
        }
        FetchCommand::SearchProducts {
            query,
            page,
            page_size,
            ..
        } => {
            let result = sources.products.search(&query, page, page_size).await;
            if let Err(err) = &result {
                warn!(request = request.0, page, "product search failed: {err}");
            }
            post(
                completions,
                outstanding,
                SessionMsg::ProductsSettled {
                    request,
                    page,
                    result,
                },
            )
            .await;
        }
    }
}

async fn post(completions: &Sender<SessionMsg>, outstanding: &Outstanding, msg: SessionMsg) {
    outstanding.acquire();
    let name = msg.name();
    if completions.send(msg).await.is_err() {
        outstanding.release();
        debug!(msg = name, "catalog session closed; dropping completion");
    }
}
