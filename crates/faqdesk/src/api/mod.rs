//! HTTP interface.
//!
//! Routes are built from an explicit [`AppContext`] so that every dependency a
//! handler touches is constructed once at startup and handed in.

mod handlers;
mod rejection;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use warp::http::Method;
use warp::{Filter, Reply};

use crate::backup::Backup;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::i18n::{Catalog, LOCALE_HEADER};
use crate::storage::Storage;

pub use rejection::{handle_rejection, ApiError};

/// Dependencies shared by every request.
#[derive(Debug, Clone)]
pub struct AppContext {
    store: Arc<Storage>,
    backup: Arc<Backup>,
    catalog: Arc<Catalog>,
}

impl AppContext {
    /// Bundle the store, backup stage and catalog.
    #[must_use]
    pub fn new(store: Storage, backup: Backup, catalog: Catalog) -> Self {
        Self {
            store: Arc::new(store),
            backup: Arc::new(backup),
            catalog: Arc::new(catalog),
        }
    }

    /// Open the database and load the catalog described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or if
    /// the catalog cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Storage::open(config.database_path())?;
        let catalog = Catalog::from_config(&config.i18n)?;
        Ok(Self::new(store, Backup::from_config(config), catalog))
    }

    /// The FAQ store.
    #[must_use]
    pub fn store(&self) -> &Storage {
        &self.store
    }

    /// The backup stage.
    #[must_use]
    pub fn backup(&self) -> &Backup {
        &self.backup
    }

    /// The message catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Build the full route table.
pub fn routes(ctx: AppContext) -> impl Filter<Extract = impl Reply> + Clone {
    let with_context = warp::any().map(move || ctx.clone());
    let locale = warp::header::optional::<String>(LOCALE_HEADER);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", LOCALE_HEADER])
        .allow_methods(&[Method::GET, Method::POST, Method::DELETE, Method::PATCH])
        .max_age(3600);

    let list_faqs = warp::path("faq")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_context.clone())
        .and_then(handlers::list_faqs);

    let add_faq = warp::path("faq")
        .and(warp::path::end())
        .and(warp::post())
        .and(locale.clone())
        .and(with_context.clone())
        .and(warp::body::bytes())
        .and_then(handlers::add_faq);

    let delete_faq = warp::path("faq")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(locale.clone())
        .and(with_context.clone())
        .and_then(handlers::delete_faq);

    let update_faq = warp::path("faq")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::patch())
        .and(locale)
        .and(with_context)
        .and(warp::body::bytes())
        .and_then(handlers::update_faq);

    list_faqs
        .or(add_faq)
        .or(delete_faq)
        .or(update_faq)
        .with(cors)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "faq_request",
                method = %info.method(),
                path = %info.path(),
                id = %uuid::Uuid::new_v4(),
            )
        }))
        .recover(handle_rejection)
}

/// Serve the API on `addr` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn serve<S>(addr: SocketAddr, ctx: AppContext, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(ctx))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| Error::Bind {
            addr,
            message: e.to_string(),
        })?;

    info!("Listening on http://{}", bound);
    server.await;
    info!("Server stopped");
    Ok(())
}
