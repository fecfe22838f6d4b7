//! Request handlers for the `/faq` resource.
//!
//! Each handler runs the same straight-line sequence and stops at the first
//! failure: parse the body, validate it, parse the identifier, hit the store,
//! back up, then localize the reply.
//!
//! Store calls are synchronous `SQLite` work and run on tokio's blocking pool.

use tracing::{debug, info};
use warp::hyper::body::Bytes;
use warp::{Rejection, Reply};

use crate::backup::Trigger;
use crate::error::{Error, Result as StoreResult};
use crate::i18n::MessageKey;
use crate::model::{FaqDraft, FaqId, FaqPayload};
use crate::storage::Storage;

use super::rejection::{bad_request, internal, not_found, INVALID_ID};
use super::AppContext;

/// `GET /faq`
pub async fn list_faqs(ctx: AppContext) -> Result<impl Reply, Rejection> {
    let faqs = with_store(&ctx, "list faqs", Storage::list_faqs).await?;

    backup(&ctx, Trigger::List).await?;

    Ok(warp::reply::json(&faqs))
}

/// `POST /faq`
pub async fn add_faq(
    locale: Option<String>,
    ctx: AppContext,
    body: Bytes,
) -> Result<impl Reply, Rejection> {
    let draft = parse_draft(&body)?;
    let answers = draft.answers.len();

    let id = with_store(&ctx, "create faq", move |store| store.create_faq(&draft)).await?;
    info!(faq_id = %id, answers, "FAQ created");

    backup(&ctx, Trigger::Create).await?;

    localized(&ctx, locale.as_deref(), MessageKey::FaqAdded)
}

/// `DELETE /faq/{id}`
pub async fn delete_faq(
    id: String,
    locale: Option<String>,
    ctx: AppContext,
) -> Result<impl Reply, Rejection> {
    let id = parse_id(&id)?;

    let removed = with_store(&ctx, "delete faq", move |store| store.delete_faq(&id)).await?;
    if removed == 0 {
        return Err(not_found());
    }
    info!(faq_id = %id, "FAQ deleted");

    backup(&ctx, Trigger::Delete).await?;

    localized(&ctx, locale.as_deref(), MessageKey::FaqDeleted)
}

/// `PATCH /faq/{id}`
pub async fn update_faq(
    id: String,
    locale: Option<String>,
    ctx: AppContext,
    body: Bytes,
) -> Result<impl Reply, Rejection> {
    let draft = parse_draft(&body)?;
    let id = parse_id(&id)?;
    let answers = draft.answers.len();

    let updated = with_store(&ctx, "update faq", move |store| {
        store.update_faq(&id, &draft)
    })
    .await?;
    if !updated {
        return Err(not_found());
    }
    info!(faq_id = %id, answers, "FAQ updated");

    backup(&ctx, Trigger::Update).await?;

    localized(&ctx, locale.as_deref(), MessageKey::FaqUpdated)
}

async fn with_store<T, F>(
    ctx: &AppContext,
    operation: &'static str,
    op: F,
) -> Result<T, Rejection>
where
    F: FnOnce(&Storage) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || op(ctx.store()))
        .await
        .map_err(|e| internal(operation, &Error::internal(e.to_string())))?
        .map_err(|e| internal(operation, &e))
}

fn parse_draft(body: &[u8]) -> Result<FaqDraft, Rejection> {
    let payload: FaqPayload = serde_json::from_slice(body).map_err(|e| {
        debug!("Rejecting malformed body: {}", e);
        bad_request("Bad Request")
    })?;

    payload
        .validate()
        .map_err(|missing| bad_request(missing.to_string()))
}

fn parse_id(raw: &str) -> Result<FaqId, Rejection> {
    raw.parse().map_err(|e| {
        debug!("Rejecting identifier {:?}: {}", raw, e);
        bad_request(INVALID_ID)
    })
}

async fn backup(ctx: &AppContext, trigger: Trigger) -> Result<(), Rejection> {
    ctx.backup()
        .after(trigger)
        .await
        .map(|_| ())
        .map_err(|e| internal("backup", &e))
}

fn localized(
    ctx: &AppContext,
    locale: Option<&str>,
    key: MessageKey,
) -> Result<String, Rejection> {
    ctx.catalog()
        .resolve(locale, key)
        .map(str::to_owned)
        .map_err(|e| internal("localize reply", &e))
}
