//! Cached query layer over the dashboard data API
//!
//! Reads go cache-first; writes go through to the backend and drop the
//! affected entry. Identity transitions wipe the whole cache from the
//! session side, so nothing here tags entries with an identity.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::api::client::DashboardApi;
use crate::api::errors::ApiError;
use crate::api::types::{CreateWebhookRequest, Quote, ScreenerRequest, ScreenerRow, Webhook};
use crate::core::cache::QueryCache;
use crate::core::session::SessionHandle;
use crate::error::{AppError, Result};

/// Cache key for the webhook list
const WEBHOOKS_KEY: &str = "webhooks";

fn quote_key(symbol: &str) -> String {
    format!("quotes:{}", symbol)
}

/// Resolve the current bearer token or refuse the query
async fn require_token(session: &SessionHandle) -> Result<String> {
    session
        .token()
        .await
        .ok_or_else(|| AppError::Api(ApiError::Unauthorized("no active session".to_string())))
}

// ============================================================================
// Market Data
// ============================================================================

/// Cache-first access to quotes and the screener
pub struct MarketDataService<D: DashboardApi> {
    api: D,
    cache: Arc<QueryCache>,
    session: SessionHandle,
}

impl<D: DashboardApi> MarketDataService<D> {
    pub fn new(api: D, cache: Arc<QueryCache>, session: SessionHandle) -> Self {
        Self { api, cache, session }
    }

    /// Quote for a single symbol
    ///
    /// An unknown symbol is `AppError::NotFound`, not an empty success,
    /// so callers can tell "no data" from "no such symbol".
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let quotes = self.quotes(&[symbol.to_string()]).await?;
        quotes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("symbol '{}'", symbol)))
    }

    /// Quotes for a set of symbols, fetching only the cache misses
    pub async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        let mut cached: Vec<Quote> = Vec::with_capacity(symbols.len());
        let mut missing: Vec<String> = Vec::new();

        for symbol in symbols {
            match self.cache.get::<Quote>(&quote_key(symbol)).await {
                Some(quote) => cached.push(quote),
                None => missing.push(symbol.clone()),
            }
        }

        if missing.is_empty() {
            debug!(count = cached.len(), "All quotes served from cache");
            return Ok(cached);
        }

        let token = require_token(&self.session).await?;
        let fetched = self.api.quotes(&token, &missing).await?;
        for quote in &fetched {
            self.cache.insert(&quote_key(&quote.symbol), quote).await?;
        }
        debug!(
            hits = cached.len(),
            fetched = fetched.len(),
            "Quotes fetched from backend"
        );

        // Preserve the caller's symbol order
        let mut all = cached;
        all.extend(fetched);
        let mut ordered = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(pos) = all.iter().position(|q| &q.symbol == symbol) {
                ordered.push(all.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    /// Run the screener, cached per criteria set
    pub async fn run_screener(&self, req: &ScreenerRequest) -> Result<Vec<ScreenerRow>> {
        let key = req.cache_key();
        if let Some(rows) = self.cache.get::<Vec<ScreenerRow>>(&key).await {
            debug!(key = %key, "Screener served from cache");
            return Ok(rows);
        }

        let token = require_token(&self.session).await?;
        let rows = self.api.run_screener(&token, req).await?;
        self.cache.insert(&key, &rows).await?;
        Ok(rows)
    }
}

// ============================================================================
// Webhooks
// ============================================================================

/// Webhook management with a cached list and write-through mutations
pub struct WebhookService<D: DashboardApi> {
    api: D,
    cache: Arc<QueryCache>,
    session: SessionHandle,
}

impl<D: DashboardApi> WebhookService<D> {
    pub fn new(api: D, cache: Arc<QueryCache>, session: SessionHandle) -> Self {
        Self { api, cache, session }
    }

    pub async fn list(&self) -> Result<Vec<Webhook>> {
        if let Some(webhooks) = self.cache.get::<Vec<Webhook>>(WEBHOOKS_KEY).await {
            debug!("Webhook list served from cache");
            return Ok(webhooks);
        }

        let token = require_token(&self.session).await?;
        let webhooks = self.api.list_webhooks(&token).await?;
        self.cache.insert(WEBHOOKS_KEY, &webhooks).await?;
        Ok(webhooks)
    }

    /// Register a webhook; the cached list is stale afterwards, so drop it
    pub async fn create(&self, req: &CreateWebhookRequest) -> Result<Webhook> {
        let token = require_token(&self.session).await?;
        let webhook = self.api.create_webhook(&token, req).await?;
        self.cache.invalidate(WEBHOOKS_KEY).await;
        debug!(id = %webhook.id, url = %webhook.url, "Webhook created");
        Ok(webhook)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let token = require_token(&self.session).await?;
        self.api.delete_webhook(&token, id).await?;
        self.cache.invalidate(WEBHOOKS_KEY).await;
        debug!(id = %id, "Webhook deleted");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
