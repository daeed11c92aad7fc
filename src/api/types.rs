//! Wire types for the dashboard backend API
//!
//! These structs mirror the JSON bodies exchanged with the backend.
//! Field names are camelCase on the wire (the backend serves the
//! existing dashboard frontend), so everything carries a serde rename.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Subscription tiers offered by the dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Premium,
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Pro => write!(f, "pro"),
            SubscriptionTier::Premium => write!(f, "premium"),
        }
    }
}

/// Billing status of a subscription
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Expired,
    Canceled,
}

/// Display theme preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

// ============================================================================
// User Model
// ============================================================================

/// Subscription state attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    /// None for free-tier accounts that never expire
    pub expires_at: Option<DateTime<Utc>>,
}

/// Notification delivery channels toggled per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannels {
    pub email: bool,
    pub push: bool,
    pub webhook: bool,
}

/// Per-user dashboard settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: Theme,
    pub notifications: NotificationChannels,
    /// Exchange preselected on market pages (e.g., "NASDAQ")
    pub default_exchange: String,
    /// Symbols pinned to the dashboard home view
    pub default_assets: Vec<String>,
}

/// Authenticated user identity as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub subscription: Subscription,
    pub settings: UserSettings,
}

// ============================================================================
// Auth Request / Response Bodies
// ============================================================================

/// Body for POST /api/auth/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for POST /api/auth/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
}

/// Response from login/register: a bearer token plus the user it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Partial profile update for PUT /api/users/profile
///
/// None fields are omitted from the request body entirely, so the
/// backend only touches what the caller set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
}

// ============================================================================
// Market Data
// ============================================================================

/// Snapshot quote for a single symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub last: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    /// Percent change since previous close
    pub change_percent: Decimal,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

/// Screener criteria for POST /api/screener/run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_volume: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ScreenerRequest {
    /// Deterministic cache key for this criteria set
    ///
    /// Two requests with the same criteria must map to the same cached
    /// result, so the key is built field-by-field rather than from a
    /// serialized body (map ordering is not guaranteed stable).
    pub fn cache_key(&self) -> String {
        format!(
            "screener:{}:{}:{}:{}:{}:{}",
            self.exchange.as_deref().unwrap_or("*"),
            self.min_price.map(|p| p.to_string()).unwrap_or_else(|| "*".to_string()),
            self.max_price.map(|p| p.to_string()).unwrap_or_else(|| "*".to_string()),
            self.min_volume.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string()),
            self.sort_by.as_deref().unwrap_or("*"),
            self.limit.map(|l| l.to_string()).unwrap_or_else(|| "*".to_string()),
        )
    }
}

/// One row of screener output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerRow {
    pub symbol: String,
    pub name: String,
    pub last: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
    pub market_cap: Option<Decimal>,
}

// ============================================================================
// Webhooks
// ============================================================================

/// A registered outbound webhook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: Uuid,
    pub url: String,
    /// Event names this webhook fires on (e.g., "price_alert")
    pub events: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/webhooks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
