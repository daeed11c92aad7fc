//! Dashboard backend API boundary
//!
//! Wire types, error mapping, and the reqwest-backed client for the
//! auth and data endpoints the dashboard consumes.

pub mod client;
pub mod errors;
pub mod types;

// Re-export commonly used types for convenience
pub use client::{ApiClient, AuthApi, DashboardApi};
pub use errors::{ApiError, ApiResult};
pub use types::{
    AuthResponse, CreateWebhookRequest, LoginRequest, NotificationChannels, ProfileUpdate, Quote,
    RegisterRequest, ScreenerRequest, ScreenerRow, Subscription, SubscriptionStatus,
    SubscriptionTier, Theme, User, UserSettings, Webhook,
};
