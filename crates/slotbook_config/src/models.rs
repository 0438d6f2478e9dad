// --- File: crates/slotbook_config/src/models.rs ---

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/slotbook.db, overridable via SLOTBOOK__DATABASE__URL
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/slotbook.db".to_string(),
        }
    }
}

// --- Booking Policy ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    /// Share of the service price collected up front, 0.0..=1.0.
    pub deposit_fraction: f64,
    pub currency: String,
    /// Upper bound on a single checkout handoff call.
    pub checkout_timeout_ms: u64,
    /// Redirect target used when no payment provider is enabled.
    pub fallback_checkout_url: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            deposit_fraction: 0.20,
            currency: "usd".to_string(),
            checkout_timeout_ms: 15_000,
            fallback_checkout_url: "http://127.0.0.1:8080/booking/pending".to_string(),
        }
    }
}

// --- Slot Schedule ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Rolling window, in days from today, kept provisioned.
    pub horizon_days: u32,
    /// Hourly start times as "HH:MM".
    pub times: Vec<String>,
    /// Weekday names ("Mon", "tuesday", ...).
    pub weekdays: Vec<String>,
    pub provision_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: 60,
            times: ["09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00", "17:00"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            weekdays: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            provision_on_startup: true,
        }
    }
}

impl ScheduleConfig {
    /// Parses `times`, sorted and de-duplicated.
    pub fn times_of_day(&self) -> Result<Vec<NaiveTime>, String> {
        let mut parsed = self
            .times
            .iter()
            .map(|raw| {
                NaiveTime::parse_from_str(raw, "%H:%M")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                    .map_err(|e| format!("invalid schedule time '{}': {}", raw, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        parsed.sort();
        parsed.dedup();
        Ok(parsed)
    }

    pub fn weekday_filter(&self) -> Result<Vec<Weekday>, String> {
        self.weekdays
            .iter()
            .map(|raw| {
                raw.parse::<Weekday>()
                    .map_err(|_| format!("invalid schedule weekday '{}'", raw))
            })
            .collect()
    }
}

// --- Admin Credentials ---
// The password is normally "secret_from_env" and resolved from ADMIN_PASSWORD.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub session_ttl_minutes: i64,
    pub max_failed_logins: u32,
    pub lockout_minutes: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            session_ttl_minutes: 120,
            max_failed_logins: 5,
            lockout_minutes: 15,
        }
    }
}

// --- Catalog ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceOfferingConfig {
    pub id: String,
    /// Falls back to a title-cased version of `id`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Price in the smallest currency unit (cents).
    pub price_cents: i64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub services: Vec<ServiceOfferingConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let services = [
            ("eyebrow_wax", 2500),
            ("upper_lip", 1500),
            ("full_leg", 8000),
            ("half_leg", 4500),
            ("bikini", 3500),
            ("brazilian", 6500),
        ]
        .iter()
        .map(|(id, price_cents)| ServiceOfferingConfig {
            id: id.to_string(),
            display_name: None,
            price_cents: *price_cents,
        })
        .collect();
        Self { services }
    }
}

// --- Stripe Config ---
// Holds non-secret Stripe config. STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET come from env.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
    pub success_url: String, // Mandatory
    pub cancel_url: String,  // Mandatory
    #[serde(default = "default_deposit_product_name")]
    pub product_name: String,
    /// Overrides `booking.currency` for Stripe line items.
    #[serde(default)]
    pub currency: Option<String>,
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_deposit_product_name() -> String {
    "Appointment Deposit".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: default_log_level(),
            use_stripe: false,
            database: DatabaseConfig::default(),
            booking: BookingConfig::default(),
            schedule: ScheduleConfig::default(),
            admin: AdminConfig::default(),
            catalog: CatalogConfig::default(),
            stripe: None,
        }
    }
}

impl AppConfig {
    /// Checks the values that serde cannot: ranges, parsable schedule entries, credentials.
    pub fn validate(&self) -> Result<(), String> {
        let fraction = self.booking.deposit_fraction;
        if !(0.0..=1.0).contains(&fraction) || fraction.is_nan() {
            return Err(format!(
                "booking.deposit_fraction must be within 0.0..=1.0, got {}",
                fraction
            ));
        }
        if self.schedule.times_of_day()?.is_empty() {
            return Err("schedule.times must not be empty".to_string());
        }
        self.schedule.weekday_filter()?;
        if self.admin.username.trim().is_empty() || self.admin.password.is_empty() {
            return Err("admin.username and admin.password must be set".to_string());
        }
        if self.admin.session_ttl_minutes <= 0 {
            return Err("admin.session_ttl_minutes must be positive".to_string());
        }
        if self.use_stripe && self.stripe.is_none() {
            return Err("use_stripe is enabled but the [stripe] section is missing".to_string());
        }
        if let Some(bad) = self.catalog.services.iter().find(|s| s.price_cents <= 0) {
            return Err(format!("catalog service '{}' must have a positive price", bad.id));
        }
        Ok(())
    }
}
