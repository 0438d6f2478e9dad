// --- File: crates/slotbook_booking/src/catalog.rs ---
use slotbook_common::services::{BoxFuture, BoxedError, CatalogEntry, CatalogService};
use slotbook_config::CatalogConfig;

/// Catalog served from the `[catalog]` section of the configuration.
#[derive(Debug, Clone)]
pub struct ConfigCatalog {
    entries: Vec<CatalogEntry>,
}

impl ConfigCatalog {
    pub fn from_config(config: &CatalogConfig) -> Self {
        let entries = config
            .services
            .iter()
            .map(|service| CatalogEntry {
                id: service.id.clone(),
                display_name: service
                    .display_name
                    .clone()
                    .unwrap_or_else(|| display_name_for(&service.id)),
                price_cents: service.price_cents,
            })
            .collect();
        Self { entries }
    }
}

impl CatalogService for ConfigCatalog {
    fn list_bookable_services(&self) -> BoxFuture<'_, Vec<CatalogEntry>, BoxedError> {
        Box::pin(async move {
            Ok(self
                .entries
                .iter()
                .filter(|entry| entry.price_cents > 0)
                .cloned()
                .collect())
        })
    }
}

/// `full_leg` -> `Full Leg`
pub fn display_name_for(id: &str) -> String {
    id.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
