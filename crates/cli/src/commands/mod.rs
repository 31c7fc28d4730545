//! CLI command implementations.

pub mod catalog;
pub mod item;
pub mod order;

use std::sync::Arc;

use larek_state::{AppState, EventBus};
use larek_storefront::config::API_ORIGIN_VAR;
use larek_storefront::{LarekClient, ShopPresenter, StorefrontConfig, diagnostics};

/// A wired shop session: state, bus and presenter over the HTTP client.
pub struct Shop {
    pub presenter: ShopPresenter<LarekClient>,
}

impl Shop {
    /// Load configuration and wire a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, or the HTTP
    /// client cannot be built.
    pub fn connect(api_origin: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let config = StorefrontConfig::from_lookup(|key| match api_origin {
            Some(origin) if key == API_ORIGIN_VAR => Some(origin.to_string()),
            _ => std::env::var(key).ok(),
        })?;
        tracing::debug!(api = %config.api_url, "configuration loaded");

        let bus = EventBus::with_max_depth(config.max_dispatch_depth);
        diagnostics::install(&bus);

        let state = Arc::new(AppState::new(bus));
        let presenter = ShopPresenter::new(state, LarekClient::new(&config)?);
        presenter.wire()?;

        Ok(Self { presenter })
    }

    pub fn state(&self) -> &AppState {
        self.presenter.state()
    }

    pub fn bus(&self) -> &EventBus {
        self.presenter.bus()
    }
}
