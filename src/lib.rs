pub mod allergy_check;
pub mod api;
pub mod config;
pub mod debounce;
pub mod models;
pub mod notifications;
pub mod prescriptions; // Prescription table + create/edit form
pub mod suggestions; // AI suggestion panel + search driver

pub use api::{ApiError, ClinicApi, HttpClinicApi};
pub use config::ClientConfig;
pub use prescriptions::PrescriptionListController;
pub use suggestions::{spawn_search, SearchEvent, SearchHandle, SuggestionSearchController};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// built-in filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("{} client core v{}", config::APP_NAME, config::APP_VERSION);
    }
}
