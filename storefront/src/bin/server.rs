use std::sync::Arc;

use storefront::api::AppState;
use storefront::executable_utils::{initialize_executable, initialize_tracing, run_server};
use storefront::model::GenericError;
use storefront::service::OrderService;
use storefront::shipping::ExpressDeliveryMock;
use storefront::storage::{OrderStorage, PgOrderStorage};

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    let config = initialize_executable()?;
    initialize_tracing(&config.server.log_level);

    let storage: Arc<dyn OrderStorage> =
        Arc::new(PgOrderStorage::new(&config.common.database_url).await?);
    let service = Arc::new(OrderService::new(storage, Arc::new(ExpressDeliveryMock)));

    run_server(config.server, AppState { service }).await
}
