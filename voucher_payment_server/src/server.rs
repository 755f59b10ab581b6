use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use voucher_payment_engine::{OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{ResendNotifier, StripeCheckout},
    routes::{configure_api, WebhookSecret},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let payments =
        StripeCheckout::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifier =
        ResendNotifier::new(config.resend.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let webhook_secret = WebhookSecret(config.stripe.webhook_secret.clone());
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), payments.clone(), notifier.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("vpg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(webhook_secret.clone()))
            .configure(configure_api::<SqliteDatabase, StripeCheckout, ResendNotifier>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
