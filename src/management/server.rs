use crate::management::file_manager::FileManager;
use crate::management::inference_gateway::InferenceGateway;
use crate::management::model::{DetectionModel, UltralyticsModel};
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::web::api::{default, detect, log, misc, track, verify};
use actix_web::web::route;
use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Explicitly constructed service state, injected into every handler through
/// `web::Data` instead of ambient globals.
pub struct AppState {
    pub config: Config,
    pub gateway: InferenceGateway,
}

impl AppState {
    pub fn new(config: Config, gateway: InferenceGateway) -> Self {
        Self { config, gateway }
    }
}

pub struct Server;

impl Server {
    pub fn routes(service_config: &mut web::ServiceConfig) {
        service_config
            .service(detect::initialize())
            .service(verify::initialize())
            .service(track::initialize())
            .service(misc::initialize())
            .service(log::initialize())
            .default_service(route().to(default::default_route));
    }

    pub async fn run() {
        logging_information!(SystemEntry::Initializing);
        let config = Config::load();
        FileManager::initialize().await;
        let model = UltralyticsModel::new(&config);
        if !model.is_loaded() {
            logging_warning!(format!(
                "Model file {model_path} is not available, inference requests will fail",
                model_path = config.model_path
            ));
        }
        let gateway = InferenceGateway::new(Arc::new(model), config.inference_workers);
        let state = web::Data::new(AppState::new(config.clone(), gateway));
        let http_server = loop {
            let state = state.clone();
            let http_server = HttpServer::new(move || {
                let cors = actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600);
                App::new()
                    .wrap(cors)
                    .app_data(state.clone())
                    .configure(Self::routes)
            })
            .bind(format!("0.0.0.0:{}", config.http_server_bind_port));
            match http_server {
                Ok(http_server) => break http_server,
                Err(err) => {
                    logging_critical!(NetworkEntry::BindPortError(err));
                    sleep(Duration::from_secs(config.bind_retry_duration)).await;
                    continue;
                }
            }
        };
        logging_information!(SystemEntry::WebReady);
        logging_information!(SystemEntry::Online);
        if let Err(err) = http_server.run().await {
            logging_emergency!(SystemEntry::WebPanic(err));
        }
    }

    pub async fn terminate() {
        logging_information!(SystemEntry::Terminating);
        FileManager::cleanup().await;
        logging_information!(SystemEntry::TerminateComplete);
    }
}
