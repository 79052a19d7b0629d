use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, middleware, post, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use rs_lm_core::config::{self, env_key, env_parsed, env_string};
use rs_lm_core::{ConfigError, ConfigOptions, GenerationError, LanguageModel, Stats, TrainingError};

const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";
const ENV_SEED: &str = "SEED";
const ENV_PAYLOAD_LIMIT: &str = "PAYLOAD_LIMIT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
/// Largest accepted training body, in bytes.
const DEFAULT_PAYLOAD_LIMIT: usize = 16 * 1024 * 1024;

const DEFAULT_MAX_LENGTH: usize = 50;
const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	prompt: Option<String>,
	max_length: Option<usize>,
	temperature: Option<f64>,
}

struct SharedData {
	model: LanguageModel
}

/// Server settings, read from `RS_LM_*` environment variables.
struct Settings {
	host: String,
	port: u16,
	/// Fixed seed for reproducible sampling; OS entropy when unset.
	seed: Option<u64>,
	payload_limit: usize,
}

impl Settings {
	fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			host: env_string(&env_key(ENV_HOST))?.unwrap_or_else(|| DEFAULT_HOST.to_owned()),
			port: env_parsed::<u16>(&env_key(ENV_PORT))?.unwrap_or(DEFAULT_PORT),
			seed: env_parsed::<u64>(&env_key(ENV_SEED))?,
			payload_limit: env_parsed::<usize>(&env_key(ENV_PAYLOAD_LIMIT))?.unwrap_or(DEFAULT_PAYLOAD_LIMIT),
		})
	}
}

enum TrainFailure {
	Lock,
	Training(TrainingError),
}

/// HTTP PUT endpoint `/v1/configure`
///
/// Applies the provided options on top of the current configuration.
/// Returns the resulting configuration as JSON.
#[put("/v1/configure")]
async fn put_configure(data: web::Data<Mutex<SharedData>>, query: web::Query<ConfigOptions>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.model.configure(&query) {
		Ok(config) => HttpResponse::Ok().json(config),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// HTTP POST endpoint `/v1/train`
///
/// Trains the model on the raw request body, replacing anything learned
/// before. Runs on the blocking pool. Returns the new stats as JSON.
#[post("/v1/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, body: web::Bytes) -> impl Responder {
	let outcome = web::block(move || -> Result<Stats, TrainFailure> {
		let mut shared_data = data.lock().map_err(|_| TrainFailure::Lock)?;
		shared_data.model.train_bytes(&body).copied().map_err(TrainFailure::Training)
	})
	.await;

	match outcome {
		Ok(Ok(stats)) => HttpResponse::Ok().json(stats),
		Ok(Err(TrainFailure::Training(e))) => HttpResponse::BadRequest().body(e.to_string()),
		Ok(Err(TrainFailure::Lock)) => HttpResponse::InternalServerError().body("Model lock failed"),
		Err(e) => HttpResponse::InternalServerError().body(format!("Training aborted: {e}")),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Continues `prompt` and returns the text with its step trace as JSON.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let prompt = query.prompt.as_deref().unwrap_or("");
	let max_length = query.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
	let temperature = query.temperature.unwrap_or(DEFAULT_TEMPERATURE);

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.model.generate(prompt, max_length, temperature) {
		Ok(result) => HttpResponse::Ok().json(result),
		Err(e @ GenerationError::InvalidConfig(_)) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e @ GenerationError::EmptyVocabulary) => HttpResponse::Conflict().body(e.to_string()),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.model.stats())
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(put_configure)
		.service(post_train)
		.service(get_generated)
		.service(get_stats);
}

fn invalid_input(e: ConfigError) -> std::io::Error {
	std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
}

/// Main entry point for the server.
///
/// Builds one untrained model from `RS_LM_*` variables, wraps it in a
/// `Mutex`, and serves it until stopped.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let settings = Settings::from_env().map_err(invalid_input)?;
	let model_config = config::from_env().map_err(invalid_input)?;
	let model = match settings.seed {
		Some(seed) => LanguageModel::seeded(model_config, seed),
		None => LanguageModel::new(model_config),
	}
	.map_err(invalid_input)?;

	log::info!(
		"serving on {}:{} (ngram_size {}, alpha {}, cache {})",
		settings.host,
		settings.port,
		model.config().ngram_size,
		model.config().alpha,
		model.config().cache_max_size
	);

	let shared_model = web::Data::new(Mutex::new(SharedData { model }));
	let payload_limit = settings.payload_limit;

	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.app_data(web::PayloadConfig::new(payload_limit))
			.configure(routes)
	})
		.bind((settings.host.as_str(), settings.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use actix_web::http::StatusCode;
	use actix_web::test;
	use rs_lm_core::{Config, GeneratedResult};

	use super::*;

	fn shared(seed: u64) -> web::Data<Mutex<SharedData>> {
		let model = LanguageModel::seeded(Config::default(), seed).unwrap();
		web::Data::new(Mutex::new(SharedData { model }))
	}

	#[actix_web::test]
	async fn train_then_generate() {
		let app = test::init_service(App::new().app_data(shared(7)).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/v1/train")
			.set_payload("the cat sat. the dog sat.")
			.to_request();
		let stats: Stats = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats.total_tokens, 8);
		assert_eq!(stats.vocabulary_size, 5);

		let req = test::TestRequest::get()
			.uri("/v1/generate?prompt=the%20cat&max_length=1&temperature=1.0")
			.to_request();
		let result: GeneratedResult = test::call_and_read_body_json(&app, req).await;
		assert_eq!(result.tokens.len(), 1);
		assert_eq!(result.options[0][0].token, "sat");

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: Stats = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats.unique_ngrams, 16);
	}

	#[actix_web::test]
	async fn reports_bad_requests() {
		let app = test::init_service(App::new().app_data(shared(7)).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/generate?prompt=hello").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

		let req = test::TestRequest::post()
			.uri("/v1/train")
			.set_payload(vec![0xff_u8, 0xfe])
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::post().uri("/v1/train").set_payload("a b c.").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/generate?prompt=a&temperature=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/generate?prompt=a&max_length=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn configure_merges_options() {
		let app = test::init_service(App::new().app_data(shared(7)).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/configure?alpha=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::put()
			.uri("/v1/configure?alpha=0.5&smoothing_method=laplace")
			.to_request();
		let config: Config = test::call_and_read_body_json(&app, req).await;
		assert_eq!(config.alpha, 0.5);
		assert_eq!(config.ngram_size, 3);
	}
}
