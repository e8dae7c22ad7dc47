//! Authorizing HTTP client for the repair-desk API.
//!
//! [`ApiClient`] owns a reqwest client preconfigured with the API's defaults (JSON content
//! type, request timeout) and a [`Pipeline`] of stages every call passes through. The standard
//! pipeline built by [`ApiClient::new`] or [`ApiClient::for_session`] consists of:
//!
//! 1. [`AttachBearer`], which sets `Authorization: Bearer <token>` from secure storage;
//! 2. [`ResponseHandler`], which clears the token on 401, raises a [`Notice`], and re-raises the
//!    failure to the caller.
//!
//! Callers always see the original failure after the stages ran. Nothing is retried.

pub mod authorize;
pub mod notify;
pub mod pipeline;
pub mod respond;

pub use authorize::*;
pub use notify::*;
pub use pipeline::*;
pub use respond::*;

// crates.io
use reqwest::{
	ClientBuilder, Method, RequestBuilder, Response,
	header::{CONTENT_TYPE, HeaderMap, HeaderValue},
	multipart::Form,
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ConfigError, map_send_error},
	obs::{self, RequestOutcome},
	session::Session,
	store::{GuardedStore, SecureStore},
};

/// HTTP client that runs every call through the configured [`Pipeline`].
#[derive(Clone)]
pub struct ApiClient {
	config: Arc<ClientConfig>,
	http: ReqwestClient,
	pipeline: Arc<Pipeline>,
}
impl ApiClient {
	/// Starts a builder with an empty pipeline.
	pub fn builder(config: ClientConfig) -> ApiClientBuilder {
		ApiClientBuilder::new(config)
	}

	/// Builds a client with the standard authorizing pipeline over `store`.
	pub fn new(
		config: ClientConfig,
		store: Arc<dyn SecureStore>,
		notifier: Arc<dyn Notifier>,
	) -> Result<Self, ConfigError> {
		Self::builder(config).authorize(store, notifier).build()
	}

	/// Builds a client with the standard pipeline wired to `session`.
	///
	/// A 401 from any call moves the session to unauthenticated.
	pub fn for_session(
		config: ClientConfig,
		session: &Arc<Session>,
		notifier: Arc<dyn Notifier>,
	) -> Result<Self, ConfigError> {
		Self::builder(config)
			.request_stage(AttachBearer::new(session.store()))
			.response_stage(
				ResponseHandler::new(session.store(), notifier).with_listener(session.clone()),
			)
			.build()
	}

	/// Configuration the client was built from.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Stages every call runs through.
	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	/// Starts a raw request against `path`, relative to the base URL.
	pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
		let url = self.config.endpoint(path)?;

		Ok(self.http.request(method, url).timeout(self.config.timeout))
	}

	/// Sends a raw request through the pipeline.
	///
	/// Non-success statuses come back as [`Error::Unauthorized`] or [`Error::Rejected`] after the
	/// inbound stages observed them.
	pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
		let outcome = self.dispatch(builder).await;
		let outcome = self.pipeline.settle(outcome).await;

		obs::record_request_outcome(RequestOutcome::of(&outcome));

		outcome
	}

	/// `GET`s `path` and decodes the JSON body.
	pub async fn get_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let builder = self.request(Method::GET, path)?;

		self.send_json(builder).await
	}

	/// `POST`s `body` as JSON to `path` and decodes the JSON reply.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let builder = self.request(Method::POST, path)?.json(body);

		self.send_json(builder).await
	}

	/// `PUT`s `body` as JSON to `path` and decodes the JSON reply.
	pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let builder = self.request(Method::PUT, path)?.json(body);

		self.send_json(builder).await
	}

	/// `DELETE`s `path`, discarding any reply body.
	pub async fn delete(&self, path: &str) -> Result<()> {
		let builder = self.request(Method::DELETE, path)?;

		self.send(builder).await?;

		Ok(())
	}

	/// `POST`s a multipart form to `path` using the upload timeout and decodes the JSON reply.
	pub async fn upload<T>(&self, path: &str, form: Form) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let builder =
			self.request(Method::POST, path)?.multipart(form).timeout(self.config.upload_timeout);

		self.send_json(builder).await
	}

	/// Sends a raw request through the pipeline and decodes the JSON reply.
	///
	/// Bodies that do not match `T` run through the inbound stages as [`Error::Unexpected`].
	pub async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send(builder).await?;
		let bytes = match response.bytes().await {
			Ok(bytes) => bytes,
			Err(e) => return self.fail(map_send_error(e)).await,
		};
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		match serde_path_to_error::deserialize(&mut deserializer) {
			Ok(value) => Ok(value),
			Err(e) =>
				self.fail(Error::Unexpected {
					message: format!("response body does not match the expected shape: {e}"),
				})
				.await,
		}
	}

	async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build().map_err(map_send_error)?;
		let request = self.pipeline.prepare(request).await?;
		let response = self.http.execute(request).await.map_err(map_send_error)?;

		classify(response).await
	}

	// Failures found after a successful status still go through the inbound stages.
	async fn fail<T>(&self, error: Error) -> Result<T> {
		match self.pipeline.settle(Err(error)).await {
			Err(e) => Err(e),
			Ok(_) => Err(Error::Unexpected {
				message: "a response stage replaced a failed body with a new response".into(),
			}),
		}
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("pipeline", &self.pipeline)
			.finish()
	}
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
	config: ClientConfig,
	http: Option<ClientBuilder>,
	pipeline: Pipeline,
}
impl ApiClientBuilder {
	fn new(config: ClientConfig) -> Self {
		Self { config, http: None, pipeline: Pipeline::default() }
	}

	/// Starts from a caller-provided reqwest builder (proxies, TLS roots, ...).
	///
	/// The JSON content type and the request timeout are still applied on top.
	pub fn http_client_builder(mut self, builder: ClientBuilder) -> Self {
		self.http = Some(builder);

		self
	}

	/// Appends an outbound stage.
	pub fn request_stage(mut self, stage: impl 'static + RequestStage) -> Self {
		self.pipeline.push_request_stage(Arc::new(stage));

		self
	}

	/// Appends an inbound stage.
	pub fn response_stage(mut self, stage: impl 'static + ResponseStage) -> Self {
		self.pipeline.push_response_stage(Arc::new(stage));

		self
	}

	/// Appends the standard bearer + response handling stages over `store`.
	///
	/// Both stages share one [`GuardedStore`], so a token whose delete failed after a 401 is no
	/// longer attached.
	pub fn authorize(self, store: Arc<dyn SecureStore>, notifier: Arc<dyn Notifier>) -> Self {
		let store: Arc<dyn SecureStore> = Arc::new(GuardedStore::new(store));

		self.request_stage(AttachBearer::new(store.clone()))
			.response_stage(ResponseHandler::new(store, notifier))
	}

	/// Builds the client.
	pub fn build(self) -> Result<ApiClient, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		let http = self
			.http
			.unwrap_or_else(ReqwestClient::builder)
			.default_headers(headers)
			.timeout(self.config.timeout)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(ApiClient { config: Arc::new(self.config), http, pipeline: Arc::new(self.pipeline) })
	}
}
impl Debug for ApiClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClientBuilder")
			.field("base_url", &self.config.base_url.as_str())
			.field("pipeline", &self.pipeline)
			.finish()
	}
}
