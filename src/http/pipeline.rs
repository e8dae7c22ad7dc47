//! Composable request/response stages.
//!
//! Outbound stages run in insertion order on the built [`Request`] before it is sent. Inbound
//! stages run in insertion order on the classified outcome before it reaches calling code; each
//! stage receives what the previous one returned, so a stage can observe, replace, or pass
//! through both successes and failures.

// crates.io
use reqwest::{Request, Response};
// self
use crate::_prelude::*;

/// Boxed future returned by pipeline stages.
pub type StageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Outbound stage applied to every request before it is sent.
pub trait RequestStage
where
	Self: Send + Sync,
{
	/// Inspects or modifies the request. Returning an error aborts the call.
	fn on_request<'a>(&'a self, request: Request) -> StageFuture<'a, Request>;
}

/// Inbound stage applied to every outcome before it reaches calling code.
pub trait ResponseStage
where
	Self: Send + Sync,
{
	/// Inspects the outcome and returns what the next stage (or the caller) should see.
	fn on_response<'a>(&'a self, outcome: Result<Response>) -> StageFuture<'a, Response>;
}

/// Ordered set of outbound and inbound stages.
#[derive(Clone, Default)]
pub struct Pipeline {
	request_stages: Vec<Arc<dyn RequestStage>>,
	response_stages: Vec<Arc<dyn ResponseStage>>,
}
impl Pipeline {
	/// Appends an outbound stage.
	pub fn push_request_stage(&mut self, stage: Arc<dyn RequestStage>) {
		self.request_stages.push(stage);
	}

	/// Appends an inbound stage.
	pub fn push_response_stage(&mut self, stage: Arc<dyn ResponseStage>) {
		self.response_stages.push(stage);
	}

	/// Number of outbound stages.
	pub fn request_stage_count(&self) -> usize {
		self.request_stages.len()
	}

	/// Number of inbound stages.
	pub fn response_stage_count(&self) -> usize {
		self.response_stages.len()
	}

	/// Runs every outbound stage over `request`.
	pub async fn prepare(&self, mut request: Request) -> Result<Request> {
		for stage in &self.request_stages {
			request = stage.on_request(request).await?;
		}

		Ok(request)
	}

	/// Runs every inbound stage over `outcome`.
	pub async fn settle(&self, mut outcome: Result<Response>) -> Result<Response> {
		for stage in &self.response_stages {
			outcome = stage.on_response(outcome).await;
		}

		outcome
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline")
			.field("request_stages", &self.request_stages.len())
			.field("response_stages", &self.response_stages.len())
			.finish()
	}
}
