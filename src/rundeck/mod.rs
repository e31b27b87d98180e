/*!
Rundeck REST API integration.

  request.rs   : Operation / Params / Flag / RequestContext + build_request
  client.rs    : reqwest-backed Client (one call per invocation, no retries)
  response.rs  : ApiResponse shape classification
  normalize.rs : drop-key / strip-substring record normalization
  files.rs     : entry-id -> local path resolution for uploads
  error.rs     : Error enum shared by all of the above
*/

pub mod client;
pub mod error;
pub mod files;
pub mod normalize;
pub mod request;
pub mod response;

pub use client::Client;
pub use error::{Error, Result};
pub use files::{FileResolver, LocalFileStore};
pub use normalize::normalize;
pub use request::{DEFAULT_API_VERSION, Flag, Operation, Params, RequestContext};
pub use response::ApiResponse;
