mod body;
mod context;
mod error;
mod handler;
mod outcome;
mod respond;
mod router;

pub mod file;
pub mod sse;
pub mod statics;
pub mod stream;
pub mod ws;

pub use body::OptionReqBody;
pub use body::ReqBody;
pub use body::ResponseBody;
pub use body::empty_body;
pub use context::Context;
pub use error::BoxError;
pub use error::RouterBuildError;
pub use file::NamedFile;
pub use handler::FnHandler;
pub use handler::Handler;
pub use handler::handler_fn;
pub use outcome::ByteStream;
pub use outcome::IntoOutcome;
pub use outcome::Outcome;
pub use outcome::Part;
pub use outcome::Payload;
pub use router::Protocol;
pub use router::Router;
pub use router::RouterBuilder;
