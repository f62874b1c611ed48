pub mod transport;

pub use transport::{HttpRequest, HttpResponse, HttpTransport, Payload};
