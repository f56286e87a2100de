//! Domain layer: request/response types with no I/O.

mod request;
mod response;
mod value;

pub use request::{ContentType, EmailRequest};
pub use response::EmailResponse;
pub use value::{Credentials, Password};
