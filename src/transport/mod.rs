//! Transport layer: wire-format details (serialization/deserialization).

mod send_email;

pub use send_email::{decode_send_email_json_response, encode_send_email_json};
