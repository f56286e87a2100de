use serde::{Deserialize, Serialize};

use crate::domain::{EmailRequest, EmailResponse};

#[derive(Debug, Serialize)]
struct SendEmailJsonRequest<'a> {
    creds: JsonCredentials<'a>,
    to_list: &'a [String],
    subject: &'a str,
    body: &'a str,
    html: bool,
    from_name: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonCredentials<'a> {
    email: &'a str,
    pwd: &'a str,
}

// Missing or `null` fields decode to their zero values; `{}` is a rejection, not a decode error.
#[derive(Debug, Deserialize)]
struct SendEmailJsonResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

pub fn encode_send_email_json(request: &EmailRequest) -> Result<Vec<u8>, serde_json::Error> {
    let creds = request.credentials();
    let wire = SendEmailJsonRequest {
        creds: JsonCredentials {
            email: creds.email(),
            pwd: creds.password().expose(),
        },
        to_list: request.to_list(),
        subject: request.subject(),
        body: request.body(),
        html: request.content_type_value().is_html(),
        from_name: request.from_name_value().unwrap_or_default(),
    };
    serde_json::to_vec(&wire)
}

pub fn decode_send_email_json_response(body: &str) -> Result<EmailResponse, serde_json::Error> {
    let parsed: SendEmailJsonResponse = serde_json::from_str(body)?;
    Ok(EmailResponse {
        success: parsed.success.unwrap_or_default(),
        message: parsed.message.unwrap_or_default(),
    })
}
