use std::io;

use mailer_client::{ContentType, Credentials, EmailRequest, MailerClient};
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_url = required_env("MAILER_BASE_URL")?;
    let email = required_env("MAILER_EMAIL")?;
    let password = required_env("MAILER_PASSWORD")?;
    let to = required_env("MAILER_TO")?;
    let subject =
        std::env::var("MAILER_SUBJECT").unwrap_or_else(|_| "Hello from mailer-client".to_owned());
    let body = std::env::var("MAILER_BODY")
        .unwrap_or_else(|_| "<h1>Hello world</h1><p>This is a test.</p>".to_owned());
    let html = std::env::var("MAILER_HTML").map_or(true, |value| value != "0");

    let to_list = to
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();

    let mut request = EmailRequest::new(Credentials::new(email, password), to_list, subject, body)
        .content_type(ContentType::from(html));
    if let Ok(from_name) = std::env::var("MAILER_FROM_NAME") {
        request = request.from_name(from_name);
    }

    let client = MailerClient::new(base_url);
    client.send(request).await?;
    println!("email accepted by {}", client.base_url());

    Ok(())
}
