use bytes::{Buf, BytesMut};
use clap::{Parser, Subcommand};
use reqwest::Method;

use testupstream::directive::DirectiveBuilder;
use testupstream::encoding::{eventstream, sse, Message, ResponseType};

#[derive(Parser)]
#[command(name = "upstream-cli")]
#[command(about = "Send directive-carrying requests to a testupstream instance", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the upstream is up
    Health,
    /// Send a request with directives and print the response
    Send(SendArgs),
}

#[derive(clap::Args)]
struct SendArgs {
    /// Request path
    #[arg(default_value = "/v1/chat/completions")]
    path: String,

    #[arg(short = 'X', long, default_value = "POST")]
    method: String,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    #[arg(long)]
    expect_host: Option<String>,

    /// `name:value`, repeatable
    #[arg(long, value_parser = parse_pair)]
    expect_header: Vec<(String, String)>,

    /// Header name that must not be sent upstream, repeatable
    #[arg(long)]
    absent_header: Vec<String>,

    #[arg(long)]
    expect_id: Option<String>,

    #[arg(long)]
    expect_path: Option<String>,

    #[arg(long)]
    expect_body: Option<String>,

    #[arg(long)]
    status: Option<u16>,

    /// `name:value`, repeatable
    #[arg(long, value_parser = parse_pair)]
    response_header: Vec<(String, String)>,

    /// Response payload; `\n` separates streamed frames
    #[arg(long)]
    response_body: Option<String>,

    /// `sse` or `aws-event-stream`; plain JSON when omitted
    #[arg(long)]
    response_type: Option<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name:value, got {raw:?}"))
}

impl SendArgs {
    fn directives(&self) -> Result<DirectiveBuilder, Box<dyn std::error::Error>> {
        let mut builder = DirectiveBuilder::new();

        if let Some(host) = &self.expect_host {
            builder = builder.expected_host(host);
        }
        for (name, value) in &self.expect_header {
            builder = builder.expected_header(name, value);
        }
        for name in &self.absent_header {
            builder = builder.absent_header(name);
        }
        if let Some(id) = &self.expect_id {
            builder = builder.expected_upstream_id(id);
        }
        if let Some(path) = &self.expect_path {
            builder = builder.expected_path(path);
        }
        if let Some(body) = &self.expect_body {
            builder = builder.expected_request_body(body);
        }
        if let Some(status) = self.status {
            builder = builder.response_status(status);
        }
        for (name, value) in &self.response_header {
            builder = builder.response_header(name, value);
        }
        if let Some(body) = &self.response_body {
            builder = builder.response_body(body.replace("\\n", "\n"));
        }
        if let Some(kind) = &self.response_type {
            builder = builder.response_type(ResponseType::from_directive(Some(kind.as_str()))?);
        }

        Ok(builder)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            println!("{}", res.status());
        }
        Commands::Send(args) => {
            let method = Method::from_bytes(args.method.to_uppercase().as_bytes())?;
            let mut req = client
                .request(method, format!("{}{}", cli.url, args.path))
                .headers(args.directives()?.into_headers()?);
            if let Some(data) = &args.data {
                req = req.body(data.clone());
            }
            print_response(req.send().await?).await?;
        }
    }

    Ok(())
}

async fn print_response(mut res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", res.status());
    for (name, value) in res.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();

    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut buf = BytesMut::new();
    while let Some(chunk) = res.chunk().await? {
        buf.extend_from_slice(&chunk);

        if content_type == eventstream::CONTENT_TYPE {
            while let Some((message, used)) = Message::decode(&buf)? {
                println!(
                    "[{}] {}",
                    message.event_type().unwrap_or("?"),
                    String::from_utf8_lossy(&message.payload)
                );
                buf.advance(used);
            }
        } else if content_type == sse::CONTENT_TYPE {
            while let Some(end) = buf.windows(2).position(|w| w == b"\n\n") {
                let event = buf.split_to(end + 2);
                print!("{}", String::from_utf8_lossy(&event));
            }
        }
    }

    if !buf.is_empty() {
        println!("{}", String::from_utf8_lossy(&buf));
    }
    Ok(())
}
