use clap::{Parser, Subcommand};
use lead_capture::form::read_document;
use lead_capture::{FieldMapping, FormSource, LeadCaptureClient, LeadCaptureError, SubmitterConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Submit form data to a Marketo lead capture endpoint
#[derive(Parser)]
#[command(
    name = "lead-capture",
    about = "Submit form data to a Marketo lead capture endpoint",
    long_about = None
)]
struct Cli {
    /// Marketo instance, e.g. https://app-sjqe.marketo.com [env: LEAD_CAPTURE_ENDPOINT]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Munchkin account id, e.g. 718-GIV-198 [env: LEAD_CAPTURE_MUNCHKIN_ID]
    #[arg(long, global = true)]
    munchkin_id: Option<String>,

    /// Form id [env: LEAD_CAPTURE_FORM_ID]
    #[arg(long, global = true)]
    form_id: Option<String>,

    /// Page the submission is made from [env: LEAD_CAPTURE_PAGE_URL]
    #[arg(long, global = true)]
    page_url: Option<String>,

    /// Cookies of the page, as a Cookie header [env: LEAD_CAPTURE_COOKIES]
    #[arg(long, global = true)]
    cookies: Option<String>,

    /// Send application/x-www-form-urlencoded instead of multipart/form-data
    #[arg(long, global = true)]
    url_encoded: bool,

    /// Print the request instead of sending it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit explicit fields
    ///
    /// Usage examples:
    /// # Submit a simple lead
    /// lead-capture fields -f FirstName=Billy -f LastName=Eyelash
    ///
    /// # Repeated names are sent as interest[]
    /// lead-capture fields -f interest=a -f interest=b
    Fields {
        /// Field as name=value; may be repeated
        #[arg(short, long = "field", value_name = "NAME=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Submit a form from an HTML document
    Form {
        /// HTML file containing the form
        file: PathBuf,

        /// CSS selector of the form
        #[arg(long, default_value = "form")]
        selector: String,
    },
}

fn parse_field(field: &str) -> Result<(String, String), String> {
    match field.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("invalid field '{field}', expected NAME=VALUE")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = SubmitterConfig::from_env().merge(SubmitterConfig {
        endpoint: args.endpoint,
        munchkin_id: args.munchkin_id,
        form_id: args.form_id,
        page_url: args.page_url,
        cookies: args.cookies,
        url_encoded: args.url_encoded,
    });

    let target = config.target()?;
    let environment = config.environment()?;
    let client = LeadCaptureClient::new(
        Box::new(http_client::native::NativeClient::new()),
        Arc::new(environment),
    )
    .with_body_encoding(config.body_encoding());

    let mut request = match args.command {
        Commands::Fields { fields } => {
            let mapping = fields
                .iter()
                .map(|field| parse_field(field))
                .collect::<Result<FieldMapping, _>>()?;
            client.prepare_fields(&target, mapping)?
        }
        Commands::Form { file, selector } => {
            let document = read_document(&file)?;
            client.prepare_form(&target, FormSource::selector(&document, &selector))?
        }
    };

    if args.dry_run {
        println!("{} {}", request.method(), request.url());
        let mut names: Vec<_> = request.header_names().map(|name| name.to_string()).collect();
        names.sort();
        for name in names {
            if let Some(values) = request.header(name.as_str()) {
                println!("{name}: {}", values.last().as_str());
            }
        }
        println!();
        println!(
            "{}",
            request.body_string().await.map_err(LeadCaptureError::from)?
        );
        return Ok(());
    }

    let mut response = client.send(request).await?;
    println!("{}", response.status());
    println!(
        "{}",
        response.body_string().await.map_err(LeadCaptureError::from)?
    );

    Ok(())
}
