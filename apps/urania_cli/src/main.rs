use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use urania::highlights::{subject_key, HighlightColor, HighlightSession, JsonFileHighlightStore};
use urania::{
    compose_export, render_body, ApiResponse, AstrologyApi, Boundary, ExportOptions,
    HttpAstrologyApi, NatalRequest, ReportEnvelope, ReportLoader, ReportSection, ReportState,
};
use urania_config::UraniaSettings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Natal report engine driver")]
struct Cli {
    /// Config file (default: configs/urania.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search cities by name.
    Cities {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// ISO 3166-1 alpha-2 filter.
        #[arg(long)]
        country: Option<String>,
    },
    /// Run the natal calculation and print the JSON response.
    Natal(BirthArgs),
    /// Fetch the chart image.
    Chart {
        #[command(flatten)]
        birth: BirthArgs,
        #[arg(long)]
        dark: bool,
        /// Write the SVG here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a report link token for the birth data.
    Link(BirthArgs),
    /// Load a report from a link token and export it as XHTML.
    Report {
        token: String,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Comma-separated sections (default: all).
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
        #[arg(long)]
        no_highlights: bool,
    },
    /// Add a highlight to a report's text and persist it.
    Highlight {
        token: String,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        end: usize,
        #[arg(long, default_value = "yellow")]
        color: String,
    },
}

#[derive(Args, Debug)]
struct BirthArgs {
    /// JSON file with the birth data; individual flags override its fields.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
    #[arg(long)]
    tz: Option<String>,
}

impl BirthArgs {
    fn to_json(&self) -> anyhow::Result<Value> {
        let mut body = match &self.input {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => json!({}),
        };
        let Value::Object(map) = &mut body else {
            bail!("birth data must be a JSON object");
        };
        let overrides = [
            ("name", self.name.clone().map(Value::from)),
            ("birth_date", self.date.clone().map(Value::from)),
            ("birth_time", self.time.clone().map(Value::from)),
            ("city", self.city.clone().map(Value::from)),
            ("country_code", self.country.clone().map(Value::from)),
            ("latitude", self.lat.map(Value::from)),
            ("longitude", self.lng.map(Value::from)),
            ("timezone", self.tz.clone().map(Value::from)),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
        Ok(body)
    }

    fn to_request(&self) -> anyhow::Result<NatalRequest> {
        NatalRequest::from_json(&self.to_json()?).map_err(|issues| {
            let lines: Vec<String> = issues
                .iter()
                .map(|i| format!("{}: {}", i.field, i.message))
                .collect();
            anyhow::anyhow!("invalid birth data: {}", lines.join("; "))
        })
    }
}

fn print_response(response: ApiResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        bail!("request failed with status {}", response.status);
    }
    Ok(())
}

fn client(settings: &UraniaSettings) -> anyhow::Result<HttpAstrologyApi> {
    HttpAstrologyApi::new(&settings.upstream).context("Upstream client is not configured")
}

fn parse_sections(names: &[String]) -> anyhow::Result<ExportOptions> {
    let mut options = ExportOptions::default();
    if !names.is_empty() {
        options.sections = names
            .iter()
            .map(|n| {
                ReportSection::from_name(n).with_context(|| format!("unknown section {:?}", n))
            })
            .collect::<anyhow::Result<_>>()?;
    }
    Ok(options)
}

fn request_key(request: &NatalRequest) -> String {
    subject_key(
        &request.name,
        &request.birth_date,
        &request.birth_time,
        &request.city,
    )
}

fn write_output(path: &PathBuf, text: &str) -> anyhow::Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

async fn load_report(
    api: &dyn AstrologyApi,
    token: &str,
) -> anyhow::Result<Box<urania::LoadedReport>> {
    match ReportLoader::new().load(api, token, Utc::now()).await {
        Some(ReportState::Ready(report)) => Ok(report),
        Some(ReportState::Malformed) => bail!("report link is malformed"),
        Some(ReportState::Expired) => bail!("report link has expired; generate a new one"),
        Some(ReportState::Failed { message, retryable }) => {
            if retryable {
                bail!("report failed: {} (retry may succeed)", message)
            }
            bail!("report failed: {}", message)
        }
        None => bail!("report load was cancelled"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => urania_config::load_settings_from(path)?,
        None => urania_config::load_settings()?,
    };
    log::debug!("upstream base url: {}", settings.upstream.base_url);

    match cli.command {
        Command::Cities { query, limit, country } => {
            let boundary = Boundary::from_settings(&settings.upstream);
            let body = json!({ "query": query, "limit": limit, "country": country });
            print_response(boundary.cities(&body).await)?;
        }
        Command::Natal(birth) => {
            let boundary = Boundary::from_settings(&settings.upstream);
            print_response(boundary.natal(&birth.to_json()?).await)?;
        }
        Command::Chart { birth, dark, out } => {
            let boundary = Boundary::from_settings(&settings.upstream);
            let mut body = birth.to_json()?;
            if dark {
                body["style"] = json!({ "theme": "dark" });
            }
            let response = boundary.chart(&body).await;
            if !response.is_success() {
                return print_response(response);
            }
            let svg = response.body["svg"].as_str().unwrap_or_default();
            match out {
                Some(path) => {
                    write_output(&path, svg)?;
                    log::info!("chart written to {}", path.display());
                }
                None => println!("{}", svg),
            }
        }
        Command::Link(birth) => {
            let envelope = ReportEnvelope::new(birth.to_request()?, Utc::now());
            println!("{}", envelope.encode());
        }
        Command::Report {
            token,
            out,
            sections,
            no_highlights,
        } => {
            let mut options = parse_sections(&sections)?;
            options.include_highlights = !no_highlights;
            let api = client(&settings)?;
            let report = load_report(&api, &token).await?;

            let mut body = render_body(&report.view);
            let root = body.root();
            let request = report.request();
            let key = request_key(request);
            let mut store = JsonFileHighlightStore::new(settings.highlight_store_path.clone());
            let session = HighlightSession::open(&mut store, &key, &mut body, root);
            log::info!("{} highlight(s) applied", session.ranges().len());

            let xhtml = compose_export(&report.view, &body, &options, Utc::now());
            match out {
                Some(path) => {
                    write_output(&path, &xhtml)?;
                    log::info!("report written to {}", path.display());
                }
                None => println!("{}", xhtml),
            }
        }
        Command::Highlight {
            token,
            start,
            end,
            color,
        } => {
            let color = HighlightColor::parse(&color)
                .with_context(|| format!("unknown color {:?}", color))?;
            let api = client(&settings)?;
            let report = load_report(&api, &token).await?;

            let mut body = render_body(&report.view);
            let root = body.root();
            let request = report.request();
            let key = request_key(request);
            let mut store = JsonFileHighlightStore::new(settings.highlight_store_path.clone());
            let mut session = HighlightSession::open(&mut store, &key, &mut body, root);
            let id = session.create(&mut body, start, end, color)?;
            println!("{}", id);
        }
    }
    Ok(())
}
