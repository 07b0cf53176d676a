//! Scholia demo
//!
//! Annotates a saved HTML page and reports where each note landed. Runs
//! offline from a prepared JSONL script, or against the Anthropic API when
//! a key is configured.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scholia::config::ProviderConfig;
use scholia::dom::Document;
use scholia::layout::FlowLayout;
use scholia::llm::{AnthropicProvider, LlmProvider, ScriptedProvider};
use scholia::{AnnotationMode, AnnotationSession};

const USAGE: &str = "usage: scholia <page.html> [--annotations notes.jsonl] [--width N]";

struct Args {
    page: PathBuf,
    annotations: Option<PathBuf>,
    width: f32,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut page = None;
    let mut annotations = None;
    let mut width = 800.0_f32;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--annotations" => {
                let path = args.next().context("--annotations needs a file path")?;
                annotations = Some(PathBuf::from(path));
            }
            "--width" => {
                let value = args.next().context("--width needs a number")?;
                width = value
                    .parse()
                    .with_context(|| format!("bad width: {value}"))?;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown flag {other}\n{USAGE}"),
            other => {
                if page.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one page given\n{USAGE}");
                }
            }
        }
    }

    let page = page.context(USAGE)?;
    Ok(Args {
        page,
        annotations,
        width,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let args = parse_args()?;
    let markup = fs::read_to_string(&args.page)
        .with_context(|| format!("reading {}", args.page.display()))?;
    let doc = Document::parse(&markup)?;
    let layout = FlowLayout::new(args.width);

    let config = ProviderConfig::from_env();
    let provider: Box<dyn LlmProvider> = match &args.annotations {
        Some(path) => {
            let script = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Box::new(ScriptedProvider::new(&script))
        }
        None if !config.api_key.is_empty() => Box::new(AnthropicProvider::new()),
        None => bail!(
            "no ANTHROPIC_API_KEY in the environment and no --annotations script; nothing to run"
        ),
    };

    let url = format!("file://{}", args.page.display());
    let mut session = AnnotationSession::new(provider, config);
    tracing::info!(
        "Annotating {} via {}",
        args.page.display(),
        session.provider_name()
    );

    let modes = vec![
        AnnotationMode::CloseReading,
        AnnotationMode::Context,
        AnnotationMode::DevilsAdvocate,
    ];
    let outcome = session.annotate(&doc, &layout, &url, modes).await?;

    println!(
        "{} annotation(s) anchored, {} dropped",
        outcome.accepted, outcome.dropped
    );
    for entry in session.manager().entries() {
        let mode = entry.annotation.mode.map(|m| m.label()).unwrap_or("Note");
        println!();
        println!("[{mode}] {}", entry.annotation.content);
        println!("  anchor: {:?}", entry.annotation.anchor);
        for (_, rect) in &entry.regions {
            println!(
                "  region: {:.0},{:.0} {:.0}x{:.0}",
                rect.x, rect.y, rect.width, rect.height
            );
        }
    }

    // Reflow at half width; the highlights follow the text.
    let narrow = FlowLayout::new(args.width / 2.0);
    session.manager_mut().request_reposition();
    session.manager_mut().on_frame(&doc, &narrow);
    println!();
    println!("after reflow at {:.0}px:", args.width / 2.0);
    for entry in session.manager().entries() {
        let first = entry.regions.first().map(|(_, r)| *r).unwrap_or_default();
        println!(
            "  {:?} -> {} region(s), first at {:.0},{:.0}",
            entry.annotation.anchor,
            entry.regions.len(),
            first.x,
            first.y
        );
    }

    let totals = session.usage_totals();
    println!();
    println!(
        "usage: {} input + {} output tokens (~${:.4})",
        totals.input_tokens, totals.output_tokens, totals.estimated_cost
    );

    Ok(())
}
