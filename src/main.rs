use std::path::PathBuf;

use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use tracing::{error, info};

use hairforce::catalog::all_styles;
use hairforce::llm::media::extension_for_mime;
use hairforce::utils::logging::init_logging;
use hairforce::{ApplyOutcome, GeminiImageClient, InlineImage, ProcessingStatus, Session, CONFIG};

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    Help,
    Styles,
    Apply(ApplyArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct ApplyArgs {
    image_path: PathBuf,
    style_id: String,
    out_path: Option<PathBuf>,
}

fn usage() -> &'static str {
    "Usage:\n  hairforce styles\n  hairforce apply --image <path> --style <id> [--out <path>]"
}

fn parse_args(args: &[String]) -> anyhow::Result<CliCommand> {
    match args.get(1).map(|value| value.as_str()) {
        Some("styles") => Ok(CliCommand::Styles),
        Some("apply") => parse_apply_args(&args[2..]),
        Some("--help" | "-h" | "help") => Ok(CliCommand::Help),
        None => Err(anyhow!(usage())),
        Some(other) => Err(anyhow!("Unknown command: {other}\n{}", usage())),
    }
}

fn parse_apply_args(args: &[String]) -> anyhow::Result<CliCommand> {
    let mut image_path: Option<PathBuf> = None;
    let mut style_id: Option<String> = None;
    let mut out_path: Option<PathBuf> = None;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--image" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --image"))?;
                image_path = Some(PathBuf::from(value));
            }
            "--style" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --style"))?;
                style_id = Some(value.clone());
            }
            "--out" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --out"))?;
                out_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                return Ok(CliCommand::Help);
            }
            other => {
                return Err(anyhow!("Unknown apply argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    Ok(CliCommand::Apply(ApplyArgs {
        image_path: image_path.ok_or_else(|| anyhow!("--image is required"))?,
        style_id: style_id.ok_or_else(|| anyhow!("--style is required"))?,
        out_path,
    }))
}

fn print_styles() {
    for style in all_styles() {
        println!("{:<16} {:<22} {}", style.id, style.name, style.description);
    }
}

async fn run_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let client = GeminiImageClient::new(&CONFIG)?;

    let bytes = tokio::fs::read(&args.image_path)
        .await
        .with_context(|| format!("Failed to read portrait {}", args.image_path.display()))?;
    let portrait = InlineImage::from_bytes(&bytes, "image/png");
    if !portrait.is_image() {
        return Err(anyhow!(
            "{} does not look like an image ({})",
            args.image_path.display(),
            portrait.mime_type
        ));
    }

    let mut session = Session::new();
    session.select_inline_image(portrait);
    let style = session.select_style(&args.style_id)?;
    info!(
        "Applying '{}' to {} with model {}",
        style.name,
        args.image_path.display(),
        client.model()
    );

    match session.apply_style(&client).await {
        ApplyOutcome::Succeeded => {}
        ApplyOutcome::Failed(message) => return Err(anyhow!(message)),
        ApplyOutcome::Ignored | ApplyOutcome::Stale => {
            return Err(anyhow!("Style transfer did not run"));
        }
    }

    let edited = session
        .images()
        .edited
        .clone()
        .ok_or_else(|| anyhow!("Session finished without an edited image"))?;
    let out_path = args.out_path.unwrap_or_else(|| {
        PathBuf::from(format!(
            "hairforce-style.{}",
            extension_for_mime(&edited.mime_type)
        ))
    });
    let output = edited.decode_bytes()?;
    tokio::fs::write(&out_path, &output)
        .await
        .with_context(|| format!("Failed to write result {}", out_path.display()))?;

    debug_assert_eq!(session.status(), &ProcessingStatus::Success);
    println!("{}", out_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guards = init_logging(&CONFIG.log_level, &CONFIG.log_dir);

    let args: Vec<String> = std::env::args().collect();
    match parse_args(&args)? {
        CliCommand::Help => {
            println!("{}", usage());
            Ok(())
        }
        CliCommand::Styles => {
            print_styles();
            Ok(())
        }
        CliCommand::Apply(apply_args) => {
            let result = run_apply(apply_args).await;
            if let Err(err) = &result {
                error!("Hairstyle edit failed: {err:#}");
            }
            result
        }
    }
}
