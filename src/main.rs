use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use studymate::{
    api,
    config::Config,
    logging,
    pdf,
    processing::{StudyApi, StudyService},
    session::Document,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::TcpListener,
};

#[derive(Parser)]
#[command(
    name = "studymate",
    about = "Summarize PDF documents and answer questions about them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Port to listen on. Falls back to SERVER_PORT, then the first free port in 4100-4199.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the text extracted from a PDF.
    Extract { pdf: PathBuf },
    /// Print a summary of a PDF.
    Summarize { pdf: PathBuf },
    /// Answer a question about a PDF. Reads questions from stdin when none is given.
    Ask {
        pdf: PathBuf,
        question: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    execute(cli.command).await
}

async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Serve { port } => {
            let config = load_config()?;
            serve(&config, port.or(config.server_port)).await
        }
        Command::Extract { pdf: path } => {
            let bytes = read_pdf(&path)?;
            let extracted = pdf::extract_text(&bytes)
                .with_context(|| format!("Failed to extract {}", path.display()))?;
            println!("{}", extracted.text);
            Ok(())
        }
        Command::Summarize { pdf } => {
            let config = load_config()?;
            let service = StudyService::from_config(&config)?;
            let document = load_document(&service, &pdf)?;
            let outcome = service.summarize(&document).await?;
            println!("{}", outcome.summary);
            if outcome.failed_chunks > 0 {
                eprintln!(
                    "warning: {} of {} chunks could not be summarized",
                    outcome.failed_chunks, outcome.chunk_count
                );
            }
            Ok(())
        }
        Command::Ask { pdf, question } => {
            let config = load_config()?;
            let service = StudyService::from_config(&config)?;
            let document = load_document(&service, &pdf)?;
            match question {
                Some(question) => {
                    let question = question.trim();
                    if question.is_empty() {
                        bail!("question must not be empty");
                    }
                    ask(&service, &document, question).await
                }
                None => ask_interactively(&service, &document).await,
            }
        }
    }
}

async fn serve(config: &Config, port: Option<u16>) -> Result<()> {
    let service = Arc::new(StudyService::from_config(config)?);
    let app = api::create_router(service, config.preview_chars, config.max_upload_bytes);

    let (listener, port) = bind_listener(port)
        .await
        .context("Failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_document(service: &StudyService, path: &Path) -> Result<Document> {
    let bytes = read_pdf(path)?;
    service
        .load_document(&bytes)
        .with_context(|| format!("Failed to load {}", path.display()))
}

async fn ask(service: &StudyService, document: &Document, question: &str) -> Result<()> {
    let answer = service.answer(document, question).await?;
    for sentence in &answer.sentences {
        tracing::debug!(score = sentence.score, sentence = %sentence.text, "Answer sentence");
    }
    println!("{}", answer.text);
    Ok(())
}

async fn ask_interactively(service: &StudyService, document: &Document) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Question (empty line to quit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            break;
        }
        if let Err(err) = ask(service, document, question).await {
            eprintln!("error: {err:#}");
        }
    }
    Ok(())
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extract_does_not_read_model_configuration() {
        // SAFETY: no other test in this binary reads the process environment.
        unsafe {
            std::env::set_var("ANSWER_TOP_K", "0");
        }
        assert!(Config::load().is_err());

        let cli = Cli::try_parse_from(["studymate", "extract", "/nonexistent/input.pdf"])
            .expect("arguments");
        let error = execute(cli.command).await.expect_err("missing file");
        let message = format!("{error:#}");
        assert!(message.contains("Failed to read"), "{message}");
        assert!(!message.contains("configuration"), "{message}");
    }
}
