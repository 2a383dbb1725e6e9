// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Carimbo — command-line front end.
//
// Reads an upload from disk, runs it through the contract pipeline and writes
// the stamped PDF. Also hashes and verifies files against stored fingerprints.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use carimbo_core::human_errors::humanize_error;
use carimbo_core::{CarimboError, ProcessedFileResult, ProcessingConfig, StampMetadata};
use carimbo_document::ContractProcessor;
use carimbo_security::{sha256_hex, verify_hash};

#[derive(Parser)]
#[command(name = "carimbo", about = "Stamp contracts with a tamper-evident institutional footer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp an image or PDF and write the resulting PDF
    Stamp {
        /// Uploaded file (JPEG, PNG, WEBP or PDF)
        input: PathBuf,
        /// Where to write the stamped PDF
        #[arg(long, short)]
        output: PathBuf,
        /// Institution name
        #[arg(long)]
        institution: String,
        /// Institution tax id (CNPJ)
        #[arg(long)]
        cnpj: String,
        /// Name of the user validating the document
        #[arg(long)]
        user: String,
        /// Role of the user
        #[arg(long)]
        role: String,
        /// Professional registry, e.g. "COREN-SP 123456"
        #[arg(long)]
        registry: Option<String>,
        /// Public verification token
        #[arg(long)]
        token: String,
        /// Upload instant (RFC 3339); defaults to now
        #[arg(long)]
        uploaded_at: Option<DateTime<Utc>>,
        /// Declared MIME type; guessed from the file extension when absent
        #[arg(long)]
        mime: Option<String>,
        /// JSON file with processing configuration overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the SHA-256 of a file
    Hash {
        file: PathBuf,
    },
    /// Check a file against an expected SHA-256
    Verify {
        file: PathBuf,
        /// Expected digest (64 hex characters)
        hash: String,
    },
}

/// What `stamp` prints on success.
#[derive(Serialize)]
struct StampReport<'a> {
    output: &'a Path,
    #[serde(flatten)]
    result: &'a ProcessedFileResult,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<CarimboError>() {
                Some(carimbo_err) => {
                    let human = humanize_error(carimbo_err);
                    tracing::error!(error = %carimbo_err, severity = ?human.severity, "command failed");
                    eprintln!("{}\n{}", human.message, human.suggestion);
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Stamp {
            input,
            output,
            institution,
            cnpj,
            user,
            role,
            registry,
            token,
            uploaded_at,
            mime,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let processor = ContractProcessor::new(config)?;

            let data = std::fs::read(&input)
                .with_context(|| format!("Read upload {}", input.display()))?;
            let mime = mime.unwrap_or_else(|| mime_from_path(&input).to_string());
            let metadata = StampMetadata {
                institution_name: institution,
                institution_tax_id: cnpj,
                uploader_name: user,
                uploader_role: role,
                professional_registry: registry,
                uploaded_at: uploaded_at.unwrap_or_else(Utc::now),
                public_token: token,
                hash_final: None,
            };

            let result = processor.process_upload(&data, &mime, &metadata)?;
            std::fs::write(&output, &result.pdf_bytes)
                .with_context(|| format!("Write stamped PDF {}", output.display()))?;

            print_json(&StampReport {
                output: &output,
                result: &result,
            })?;
        }
        Commands::Hash { file } => {
            let data =
                std::fs::read(&file).with_context(|| format!("Read {}", file.display()))?;
            println!("{}  {}", sha256_hex(&data), file.display());
        }
        Commands::Verify { file, hash } => {
            let data =
                std::fs::read(&file).with_context(|| format!("Read {}", file.display()))?;
            verify_hash(&data, &hash)?;
            println!("OK  {}", file.display());
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProcessingConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Read config {}", path.display()))?;
            Ok(ProcessingConfig::from_json_str(&json)?)
        }
        None => Ok(ProcessingConfig::default()),
    }
}

/// MIME type implied by a file extension. Unknown extensions are treated as
/// PDF, which the pipeline recovers from if they are not.
fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("tif" | "tiff") => "image/tiff",
        Some("bmp") => "image/bmp",
        _ => "application/pdf",
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}
