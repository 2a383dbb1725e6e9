// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User-facing error messages for the upload screen.
//
// The upload layer shows these verbatim, so they are written in Portuguese for
// the staff of the institution. Nothing inside the core retries, so every
// mapping reports `retriable: false`; the caller owns any retry policy.

use crate::error::CarimboError;

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The uploaded file itself is the problem; another file is needed.
    BadInput,
    /// Settings must be fixed by an administrator.
    Configuration,
    /// Something broke inside the pipeline.
    Internal,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same request could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `CarimboError` into a `HumanError` for the upload screen.
pub fn humanize_error(err: &CarimboError) -> HumanError {
    match err {
        CarimboError::ImageDecode(_) => HumanError {
            message: "Nao foi possivel ler a imagem enviada.".into(),
            suggestion: "Envie a foto novamente em JPEG, PNG ou WEBP, ou digitalize o contrato em PDF.".into(),
            retriable: false,
            severity: Severity::BadInput,
        },

        // Only reachable if a caller bypasses the orchestrator.
        CarimboError::PdfParse(_) => HumanError {
            message: "O PDF enviado esta corrompido.".into(),
            suggestion: "Gere o PDF novamente a partir do arquivo original e envie outra vez.".into(),
            retriable: false,
            severity: Severity::BadInput,
        },

        CarimboError::StampComposition(detail) => HumanError {
            message: "Nao foi possivel aplicar o carimbo institucional.".into(),
            suggestion: format!("O documento nao foi salvo. Informe o suporte tecnico. ({detail})"),
            retriable: false,
            severity: Severity::Internal,
        },

        CarimboError::Processing(detail) => HumanError {
            message: "Falha ao processar o arquivo.".into(),
            suggestion: format!("O documento nao foi salvo. Informe o suporte tecnico. ({detail})"),
            retriable: false,
            severity: Severity::Internal,
        },

        CarimboError::IntegrityMismatch { .. } => HumanError {
            message: "O arquivo foi alterado depois de validado.".into(),
            suggestion: "A impressao digital SHA-256 nao confere. Solicite uma copia original a instituicao.".into(),
            retriable: false,
            severity: Severity::BadInput,
        },

        CarimboError::Config(detail) => HumanError {
            message: "A configuracao do carimbo e invalida.".into(),
            suggestion: format!("Peca a um administrador para revisar as configuracoes. ({detail})"),
            retriable: false,
            severity: Severity::Configuration,
        },

        CarimboError::Serialization(_) => HumanError {
            message: "A configuracao do carimbo nao pode ser lida.".into(),
            suggestion: "Peca a um administrador para revisar o arquivo de configuracao.".into(),
            retriable: false,
            severity: Severity::Configuration,
        },
    }
}
