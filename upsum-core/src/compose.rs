//! Report Composer: build the prompt from [`ParsedUpdateFacts`] and ask the
//! [`Summarizer`] for the report body.
//!
//! The prompt is a pure function of the facts and the locale, so identical logs
//! always produce identical prompts. The subject is fixed per locale and never
//! taken from generated text.

use std::fmt::Write as _;

use tracing::{debug, error, info};

use crate::config::Locale;
use crate::contract::Summarizer;
use crate::error::{PipelineError, SummarizeError};
use crate::parse::{PackageTransition, ParsedUpdateFacts};

/// Subject line and markdown body ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

pub fn subject(locale: Locale) -> &'static str {
    match locale {
        Locale::Ko => "일일 시스템 업데이트 요약",
        Locale::En => "Daily system update summary",
    }
}

pub fn reboot_sentence(reboot_required: bool, locale: Locale) -> &'static str {
    match (locale, reboot_required) {
        (Locale::Ko, true) => "시스템 재부팅이 필요합니다.",
        (Locale::Ko, false) => "시스템 재부팅이 필요하지 않습니다.",
        (Locale::En, true) => "A system reboot is required.",
        (Locale::En, false) => "No system reboot is required.",
    }
}

fn no_packages_line(locale: Locale) -> &'static str {
    match locale {
        Locale::Ko => "업데이트된 패키지 없음",
        Locale::En => "no packages updated",
    }
}

fn transition_line(t: &PackageTransition) -> String {
    match &t.from {
        Some(from) => format!("- {}: {} -> {}", t.name, from, t.to),
        None => format!("- {}: {}", t.name, t.to),
    }
}

/// Render the deterministic prompt for one set of facts.
pub fn build_prompt(facts: &ParsedUpdateFacts, locale: Locale) -> String {
    let reboot = reboot_sentence(facts.reboot_required, locale);
    let packages = if facts.package_transitions.is_empty() {
        format!("- {}", no_packages_line(locale))
    } else {
        facts
            .package_transitions
            .iter()
            .map(transition_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = String::new();
    match locale {
        Locale::Ko => {
            let _ = writeln!(
                prompt,
                "당신은 시스템 관리자를 위한 보고서 작성 도우미입니다. 아래에 정리된 시스템 업데이트 내역을 바탕으로 명확한 한국어 보고서를 작성해주세요.\n"
            );
            let _ = writeln!(prompt, "**재부팅 필요 여부:** {reboot}\n");
            let _ = writeln!(prompt, "**패키지 변경 내역:**\n{packages}\n");
            if let Some(version) = &facts.dietpi_update {
                let _ = writeln!(
                    prompt,
                    "**DietPi OS 업데이트:** DietPi v{version} 업데이트가 있습니다. 릴리스 정보는 DietPi 웹사이트를 참조하도록 안내해주세요.\n"
                );
            }
            let _ = writeln!(prompt, "**작성 지침:**");
            let _ = writeln!(prompt, "1. 보고서 최상단에 \"{reboot}\" 문구를 명확히 포함해주세요.");
            let _ = writeln!(
                prompt,
                "2. 각 패키지에 대해 이전 버전과 새로운 버전을 표시하고, 신규 설치는 별도로 구분해주세요."
            );
            let _ = writeln!(prompt, "3. 모든 내용은 한국어로, 섹션을 명확히 구분해서 작성해주세요.");
            let _ = write!(
                prompt,
                "4. 결과물은 추가 편집 없이 바로 이메일로 보낼 수 있는 마크다운 형식이어야 합니다."
            );
        }
        Locale::En => {
            let _ = writeln!(
                prompt,
                "You are a reporting assistant for system administrators. Write a clear report in English from the system update details below.\n"
            );
            let _ = writeln!(prompt, "**Reboot status:** {reboot}\n");
            let _ = writeln!(prompt, "**Package changes:**\n{packages}\n");
            if let Some(version) = &facts.dietpi_update {
                let _ = writeln!(
                    prompt,
                    "**DietPi OS update:** DietPi v{version} is available. Point the reader to the DietPi website for release notes.\n"
                );
            }
            let _ = writeln!(prompt, "**Instructions:**");
            let _ = writeln!(prompt, "1. State \"{reboot}\" prominently at the top of the report.");
            let _ = writeln!(
                prompt,
                "2. List every package with its previous and new version; group fresh installs separately."
            );
            let _ = writeln!(prompt, "3. Use clearly separated sections.");
            let _ = write!(
                prompt,
                "4. The output must be markdown ready to send by email without further editing."
            );
        }
    }
    prompt
}

/// Build the prompt and obtain the report body. Empty text counts as failure.
pub async fn compose<S>(
    facts: &ParsedUpdateFacts,
    summarizer: &S,
    locale: Locale,
) -> Result<Report, PipelineError>
where
    S: Summarizer + ?Sized,
{
    let prompt = build_prompt(facts, locale);
    debug!(prompt_len = prompt.len(), "Built summarization prompt");
    info!("Requesting report text from summarizer");

    let body = match summarizer.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => {
            error!("Summarizer returned empty text");
            return Err(SummarizeError::EmptyResponse.into());
        }
        Ok(text) => text,
        Err(e) => {
            error!(error = ?e, "Summarizer call failed");
            return Err(e.into());
        }
    };

    info!(body_len = body.len(), "Report text generated");
    Ok(Report {
        subject: subject(locale).to_string(),
        body,
    })
}
