//! Content loading, navigation pages and file-backed snapshot storage shared
//! between med_cli and med_daemon.

mod pages;
mod storage;

pub use pages::Page;
pub use storage::FileStorage;

use anyhow::{ensure, Context, Result};
use med_core::{ClinicalCase, ContentLibrary, Disease, Poisoning, Question, Toxidrome};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const QUESTIONS_FILE: &str = "questions.json";
const CASES_FILE: &str = "cases.json";
const TOXICOLOGY_FILE: &str = "toxicology.json";
const DISEASES_FILE: &str = "diseases.json";

#[derive(Deserialize)]
struct QuestionsFile {
    content_version: String,
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct CasesFile {
    cases: Vec<ClinicalCase>,
}

#[derive(Deserialize)]
struct ToxicologyFile {
    toxidromes: Vec<Toxidrome>,
    poisonings: Vec<Poisoning>,
}

#[derive(Deserialize)]
struct DiseasesFile {
    diseases: Vec<Disease>,
}

/// Checks the authoring rules every content set must satisfy.
///
/// Catches mistakes like a duplicated question id, a `correctAnswer` that is
/// not one of the listed options, or treatment steps numbered out of order.
pub fn validate_content(content: &ContentLibrary) -> Result<()> {
    let mut question_ids = HashSet::new();
    for question in &content.questions {
        ensure!(!question.id.is_empty(), "question has empty id");
        ensure!(
            question_ids.insert(question.id.as_str()),
            "duplicate question id '{}'",
            question.id
        );
        ensure!(
            !question.options.is_empty(),
            "question '{}' has no options",
            question.id
        );
        ensure!(
            question.offers(&question.correct_answer),
            "question '{}' correctAnswer '{}' is not one of its options",
            question.id,
            question.correct_answer
        );
    }

    let mut case_ids = HashSet::new();
    for case in &content.cases {
        ensure!(
            case_ids.insert(case.id.as_str()),
            "duplicate case id '{}'",
            case.id
        );
        ensure!(
            !case.diagnosis.is_empty(),
            "case '{}' has no diagnosis",
            case.id
        );
    }

    let mut toxidrome_names = HashSet::new();
    for toxidrome in &content.toxidromes {
        ensure!(
            toxidrome_names.insert(toxidrome.name.to_ascii_lowercase()),
            "duplicate toxidrome '{}'",
            toxidrome.name
        );
    }

    let mut disease_ids = HashSet::new();
    for disease in &content.diseases {
        ensure!(
            disease_ids.insert(disease.id.as_str()),
            "duplicate disease id '{}'",
            disease.id
        );
        for (position, step) in disease.treatment_sequence.iter().enumerate() {
            let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
            ensure!(
                step.order == expected,
                "disease '{}' treatment step {} has order {}",
                disease.id,
                expected,
                step.order
            );
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let raw = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {file}"))
}

fn assemble(
    questions: QuestionsFile,
    cases: CasesFile,
    toxicology: ToxicologyFile,
    diseases: DiseasesFile,
) -> Result<ContentLibrary> {
    let content = ContentLibrary {
        content_version: questions.content_version,
        questions: questions.questions,
        cases: cases.cases,
        toxidromes: toxicology.toxidromes,
        poisonings: toxicology.poisonings,
        diseases: diseases.diseases,
    };
    validate_content(&content)?;
    Ok(content)
}

pub fn load_content(content_dir: &str) -> Result<ContentLibrary> {
    let dir = Path::new(content_dir);
    let content = assemble(
        read_json(dir, QUESTIONS_FILE)?,
        read_json(dir, CASES_FILE)?,
        read_json(dir, TOXICOLOGY_FILE)?,
        read_json(dir, DISEASES_FILE)?,
    )
    .with_context(|| format!("loading content from {content_dir}"))?;
    tracing::debug!(
        version = %content.content_version,
        questions = content.questions.len(),
        cases = content.cases.len(),
        "content loaded"
    );
    Ok(content)
}

/// The content set compiled into the binary.
pub fn builtin_content() -> Result<ContentLibrary> {
    fn parse<T: DeserializeOwned>(file: &str, raw: &str) -> Result<T> {
        serde_json::from_str(raw).with_context(|| format!("parsing built-in {file}"))
    }
    assemble(
        parse(
            QUESTIONS_FILE,
            include_str!("../../../content/questions.json"),
        )?,
        parse(CASES_FILE, include_str!("../../../content/cases.json"))?,
        parse(
            TOXICOLOGY_FILE,
            include_str!("../../../content/toxicology.json"),
        )?,
        parse(DISEASES_FILE, include_str!("../../../content/diseases.json"))?,
    )
}

/// Loads from `content_dir` when given, otherwise the built-in set.
pub fn resolve_content(content_dir: Option<&str>) -> Result<ContentLibrary> {
    match content_dir {
        Some(dir) => load_content(dir),
        None => builtin_content(),
    }
}
