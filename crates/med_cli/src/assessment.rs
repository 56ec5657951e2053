//! Quiz and case viewing from the terminal.

use anyhow::{bail, Context, Result};
use med_core::{AppStore, CaseViewer, ContentLibrary, Question, QuizRunner};

/// Parses `"1,2,4"` into zero-based option indices.
pub fn parse_answers(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let n: usize = s
                .parse()
                .with_context(|| format!("answer '{s}' is not an option number"))?;
            if n == 0 {
                bail!("option numbers start at 1");
            }
            Ok(n - 1)
        })
        .collect()
}

fn print_question(quiz: &QuizRunner) {
    let question: &Question = quiz.current_question();
    println!(
        "Question {}/{}  [{}]",
        quiz.index() + 1,
        quiz.len(),
        question.category.label()
    );
    println!("{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

/// Takes every question in order. `answers` yields zero-based option indices;
/// the quiz stops early when it runs dry.
pub fn run_quiz(
    questions: Vec<Question>,
    store: &mut AppStore,
    answers: &mut dyn Iterator<Item = Result<usize>>,
) -> Result<()> {
    let mut quiz = QuizRunner::new(questions)?;
    loop {
        print_question(&quiz);
        let Some(choice) = answers.next() else {
            println!("No more answers; stopping.");
            break;
        };
        let choice = choice?;
        let option = quiz
            .current_question()
            .options
            .get(choice)
            .cloned()
            .with_context(|| format!("question has no option {}", choice + 1))?;
        quiz.select_answer(&option)?;
        let result = quiz.submit(store)?;
        if result.correct {
            println!("Correct!");
        } else {
            println!("Incorrect. Correct answer: {}", result.correct_answer);
        }
        println!("Rationale: {}", result.rationale);
        println!("{}", "-".repeat(80));
        if !quiz.can_go_next() {
            break;
        }
        quiz.next()?;
    }
    let score = quiz.score();
    println!("Score: {}/{}", score.correct, score.total);
    if quiz.is_complete() {
        println!("Assessment complete.");
    }
    Ok(())
}

pub fn list_cases(content: &ContentLibrary, store: &AppStore) {
    for case in &content.cases {
        let done = if store.progress().has_completed_case(&case.id) {
            "x"
        } else {
            " "
        };
        println!(
            "[{done}] {id:<20} {category:<14} {title}",
            id = case.id,
            category = case.category.label(),
            title = case.title,
        );
    }
}

pub fn reveal_case(content: &ContentLibrary, store: &mut AppStore, case_id: &str) -> Result<()> {
    let mut viewer = CaseViewer::new();
    let case = viewer.select(content, case_id)?;
    let vitals = &case.presentation.vitals;
    println!("{}  [{}]", case.title, case.category.label());
    println!("Chief complaint: {}", case.presentation.chief_complaint);
    println!(
        "Vitals: T {:.1}  HR {}  BP {}  RR {}  SpO2 {}%",
        vitals.temperature,
        vitals.heart_rate,
        vitals.blood_pressure,
        vitals.respiratory_rate,
        vitals.oxygen_saturation,
    );
    for lab in &case.labs {
        println!("  {}: {} {} (normal {})", lab.name, lab.value, lab.unit, lab.normal);
    }
    viewer.reveal_diagnosis(store)?;
    println!("Diagnosis: {}", case.diagnosis);
    for point in &case.learning_points {
        println!("  * {point}");
    }
    Ok(())
}
