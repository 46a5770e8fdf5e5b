#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # rubricate
//!
//! Batch-grades a folder of code or written submissions against a rubric.
//!
//! Set `RUBRICATE_ORACLE_ENABLED=true` together with `OPENAI_ENDPOINT`,
//! `OPENAI_API_KEY` and `OPENAI_MODEL` (a `.env` file works) to let a
//! language model refine relevance checks and explain the feedback.

use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use rubricate::{
    AssignmentType, EvaluationRequest, EvaluatorConfig, Orchestrator, Rubric, StudentResult,
    Submissions, Summary,
    submission::{load_folder, split_by_kind},
};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Options of the `grade` subcommand.
#[derive(Debug, Clone)]
struct GradeOpts {
    /// Assignment type.
    assignment_type: AssignmentType,
    /// File holding the problem statement.
    problem:         Option<PathBuf>,
    /// File holding the reference answer.
    reference:       Option<PathBuf>,
    /// Rubric JSON file.
    rubric:          Option<PathBuf>,
    /// Print the result map as JSON.
    json:            bool,
    /// Log scoring decisions.
    verbose:         bool,
    /// Folder of submissions.
    folder:          PathBuf,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a folder
    Grade(GradeOpts),
    /// Print the default rubric
    Rubric,
    /// Validate a rubric file
    CheckRubric(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    let assignment_type = long("type")
        .short('t')
        .help("Assignment type: code, content or mixed")
        .argument::<String>("TYPE")
        .parse(|s| s.parse::<AssignmentType>());
    let problem = long("problem")
        .short('p')
        .help("File containing the problem statement")
        .argument::<PathBuf>("FILE")
        .optional();
    let reference = long("reference")
        .short('r')
        .help("File containing a reference answer for written submissions")
        .argument::<PathBuf>("FILE")
        .optional();
    let rubric = long("rubric")
        .help("Rubric JSON file, the built-in rubric is used otherwise")
        .argument::<PathBuf>("FILE")
        .optional();
    let json = long("json").help("Print results as JSON").switch();
    let verbose = long("verbose")
        .short('v')
        .help("Log scoring decisions")
        .switch();
    let folder = positional::<PathBuf>("FOLDER").help("Folder of submissions");

    let grade = construct!(GradeOpts {
        assignment_type,
        problem,
        reference,
        rubric,
        json,
        verbose,
        folder
    })
    .to_options()
    .command("grade")
    .help("Grade every submission in a folder")
    .map(Cmd::Grade);

    let print_rubric = pure(Cmd::Rubric)
        .to_options()
        .command("rubric")
        .help("Print the default rubric as JSON");

    let rubric_file = positional::<PathBuf>("FILE").help("Rubric JSON file");
    let check_rubric = construct!(Cmd::CheckRubric(rubric_file))
        .to_options()
        .command("check-rubric")
        .help("Validate a rubric file");

    let cmd = construct!([grade, print_rubric, check_rubric]);

    cmd.to_options()
        .descr("Rubric-based grader for code and written submissions")
        .run()
}

/// Installs the log subscriber.
fn init_tracing(verbose: bool) {
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();
}

/// Reads an optional text file.
fn read_optional(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|p| {
        fs::read_to_string(p).with_context(|| format!("Could not read {}", p.display()))
    })
    .transpose()
}

/// One row of the results table.
#[derive(Tabled)]
struct ResultRow {
    /// Student identifier.
    #[tabled(rename = "Student")]
    student: String,
    /// Source file.
    #[tabled(rename = "File")]
    file:    String,
    /// Final score.
    #[tabled(rename = "Score")]
    score:   String,
    /// First few feedback lines.
    #[tabled(rename = "Feedback")]
    summary: String,
}

impl ResultRow {
    /// Builds a row from a result.
    fn new(student: &str, result: &StudentResult) -> Self {
        let summary = result
            .combined_feedback
            .iter()
            .filter(|line| !line.trim().is_empty())
            .take(6)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            student: student.to_string(),
            file: result.file.clone().unwrap_or_else(|| "-".to_string()),
            score: format!("{:.2}/{:.0}", result.final_score, result.max_score),
            summary,
        }
    }
}

/// Prints the results table and summary.
fn print_results(results: &BTreeMap<String, StudentResult>) {
    let Some(summary) = Summary::from_results(results.values()) else {
        eprintln!("{}", "No supported submissions found.".yellow());
        return;
    };

    let rows: Vec<ResultRow> = results
        .iter()
        .map(|(student, result)| ResultRow::new(student, result))
        .collect();

    println!(
        "{}",
        Table::new(&rows)
            .with(Panel::footer(format!(
                "{} submissions, average {:.2} ({:.2}%), highest {:.2}, lowest {:.2}",
                summary.total_submissions,
                summary.average_score,
                summary.average_percentage,
                summary.highest_score,
                summary.lowest_score
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(60).keep_words(true)))
            .with(Modify::new(Rows::last()).with(Alignment::center()))
            .with(Style::modern())
    );
}

/// Runs the `grade` subcommand.
async fn grade(opts: GradeOpts) -> Result<()> {
    let rubric = match opts.rubric.as_ref() {
        Some(path) => Rubric::from_json_file(path)?,
        None => Rubric::default(),
    };
    let config = EvaluatorConfig::from_env();
    let gate = config.oracle_gate()?;
    if gate.is_enabled() {
        eprintln!("{}", "Semantic oracle enabled".bright_green());
    }

    let problem_statement = read_optional(opts.problem.as_ref())?;
    let reference = read_optional(opts.reference.as_ref())?;

    let submissions = Submissions::from(split_by_kind(load_folder(&opts.folder)?));

    let request = EvaluationRequest::builder()
        .assignment_type(opts.assignment_type)
        .submissions(submissions)
        .maybe_problem_statement(problem_statement)
        .maybe_reference(reference)
        .build();
    let results = Orchestrator::new(rubric, gate)
        .evaluate(&request)
        .await
        .context("Evaluation failed")?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cmd = options();
    let verbose = matches!(&cmd, Cmd::Grade(opts) if opts.verbose);
    init_tracing(verbose);

    match cmd {
        Cmd::Grade(opts) => grade(opts).await?,
        Cmd::Rubric => println!("{}", Rubric::default().to_json()?),
        Cmd::CheckRubric(path) => {
            let rubric = Rubric::from_json_file(&path)?;
            println!(
                "{} {} (v{})",
                "Valid rubric:".bright_green(),
                rubric.name(),
                rubric.version()
            );
            for (name, weight) in rubric.weights() {
                println!("  {name}: {weight:.2}");
            }
            println!("  total max score: {:.2}", rubric.total_max_score());
        }
    };

    Ok(())
}
