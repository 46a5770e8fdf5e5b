#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs the analyzers an assignment type calls for and assembles per-student
//! results.

use std::collections::{BTreeMap, BTreeSet};

use bon::Builder;
use futures::future::join_all;
use tracing::{debug, info};

use crate::{
    aggregate::Aggregator,
    code::{CodeAnalyzer, CodeSubmission},
    content::{ContentAnalyzer, ContentGuide, ContentSubmission},
    error::GradingError,
    oracle::OracleGate,
    rubric::Rubric,
    submission::{SplitSubmissions, kind_of, student_id},
    types::{Analyzer, AnalyzerResult, AssignmentType, StudentResult, SubmissionKind},
};

/// Name of the rubric dimension scored by the code analyzer.
const CODE_DIMENSION: &str = "code";
/// Name of the rubric dimension scored by the content analyzer.
const CONTENT_DIMENSION: &str = "content";

/// Submitted files keyed by file name.
#[derive(Debug, Clone, PartialEq)]
pub enum Submissions {
    /// One flat map. For mixed assignments files are split by extension.
    Files(BTreeMap<String, String>),
    /// Code and text files already separated.
    ByKind {
        /// Code files.
        code: BTreeMap<String, String>,
        /// Text files.
        text: BTreeMap<String, String>,
    },
}

impl Default for Submissions {
    fn default() -> Self {
        Submissions::Files(BTreeMap::new())
    }
}

impl From<SplitSubmissions> for Submissions {
    fn from(split: SplitSubmissions) -> Self {
        Submissions::ByKind {
            code: split.code,
            text: split.text,
        }
    }
}

impl Submissions {
    /// Files to grade with a single analyzer of `kind`.
    ///
    /// A flat map is used as is; a split map contributes only its side.
    fn for_kind(&self, kind: SubmissionKind) -> &BTreeMap<String, String> {
        match (self, kind) {
            (Submissions::Files(files), _) => files,
            (Submissions::ByKind { code, .. }, SubmissionKind::Code) => code,
            (Submissions::ByKind { text, .. }, SubmissionKind::Content) => text,
        }
    }

    /// Code and text files for a mixed assignment.
    fn split(&self) -> (BTreeMap<&str, &str>, BTreeMap<&str, &str>) {
        fn borrow(map: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
            map.iter()
                .map(|(name, content)| (name.as_str(), content.as_str()))
                .collect()
        }

        match self {
            Submissions::ByKind { code, text } => (borrow(code), borrow(text)),
            Submissions::Files(files) => {
                let mut code = BTreeMap::new();
                let mut text = BTreeMap::new();
                for (name, content) in files {
                    match kind_of(name) {
                        Some(SubmissionKind::Code) => {
                            code.insert(name.as_str(), content.as_str());
                        }
                        Some(SubmissionKind::Content) => {
                            text.insert(name.as_str(), content.as_str());
                        }
                        None => debug!(file = %name, "Skipping unsupported file"),
                    }
                }
                (code, text)
            }
        }
    }
}

/// One batch to grade.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct EvaluationRequest {
    /// How the submissions are graded.
    pub assignment_type:   AssignmentType,
    /// The submitted files.
    #[builder(default)]
    pub submissions:       Submissions,
    /// The assignment prompt.
    pub problem_statement: Option<String>,
    /// Optional model answer for written submissions.
    pub reference:         Option<String>,
}

impl EvaluationRequest {
    /// Prompt text, empty when none was given.
    fn problem(&self) -> &str {
        self.problem_statement.as_deref().unwrap_or_default()
    }
}

/// Grades batches of submissions against one rubric.
///
/// The rubric and oracle gate are fixed at construction and shared read-only
/// by every evaluation.
#[derive(Debug, Clone, Default, Builder)]
pub struct Orchestrator {
    /// Rubric used for weights and content expectations.
    #[builder(default)]
    rubric: Rubric,
    /// Oracle access handed to both analyzers.
    #[builder(default)]
    gate:   OracleGate,
}

impl Orchestrator {
    /// Creates an orchestrator.
    pub fn new(rubric: Rubric, gate: OracleGate) -> Self {
        Self { rubric, gate }
    }

    /// The rubric this orchestrator grades against.
    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Parses `assignment_type` and evaluates. An unknown type fails before
    /// any submission is analysed.
    pub async fn evaluate_as(
        &self,
        assignment_type: &str,
        submissions: Submissions,
        problem_statement: Option<String>,
        reference: Option<String>,
    ) -> Result<BTreeMap<String, StudentResult>, GradingError> {
        let request = EvaluationRequest::builder()
            .assignment_type(assignment_type.parse()?)
            .submissions(submissions)
            .maybe_problem_statement(problem_statement)
            .maybe_reference(reference)
            .build();
        self.evaluate(&request).await
    }

    /// Evaluates every submission in the request, keyed by student
    /// identifier.
    ///
    /// Per-submission problems never fail the batch; only rubric lookups
    /// can.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BTreeMap<String, StudentResult>, GradingError> {
        info!(assignment_type = %request.assignment_type, "Starting evaluation");

        let results = match request.assignment_type {
            AssignmentType::Code => self.evaluate_code(request).await?,
            AssignmentType::Content => self.evaluate_content(request).await?,
            AssignmentType::Mixed => self.evaluate_mixed(request).await?,
        };

        info!(results = results.len(), "Evaluation finished");
        Ok(results)
    }

    /// Builds the code analyzer input for one file.
    fn code_input(
        &self,
        request: &EvaluationRequest,
        filename: &str,
        code: &str,
    ) -> Result<CodeSubmission, GradingError> {
        Ok(CodeSubmission::builder()
            .problem_statement(request.problem())
            .code(code)
            .filename(filename.to_string())
            .weights(self.rubric.criterion_weights(CODE_DIMENSION)?)
            .build())
    }

    /// Builds the content analyzer input for one file.
    fn content_input(
        &self,
        request: &EvaluationRequest,
        content: &str,
    ) -> Result<ContentSubmission, GradingError> {
        let guide = ContentGuide::from_dimension(self.rubric.dimension(CONTENT_DIMENSION)?);
        Ok(ContentSubmission::builder()
            .problem_statement(request.problem())
            .content(content)
            .maybe_reference(request.reference.clone())
            .guide(guide)
            .build())
    }

    /// Wraps a single analyzer output as a student result.
    fn single(
        output: &AnalyzerResult,
        assignment_type: AssignmentType,
        filename: &str,
    ) -> StudentResult {
        let aggregated = Aggregator.aggregate(std::slice::from_ref(output), Some([1.0].as_slice()));
        StudentResult::new(aggregated, assignment_type, Some(filename.to_string()), 1)
    }

    /// One code analyzer run per file.
    async fn evaluate_code(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BTreeMap<String, StudentResult>, GradingError> {
        let files = request.submissions.for_kind(SubmissionKind::Code);
        info!(submissions = files.len(), "Evaluating code submissions");

        let analyzer = CodeAnalyzer::new(self.gate.clone());
        let inputs = files
            .iter()
            .map(|(name, code)| Ok((name, self.code_input(request, name, code)?)))
            .collect::<Result<Vec<_>, GradingError>>()?;

        let analyzer = &analyzer;
        let results = join_all(inputs.into_iter().map(|(name, input)| async move {
            let output = analyzer.evaluate(&input).await;
            debug!(file = %name, score = output.score, "Scored code submission");
            (student_id(name), Self::single(&output, AssignmentType::Code, name))
        }))
        .await;

        Ok(results.into_iter().collect())
    }

    /// One content analyzer run per file.
    async fn evaluate_content(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BTreeMap<String, StudentResult>, GradingError> {
        let files = request.submissions.for_kind(SubmissionKind::Content);
        info!(submissions = files.len(), "Evaluating content submissions");

        let analyzer = ContentAnalyzer::new(self.gate.clone());
        let inputs = files
            .iter()
            .map(|(name, content)| Ok((name, self.content_input(request, content)?)))
            .collect::<Result<Vec<_>, GradingError>>()?;

        let analyzer = &analyzer;
        let results = join_all(inputs.into_iter().map(|(name, input)| async move {
            let output = analyzer.evaluate(&input).await;
            debug!(file = %name, score = output.score, "Scored content submission");
            (student_id(name), Self::single(&output, AssignmentType::Content, name))
        }))
        .await;

        Ok(results.into_iter().collect())
    }

    /// Per student: the first code file and the first text file, aggregated
    /// with the rubric's dimension weights.
    async fn evaluate_mixed(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BTreeMap<String, StudentResult>, GradingError> {
        let (code_files, text_files) = request.submissions.split();
        let students: BTreeSet<String> = code_files
            .keys()
            .chain(text_files.keys())
            .map(|name| student_id(name))
            .collect();
        info!(
            students = students.len(),
            code = code_files.len(),
            text = text_files.len(),
            "Evaluating mixed submissions"
        );

        let code_weight = self.rubric.weight(CODE_DIMENSION)?;
        let content_weight = self.rubric.weight(CONTENT_DIMENSION)?;

        let mut plans = Vec::with_capacity(students.len());
        for student in students {
            fn first_for<'a>(
                files: &BTreeMap<&'a str, &'a str>,
                student: &str,
            ) -> Option<(&'a str, &'a str)> {
                files
                    .iter()
                    .find(|(name, _)| student_id(name) == student)
                    .map(|(name, content)| (*name, *content))
            }
            let code = first_for(&code_files, &student)
                .map(|(name, code)| self.code_input(request, name, code))
                .transpose()?;
            let content = first_for(&text_files, &student)
                .map(|(_, content)| self.content_input(request, content))
                .transpose()?;
            plans.push((student, code, content));
        }

        let code_analyzer = CodeAnalyzer::new(self.gate.clone());
        let content_analyzer = ContentAnalyzer::new(self.gate.clone());
        let (code_analyzer, content_analyzer) = (&code_analyzer, &content_analyzer);

        let results = join_all(plans.into_iter().map(|(student, code, content)| async move {
            let mut outputs = Vec::new();
            let mut weights = Vec::new();

            if let Some(input) = code {
                outputs.push(code_analyzer.evaluate(&input).await);
                weights.push(code_weight);
            }
            if let Some(input) = content {
                outputs.push(content_analyzer.evaluate(&input).await);
                weights.push(content_weight);
            }
            if outputs.is_empty() {
                return None;
            }

            let aggregated = Aggregator.aggregate(&outputs, Some(weights.as_slice()));
            debug!(
                %student,
                outputs = outputs.len(),
                score = aggregated.final_score,
                "Scored student"
            );
            Some((
                student,
                StudentResult::new(aggregated, AssignmentType::Mixed, None, outputs.len()),
            ))
        }))
        .await;

        Ok(results.into_iter().flatten().collect())
    }
}
