//! Prompt templates for every analysis kind
//!
//! Templates use `{name}`, `{description}`, `{readme}`, `{contents}`,
//! `{license}` and `{owner}` placeholders which [`render`] fills from the
//! repository metadata.

use crate::github::{FileEntry, RepositoryMetadata};
use crate::orchestrator::AnalysisKind;
use std::borrow::Cow;

/// Placeholder for fields missing from the repository record
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for license/owner fields missing from the repository record
pub const NOT_SPECIFIED: &str = "Not specified";
/// Characters of a file kept in a prompt before it is cut
pub const MAX_FILE_CHARS: usize = 1000;
/// Appended to file content that was cut
pub const TRUNCATION_MARKER: &str = "\n... (content truncated)";

pub const OVERVIEW: &str = r#"Please provide a highly detailed, technically comprehensive overview of the following GitHub project.
Project Metadata:
Name: {name}
Description: {description}
README:
{readme}

Repository Contents:
{contents}

List the project's purpose, problem statement, core features, key technologies, and any unique aspects.
Focus on the actual implementation details visible in the code.
"#;

pub const TECHNICAL_ANALYSIS: &str = r#"Based on the project details and code below, please conduct a deep technical analysis:
Project Name: {name}
Description: {description}
README:
{readme}

Repository Contents:
{contents}

Please analyze:
1. Architecture and design patterns used in the code
2. Key algorithms and their implementation
3. Dependencies and their usage
4. Code organization and structure
5. Potential technical challenges or limitations
"#;

pub const ACTIONABLE_INSIGHTS: &str = r#"Using the project information below, synthesize actionable insights and potential enhancements:
Project Name: {name}
Description: {description}
README:
{readme}

Provide detailed suggestions for improvements, potential integrations, and innovative ideas.
"#;

pub const METADATA_ANALYSIS: &str = r#"Extract and summarize the following metadata and contextual information about the project:
Project Name: {name}
Description: {description}
License: {license}
Owner: {owner}
README:
{readme}

Include community activity and project maturity if available.
"#;

pub const TAGGING_FRAMEWORK: &str = r#"Generate a comprehensive tagging framework for the GitHub project described below.
Output a JSON object with the following keys: "Technical_Tags", "Domain_and_Purpose", "Complexity_and_Maturity", "Unique_Features", "Potential_Applications".
Project Details:
Name: {name}
Description: {description}
README:
{readme}
"#;

pub const CREATIVE_REPURPOSING: &str = r#"Based on the project details below, propose an entirely new, innovative project concept that repurposes the original technology.
Include a new project name, a comprehensive concept overview, unique value proposition, innovative features, and potential impact.
Project Details:
Name: {name}
Description: {description}
README:
{readme}
"#;

pub const SPECULATIVE_INTEGRATION: &str = r#"Imagine an integration of the project described below with an emerging technology (e.g., blockchain, AR/VR, IoT).
Detail the following:
- The chosen emerging technology.
- An innovative use case enabled by this integration.
- Potential technical challenges and solutions.
- Future impact.
Project Details:
Name: {name}
Description: {description}
README:
{readme}
"#;

pub const CROSS_DISCIPLINARY_INNOVATION: &str = r#"Using the project information below, design a cross-disciplinary innovation that applies its strengths to a completely different field (e.g., healthcare, education, art).
Include:
- A unique project name.
- A detailed description of the new application.
- How the original technical components can be adapted.
- Potential collaboration opportunities between disciplines.
Project Details:
Name: {name}
Description: {description}
README:
{readme}
"#;

pub const DEPENDENCY_ANALYSIS: &str = r#"Analyze the dependencies and imports in this codebase:
Repository Contents:
{contents}

Please provide:
1. List of all external dependencies and their purposes
2. Key internal module relationships and dependencies
3. Potential dependency conflicts or version requirements
4. Suggestions for dependency optimization
"#;

pub const CODE_QUALITY: &str = r#"Review the code quality of this project:
Repository Contents:
{contents}

Please analyze:
1. Code organization and modularity
2. Error handling and edge cases
3. Documentation and code comments
4. Potential code smells or anti-patterns
5. Specific suggestions for code improvements
"#;

pub const SECURITY_REVIEW: &str = r#"Conduct a security review of this codebase:
Repository Contents:
{contents}

Please identify:
1. Potential security vulnerabilities
2. Unsafe data handling practices
3. Authentication/authorization concerns
4. Input validation issues
5. Recommendations for security improvements
"#;

/// Returns the template used for `kind`
pub fn template(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Overview => OVERVIEW,
        AnalysisKind::TechnicalAnalysis => TECHNICAL_ANALYSIS,
        AnalysisKind::ActionableInsights => ACTIONABLE_INSIGHTS,
        AnalysisKind::MetadataAnalysis => METADATA_ANALYSIS,
        AnalysisKind::TaggingFramework => TAGGING_FRAMEWORK,
        AnalysisKind::CreativeRepurposing => CREATIVE_REPURPOSING,
        AnalysisKind::SpeculativeIntegration => SPECULATIVE_INTEGRATION,
        AnalysisKind::CrossDisciplinaryInnovation => CROSS_DISCIPLINARY_INNOVATION,
        AnalysisKind::DependencyAnalysis => DEPENDENCY_ANALYSIS,
        AnalysisKind::CodeQuality => CODE_QUALITY,
        AnalysisKind::SecurityReview => SECURITY_REVIEW,
    }
}

/// Renders the prompt for `kind`
pub fn prompt_for(kind: AnalysisKind, metadata: &RepositoryMetadata) -> String {
    render(template(kind), metadata)
}

/// Fills every placeholder of `template` in a single pass
///
/// Substituted values are never scanned again, so brace sequences inside a
/// description, README or file reach the prompt unchanged. Unknown `{...}`
/// sequences are copied as they are. The file listing is only rendered when
/// the template asks for it.
pub fn render(template: &str, metadata: &RepositoryMetadata) -> String {
    let mut prompt = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail
            .find('}')
            .and_then(|close| placeholder(&tail[1..close], metadata).map(|value| (close, value)));

        match value {
            Some((close, value)) => {
                prompt.push_str(&value);
                rest = &tail[close + 1..];
            }
            None => {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
    }

    prompt.push_str(rest);
    prompt
}

fn placeholder<'a>(key: &str, metadata: &'a RepositoryMetadata) -> Option<Cow<'a, str>> {
    let value = match key {
        "name" => Cow::Borrowed(metadata.name().unwrap_or(NOT_AVAILABLE)),
        "description" => Cow::Borrowed(metadata.description().unwrap_or(NOT_AVAILABLE)),
        "license" => Cow::Borrowed(metadata.license_name().unwrap_or(NOT_SPECIFIED)),
        "owner" => Cow::Borrowed(metadata.owner_login().unwrap_or(NOT_SPECIFIED)),
        "readme" => Cow::Borrowed(metadata.readme.as_str()),
        "contents" => Cow::Owned(format_file_contents(&metadata.contents)),
        _ => return None,
    };
    Some(value)
}

/// Renders the file listing, cutting long files
pub fn format_file_contents(contents: &[FileEntry]) -> String {
    contents
        .iter()
        .map(|file| format!("File: {}\nContent:\n{}\n---", file.path, truncate_content(&file.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `content` to [`MAX_FILE_CHARS`] characters and appends the marker
pub fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_FILE_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}
