//! Prompt assembly
//!
//! Builds the system and user messages for annotation generation. The
//! system prompt fixes the output contract: one JSON object per line with
//! an `anchor` quoted verbatim from the page, which is what lets the
//! resolver find each note's passage again.

use crate::annotations::AnnotationMode;
use crate::llm::AnnotationRequest;

/// Page content is capped before prompting; beyond this the marginal
/// annotation quality does not justify the tokens.
const MAX_PAGE_BYTES: usize = 12_000;

const BASE_PROMPT: &str = "\
You are a learned annotator writing margin notes for a reader. You receive \
the text of a page and produce short, specific annotations tied to exact \
passages.

Output format: one JSON object per line, no surrounding markdown, with \
these fields:
- \"mode\": which annotation style this note uses
- \"content\": the note itself, one to three sentences
- \"anchor\": an exact, character-for-character quote from the page content, \
roughly 5 to 30 words

The anchor must be copied verbatim from the page content. Do not paraphrase \
it, correct its spelling, or change its punctuation; a note whose anchor \
does not appear in the page cannot be placed and is discarded.";

const CLOSE_READING_PROMPT: &str = "\
Attend to the language itself: word choice, syntax, imagery, rhythm, and \
structure. Point at what the phrasing is doing and what it implies, the way \
a careful seminar reader would.";

const CONTEXT_PROMPT: &str = "\
Supply the background a curious reader lacks: who a named figure is, what \
an event refers to, where an idea comes from, and connections to related \
work. Keep it factual and brief.";

const DEVILS_ADVOCATE_PROMPT: &str = "\
Push back on the text. Identify claims that are asserted without support, \
counterexamples the author ignores, and places where the argument proves \
less than it claims. Be pointed but fair.";

/// System and user halves of one prompt
#[derive(Debug, Clone)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Assemble the annotation prompt for a request.
pub fn build_annotation_prompt(request: &AnnotationRequest) -> PromptPair {
    let mode_sections = request
        .modes
        .iter()
        .map(|mode| format!("### {}\n\n{}", mode.label(), mode_instructions(*mode)))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut system = format!("{}\n\n## Active Modes\n\n{}", BASE_PROMPT, mode_sections);
    if let Some(context) = &request.reader_context {
        system.push_str(&format!("\n\n## Reader Context\n\n{}", context));
    }

    let mode_list = request
        .modes
        .iter()
        .map(|mode| mode.label())
        .collect::<Vec<_>>()
        .join(", ");
    let content = truncate_on_char_boundary(&request.page.content, MAX_PAGE_BYTES);

    let user = match &request.selected_text {
        Some(selected) => format!(
            "The reader has selected the following passage for annotation:\n\n\
             <selected_text>\n{}\n</selected_text>\n\n\
             From the page \"{}\" ({}):\n\n\
             <page_content>\n{}\n</page_content>\n\n\
             Generate annotations for the selected passage using these modes: {}",
            selected, request.page.title, request.page.url, content, mode_list
        ),
        None => format!(
            "Page: \"{}\" ({})\n\n\
             <page_content>\n{}\n</page_content>\n\n\
             Generate annotations for this page using these modes: {}",
            request.page.title, request.page.url, content, mode_list
        ),
    };

    PromptPair { system, user }
}

fn mode_instructions(mode: AnnotationMode) -> &'static str {
    match mode {
        AnnotationMode::CloseReading => CLOSE_READING_PROMPT,
        AnnotationMode::Context => CONTEXT_PROMPT,
        AnnotationMode::DevilsAdvocate => DEVILS_ADVOCATE_PROMPT,
    }
}

fn truncate_on_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
