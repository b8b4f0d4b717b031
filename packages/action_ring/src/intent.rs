//! Gesture Intents
//!
//! Every (context, gesture) pair maps to one intent: a short label for the
//! display, the action handed to the AI, and a one-line description. The
//! table is static and built on first use.

use std::collections::HashMap;
use std::sync::LazyLock;

use ring_gesture::Gesture;
use serde::Serialize;

use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Intent {
    #[serde(rename = "intent")]
    pub label: &'static str,
    pub ai_action: &'static str,
    pub description: &'static str,
}

const WAITING: Intent = Intent {
    label: "Waiting...",
    ai_action: "No action",
    description: "Perform a gesture to trigger AI assistance",
};

const fn intent(
    label: &'static str,
    ai_action: &'static str,
    description: &'static str,
) -> Intent {
    Intent {
        label,
        ai_action,
        description,
    }
}

static INTENTS: LazyLock<HashMap<(AppContext, Gesture), Intent>> = LazyLock::new(|| {
    use AppContext::*;
    use Gesture::*;

    let mut table = HashMap::with_capacity(25);
    let mut add = |context, rows: [(Gesture, Intent); 4]| {
        for (gesture, intent) in rows {
            table.insert((context, gesture), intent);
        }
        table.insert((context, Idle), WAITING);
    };

    add(
        Vscode,
        [
            (
                Rotate,
                intent(
                    "Summarize code",
                    "Analyze current file and provide a concise summary",
                    "AI reads your code and explains what it does in plain English",
                ),
            ),
            (
                PressDrag,
                intent(
                    "Explain like I'm junior",
                    "Break down selected code with beginner-friendly explanations",
                    "Complex code explained in simple terms with examples",
                ),
            ),
            (
                LongPress,
                intent(
                    "Suggest next action",
                    "Predict what you're trying to build and suggest next steps",
                    "AI anticipates your coding flow and recommends actions",
                ),
            ),
            (
                DoubleTap,
                intent(
                    "Fix errors",
                    "Detect and fix compilation errors in current file",
                    "AI scans for bugs and suggests fixes",
                ),
            ),
        ],
    );
    add(
        Cursor,
        [
            (
                Rotate,
                intent(
                    "Code review",
                    "Review current changes and suggest improvements",
                    "AI examines your code for best practices and optimizations",
                ),
            ),
            (
                PressDrag,
                intent(
                    "Generate tests",
                    "Create unit tests for selected function",
                    "AI writes comprehensive test coverage",
                ),
            ),
            (
                LongPress,
                intent(
                    "Refactor code",
                    "Suggest refactoring patterns for cleaner code",
                    "AI identifies code smells and modernization opportunities",
                ),
            ),
            (
                DoubleTap,
                intent(
                    "Document code",
                    "Generate JSDoc/comments for selected code",
                    "AI writes clear documentation",
                ),
            ),
        ],
    );
    add(
        Figma,
        [
            (
                Rotate,
                intent(
                    "Design feedback",
                    "Analyze current design and suggest improvements",
                    "AI reviews your design for UX best practices",
                ),
            ),
            (
                PressDrag,
                intent(
                    "Generate variants",
                    "Create design variations based on current selection",
                    "AI produces alternative designs and color schemes",
                ),
            ),
            (
                LongPress,
                intent(
                    "Accessibility check",
                    "Audit design for accessibility issues",
                    "AI scans for contrast, spacing, and a11y problems",
                ),
            ),
            (
                DoubleTap,
                intent(
                    "Export assets",
                    "Prepare and optimize assets for development",
                    "AI generates production-ready assets",
                ),
            ),
        ],
    );
    add(
        Docs,
        [
            (
                Rotate,
                intent(
                    "Summarize document",
                    "Generate executive summary of current document",
                    "AI creates a concise overview of key points",
                ),
            ),
            (
                PressDrag,
                intent(
                    "Improve writing",
                    "Enhance selected text for clarity and tone",
                    "AI refines your writing style and grammar",
                ),
            ),
            (
                LongPress,
                intent(
                    "Translate",
                    "Translate selected text to target language",
                    "AI provides accurate translations",
                ),
            ),
            (
                DoubleTap,
                intent(
                    "Format document",
                    "Apply consistent styling and formatting",
                    "AI standardizes your document structure",
                ),
            ),
        ],
    );
    add(
        Browser,
        [
            (
                Rotate,
                intent(
                    "Summarize page",
                    "Extract and summarize key information from webpage",
                    "AI digests long articles into quick insights",
                ),
            ),
            (
                PressDrag,
                intent(
                    "Research assist",
                    "Find related articles and sources",
                    "AI discovers relevant content for deeper research",
                ),
            ),
            (
                LongPress,
                intent(
                    "Fact check",
                    "Verify claims and check sources",
                    "AI validates information accuracy",
                ),
            ),
            (
                DoubleTap,
                intent(
                    "Save & organize",
                    "Bookmark with AI-generated tags and summary",
                    "AI categorizes and archives important content",
                ),
            ),
        ],
    );

    table
});

/// Look up the intent for a context and gesture. The table is total.
pub fn intent_for(context: AppContext, gesture: Gesture) -> Intent {
    INTENTS
        .get(&(context, gesture))
        .copied()
        .unwrap_or(WAITING)
}

/// Compose the user prompt sent to the AI for a context and gesture.
pub fn build_prompt(context: AppContext, gesture: Gesture) -> String {
    let action = intent_for(context, gesture).ai_action;
    let example = context.example_content();

    match gesture {
        Gesture::Rotate => format!("{action} for this content: {example}"),
        Gesture::PressDrag => format!("{action}. Content: {example}"),
        Gesture::LongPress => format!("{action} based on this context: {example}"),
        Gesture::DoubleTap => format!("{action} for: {example}"),
        Gesture::Idle => action.to_string(),
    }
}

/// One row of the intent table, as listed over HTTP and by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct IntentEntry {
    pub context: AppContext,
    pub gesture: Gesture,
    #[serde(flatten)]
    pub intent: Intent,
}

/// The full table in a stable order: contexts, then gestures.
pub fn all_intents() -> Vec<IntentEntry> {
    AppContext::ALL
        .into_iter()
        .flat_map(|context| {
            Gesture::ALL.into_iter().map(move |gesture| IntentEntry {
                context,
                gesture,
                intent: intent_for(context, gesture),
            })
        })
        .collect()
}
