//! Prompt texts for the three attempt variants.
//!
//! The component listing comes from `loom_registry`, so what the model is
//! told it may use is exactly what the loader injects.

use loom_core::ENTRY_COMPONENT;

/// First attempt of a run: the full authoring contract.
#[must_use]
pub fn first_attempt(title: &str, objective: &str) -> String {
    let components = loom_registry::prompt_listing();
    format!(
        r##"Generate a complete, self-contained interactive React lesson component.

Title: {title}
Objective: {objective}

## Requirements

1. Output only the component code. No imports, no exports, no markdown fences.
2. Declare it as `function {ENTRY_COMPONENT}()`.
3. Use hooks and functional components only.
4. Close every JSX tag. Self-close empty elements.
5. Use the native JavaScript Math object for arithmetic; use MathFormula to display LaTeX.
6. Keep TypeScript annotations simple. Do not declare enums.

## Styling

Tailwind CSS classes are available. Use a dark theme:
- Root: `<div className="min-h-screen bg-[#0a0a0a] text-white">` wrapping `<div className="max-w-4xl mx-auto p-6 space-y-6">`.
- Headings `text-white`, body text `text-gray-300`, muted text `text-gray-400`.
- Dark backgrounds take light text, light backgrounds take dark text.
- SVG text uses light fills such as `fill="#9ca3af"`.
- Responsive grids: `grid grid-cols-1 md:grid-cols-2 gap-4`.

## Available components

These are already in scope. Use them by name.

{components}
## Interactivity

Every animated or simulated visualization needs Play/Pause and Reset buttons,
a speed control, sliders for its parameters, and a live readout of the values.
Quizzes track answers and score.

Now write the lesson for: {objective}

Return only the function, starting with "function {ENTRY_COMPONENT}()" and ending with its closing brace."##
    )
}

/// First attempt of a manual retry: the authoring contract, prefixed with
/// the failure that ended the previous run.
#[must_use]
pub fn retry_with_context(previous_error: &str, title: &str, objective: &str) -> String {
    format!(
        "A previous attempt to generate this lesson failed with:\n\n{previous_error}\n\n\
         Avoid that mistake this time.\n\n{}",
        first_attempt(title, objective)
    )
}

/// Self-correction attempt: the previous error and the source that caused it.
#[must_use]
pub fn error_feedback(error: &str, broken_source: &str) -> String {
    format!(
        r#"The following React TSX component failed to compile:

Error: {error}

Broken code:
{broken_source}

Fix it and output a working, corrected version of the same component.

Common fixes:
- Close every JSX tag and balance every brace and parenthesis
- Use MathFormula for LaTeX, not the Math object
- Check template literals for unescaped backticks and `${{`
- Verify Slider usage: `value={{[n]}} onValueChange={{(v) => setN(v[0])}}`
- Initialise all state
- Only use the components that were listed as available

Rules:
- Keep the function name {ENTRY_COMPONENT}
- Return only the function code, no markdown
- It must compile and render without error"#
    )
}
