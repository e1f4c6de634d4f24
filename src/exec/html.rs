//! HTML preview branch: structural validation only, no execution.
//!
//! The source is parsed as a full document with an HTML5 parser (embedded
//! scripts are never run) and the preview lists the top-level elements found
//! in the body.

use scraper::{ElementRef, Html, Selector};

use crate::error::{PlaygroundError, Result};
use crate::exec::dispatcher::ExecutionResult;

const NO_BODY_MESSAGE: &str = "HTML parsed successfully, but no body content detected.";

/// Produce a preview result for the given markup.
pub(crate) fn preview(source: &str) -> ExecutionResult {
    match summarize(source) {
        Ok(summary) => ExecutionResult::success(summary),
        Err(e) => ExecutionResult::error(format!("HTML Parse Error: {e}")),
    }
}

fn summarize(source: &str) -> Result<String> {
    let document = Html::parse_document(source);

    let body_selector =
        Selector::parse("body").map_err(|e| PlaygroundError::ParseFault(e.to_string()))?;

    let Some(body) = document.select(&body_selector).next() else {
        return Ok(NO_BODY_MESSAGE.to_string());
    };

    let tags: Vec<&str> = body
        .children()
        .filter_map(ElementRef::wrap)
        .map(|element| element.value().name())
        .collect();
    let has_text = body.text().any(|chunk| !chunk.trim().is_empty());

    if tags.is_empty() && !has_text {
        return Ok(NO_BODY_MESSAGE.to_string());
    }

    let mut summary = String::from(
        "HTML parsed successfully!\n\n\
         In a full implementation, this would render in an iframe or preview panel.\n\n\
         HTML structure detected:\n",
    );
    summary.push_str(
        &tags
            .iter()
            .map(|tag| format!("- <{tag}>"))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element_listed() {
        let result = preview("<div>hi</div>");
        assert!(!result.is_error);
        assert!(result.output.contains("HTML structure detected:"));
        assert!(result.output.contains("- <div>"));
    }

    #[test]
    fn test_top_level_elements_only() {
        let result = preview("<section><p>nested</p></section><footer></footer>");
        assert!(result.output.contains("- <section>"));
        assert!(result.output.contains("- <footer>"));
        assert!(!result.output.contains("- <p>"));
    }

    #[test]
    fn test_empty_source_reports_no_body() {
        let result = preview("");
        assert_eq!(result.output, NO_BODY_MESSAGE);
        assert!(!result.is_error);
    }

    #[test]
    fn test_whitespace_only_reports_no_body() {
        let result = preview("   \n\t  ");
        assert_eq!(result.output, NO_BODY_MESSAGE);
        assert!(!result.is_error);
    }

    #[test]
    fn test_full_document() {
        let source = "<!DOCTYPE html><html><head><title>t</title></head>\
                      <body><h1>Hello</h1><p>World</p></body></html>";
        let result = preview(source);
        assert_eq!(
            result.output.lines().rev().take(2).collect::<Vec<_>>(),
            vec!["- <p>", "- <h1>"]
        );
    }

    #[test]
    fn test_scripts_are_not_executed() {
        // The parser sees a script element; nothing runs
        let result = preview("<script>throw new Error('nope')</script><div></div>");
        assert!(!result.is_error);
        assert!(result.output.contains("- <div>"));
    }
}
