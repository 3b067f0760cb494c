//! Run-level formatting over a selection.
//!
//! Both operations split runs at the selection edges, edit every run inside,
//! then re-merge neighbours with identical formatting left to right. Toggling
//! the same format twice over the same range restores the original run
//! boundaries.

use crate::mutations::MutationResult;
use folio_document::inline::for_each_line_range;
use folio_document::{Format, InlineRun, RunAttribute, SelectionRange, TextBody, TextNode};

fn edit_runs(text: &mut TextNode, selection: &SelectionRange, mut edit: impl FnMut(&mut InlineRun)) {
    let mut lines = text.body.to_lines();
    let end = selection.end.min(text.char_len());
    for_each_line_range(&mut lines, selection.start, end, |line, s, e| line.map_range(s, e, &mut edit));
    text.body = TextBody::from_lines(lines);
}

/// Flip `format` on every run inside the selection
pub fn toggle_format(text: &mut TextNode, selection: &SelectionRange, format: Format) -> MutationResult {
    edit_runs(text, selection, |run| format.flip(run));
    Ok(None)
}

/// Set (or clear) a valued attribute on every run inside the selection
pub fn apply_run_attribute(text: &mut TextNode, selection: &SelectionRange, attribute: &RunAttribute) -> MutationResult {
    edit_runs(text, selection, |run| attribute.apply(run));
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{ElementType, Line};

    fn runs(text: &TextNode) -> Vec<(String, bool)> {
        text.body
            .to_lines()
            .into_iter()
            .flat_map(|l| l.runs)
            .map(|r| (r.content, r.bold))
            .collect()
    }

    #[test]
    fn test_toggle_splits_and_merges() {
        let mut text = TextNode::paragraph("p", "Hello world");
        toggle_format(&mut text, &SelectionRange::new("p", 0, 5), Format::Bold).unwrap();
        assert_eq!(runs(&text), vec![("Hello".into(), true), (" world".into(), false)]);

        // Extending the bold range merges into one bold run
        toggle_format(&mut text, &SelectionRange::new("p", 5, 11), Format::Bold).unwrap();
        assert_eq!(runs(&text), vec![("Hello world".into(), true)]);
    }

    #[test]
    fn test_toggle_twice_restores_boundaries() {
        let mut text = TextNode::new("p", ElementType::P).with_runs(vec![
            InlineRun::plain("ab").italic(),
            InlineRun::plain("cdef"),
        ]);
        let original = text.body.to_lines();
        let selection = SelectionRange::new("p", 1, 4);

        toggle_format(&mut text, &selection, Format::Bold).unwrap();
        toggle_format(&mut text, &selection, Format::Bold).unwrap();
        assert_eq!(text.body.to_lines(), original);
    }

    #[test]
    fn test_toggle_across_lines_skips_separator() {
        let mut text = TextNode::new("p", ElementType::Li);
        text.body = TextBody::Lines(vec![Line::plain("one"), Line::plain("two")]);

        toggle_format(&mut text, &SelectionRange::new("p", 2, 5), Format::Underline).unwrap();

        let lines = text.body.to_lines();
        assert_eq!(lines[0].runs[1].content, "e");
        assert!(lines[0].runs[1].underline);
        assert_eq!(lines[1].runs[0].content, "t");
        assert!(lines[1].runs[0].underline);
        assert_eq!(text.logical_text(), "one\ntwo");
    }

    #[test]
    fn test_apply_and_clear_href() {
        let mut text = TextNode::paragraph("p", "click here");
        let selection = SelectionRange::new("p", 6, 10);
        apply_run_attribute(&mut text, &selection, &RunAttribute::Href(Some("/docs".into()))).unwrap();

        let lines = text.body.to_lines();
        assert_eq!(lines[0].runs[1].href.as_deref(), Some("/docs"));

        apply_run_attribute(&mut text, &selection, &RunAttribute::Href(None)).unwrap();
        assert_eq!(text.body, TextBody::Plain("click here".into()));
    }

    #[test]
    fn test_collapsed_selection_is_noop() {
        let mut text = TextNode::paragraph("p", "abc");
        toggle_format(&mut text, &SelectionRange::caret("p", 1), Format::Bold).unwrap();
        assert_eq!(text.body, TextBody::Plain("abc".into()));
    }
}
