//! Secondary structure spans.
//!
//! Per-residue class labels (`H` helix, `E` sheet, `L` loop, ...) are
//! run-length encoded into maximal spans, which are then turned into
//! helix and sheet modifiers over residue numbers.

use crate::{
    embed::ResidueNumbering,
    error::SelectorError,
    modifier::{Modifier, ReprType},
    selector::{SelectionValue, Selector, SelectorKind},
};
use log::{debug, warn};

/// Contiguous run of equal labels, 0-based and half-open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsSpan {
    pub class: char,
    pub start: usize,
    pub end: usize,
}

impl SsSpan {
    pub fn new(class: char, start: usize, end: usize) -> Self {
        Self { class, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Maximal run-length encoding of the labels.
/// Spans cover the whole input exactly once, in input order.
pub fn extract_spans(labels: &str) -> Vec<SsSpan> {
    let mut spans: Vec<SsSpan> = vec![];
    for (i, c) in labels.chars().enumerate() {
        match spans.last_mut() {
            Some(last) if last.class == c => last.end = i + 1,
            _ => spans.push(SsSpan::new(c, i, i + 1)),
        }
    }
    spans
}

/// Reconstructs the label string from spans
pub fn expand_spans(spans: &[SsSpan]) -> String {
    spans
        .iter()
        .flat_map(|s| std::iter::repeat(s.class).take(s.len()))
        .collect()
}

/// Residue selection covering the span.
///
/// Contiguous increasing residue numbers give a `start-end` range,
/// anything else (gaps, insertions, renumbering) gives an explicit list.
/// Returns `None` if the numbering doesn't cover the span.
pub fn span_selection(span: &SsSpan, numbering: &ResidueNumbering) -> Option<SelectionValue> {
    let numbers = (span.start..span.end)
        .map(|i| numbering.number(i))
        .collect::<Option<Vec<_>>>()?;
    let first = *numbers.first()?;
    let last = *numbers.last()?;
    let contiguous = numbers.windows(2).all(|w| w[0].checked_add(1) == Some(w[1]));
    if contiguous {
        Some(SelectionValue::Range(first, last))
    } else {
        Some(SelectionValue::set(numbers))
    }
}

/// Helix modifiers for `H` spans and sheet modifiers for `E` spans.
/// Other classes are skipped.
pub fn structure_modifiers(
    labels: &str,
    numbering: &ResidueNumbering,
) -> Result<Modifier, SelectorError> {
    let spans = extract_spans(labels);
    debug!("{} secondary structure spans in '{labels}'", spans.len());

    let mut modifiers = vec![];
    for span in &spans {
        let repr = match span.class {
            'H' => ReprType::Helix,
            'E' => ReprType::Sheet,
            _ => continue,
        };
        let Some(value) = span_selection(span, numbering) else {
            warn!("no residue numbers for span {span:?}, skipped");
            continue;
        };
        let sel = Selector::new(SelectorKind::ResidueNumber, value)?;
        modifiers.push(Modifier::simple(repr, sel));
    }
    Ok(Modifier::composite(modifiers))
}

//##############################
//#  Tests
//##############################
