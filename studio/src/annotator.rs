//! Annotator: partitions the document into plain and highlighted runs.
//!
//! The partition is recomputed from scratch on every render from the current
//! text, the corrections (in analysis order) and the last-changed span. Runs
//! always concatenate back to the exact document text.
//!
//! Corrections claim spans first-writer-wins: once a slice becomes a
//! correction run it is never split again, so a later correction whose
//! `original` overlaps an earlier claim is skipped for that occurrence. The
//! changed-span pass only looks at plain runs and marks a single occurrence.

use shared_types::{Correction, Run};

/// Build the run partition for `document`.
pub fn annotate(document: &str, corrections: &[Correction], last_changed: Option<&str>) -> Vec<Run> {
    let mut runs = Vec::new();
    if !document.is_empty() {
        runs.push(Run::Plain {
            text: document.to_string(),
        });
    }

    for (index, correction) in corrections.iter().enumerate() {
        if correction.original.is_empty() {
            continue;
        }
        runs = split_plain_runs(runs, &correction.original, None, |text| Run::Correction {
            text,
            correction: index,
        });
    }

    if let Some(changed) = last_changed.filter(|span| !span.is_empty()) {
        runs = split_plain_runs(runs, changed, Some(1), |text| Run::Changed { text });
    }

    runs
}

/// Split every plain run on occurrences of `needle`, left to right.
///
/// `limit` caps the number of occurrences converted across all runs.
fn split_plain_runs<F>(runs: Vec<Run>, needle: &str, limit: Option<usize>, highlight: F) -> Vec<Run>
where
    F: Fn(String) -> Run,
{
    let mut remaining = limit.unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(runs.len());

    for run in runs {
        let text = match run {
            Run::Plain { text } if remaining > 0 => text,
            other => {
                out.push(other);
                continue;
            }
        };

        let mut rest = text.as_str();
        while remaining > 0 {
            let Some(start) = rest.find(needle) else {
                break;
            };
            let end = start + needle.len();
            if start > 0 {
                out.push(Run::Plain {
                    text: rest[..start].to_string(),
                });
            }
            out.push(highlight(rest[start..end].to_string()));
            rest = &rest[end..];
            remaining -= 1;
        }
        if !rest.is_empty() {
            out.push(Run::Plain {
                text: rest.to_string(),
            });
        }
    }

    out
}

/// Concatenate runs back into text.
pub fn flatten(runs: &[Run]) -> String {
    runs.iter().map(Run::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CorrectionKind;

    fn fix(original: &str, replacement: &str) -> Correction {
        Correction {
            original: original.to_string(),
            replacement: replacement.to_string(),
            kind: CorrectionKind::Grammar,
            explanation: String::new(),
        }
    }

    fn plain(text: &str) -> Run {
        Run::Plain {
            text: text.to_string(),
        }
    }

    fn marked(text: &str, correction: usize) -> Run {
        Run::Correction {
            text: text.to_string(),
            correction,
        }
    }

    #[test]
    fn empty_document_has_no_runs() {
        assert!(annotate("", &[fix("a", "b")], Some("b")).is_empty());
    }

    #[test]
    fn no_corrections_yields_single_plain_run() {
        assert_eq!(annotate("I has a dog", &[], None), vec![plain("I has a dog")]);
    }

    #[test]
    fn highlights_every_occurrence_of_a_correction() {
        let runs = annotate("bad and bad", &[fix("bad", "good")], None);
        assert_eq!(runs, vec![marked("bad", 0), plain(" and "), marked("bad", 0)]);
    }

    #[test]
    fn earlier_correction_wins_overlaps() {
        let corrections = [fix("has a", "has an"), fix("a dog", "the dog")];
        let runs = annotate("I has a dog", &corrections, None);
        assert_eq!(runs, vec![plain("I "), marked("has a", 0), plain(" dog")]);
    }

    #[test]
    fn later_correction_still_matches_elsewhere() {
        let corrections = [fix("has", "have"), fix("dog", "dogs")];
        let runs = annotate("I has a dog", &corrections, None);
        assert_eq!(
            runs,
            vec![plain("I "), marked("has", 0), plain(" a "), marked("dog", 1)]
        );
    }

    #[test]
    fn changed_span_marks_first_plain_occurrence_only() {
        let runs = annotate("good food, good mood", &[], Some("good"));
        assert_eq!(
            runs,
            vec![
                Run::Changed {
                    text: "good".to_string()
                },
                plain(" food, good mood"),
            ]
        );
    }

    #[test]
    fn changed_span_never_reopens_correction_runs() {
        let runs = annotate("have a have", &[fix("have a", "have an")], Some("have"));
        assert_eq!(
            runs,
            vec![
                marked("have a", 0),
                plain(" "),
                Run::Changed {
                    text: "have".to_string()
                },
            ]
        );
    }

    #[test]
    fn empty_originals_are_ignored() {
        let runs = annotate("text", &[fix("", "x")], Some(""));
        assert_eq!(runs, vec![plain("text")]);
    }

    #[test]
    fn partition_is_lossless_for_multibyte_text() {
        let doc = "Café culture - naïve views, café owners, naïve café";
        let corrections = [fix("café", "cafe"), fix("naïve", "naive"), fix("é c", "e c")];
        let runs = annotate(doc, &corrections, Some("owners"));
        assert_eq!(flatten(&runs), doc);
        assert!(runs.iter().all(|run| !run.text().is_empty()));
    }

    #[test]
    fn partition_is_deterministic() {
        let doc = "the the the cat sat on the mat";
        let corrections = [fix("the the", "the"), fix("the", "a"), fix("at", "og")];
        let first = annotate(doc, &corrections, Some("on"));
        let second = annotate(doc, &corrections, Some("on"));
        assert_eq!(first, second);
        assert_eq!(flatten(&first), doc);
    }

    #[test]
    fn partition_invariant_holds_over_many_inputs() {
        let docs = [
            "",
            "a",
            "aaaa",
            "abab abab",
            "I has a dog and he have a cat",
            "  leading and trailing  ",
        ];
        let needles = ["a", "ab", "b a", "has", "have a", " ", "zzz"];
        for doc in docs {
            for first in needles {
                for second in needles {
                    let corrections = [fix(first, "x"), fix(second, "y")];
                    for changed in [None, Some("a"), Some(" ")] {
                        let runs = annotate(doc, &corrections, changed);
                        assert_eq!(flatten(&runs), doc, "doc={doc:?} {first:?} {second:?}");
                    }
                }
            }
        }
    }
}
