//! Splits raw CV text into overlapping chunks and tags each chunk with a
//! naive keyword-based section type.

use serde::{Deserialize, Serialize};

/// Target chunk size in characters.
pub const CHUNK_SIZE: usize = 1000;
/// Characters of overlap carried between adjacent chunks, so evidence near a
/// boundary appears whole in at least one chunk.
pub const CHUNK_OVERLAP: usize = 200;

/// Separator preference when choosing where to end a chunk, from most to
/// least natural.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Education,
    Experience,
    Awards,
    Publications,
    Skills,
    General,
}

/// One chunk of CV text, ready for embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
    pub section: SectionType,
    pub char_count: usize,
}

/// Splits a document into tagged overlapping chunks.
pub fn chunk_document(text: &str) -> Vec<Chunk> {
    split_text(text, CHUNK_SIZE, CHUNK_OVERLAP)
        .into_iter()
        .enumerate()
        .map(|(id, text)| {
            let section = tag_section(&text);
            let char_count = text.chars().count();
            Chunk {
                id,
                text,
                section,
                char_count,
            }
        })
        .collect()
}

/// Splits `text` into pieces of at most `chunk_size` bytes with roughly
/// `overlap` bytes shared between neighbors. Chunk ends snap to the most
/// natural separator available inside the window.
///
/// # Panics
/// Panics if `overlap >= chunk_size`; the stride would never advance.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    assert!(
        overlap < chunk_size,
        "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
    );

    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let hard_end = ceil_char_boundary(text, (start + chunk_size).min(text.len()));
        let end = if hard_end == text.len() {
            hard_end
        } else {
            best_break(&text[start..hard_end], overlap).map_or(hard_end, |cut| start + cut)
        };

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end == text.len() {
            break;
        }
        // Step back by the overlap, but always make forward progress.
        let next = end.saturating_sub(overlap).max(start + 1);
        start = ceil_char_boundary(text, next);
    }

    chunks
}

/// Finds the byte offset just past the last separator occurrence in `window`,
/// preferring paragraph breaks over line breaks over sentence ends over
/// spaces. Cuts that would leave less than the overlap behind are rejected so
/// chunks cannot degenerate.
fn best_break(window: &str, overlap: usize) -> Option<usize> {
    for sep in SEPARATORS {
        if let Some(pos) = window.rfind(sep) {
            let cut = pos + sep.len();
            if cut > overlap {
                return Some(cut);
            }
        }
    }
    None
}

/// Rounds `i` up to the nearest char boundary of `text`.
fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Tags a chunk with a section type based on keyword presence. First match
/// wins, in the order education, experience, awards, publications, skills.
pub fn tag_section(chunk: &str) -> SectionType {
    let lower = chunk.to_lowercase();
    let contains_any = |kws: &[&str]| kws.iter().any(|kw| lower.contains(kw));

    if contains_any(&["education", "university", "degree", "phd", "master"]) {
        SectionType::Education
    } else if contains_any(&["experience", "work", "job", "position", "employment"]) {
        SectionType::Experience
    } else if contains_any(&["award", "honor", "prize", "recognition"]) {
        SectionType::Awards
    } else if contains_any(&["publication", "journal", "article", "paper", "conference"]) {
        SectionType::Publications
    } else if contains_any(&["skill", "proficiency", "expert", "competency"]) {
        SectionType::Skills
    } else {
        SectionType::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("just a short CV", 1000, 200);
        assert_eq!(chunks, vec!["just a short CV".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_text("   \n ", 1000, 200).is_empty());
        assert!(chunk_document("").is_empty());
    }

    #[test]
    fn test_long_text_overlaps() {
        let paragraph = "Led a research team of twelve engineers. ".repeat(10);
        let text = format!("{paragraph}\n\n{paragraph}\n\n{paragraph}");
        let chunks = split_text(&text, 400, 100);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.len() <= 400, "chunk of {} bytes exceeds limit", c.len());
        }
        // Adjacent chunks share text through the overlap.
        let tail: String = chunks[0].chars().rev().take(40).collect::<String>();
        let tail: String = tail.chars().rev().collect();
        assert!(
            chunks[1].contains(tail.trim()),
            "second chunk does not overlap the first"
        );
    }

    #[test]
    fn test_all_content_is_covered() {
        let words: Vec<String> = (0..300).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");
        let chunks = split_text(&text, 250, 50);
        let joined = chunks.join(" ");
        for w in &words {
            assert!(joined.contains(w), "missing {w}");
        }
    }

    #[test]
    fn test_multibyte_text_does_not_split_chars() {
        let text = "résumé ".repeat(200);
        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for c in chunks {
            assert!(c.contains("résumé"));
        }
    }

    #[test]
    #[should_panic]
    fn test_overlap_must_be_less_than_chunk_size() {
        let _ = split_text("abc", 10, 10);
    }

    #[test]
    fn test_section_tagging() {
        assert_eq!(
            tag_section("PhD from Stanford University"),
            SectionType::Education
        );
        assert_eq!(
            tag_section("Work history at three startups"),
            SectionType::Experience
        );
        assert_eq!(
            tag_section("Recipient of the Turing Prize"),
            SectionType::Awards
        );
        assert_eq!(
            tag_section("Published in Nature journal"),
            SectionType::Publications
        );
        assert_eq!(
            tag_section("Proficiency in distributed systems"),
            SectionType::Skills
        );
        assert_eq!(tag_section("Lorem ipsum dolor"), SectionType::General);
    }

    #[test]
    fn test_tagging_order_education_wins_over_awards() {
        // "university" and "award" both present; education is checked first.
        assert_eq!(
            tag_section("University award for teaching"),
            SectionType::Education
        );
    }

    #[test]
    fn test_chunk_document_assigns_ids_and_counts() {
        let chunks = chunk_document("Experience: built things at a job");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(chunks[0].section, SectionType::Experience);
        assert_eq!(chunks[0].char_count, chunks[0].text.chars().count());
    }
}
