use crate::types::ContentBlock;

pub const TRANSCRIPT_HEADING: &str = "Transcript";

const DIVIDER: &str = "────────────────────────────────────────";

/// One narrative section, emitted only for blocks that carry markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSection {
    pub block_index: usize,
    pub heading: &'static str,
    /// The block's markdown, verbatim.
    pub text: String,
}

/// Narrative sections for every block with markdown, in block order.
/// Independent of which block is selected.
pub fn render_transcripts(contents: &[ContentBlock]) -> Vec<TranscriptSection> {
    contents
        .iter()
        .enumerate()
        .filter_map(|(block_index, block)| {
            let text = block.markdown.as_ref().filter(|text| !text.is_empty())?;
            Some(TranscriptSection {
                block_index,
                heading: TRANSCRIPT_HEADING,
                text: text.clone(),
            })
        })
        .collect()
}

/// Plain-text concatenation of the sections, each followed by a divider.
pub fn transcript_text(sections: &[TranscriptSection]) -> String {
    let mut output = String::new();
    for section in sections {
        output.push_str(section.heading);
        output.push('\n');
        output.push_str(&section.text);
        output.push('\n');
        output.push_str(DIVIDER);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_markdown(markdown: Option<&str>) -> ContentBlock {
        ContentBlock {
            markdown: markdown.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn only_blocks_with_markdown_emit_sections() {
        let contents = vec![with_markdown(Some("hello\n  world\n")), with_markdown(None)];
        let sections = render_transcripts(&contents);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].block_index, 0);
        assert_eq!(sections[0].heading, "Transcript");
        assert_eq!(sections[0].text, "hello\n  world\n");
    }

    #[test]
    fn empty_markdown_is_skipped() {
        assert!(render_transcripts(&[with_markdown(Some(""))]).is_empty());
    }

    #[test]
    fn empty_contents_render_nothing() {
        assert!(render_transcripts(&[]).is_empty());
        assert_eq!(transcript_text(&[]), "");
    }

    #[test]
    fn sections_follow_block_order() {
        let contents = vec![
            with_markdown(None),
            with_markdown(Some("second")),
            with_markdown(Some("third")),
        ];
        let indices: Vec<usize> = render_transcripts(&contents)
            .iter()
            .map(|s| s.block_index)
            .collect();
        assert_eq!(indices, [1, 2]);
    }

    #[test]
    fn text_keeps_line_breaks() {
        let sections = render_transcripts(&[with_markdown(Some("a\nb"))]);
        let text = transcript_text(&sections);
        assert!(text.starts_with("Transcript\na\nb\n"));
    }
}
