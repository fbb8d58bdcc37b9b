use gonggo_client::Chunk;

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Upper bound of a chunk, in chars.
    pub chunk_size: usize,
    /// Share of `chunk_size` below which no sentence boundary is searched.
    pub window_ratio: f64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            window_ratio: 0.7,
        }
    }
}

/// Greedy single-pass splitter that prefers to cut after `.`, `!` or `?`.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into trimmed, non-empty chunks with ids `0..n`.
    #[must_use]
    pub fn split(&self, document_id: &str, text: &str) -> Vec<Chunk> {
        split_text(text, self.config.chunk_size, self.config.window_ratio)
            .into_iter()
            .enumerate()
            .map(|(i, source)| Chunk::new(document_id, i.to_string(), source))
            .collect()
    }
}

fn split_text(text: &str, chunk_size: usize, window_ratio: f64) -> Vec<String> {
    let bound = chunk_size.max(1);
    let chars: Vec<char> = text.chars().collect();

    if chars.len() <= bound {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_owned()]
        };
    }

    let window = window_offset(bound, window_ratio);
    let mut pieces = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        let mut cut = (cursor + bound).min(chars.len());
        if cut < chars.len()
            && let Some(boundary) = find_boundary(&chars, cursor + window, cut)
        {
            cut = boundary;
        }

        let piece: String = chars[cursor..cut].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_owned());
        }
        cursor = cut;
    }

    pieces
}

/// Last position in `(floor, cut]` that follows a sentence ender and precedes whitespace.
fn find_boundary(chars: &[char], floor: usize, cut: usize) -> Option<usize> {
    ((floor + 1)..=cut)
        .rev()
        .find(|&i| is_sentence_end(chars[i - 1]) && matches!(chars[i], ' ' | '\n'))
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn window_offset(bound: usize, ratio: f64) -> usize {
    let offset = (bound as f64 * ratio.clamp(0.0, 1.0)).floor() as usize;
    offset.min(bound - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str, size: usize) -> Vec<String> {
        TextChunker::new(ChunkerConfig {
            chunk_size: size,
            ..ChunkerConfig::default()
        })
        .split("doc", text)
        .into_iter()
        .map(|c| c.source)
        .collect()
    }

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn empty_text() {
        assert!(split("", 500).is_empty());
        assert!(split("   \n  ", 500).is_empty());
    }

    #[test]
    fn short_text_is_single_trimmed_chunk() {
        let chunks = TextChunker::default().split("doc", "  Hello world.  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source, "Hello world.");
        assert_eq!(chunks[0].chunk_id, "0");
        assert_eq!(chunks[0].document_id, "doc");
    }

    #[test]
    fn text_exactly_at_bound_is_one_chunk() {
        let text = "a".repeat(500);
        assert_eq!(split(&text, 500), vec![text]);
    }

    #[test]
    fn hard_cut_without_boundary() {
        let text = "x".repeat(25);
        let chunks = split(&text, 10);
        assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn cuts_after_sentence_inside_window() {
        // '.' at index 7, space at 8; window for bound 10 is (7, 10]
        let text = "abcdefg. hijklmnopqrstu";
        let chunks = split(text, 10);
        assert_eq!(chunks[0], "abcdefg.");
        assert_eq!(squash(&chunks.concat()), squash(text));
    }

    #[test]
    fn boundary_before_window_is_ignored() {
        // '.' at index 2 lies below 70% of the bound
        let text = "ab. cdefghijklmnop";
        let chunks = split(text, 10);
        assert_eq!(chunks[0], "ab. cdefgh");
    }

    #[test]
    fn newline_counts_as_boundary() {
        let text = "abcdefgh!\nijklmnopq";
        let chunks = split(text, 10);
        assert_eq!(chunks[0], "abcdefgh!");
    }

    #[test]
    fn ender_without_following_space_is_not_boundary() {
        let text = "abcdefgh.ijklmnopq";
        let chunks = split(text, 10);
        assert_eq!(chunks[0], "abcdefgh.i");
    }

    #[test]
    fn bounds_are_counted_in_chars() {
        let text = "가".repeat(12);
        let chunks = split(&text, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 5);
    }

    #[test]
    fn whitespace_only_pieces_are_dropped_without_id_gaps() {
        let text = format!("{}{}{}", "a".repeat(10), " ".repeat(10), "b".repeat(5));
        let chunks = TextChunker::new(ChunkerConfig {
            chunk_size: 10,
            ..ChunkerConfig::default()
        })
        .split("doc", &text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].chunk_id, "1");
        assert_eq!(chunks[1].source, "bbbbb");
    }

    #[test]
    fn twelve_hundred_chars_with_two_sentence_ends() {
        let mut chars: Vec<char> = "lorem ipsum dolor sit amet consectetur "
            .chars()
            .cycle()
            .take(1200)
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        chars[479] = '.';
        chars[480] = ' ';
        chars[509] = '!';
        chars[510] = ' ';
        let text: String = chars.into_iter().collect();

        let chunks = split(&text, 500);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 480);
        assert!(chunks[0].ends_with('.'));
        assert_eq!(squash(&chunks.concat()), squash(&text));
    }

    mod proptest_chunker {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,3000}",
                chunk_size in 0usize..800,
                ratio in 0.0f64..1.5,
            ) {
                let _ = split_text(&content, chunk_size, ratio);
            }

            #[test]
            fn chunks_reconstruct_input(
                content in "[a-z가-힣 .!?\n]{0,2000}",
                chunk_size in 1usize..600,
            ) {
                let chunks = split(&content, chunk_size);
                prop_assert_eq!(squash(&chunks.concat()), squash(&content));
            }

            #[test]
            fn chunks_respect_bound(
                content in "[a-z .!?\n]{0,2000}",
                chunk_size in 1usize..600,
            ) {
                for chunk in split(&content, chunk_size) {
                    prop_assert!(chunk.chars().count() <= chunk_size);
                    prop_assert!(!chunk.is_empty());
                    prop_assert_eq!(chunk.trim(), chunk.as_str());
                }
            }

            #[test]
            fn chunk_ids_are_contiguous(
                content in "[a-z. ]{0,1500}",
                chunk_size in 1usize..300,
            ) {
                let chunks = TextChunker::new(ChunkerConfig {
                    chunk_size,
                    ..ChunkerConfig::default()
                })
                .split("d", &content);
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(&chunk.chunk_id, &i.to_string());
                }
            }

            #[test]
            fn short_input_is_single_chunk(content in "[a-z .]{1,100}") {
                prop_assume!(!content.trim().is_empty());
                let chunks = split(&content, 100);
                prop_assert_eq!(chunks, vec![content.trim().to_owned()]);
            }
        }
    }
}
