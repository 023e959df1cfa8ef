/// Splits source text into size-bounded, sentence-aware chunks.
///
/// A sentence boundary is a `.`, `!`, or `?` immediately followed by
/// whitespace (or end of text). Sentences are packed greedily into a chunk
/// up to `max_chunk_size` characters; a single sentence longer than that
/// limit is emitted whole, as its own chunk, never split mid-sentence.
pub struct TextSplitter {
    max_chunk_size: usize,
}

impl TextSplitter {
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Split `text` into sentences, preserving terminators, in source order.
    pub fn split_sentences(text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();

        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            current.push(ch);

            if ch == '.' || ch == '!' || ch == '?' {
                let next_is_whitespace = i + 1 >= chars.len() || chars[i + 1].is_whitespace();
                if next_is_whitespace {
                    let sentence = current.trim().to_string();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    current.clear();
                }
            }

            i += 1;
        }

        let tail = current.trim().to_string();
        if !tail.is_empty() {
            sentences.push(tail);
        }

        sentences
    }

    /// Pack sentences into chunks, each at most `max_chunk_size` characters,
    /// except that an oversize sentence is always kept whole in its own
    /// chunk rather than truncated or split further.
    pub fn split(&self, text: &str) -> Vec<String> {
        let sentences = Self::split_sentences(text);
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if current.is_empty() {
                current = sentence;
                continue;
            }

            let candidate_len = current.len() + 1 + sentence.len();
            if candidate_len <= self.max_chunk_size {
                current.push(' ');
                current.push_str(&sentence);
            } else {
                chunks.push(std::mem::take(&mut current));
                current = sentence;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}
