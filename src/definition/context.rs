/// Splits `text` into sentences, keeping the terminating punctuation.
/// Line breaks also end a sentence, since OCR output rarely wraps cleanly.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let end = match c {
            '.' | '!' | '?' => {
                // Swallow runs like "?!" or "..." into the same sentence
                let mut end = idx + c.len_utf8();
                while let Some(&(next_idx, next)) = chars.peek() {
                    if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')') {
                        end = next_idx + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                end
            }
            '\n' => idx,
            _ => continue,
        };

        push_trimmed(&mut sentences, &text[start..end]);
        start = if c == '\n' { idx + 1 } else { end };
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// First sentence of `text` containing `word`, compared case-insensitively.
pub fn find_sentence<'a>(word: &str, text: &'a str) -> Option<&'a str> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return None;
    }

    sentences(text)
        .into_iter()
        .find(|sentence| sentence.to_lowercase().contains(&word))
}
