//! Sliding-window text chunking.

use scoperag_core::{AppError, AppResult};

/// Default window length in characters.
pub const DEFAULT_WINDOW: usize = 800;

/// Default overlap between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 200;

/// Split text into overlapping fixed-size windows.
///
/// Windows start at offsets `0, window-overlap, 2*(window-overlap), ...`;
/// the final window is clipped to the text length. Every character is
/// covered by at least one window, and consecutive windows share exactly
/// `overlap` characters except possibly the final pair.
///
/// Offsets are in characters, not bytes, so multibyte text chunks safely.
/// `overlap` must be strictly less than `window` or the scan never advances.
pub fn chunk(text: &str, window: usize, overlap: usize) -> AppResult<Vec<String>> {
    if window == 0 {
        return Err(AppError::Config("chunk window must be non-zero".to_string()));
    }
    if overlap >= window {
        return Err(AppError::Config(format!(
            "chunk overlap ({}) must be strictly less than window ({})",
            overlap, window
        )));
    }

    let text = text.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len <= window {
        return Ok(vec![text.to_string()]);
    }

    let step = window - overlap;
    let mut chunks = Vec::with_capacity(len / step + 1);
    let mut start = 0;
    loop {
        let end = (start + window).min(len);
        chunks.push(chars[start..end].iter().collect());
        if start + window >= len {
            break;
        }
        start += step;
    }

    tracing::debug!(
        "Chunked {} chars into {} windows (window: {}, overlap: {})",
        len,
        chunks.len(),
        window,
        overlap
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let text = "a".repeat(800);
        let chunks = chunk(&text, 800, 200).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 800);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk("", 800, 200).unwrap().is_empty());
        assert!(chunk("   \n  ", 800, 200).unwrap().is_empty());
    }

    #[test]
    fn test_1700_chars_yields_three_exact_windows() {
        // Distinct characters so overlap can be checked positionally.
        let text: String = (0..1700u32)
            .map(|i| char::from_u32('a' as u32 + (i % 26)).unwrap())
            .collect();
        let chunks = chunk(&text, 800, 200).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 800);
        assert_eq!(chunks[1].chars().count(), 800);
        // Final window clipped to the text length: 1700 - 1200
        assert_eq!(chunks[2].chars().count(), 500);

        // Consecutive windows share exactly 200 characters.
        let tail0: String = chunks[0].chars().skip(600).collect();
        let head1: String = chunks[1].chars().take(200).collect();
        assert_eq!(tail0, head1);

        let tail1: String = chunks[1].chars().skip(600).collect();
        let head2: String = chunks[2].chars().take(200).collect();
        assert_eq!(tail1, head2);
    }

    #[test]
    fn test_every_character_covered_and_last_window_ends_at_len() {
        let text: String = (0..2345u32)
            .map(|i| char::from_u32('0' as u32 + (i % 10)).unwrap())
            .collect();
        let chunks = chunk(&text, 300, 50).unwrap();

        // Reconstruct coverage from window offsets.
        let step = 300 - 50;
        let mut covered = vec![false; 2345];
        for (i, c) in chunks.iter().enumerate() {
            let start = i * step;
            for j in start..start + c.chars().count() {
                covered[j] = true;
            }
        }
        assert!(covered.iter().all(|&c| c));

        // Last chunk ends exactly at the text length.
        let last_start = (chunks.len() - 1) * step;
        assert_eq!(last_start + chunks.last().unwrap().chars().count(), 2345);
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let text = "日本語のテキスト".repeat(200); // 1600 chars, 3 bytes each
        let chunks = chunk(&text, 800, 200).unwrap();
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.chars().count() <= 800);
        }
    }

    #[test]
    fn test_overlap_must_be_less_than_window() {
        assert!(matches!(
            chunk("some text", 100, 100),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            chunk("some text", 100, 150),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_900_chars_yields_two_chunks() {
        let text = "x".repeat(900);
        let chunks = chunk(&text, 800, 200).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 800);
        assert_eq!(chunks[1].len(), 300); // 900 - 600
    }
}
