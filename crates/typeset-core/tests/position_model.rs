//! Randomized checks of the offset <-> line/column conversions.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use typeset_core::{Document, PositionVector, Selection, Viewport};

fn random_text(rng: &mut StdRng, len: usize) -> String {
    const ALPHABET: &[char] = &['a', 'b', ' ', '\n', 'é', '中', '\t', '\n'];
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn test_index_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let len = rng.gen_range(0..80);
        let text = random_text(&mut rng, len);
        let char_count = text.chars().count();

        for index in 0..=char_count {
            let position = PositionVector::from_index(&text, index);
            assert_eq!(position.to_index(&text), index, "{text:?} @ {index}");
        }
    }
}

#[test]
fn test_document_agrees_with_text_positions() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..100 {
        let len = rng.gen_range(0..120);
        let text = random_text(&mut rng, len);
        let document = Document::from_text(&text);
        let char_count = text.chars().count();

        assert_eq!(document.len_chars(), char_count);
        assert_eq!(document.lines(), text.split('\n').collect::<Vec<_>>());

        for _ in 0..20 {
            let index = rng.gen_range(0..=char_count);
            let position = PositionVector::from_index(&text, index);
            assert_eq!(document.position(index), position);
            assert_eq!(document.line_of(index), position.line_index);
        }
    }
}

#[test]
fn test_visible_character_range_is_line_aligned() {
    let text = (0..50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let viewport = Viewport::new(200.0, 100.0, 20.0);

    assert_eq!(viewport.visible_line_range(), (10, 15));
    let range = viewport.visible_character_range(&text);
    assert_eq!(PositionVector::from_index(&text, range.start), PositionVector::new(10, 0));
    assert_eq!(PositionVector::from_index(&text, range.end), PositionVector::new(15, 0));
    assert_eq!(
        Viewport::default().visible_character_range(&text),
        Selection::caret(0)
    );
}
