use super::is_similar;
use crate::card::{CardCandidate, ExistingCard};
use crate::error::Result;

/// `true` when `candidate` is above `threshold` against any embedded existing card.
pub fn covered_by_existing(
    candidate: &CardCandidate,
    existing: &[ExistingCard],
    threshold: f32,
) -> Result<bool> {
    for card in existing {
        if is_similar(candidate.embedding.as_ref(), card.embedding.as_ref(), threshold)? {
            tracing::debug!(
                candidate = %candidate.front,
                existing_id = %card.id,
                "candidate already covered by existing card"
            );
            return Ok(true);
        }
    }
    Ok(false)
}

/// Drop every candidate covered by an existing card. Returns the survivors
/// (in order) and the number dropped.
///
/// Existing cards without an embedding cannot be compared and are ignored.
pub fn filter_against_existing(
    candidates: Vec<CardCandidate>,
    existing: &[ExistingCard],
    threshold: f32,
) -> Result<(Vec<CardCandidate>, usize)> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut dropped = 0;

    for candidate in candidates {
        if covered_by_existing(&candidate, existing, threshold)? {
            dropped += 1;
        } else {
            kept.push(candidate);
        }
    }

    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::testing::{at_angle, candidate};

    fn existing(id: &str, embedding: Option<Vec<f32>>) -> ExistingCard {
        ExistingCard {
            id: id.into(),
            front: id.into(),
            embedding,
        }
    }

    #[test]
    fn drops_candidates_close_to_existing() {
        // cos(10°) ≈ 0.98, cos(80°) ≈ 0.17
        let candidates = vec![
            candidate("near", at_angle(10.0)),
            candidate("far", at_angle(80.0)),
        ];
        let deck = vec![existing("e1", Some(at_angle(0.0)))];

        let (kept, dropped) = filter_against_existing(candidates, &deck, 0.75).unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].front, "far");
    }

    #[test]
    fn unembedded_existing_cards_are_ignored() {
        let candidates = vec![candidate("q", at_angle(0.0))];
        let deck = vec![existing("e1", None)];
        let (kept, dropped) = filter_against_existing(candidates, &deck, 0.75).unwrap();
        assert_eq!((kept.len(), dropped), (1, 0));
    }

    #[test]
    fn empty_deck_keeps_everything() {
        let candidates = vec![candidate("a", at_angle(0.0)), candidate("b", at_angle(1.0))];
        let (kept, dropped) = filter_against_existing(candidates, &[], 0.75).unwrap();
        assert_eq!((kept.len(), dropped), (2, 0));
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let candidates = vec![candidate("a", vec![1.0, 0.0, 0.0])];
        let deck = vec![existing("e1", Some(vec![1.0, 0.0]))];
        assert!(filter_against_existing(candidates, &deck, 0.75).is_err());
    }
}
