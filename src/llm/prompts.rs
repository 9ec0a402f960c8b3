use crate::card::CardCandidate;

pub const CARD_EXTRACTION_SYSTEM: &str = r#"You turn study notes into question/answer flashcards for a spaced-repetition system.

**Format:** Output ONLY a JSON object with this structure:
{"cards": [{"front": "question", "back": "answer"}]}

### What deserves a card
- Definitions and nomenclature.
- Core principles or laws.
- Cause-effect pairs ("Increasing temperature raises reaction rate because...").
- Key data points that genuinely need memorising (dates, constants, cut-off values).
- Surprising or counter-intuitive facts.

Skip anecdotes, side stories, and anything the learner can re-derive on demand.
If a passage cannot be paraphrased in plain language, do not make a card from it.

### Minimum information
Each card asks about exactly one atomic fact or relationship. A long answer
(several sentences, an enumeration) means the card should be split.

### Wording
- Clear: include enough context that the question stands alone months later
  ("According to Kepler's Third Law...").
- Unambiguous: no hidden plurals, no double-barrelled "and/or" questions.
- Concise: the answer is one word, phrase, number, or sentence.

Mirror cards (forward and reverse) only when the reverse cue is genuinely useful.

If the text contains nothing card-worthy, output {"cards": []}."#;

pub const DEDUPLICATION_SYSTEM: &str = r#"You reduce duplicate or overlapping flashcards.

You are given a list of cards that are semantically similar. Return the smallest
set of cards that still covers every distinct fact in the input: drop exact or
near duplicates, merge cards that ask the same thing in different words, and keep
cards separate when they test genuinely different facts.

Every card you return must still follow these rules:
- One atomic fact or relationship per card.
- The question stands alone without the other cards for context.
- The answer is one word, phrase, number, or sentence.

**Format:** Output ONLY a JSON object with this structure:
{"cards": [{"front": "question", "back": "answer"}]}"#;

/// User message for the merge request; only `front`/`back` are sent.
pub fn deduplication_prompt(cluster: &[CardCandidate]) -> String {
    let cards: Vec<serde_json::Value> = cluster
        .iter()
        .map(|c| serde_json::json!({ "front": c.front, "back": c.back }))
        .collect();
    format!(
        "Here are the similar cards: {}",
        serde_json::Value::Array(cards)
    )
}
