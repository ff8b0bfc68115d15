//! Prompt templates for the completion gateway

use crate::dream::{Dream, PairView};

const SYMBOLS_PROMPT: &str = "\
Pick out of this dream every inanimate image and object together with its \
properties and characteristics that can be used to analyse the dream the way \
Jung would. Do not give your own interpretations. Answer without any comments, \
only with a JSON list of these objects following this example:
[\"red sports car\",\"clean cold water\"]
The list must not include characters or actors. Text to analyse:";

const ACTORS_PROMPT: &str = "\
Pick out of this dream every character and actor together with their \
characteristics. The list must not include the dreamer. Do not give your own \
interpretations. Answer without any comments, only with a JSON list of these \
characters, for example: [\"beautiful girl\",\"silent stranger\"]
Text to analyse:";

/// Prompt asking for the symbolic objects of a narrative
pub fn symbols(narrative: &str) -> String {
    format!("{SYMBOLS_PROMPT} {narrative}")
}

/// Prompt asking for the characters of a narrative
pub fn actors(narrative: &str) -> String {
    format!("{ACTORS_PROMPT} {narrative}")
}

/// Prompt asking for the final interpretation of an annotated dream
pub fn interpretation(dream: &Dream) -> String {
    format!(
        "Interpret this dream the way Jung would, relying on my personal associations:\n\
         {associations}\n\
         And on the characters of my dream, which may represent my persona, shadow, \
         anima or animus:\n\
         {persons}\n\
         The personality traits these characters stand for show up in my life like this:\n\
         {contexts}\n\
         And this is what those traits mean to me:\n\
         {senses}\n\
         Take into account how these characters and objects interact with each other \
         in the context of the dream:\n\
         \"{narrative}\"",
        associations = dream.render_pairs(PairView::Associations),
        persons = dream.render_pairs(PairView::PersonCharacteristic),
        contexts = dream.render_pairs(PairView::CharacteristicContext),
        senses = dream.render_pairs(PairView::CharacteristicSense),
        narrative = dream.narrative(),
    )
}
