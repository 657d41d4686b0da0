//! Coarse part-of-speech guessing for English.
//!
//! Closed word classes come from fixed lists; open classes are guessed from
//! a short list of frequent verbs and from derivational suffixes. Unknown
//! words default to nouns. [`tag_sentence`] then fixes the two most common
//! misses using neighbouring words: bare verbs after modals and third person
//! verbs that look like plural nouns.

/// Coarse word class used by the density metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    Determiner,
    Pronoun,
    RelativePronoun,
    Preposition,
    CoordinatingConjunction,
    SubordinatingConjunction,
    Auxiliary,
    Negation,
    Verb,
    Adjective,
    Adverb,
    Number,
    Noun,
}

impl WordClass {
    /// Whether words of this class express a proposition of their own.
    pub fn is_proposition(self) -> bool {
        matches!(
            self,
            WordClass::Verb
                | WordClass::Adjective
                | WordClass::Adverb
                | WordClass::Preposition
                | WordClass::CoordinatingConjunction
                | WordClass::SubordinatingConjunction
                | WordClass::Negation
                | WordClass::Number
        )
    }
}

const ARTICLES: &[&str] = &["a", "an", "the"];

const MODALS: &[&str] = &["will", "would", "shall", "should", "can", "could", "may", "might", "must", "do", "does", "did"];

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no", "all", "both", "either",
    "neither", "another", "such", "my", "your", "his", "her", "its", "our", "their",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself", "yourself", "himself",
    "herself", "itself", "ourselves", "themselves", "one", "someone", "something", "anyone", "anything", "everyone",
    "everything", "nobody", "nothing", "mine", "yours", "hers", "ours", "theirs",
];

const RELATIVE_PRONOUNS: &[&str] = &["which", "who", "whom", "whose", "what", "where", "when", "why", "how"];

const PREPOSITIONS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "among", "around", "at", "before", "behind", "below",
    "beneath", "beside", "between", "beyond", "by", "despite", "down", "during", "except", "for", "from", "in",
    "inside", "into", "like", "near", "of", "off", "on", "onto", "out", "outside", "over", "past", "per", "through",
    "throughout", "to", "toward", "towards", "under", "underneath", "until", "up", "upon", "via", "with", "within",
    "without",
];

const COORDINATING: &[&str] = &["and", "or", "but", "nor", "yet", "so"];

const SUBORDINATING: &[&str] = &[
    "although", "because", "since", "unless", "while", "whereas", "whether", "if", "though", "once", "than",
    "whenever", "wherever",
];

const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did", "have", "has", "had", "will",
    "would", "shall", "should", "can", "could", "may", "might", "must",
];

const NEGATIONS: &[&str] = &["not", "never", "n't", "cannot"];

const ADVERBS: &[&str] = &[
    "also", "very", "often", "always", "again", "still", "already", "soon", "here", "there", "now", "then", "too",
    "just", "only", "even", "almost", "quite", "rather", "perhaps", "instead", "however", "therefore", "thus",
    "together", "well",
];

/// Frequent verbs without a telltale suffix.
const VERBS: &[&str] = &[
    "add", "allow", "build", "call", "change", "check", "come", "compile", "contain", "create", "define", "depend",
    "describe", "find", "get", "give", "go", "hold", "include", "keep", "know", "let", "make", "mean", "move",
    "need", "open", "provide", "put", "read", "reduce", "remove", "require", "return", "run", "say", "see", "seem",
    "send", "set", "show", "store", "take", "tell", "think", "try", "turn", "use", "want", "work", "write",
    "allows", "builds", "calls", "changes", "checks", "comes", "compiles", "contains", "creates", "defines",
    "depends", "describes", "finds", "gets", "gives", "goes", "holds", "includes", "keeps", "knows", "lets",
    "makes", "means", "moves", "needs", "opens", "provides", "puts", "reads", "reduces", "removes", "requires",
    "returns", "runs", "says", "sees", "seems", "sends", "sets", "shows", "stores", "takes", "tells", "thinks",
    "tries", "turns", "uses", "wants", "works", "writes", "made", "found", "gave", "got", "kept", "knew", "left",
    "meant", "ran", "said", "saw", "sent", "shown", "taken", "told", "thought", "went", "wrote", "written", "built",
    "held", "became", "become", "becomes",
];

const ADJECTIVES: &[&str] = &[
    "good", "new", "old", "big", "small", "large", "long", "short", "high", "low", "fast", "slow", "easy", "hard",
    "simple", "same", "different", "other", "few", "many", "much", "more", "most", "less", "least", "first", "last",
    "next", "main", "safe", "clear", "full", "free", "true", "false", "real", "whole", "certain", "common", "strong",
    "weak", "best", "better", "worse", "worst",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "able", "ible", "ous", "ful", "ive", "less", "ical", "ish", "ary", "ant", "ent", "ic", "al",
];

const NOUN_SUFFIXES: &[&str] = &["tion", "sion", "ment", "ness", "ity", "ism", "ance", "ence", "ship", "hood"];

const VERB_SUFFIXES: &[&str] = &["ize", "ise", "ify", "ate", "izes", "ises", "ifies", "ates"];

/// Guesses the class of a lower-cased word.
pub fn classify(word: &str) -> WordClass {
    if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return WordClass::Number;
    }
    if word.ends_with("n't") || NEGATIONS.contains(&word) {
        return WordClass::Negation;
    }

    let lists: [(&[&str], WordClass); 10] = [
        (DETERMINERS, WordClass::Determiner),
        (PRONOUNS, WordClass::Pronoun),
        (RELATIVE_PRONOUNS, WordClass::RelativePronoun),
        (PREPOSITIONS, WordClass::Preposition),
        (COORDINATING, WordClass::CoordinatingConjunction),
        (SUBORDINATING, WordClass::SubordinatingConjunction),
        (AUXILIARIES, WordClass::Auxiliary),
        (ADVERBS, WordClass::Adverb),
        (VERBS, WordClass::Verb),
        (ADJECTIVES, WordClass::Adjective),
    ];
    if let Some((_, class)) = lists.iter().find(|(list, _)| list.contains(&word)) {
        return *class;
    }

    by_suffix(word)
}

/// Determiners other than articles count as propositions, as do all
/// proposition-bearing classes.
pub fn counts_as_proposition(word: &str, class: WordClass) -> bool {
    class.is_proposition() || (class == WordClass::Determiner && !ARTICLES.contains(&word))
}

/// Classifies each word of a sentence, then re-tags nouns by context.
pub fn tag_sentence(words: &[String]) -> Vec<(&str, WordClass)> {
    let mut tagged: Vec<(&str, WordClass)> = words.iter().map(|w| (w.as_str(), classify(w))).collect();
    let mut clause_has_verb = false;

    for i in 0..tagged.len() {
        let (word, class) = tagged[i];
        let previous = i.checked_sub(1).map(|p| tagged[p]);
        let next = tagged.get(i + 1).map(|&(_, c)| c);

        if class == WordClass::Noun {
            let after_modal = previous.is_some_and(|(w, c)| {
                (c == WordClass::Auxiliary && MODALS.contains(&w)) || c == WordClass::Negation
            });
            let finite = looks_third_person(word)
                && previous.is_some_and(|(_, c)| match c {
                    WordClass::Pronoun => true,
                    WordClass::Noun => !clause_has_verb,
                    WordClass::CoordinatingConjunction => clause_has_verb,
                    _ => false,
                })
                && next.is_some_and(|c| {
                    matches!(
                        c,
                        WordClass::Determiner
                            | WordClass::Adjective
                            | WordClass::Noun
                            | WordClass::Pronoun
                            | WordClass::Preposition
                            | WordClass::Number
                    )
                });
            if after_modal || finite {
                tagged[i].1 = WordClass::Verb;
            }
        }

        match tagged[i].1 {
            WordClass::Verb | WordClass::Auxiliary => clause_has_verb = true,
            WordClass::SubordinatingConjunction | WordClass::RelativePronoun => clause_has_verb = false,
            _ => {}
        }
    }

    tagged
}

fn looks_third_person(word: &str) -> bool {
    word.len() > 3 && word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s))
}

fn by_suffix(word: &str) -> WordClass {
    let len = word.chars().count();
    if len <= 3 {
        return WordClass::Noun;
    }

    if NOUN_SUFFIXES.iter().any(|s| word.ends_with(s)) || word.ends_with("ics") {
        return WordClass::Noun;
    }
    if word.ends_with("ly") && len > 4 {
        return WordClass::Adverb;
    }
    if (word.ends_with("ing") || word.ends_with("ed")) && len > 4 {
        return WordClass::Verb;
    }
    if VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) && len > 5 {
        return WordClass::Verb;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) && len > 4 {
        return WordClass::Adjective;
    }

    WordClass::Noun
}
