//! 词表
//!
//! 各语言的功能词（停用词）与高频实词。功能词既用于剔除不值得翻译的词，
//! 也是本地语言检测的打分依据；高频实词决定 common / uncommon 选词策略。

/// 支持本地检测的语言
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "it", "pt"];

const EN_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "was", "one", "our", "has", "his",
    "its", "now", "see", "who", "with", "have", "this", "will", "your", "from", "they", "been",
    "some", "very", "were", "is", "it", "be", "to", "of", "as", "at", "by", "in", "on", "we",
    "that", "there", "their", "what", "which", "when", "would", "could", "should", "than",
    "then", "them", "these", "those", "into", "over", "also", "can", "had", "her", "him",
    "she", "any", "about", "just", "only", "more", "most", "such", "each", "other", "because",
    "while", "where", "how", "why", "here", "does", "did", "done", "being", "a", "an", "or",
    "if", "so", "no", "do", "he", "me", "my", "us", "up",
];

const ES_STOP_WORDS: &[&str] = &[
    "el", "la", "los", "las", "de", "del", "que", "y", "en", "un", "una", "por", "con", "para",
    "es", "se", "no", "lo", "al", "como", "más", "pero", "sus", "le", "ya", "o", "este", "esta",
    "entre", "cuando", "muy", "sin", "sobre", "también", "me", "hasta", "hay", "donde", "quien",
    "desde", "todo", "nos", "durante", "uno", "ni", "contra", "ese", "eso", "mí", "qué", "otro",
    "él", "ella", "son", "fue", "era",
];

const FR_STOP_WORDS: &[&str] = &[
    "le", "la", "les", "de", "des", "du", "et", "un", "une", "est", "en", "que", "qui", "dans",
    "pour", "pas", "sur", "au", "aux", "avec", "ce", "ces", "il", "elle", "ils", "elles", "nous",
    "vous", "par", "plus", "mais", "ou", "son", "sa", "ses", "leur", "leurs", "été", "être",
    "sont", "cette", "comme", "tout", "aussi", "très", "sans", "je", "ne", "se", "lui", "était",
];

const DE_STOP_WORDS: &[&str] = &[
    "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "einen", "dem", "den", "des",
    "mit", "sich", "auf", "für", "von", "zu", "im", "auch", "es", "an", "als", "wie", "bei",
    "aus", "nach", "war", "wird", "sind", "oder", "aber", "noch", "nur", "wenn", "dass", "ich",
    "sie", "er", "wir", "ihr", "sein", "hat", "haben", "kann", "über", "vor", "zum", "zur",
];

const IT_STOP_WORDS: &[&str] = &[
    "il", "lo", "la", "gli", "le", "di", "del", "della", "che", "e", "un", "una", "per", "non",
    "con", "sono", "nel", "nella", "da", "dei", "delle", "alla", "anche", "come", "più", "ma",
    "si", "questo", "questa", "ha", "hanno", "era", "essere", "tutto", "molto", "sul", "sulla",
    "ci", "io", "lui", "lei", "noi", "voi", "loro", "perché", "quando", "dove",
];

const PT_STOP_WORDS: &[&str] = &[
    "o", "a", "os", "as", "de", "do", "da", "dos", "das", "que", "e", "um", "uma", "para",
    "com", "não", "em", "no", "na", "nos", "nas", "por", "mais", "se", "como", "mas", "ao",
    "ele", "ela", "eles", "elas", "seu", "sua", "isso", "este", "esta", "muito", "também",
    "foi", "são", "está", "quando", "onde", "pelo", "pela", "já", "eu", "você",
];

/// 英语高频实词，按频率从高到低排列
const EN_COMMON_WORDS: &[&str] = &[
    "time", "people", "year", "way", "day", "man", "thing", "woman", "life", "child", "world",
    "school", "state", "family", "student", "group", "country", "problem", "hand", "part",
    "place", "case", "week", "company", "system", "program", "question", "work", "government",
    "number", "night", "point", "home", "water", "room", "mother", "area", "money", "story",
    "fact", "month", "lot", "right", "study", "book", "eye", "job", "word", "business",
    "issue", "side", "kind", "head", "house", "service", "friend", "father", "power", "hour",
    "game", "line", "end", "member", "law", "car", "city", "community", "name", "president",
    "team", "minute", "idea", "kid", "body", "information", "back", "parent", "face", "others",
    "level", "office", "door", "health", "person", "art", "war", "history", "party", "result",
    "change", "morning", "reason", "research", "girl", "guy", "moment", "air", "teacher",
    "force", "education", "good", "new", "first", "last", "long", "great", "little", "own",
    "old", "big", "high", "different", "small", "large", "next", "early", "young", "important",
    "few", "public", "bad", "same", "able", "make", "know", "take", "come", "think", "look",
    "want", "give", "use", "find", "tell", "ask", "seem", "feel", "try", "leave", "call",
    "keep", "begin", "help", "talk", "turn", "start", "show", "hear", "play", "run", "move",
    "like", "live", "believe", "hold", "bring", "happen", "write", "provide", "sit", "stand",
    "lose", "pay", "meet", "include", "continue", "learn", "read", "open", "walk", "win",
    "today", "always", "never", "often", "again", "still", "food", "love", "quick",
    "brown", "dog", "cat", "green", "blue", "black", "white", "red", "light", "dark",
];

const ES_COMMON_WORDS: &[&str] = &[
    "tiempo", "persona", "año", "día", "casa", "mundo", "vida", "trabajo", "gobierno", "país",
    "ciudad", "agua", "libro", "amigo", "familia", "noche", "hombre", "mujer", "niño", "grande",
    "nuevo", "bueno", "primero", "hacer", "tener", "decir", "poder", "querer", "saber", "ver",
];

const FR_COMMON_WORDS: &[&str] = &[
    "temps", "personne", "année", "jour", "maison", "monde", "vie", "travail", "pays", "ville",
    "eau", "livre", "ami", "famille", "nuit", "homme", "femme", "enfant", "grand", "nouveau",
    "bon", "premier", "faire", "avoir", "dire", "pouvoir", "vouloir", "savoir", "voir",
];

const DE_COMMON_WORDS: &[&str] = &[
    "zeit", "mensch", "jahr", "tag", "haus", "welt", "leben", "arbeit", "land", "stadt",
    "wasser", "buch", "freund", "familie", "nacht", "mann", "frau", "kind", "groß", "neu",
    "gut", "erste", "machen", "sagen", "können", "wollen", "wissen", "sehen", "gehen",
];

const IT_COMMON_WORDS: &[&str] = &[
    "tempo", "persona", "anno", "giorno", "casa", "mondo", "vita", "lavoro", "paese", "città",
    "acqua", "libro", "amico", "famiglia", "notte", "uomo", "donna", "bambino", "grande",
    "nuovo", "buono", "primo", "fare", "avere", "dire", "potere", "volere", "sapere", "vedere",
];

const PT_COMMON_WORDS: &[&str] = &[
    "tempo", "pessoa", "ano", "dia", "casa", "mundo", "vida", "trabalho", "país", "cidade",
    "água", "livro", "amigo", "família", "noite", "homem", "mulher", "criança", "grande",
    "novo", "bom", "primeiro", "fazer", "ter", "dizer", "poder", "querer", "saber", "ver",
];

/// 某语言的功能词表；未知语言返回空表
pub fn stop_words(lang: &str) -> &'static [&'static str] {
    match lang {
        "en" => EN_STOP_WORDS,
        "es" => ES_STOP_WORDS,
        "fr" => FR_STOP_WORDS,
        "de" => DE_STOP_WORDS,
        "it" => IT_STOP_WORDS,
        "pt" => PT_STOP_WORDS,
        _ => &[],
    }
}

/// 某语言的高频实词表（频率降序）
pub fn common_words(lang: &str) -> &'static [&'static str] {
    match lang {
        "en" => EN_COMMON_WORDS,
        "es" => ES_COMMON_WORDS,
        "fr" => FR_COMMON_WORDS,
        "de" => DE_COMMON_WORDS,
        "it" => IT_COMMON_WORDS,
        "pt" => PT_COMMON_WORDS,
        _ => &[],
    }
}

pub fn is_stop_word(lang: &str, word: &str) -> bool {
    stop_words(lang).contains(&word)
}

/// 高频实词的频率排名（0 为最高）
pub fn common_rank(lang: &str, word: &str) -> Option<usize> {
    common_words(lang).iter().position(|w| *w == word)
}
