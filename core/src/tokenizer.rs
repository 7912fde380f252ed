use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // words, operator symbols, then any other run of non-space characters
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|[&|!]|[^\s\p{L}&|!]+").expect("valid regex");
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref PORTUGUESE_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","à","ao","aos","aquela","aquelas","aquele","aqueles","aquilo","as","às","até",
            "com","como","da","das","de","dela","delas","dele","deles","depois","do","dos",
            "e","é","ela","elas","ele","eles","em","entre","era","eram","éramos","essa","essas","esse","esses","esta","está",
            "estamos","estão","estas","estava","estavam","estávamos","este","esteja","estejam","estejamos","estes","esteve",
            "estive","estivemos","estiver","estivera","estiveram","estivéramos","estiverem","estivermos","estivesse",
            "estivessem","estivéssemos","estou","eu",
            "foi","fomos","for","fora","foram","fôramos","forem","formos","fosse","fossem","fôssemos","fui",
            "há","haja","hajam","hajamos","hão","havemos","hei","houve","houvemos","houver","houvera","houverá","houveram",
            "houvéramos","houverão","houverei","houverem","houveremos","houveria","houveriam","houveríamos","houvermos",
            "houvesse","houvessem","houvéssemos",
            "isso","isto","já","lhe","lhes","mais","mas","me","mesmo","meu","meus","minha","minhas","muito",
            "na","não","nas","nem","no","nos","nós","nossa","nossas","nosso","nossos","num","numa",
            "o","os","ou","para","pela","pelas","pelo","pelos","por","qual","quando","que","quem",
            "são","se","seja","sejam","sejamos","sem","ser","será","serão","serei","seremos","seria","seriam","seríamos",
            "seu","seus","só","somos","sou","sua","suas",
            "também","te","tem","tém","temos","tenha","tenham","tenhamos","tenho","terá","terão","terei","teremos","teria",
            "teriam","teríamos","teu","teus","teve","tinha","tinham","tínhamos","tive","tivemos","tiver","tivera","tiveram",
            "tivéramos","tiverem","tivermos","tivesse","tivessem","tivéssemos","tu","tua","tuas",
            "um","uma","você","vocês","vos",
            "daqui","enquanto","porque","pra","embora","pois","sobre"
        ];
        words.iter().copied().collect()
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    #[default]
    Portuguese,
}

impl Language {
    fn algorithm(self) -> Algorithm {
        match self {
            Language::English => Algorithm::English,
            Language::Portuguese => Algorithm::Portuguese,
        }
    }

    fn stopwords(self) -> &'static HashSet<&'static str> {
        match self {
            Language::English => &ENGLISH_STOPWORDS,
            Language::Portuguese => &PORTUGUESE_STOPWORDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub language: Language,
    /// Apply the language's stemmer to every term.
    pub stem: bool,
    /// Drop the language's function words from documents.
    pub stopwords: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { language: Language::default(), stem: true, stopwords: true }
    }
}

impl NormalizerConfig {
    /// Terms are taken as given: no stemming, no stopword list.
    pub fn verbatim() -> Self {
        Self { stem: false, stopwords: false, ..Self::default() }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| Error::Config { path: path.to_path_buf(), source })
    }
}

/// Linguistic front-end shared by the indexer and the query parser.
pub trait Normalizer: Send + Sync {
    /// Split raw text into tokens, operator symbols included.
    fn tokenize(&self, text: &str) -> Vec<String>;
    fn stem(&self, token: &str) -> String;
    fn is_stopword(&self, token: &str) -> bool;

    /// Indexable terms of a document body: tokenized, stopwords removed, stemmed.
    fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
            .into_iter()
            .filter(|t| !self.is_stopword(t))
            .map(|t| self.stem(&t))
            .collect()
    }
}

/// NFKC + lowercase tokenizer with a snowball stemmer.
pub struct TextNormalizer {
    config: NormalizerConfig,
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let stemmer = Stemmer::create(config.language.algorithm());
        Self { config, stemmer }
    }

    pub fn config(&self) -> &NormalizerConfig { &self.config }
}

impl Default for TextNormalizer {
    fn default() -> Self { Self::new(NormalizerConfig::default()) }
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer").field("config", &self.config).finish()
    }
}

impl Normalizer for TextNormalizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
    }

    fn stem(&self, token: &str) -> String {
        if self.config.stem {
            self.stemmer.stem(token).into_owned()
        } else {
            token.to_string()
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        if !token.chars().any(char::is_alphabetic) {
            return true;
        }
        self.config.stopwords && self.config.language.stopwords().contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let n = TextNormalizer::new(NormalizerConfig { language: Language::English, ..NormalizerConfig::default() });
        let t = n.terms("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn operators_are_separate_tokens() {
        let n = TextNormalizer::new(NormalizerConfig::verbatim());
        assert_eq!(n.tokenize("casa&!Bola | rua"), vec!["casa", "&", "!", "bola", "|", "rua"]);
    }

    #[test]
    fn punctuation_is_never_indexed() {
        let n = TextNormalizer::new(NormalizerConfig::verbatim());
        assert!(n.is_stopword("..."));
        assert!(n.is_stopword("&"));
        assert!(n.is_stopword("42"));
        assert!(!n.is_stopword("de"));
    }

    #[test]
    fn portuguese_stopwords_and_extras() {
        let n = TextNormalizer::default();
        assert!(n.is_stopword("de"));
        assert!(n.is_stopword("não"));
        assert!(n.is_stopword("pois"));
        assert!(!n.is_stopword("casa"));
    }

    #[test]
    fn verbatim_does_not_stem() {
        let n = TextNormalizer::new(NormalizerConfig::verbatim());
        assert_eq!(n.stem("running"), "running");
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: NormalizerConfig = serde_json::from_str(r#"{"language":"english"}"#).unwrap();
        assert_eq!(cfg.language, Language::English);
        assert!(cfg.stem);
        assert!(cfg.stopwords);
    }
}
