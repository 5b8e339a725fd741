#![deny(unsafe_code)]

pub mod classify;
pub mod error;
pub mod resolve;
pub mod score;
pub mod translate;
pub mod utils;

pub use classify::{
    CachedClassifier, Classifier, GuardedClassifier, NoMatchClassifier, RemoteClassifier,
    ValueShapeClassifier, build_classifier,
};
pub use error::{ClassifierError, TranslateError};
pub use resolve::{MappingResolver, Proposal, Resolution, missing_fields, resolve_conflicts};
pub use score::{LexicalMatch, LexicalScorer};
pub use translate::{
    GlossaryTranslator, GuardedTranslator, PassthroughTranslator, Translation, Translator,
};
pub use utils::{normalize_text, word_tokens};
