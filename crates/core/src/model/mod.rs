mod ids;
mod paragraph;
mod progress;
mod settings;
mod vocabulary;

pub use ids::ItemId;
pub use paragraph::{GeneratedParagraph, ParagraphWord};
pub use progress::{ItemProgress, ProgressRecord};
pub use settings::{ParseSettingError, PracticeMode, PracticeSettings, Theme};
pub use vocabulary::{
    HskLevel, LevelSelection, Vocabulary, VocabularyCategory, VocabularyError, VocabularyItem,
};
