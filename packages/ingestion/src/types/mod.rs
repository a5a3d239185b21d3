//! Domain types for the ingestion pipeline.

pub mod article;
pub mod media;
pub mod sentiment;
pub mod source;

pub use article::{Article, ArticleRecord, NewArticle};
pub use media::{EditorTenure, Media};
pub use sentiment::{
    ArticleScores, EntityAnalysis, EntityKind, EntityScore, NewSentimentAnalysis,
    SentimentAnalysis,
};
pub use source::SourceConfig;
