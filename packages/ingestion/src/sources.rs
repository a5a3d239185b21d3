//! Seeded media sources.
//!
//! The two Postimees editions the pipeline currently tracks, with their
//! listing queries, excluded sections, and prompt templates. Media rows are
//! owned by this seed data; the pipeline itself never mutates them.

use crate::prompts::{PromptCatalog, PromptTemplate};
use crate::types::{EditorTenure, Media, SourceConfig};

/// Media id of the Russian-language Postimees edition.
pub const RUS_POSTIMEES_MEDIA_ID: i32 = 1;

/// Media id of the Estonian-language Postimees edition.
pub const POSTIMEES_MEDIA_ID: i32 = 2;

/// Sections whose articles are never ingested (sports, lifestyle,
/// regional supplements and the like).
pub const EXCLUDED_SECTIONS: &[&str] = &[
    "prognoz",
    "zdorovje",
    "limon",
    "sport",
    "elu24",
    "saartehaal",
    "naine",
    "kodu",
    "wallstreetjournal",
    "tv",
    "kultuur",
    "purjetamine",
    "kuuuurija",
    "ilmajaam",
    "tervis",
    "reis",
    "raamatud",
    "lemmik",
    "digiajakirjad",
    "reporter",
    "sakala",
    "60pluss",
    "meeldib",
    "maaelu",
    "teadus",
    "tehnika",
    "tartu",
    "maailm",
    "jarvateataja",
    "lounapostimees",
    "parnu",
    "haridus",
];

/// The seeded media rows with their chief-editor histories.
///
/// Editor tenures are maintained by hand as editorships change; the seed
/// starts every media with an empty history.
pub fn seed_media() -> Vec<(Media, Vec<EditorTenure>)> {
    vec![
        (
            Media::new(
                RUS_POSTIMEES_MEDIA_ID,
                "Rus.Postimees",
                "https://rus.postimees.ee",
                "rus-postimees",
                "ru",
            ),
            Vec::new(),
        ),
        (
            Media::new(
                POSTIMEES_MEDIA_ID,
                "Postimees",
                "https://www.postimees.ee",
                "postimees",
                "et",
            ),
            Vec::new(),
        ),
    ]
}

/// Crawl configurations for the seeded sources.
pub fn seed_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            RUS_POSTIMEES_MEDIA_ID,
            "https://rus.postimees.ee/search?sections=455&start=1970-01-01T01:00:00+03:00&fields=body,authors,headline,keywords",
        )
        .with_excluded_sections(EXCLUDED_SECTIONS.iter().copied()),
        SourceConfig::new(
            POSTIMEES_MEDIA_ID,
            "https://www.postimees.ee/search?sections=81,127,517&start=1970-01-01T01:00:00+03:00&fields=body,authors,headline,keywords",
        )
        .with_excluded_sections(EXCLUDED_SECTIONS.iter().copied()),
    ]
}

/// Prompt catalog for the seeded sources.
pub fn seed_prompt_catalog() -> PromptCatalog {
    PromptCatalog::new()
        .with_template(RUS_POSTIMEES_MEDIA_ID, PromptTemplate::russian())
        .with_template(POSTIMEES_MEDIA_ID, PromptTemplate::estonian())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_seeded_source_has_a_prompt_template() {
        let catalog = seed_prompt_catalog();
        for source in seed_sources() {
            assert!(catalog.resolve(source.media_id).is_ok());
        }
    }

    #[test]
    fn test_seeded_sources_exclude_sport() {
        for source in seed_sources() {
            assert!(source.is_excluded("sport"));
            assert!(!source.is_excluded("politics"));
        }
    }
}
