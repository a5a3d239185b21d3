//! Prompt templates for sentiment analysis.
//!
//! Templates are registered per media id in a [`PromptCatalog`] resolved
//! once at startup. Resolution of an unregistered media id is an explicit
//! [`PipelineError::UnsupportedMedia`] instead of a silent fall-through.

use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// System instruction for Estonian-language media.
///
/// Asks for party/politician sentiment on a 0-10 scale plus title/body
/// objectivity scores, with per-score explanations grounded in the text.
pub const ESTONIAN_ANALYSIS_PROMPT: &str = r#"Tee põhjalik analüüs esitatud artiklist. Vastus peab olema esitatud eesti keeles.

1. Informatsiooni väljavõtmine:
- Loetle ainult artiklis mainitud registreeritud poliitilised parteid (originaalnimetustega). Ole tähelepanelik lühendite ja alternatiivsete nimede puhul.
- Loetle kõik mainitud poliitikud täisnimedega ning määratle nende praegune parteiline kuuluvus. Väldi dubleerimist.

2. Toonuse analüüs:
- Iga mainitud partei ja poliitiku puhul määra autori suhtumine skaalal 0 kuni 10 (0 - väga negatiivne, 5 - neutraalne, 10 - väga positiivne).
- Kui parteid ei mainita otseselt, aga mainitakse selle praeguseid liikmeid, peab suhtumine nende poliitikute suhtes mõjutama partei hinnangut.
- Iga hinnangu juurde esita lühike põhjendus, viidates konkreetsetele lausetele või väidetele artikli tekstist. Arvesta konteksti, irooniat ja sarkasmi.

3. Objektiivsuse hindamine:
- Hinda artikli pealkirja objektiivsust skaalal 0 kuni 10 (0 - väga kallutatud, 10 - täiesti objektiivne) koos põhjendusega.
- Hinda kogu artikli teksti objektiivsust samal skaalal koos põhjendusega."#;

/// System instruction for Russian-language media.
pub const RUSSIAN_ANALYSIS_PROMPT: &str = r#"Сделай подробный анализ представленной статьи. Ответ должен быть на русском языке.

1. Извлечение информации:
- Перечисли только упомянутые в статье зарегистрированные политические партии (с оригинальными названиями). Обращай внимание на сокращения и альтернативные названия.
- Перечисли всех упомянутых политиков с полными именами и определи их текущую партийную принадлежность. Избегай дублирования.

2. Анализ тональности:
- Для каждой упомянутой партии и каждого политика определи отношение автора по шкале от 0 до 10 (0 - крайне негативное, 5 - нейтральное, 10 - крайне позитивное).
- Если партия не упомянута напрямую, но упомянуты её действующие члены, отношение к этим политикам должно влиять на оценку партии.
- Для каждой оценки приведи краткое обоснование со ссылкой на конкретные предложения или утверждения из текста. Учитывай контекст, иронию и сарказм.

3. Оценка объективности:
- Оцени объективность заголовка статьи по шкале от 0 до 10 (0 - крайне предвзятый, 10 - полностью объективный) с обоснованием.
- Оцени объективность всего текста статьи по той же шкале с обоснованием."#;

/// A per-media prompt template: the system instruction plus the localized
/// labels used when rendering the user message.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system_instruction: String,
    pub headline_label: String,
    pub body_label: String,
}

impl PromptTemplate {
    pub fn new(
        system_instruction: impl Into<String>,
        headline_label: impl Into<String>,
        body_label: impl Into<String>,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            headline_label: headline_label.into(),
            body_label: body_label.into(),
        }
    }

    /// Template for Estonian-language media.
    pub fn estonian() -> Self {
        Self::new(ESTONIAN_ANALYSIS_PROMPT, "PEALKIRI", "ARTIKLI TEKST")
    }

    /// Template for Russian-language media.
    pub fn russian() -> Self {
        Self::new(RUSSIAN_ANALYSIS_PROMPT, "ЗАГОЛОВОК", "ТЕКСТ СТАТЬИ")
    }

    /// Render the user message for one article.
    pub fn build_request(&self, title: &str, body: &str) -> String {
        format!(
            "{}: {}\n\n{}:\n{}",
            self.headline_label, title, self.body_label, body
        )
    }
}

/// A ready-to-send provider request.
#[derive(Debug, Clone)]
pub struct SentimentPrompt {
    pub system_instruction: String,
    pub user_message: String,
}

/// Startup-resolved mapping of media id to prompt template.
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    templates: HashMap<i32, PromptTemplate>,
}

impl PromptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template for a media id.
    pub fn with_template(mut self, media_id: i32, template: PromptTemplate) -> Self {
        self.templates.insert(media_id, template);
        self
    }

    /// Look up the template for a media id.
    pub fn resolve(&self, media_id: i32) -> Result<&PromptTemplate> {
        self.templates
            .get(&media_id)
            .ok_or(PipelineError::UnsupportedMedia { media_id })
    }

    /// Build the full provider prompt for one article.
    pub fn build_prompt(&self, media_id: i32, title: &str, body: &str) -> Result<SentimentPrompt> {
        let template = self.resolve(media_id)?;
        Ok(SentimentPrompt {
            system_instruction: template.system_instruction.clone(),
            user_message: template.build_request(title, body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_uses_localized_labels() {
        let request = PromptTemplate::estonian().build_request("Pealkiri siin", "Sisu siin");
        assert!(request.starts_with("PEALKIRI: Pealkiri siin"));
        assert!(request.contains("ARTIKLI TEKST:\nSisu siin"));
    }

    #[test]
    fn test_resolve_unknown_media_fails() {
        let catalog = PromptCatalog::new().with_template(2, PromptTemplate::estonian());
        let err = catalog.build_prompt(9, "t", "b").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMedia { media_id: 9 }));
    }

    #[test]
    fn test_catalog_resolves_registered_media() {
        let catalog = PromptCatalog::new()
            .with_template(1, PromptTemplate::russian())
            .with_template(2, PromptTemplate::estonian());
        let prompt = catalog.build_prompt(1, "Заголовок", "Текст").unwrap();
        assert!(prompt.user_message.starts_with("ЗАГОЛОВОК"));
    }
}
