//! Artwork translation form.

use super::artwork::TITLE_MAX_LENGTH;
use super::fields::{FieldCleaner, FieldSpec, Widget};
use super::{Form, FormData, FormErrors, UploadedFile};
use crate::models::Language;

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationSubmission {
    pub language: Language,
    pub title: String,
    pub description: Option<String>,
    pub historical_context: Option<String>,
    pub audio_narration: Option<UploadedFile>,
}

pub struct ArtworkTranslationForm;

impl Form for ArtworkTranslationForm {
    type Cleaned = TranslationSubmission;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("language", "Language", Widget::Select)
                .required()
                .choices(Language::choices()),
            FieldSpec::new("title", "Title", Widget::TextInput)
                .required()
                .max_length(TITLE_MAX_LENGTH)
                .placeholder("Translated Title"),
            FieldSpec::new("description", "Description", Widget::Textarea).rows(6),
            FieldSpec::new("historical_context", "Historical context", Widget::Textarea).rows(4),
            FieldSpec::new("audio_narration", "Audio narration", Widget::FileInput)
                .attr("accept", "audio/*"),
        ]
    }

    fn clean(data: &FormData) -> Result<TranslationSubmission, FormErrors> {
        let mut cleaner = FieldCleaner::new(data);
        let language = cleaner.choice::<Language>("language", true);
        let title = cleaner.text("title", true, Some(TITLE_MAX_LENGTH));
        let description = cleaner.text("description", false, None);
        let historical_context = cleaner.text("historical_context", false, None);
        let audio_narration = cleaner.file("audio_narration", false);
        cleaner.finish()?;

        Ok(TranslationSubmission {
            language: language.unwrap_or(Language::English),
            title: title.unwrap_or_default(),
            description,
            historical_context,
            audio_narration,
        })
    }
}
