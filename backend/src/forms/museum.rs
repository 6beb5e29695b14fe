//! Museum registration form.

use super::fields::{FieldCleaner, FieldSpec, Widget};
use super::{Form, FormData, FormErrors, UploadedFile};

pub const MUSEUM_NAME_MAX_LENGTH: usize = 255;
pub const MUSEUM_LOCATION_MAX_LENGTH: usize = 255;
pub const MUSEUM_WEBSITE_MAX_LENGTH: usize = 200;
pub const MUSEUM_EMAIL_MAX_LENGTH: usize = 254;

/// Cleaned museum details.
#[derive(Debug, Clone, PartialEq)]
pub struct MuseumRegistration {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact_email: String,
    pub website: Option<String>,
    pub logo: Option<UploadedFile>,
}

pub struct MuseumRegistrationForm;

impl Form for MuseumRegistrationForm {
    type Cleaned = MuseumRegistration;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Museum name", Widget::TextInput)
                .required()
                .max_length(MUSEUM_NAME_MAX_LENGTH)
                .placeholder("Museum Name"),
            FieldSpec::new("description", "Description", Widget::Textarea)
                .placeholder("Brief description of your museum")
                .rows(4),
            FieldSpec::new("location", "Location", Widget::TextInput)
                .max_length(MUSEUM_LOCATION_MAX_LENGTH)
                .placeholder("City, Country"),
            FieldSpec::new("contact_email", "Contact email", Widget::EmailInput)
                .required()
                .max_length(MUSEUM_EMAIL_MAX_LENGTH)
                .placeholder("contact@museum.com"),
            FieldSpec::new("website", "Website", Widget::UrlInput)
                .max_length(MUSEUM_WEBSITE_MAX_LENGTH)
                .placeholder("https://museum.com"),
            FieldSpec::new("logo", "Logo", Widget::FileInput).attr("accept", "image/*"),
        ]
    }

    fn clean(data: &FormData) -> Result<MuseumRegistration, FormErrors> {
        let mut cleaner = FieldCleaner::new(data);
        let name = cleaner.text("name", true, Some(MUSEUM_NAME_MAX_LENGTH));
        let description = cleaner.text("description", false, None);
        let location = cleaner.text("location", false, Some(MUSEUM_LOCATION_MAX_LENGTH));
        let contact_email = cleaner.email("contact_email", true, MUSEUM_EMAIL_MAX_LENGTH);
        let website = cleaner.url("website", false, MUSEUM_WEBSITE_MAX_LENGTH);
        let logo = cleaner.image("logo", false);
        cleaner.finish()?;

        Ok(MuseumRegistration {
            name: name.unwrap_or_default(),
            description,
            location,
            contact_email: contact_email.unwrap_or_default(),
            website,
            logo,
        })
    }
}
