//! Declarative forms bound to submitted form data.
//!
//! A form is a type implementing [`Form`]: it describes its fields with
//! [`FieldSpec`]s (so a client can render inputs, placeholders and CSS
//! classes) and cleans a [`FormData`] into a typed value or a set of
//! [`FormErrors`].
//!
//! ```text
//!   FormData ──clean()──► Ok(Cleaned)  ──► services
//!                     └─► Err(FormErrors) ──► BoundForm (re-render)
//! ```

pub mod artwork;
pub mod fields;
pub mod museum;
pub mod staff;
pub mod translation;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub use artwork::{ArtworkUpload, ArtworkUploadForm};
pub use fields::{Choice, FieldCleaner, FieldSpec, Widget};
pub use museum::{MuseumRegistration, MuseumRegistrationForm};
pub use staff::{LoginCredentials, StaffLoginForm, StaffRegistration, StaffRegistrationForm};
pub use translation::{ArtworkTranslationForm, TranslationSubmission};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A file received in a multipart submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Client-supplied file name
    pub filename: String,
    /// Client-supplied content type, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Submitted text fields and files of one request.
///
/// When a key is submitted more than once the last value wins.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs such as a decoded urlencoded body.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut data = Self::new();
        for (k, v) in pairs {
            data.insert(k, v);
        }
        data
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn insert_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.insert(name.into(), file);
    }

    /// Builder-style [`FormData::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style [`FormData::insert_file`].
    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.insert_file(name, file);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Merge another set of errors into this one.
    pub fn extend(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

/// A form's fields together with submitted values and errors, ready to be
/// rendered by a client.
#[derive(Debug, Clone, Serialize)]
pub struct BoundForm {
    pub fields: Vec<FieldSpec>,
    /// Echoed values; password and file inputs are never echoed
    pub values: BTreeMap<String, String>,
    pub errors: FormErrors,
}

impl BoundForm {
    /// A blank form showing only initial values.
    pub fn unbound(fields: Vec<FieldSpec>) -> Self {
        let values = fields
            .iter()
            .filter_map(|f| f.initial.clone().map(|v| (f.name.clone(), v)))
            .collect();
        Self {
            fields,
            values,
            errors: FormErrors::new(),
        }
    }

    /// A submitted form with its errors.
    pub fn bound(fields: Vec<FieldSpec>, data: &FormData, errors: FormErrors) -> Self {
        let values = fields
            .iter()
            .filter(|f| f.widget.echoes_value())
            .filter_map(|f| data.get(&f.name).map(|v| (f.name.clone(), v.to_string())))
            .collect();
        Self {
            fields,
            values,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A declarative form.
pub trait Form {
    /// The typed result of a successful clean.
    type Cleaned;

    /// Field descriptors in display order.
    fn fields() -> Vec<FieldSpec>;

    /// Validate and convert submitted data.
    fn clean(data: &FormData) -> Result<Self::Cleaned, FormErrors>;

    fn unbound() -> BoundForm {
        BoundForm::unbound(Self::fields())
    }

    fn bound(data: &FormData, errors: FormErrors) -> BoundForm {
        BoundForm::bound(Self::fields(), data, errors)
    }
}
