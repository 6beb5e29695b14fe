//! Field descriptors and the per-field cleaning rules shared by all forms.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::{FormData, FormErrors, UploadedFile};

/// CSS class applied to every visible input.
pub const INPUT_CLASS: &str = "form-input";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const MSG_INVALID_URL: &str = "Enter a valid URL.";
pub const MSG_INVALID_NUMBER: &str = "Enter a number.";
pub const MSG_INVALID_INTEGER: &str = "Enter a whole number.";
pub const MSG_INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const MSG_EMPTY_FILE: &str = "The submitted file is empty.";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

/// Input widget used to render a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    Textarea,
    EmailInput,
    UrlInput,
    PasswordInput,
    HiddenInput,
    NumberInput,
    Select,
    FileInput,
}

impl Widget {
    /// Whether a submitted value may be sent back when re-rendering.
    pub fn echoes_value(&self) -> bool {
        !matches!(self, Widget::PasswordInput | Widget::FileInput)
    }
}

/// One option of a select widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl From<(&str, &str)> for Choice {
    fn from((value, label): (&str, &str)) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Render-time description of a form field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub widget: Widget,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// HTML attributes (`class`, `placeholder`, `rows`, `list`, ...)
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl FieldSpec {
    /// A new optional field. Visible widgets get the shared input class.
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: Widget) -> Self {
        let mut attrs = BTreeMap::new();
        if widget != Widget::HiddenInput {
            attrs.insert("class".to_string(), INPUT_CLASS.to_string());
        }
        Self {
            name: name.into(),
            label: label.into(),
            widget,
            required: false,
            max_length: None,
            attrs,
            choices: Vec::new(),
            initial: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self.attrs
            .insert("maxlength".to_string(), max_length.to_string());
        self
    }

    pub fn placeholder(self, placeholder: impl Into<String>) -> Self {
        self.attr("placeholder", placeholder)
    }

    pub fn rows(self, rows: u32) -> Self {
        self.attr("rows", rows.to_string())
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn choices<I, C>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }
}

/// Collects cleaned values field by field while accumulating errors.
///
/// Every method records its own errors and returns `None` for a missing or
/// invalid value, so a form can clean all of its fields in one pass and report
/// every problem at once.
pub struct FieldCleaner<'a> {
    data: &'a FormData,
    errors: FormErrors,
}

impl<'a> FieldCleaner<'a> {
    pub fn new(data: &'a FormData) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    /// Stripped text. Empty input is `None`.
    pub fn text(&mut self, name: &str, required: bool, max_length: Option<usize>) -> Option<String> {
        let value = self.data.get(name).map(str::trim).unwrap_or("");
        if value.is_empty() {
            if required {
                self.errors.add(name, MSG_REQUIRED);
            }
            return None;
        }
        if let Some(max) = max_length {
            let len = value.chars().count();
            if len > max {
                self.errors.add(
                    name,
                    format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        max, len
                    ),
                );
                return None;
            }
        }
        Some(value.to_string())
    }

    /// Raw secret input. Whitespace is significant and kept.
    pub fn secret(&mut self, name: &str, required: bool) -> Option<String> {
        match self.data.get(name) {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            _ => {
                if required {
                    self.errors.add(name, MSG_REQUIRED);
                }
                None
            }
        }
    }

    pub fn email(&mut self, name: &str, required: bool, max_length: usize) -> Option<String> {
        let value = self.text(name, required, Some(max_length))?;
        if !EMAIL_PATTERN.is_match(&value) {
            self.errors.add(name, MSG_INVALID_EMAIL);
            return None;
        }
        Some(value)
    }

    /// An absolute http(s) URL. A missing scheme is assumed to be `http://`.
    pub fn url(&mut self, name: &str, required: bool, max_length: usize) -> Option<String> {
        let value = self.text(name, required, Some(max_length))?;
        let candidate = if value.contains("://") {
            value
        } else {
            format!("http://{}", value)
        };
        match url::Url::parse(&candidate) {
            Ok(parsed)
                if matches!(parsed.scheme(), "http" | "https")
                    && parsed.host_str().is_some_and(|h| h.contains('.') || h == "localhost") =>
            {
                Some(candidate)
            }
            _ => {
                self.errors.add(name, MSG_INVALID_URL);
                None
            }
        }
    }

    pub fn decimal(&mut self, name: &str, required: bool) -> Option<f64> {
        let value = self.text(name, required, None)?;
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(number),
            _ => {
                self.errors.add(name, MSG_INVALID_NUMBER);
                None
            }
        }
    }

    pub fn integer(&mut self, name: &str, required: bool) -> Option<i64> {
        let value = self.text(name, required, None)?;
        match value.parse::<i64>() {
            Ok(number) => Some(number),
            Err(_) => {
                self.errors.add(name, MSG_INVALID_INTEGER);
                None
            }
        }
    }

    /// Check an already cleaned number against inclusive bounds.
    pub fn bounded<T>(&mut self, name: &str, value: Option<T>, min: T, max: T) -> Option<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        let value = value?;
        if value < min {
            self.errors.add(
                name,
                format!("Ensure this value is greater than or equal to {}.", min),
            );
            return None;
        }
        if value > max {
            self.errors.add(
                name,
                format!("Ensure this value is less than or equal to {}.", max),
            );
            return None;
        }
        Some(value)
    }

    pub fn choice<T: FromStr>(&mut self, name: &str, required: bool) -> Option<T> {
        let value = self.text(name, required, None)?;
        match value.parse::<T>() {
            Ok(choice) => Some(choice),
            Err(_) => {
                self.errors.add(
                    name,
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        value
                    ),
                );
                None
            }
        }
    }

    /// An uploaded file. An empty upload with an empty name counts as absent.
    pub fn file(&mut self, name: &str, required: bool) -> Option<UploadedFile> {
        match self.data.file(name) {
            Some(file) if file.filename.is_empty() && file.bytes.is_empty() => {
                if required {
                    self.errors.add(name, MSG_REQUIRED);
                }
                None
            }
            Some(file) if file.bytes.is_empty() => {
                self.errors.add(name, MSG_EMPTY_FILE);
                None
            }
            Some(file) => Some(file.clone()),
            None => {
                if required {
                    self.errors.add(name, MSG_REQUIRED);
                }
                None
            }
        }
    }

    /// An uploaded file whose content is a recognisable image format.
    pub fn image(&mut self, name: &str, required: bool) -> Option<UploadedFile> {
        let file = self.file(name, required)?;
        if image::guess_format(&file.bytes).is_err() {
            self.errors.add(name, MSG_INVALID_IMAGE);
            return None;
        }
        Some(file)
    }

    /// Finish cleaning: the accumulated errors, if any.
    pub fn finish(self) -> Result<(), FormErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish cleaning, merging errors produced outside the cleaner.
    pub fn finish_with(mut self, extra: FormErrors) -> Result<(), FormErrors> {
        self.errors.extend(extra);
        self.finish()
    }
}
