use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::NewStory;

lazy_static! {
    static ref COVER_IMAGE_URL: Regex =
        Regex::new(r"(?i)^https?://").expect("cover image pattern is valid");
}

const MIN_TITLE_LEN: usize = 5;
const MIN_CATEGORY_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 5;
const MIN_CONTENT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Category,
    Description,
    CoverImage,
    Content,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Category,
        FormField::Description,
        FormField::CoverImage,
        FormField::Content,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Category => "Categories",
            FormField::Description => "Summary",
            FormField::CoverImage => "Cover image",
            FormField::Content => "Story",
        }
    }
}

/// Per-field messages from the last validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<FormField, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }

    /// Drops the message for a field the user just edited.
    pub fn clear(&mut self, field: FormField) {
        self.0.remove(&field);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().map(FormField::label).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw text of the create form. `category` is the comma-separated tag list as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub cover_image: String,
    pub content: String,
}

impl StoryForm {
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Category => &mut self.category,
            FormField::Description => &mut self.description,
            FormField::CoverImage => &mut self.cover_image,
            FormField::Content => &mut self.content,
        }
    }

    /// Checks every rule and reports all failures at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = BTreeMap::new();

        if char_len(&self.title) < MIN_TITLE_LEN {
            errors.insert(FormField::Title, "Title must be at least 5 characters.");
        }
        // the raw joined text is measured, not each tag
        if char_len(&self.category) < MIN_CATEGORY_LEN {
            errors.insert(
                FormField::Category,
                "Category tags must be at least 3 characters.",
            );
        }
        if char_len(&self.description) < MIN_DESCRIPTION_LEN {
            errors.insert(
                FormField::Description,
                "Summary must be at least 5 characters.",
            );
        }
        if char_len(&self.content) < MIN_CONTENT_LEN {
            errors.insert(
                FormField::Content,
                "Story content must be at least 10 characters.",
            );
        }
        if !self.cover_image.is_empty() && !COVER_IMAGE_URL.is_match(&self.cover_image) {
            errors.insert(
                FormField::CoverImage,
                "Please enter a valid URL starting with http:// or https://",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Validates, then builds the record to submit, stamped with `now`.
    pub fn to_draft(&self, now: DateTime<Utc>) -> Result<NewStory, ValidationErrors> {
        self.validate()?;
        Ok(NewStory {
            title: self.title.clone(),
            category: normalize_categories(&self.category),
            description: self.description.clone(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            cover_image: self.cover_image.clone(),
            content: self.content.clone(),
        })
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// "Tech, life ,," becomes `["TECH", "LIFE"]`.
pub fn normalize_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_uppercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
