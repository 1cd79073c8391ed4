use std::io::Write;
use std::iter::repeat;
use std::thread;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::errors::{Error, ErrorKind, Result};
use crate::image::DataUri;
use crate::lineformat::LineFormat;
use crate::utils::format_field;

/// label used for prompts without a category
pub static UNCATEGORIZED: &'static str = "Uncategorized";
/// main category that switches the draft over to its custom category
pub static OTHER_CATEGORY: &'static str = "Other";
pub static PREDEFINED_CATEGORIES: [&'static str; 3] = ["Design", "Social Media Strategy", "Content Creation"];
/// artificial pause before a saved prompt is committed
pub const SAVE_DELAY: Duration = Duration::from_millis(300);

/// A single saved prompt within a profile
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", from = "StoredPrompt")]
pub struct Prompt {
    pub id: i64,
    pub full_prompt: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

/// Everything a prompt record has ever carried on disk. Only used while
/// decoding; legacy fields are folded into `Prompt` and then dropped.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredPrompt {
    id: i64,
    full_prompt: Option<String>,
    category: Option<String>,
    main_category: Option<String>,
    sub_category: Option<String>,
    reference_image: Option<String>,
    persona: Option<String>,
    task: Option<String>,
    format: Option<String>,
    context: Option<String>,
    examples: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl From<StoredPrompt> for Prompt {
    fn from(stored: StoredPrompt) -> Prompt {
        let full_prompt = match non_empty(&stored.full_prompt) {
            Some(_) => stored.full_prompt.clone().unwrap_or_default(),
            None => {
                let legacy = [("Persona", &stored.persona),
                              ("Task", &stored.task),
                              ("Context", &stored.context),
                              ("Format", &stored.format),
                              ("Examples", &stored.examples)];
                legacy.iter()
                      .filter_map(|(label, value)| non_empty(value).map(|v| format!("{}: {}", label, v)))
                      .collect::<Vec<String>>()
                      .join("\n\n")
            }
        };
        let category = stored.category.unwrap_or_default();
        let main_category = match stored.main_category {
            Some(m) => Some(m),
            None if !category.is_empty() => Some(category.clone()),
            None => None,
        };
        Prompt {
            id: stored.id,
            full_prompt: full_prompt,
            category: category,
            main_category: main_category,
            sub_category: stored.sub_category,
            reference_image: stored.reference_image,
        }
    }
}

impl Prompt {
    /// the category this prompt is grouped and exported under
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }

    /// first line of the prompt text, for one-line listings
    pub fn preview(&self) -> &str {
        self.full_prompt.lines().next().unwrap_or("")
    }

    pub fn image(&self) -> Option<Result<DataUri>> {
        self.reference_image.as_deref().map(DataUri::parse)
    }

    pub fn write<T: Write>(&self, output: &mut T, line_format: &LineFormat) -> Result<()> {
        let column_seperator: String = repeat(' ')
                                           .take(line_format.colsep)
                                           .collect();
        write!(output, "{}", format_field(&self.id.to_string(), line_format.id_width, false))?;
        write!(output, "{}", column_seperator)?;
        if line_format.sub_width != 0 {
            write!(output,
                   "{}",
                   format_field(self.sub_category.as_deref().unwrap_or(""),
                                line_format.sub_width,
                                true))?;
            write!(output, "{}", column_seperator)?;
        }
        let multiline = self.full_prompt.lines().count() > 1;
        if (multiline || self.reference_image.is_some()) && line_format.text_width > 4 {
            let marker = if self.reference_image.is_some() { " [i]" } else { " (+)" };
            write!(output,
                   "{}",
                   format_field(self.preview(), line_format.text_width - 4, true))?;
            writeln!(output, "{}", marker)?;
        } else {
            writeln!(output, "{}", format_field(self.preview(), line_format.text_width, true).trim_end())?;
        }
        Ok(())
    }
}

/// The fields of the "new prompt" form.
#[derive(Clone, Debug, Default)]
pub struct PromptDraft {
    pub main_category: String,
    pub custom_category: String,
    pub sub_category: String,
    pub instructions: String,
    pub reference_image: Option<String>,
}

impl PromptDraft {
    /// A draft for a category typed on the command line. Names outside the
    /// fixed list are filed under `Other` with the name as custom category.
    pub fn for_category(category: String, custom: String) -> PromptDraft {
        let (main_category, custom_category) =
            if category == OTHER_CATEGORY || PREDEFINED_CATEGORIES.contains(&category.as_str()) {
                (category, custom)
            } else {
                (OTHER_CATEGORY.to_string(), category)
            };
        PromptDraft {
            main_category: main_category,
            custom_category: custom_category,
            ..Default::default()
        }
    }

    /// category the prompt will be saved under, if any
    pub fn final_category(&self) -> String {
        if self.main_category == OTHER_CATEGORY {
            self.custom_category.trim().to_string()
        } else {
            self.main_category.trim().to_string()
        }
    }

    /// resolve the draft into (category, prompt text)
    pub fn resolve(&self) -> Result<(String, String)> {
        let category = self.final_category();
        let text = self.instructions.trim().to_string();
        if category.is_empty() {
            return Err(Error::new(ErrorKind::EmptySubmission, "a category is required to save a prompt"));
        }
        if text.is_empty() {
            return Err(Error::new(ErrorKind::EmptySubmission, "prompt instructions cannot be empty"));
        }
        Ok((category, text))
    }

    /// turn the draft into a prompt with the given id, after waiting `delay`
    pub fn into_prompt(self, id: i64, delay: Duration) -> Result<Prompt> {
        let (category, text) = self.resolve()?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(Prompt {
            id: id,
            full_prompt: text,
            category: category.clone(),
            main_category: Some(category),
            sub_category: Some(self.sub_category.trim().to_string()),
            reference_image: self.reference_image,
        })
    }
}
