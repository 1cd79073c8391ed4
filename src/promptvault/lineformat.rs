use std::cmp::max;

use crate::prompt::Prompt;

/// Column widths for a one-line-per-prompt listing.
pub struct LineFormat {
    pub colsep: usize,
    pub id_width: usize,
    pub sub_width: usize,
    pub text_width: usize,
}

impl LineFormat {
    /// size columns to fit `prompts`; `term_width` of 0 means no terminal
    /// limit
    pub fn new(prompts: &[&Prompt], condensed: bool, term_width: usize) -> LineFormat {
        let colsep = if condensed { 1 } else { 2 };

        let id_width = prompts.iter()
                              .map(|p| p.id.to_string().len())
                              .fold("id".len(), max);

        let longest_sub = prompts.iter()
                                 .map(|p| p.sub_category.as_deref().unwrap_or("").chars().count())
                                 .max()
                                 .unwrap_or(0);
        let sub_width = if condensed || longest_sub == 0 {
            0
        } else {
            max(longest_sub, "sub".len())
        };

        let longest_text = prompts.iter()
                                  .map(|p| p.preview().chars().count() + 4)
                                  .fold("prompt".len(), max);
        let used = id_width + colsep + if sub_width > 0 { sub_width + colsep } else { 0 };
        let text_width = if term_width > used + "prompt".len() {
            longest_text.min(term_width - used)
        } else {
            longest_text
        };

        LineFormat {
            colsep: colsep,
            id_width: id_width,
            sub_width: sub_width,
            text_width: text_width,
        }
    }

    pub fn line_width(&self) -> usize {
        let sub = if self.sub_width > 0 { self.sub_width + self.colsep } else { 0 };
        self.id_width + self.colsep + sub + self.text_width
    }
}
