//! Page layout for the exported vault.
//!
//! Layout is a single pass with a vertical cursor measured in millimetres
//! from the top of the page. Every block (title, category heading, prompt
//! body) is wrapped, measured, and moved to a fresh page as a whole when it
//! does not fit above the bottom margin; blocks are never split.

use crate::group::CategoryGroup;

/// points to millimetres
pub const MM_PER_PT: f32 = 25.4 / 72.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

pub static DOCUMENT_TITLE: &'static str = "My Prompt Vault";
/// default file name of the exported document
pub static EXPORT_FILE_NAME: &'static str = "prompt-vault.pdf";

/// extra space above every category heading but the first
pub const CATEGORY_GAP: f32 = 5.0;
/// height reserved for the rule between two prompts of a category
pub const SEPARATOR_HEIGHT: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FontStyle {
    Normal,
    Bold,
}

/// Font and trailing space of one kind of block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockStyle {
    pub size: f32,
    pub style: FontStyle,
    pub space_after: f32,
}

pub const TITLE_STYLE: BlockStyle = BlockStyle { size: 22.0, style: FontStyle::Bold, space_after: 10.0 };
pub const HEADING_STYLE: BlockStyle = BlockStyle { size: 16.0, style: FontStyle::Bold, space_after: 5.0 };
pub const BODY_STYLE: BlockStyle = BlockStyle { size: 11.0, style: FontStyle::Normal, space_after: 8.0 };

/// Page geometry in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    pub fn a4() -> PageSetup {
        PageSetup {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// lowest cursor position a block may reach
    pub fn bottom(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        PageSetup::a4()
    }
}

pub trait TextMeasure {
    /// rendered width of `text` in millimetres
    fn text_width(&self, text: &str, size: f32, style: FontStyle) -> f32;

    fn line_height(&self, size: f32) -> f32 {
        size * LINE_HEIGHT_FACTOR * MM_PER_PT
    }
}

/// Approximate advance widths of the PDF base font Helvetica.
#[derive(Clone, Copy, Debug, Default)]
pub struct HelveticaMetrics;

fn helvetica_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' => 0.222,
        ' ' | 'f' | 't' | 'I' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | '/' => 0.278,
        'r' | '(' | ')' | '-' | '[' | ']' => 0.333,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.5,
        'm' | 'M' => 0.833,
        'w' => 0.722,
        'W' => 0.944,
        '0'..='9' | 'a'..='z' => 0.556,
        'A'..='Z' => 0.667,
        _ => 0.6,
    }
}

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, size: f32, style: FontStyle) -> f32 {
        let em: f32 = text.chars().map(helvetica_em).sum();
        let weight = match style {
            FontStyle::Normal => 1.0,
            FontStyle::Bold => 1.06,
        };
        em * weight * size * MM_PER_PT
    }
}

/// Greedy word wrap; explicit newlines always break, words wider than the
/// line are split between characters.
pub fn wrap_text<M: TextMeasure + ?Sized>(text: &str, max_width: f32, block: &BlockStyle, measure: &M) -> Vec<String> {
    let fits = |s: &str| measure.text_width(s, block.size, block.style) <= max_width;
    let mut lines = vec![];
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(current);
            }
            // the word alone may still be too wide
            current = String::new();
            for c in word.chars() {
                current.push(c);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(current);
                    current = c.to_string();
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Something drawn on a page, coordinates from the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// `y` is the top of the first line
    Text {
        lines: Vec<String>,
        x: f32,
        y: f32,
        size: f32,
        line_height: f32,
        style: FontStyle,
    },
    Rule { x1: f32, x2: f32, y: f32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

pub struct Layout<'m, M: TextMeasure + ?Sized> {
    setup: PageSetup,
    measure: &'m M,
    pages: Vec<Page>,
    y: f32,
}

impl<'m, M: TextMeasure + ?Sized> Layout<'m, M> {
    pub fn new(setup: PageSetup, measure: &'m M) -> Layout<'m, M> {
        Layout {
            setup: setup,
            measure: measure,
            pages: vec![Page::default()],
            y: setup.margin,
        }
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.setup.margin;
    }

    /// Break the page if `height` does not fit below the cursor. A page
    /// without text on it is kept, oversized content just runs past the
    /// margin.
    fn make_room(&mut self, height: f32) {
        let empty = self.pages
                        .last()
                        .map_or(true, |p| p.elements.iter().all(|e| matches!(e, Element::Rule { .. })));
        if self.y + height > self.setup.bottom() && !empty {
            self.new_page();
        }
    }

    /// returns the height of the wrapped block
    pub fn write_block(&mut self, text: &str, block: &BlockStyle) -> f32 {
        let lines = wrap_text(text, self.setup.content_width(), block, self.measure);
        let line_height = self.measure.line_height(block.size);
        let height = line_height * lines.len() as f32;
        self.make_room(height);
        let (x, y) = (self.setup.margin, self.y);
        self.current_page().elements.push(Element::Text {
            lines: lines,
            x: x,
            y: y,
            size: block.size,
            line_height: line_height,
            style: block.style,
        });
        self.y += height + block.space_after;
        height
    }

    pub fn separator(&mut self) {
        self.make_room(SEPARATOR_HEIGHT);
        let (x1, x2, y) = (self.setup.margin, self.setup.width - self.setup.margin, self.y);
        self.current_page().elements.push(Element::Rule { x1: x1, x2: x2, y: y });
        self.y += SEPARATOR_HEIGHT;
    }

    pub fn gap(&mut self, height: f32) {
        self.y += height;
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Lay out the title and every category group onto pages.
pub fn layout_document<M: TextMeasure + ?Sized>(groups: &[CategoryGroup], setup: PageSetup, measure: &M) -> Vec<Page> {
    let mut layout = Layout::new(setup, measure);
    layout.write_block(DOCUMENT_TITLE, &TITLE_STYLE);
    for (ci, group) in groups.iter().enumerate() {
        if ci > 0 {
            layout.gap(CATEGORY_GAP);
        }
        layout.write_block(group.category, &HEADING_STYLE);
        for (pi, prompt) in group.prompts.iter().enumerate() {
            if pi > 0 {
                layout.separator();
            }
            layout.write_block(&prompt.full_prompt, &BODY_STYLE);
        }
    }
    layout.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::group_by_category;
    use crate::prompt::Prompt;

    /// every character 1mm wide, every line 10mm tall
    struct Fixed;

    impl TextMeasure for Fixed {
        fn text_width(&self, text: &str, _size: f32, _style: FontStyle) -> f32 {
            text.chars().count() as f32
        }

        fn line_height(&self, _size: f32) -> f32 {
            10.0
        }
    }

    const FLAT: BlockStyle = BlockStyle { size: 11.0, style: FontStyle::Normal, space_after: 0.0 };

    fn setup() -> PageSetup {
        // usable height 100mm, content width 20mm
        PageSetup { width: 30.0, height: 110.0, margin: 5.0 }
    }

    fn lines(n: usize) -> String {
        vec!["x"; n].join("\n")
    }

    fn text_tops(page: &Page) -> Vec<f32> {
        page.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { y, .. } => Some(*y),
                _ => None,
            })
            .collect()
    }

    fn prompt(id: i64, category: &str, text: &str) -> Prompt {
        Prompt {
            id: id,
            full_prompt: text.to_string(),
            category: category.to_string(),
            main_category: None,
            sub_category: None,
            reference_image: None,
        }
    }

    #[test]
    fn wraps_on_words_and_newlines() {
        let out = wrap_text("aaa bbb ccc\n\ndd", 7.0, &FLAT, &Fixed);
        assert_eq!(out, vec!["aaa bbb", "ccc", "", "dd"]);
    }

    #[test]
    fn splits_words_wider_than_a_line() {
        let out = wrap_text("abcdefgh ij", 3.0, &FLAT, &Fixed);
        assert_eq!(out, vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn third_block_moves_to_next_page() {
        // h1 + h2 = 100 <= H = 100 < h1 + h2 + h3
        let mut layout = Layout::new(setup(), &Fixed);
        assert_eq!(layout.write_block(&lines(4), &FLAT), 40.0);
        assert_eq!(layout.write_block(&lines(6), &FLAT), 60.0);
        assert_eq!(layout.page_count(), 1);
        layout.write_block(&lines(1), &FLAT);
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.cursor(), 5.0 + 10.0);

        let pages = layout.finish();
        assert_eq!(text_tops(&pages[0]), vec![5.0, 45.0]);
        assert_eq!(text_tops(&pages[1]), vec![5.0]);
    }

    #[test]
    fn oversized_block_does_not_leave_a_blank_page() {
        let mut layout = Layout::new(setup(), &Fixed);
        layout.write_block(&lines(15), &FLAT);
        assert_eq!(layout.page_count(), 1);
        layout.write_block("x", &FLAT);
        assert_eq!(layout.page_count(), 2);
    }

    #[test]
    fn separator_breaks_page_when_it_does_not_fit() {
        let mut layout = Layout::new(setup(), &Fixed);
        layout.write_block(&lines(10), &FLAT);
        assert_eq!(layout.cursor(), 105.0);
        layout.separator();
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.cursor(), 5.0 + SEPARATOR_HEIGHT);
        let pages = layout.finish();
        assert_eq!(pages[1].elements, vec![Element::Rule { x1: 5.0, x2: 25.0, y: 5.0 }]);
    }

    #[test]
    fn oversized_block_stays_under_a_carried_over_rule() {
        let mut layout = Layout::new(setup(), &Fixed);
        layout.write_block(&lines(10), &FLAT);
        layout.separator();
        assert_eq!(layout.page_count(), 2);
        layout.write_block(&lines(12), &FLAT);
        assert_eq!(layout.page_count(), 2);

        let pages = layout.finish();
        assert_eq!(pages[1].elements.len(), 2);
        assert_eq!(text_tops(&pages[1]), vec![5.0 + SEPARATOR_HEIGHT]);
    }

    #[test]
    fn document_has_title_headings_and_separators() {
        let prompts = vec![prompt(1, "B", "one"), prompt(2, "A", "two"), prompt(3, "B", "three")];
        let groups = group_by_category(&prompts);
        let pages = layout_document(&groups, PageSetup::a4(), &HelveticaMetrics);
        assert_eq!(pages.len(), 1);

        let texts: Vec<&str> = pages[0]
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { lines, .. } => Some(lines[0].as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["My Prompt Vault", "A", "two", "B", "one", "three"]);

        // only between the two prompts of "B"
        let rules = pages[0].elements.iter().filter(|e| matches!(e, Element::Rule { .. })).count();
        assert_eq!(rules, 1);
        assert!(matches!(pages[0].elements[5], Element::Rule { .. }));
    }

    #[test]
    fn category_gap_only_between_categories() {
        let prompts = vec![prompt(1, "A", "x"), prompt(2, "B", "y")];
        let groups = group_by_category(&prompts);
        let pages = layout_document(&groups, setup(), &Fixed);
        // title 10 + 10, heading A 10 + 5, body 10 + 8, gap 5, heading B
        let tops = text_tops(&pages[0]);
        assert_eq!(tops[0], 5.0);
        assert_eq!(tops[1], 25.0);
        assert_eq!(tops[2], 40.0);
        assert_eq!(tops[3], 63.0);
    }

    #[test]
    fn long_vault_spans_pages() {
        let prompts: Vec<Prompt> = (0..60)
            .map(|i| prompt(i, "Design", "Describe a logo for a coffee shop that roasts its own beans"))
            .collect();
        let groups = group_by_category(&prompts);
        let pages = layout_document(&groups, PageSetup::a4(), &HelveticaMetrics);
        assert!(pages.len() > 1);
        let bottom = PageSetup::a4().bottom();
        for page in &pages {
            for e in &page.elements {
                if let Element::Text { lines, y, line_height, .. } = e {
                    assert!(y + line_height * lines.len() as f32 <= bottom + 0.001);
                }
            }
        }
    }

    #[test]
    fn helvetica_width_scales_with_size() {
        let m = HelveticaMetrics;
        let small = m.text_width("Make a logo", 11.0, FontStyle::Normal);
        let big = m.text_width("Make a logo", 22.0, FontStyle::Normal);
        assert!((big - 2.0 * small).abs() < 0.001);
        assert!(m.text_width("Make a logo", 11.0, FontStyle::Bold) > small);
    }
}
