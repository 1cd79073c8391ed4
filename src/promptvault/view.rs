use std::io::{stdout, Write};
use std::iter::repeat;

use chrono::{Local, TimeZone};

use crate::errors::Result;
use crate::group::{group_by_category, CategoryGroup};
use crate::lineformat::LineFormat;
use crate::profile::ProfilesData;
use crate::prompt::Prompt;
use crate::utils::{format_field, istty, pretty_line, termsize, STDOUT_FILENO};

pub static DATEFMT_SHORT: &'static str = "%F %T";

pub struct ViewFlags {
    pub condensed: bool,
    pub yaml: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        ViewFlags {
            condensed: false,
            yaml: false,
        }
    }
}

/// prompt ids are creation timestamps; render one as local time
pub fn id_to_local_string(id: i64) -> Option<String> {
    Local.timestamp_millis_opt(id)
         .single()
         .map(|t| t.format(DATEFMT_SHORT).to_string())
}

fn write_header<T: Write>(output: &mut T, line_format: &LineFormat) -> Result<()> {
    let column_seperator: String = repeat(' ')
                                       .take(line_format.colsep)
                                       .collect();
    let header_seperator: String = repeat('-')
                                       .take(line_format.line_width())
                                       .collect();
    let sub = if line_format.sub_width == 0 {
        "".to_string()
    } else {
        format_field("sub", line_format.sub_width, false) + &*column_seperator
    };
    writeln!(output,
             "{1}{0}{2}{3}\n{4}",
             column_seperator,
             format_field("id", line_format.id_width, false),
             sub,
             "prompt",
             header_seperator)?;
    Ok(())
}

/// Write the grouped listing: one block per category, one line per prompt.
pub fn write_groups<T: Write>(output: &mut T, groups: &[CategoryGroup], condensed: bool, term_width: usize) -> Result<()> {
    let all: Vec<&Prompt> = groups.iter().flat_map(|g| g.prompts.iter().cloned()).collect();
    let line_format = LineFormat::new(&all, condensed, term_width);
    for (i, group) in groups.iter().enumerate() {
        if i > 0 && !condensed {
            writeln!(output)?;
        }
        writeln!(output, "# {} ({})", group.category, group.prompts.len())?;
        if !condensed {
            write_header(output, &line_format)?;
        }
        for p in &group.prompts {
            p.write(output, &line_format)?;
        }
    }
    Ok(())
}

/// Write prompts grouped by category, or as YAML. `empty_msg` stands in
/// for an empty listing.
pub fn write_grouped<T: Write>(output: &mut T,
                               prompts: &[Prompt],
                               flags: &ViewFlags,
                               empty_msg: &str,
                               term_width: usize)
                               -> Result<()> {
    let groups = group_by_category(prompts);
    if flags.yaml {
        write!(output, "{}", serde_yaml::to_string(&groups)?)?;
    } else if groups.is_empty() {
        writeln!(output, "{}", empty_msg)?;
    } else {
        write_groups(output, &groups, flags.condensed, term_width)?;
    }
    Ok(())
}

/// print prompts grouped by category, or as YAML
pub fn print_grouped(prompts: &[Prompt], flags: ViewFlags, empty_msg: &str) -> Result<()> {
    let width = if istty(STDOUT_FILENO) { termsize() } else { 0 };
    write_grouped(&mut stdout(), prompts, &flags, empty_msg, width)
}

/// The bare prompt text, nothing added, so it can be piped to a clipboard.
pub fn write_prompt_text<T: Write>(output: &mut T, prompt: &Prompt) -> Result<()> {
    output.write_all(prompt.full_prompt.as_bytes())?;
    output.flush()?;
    Ok(())
}

/// print a full prompt
pub fn print_prompt(prompt: &Prompt) -> Result<()> {
    let tty = istty(STDOUT_FILENO);
    pretty_line("id\n--\n", &format!("{}\n\n", prompt.id), tty)?;
    if let Some(created) = id_to_local_string(prompt.id) {
        pretty_line("created\n-------\n", &format!("{}\n\n", created), tty)?;
    }
    pretty_line("category\n--------\n", &format!("{}\n\n", prompt.category_label()), tty)?;
    if let Some(sub) = prompt.sub_category.as_deref().filter(|s| !s.is_empty()) {
        pretty_line("subcategory\n-----------\n", &format!("{}\n\n", sub), tty)?;
    }
    match prompt.image() {
        Some(Ok(uri)) => pretty_line("reference image\n---------------\n", &format!("{}\n\n", uri.summary()), tty)?,
        Some(Err(e)) => pretty_line("reference image\n---------------\n", &format!("unreadable: {}\n\n", e), tty)?,
        None => {}
    }
    pretty_line("prompt\n------\n", &format!("{}\n", prompt.full_prompt), tty)?;
    Ok(())
}

/// print the profiles, marking the current one
pub fn print_profiles(data: &ProfilesData) {
    if data.profiles.is_empty() {
        println!("no profiles yet, create one with `promptvault new-profile <name>`");
        return;
    }
    for (name, profile) in &data.profiles {
        let marker = if data.current_user.as_deref() == Some(name.as_str()) { "*" } else { " " };
        println!("{} {} ({} prompts)", marker, name, profile.prompts.len());
    }
}

/// print information about a profile
pub fn print_stats(name: &str, prompts: &[Prompt]) -> Result<()> {
    let tty = istty(STDOUT_FILENO);
    let groups = group_by_category(prompts);
    let images = prompts.iter().filter(|p| p.reference_image.is_some()).count();
    pretty_line("name: ", &format!("{}\n", name), tty)?;
    pretty_line("prompts: ", &format!("{}\n", prompts.len()), tty)?;
    if prompts.is_empty() {
        return Ok(());
    }
    let categories: Vec<String> = groups.iter()
                                        .map(|g| format!("{}: {}", g.category, g.prompts.len()))
                                        .collect();
    pretty_line("categories: ", &format!("{}\n", categories.join(", ")), tty)?;
    pretty_line("with images: ", &format!("{}\n", images), tty)?;
    let oldest = prompts.iter().map(|p| p.id).min().and_then(id_to_local_string);
    let newest = prompts.iter().map(|p| p.id).max().and_then(id_to_local_string);
    if let (Some(oldest), Some(newest)) = (oldest, newest) {
        pretty_line("prompt ages: ", &format!("oldest: {}, newest: {}\n", oldest, newest), tty)?;
    }
    Ok(())
}
