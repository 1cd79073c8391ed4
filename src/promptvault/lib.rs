pub mod args;
pub mod errors;
pub mod export;
pub mod group;
pub mod image;
pub mod lineformat;
pub mod pdf;
pub mod profile;
pub mod prompt;
pub mod storage;
pub mod store;
pub mod utils;
pub mod view;

use std::io::stdout;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use regex::Regex;
use tracing::{debug, warn};

use args::{Cli, Commands};
use errors::{Error, ErrorKind, Result};
use image::DataUri;
use profile::{validate_profile_name, ProfilesData};
use prompt::{Prompt, PromptDraft, SAVE_DELAY};
use storage::{FileStore, KeyValueStore};
use store::ProfileStore;
use view::ViewFlags;

fn require_profile(data: &ProfilesData) -> Result<String> {
    match data.current_profile() {
        Some((name, _)) => Ok(name.to_string()),
        None => Err(Error::new(ErrorKind::NoProfile,
                               "no profile selected, use `select <name>` or `new-profile <name>`")),
    }
}

fn require_prompt(data: &ProfilesData, id: i64) -> Result<&Prompt> {
    match data.find_prompt(id) {
        Some(p) => Ok(p),
        None => Err(Error::new(ErrorKind::NotFound, &format!("prompt {} doesn't exist", id))),
    }
}

/// Validate and create `name`, making it the current profile.
pub fn create_profile<S: KeyValueStore>(store: &mut ProfileStore<S>, name: &str) -> Result<String> {
    let name = validate_profile_name(name, store.data().profile_names())?;
    store.update(|d| d.create_profile(&name))?;
    Ok(name)
}

/// Switch to an existing profile; unknown names are rejected here so the
/// snapshot never points at a missing profile.
pub fn select_profile<S: KeyValueStore>(store: &mut ProfileStore<S>, name: &str) -> Result<()> {
    if !store.data().profiles.contains_key(name) {
        return Err(Error::new(ErrorKind::NotFound, &format!("profile '{}' doesn't exist", name)));
    }
    store.update(|d| d.select_profile(name))?;
    Ok(())
}

/// Save `draft` into the current profile after `delay`, returning the new id.
pub fn save_prompt<S: KeyValueStore>(store: &mut ProfileStore<S>, draft: PromptDraft, delay: Duration) -> Result<i64> {
    let profile = require_profile(store.data())?;
    // reject empty drafts before waiting
    draft.resolve()?;
    let id = store.data().next_prompt_id(&profile, utils::now_millis())?;
    let prompt = draft.into_prompt(id, delay)?;
    store.update(|d| d.add_prompt(&profile, prompt))?;
    debug!(id = id, profile = %profile, "saved prompt");
    Ok(id)
}

/// Delete a prompt from the current profile; false when it didn't exist.
pub fn delete_prompt<S: KeyValueStore>(store: &mut ProfileStore<S>, id: i64) -> Result<bool> {
    let profile = require_profile(store.data())?;
    store.update(|d| d.delete_prompt(&profile, id))
}

/// Prompts of the current profile whose text contains `pattern`, or matches
/// it as a regex when `regex` is set.
pub fn search_prompts(prompts: &[Prompt], pattern: &str, regex: bool) -> Result<Vec<Prompt>> {
    if regex {
        let re = Regex::new(pattern)?;
        Ok(prompts.iter().filter(|p| re.is_match(&p.full_prompt)).cloned().collect())
    } else {
        Ok(prompts.iter().filter(|p| p.full_prompt.contains(pattern)).cloned().collect())
    }
}

/// Run one parsed command against `store`.
pub fn execute<S: KeyValueStore>(command: Option<Commands>, store: &mut ProfileStore<S>, delay: Duration) -> Result<()> {
    match command {
        Some(Commands::Profiles) => {
            view::print_profiles(store.data());
        }
        Some(Commands::NewProfile { name }) => {
            let name = create_profile(store, &name)?;
            println!("created profile '{}'", name);
        }
        Some(Commands::Select { name }) => {
            select_profile(store, &name)?;
            println!("switched to profile '{}'", name);
        }
        Some(Commands::Switch) => {
            let previous = store.data().current_user.clone();
            store.update(|d| d.switch_profile())?;
            match previous {
                Some(name) => println!("left profile '{}'", name),
                None => println!("no profile was selected"),
            }
        }
        Some(Commands::Add { instructions, category, custom, sub, image, editor }) => {
            require_profile(store.data())?;
            let instructions = if editor && utils::istty(utils::STDOUT_FILENO) && utils::istty(utils::STDIN_FILENO) {
                utils::drop_to_editor(&instructions)?
            } else {
                instructions
            };
            let reference_image = match image {
                Some(path) => Some(DataUri::from_file(Path::new(&path))?.encode()),
                None => None,
            };
            let draft = PromptDraft {
                sub_category: sub,
                instructions: instructions,
                reference_image: reference_image,
                ..PromptDraft::for_category(category, custom)
            };
            let id = save_prompt(store, draft, delay)?;
            println!("prompt {} added", id);
        }
        Some(Commands::Del { id }) => {
            for pid in id {
                if delete_prompt(store, pid)? {
                    println!("deleted prompt {}", pid);
                } else {
                    println!("prompt {} doesn't exist", pid);
                }
            }
        }
        Some(Commands::Show { id }) => {
            require_profile(store.data())?;
            view::print_prompt(require_prompt(store.data(), id)?)?;
        }
        Some(Commands::Copy { id }) => {
            require_profile(store.data())?;
            view::write_prompt_text(&mut stdout(), require_prompt(store.data(), id)?)?;
        }
        Some(Commands::Search { pattern, regex }) => {
            require_profile(store.data())?;
            let matches = search_prompts(store.data().current_prompts(), &pattern, regex)?;
            debug!(pattern = %pattern, regex = regex, found = matches.len(), "searched prompts");
            view::print_grouped(&matches, ViewFlags::default(), "nothing found")?;
        }
        Some(Commands::Export { output }) => {
            let profile = require_profile(store.data())?;
            let prompts = store.data().current_prompts();
            let pages = pdf::export_pdf(prompts, Path::new(&output))?;
            println!("exported {} prompts from '{}' to {} ({} pages)", prompts.len(), profile, output, pages);
        }
        Some(Commands::Info) => {
            let profile = require_profile(store.data())?;
            view::print_stats(&profile, store.data().current_prompts())?;
        }
        Some(Commands::List { yaml, condensed }) => {
            require_profile(store.data())?;
            let flags = ViewFlags { yaml: yaml, condensed: condensed };
            view::print_grouped(store.data().current_prompts(), flags, "this vault is empty")?;
        }
        None => {
            if store.data().current_profile().is_some() {
                view::print_grouped(store.data().current_prompts(), ViewFlags::default(), "this vault is empty")?;
            } else {
                view::print_profiles(store.data());
            }
        }
    }
    Ok(())
}

pub fn r#run() -> Result<()> {
    let cli = Cli::parse();
    let folder = utils::find_vault_folder(&cli.vault_folder)?;
    debug!(folder = %folder.display(), "opening vault");

    let (mut store, load_error) = ProfileStore::open(FileStore::new(&folder));
    if let Some(e) = load_error {
        warn!(folder = %folder.display(), "continuing with an empty vault");
        eprintln!("Error: {}", e);
    }

    let delay = if cli.no_delay { Duration::ZERO } else { SAVE_DELAY };
    execute(cli.command, &mut store, delay)
}
