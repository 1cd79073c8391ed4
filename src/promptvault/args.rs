use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "promptvault")]
#[command(version)]
#[command(about = "a command line vault for categorized prompts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault folder to use
    #[arg(long, env = "PROMPT_VAULT_FOLDER")]
    pub vault_folder: Option<String>,

    /// Save prompts without the short confirmation pause
    #[arg(long)]
    pub no_delay: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List profiles
    Profiles,

    /// Create a new profile and switch to it
    NewProfile {
        /// Name of the new profile
        name: String,
    },

    /// Switch to an existing profile
    Select {
        /// Name of the profile
        name: String,
    },

    /// Leave the current profile without deleting anything
    Switch,

    /// Save a new prompt in the current profile
    Add {
        /// Prompt instructions
        #[arg(default_value = "")]
        instructions: String,

        /// Main category: Design, Social Media Strategy, Content Creation,
        /// Other, or any custom name
        #[arg(short, long)]
        category: String,

        /// Category name when --category is Other
        #[arg(long, default_value = "")]
        custom: String,

        /// Optional subcategory
        #[arg(short, long, default_value = "")]
        sub: String,

        /// Reference image file to attach
        #[arg(short, long)]
        image: Option<String>,

        /// Write the instructions in $EDITOR
        #[arg(short, long)]
        editor: bool,
    },

    /// Delete prompts
    Del {
        /// ID(s) of the prompts to delete
        #[arg(required = true)]
        id: Vec<i64>,
    },

    /// List prompts grouped by category (default if no command)
    List {
        /// Output as YAML
        #[arg(long)]
        yaml: bool,

        /// Condensed output
        #[arg(short, long)]
        condensed: bool,
    },

    /// Show a prompt in full
    Show {
        /// Prompt ID
        id: i64,
    },

    /// Print only the prompt text, for piping into a clipboard tool
    Copy {
        /// Prompt ID
        id: i64,
    },

    /// Search prompt text
    Search {
        /// Pattern to search for
        pattern: String,

        /// Use regex
        #[arg(short, long)]
        regex: bool,
    },

    /// Export the current profile as a PDF
    Export {
        /// Output file
        #[arg(short, long, default_value = crate::export::EXPORT_FILE_NAME)]
        output: String,
    },

    /// Show profile info
    Info,
}
