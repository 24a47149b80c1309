use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Submit and manage datamart requirements")]
pub struct Cli {
    /// Backend base URL (overrides the preferences file)
    #[clap(long)]
    pub api_url: Option<String>,

    /// Responsible role scoping the visible form fields; interactive
    /// submit/edit prompts for one when omitted, everything else falls
    /// back to "All"
    #[clap(long, short = 'r')]
    pub role: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a new requirement
    Submit {
        /// Field values as FIELD=VALUE (repeatable)
        #[clap(long, short = 's', value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// List requirements (single latest record unless filtered or --all)
    List {
        /// Filter by target field name (substring, case-insensitive)
        #[clap(long)]
        attribute: Option<String>,

        /// Filter by data steward (substring, case-insensitive)
        #[clap(long)]
        steward: Option<String>,

        /// Filter by target datamart (substring, case-insensitive)
        #[clap(long)]
        datamart: Option<String>,

        /// Show the entire collection
        #[clap(long, short = 'a')]
        all: bool,
    },

    /// Show the full field expansion of one requirement
    Show {
        /// The id of the requirement to show
        id: i64,
    },

    /// Edit an existing requirement
    Edit {
        /// The id of the requirement to edit
        id: i64,

        /// Field values as FIELD=VALUE (repeatable); prompts when absent
        #[clap(long, short = 's', value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete a requirement
    Del {
        /// The id of the requirement to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Dashboard summary: totals, group counts, distinct cardinalities
    Stats,

    /// Print the attribute schema, optionally scoped to one role
    Fields {
        /// Role whose visible subset to print
        #[clap(long)]
        role: Option<String>,
    },

    /// Get or set the presentation theme preference
    Theme {
        /// New theme (dark or light); prints the current one when absent
        value: Option<String>,
    },
}
