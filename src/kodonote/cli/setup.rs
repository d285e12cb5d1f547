use clap::{Parser, Subcommand};
use kodonote::display::Layout;
use kodonote::model::SectionType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kodonote", bin_name = "kodonote", version)]
#[command(about = "Notebooks of code and text blocks, synced to a shared store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Owner id of the notebooks to work on (falls back to config / KODO_OWNER)
    #[arg(long, global = true, help_heading = "Options")]
    pub owner: Option<String>,

    /// Data directory holding notebooks.json and kodonote.toml
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub home: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help_heading = "Options")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty notebook
    Create {
        title: String,

        /// Color tag stored with the notebook
        #[arg(long, default_value = "")]
        color: String,
    },

    /// List your notebooks
    #[command(alias = "ls")]
    List,

    /// Show a notebook's blocks
    Show {
        title: String,

        /// Layout to show the blocks in (row or grid)
        #[arg(long)]
        layout: Option<Layout>,

        /// Keep running and redraw whenever the notebook changes
        #[arg(short, long)]
        follow: bool,
    },

    /// Append a block and save
    Add {
        title: String,

        /// Block type: code or text
        #[arg(value_name = "TYPE")]
        section_type: SectionType,

        /// Initial block content
        value: Option<String>,
    },

    /// Replace one block's content and save
    Edit {
        title: String,

        /// Block number as shown by `show` (starting at 1)
        index: usize,

        value: String,
    },

    /// Remove the last block and save
    #[command(alias = "rm")]
    Remove { title: String },
}
