//! CLI argument parsing

use crate::retrieval::{SearchFilters, SuggestFilters};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "college-course-search")]
#[command(version, about = "Ranked search over the college/course catalog", long_about = None)]
#[command(after_help = "Configuration is read from the environment:\n  \
    CATALOG_DB_PATH, CATALOG_POOL_SIZE, SEARCH_DEFAULT_LIMIT, SEARCH_BROAD_LIMIT,\n  \
    SEARCH_STRATEGY_ROW_LIMIT, SEARCH_MAX_VARIANTS, SEARCH_TIME_BUDGET_MS,\n  \
    SEARCH_SHORT_CIRCUIT, SUGGEST_DEFAULT_LIMIT, SUGGEST_CATEGORY_LIMIT,\n  \
    REFERENCE_CACHE_TTL_S, LEXICON_PATH")]
pub struct Cli {
    #[arg(long, global = true, help = "Print Prometheus metrics to stderr when done")]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Search colleges and courses")]
    Search {
        #[arg(help = "Free-text query: a name, abbreviation, course code or location")]
        query: String,

        #[arg(long, help = "medical, dental or dnb")]
        stream: Option<String>,

        #[arg(long, help = "Course filter, e.g. MBBS")]
        course: Option<String>,

        #[arg(long, help = "State filter")]
        state: Option<String>,

        #[arg(short, long, help = "Maximum results (groups with --grouped)")]
        limit: Option<usize>,

        #[arg(long, help = "Group results into college cards")]
        grouped: bool,
    },

    #[command(about = "Autocomplete suggestions")]
    Suggest {
        query: String,

        #[arg(long, help = "medical, dental or dnb")]
        stream: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    #[command(about = "List states present in the catalog")]
    States,

    #[command(about = "List streams with course counts")]
    Streams,

    #[command(about = "Show a college and its courses")]
    College { id: i64 },
}

impl Commands {
    pub fn search_filters(&self) -> Option<SearchFilters> {
        match self {
            Commands::Search {
                stream,
                course,
                state,
                limit,
                ..
            } => Some(SearchFilters {
                stream: stream.clone(),
                course: course.clone(),
                state: state.clone(),
                limit: *limit,
            }),
            _ => None,
        }
    }

    pub fn suggest_filters(&self) -> Option<SuggestFilters> {
        match self {
            Commands::Suggest { stream, limit, .. } => Some(SuggestFilters {
                stream: stream.clone(),
                limit: *limit,
            }),
            _ => None,
        }
    }
}
