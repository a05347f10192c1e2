//! `leftorium` CLI binary.
//!
//! ```text
//! leftorium products --category kitchen --pages 2
//! leftorium product precision-scissors
//! leftorium login
//! leftorium rate precision-scissors 5
//! leftorium comment precision-scissors "Finally!"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};

use leftorium::cli::commands::{
    CallableTrait, ListCommentsCommand, ListProductsCommand, LoginCommand, LogoutCommand,
    PostCommentCommand, RateCommand, RegisterCommand, ShowProductCommand, SubmitProductCommand,
    SuggestCommand, WhoamiCommand,
};
use leftorium::cli::context::AppContext;
use leftorium::configuration::get_configuration;
use leftorium::forms::{ProductSubmission, Suggestion, SuggestionKind};
use leftorium::models::{Category, Feature, ProductFilter, Score};
use leftorium::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "leftorium",
    version,
    about = "Browse, rate and discuss the Leftorium catalog",
    long_about = "Leftorium CLI: a terminal storefront for left-handed products\n\n\
        Reads its CMS location from configuration.yaml, LEFTORIUM__* variables\n\
        or VITE_STRAPI_URL, and keeps your login in ~/.config/leftorium."
)]
struct Cli {
    /// Log filter (overrides log_level from configuration; RUST_LOG wins over both)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Kitchen, Office, Workshop, Sports or Lab
        #[arg(long)]
        category: Option<Category>,
        /// Only real products
        #[arg(long, conflicts_with = "fake")]
        real: bool,
        /// Only lab prototypes
        #[arg(long)]
        fake: bool,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one product with its rating and related items
    Product { slug: String },
    /// List a product's comments, newest first
    Comments {
        slug: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Post a comment on a product
    Comment { slug: String, content: String },
    /// Rate a product from 1 to 5 stars
    Rate { slug: String, score: Score },
    /// Log in with username or email
    Login {
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long, env = "LEFTORIUM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEFTORIUM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored login
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Submit a product to the catalog
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: Category,
        /// Short description shown on product cards
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: Option<String>,
        /// The product exists and can be bought
        #[arg(long)]
        real: bool,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
        /// Feature bullet (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Long description
        #[arg(long)]
        details: Option<String>,
        /// URL slug (derived from the title when omitted)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Suggest a product idea to the Idea Lab
    Suggest {
        #[arg(long)]
        name: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        link: Option<String>,
        /// A pitch for a product that does not exist yet
        #[arg(long)]
        fake: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = get_configuration().context("Failed to read configuration")?;

    // Logs go to stderr so stdout stays pipeable
    let filter = cli
        .log_level
        .clone()
        .unwrap_or_else(|| settings.log_level.clone());
    let subscriber = get_subscriber("leftorium".into(), filter, std::io::stderr);
    init_subscriber(subscriber).map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    let ctx = AppContext::init(settings)
        .await
        .context("Failed to start session")?;
    let command = get_command(cli.command);
    if let Err(err) = command.call(&ctx).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn get_command(command: Commands) -> Box<dyn CallableTrait> {
    match command {
        Commands::Products {
            category,
            real,
            fake,
            pages,
        } => {
            let is_real = match (real, fake) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            Box::new(ListProductsCommand::new(
                ProductFilter { category, is_real },
                pages,
            ))
        }
        Commands::Product { slug } => Box::new(ShowProductCommand::new(slug)),
        Commands::Comments { slug, pages } => Box::new(ListCommentsCommand::new(slug, pages)),
        Commands::Comment { slug, content } => Box::new(PostCommentCommand::new(slug, content)),
        Commands::Rate { slug, score } => Box::new(RateCommand::new(slug, score)),
        Commands::Login {
            identifier,
            password,
        } => Box::new(LoginCommand::new(identifier, password)),
        Commands::Register {
            username,
            email,
            password,
        } => Box::new(RegisterCommand::new(username, email, password)),
        Commands::Logout => Box::new(LogoutCommand),
        Commands::Whoami => Box::new(WhoamiCommand),
        Commands::Submit {
            title,
            category,
            description,
            price,
            real,
            image,
            features,
            details,
            slug,
        } => Box::new(SubmitProductCommand::new(ProductSubmission {
            title,
            slug,
            short_description: description,
            category,
            price,
            is_real: real,
            art_url: image,
            features: features.into_iter().map(Feature::new).collect(),
            description: details,
        })),
        Commands::Suggest {
            name,
            reason,
            link,
            fake,
        } => Box::new(SuggestCommand::new(Suggestion {
            name,
            link,
            reason,
            kind: if fake {
                SuggestionKind::Fake
            } else {
                SuggestionKind::Real
            },
        })),
    }
}
