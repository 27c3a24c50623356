use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use quillcli::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in with a password or through GitHub
    Login(LoginOptions),

    /// Remove the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the account API key
    Dashboard,

    /// List the account's posts
    Posts(PostsOptions),

    /// Create a test post through the capability URL
    Testpost(TestPostOptions),

    /// Change the account password
    Passwd,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Username for password sign-in
    #[clap(long, conflicts_with = "github")]
    pub username: Option<String>,

    /// Password for password sign-in (prompted when omitted)
    #[clap(long, conflicts_with = "github")]
    pub password: Option<String>,

    /// Sign in through GitHub in the browser
    #[clap(long)]
    pub github: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PostsOptions {
    /// Page to fetch (1-based)
    #[clap(long)]
    pub page: Option<u32>,

    /// Posts per page
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct TestPostOptions {
    /// Title of the test post
    #[clap(long)]
    pub title: Option<String>,

    /// Body of the test post (prompted when omitted)
    #[clap(long)]
    pub body: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Login(opt) => cli::login(opt.username, opt.password, opt.github).await,
        Command::Logout => cli::logout().await,
        Command::Whoami => cli::whoami().await,
        Command::Dashboard => cli::dashboard().await,
        Command::Posts(opt) => cli::list_posts(opt.page, opt.limit).await,
        Command::Testpost(opt) => cli::create_test_post(opt.title, opt.body).await,
        Command::Passwd => cli::change_password().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
