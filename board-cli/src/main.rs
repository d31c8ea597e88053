use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use board_client::comments::{CommentThread, DeleteOutcome};
use board_client::messages;
use board_client::posts::{delete_post, open_post, publish_post};
use board_client::{
    AppSettings, AuthClient, BoardClientError, BoardClientHttp, BoardStore, EditGate,
    FilePreferences, POSTS_PER_PAGE, Paginator, PostDraft, PreferenceStore, Session,
    display_label, load_edit_gate, save_edit,
};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board", about = "Community bulletin board")]
struct Cli {
    #[arg(short, long, env = "BOARD_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Preferences file holding the session token and theme.
    #[arg(long)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// One page of posts, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// A post with its comments; counts as a view.
    Show { id: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    DeletePost {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    Comment {
        post_id: String,
        content: String,
    },
    DeleteComment {
        post_id: String,
        comment_id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Shows the theme, or flips it with --toggle.
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();

    let prefs_path = args
        .prefs
        .or_else(FilePreferences::default_path)
        .ok_or("no configuration directory; pass --prefs")?;
    let prefs = Rc::new(FilePreferences::open(prefs_path)?);
    let mut settings = AppSettings::load(prefs.as_ref());

    let client = BoardClientHttp::connect(&args.server, Session::persistent(prefs.clone()))?;
    if let Err(err) = client.restore().await {
        warn!(%err, "could not restore the saved session");
    }

    if let Err(err) = run(args.command, &client, prefs.as_ref(), &mut settings).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    command: Command,
    client: &BoardClientHttp,
    prefs: &dyn PreferenceStore,
    settings: &mut AppSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let me = client.current_user();

    match command {
        Command::Register { email, password } => {
            if let Err(errors) = board_client::validation::validate_registration(&email, &password)
            {
                return Err(errors[0].message.into());
            }
            match client.register(&email, &password).await {
                Ok(user) => println!("{}", messages::welcome(user.label())),
                Err(err) => return Err(err.register_message().into()),
            }
        }
        Command::Login { email, password } => {
            if let Err(errors) = board_client::validation::validate_login(&email, &password) {
                return Err(errors[0].message.into());
            }
            match client.sign_in(&email, &password).await {
                Ok(user) => println!("{}", messages::welcome(user.label())),
                Err(_) => return Err(messages::LOGIN_FAILED.into()),
            }
        }
        Command::Logout => {
            client.sign_out();
            println!("{}", messages::LOGGED_OUT);
        }
        Command::Whoami => match me {
            Some(user) => println!("{} <{}>", user.label(), user.email),
            None => println!("not signed in"),
        },
        Command::List { page } => {
            let posts = client.list_posts().await?;
            println!("{}", messages::BOARD_TITLE);
            if posts.is_empty() {
                println!("{}", messages::EMPTY_BOARD);
                return Ok(());
            }

            let mut pager = Paginator::new(POSTS_PER_PAGE);
            pager.go_to(page);
            pager.sync(posts.len());
            for row in pager.rows(&posts) {
                println!(
                    "{:>4}  {}  {}  {}  [{}]",
                    row.number,
                    row.item.title,
                    display_label(&row.item.username),
                    board_client::model::short_date(&row.item.created_at),
                    row.item.id,
                );
            }
            println!(
                "page {}/{}",
                pager.current_page(),
                pager.total_pages(posts.len())
            );
        }
        Command::Show { id } => {
            let post = match open_post(client, &id).await {
                Ok(post) => post,
                Err(BoardClientError::NotFound) => return Err(messages::POST_NOT_FOUND.into()),
                Err(err) => return Err(err.into()),
            };
            println!("{}", post.title);
            println!(
                "{} | {} | views {}",
                display_label(&post.username),
                board_client::model::short_date(&post.created_at),
                post.views
            );
            println!();
            println!("{}", post.content);
            println!();

            let mut thread = CommentThread::new(&post.id);
            thread.refresh(client).await?;
            println!("{}", thread.count_label());
            for comment in thread.comments() {
                let marker = if CommentThread::can_delete(me.as_ref(), comment) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {}  {}: {}",
                    comment.id,
                    display_label(&comment.username),
                    comment.content
                );
            }
        }
        Command::Create { title, content } => {
            let draft = PostDraft { title, content };
            let post = publish_post(client, me.as_ref(), &draft).await?;
            println!("{}", post.id);
        }
        Command::Edit { id, title, content } => {
            let post = match load_edit_gate(client, me.as_ref(), &id).await? {
                EditGate::Editable(post) => post,
                EditGate::NotFound => return Err(messages::POST_NOT_FOUND.into()),
                EditGate::Denied => return Err(BoardClientError::Forbidden.into()),
            };
            let mut draft = PostDraft::from(&post);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            save_edit(client, me.as_ref(), &post, &draft).await?;
            println!("{}", messages::POST_UPDATED);
        }
        Command::DeletePost { id, yes } => {
            let post = client
                .get_post(&id)
                .await?
                .ok_or(messages::POST_NOT_FOUND)?;
            let deleted = delete_post(client, me.as_ref(), &post, || {
                yes || confirm(messages::POST_DELETE_CONFIRM)
            })
            .await?;
            if deleted {
                println!("deleted");
            }
        }
        Command::Comment { post_id, content } => {
            let mut thread = CommentThread::new(post_id);
            match thread.submit(client, me.as_ref(), &content).await {
                Ok(_) => println!("{}", thread.count_label()),
                Err(BoardClientError::Validation(err)) => return Err(err.message.into()),
                Err(_) => return Err(messages::COMMENT_CREATE_FAILED.into()),
            }
        }
        Command::DeleteComment {
            post_id,
            comment_id,
            yes,
        } => {
            let mut thread = CommentThread::new(post_id);
            thread.refresh(client).await?;
            let outcome = thread
                .delete(client, me.as_ref(), &comment_id, || {
                    yes || confirm(messages::COMMENT_DELETE_CONFIRM)
                })
                .await
                .map_err(|_| messages::COMMENT_DELETE_FAILED)?;
            if outcome == DeleteOutcome::Deleted {
                println!("{}", thread.count_label());
            }
        }
        Command::Theme { toggle } => {
            if toggle {
                settings.toggle_theme(prefs)?;
            }
            println!("{}", settings.theme);
        }
    }

    Ok(())
}

/// Reads y/N from stdin.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["board", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List { page: 1 }));
    }
}
