mod render;
mod transport;

use std::process::ExitCode;

use book_core::{ApiError, App, BookClient, BookId, BookInput, BookPatch, Route, Transport, View};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use transport::UreqTransport;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unknown page {0}")]
    NoSuchPage(String),
    /// A follow-up request failed after the main call succeeded.
    #[error("{0}")]
    Notice(String),
}

#[derive(Parser, Debug)]
#[command(name = "book-cli", about = "Book management client")]
struct Cli {
    #[arg(long, env = "BOOKS_API_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Log in with these credentials if the server has no session for us.
    #[arg(long, env = "BOOKS_EMAIL", requires = "password")]
    email: Option<String>,

    #[arg(long, env = "BOOKS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List books, optionally filtered by a title/author substring.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: BookId,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
    },
    Update {
        id: BookId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    Delete {
        id: BookId,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Whoami,
    Logout,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app = App::init(BookClient::new(&cli.base_url), UreqTransport::new());

    let result = surface(&app)
        .and_then(|()| sign_in(&mut app, &cli))
        .and_then(|()| run(&mut app, cli.command));
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };
    app.teardown();
    code
}

/// Fail on a notice left behind by a call that otherwise succeeded, before
/// the next navigation clears it.
fn surface<T: Transport>(app: &App<T>) -> Result<(), CliError> {
    match app.notice() {
        Some(notice) => Err(CliError::Notice(notice.message.clone())),
        None => Ok(()),
    }
}

fn sign_in<T: Transport>(app: &mut App<T>, cli: &Cli) -> Result<(), CliError> {
    if app.session().is_authenticated() {
        return Ok(());
    }
    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        app.login(email, password)?;
        surface(app)?;
    }
    Ok(())
}

/// Navigate to `path` and fail unless the guard lets the page through.
fn open<T: Transport>(app: &mut App<T>, path: &str) -> Result<(), CliError> {
    match app.navigate(path) {
        View::Page(Route::NotFound(path)) => Err(CliError::NoSuchPage(path)),
        View::Page(_) => Ok(()),
        View::LoginRequired => {
            println!("{}", render::login_required());
            Err(ApiError::LoginRequired.into())
        }
    }
}

fn run<T: Transport>(app: &mut App<T>, command: Command) -> Result<(), CliError> {
    match command {
        Command::List { search } => {
            open(app, "/")?;
            if let Some(query) = search {
                app.search(&query)?;
            }
            println!("{}", render::status_line(app.session()));
            println!("{}", render::book_table(app.books()));
        }
        Command::Show { id } => {
            open(app, "/")?;
            let book = app.get(id)?;
            println!("{}", render::book(&book));
        }
        Command::Add { title, author } => {
            open(app, "/create")?;
            let book = app.add(&BookInput::new(title, author))?;
            println!("Added {}", render::book(&book));
            println!("{}", render::book_table(app.books()));
        }
        Command::Update { id, title, author } => {
            open(app, &format!("/update/{id}"))?;
            let book = app.update(id, &BookPatch { title, author })?;
            println!("Updated {}", render::book(&book));
            println!("{}", render::book_table(app.books()));
        }
        Command::Delete { id } => {
            open(app, &format!("/delete/{id}"))?;
            let book = app.get(id)?;
            app.remove(id)?;
            println!("Deleted {}", render::book(&book));
            println!("{}", render::book_table(app.books()));
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let user = app.register(&name, &email, &password)?;
            println!("Registered user #{} ({})", user.id, user.email);
        }
        Command::Whoami => println!("{}", render::status_line(app.session())),
        Command::Logout => {
            app.logout()?;
            println!("{}", render::status_line(app.session()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use book_core::{HttpRequest, HttpResponse, TransportError};
    use clap::CommandFactory;

    #[derive(Default)]
    struct Canned(VecDeque<(u16, &'static str)>);

    impl Canned {
        fn new(replies: &[(u16, &'static str)]) -> Self {
            Self(replies.iter().copied().collect())
        }
    }

    impl Transport for Canned {
        fn execute(&mut self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let (status, body) = self
                .0
                .pop_front()
                .ok_or_else(|| TransportError("no reply queued".to_string()))?;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            })
        }
    }

    fn credentials() -> Cli {
        Cli::try_parse_from(["book-cli", "--email", "a@b.com", "--password", "pw", "list"]).unwrap()
    }

    #[test]
    fn failed_refresh_after_login_is_an_error() {
        let transport = Canned::new(&[
            (401, r#"{"detail":"Not logged in"}"#),
            (200, r#"{"message":"logged in","user_id":1}"#),
            (500, r#"{"detail":"db down"}"#),
        ]);
        let mut app = App::init(BookClient::new("http://localhost:8000"), transport);
        assert!(surface(&app).is_ok());

        let err = sign_in(&mut app, &credentials()).unwrap_err();
        assert_eq!(err.to_string(), "db down");
        assert!(app.session().is_authenticated());
    }

    #[test]
    fn failed_refresh_at_startup_is_an_error() {
        let transport = Canned::new(&[
            (200, r#"{"logged_in":true,"user_id":1}"#),
            (500, r#"{"detail":"db down"}"#),
        ]);
        let app = App::init(BookClient::new("http://localhost:8000"), transport);
        assert_eq!(surface(&app).unwrap_err().to_string(), "db down");
    }

    #[test]
    fn successful_login_lists_books() {
        let transport = Canned::new(&[
            (401, r#"{"detail":"Not logged in"}"#),
            (200, r#"{"message":"logged in","user_id":1}"#),
            (200, r#"[{"id":1,"title":"Dune","author":"Herbert"}]"#),
        ]);
        let mut app = App::init(BookClient::new("http://localhost:8000"), transport);
        sign_in(&mut app, &credentials()).unwrap();
        assert!(run(&mut app, Command::List { search: None }).is_ok());
        assert_eq!(app.books().len(), 1);
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_fields_are_optional() {
        let cli = Cli::try_parse_from(["book-cli", "update", "3", "--title", "X"]).unwrap();
        match cli.command {
            Command::Update { id, title, author } => {
                assert_eq!(id, 3);
                assert_eq!(title.as_deref(), Some("X"));
                assert!(author.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn email_requires_password() {
        let result = Cli::try_parse_from(["book-cli", "--email", "a@b.com", "whoami"]);
        assert!(result.is_err());
    }
}
