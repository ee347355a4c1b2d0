//! `userhub` command-line dashboard
//!
//! ```bash
//! userhub login --email john.doe@example.com --password password123
//! userhub users list --status active --page 2
//! userhub users edit 7 --active false
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use userhub_dashboard::{
    client::UserHubClient,
    token::{TokenStore, DEFAULT_TOKEN_FILE},
    types::{NewAccount, ProfileChanges, StatusFilter, UserChanges, UserQuery},
    view,
};

#[derive(Debug, Parser)]
#[command(name = "userhub", version, about = "UserHub dashboard")]
struct Cli {
    /// API server base URL
    #[arg(long, env = "USERHUB_API_URL", default_value = "http://localhost:4001")]
    server: String,

    /// Where the login token is kept
    #[arg(long, default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Forget the stored token
    Logout,
    /// Show the logged-in account
    Me,
    /// Check the server and its database
    Health,
    /// Manage accounts
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Update your own names or e-mail
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Deactivate your own account
    Deactivate,
}

#[derive(Debug, clap::Args)]
struct AccountArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
}

impl From<AccountArgs> for NewAccount {
    fn from(args: AccountArgs) -> Self {
        NewAccount {
            email: args.email,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
        }
    }
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// List accounts, newest first
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        /// Apply search and status to the fetched page instead of the server query
        #[arg(long)]
        local: bool,
    },
    /// Show one account
    Show { id: i32 },
    /// Create an account
    Add {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Change fields of an account
    Edit {
        id: i32,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Permanently delete an account
    Delete { id: i32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "userhub_dashboard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut client = UserHubClient::new(&cli.server, TokenStore::new(cli.token_file))?;

    match cli.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.full_name(), user.email);
        }
        Command::Register { account } => {
            let user = client.register(&account.into()).await?;
            println!("Registered {} (id {})", user.email, user.id);
        }
        Command::Logout => {
            if !client.is_authenticated() {
                println!("Not logged in");
            } else {
                match client.logout().await {
                    Ok(message) => println!("{}", message),
                    Err(e) => println!("Token removed locally ({})", e),
                }
            }
        }
        Command::Me => {
            let user = client.me().await?;
            print!("{}", view::render_user(&user));
        }
        Command::Health => {
            let health = client.health().await?;
            println!(
                "{}: {} (version {}, database {}, {})",
                health.status, health.message, health.version, health.database, health.timestamp
            );
        }
        Command::Users { command } => run_users(&mut client, command).await?,
        Command::Profile {
            first_name,
            last_name,
            email,
        } => {
            let changes = ProfileChanges {
                email,
                first_name,
                last_name,
            };
            let user = client.update_profile(&changes).await?;
            print!("{}", view::render_user(&user));
        }
        Command::Password { current, new } => {
            println!("{}", client.change_password(&current, &new).await?);
        }
        Command::Deactivate => {
            println!("{}", client.deactivate_account().await?);
        }
    }

    Ok(())
}

async fn run_users(client: &mut UserHubClient, command: UsersCommand) -> anyhow::Result<()> {
    match command {
        UsersCommand::List {
            search,
            status,
            page,
            limit,
            local,
        } => {
            let query = if local {
                UserQuery {
                    page,
                    limit,
                    ..Default::default()
                }
            } else {
                UserQuery {
                    search: search.clone(),
                    status,
                    page,
                    limit,
                }
            };
            let result = client.list_users(&query).await?;

            let shown = if local {
                view::filter_users(
                    &result.users,
                    search.as_deref().unwrap_or(""),
                    status.unwrap_or_default(),
                )
            } else {
                result.users.iter().collect()
            };

            print!("{}", view::render_table(&shown));
            println!("{}", view::render_pagination(&result.pagination));
            println!("{}", view::render_stats(&view::UserStats::from_users(&result.users)));
        }
        UsersCommand::Show { id } => {
            let user = client.get_user(id).await?;
            print!("{}", view::render_user(&user));
        }
        UsersCommand::Add { account } => {
            let user = client.create_user(&account.into()).await?;
            println!("Created {} (id {})", user.email, user.id);
        }
        UsersCommand::Edit {
            id,
            first_name,
            last_name,
            email,
            active,
        } => {
            let changes = UserChanges {
                email,
                first_name,
                last_name,
                is_active: active,
            };
            let user = client.update_user(id, &changes).await?;
            print!("{}", view::render_user(&user));
        }
        UsersCommand::Delete { id } => {
            println!("{}", client.delete_user(id).await?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_users_list() {
        let cli = Cli::try_parse_from([
            "userhub", "users", "list", "--status", "inactive", "--page", "2",
        ])
        .unwrap();

        match cli.command {
            Command::Users {
                command: UsersCommand::List { status, page, local, .. },
            } => {
                assert_eq!(status, Some(StatusFilter::Inactive));
                assert_eq!(page, Some(2));
                assert!(!local);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_edit_active_flag() {
        let cli =
            Cli::try_parse_from(["userhub", "users", "edit", "7", "--active", "false"]).unwrap();
        match cli.command {
            Command::Users {
                command: UsersCommand::Edit { id, active, .. },
            } => {
                assert_eq!(id, 7);
                assert_eq!(active, Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
